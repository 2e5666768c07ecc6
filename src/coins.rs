//! Per-player coin balances.
//!
//! The bank is unbounded — coins only ever need to stay nonnegative on each
//! player, never conserved against a shared pile — so `PlayerCoins` is just
//! a checked-arithmetic wrapper around one player's balance.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerCoins(u8);

impl PlayerCoins {
    pub const STARTING: PlayerCoins = PlayerCoins(2);

    pub fn new(amount: u8) -> PlayerCoins {
        PlayerCoins(amount)
    }

    pub fn amount(self) -> u8 {
        self.0
    }

    pub fn gain(self, amount: u8) -> PlayerCoins {
        PlayerCoins(self.0 + amount)
    }

    /// Spend `amount` coins. Panics if the player does not have them —
    /// callers must only invoke this where `legal_moves` already guaranteed
    /// affordability (e.g. Assassin requires 3 coins to even be offered).
    pub fn spend(self, amount: u8) -> PlayerCoins {
        PlayerCoins(
            self.0
                .checked_sub(amount)
                .expect("spend amount must not exceed balance"),
        )
    }

    /// Steal `min(2, victim's balance)` coins from `victim`, returning
    /// `(new_victim_balance, new_thief_balance)`.
    pub fn steal(victim: PlayerCoins, thief: PlayerCoins) -> (PlayerCoins, PlayerCoins) {
        let stolen = victim.0.min(2);
        (PlayerCoins(victim.0 - stolen), PlayerCoins(thief.0 + stolen))
    }
}

impl Default for PlayerCoins {
    fn default() -> Self {
        PlayerCoins::STARTING
    }
}
