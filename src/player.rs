//! Player identity and hands.
//!
//! Player ids are plain integers rather than a fixed six-variant enum: the
//! environment player's id `0` needs to be a representable value, not a
//! separate case bolted on, and the id space must scale with the table's
//! 2..=6 real players rather than being pinned to six.

use crate::card::Card;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A player identity. `0` is the reserved environment player; `1..=6` are
/// real seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
pub struct PlayerId(u8);

impl PlayerId {
    pub const ENVIRONMENT: PlayerId = PlayerId(0);

    pub fn new(id: u8) -> PlayerId {
        PlayerId(id)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_environment(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_environment() {
            write!(f, "environment")
        } else {
            write!(f, "player {}", self.0)
        }
    }
}

/// A player's hand: an unordered multiset of at most two roles.
///
/// Kept sorted at all times so that two hands holding the same cards in a
/// different order compare and hash identically — required for `NewHand`
/// moves (see `action::Move`), which must be deduplicated by multiset, not by
/// which card came first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Hand(Vec<Card>);

impl Hand {
    pub fn from_cards(cards: impl IntoIterator<Item = Card>) -> Hand {
        let mut cards: Vec<Card> = cards.into_iter().collect();
        cards.sort_unstable();
        Hand(cards)
    }

    pub fn cards(&self) -> &[Card] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_card(&self, card: Card) -> bool {
        self.0.contains(&card)
    }

    /// Remove one copy of `card`. Panics if the hand does not contain it —
    /// callers must only invoke this from a context where `legal_moves`
    /// already guaranteed the card is present.
    pub fn remove(&mut self, card: Card) {
        let index = self
            .0
            .iter()
            .position(|&c| c == card)
            .expect("card must be in hand");
        self.0.remove(index);
    }

    pub fn push(&mut self, card: Card) {
        self.0.push(card);
        self.0.sort_unstable();
    }
}
