//! The five Coup roles and the counting helpers used by deck accounting.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Display;

/// One of the five roles in a standard Coup deck. Three copies of each exist.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub enum Card {
    Ambassador,
    Assassin,
    Captain,
    Contessa,
    Duke,
}

impl Card {
    pub const ALL: [Card; 5] = [
        Card::Ambassador,
        Card::Assassin,
        Card::Captain,
        Card::Contessa,
        Card::Duke,
    ];
}

impl Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Card::Ambassador => write!(f, "Ambassador"),
            Card::Assassin => write!(f, "Assassin"),
            Card::Captain => write!(f, "Captain"),
            Card::Contessa => write!(f, "Contessa"),
            Card::Duke => write!(f, "Duke"),
        }
    }
}

/// A count per role, defaulting missing roles to zero (mirrors the Python
/// source's `dict.get(card, 0)` behavior for `revealedCards`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CardCounts {
    ambassador: u8,
    assassin: u8,
    captain: u8,
    contessa: u8,
    duke: u8,
}

impl CardCounts {
    pub fn get(&self, card: Card) -> u8 {
        match card {
            Card::Ambassador => self.ambassador,
            Card::Assassin => self.assassin,
            Card::Captain => self.captain,
            Card::Contessa => self.contessa,
            Card::Duke => self.duke,
        }
    }

    fn get_mut(&mut self, card: Card) -> &mut u8 {
        match card {
            Card::Ambassador => &mut self.ambassador,
            Card::Assassin => &mut self.assassin,
            Card::Captain => &mut self.captain,
            Card::Contessa => &mut self.contessa,
            Card::Duke => &mut self.duke,
        }
    }

    pub fn increment(&mut self, card: Card) {
        *self.get_mut(card) += 1;
    }

    pub fn decrement(&mut self, card: Card) {
        let count = self.get_mut(card);
        *count = count.saturating_sub(1);
    }

    pub fn add(&mut self, card: Card, n: u8) {
        *self.get_mut(card) += n;
    }

    /// True once all three copies of `card` are accounted for here.
    pub fn is_exhausted(&self, card: Card) -> bool {
        self.get(card) >= 3
    }

    pub fn total(&self) -> u32 {
        Card::ALL.iter().map(|&c| self.get(c) as u32).sum()
    }

    /// A fresh standard deck: three of each role.
    pub fn full_deck() -> CardCounts {
        CardCounts {
            ambassador: 3,
            assassin: 3,
            captain: 3,
            contessa: 3,
            duke: 3,
        }
    }

    /// Subtract `other` from `self`, role by role, saturating at zero.
    pub fn saturating_sub(mut self, other: &CardCounts) -> CardCounts {
        for card in Card::ALL {
            let count = self.get_mut(card);
            *count = count.saturating_sub(other.get(card));
        }
        self
    }

    pub fn from_cards(cards: impl IntoIterator<Item = Card>) -> CardCounts {
        let mut counts = CardCounts::default();
        for card in cards {
            counts.increment(card);
        }
        counts
    }
}
