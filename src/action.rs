//! Actions, blocks, and the full move alphabet.
//!
//! Every phase of play is driven through one `State` and one `Move`, so the
//! phase-appropriate subset of actions is a runtime filter over
//! `legal_moves` rather than a distinct type per phase (see DESIGN.md for
//! the tradeoff against a typestate-per-phase design).
//!
//! The static blocker/challengeable/targeted tables live on `Action` itself
//! below, rather than scattered through move-generation logic.

use crate::card::Card;
use crate::player::{Hand, PlayerId};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A top-level action a player may declare on their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Action {
    Income,
    ForeignAid,
    Coup,
    Duke,
    Captain,
    Ambassador,
    Assassin,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::Income,
        Action::ForeignAid,
        Action::Coup,
        Action::Duke,
        Action::Captain,
        Action::Ambassador,
        Action::Assassin,
    ];

    /// The roles that may block this action, empty if unblockable.
    pub fn blockers(self) -> &'static [Card] {
        match self {
            Action::Income => &[],
            Action::ForeignAid => &[Card::Duke],
            Action::Coup => &[],
            Action::Duke => &[],
            Action::Captain => &[Card::Ambassador, Card::Captain],
            Action::Ambassador => &[],
            Action::Assassin => &[Card::Contessa],
        }
    }

    pub fn is_challengeable(self) -> bool {
        matches!(
            self,
            Action::Duke | Action::Captain | Action::Ambassador | Action::Assassin
        )
    }

    pub fn is_targeted(self) -> bool {
        matches!(self, Action::Coup | Action::Captain | Action::Assassin)
    }

    /// The coin cost paid immediately on declaration. Only Assassin has one,
    /// and it is lost even if the action is later blocked or challenged away.
    pub fn upfront_cost(self) -> u8 {
        match self {
            Action::Assassin => 3,
            _ => 0,
        }
    }

    /// The role a player claims to hold by declaring this action, if any.
    pub fn claimed_card(self) -> Option<Card> {
        match self {
            Action::Duke => Some(Card::Duke),
            Action::Captain => Some(Card::Captain),
            Action::Ambassador => Some(Card::Ambassador),
            Action::Assassin => Some(Card::Assassin),
            Action::Income | Action::ForeignAid | Action::Coup => None,
        }
    }

    /// The minimum coin balance required to declare this action.
    pub fn min_coins(self) -> u8 {
        match self {
            Action::Assassin => 3,
            Action::Coup => 7,
            _ => 0,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Income => write!(f, "Income"),
            Action::ForeignAid => write!(f, "Foreign Aid"),
            Action::Coup => write!(f, "Coup"),
            Action::Duke => write!(f, "Duke"),
            Action::Captain => write!(f, "Captain"),
            Action::Ambassador => write!(f, "Ambassador"),
            Action::Assassin => write!(f, "Assassin"),
        }
    }
}

/// A single legal move, covering every phase of play.
///
/// `Block`/`Reveal` both carry a bare `Card` exactly as the game's own rules
/// do (a block and a reveal are each "claim or show this role"); which
/// meaning applies is fixed by the variant itself rather than left for the
/// caller to infer from the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Move {
    Declare(Action),
    Block(Card),
    Reveal(Card),
    Allow,
    Challenge,
    ResolveChallenge,
    Target(PlayerId),
    NewHand(Hand),
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Declare(action) => write!(f, "{action}"),
            Move::Block(card) => write!(f, "Block({card})"),
            Move::Reveal(card) => write!(f, "Reveal({card})"),
            Move::Allow => write!(f, "Allow"),
            Move::Challenge => write!(f, "Challenge"),
            Move::ResolveChallenge => write!(f, "Resolve Challenge"),
            Move::Target(id) => write!(f, "Target({id})"),
            Move::NewHand(hand) => write!(f, "NewHand({hand:?})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn captain_is_blockable_by_ambassador_or_captain() {
        assert_eq!(Action::Captain.blockers(), &[Card::Ambassador, Card::Captain]);
    }

    #[test]
    fn income_has_no_claim_and_is_never_challengeable() {
        assert_eq!(Action::Income.claimed_card(), None);
        assert!(!Action::Income.is_challengeable());
    }

    #[test]
    fn assassin_costs_three_upfront_and_needs_three_coins() {
        assert_eq!(Action::Assassin.upfront_cost(), 3);
        assert_eq!(Action::Assassin.min_coins(), 3);
    }
}
