//! The residual (unseen) deck.
//!
//! Because every card is accounted for as residual ∪ revealed ∪ ⋃hands = 15
//! per role at all times, the residual deck this type stores *is* the full
//! unseen deck of the deck-accounting rules — nothing currently in any hand
//! joins it except transiently during a reshuffle-and-redeal, which is what
//! both determinization and the truthful-claimant's post-challenge card swap
//! are.

use crate::card::Card;
use rand::seq::SliceRandom;
use rand::Rng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const STARTING_DECK: [Card; 15] = [
    Card::Ambassador,
    Card::Ambassador,
    Card::Ambassador,
    Card::Assassin,
    Card::Assassin,
    Card::Assassin,
    Card::Captain,
    Card::Captain,
    Card::Captain,
    Card::Contessa,
    Card::Contessa,
    Card::Contessa,
    Card::Duke,
    Card::Duke,
    Card::Duke,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Deck(Vec<Card>);

impl Deck {
    /// Build a deck directly from an explicit card list, used when an
    /// external override (`State::set_hand`) needs to hand back a
    /// recomputed residual deck.
    pub fn from_cards(cards: Vec<Card>) -> Deck {
        Deck(cards)
    }

    /// A fresh shuffled deck with two cards dealt to each of
    /// `num_real_players` players, in player order.
    pub fn deal_starting_hands(
        num_real_players: u8,
        rng: &mut impl Rng,
    ) -> (Deck, Vec<Vec<Card>>) {
        let mut deck: Vec<Card> = STARTING_DECK.into();
        deck.shuffle(rng);

        let mut hands = Vec::with_capacity(num_real_players as usize);
        for _ in 0..num_real_players {
            let hand = vec![
                deck.pop().expect("starting deck has 2 cards per player"),
                deck.pop().expect("starting deck has 2 cards per player"),
            ];
            hands.push(hand);
        }

        (Deck(deck), hands)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.0
    }

    /// Shuffle, then draw `n` cards from the top.
    pub fn draw(&mut self, n: usize, rng: &mut impl Rng) -> Vec<Card> {
        self.0.shuffle(rng);
        let keep = self.0.len() - n;
        self.0.split_off(keep)
    }

    pub fn draw_one(&mut self, rng: &mut impl Rng) -> Card {
        self.draw(1, rng)
            .pop()
            .expect("draw_one requires a nonempty deck")
    }

    pub fn return_card(&mut self, card: Card) {
        self.0.push(card);
    }

    /// Reshuffle `pool` (this deck's residual cards plus whatever hands are
    /// being resampled) and redeal it into hands of the given sizes plus a
    /// leftover residual deck. Shared by both determinization operations and
    /// by the truthful-claimant's card-replacement step.
    pub fn redeal(mut pool: Vec<Card>, hand_sizes: &[usize], rng: &mut impl Rng) -> (Vec<Vec<Card>>, Deck) {
        pool.shuffle(rng);
        let mut hands = Vec::with_capacity(hand_sizes.len());
        for &size in hand_sizes {
            let drained: Vec<Card> = pool.drain(..size).collect();
            hands.push(drained);
        }
        (hands, Deck(pool))
    }
}
