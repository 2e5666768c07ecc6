//! Property-based invariants that must hold no matter how a game unfolds.

use coup_core::{Card, PlayerId, State};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn copies_of(state: &State, num_players: u8, card: Card) -> u8 {
    let held: u8 = (1..=num_players)
        .map(|i| {
            state
                .hand(PlayerId::new(i))
                .map_or(0, |h| h.cards().iter().filter(|&&c| c == card).count() as u8)
        })
        .sum();
    held + state.revealed().get(card)
}

proptest! {
    /// However a game is driven, at most three copies of any role are ever
    /// visible across all hands and the revealed pile combined — the rest
    /// stay in the unseen deck.
    #[test]
    fn role_copies_in_play_never_exceed_three(num_players in 2u8..=6, seed in any::<u64>(), steps in 1usize..150) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut state = State::new_with_rng(num_players, &mut rng).unwrap();

        for _ in 0..steps {
            if state.is_terminal() {
                break;
            }
            let legal = state.legal_moves();
            prop_assert!(!legal.is_empty());
            let mv = legal[rng.gen_range(0..legal.len())].clone();
            state.apply_move_with_rng(&mv, &mut rng).unwrap();

            for &card in Card::ALL.iter() {
                prop_assert!(copies_of(&state, num_players, card) <= 3);
            }
            for i in 1..=num_players {
                prop_assert!(state.hand(PlayerId::new(i)).unwrap().len() <= 2);
            }
        }
    }

    /// A terminal state always has an empty move list, and vice versa: a
    /// state with moves left is never terminal.
    #[test]
    fn terminal_state_and_empty_moves_agree(num_players in 2u8..=6, seed in any::<u64>(), steps in 1usize..150) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut state = State::new_with_rng(num_players, &mut rng).unwrap();

        for _ in 0..steps {
            prop_assert_eq!(state.is_terminal(), state.legal_moves().is_empty());
            if state.is_terminal() {
                break;
            }
            let legal = state.legal_moves();
            let mv = legal[rng.gen_range(0..legal.len())].clone();
            state.apply_move_with_rng(&mv, &mut rng).unwrap();
        }
    }

    /// `next_player` only ever returns a knocked-out seat when it has looped
    /// all the way back to its own input (every other seat is also out).
    #[test]
    fn next_player_skips_knocked_out_seats_unless_cornered(num_players in 2u8..=6, knock_out in 0u8..6) {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut state = State::new_with_rng(num_players, &mut rng).unwrap();
        let victim = (knock_out % num_players) + 1;
        state.set_hand(PlayerId::new(victim), vec![]).unwrap();

        for i in 1..=num_players {
            let next = state.next_player(PlayerId::new(i));
            if next.get() != i {
                prop_assert!(!state.is_knocked_out(next));
            }
        }
    }
}

#[test]
fn identical_seeds_deal_identical_games() {
    let mut rng_a = ChaCha8Rng::seed_from_u64(99);
    let mut rng_b = ChaCha8Rng::seed_from_u64(99);
    let a = State::new_with_rng(4, &mut rng_a).unwrap();
    let b = State::new_with_rng(4, &mut rng_b).unwrap();
    assert_eq!(a, b);
}

#[test]
fn randomize_for_preserves_the_observers_own_hand() {
    let mut rng = ChaCha8Rng::seed_from_u64(100);
    let state = State::new_with_rng(4, &mut rng).unwrap();
    let observer = PlayerId::new(1);

    let determinized = state.randomize_for_with_rng(observer, &mut rng);

    assert_eq!(state.hand(observer), determinized.hand(observer));
    assert_eq!(state.player_to_move(), determinized.player_to_move());
    assert_eq!(state.coins(PlayerId::new(2)), determinized.coins(PlayerId::new(2)));
}

#[test]
fn self_determinize_may_reshuffle_the_observers_own_hand() {
    let mut rng = ChaCha8Rng::seed_from_u64(101);
    let state = State::new_with_rng(4, &mut rng).unwrap();
    let determinized = state.self_determinize_with_rng(&mut rng);

    // Every hand is still exactly two cards; only the card identities may
    // have moved between seats.
    for i in 1..=4 {
        assert_eq!(determinized.hand(PlayerId::new(i)).unwrap().len(), 2);
    }
    assert_eq!(state.player_to_move(), determinized.player_to_move());
}
