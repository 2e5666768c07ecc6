//! Search-level properties exercised through the public `coup_core` API.

use coup_core::{ismcts_split_with_rng, ismcts_with_rng, PlayerId, SearchConfig, State};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn search_config_run_matches_the_function_it_wraps() {
    let mut rng = ChaCha8Rng::seed_from_u64(200);
    let mut state = State::new_with_rng(2, &mut rng).unwrap();
    state.set_coin(PlayerId::new(1), 10).unwrap();

    let config = SearchConfig { iter_max: 32, exploration: 1.5 };
    let legal = state.legal_moves();
    let mv = config.run(&state).unwrap();
    assert!(legal.contains(&mv));
}

#[test]
fn split_determinization_returns_a_legal_move_in_a_multiplayer_game() {
    let mut rng = ChaCha8Rng::seed_from_u64(201);
    let state = State::new_with_rng(5, &mut rng).unwrap();
    let legal = state.legal_moves();
    let mv = ismcts_split_with_rng(&state, 40, 1.5, &mut rng).unwrap();
    assert!(legal.contains(&mv));
}

#[test]
fn more_iterations_never_loses_the_only_legal_move() {
    let mut rng = ChaCha8Rng::seed_from_u64(202);
    let mut state = State::new_with_rng(3, &mut rng).unwrap();
    state.set_coin(PlayerId::new(1), 12).unwrap();

    for iter_max in [1, 8, 64] {
        let mv = ismcts_with_rng(&state, iter_max, 1.5, &mut rng).unwrap();
        assert_eq!(state.legal_moves(), vec![mv]);
    }
}
