//! The ISMCTS engine: single-observer and split self/observer determinization.
//!
//! Follows the Cowling/Powley/Whitehouse reference loop: one tree shared
//! across determinizations, select restricted to legal children,
//! expand/simulate/backpropagate per iteration.

use crate::action::Move;
use crate::error::CoupError;
use crate::node::Node;
use crate::state::State;
use rand::Rng;
use tracing::instrument;

/// Search budget and exploration constant, bundled for callers who would
/// rather not thread two bare numbers through their own config layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    pub iter_max: u32,
    pub exploration: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            iter_max: 1000,
            exploration: 1.5,
        }
    }
}

impl SearchConfig {
    pub fn run(&self, state: &State) -> Result<Move, CoupError> {
        ismcts(state, self.iter_max, self.exploration)
    }

    pub fn run_split(&self, state: &State) -> Result<Move, CoupError> {
        ismcts_split(state, self.iter_max, self.exploration)
    }
}

/// Single-observer variant: every iteration determinizes from
/// `root_state.player_to_move()`'s point of view.
pub fn ismcts(root_state: &State, iter_max: u32, exploration: f64) -> Result<Move, CoupError> {
    ismcts_with_rng(root_state, iter_max, exploration, &mut rand::thread_rng())
}

#[instrument(skip(root_state, rng))]
pub fn ismcts_with_rng(
    root_state: &State,
    iter_max: u32,
    exploration: f64,
    rng: &mut impl Rng,
) -> Result<Move, CoupError> {
    if root_state.is_terminal() {
        return Err(CoupError::EmptySearch);
    }

    let observer = root_state.player_to_move();
    let mut root = Node::root();
    for _ in 0..iter_max {
        let determinized = root_state.randomize_for_with_rng(observer, rng);
        run_iteration(&mut root, determinized, exploration, rng);
    }
    best_move(&root)
}

/// Split variant: the first `floor(0.7 * iter_max)` iterations resample
/// every hand including the searcher's own (mitigating strategy fusion),
/// the remainder determinize only the opponents' hands as usual.
pub fn ismcts_split(root_state: &State, iter_max: u32, exploration: f64) -> Result<Move, CoupError> {
    ismcts_split_with_rng(root_state, iter_max, exploration, &mut rand::thread_rng())
}

#[instrument(skip(root_state, rng))]
pub fn ismcts_split_with_rng(
    root_state: &State,
    iter_max: u32,
    exploration: f64,
    rng: &mut impl Rng,
) -> Result<Move, CoupError> {
    if root_state.is_terminal() {
        return Err(CoupError::EmptySearch);
    }

    let observer = root_state.player_to_move();
    let self_determinize_until = (0.7 * iter_max as f64).floor() as u32;
    let mut root = Node::root();
    for i in 0..iter_max {
        let determinized = if i < self_determinize_until {
            root_state.self_determinize_with_rng(rng)
        } else {
            root_state.randomize_for_with_rng(observer, rng)
        };
        run_iteration(&mut root, determinized, exploration, rng);
    }
    best_move(&root)
}

/// One select/expand/simulate/backpropagate pass over an already-determinized
/// state, mutating `root`'s tree in place.
fn run_iteration(root: &mut Node, mut state: State, exploration: f64, rng: &mut impl Rng) {
    let mut path: Vec<usize> = Vec::new();

    {
        let mut node: &mut Node = root;

        // Select
        loop {
            let legal = state.legal_moves();
            if legal.is_empty() || !node.untried(&legal).is_empty() {
                break;
            }
            let idx = node.ucb_select(&legal, exploration);
            let mv = node.children()[idx]
                .mv()
                .cloned()
                .expect("a selected child always carries a move");
            state
                .apply_move(&mv)
                .expect("ucb_select only ever returns a currently-legal child");
            path.push(idx);
            node = node.child_mut(idx);
        }

        // Expand
        let legal = state.legal_moves();
        let untried = node.untried(&legal);
        if !untried.is_empty() {
            let mv = untried[rng.gen_range(0..untried.len())].clone();
            let player_about_to_move = state.player_to_move();
            state.apply_move(&mv).expect("expand only ever applies a legal move");
            let idx = node.add_child(mv, player_about_to_move);
            path.push(idx);
        }
    }

    // Simulate
    loop {
        let legal = state.legal_moves();
        if legal.is_empty() {
            break;
        }
        let mv = legal[rng.gen_range(0..legal.len())].clone();
        state.apply_move(&mv).expect("rollout only ever applies a legal move");
    }

    // Backpropagate
    root.update(&state);
    let mut node = root;
    for idx in path {
        node = node.child_mut(idx);
        node.update(&state);
    }
}

/// The root child with the most visits; ties go to whichever was added
/// first, matching `Node::ucb_select`'s own tie-break convention.
fn best_move(root: &Node) -> Result<Move, CoupError> {
    let mut best: Option<&Node> = None;
    for child in root.children() {
        if best.is_none_or(|b| child.visits() > b.visits()) {
            best = Some(child);
        }
    }
    best.and_then(|c| c.mv().cloned()).ok_or(CoupError::EmptySearch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn single_iteration_returns_a_legal_root_move() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let state = State::new_with_rng(2, &mut rng).unwrap();
        let legal = state.legal_moves();
        let mv = ismcts_with_rng(&state, 1, 1.5, &mut rng).unwrap();
        assert!(legal.contains(&mv));
    }

    #[test]
    fn forced_single_legal_move_is_returned_without_error() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut state = State::new_with_rng(2, &mut rng).unwrap();
        state.set_coin(crate::player::PlayerId::new(1), 10).unwrap();
        let legal = state.legal_moves();
        assert_eq!(legal.len(), 1);
        let mv = ismcts_with_rng(&state, 16, 1.5, &mut rng).unwrap();
        assert_eq!(Some(&mv), legal.first());
    }

    #[test]
    fn terminal_state_yields_empty_search() {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let mut state = State::new_with_rng(2, &mut rng).unwrap();
        state.set_hand(crate::player::PlayerId::new(2), vec![]).unwrap();
        assert!(matches!(
            ismcts_with_rng(&state, 10, 1.5, &mut rng),
            Err(CoupError::EmptySearch)
        ));
    }
}
