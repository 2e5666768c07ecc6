//! The Coup state machine.
//!
//! Every phase of play — declaring, targeting, blocking, challenging,
//! resolving a challenge, revealing an influence, exchanging cards — runs
//! through one `State` with explicit phase flags and pending-action
//! registers, rather than a distinct type per phase: ISMCTS needs to call
//! `legal_moves`/`apply_move` uniformly no matter what phase a
//! determinization happens to land in.

use crate::action::{Action, Move};
use crate::card::{Card, CardCounts};
use crate::coins::PlayerCoins;
use crate::deck::Deck;
use crate::error::CoupError;
use crate::player::{Hand, PlayerId};
use itertools::Itertools;
use rand::Rng;
use std::collections::BTreeMap;
use tracing::{instrument, trace};

/// The full state of one Coup game, as seen by an omniscient observer
/// (the engine's own self-play) or, after `randomize_for`, by one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    num_real_players: u8,
    hands: BTreeMap<PlayerId, Hand>,
    coins: BTreeMap<PlayerId, PlayerCoins>,
    revealed: CardCounts,
    deck: Deck,
    player_to_move: PlayerId,

    current_action: Option<Action>,
    current_action_player: Option<PlayerId>,
    current_action_target: Option<PlayerId>,
    current_block: Option<Card>,
    current_block_player: Option<PlayerId>,
    challenger: Option<PlayerId>,

    challenging_phase: bool,
    revealing_influence: bool,
    choosing_target: bool,
    ambassador_cards: Vec<Card>,
}

impl State {
    /// Construct a fresh game for `num_real_players` (2..=6), dealing two
    /// cards and two coins to each, using the thread-local RNG.
    pub fn new(num_real_players: u8) -> Result<State, CoupError> {
        Self::new_with_rng(num_real_players, &mut rand::thread_rng())
    }

    #[instrument(skip(rng))]
    pub fn new_with_rng(num_real_players: u8, rng: &mut impl Rng) -> Result<State, CoupError> {
        if !(2..=6).contains(&num_real_players) {
            return Err(CoupError::InvalidPlayerCount(num_real_players));
        }

        let (deck, dealt) = Deck::deal_starting_hands(num_real_players, rng);
        let mut hands = BTreeMap::new();
        let mut coins = BTreeMap::new();
        for (i, cards) in dealt.into_iter().enumerate() {
            let pid = PlayerId::new(i as u8 + 1);
            hands.insert(pid, Hand::from_cards(cards));
            coins.insert(pid, PlayerCoins::default());
        }

        Ok(State {
            num_real_players,
            hands,
            coins,
            revealed: CardCounts::default(),
            deck,
            player_to_move: PlayerId::new(1),
            current_action: None,
            current_action_player: None,
            current_action_target: None,
            current_block: None,
            current_block_player: None,
            challenger: None,
            challenging_phase: false,
            revealing_influence: false,
            choosing_target: false,
            ambassador_cards: Vec::new(),
        })
    }

    pub fn player_to_move(&self) -> PlayerId {
        self.player_to_move
    }

    pub fn coins(&self, player: PlayerId) -> u8 {
        self.coins.get(&player).map_or(0, |c| c.amount())
    }

    pub fn hand(&self, player: PlayerId) -> Option<&Hand> {
        self.hands.get(&player)
    }

    pub fn revealed(&self) -> &CardCounts {
        &self.revealed
    }

    pub fn is_knocked_out(&self, player: PlayerId) -> bool {
        self.hands.get(&player).is_none_or(Hand::is_empty)
    }

    fn live_real_players(&self) -> Vec<PlayerId> {
        (1..=self.num_real_players)
            .map(PlayerId::new)
            .filter(|&p| !self.is_knocked_out(p))
            .collect()
    }

    /// `(p mod N) + 1`, skipping knocked-out players until a live one is
    /// found or the search loops back to `p`.
    pub fn next_player(&self, p: PlayerId) -> PlayerId {
        let n = self.num_real_players;
        let mut next = PlayerId::new((p.get() % n) + 1);
        while next != p && self.is_knocked_out(next) {
            next = PlayerId::new((next.get() % n) + 1);
        }
        next
    }

    pub fn is_terminal(&self) -> bool {
        self.live_real_players().len() <= 1
    }

    pub fn result(&self, player: PlayerId) -> u8 {
        if player.is_environment() || self.is_knocked_out(player) {
            0
        } else {
            1
        }
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        if self.is_terminal() {
            return Vec::new();
        }

        if self.player_to_move.is_environment() {
            return vec![Move::ResolveChallenge];
        }

        if self.revealing_influence {
            return self
                .hands
                .get(&self.player_to_move)
                .map(|h| h.cards().iter().copied().unique().map(Move::Reveal).collect())
                .unwrap_or_default();
        }

        if self.choosing_target {
            return self
                .live_real_players()
                .into_iter()
                .filter(|&p| p != self.player_to_move)
                .map(Move::Target)
                .collect();
        }

        if self.current_block.is_some() {
            return vec![Move::Allow, Move::Challenge];
        }

        if self.challenging_phase {
            let action = self
                .current_action
                .expect("challenging_phase implies an action is in flight");
            let mut moves = vec![Move::Allow];
            moves.extend(
                action
                    .blockers()
                    .iter()
                    .filter(|&&card| self.revealed.get(card) < 3)
                    .map(|&card| Move::Block(card)),
            );
            if action.is_challengeable() {
                moves.push(Move::Challenge);
            }
            return moves;
        }

        if !self.ambassador_cards.is_empty() {
            return self.ambassador_new_hands();
        }

        let coins = self.coins(self.player_to_move);
        if coins >= 10 {
            return vec![Move::Declare(Action::Coup)];
        }

        let mut actions = vec![
            Action::Income,
            Action::ForeignAid,
            Action::Duke,
            Action::Captain,
            Action::Ambassador,
        ];
        if coins >= 3 {
            actions.push(Action::Assassin);
        }
        if coins >= 7 {
            actions.push(Action::Coup);
        }

        actions
            .into_iter()
            .filter(|action| match action.claimed_card() {
                Some(card) => self.revealed.get(card) < 3,
                None => true,
            })
            .map(Move::Declare)
            .collect()
    }

    fn ambassador_new_hands(&self) -> Vec<Move> {
        let actor = self
            .current_action_player
            .expect("ambassador phase has an actor");
        let hand_len = self.hands.get(&actor).map_or(0, Hand::len);

        let mut pool: Vec<Card> = self
            .hands
            .get(&actor)
            .map(|h| h.cards().to_vec())
            .unwrap_or_default();
        pool.extend(self.ambassador_cards.iter().copied());

        pool.into_iter()
            .combinations(hand_len)
            .map(Hand::from_cards)
            .unique()
            .map(Move::NewHand)
            .collect()
    }

    pub fn apply_move(&mut self, mv: &Move) -> Result<(), CoupError> {
        self.apply_move_with_rng(mv, &mut rand::thread_rng())
    }

    #[instrument(skip(self, rng), fields(player_to_move = ?self.player_to_move))]
    pub fn apply_move_with_rng(&mut self, mv: &Move, rng: &mut impl Rng) -> Result<(), CoupError> {
        if !self.legal_moves().contains(mv) {
            return Err(CoupError::IllegalMove);
        }
        trace!(%mv, "applying move");

        match mv.clone() {
            Move::Declare(action) => self.apply_declare(action, rng),
            Move::Block(card) => self.apply_block(card),
            Move::Reveal(card) => self.apply_reveal(card, rng),
            Move::Allow => self.apply_allow(rng),
            Move::Challenge => self.apply_challenge(),
            Move::ResolveChallenge => self.apply_resolve_challenge(rng),
            Move::Target(pid) => self.apply_target(pid, rng),
            Move::NewHand(hand) => self.apply_new_hand(hand),
        }
        Ok(())
    }

    fn apply_declare(&mut self, action: Action, rng: &mut impl Rng) {
        let actor = self.player_to_move;
        self.current_action = Some(action);
        self.current_action_player = Some(actor);

        let cost = action.upfront_cost();
        if cost > 0 {
            self.debit(actor, cost);
        }

        if action.is_targeted() {
            self.choosing_target = true;
        } else if action.is_challengeable() || !action.blockers().is_empty() {
            self.challenging_phase = true;
            self.player_to_move = self.next_player(actor);
        } else {
            self.enact(action, rng);
        }
    }

    fn apply_target(&mut self, target: PlayerId, rng: &mut impl Rng) {
        self.current_action_target = Some(target);
        self.choosing_target = false;
        let action = self
            .current_action
            .expect("choosing_target implies an action is in flight");

        if action == Action::Coup {
            self.enact(action, rng);
        } else {
            self.player_to_move = target;
            self.challenging_phase = true;
        }
    }

    fn apply_block(&mut self, card: Card) {
        self.challenging_phase = false;
        self.current_block = Some(card);
        self.current_block_player = Some(self.player_to_move);
        self.player_to_move = self
            .current_action_player
            .expect("a block implies an action in flight");
    }

    fn apply_challenge(&mut self) {
        self.challenger = Some(self.player_to_move);
        self.challenging_phase = false;
        self.player_to_move = PlayerId::ENVIRONMENT;
    }

    fn apply_allow(&mut self, rng: &mut impl Rng) {
        self.player_to_move = self.next_player(self.player_to_move);

        if self.current_block.is_some() {
            let blocker = self
                .current_block_player
                .expect("current_block implies a blocker");
            if self.player_to_move == blocker {
                self.player_to_move = self.next_player(self.player_to_move);
            }
            let actor = self
                .current_action_player
                .expect("current_block implies an action in flight");
            if self.player_to_move == actor {
                self.player_to_move = self.next_player(actor);
                self.reset_action();
            }
            return;
        }

        if self.challenging_phase {
            let actor = self
                .current_action_player
                .expect("challenging_phase implies an action in flight");
            let action = self.current_action.expect("challenging_phase implies an action");

            if let Some(target) = self.current_action_target {
                if self.player_to_move == actor {
                    self.player_to_move = self.next_player(self.player_to_move);
                }
                if self.player_to_move == target {
                    self.challenging_phase = false;
                    self.enact(action, rng);
                }
            } else if self.player_to_move == actor {
                self.challenging_phase = false;
                self.enact(action, rng);
            }
        }
    }

    fn apply_resolve_challenge(&mut self, rng: &mut impl Rng) {
        if let Some(block_card) = self.current_block {
            let blocker = self
                .current_block_player
                .expect("current_block implies a blocker");
            let challenger = self.challenger.expect("a challenge is in flight");

            if self
                .hands
                .get(&blocker)
                .is_some_and(|h| h.has_card(block_card))
            {
                self.player_to_move = challenger;
                self.swap_card(blocker, block_card, rng);
            } else {
                self.player_to_move = blocker;
            }
        } else {
            let action = self.current_action.expect("an action is in flight");
            let actor = self
                .current_action_player
                .expect("an action is in flight");
            let challenger = self.challenger.expect("a challenge is in flight");
            let claimed = action
                .claimed_card()
                .expect("a challengeable action has a claimed card");

            if self.hands.get(&actor).is_some_and(|h| h.has_card(claimed)) {
                self.player_to_move = challenger;
                self.swap_card(actor, claimed, rng);
            } else {
                self.player_to_move = actor;
            }
        }

        self.challenging_phase = false;
        self.revealing_influence = true;
    }

    fn apply_reveal(&mut self, card: Card, rng: &mut impl Rng) {
        let revealer = self.player_to_move;
        if let Some(hand) = self.hands.get_mut(&revealer) {
            hand.remove(card);
        }
        self.revealed.increment(card);
        self.revealing_influence = false;

        if let Some(blocker) = self.current_block_player {
            if revealer == blocker {
                let action = self.current_action.expect("a block implies an action");
                self.current_block = None;
                self.current_block_player = None;
                self.enact(action, rng);
                return;
            }
        } else if let Some(action) = self.current_action {
            if action != Action::Coup && Some(revealer) == self.challenger {
                self.player_to_move = self
                    .current_action_player
                    .expect("an action is in flight");
                self.enact(action, rng);
                return;
            }
        }

        let actor = self
            .current_action_player
            .expect("an action is in flight");
        self.player_to_move = self.next_player(actor);
        self.reset_action();
    }

    fn apply_new_hand(&mut self, hand: Hand) {
        let actor = self
            .current_action_player
            .expect("ambassador phase has an actor");
        self.hands.insert(actor, hand);
        self.ambassador_cards.clear();
        self.player_to_move = self.next_player(actor);
        self.reset_action();
    }

    fn enact(&mut self, action: Action, rng: &mut impl Rng) {
        match action {
            Action::Income => {
                let actor = self.current_action_player.expect("an action is in flight");
                self.credit(actor, 1);
                self.advance_past_actor();
            }
            Action::ForeignAid => {
                let actor = self.current_action_player.expect("an action is in flight");
                self.credit(actor, 2);
                self.advance_past_actor();
            }
            Action::Duke => {
                let actor = self.current_action_player.expect("an action is in flight");
                self.credit(actor, 3);
                self.advance_past_actor();
            }
            Action::Coup => {
                let actor = self.current_action_player.expect("coup is in flight");
                let target = self
                    .current_action_target
                    .expect("coup has a target");
                self.debit(actor, 7);
                self.player_to_move = target;
                self.revealing_influence = true;
            }
            Action::Captain => {
                let actor = self.current_action_player.expect("captain is in flight");
                let target = self.current_action_target.expect("captain has a target");
                let victim_coins = self.coins.get(&target).copied().unwrap_or_default();
                let thief_coins = self.coins.get(&actor).copied().unwrap_or_default();
                let (new_victim, new_thief) = PlayerCoins::steal(victim_coins, thief_coins);
                self.coins.insert(target, new_victim);
                self.coins.insert(actor, new_thief);
                self.advance_past_actor();
            }
            Action::Assassin => {
                let actor = self.current_action_player.expect("assassin is in flight");
                let target = self.current_action_target.expect("assassin has a target");
                if !self.is_knocked_out(target) {
                    self.player_to_move = target;
                    self.revealing_influence = true;
                } else {
                    self.player_to_move = self.next_player(actor);
                    self.reset_action();
                }
            }
            Action::Ambassador => {
                self.ambassador_cards = self.deck.draw(2, rng);
            }
        }
    }

    fn advance_past_actor(&mut self) {
        let actor = self
            .current_action_player
            .expect("an action is in flight");
        self.player_to_move = self.next_player(actor);
        self.reset_action();
    }

    fn reset_action(&mut self) {
        self.current_action = None;
        self.current_action_player = None;
        self.current_action_target = None;
        self.current_block = None;
        self.current_block_player = None;
        self.challenger = None;
    }

    fn debit(&mut self, player: PlayerId, amount: u8) {
        if let Some(coins) = self.coins.get_mut(&player) {
            *coins = coins.spend(amount);
        }
    }

    fn credit(&mut self, player: PlayerId, amount: u8) {
        if let Some(coins) = self.coins.get_mut(&player) {
            *coins = coins.gain(amount);
        }
    }

    /// Return `card` to the deck and draw a fresh replacement for `player`,
    /// used when a truthful claimant survives a challenge.
    fn swap_card(&mut self, player: PlayerId, card: Card, rng: &mut impl Rng) {
        if let Some(hand) = self.hands.get_mut(&player) {
            hand.remove(card);
        }
        self.deck.return_card(card);
        let fresh = self.deck.draw_one(rng);
        if let Some(hand) = self.hands.get_mut(&player) {
            hand.push(fresh);
        }
    }

    pub fn randomize_for(&self, observer: PlayerId) -> State {
        self.randomize_for_with_rng(observer, &mut rand::thread_rng())
    }

    /// Resample every non-observer hand from the observer's unseen deck.
    pub fn randomize_for_with_rng(&self, observer: PlayerId, rng: &mut impl Rng) -> State {
        let mut clone = self.clone();
        let mut pool: Vec<Card> = self.deck.cards().to_vec();
        let mut sizes = Vec::new();
        let mut order = Vec::new();

        for pid in (1..=self.num_real_players).map(PlayerId::new) {
            if pid == observer {
                continue;
            }
            if let Some(hand) = self.hands.get(&pid) {
                pool.extend(hand.cards().iter().copied());
                sizes.push(hand.len());
                order.push(pid);
            }
        }

        let (new_hands, residual) = Deck::redeal(pool, &sizes, rng);
        for (pid, cards) in order.into_iter().zip(new_hands) {
            clone.hands.insert(pid, Hand::from_cards(cards));
        }
        clone.deck = residual;
        clone
    }

    pub fn self_determinize(&self) -> State {
        self.self_determinize_with_rng(&mut rand::thread_rng())
    }

    /// Resample every hand, including the searcher's own, from the global
    /// unseen deck.
    pub fn self_determinize_with_rng(&self, rng: &mut impl Rng) -> State {
        let mut clone = self.clone();
        let mut pool: Vec<Card> = self.deck.cards().to_vec();
        let mut sizes = Vec::new();
        let mut order = Vec::new();

        for pid in (1..=self.num_real_players).map(PlayerId::new) {
            if let Some(hand) = self.hands.get(&pid) {
                pool.extend(hand.cards().iter().copied());
                sizes.push(hand.len());
                order.push(pid);
            }
        }

        let (new_hands, residual) = Deck::redeal(pool, &sizes, rng);
        for (pid, cards) in order.into_iter().zip(new_hands) {
            clone.hands.insert(pid, Hand::from_cards(cards));
        }
        clone.deck = residual;
        clone
    }

    /// External-driver override: replace a player's hand outright (e.g.
    /// after the human reveals their real cards). Rejects anything that
    /// would push a role's total above three copies.
    pub fn set_hand(&mut self, player: PlayerId, cards: Vec<Card>) -> Result<(), CoupError> {
        if cards.len() > 2 || !self.hands.contains_key(&player) {
            return Err(CoupError::InvariantViolation);
        }
        let new_hand = Hand::from_cards(cards);
        let old_hand = self.hands.get(&player).cloned().unwrap_or_default();

        let mut deck_cards: Vec<Card> = self.deck.cards().to_vec();
        deck_cards.extend(old_hand.cards().iter().copied());
        for card in new_hand.cards() {
            match deck_cards.iter().position(|c| c == card) {
                Some(i) => {
                    deck_cards.remove(i);
                }
                None => return Err(CoupError::InvariantViolation),
            }
        }

        self.hands.insert(player, new_hand);
        self.deck = Deck::from_cards(deck_cards);
        Ok(())
    }

    /// External-driver override: set a player's coin balance directly.
    pub fn set_coin(&mut self, player: PlayerId, amount: u8) -> Result<(), CoupError> {
        if !self.coins.contains_key(&player) {
            return Err(CoupError::InvariantViolation);
        }
        self.coins.insert(player, PlayerCoins::new(amount));
        Ok(())
    }

    /// External-driver override: force whose move it is.
    pub fn set_player_to_move(&mut self, player: PlayerId) -> Result<(), CoupError> {
        if !player.is_environment() && self.is_knocked_out(player) {
            return Err(CoupError::InvariantViolation);
        }
        self.player_to_move = player;
        Ok(())
    }
}
