//! The game session controller.
//!
//! Owns a `SessionState` and is the only thing that changes it. Every
//! operation either changes the state and notifies observers, or is a silent
//! no-op; nothing here returns an error.
//!
//! The controller does not own a clock. Time enters through three calls made
//! by whoever drives it (the tokio driver in `runtime`, or a test):
//!
//! - `tick()` once per second while a game is in progress,
//! - `take_scheduled()` to collect work that must run after a delay,
//! - `run_deferred()` when that delay has passed.
//!
//! ```
//! use memory_match::core::{CardIndex, Phase, PlayerId, SessionConfig};
//! use memory_match::session::{FlipOutcome, SessionController};
//!
//! let config = SessionConfig::default().with_fixed_deck(vec![1, 2, 1, 2]);
//! let mut session = SessionController::new(config).unwrap();
//!
//! session.start_game();
//! session.flip_card(CardIndex::new(0));
//! let outcome = session.flip_card(CardIndex::new(2));
//!
//! assert_eq!(outcome, FlipOutcome::Matched { player: PlayerId::ONE, value: 1 });
//! assert_eq!(session.state().scores()[PlayerId::ONE], 1);
//! assert_eq!(session.state().phase(), Phase::InProgress);
//! ```

use std::time::Duration;

use tracing::{debug, info, trace};

use super::observer::{FlipCue, SessionObserver, SilentCue};
use super::schedule::{Deferred, Epochs, ScheduledTask, TimerKey};
use crate::core::{Card, CardIndex, Dealer, GameRng, Phase, PlayerId, SessionConfig, SessionState, Snapshot};
use crate::error::ConfigError;
use crate::rules::GameResult;

/// Why a flip was ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// No game is in progress.
    NotInProgress,
    /// The index is not on the board.
    OutOfRange,
    /// The card is already part of a found pair.
    AlreadyMatched,
    /// The card is already face up this turn.
    AlreadyFlipped,
    /// Two cards are already face up, waiting to be turned back.
    PairPending,
}

/// What a flip did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlipOutcome {
    /// Nothing changed.
    Ignored(IgnoreReason),
    /// First card of the pair is face up.
    Revealed(Card),
    /// Second card matched the first; the current player scored.
    Matched { player: PlayerId, value: u8 },
    /// Second card did not match. Both stay face up for `delay`, then the turn passes.
    Mismatched { delay: Duration },
}

/// What a timer tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// No game in progress.
    Idle,
    /// One second elapsed; this many remain.
    Counted(u32),
    /// The given player ran out of time and the turn passed.
    TimedOut(PlayerId),
}

/// Owns one session and applies the game rules to it.
pub struct SessionController {
    config: SessionConfig,
    dealer: Dealer,
    rng: GameRng,
    state: SessionState,
    epochs: Epochs,
    scheduled: Vec<ScheduledTask>,
    observers: Vec<Box<dyn SessionObserver>>,
    cue: Box<dyn FlipCue>,
}

impl SessionController {
    /// Create a controller in the `NotStarted` phase.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        let dealer = config.dealer()?;
        let rng = config.seed.map_or_else(GameRng::from_entropy, GameRng::new);

        info!(
            seed = rng.seed(),
            turn_seconds = config.turn_seconds,
            fixed_deck = matches!(dealer, Dealer::Fixed(_)),
            "Session created"
        );

        Ok(Self {
            state: SessionState::new(config.turn_seconds),
            config,
            dealer,
            rng,
            epochs: Epochs::default(),
            scheduled: Vec::new(),
            observers: Vec::new(),
            cue: Box::new(SilentCue),
        })
    }

    /// Replace the flip cue.
    #[must_use]
    pub fn with_cue(mut self, cue: impl FlipCue + 'static) -> Self {
        self.cue = Box::new(cue);
        self
    }

    /// Register an observer. It immediately receives the current snapshot.
    pub fn subscribe(&mut self, mut observer: impl SessionObserver + 'static) {
        observer.state_changed(&self.state.snapshot());
        self.observers.push(Box::new(observer));
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    #[must_use]
    pub fn epochs(&self) -> Epochs {
        self.epochs
    }

    /// Key of the turn timer that should be running, if any.
    #[must_use]
    pub fn timer_key(&self) -> Option<TimerKey> {
        (self.state.phase == Phase::InProgress).then_some(TimerKey {
            game: self.epochs.game,
            turn: self.epochs.turn,
            timer: self.epochs.timer,
        })
    }

    /// Collect tasks scheduled since the last call.
    pub fn take_scheduled(&mut self) -> Vec<ScheduledTask> {
        std::mem::take(&mut self.scheduled)
    }

    // === Lifecycle ===

    /// Deal a new deck and begin play.
    ///
    /// Only valid from `NotStarted`; returns `false` and does nothing otherwise.
    pub fn start_game(&mut self) -> bool {
        if self.state.phase != Phase::NotStarted {
            debug!(phase = ?self.state.phase, "Start ignored");
            return false;
        }

        let deck = self.dealer.deal(&mut self.rng);
        self.begin_epoch();
        info!(game = self.epochs.game, cards = deck.len(), "Game started");

        self.state = SessionState::dealt(deck, self.config.turn_seconds);
        self.publish();
        true
    }

    /// Abandon the current game and return to `NotStarted`.
    ///
    /// Pending deferred work from the abandoned game will never apply.
    pub fn restart_game(&mut self) {
        self.begin_epoch();
        info!(game = self.epochs.game, "Session reset");

        self.state = SessionState::new(self.config.turn_seconds);
        self.publish();
    }

    fn begin_epoch(&mut self) {
        self.epochs.game += 1;
        self.epochs.turn += 1;
        self.epochs.timer += 1;
        self.scheduled.clear();
    }

    // === Play ===

    /// Flip the card at `index` face up.
    pub fn flip_card(&mut self, index: CardIndex) -> FlipOutcome {
        let card = match self.check_flip(index) {
            Ok(card) => card,
            Err(reason) => {
                debug!(%index, ?reason, "Flip ignored");
                return FlipOutcome::Ignored(reason);
            }
        };

        self.state.flipped.push(index);
        self.refill_timer();
        self.cue.flip(card);
        debug!(%index, value = card.value, player = %self.state.current_player, "Card flipped");

        let pair = match self.state.flipped.as_slice() {
            &[first, second] => Some((first, second)),
            _ => None,
        };
        let outcome = match pair {
            Some((first, second)) => self.resolve_pair(first, second, card),
            None => FlipOutcome::Revealed(card),
        };

        self.publish();
        outcome
    }

    fn check_flip(&self, index: CardIndex) -> Result<Card, IgnoreReason> {
        if self.state.phase != Phase::InProgress {
            return Err(IgnoreReason::NotInProgress);
        }
        let card = self.state.deck.get(index).ok_or(IgnoreReason::OutOfRange)?;
        if self.state.is_matched(index) {
            return Err(IgnoreReason::AlreadyMatched);
        }
        if self.state.is_flipped(index) {
            return Err(IgnoreReason::AlreadyFlipped);
        }
        if self.state.flipped.len() >= 2 {
            return Err(IgnoreReason::PairPending);
        }
        Ok(card)
    }

    fn resolve_pair(&mut self, first: CardIndex, second: CardIndex, card: Card) -> FlipOutcome {
        let is_match = self
            .state
            .deck
            .get(first)
            .zip(self.state.deck.get(second))
            .is_some_and(|(a, b)| a.matches(b));

        if is_match {
            let player = self.state.current_player;
            self.state.matched.insert(first);
            self.state.matched.insert(second);
            self.state.scores[player] += 1;
            self.state.flipped.clear();
            info!(%player, value = card.value, score = self.state.scores[player], "Pair matched");

            self.check_completion();
            FlipOutcome::Matched { player, value: card.value }
        } else {
            let delay = self.config.mismatch_delay();
            debug!(%first, %second, ?delay, "Mismatch, turn passes after reveal");
            self.schedule(
                delay,
                Deferred::ResolveMismatch {
                    game: self.epochs.game,
                    turn: self.epochs.turn,
                },
            );
            FlipOutcome::Mismatched { delay }
        }
    }

    fn check_completion(&mut self) {
        if self.state.phase == Phase::InProgress && self.state.is_complete() {
            let result = GameResult::from_scores(&self.state.scores);
            self.state.phase = Phase::GameOver;
            self.state.outcome = Some(result);
            info!(
                game = self.epochs.game,
                player_one = self.state.scores[PlayerId::ONE],
                player_two = self.state.scores[PlayerId::TWO],
                %result,
                "Game over"
            );
        }
    }

    /// Pass the turn to the other player.
    ///
    /// Returns `false` and does nothing unless a game is in progress.
    pub fn switch_turn(&mut self) -> bool {
        if self.state.phase != Phase::InProgress {
            return false;
        }
        self.pass_turn();
        self.publish();
        true
    }

    fn pass_turn(&mut self) {
        self.state.flipped.clear();
        self.state.current_player = self.state.current_player.other();
        self.epochs.turn += 1;
        self.refill_timer();
        self.schedule(
            self.config.message_linger(),
            Deferred::ClearTimeoutMessage {
                game: self.epochs.game,
                message: self.epochs.message,
            },
        );
        info!(player = %self.state.current_player, turn = self.epochs.turn, "Turn passed");
    }

    fn refill_timer(&mut self) {
        self.state.turn_timer = self.config.turn_seconds;
        self.epochs.timer += 1;
    }

    // === Time ===

    /// Advance the turn timer by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state.phase != Phase::InProgress {
            return TickOutcome::Idle;
        }

        if self.state.turn_timer == 0 {
            let player = self.state.current_player;
            self.state.timeout_message = Some(format!("{player}'s time is up!"));
            self.epochs.message += 1;
            info!(%player, "Turn timed out");

            self.pass_turn();
            self.publish();
            return TickOutcome::TimedOut(player);
        }

        self.state.turn_timer -= 1;
        trace!(remaining = self.state.turn_timer, "Tick");
        self.publish();
        TickOutcome::Counted(self.state.turn_timer)
    }

    /// Run a deferred task whose delay has elapsed.
    ///
    /// Returns `false` if the task was stale and had no effect.
    ///
    /// A timeout notice is still cleared after the game ends; only a restart
    /// (which starts a new game epoch) cancels it.
    pub fn run_deferred(&mut self, task: Deferred) -> bool {
        if !task.is_current(&self.epochs) {
            debug!(?task, "Dropping stale deferred task");
            return false;
        }

        match task {
            Deferred::ResolveMismatch { .. } => {
                if self.state.phase != Phase::InProgress || self.state.flipped.len() != 2 {
                    return false;
                }
                self.pass_turn();
            }
            Deferred::ClearTimeoutMessage { .. } => {
                if self.state.timeout_message.take().is_none() {
                    return false;
                }
                debug!("Timeout notice cleared");
            }
        }

        self.publish();
        true
    }

    fn schedule(&mut self, delay: Duration, task: Deferred) {
        self.scheduled.push(ScheduledTask { delay, task });
    }

    fn publish(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.state.snapshot();
        for observer in &mut self.observers {
            observer.state_changed(&snapshot);
        }
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state)
            .field("epochs", &self.epochs)
            .field("scheduled", &self.scheduled)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}
