//! Guess/reveal state machine
//!
//! The server answers a guess immediately; the visible session must not.
//! The response is buffered the moment it resolves and committed only at a
//! phase boundary: after the move animation for a correct guess, after a
//! fixed post-flip delay for an incorrect one. Committing earlier would show
//! the card in its destination stack before its move has played.
//!
//! ```text
//! Idle ──guess──> Flipping ──correct──> Moving ──move done──> commit ──> Idle/Finished
//!                    │
//!                    └──incorrect──> (post-flip delay) ──> commit ──> Finished
//! ```
//!
//! The presentation shell must call [`RevealGame::flip_completed`] and
//! [`RevealGame::move_completed`] exactly once per phase; calls arriving in
//! the wrong phase are logged and dropped.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::broadcast;

use sd_backend::{
    CashOutResponse, Comparison, GameBackend, GameSession, GuessDirection, GuessResponse,
};
use sd_core::{PlayerRef, TimerPool};

use crate::error::{RevealError, RevealResult};
use crate::identity::{
    CardIdentity, complete_animation, generate_identities, revealed_count, update_on_reveal,
};

/// Delay between the flip settling and the commit for an incorrect guess
pub const POST_FLIP_COMMIT_DELAY: Duration = Duration::from_millis(700);

/// Delay between a game-over commit and the finished overview layout, so
/// the just-revealed card is visible before the layout reflows
pub const FINISHED_LAYOUT_DELAY: Duration = Duration::from_millis(900);

/// Cards that must be revealed before cash-out unlocks
pub const MIN_REVEALED_FOR_CASHOUT: usize = 2;

/// Which animation currently drives a card; orthogonal to the session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationPhase {
    Idle,
    /// Card rotating in place, still logically unrevealed
    Flipping,
    /// Card travelling from the unrevealed stack to the revealed stack
    Moving,
}

/// Notifications for the presentation shell
#[derive(Debug, Clone, PartialEq)]
pub enum RevealEvent {
    PhaseChanged(AnimationPhase),
    /// Buffered server state was applied to the visible session
    SessionCommitted,
    /// Finished overview may now replace the playing layout
    LayoutFinished,
    CashedOut { payout: i64, balance: i64 },
}

/// How a guess request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// Guard tripped; no network call was issued
    Rejected,
    Accepted {
        correct: bool,
        comparison: Comparison,
    },
}

#[derive(Debug)]
struct RevealState {
    session: Option<GameSession>,
    identities: Vec<CardIdentity>,
    phase: AnimationPhase,
    buffered: Option<GuessResponse>,
}

/// Drives the reveal game against a [`GameBackend`]
pub struct RevealGame<B: GameBackend> {
    backend: Arc<B>,
    player: PlayerRef,
    timers: Arc<TimerPool>,
    events: broadcast::Sender<RevealEvent>,
    state: Arc<Mutex<RevealState>>,
}

impl<B: GameBackend> RevealGame<B> {
    pub fn new(backend: Arc<B>, player: PlayerRef) -> Self {
        let (events, _) = broadcast::channel(32);
        Self {
            backend,
            player,
            timers: Arc::new(TimerPool::new()),
            events,
            state: Arc::new(Mutex::new(RevealState {
                session: None,
                identities: Vec::new(),
                phase: AnimationPhase::Idle,
                buffered: None,
            })),
        }
    }

    /// Subscribe to shell notifications
    pub fn subscribe(&self) -> broadcast::Receiver<RevealEvent> {
        self.events.subscribe()
    }

    /// Current animation phase
    pub fn phase(&self) -> AnimationPhase {
        self.state.lock().phase
    }

    /// Snapshot of the visible session
    pub fn session(&self) -> Option<GameSession> {
        self.state.lock().session.clone()
    }

    /// Snapshot of the slot identities
    pub fn identities(&self) -> Vec<CardIdentity> {
        self.state.lock().identities.clone()
    }

    /// Cancel delay timers; call when the component session ends
    pub fn shutdown(&self) {
        self.timers.cancel_all();
    }

    fn emit(&self, event: RevealEvent) {
        let _ = self.events.send(event);
    }

    /// Begin a session. Refused while one is active or cooling down.
    pub async fn start(&self, bet: i64) -> RevealResult<GameSession> {
        {
            let state = self.state.lock();
            if let Some(session) = &state.session {
                if session.is_active() {
                    return Err(RevealError::SessionActive);
                }
                if let Some(until) = session.cooldown_until {
                    if Utc::now() < until {
                        return Err(RevealError::CooldownActive(until));
                    }
                }
            }
        }

        let session = self.backend.start_game(self.player, bet).await?;

        // Stale delay timers from the previous session must not touch this one
        self.timers.cancel_all();
        {
            let mut state = self.state.lock();
            let revealed: Vec<u64> = session.cards.iter().map(|c| c.card_id).collect();
            state.identities = generate_identities(session.total_cards, &revealed);
            state.phase = AnimationPhase::Idle;
            state.buffered = None;
            state.session = Some(session.clone());
        }
        Ok(session)
    }

    /// Issue one guess. Silent no-op while any animation phase is driving a
    /// card — no network call is made.
    pub async fn guess(&self, direction: GuessDirection) -> RevealResult<GuessOutcome> {
        let game_id = {
            let state = self.state.lock();
            let Some(session) = &state.session else {
                return Err(RevealError::NoSession);
            };
            if state.phase != AnimationPhase::Idle || !session.is_active() {
                log::debug!("guess rejected: phase {:?}", state.phase);
                return Ok(GuessOutcome::Rejected);
            }
            session.id
        };

        let response = self
            .backend
            .make_guess(self.player, game_id, direction)
            .await?;
        let ack = GuessOutcome::Accepted {
            correct: response.correct,
            comparison: response.comparison,
        };

        // Buffer the response; visible state is untouched until a boundary
        {
            let mut state = self.state.lock();
            state.buffered = Some(response);
            state.phase = AnimationPhase::Flipping;
        }
        self.emit(RevealEvent::PhaseChanged(AnimationPhase::Flipping));
        Ok(ack)
    }

    /// Shell callback: the flip animation finished.
    pub fn flip_completed(&self) {
        let correct;
        {
            let mut state = self.state.lock();
            if state.phase != AnimationPhase::Flipping {
                log::warn!("flip_completed outside Flipping — ignored");
                return;
            }
            let Some(buffered) = state.buffered.as_ref() else {
                log::warn!("flip_completed with no buffered response — resetting to idle");
                state.phase = AnimationPhase::Idle;
                return;
            };
            correct = buffered.correct;
            let new_card_id = buffered
                .session
                .cards
                .last()
                .map(|c| c.card_id)
                .unwrap_or_default();

            if correct {
                update_on_reveal(&mut state.identities, new_card_id, true);
                state.phase = AnimationPhase::Moving;
            } else {
                // Wrong guess: the card stays where it flipped; commit after
                // the fixed delay, never at the instant the flip settles
                update_on_reveal(&mut state.identities, new_card_id, false);
            }
        }

        if correct {
            self.emit(RevealEvent::PhaseChanged(AnimationPhase::Moving));
        } else {
            let shared = self.state.clone();
            let events = self.events.clone();
            self.timers.spawn(async move {
                tokio::time::sleep(POST_FLIP_COMMIT_DELAY).await;
                let game_over = commit_buffered(&shared);
                let _ = events.send(RevealEvent::SessionCommitted);
                let _ = events.send(RevealEvent::PhaseChanged(AnimationPhase::Idle));
                if game_over {
                    tokio::time::sleep(FINISHED_LAYOUT_DELAY).await;
                    let _ = events.send(RevealEvent::LayoutFinished);
                }
            });
        }
    }

    /// Shell callback: the move-between-stacks animation finished.
    pub fn move_completed(&self) {
        {
            let mut state = self.state.lock();
            if state.phase != AnimationPhase::Moving {
                log::warn!("move_completed outside Moving — ignored");
                return;
            }
            complete_animation(&mut state.identities);
        }

        let game_over = commit_buffered(&self.state);
        self.emit(RevealEvent::SessionCommitted);
        self.emit(RevealEvent::PhaseChanged(AnimationPhase::Idle));

        if game_over {
            let events = self.events.clone();
            self.timers.spawn(async move {
                tokio::time::sleep(FINISHED_LAYOUT_DELAY).await;
                let _ = events.send(RevealEvent::LayoutFinished);
            });
        }
    }

    /// End the session early. Only with an idle animation phase, an active
    /// session, and at least [`MIN_REVEALED_FOR_CASHOUT`] revealed cards.
    pub async fn cash_out(&self) -> RevealResult<CashOutResponse> {
        let game_id = {
            let state = self.state.lock();
            let Some(session) = &state.session else {
                return Err(RevealError::NoSession);
            };
            if !session.is_active() {
                return Err(RevealError::CashOutUnavailable("session is not active"));
            }
            if state.phase != AnimationPhase::Idle {
                return Err(RevealError::CashOutUnavailable("animation in progress"));
            }
            if revealed_count(&state.identities) < MIN_REVEALED_FOR_CASHOUT {
                return Err(RevealError::CashOutUnavailable(
                    "not enough cards revealed",
                ));
            }
            session.id
        };

        let response = self.backend.cash_out(self.player, game_id).await?;
        {
            let mut state = self.state.lock();
            state.session = Some(response.session.clone());
            state.buffered = None;
        }
        self.emit(RevealEvent::CashedOut {
            payout: response.payout,
            balance: response.balance,
        });
        Ok(response)
    }
}

/// Apply the buffered response to the visible session. Returns whether the
/// committed session left the active state (game over).
fn commit_buffered(state: &Mutex<RevealState>) -> bool {
    let mut state = state.lock();
    let Some(response) = state.buffered.take() else {
        return false;
    };
    let game_over = !response.session.is_active();
    state.session = Some(response.session);
    state.phase = AnimationPhase::Idle;
    game_over
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use sd_backend::mock::ScriptedBackend;
    use sd_backend::{GamePhase, RevealedCard};
    use uuid::Uuid;

    fn player() -> PlayerRef {
        PlayerRef {
            user_id: 9,
            chat_id: 3,
        }
    }

    fn session(phase: GamePhase, cards: Vec<RevealedCard>) -> GameSession {
        GameSession {
            id: Uuid::new_v4(),
            phase,
            bet: 50,
            multiplier: 1.0,
            cards,
            total_cards: 5,
            cooldown_until: None,
        }
    }

    #[tokio::test]
    async fn test_start_rejected_while_session_active() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_start(Ok(session(GamePhase::Playing, vec![])));
        let game = RevealGame::new(backend, player());

        game.start(50).await.unwrap();
        assert!(matches!(
            game.start(50).await,
            Err(RevealError::SessionActive)
        ));
    }

    #[tokio::test]
    async fn test_start_rejected_during_cooldown() {
        let backend = Arc::new(ScriptedBackend::new());
        let mut finished = session(GamePhase::Finished, vec![]);
        finished.cooldown_until = Some(Utc::now() + ChronoDuration::minutes(5));
        backend.push_start(Ok(finished));
        let game = RevealGame::new(backend.clone(), player());

        game.start(50).await.unwrap();
        assert!(matches!(
            game.start(50).await,
            Err(RevealError::CooldownActive(_))
        ));
        // Only the first start reached the backend
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_guess_without_session_is_an_error() {
        let backend = Arc::new(ScriptedBackend::new());
        let game = RevealGame::new(backend, player());
        assert!(matches!(
            game.guess(GuessDirection::Higher).await,
            Err(RevealError::NoSession)
        ));
    }

    #[tokio::test]
    async fn test_cash_out_needs_two_revealed_cards() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_start(Ok(session(
            GamePhase::Playing,
            vec![RevealedCard {
                card_id: 11,
                value: 5,
            }],
        )));
        let game = RevealGame::new(backend.clone(), player());
        game.start(50).await.unwrap();

        assert!(matches!(
            game.cash_out().await,
            Err(RevealError::CashOutUnavailable(_))
        ));
        // Guard tripped before any network call
        assert_eq!(backend.calls().len(), 1);
    }
}
