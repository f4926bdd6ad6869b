//! Auto-play loop controller
//!
//! Repeats spins cooperatively on top of the orchestrator. Stopping is a
//! flag checked between iterations — an in-flight spin always finishes
//! normally and network calls are never interrupted. Per-spin feedback is
//! suppressed; the loop reports one summary and one completion cue instead.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use sd_backend::GameBackend;
use sd_core::{FeedbackCue, SlotStore};

use crate::orchestrator::{SpinOptions, SpinOrchestrator, SpinOutcome};

/// How often the loop polls the shared spinning flag
const SPIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Settle time after the flag clears, lets finalize fully land
const FINALIZE_GRACE: Duration = Duration::from_millis(120);

/// Pause between consecutive auto-spins
const INTER_SPIN_PAUSE: Duration = Duration::from_millis(400);

/// Wins accumulated across one auto-play run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutoPlaySummary {
    /// Spins that completed (won or lost)
    pub spins: u32,
    /// Card prizes won
    pub cards_won: u32,
    /// Claim points won
    pub claim_points_won: i64,
}

/// Cooperative repeated-spin loop
pub struct AutoPlayController<B: GameBackend> {
    orchestrator: Arc<SpinOrchestrator<B>>,
    store: Arc<SlotStore>,
    stop_requested: AtomicBool,
}

impl<B: GameBackend> AutoPlayController<B> {
    pub fn new(orchestrator: Arc<SpinOrchestrator<B>>) -> Self {
        let store = orchestrator.store().clone();
        Self {
            orchestrator,
            store,
            stop_requested: AtomicBool::new(false),
        }
    }

    /// Ask the loop to stop after the current spin settles
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Relaxed);
    }

    /// Whether a stop was requested
    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Relaxed)
    }

    /// Run spins until a stop is requested, the balance runs out, or a spin
    /// fails. Returns the accumulated summary; also emits it as an alert
    /// plus a single completion cue.
    pub async fn run(&self) -> AutoPlaySummary {
        let mut summary = AutoPlaySummary::default();

        while !self.stop_requested() && self.store.spins_left() > 0 {
            match self.orchestrator.spin(SpinOptions::auto()).await {
                SpinOutcome::Completed { win } => {
                    summary.spins += 1;
                    if let Some(win) = win {
                        match win.claim_amount {
                            Some(points) => summary.claim_points_won += points,
                            None => summary.cards_won += 1,
                        }
                    }
                }
                SpinOutcome::Rejected => {
                    log::debug!("auto-play stopping: spin rejected");
                    break;
                }
                SpinOutcome::Aborted { reason } => {
                    log::warn!("auto-play stopping: {reason}");
                    break;
                }
            }

            while self.store.is_spinning() {
                tokio::time::sleep(SPIN_POLL_INTERVAL).await;
            }
            tokio::time::sleep(FINALIZE_GRACE).await;
            tokio::time::sleep(INTER_SPIN_PAUSE).await;
        }

        self.store.alert(format!(
            "Auto-play finished: {} spins, {} cards, {} claim points",
            summary.spins, summary.cards_won, summary.claim_points_won
        ));
        self.store.cue(FeedbackCue::AutoPlayComplete);
        summary
    }
}
