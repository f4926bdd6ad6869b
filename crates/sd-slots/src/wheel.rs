//! Rarity resolution wheel
//!
//! A secondary animation over the small fixed rarity palette, played only on
//! a win. Completion is a promise-like handshake: a settle timer resolves a
//! oneshot, and the caller may not fire the prize-confirmation call until it
//! resolves. The timer lives in the shared pool, so superseding the spin
//! also cancels the handshake.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use sd_core::{Rarity, TimerPool};
use sd_reel::{SpinTiming, SpinTransform, spin_transform};

/// Render data for one wheel play
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelSpin {
    /// Target rarity the wheel lands on
    pub rarity: Rarity,
    /// Scroll transform over the rarity palette
    pub transform: SpinTransform,
    /// How long the wheel takes to settle
    pub settle: Duration,
}

/// Plays the rarity wheel and reports when it has settled
pub struct RarityWheel {
    timers: Arc<TimerPool>,
}

impl RarityWheel {
    pub fn new(timers: Arc<TimerPool>) -> Self {
        Self { timers }
    }

    /// Play the wheel to completion.
    ///
    /// Returns `None` when the settle timer was cancelled (the spin was
    /// superseded); the caller must then skip prize confirmation.
    pub async fn play(&self, rarity: Rarity, timing: &SpinTiming) -> Option<WheelSpin> {
        let transform = spin_transform(rarity.palette_index(), Rarity::PALETTE.len());
        let settle = timing.wheel_settle();

        let (tx, rx) = oneshot::channel();
        self.timers.spawn(async move {
            tokio::time::sleep(settle).await;
            let _ = tx.send(());
        });

        match rx.await {
            Ok(()) => Some(WheelSpin {
                rarity,
                transform,
                settle,
            }),
            Err(_) => {
                log::debug!("rarity wheel settle timer cancelled before completion");
                None
            }
        }
    }
}
