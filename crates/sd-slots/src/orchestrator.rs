//! Spin orchestrator — one slot-machine spin, end to end
//!
//! Sequencing is mandatory and ordered: consume, then verify, then the
//! staggered reel animation, then resolution. A win is recorded as a
//! [`PendingWin`] the moment verify resolves, so the finalize step triggered
//! by the last reel's stop timer never needs another round trip to know what
//! it is resolving.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::Rng;
use tokio::sync::Notify;

use sd_backend::{GameBackend, VictoryReport};
use sd_core::{
    FeedbackCue, PendingWin, PlayerRef, Rarity, ReelState, SlotStore, SpinResolution, SymbolCard,
    SymbolKind, TimerPool, resolve_symbol_index,
};
use sd_reel::{SpinTiming, rest_transform, spin_transform_for_duration};

use crate::gesture::MODE_TOGGLE_DEBOUNCE;
use crate::wheel::{RarityWheel, WheelSpin};

/// Per-spin presentation options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinOptions {
    /// Timing profile driving reel stops and the wheel settle
    pub timing: SpinTiming,
    /// Suppress per-spin alerts and success cues (auto-play)
    pub suppress_feedback: bool,
}

impl SpinOptions {
    /// Manual spin at normal speed
    pub fn normal() -> Self {
        Self {
            timing: SpinTiming::normal(),
            suppress_feedback: false,
        }
    }

    /// Auto-play spin: fast timing, feedback replaced by the loop summary
    pub fn auto() -> Self {
        Self {
            timing: SpinTiming::fast(),
            suppress_feedback: true,
        }
    }
}

impl Default for SpinOptions {
    fn default() -> Self {
        Self::normal()
    }
}

/// A confirmed win, as resolved by finalize
#[derive(Debug, Clone, PartialEq)]
pub struct SpinWin {
    /// Winning symbol (first reel's resolved symbol)
    pub symbol: SymbolCard,
    pub rarity: Option<Rarity>,
    /// Claim points awarded, for claim-type prizes
    pub claim_amount: Option<i64>,
    /// Wheel render data, when a rarity was resolved
    pub wheel: Option<WheelSpin>,
}

/// How a spin request ended
#[derive(Debug, Clone, PartialEq)]
pub enum SpinOutcome {
    /// A guard tripped; nothing was sent to the server
    Rejected,
    /// A server call failed or refused; state was restored
    Aborted { reason: String },
    /// The spin played out fully
    Completed { win: Option<SpinWin> },
}

/// Claim points awarded per prize rarity
pub fn claim_prize_amount(rarity: Option<Rarity>) -> i64 {
    match rarity {
        None | Some(Rarity::Common) => 10,
        Some(Rarity::Rare) => 25,
        Some(Rarity::Epic) => 50,
        Some(Rarity::Legendary) => 100,
    }
}

/// Drives the spin lifecycle against a [`GameBackend`] and a [`SlotStore`]
pub struct SpinOrchestrator<B: GameBackend> {
    backend: Arc<B>,
    store: Arc<SlotStore>,
    player: PlayerRef,
    timers: Arc<TimerPool>,
    wheel: RarityWheel,
    pending_win: Mutex<Option<PendingWin>>,
}

impl<B: GameBackend> SpinOrchestrator<B> {
    pub fn new(backend: Arc<B>, store: Arc<SlotStore>, player: PlayerRef) -> Self {
        let timers = Arc::new(TimerPool::new());
        Self {
            backend,
            store,
            player,
            wheel: RarityWheel::new(timers.clone()),
            timers,
            pending_win: Mutex::new(None),
        }
    }

    /// Shared state container this orchestrator writes to
    pub fn store(&self) -> &Arc<SlotStore> {
        &self.store
    }

    /// Timer pool; cancel on session end so stale timers cannot fire
    pub fn timers(&self) -> &Arc<TimerPool> {
        &self.timers
    }

    /// Run one spin. Guard rejections are silent no-ops; server failures
    /// abort with state restored. The future resolves only after the last
    /// reel stopped and the win (if any) was confirmed.
    pub async fn spin(&self, opts: SpinOptions) -> SpinOutcome {
        if self.store.is_spinning() {
            log::debug!("spin rejected: already spinning");
            return SpinOutcome::Rejected;
        }
        if self.store.catalog_len() == 0 {
            log::debug!("spin rejected: no symbols loaded");
            return SpinOutcome::Rejected;
        }
        if self.store.spins_left() <= 0 {
            log::debug!("spin rejected: no spins left");
            return SpinOutcome::Rejected;
        }
        if self.store.mode_toggle_active(MODE_TOGGLE_DEBOUNCE) {
            log::debug!("spin rejected: inside mode-toggle debounce window");
            return SpinOutcome::Rejected;
        }

        // Whether this spin was armed as a guaranteed-win megaspin; the
        // consume response below reports progress toward the next one.
        let megaspin = self.store.megaspin_ready();

        self.store.set_spinning(true);
        self.timers.cancel_all();
        *self.pending_win.lock() = None;

        let catalog = self.store.catalog();
        let symbol_count = catalog.len();
        let reel_count = self.store.reels().len();

        for i in 0..reel_count {
            let duration_ms = opts.timing.reel_duration(i).as_millis() as u64;
            self.store.update_reel(i, |r| {
                r.state = ReelState::Spinning;
                r.duration_ms = duration_ms;
            });
        }

        // 1. Atomic decrement. The server's counts are authoritative even
        // when the consume is refused.
        let consume = match self.backend.consume_spin(self.player).await {
            Ok(resp) => resp,
            Err(err) => return self.abort(&opts, format!("consume failed: {err}")),
        };
        if let Some(remaining) = consume.spins_remaining {
            self.store.set_spins_left(remaining);
        }
        if let Some(info) = consume.megaspin {
            self.store.set_megaspin(info.count, info.ready);
        }
        if !consume.success {
            return self.abort(&opts, "no spin available".to_string());
        }

        // 2. Authoritative outcome. The draw index is advisory entropy only.
        let draw_index = rand::rng().random_range(0..symbol_count);
        let verify = match self
            .backend
            .verify_spin(self.player, draw_index, &catalog)
            .await
        {
            Ok(resp) => resp,
            Err(err) => return self.abort(&opts, format!("verify failed: {err}")),
        };

        let reel_indices: Vec<usize> = (0..reel_count)
            .map(|i| match verify.reels.get(i) {
                Some(outcome) => resolve_symbol_index(&catalog, outcome.symbol_id, outcome.kind),
                None => {
                    log::warn!("verify response missing reel {i} — defaulting to index 0");
                    0
                }
            })
            .collect();
        let resolution = SpinResolution {
            reel_indices,
            is_win: verify.is_win,
            rarity: verify.rarity,
        };

        // 3. Record the deferred win before any stop timer can fire
        if resolution.is_win {
            let symbol = catalog[resolution.reel_indices[0]].clone();
            *self.pending_win.lock() = Some(PendingWin {
                symbol,
                rarity: resolution.rarity,
                megaspin,
            });
        }

        // 4. Staggered stop timers; only the last one triggers finalize
        let stopped = Arc::new(Notify::new());
        for (i, &target) in resolution.reel_indices.iter().enumerate() {
            let duration = opts.timing.reel_duration(i);
            let transform =
                spin_transform_for_duration(target, symbol_count, duration.as_millis() as u64);
            self.store.update_reel(i, |r| r.offset_px = transform.initial_px);

            let store = self.store.clone();
            let notify = stopped.clone();
            let last = i == reel_count - 1;
            self.timers.spawn(async move {
                tokio::time::sleep(duration).await;
                store.update_reel(i, |r| {
                    r.state = ReelState::Stopped;
                    r.offset_px = transform.final_px;
                });
                if last {
                    notify.notify_one();
                }
            });
        }
        if reel_count > 0 {
            stopped.notified().await;
        }

        // 5. Resolve the deferred win
        self.finalize(&opts, &resolution, symbol_count).await
    }

    async fn finalize(
        &self,
        opts: &SpinOptions,
        resolution: &SpinResolution,
        symbol_count: usize,
    ) -> SpinOutcome {
        // Consumed exactly once; a superseding spin cleared it already
        let pending = self.pending_win.lock().take();

        let outcome = match pending {
            Some(win) => {
                let mut wheel_spin = None;
                if let Some(rarity) = win.rarity {
                    // The prize-confirmation call must never precede the
                    // animation that reveals the prize.
                    match self.wheel.play(rarity, &opts.timing).await {
                        Some(spin) => wheel_spin = Some(spin),
                        None => return self.abort(opts, "wheel cancelled".to_string()),
                    }
                }

                let claim_amount = if win.symbol.kind == SymbolKind::Claim {
                    let amount = claim_prize_amount(win.rarity);
                    match self.backend.process_claim_win(self.player, amount).await {
                        Ok(resp) => {
                            self.store.set_claim_points(resp.balance);
                            Some(amount)
                        }
                        Err(err) => {
                            return self.abort(opts, format!("claim confirmation failed: {err}"));
                        }
                    }
                } else {
                    let report = VictoryReport {
                        rarity: win.rarity,
                        symbol_id: win.symbol.id,
                        kind: win.symbol.kind,
                        megaspin: win.megaspin,
                    };
                    if let Err(err) = self.backend.process_victory(self.player, &report).await {
                        return self.abort(opts, format!("victory confirmation failed: {err}"));
                    }
                    None
                };

                if !opts.suppress_feedback {
                    self.store.cue(FeedbackCue::WinRevealed);
                }
                SpinOutcome::Completed {
                    win: Some(SpinWin {
                        symbol: win.symbol,
                        rarity: win.rarity,
                        claim_amount,
                        wheel: wheel_spin,
                    }),
                }
            }
            None => {
                if !opts.suppress_feedback {
                    self.store.cue(FeedbackCue::SpinLost);
                }
                SpinOutcome::Completed { win: None }
            }
        };

        // Rest on the landed symbols so the idle display matches the outcome
        let offsets: Vec<f32> = resolution
            .reel_indices
            .iter()
            .map(|&idx| rest_transform(idx, symbol_count))
            .collect();
        self.store.reset_reels_idle(&offsets);
        self.store.set_spinning(false);
        outcome
    }

    fn abort(&self, opts: &SpinOptions, reason: String) -> SpinOutcome {
        log::warn!("spin aborted: {reason}");
        let offsets: Vec<f32> = self.store.reels().iter().map(|r| r.offset_px).collect();
        self.store.reset_reels_idle(&offsets);
        self.store.set_spinning(false);
        if !opts.suppress_feedback {
            self.store.alert(reason.clone());
        }
        SpinOutcome::Aborted { reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sd_backend::mock::{CallKind, ScriptedBackend};
    use sd_core::SymbolCard;

    fn player() -> PlayerRef {
        PlayerRef {
            user_id: 42,
            chat_id: 7,
        }
    }

    fn catalog() -> Vec<SymbolCard> {
        vec![
            SymbolCard::new(1, SymbolKind::Character, "Ada", "ada.png"),
            SymbolCard::new(2, SymbolKind::Character, "Grace", "grace.png"),
            SymbolCard::new(3, SymbolKind::Claim, "Claim", "claim.png"),
        ]
    }

    fn setup() -> (Arc<ScriptedBackend>, Arc<SlotStore>) {
        let backend = Arc::new(ScriptedBackend::new());
        let store = Arc::new(SlotStore::new(3));
        store.set_catalog(catalog());
        store.set_spins_left(5);
        (backend, store)
    }

    #[tokio::test(start_paused = true)]
    async fn test_spin_rejected_with_empty_catalog() {
        let backend = Arc::new(ScriptedBackend::new());
        let store = Arc::new(SlotStore::new(3));
        store.set_spins_left(5);
        let orchestrator = SpinOrchestrator::new(backend.clone(), store, player());

        let outcome = orchestrator.spin(SpinOptions::normal()).await;
        assert_eq!(outcome, SpinOutcome::Rejected);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spin_rejected_with_zero_balance() {
        let (backend, store) = setup();
        store.set_spins_left(0);
        let orchestrator = SpinOrchestrator::new(backend.clone(), store, player());

        assert_eq!(
            orchestrator.spin(SpinOptions::normal()).await,
            SpinOutcome::Rejected
        );
        assert!(backend.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spin_rejected_inside_toggle_debounce() {
        let (backend, store) = setup();
        store.toggle_auto_mode();
        let orchestrator = SpinOrchestrator::new(backend.clone(), store, player());

        assert_eq!(
            orchestrator.spin(SpinOptions::normal()).await,
            SpinOutcome::Rejected
        );
        assert!(backend.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_consume_failure_skips_verify_and_restores_idle() {
        let (backend, store) = setup();
        backend.push_consume(Ok(sd_backend::ConsumeSpinResponse {
            success: false,
            spins_remaining: Some(2),
            megaspin: None,
        }));
        let orchestrator = SpinOrchestrator::new(backend.clone(), store.clone(), player());

        let outcome = orchestrator.spin(SpinOptions::normal()).await;
        assert!(matches!(outcome, SpinOutcome::Aborted { .. }));

        // Server-reported count adopted, reels idle, verify never issued
        assert_eq!(store.spins_left(), 2);
        assert!(store.reels().iter().all(|r| r.state == ReelState::Idle));
        assert!(!store.is_spinning());
        assert_eq!(
            backend.count_calls(|c| matches!(c, CallKind::VerifySpin { .. })),
            0
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_symbol_defaults_to_first_catalog_entry() {
        let (backend, store) = setup();
        backend.push_consume_ok(4);
        backend.push_verify(Ok(sd_backend::VerifySpinResponse {
            is_win: false,
            reels: vec![
                sd_backend::ReelOutcome {
                    symbol_id: 999,
                    kind: SymbolKind::Character,
                },
                sd_backend::ReelOutcome {
                    symbol_id: 2,
                    kind: SymbolKind::Character,
                },
                sd_backend::ReelOutcome {
                    symbol_id: 1,
                    kind: SymbolKind::Character,
                },
            ],
            rarity: None,
        }));
        let orchestrator = SpinOrchestrator::new(backend, store.clone(), player());

        let outcome = orchestrator.spin(SpinOptions::normal()).await;
        assert_eq!(outcome, SpinOutcome::Completed { win: None });

        // Unknown id landed on index 0's rest offset, not a crash
        let reels = store.reels();
        assert_eq!(reels[0].offset_px, rest_transform(0, 3));
        assert_eq!(reels[1].offset_px, rest_transform(1, 3));
    }
}
