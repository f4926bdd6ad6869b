//! SlotStore — explicit state container with a subscribe/notify contract
//!
//! All game state mutation goes through here. Subscribers (the rendering
//! shell) receive change notifications over a broadcast channel and read
//! snapshots; they never make gameplay decisions.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::types::{ReelState, ReelView, SymbolCard};

/// Change notification emitted by the store
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// Spins-remaining balance changed (server-authoritative)
    BalanceChanged(i64),
    /// Claim-point balance changed
    ClaimPointsChanged(i64),
    /// Megaspin progress or readiness changed
    MegaspinChanged { count: u32, ready: bool },
    /// One or more reels changed state or offset
    ReelsChanged,
    /// Non-visual feedback cue for the shell (haptics, sounds)
    Cue(FeedbackCue),
    /// User-facing alert text; suppressed alerts are never emitted
    Alert(String),
}

/// Feedback cues the shell may map to haptics or sounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackCue {
    /// Spin resolved without a win
    SpinLost,
    /// Win confirmed after the wheel settled
    WinRevealed,
    /// Auto-play loop finished (single cue replaces per-spin cues)
    AutoPlayComplete,
}

#[derive(Debug)]
struct SlotState {
    catalog: Vec<SymbolCard>,
    reels: Vec<ReelView>,
    spins_left: i64,
    claim_points: i64,
    spinning: bool,
    megaspin_count: u32,
    megaspin_ready: bool,
    auto_mode: bool,
    mode_toggled_at: Option<Instant>,
}

/// Shared slot-game state, single logical writer
pub struct SlotStore {
    inner: Mutex<SlotState>,
    events: broadcast::Sender<StoreEvent>,
}

impl SlotStore {
    /// Create a store with `reel_count` idle reels and an empty catalog
    pub fn new(reel_count: usize) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Mutex::new(SlotState {
                catalog: Vec::new(),
                reels: (0..reel_count).map(|i| ReelView::idle(i, 0.0)).collect(),
                spins_left: 0,
                claim_points: 0,
                spinning: false,
                megaspin_count: 0,
                megaspin_ready: false,
                auto_mode: false,
                mode_toggled_at: None,
            }),
            events,
        }
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn notify(&self, event: StoreEvent) {
        // No subscribers is fine; notifications are best-effort
        let _ = self.events.send(event);
    }

    // ─── Catalog ───

    /// Replace the symbol catalog (loaded once per session)
    pub fn set_catalog(&self, catalog: Vec<SymbolCard>) {
        self.inner.lock().catalog = catalog;
    }

    /// Snapshot of the catalog
    pub fn catalog(&self) -> Vec<SymbolCard> {
        self.inner.lock().catalog.clone()
    }

    /// Number of catalog entries
    pub fn catalog_len(&self) -> usize {
        self.inner.lock().catalog.len()
    }

    // ─── Balances ───

    /// Spins-remaining balance
    pub fn spins_left(&self) -> i64 {
        self.inner.lock().spins_left
    }

    /// Overwrite the spin balance with a server-reported value
    pub fn set_spins_left(&self, value: i64) {
        self.inner.lock().spins_left = value;
        self.notify(StoreEvent::BalanceChanged(value));
    }

    /// Claim-point balance
    pub fn claim_points(&self) -> i64 {
        self.inner.lock().claim_points
    }

    /// Overwrite claim points with a server-reported value
    pub fn set_claim_points(&self, value: i64) {
        self.inner.lock().claim_points = value;
        self.notify(StoreEvent::ClaimPointsChanged(value));
    }

    // ─── Megaspin progress ───

    /// Update megaspin progress/readiness from a consume response
    pub fn set_megaspin(&self, count: u32, ready: bool) {
        {
            let mut state = self.inner.lock();
            state.megaspin_count = count;
            state.megaspin_ready = ready;
        }
        self.notify(StoreEvent::MegaspinChanged { count, ready });
    }

    /// Whether the next spin is a guaranteed-win megaspin
    pub fn megaspin_ready(&self) -> bool {
        self.inner.lock().megaspin_ready
    }

    // ─── Spin lifecycle ───

    /// Whether a spin currently owns the reels
    pub fn is_spinning(&self) -> bool {
        self.inner.lock().spinning
    }

    /// Set the input-lock / busy flag
    pub fn set_spinning(&self, value: bool) {
        self.inner.lock().spinning = value;
    }

    /// Snapshot of all reels
    pub fn reels(&self) -> Vec<ReelView> {
        self.inner.lock().reels.clone()
    }

    /// Replace all reel views
    pub fn set_reels(&self, reels: Vec<ReelView>) {
        self.inner.lock().reels = reels;
        self.notify(StoreEvent::ReelsChanged);
    }

    /// Mutate a single reel in place
    pub fn update_reel(&self, index: usize, f: impl FnOnce(&mut ReelView)) {
        {
            let mut state = self.inner.lock();
            if let Some(reel) = state.reels.get_mut(index) {
                f(reel);
            }
        }
        self.notify(StoreEvent::ReelsChanged);
    }

    /// Return every reel to idle at the given rest offsets
    pub fn reset_reels_idle(&self, rest_offsets: &[f32]) {
        {
            let mut state = self.inner.lock();
            for reel in state.reels.iter_mut() {
                reel.state = ReelState::Idle;
                reel.offset_px = rest_offsets.get(reel.index).copied().unwrap_or(0.0);
                reel.duration_ms = 0;
            }
        }
        self.notify(StoreEvent::ReelsChanged);
    }

    // ─── Auto-play mode & gesture debounce ───

    /// Whether auto-play mode is armed
    pub fn auto_mode(&self) -> bool {
        self.inner.lock().auto_mode
    }

    /// Toggle auto-play mode and record the debounce timestamp
    pub fn toggle_auto_mode(&self) -> bool {
        let mut state = self.inner.lock();
        state.auto_mode = !state.auto_mode;
        state.mode_toggled_at = Some(Instant::now());
        state.auto_mode
    }

    /// True while the post-toggle debounce window is still open.
    ///
    /// A spin started inside this window is the tail of the long-press
    /// gesture, not an intentional spin, and must be rejected.
    pub fn mode_toggle_active(&self, window: Duration) -> bool {
        self.inner
            .lock()
            .mode_toggled_at
            .is_some_and(|at| at.elapsed() < window)
    }

    // ─── Shell feedback ───

    /// Emit a feedback cue
    pub fn cue(&self, cue: FeedbackCue) {
        self.notify(StoreEvent::Cue(cue));
    }

    /// Emit a user-facing alert
    pub fn alert(&self, message: impl Into<String>) {
        self.notify(StoreEvent::Alert(message.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SymbolKind;

    #[test]
    fn test_balance_notifies_subscribers() {
        let store = SlotStore::new(3);
        let mut rx = store.subscribe();

        store.set_spins_left(5);
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::BalanceChanged(5));
        assert_eq!(store.spins_left(), 5);
    }

    #[test]
    fn test_reset_reels_idle_applies_rest_offsets() {
        let store = SlotStore::new(2);
        store.update_reel(0, |r| {
            r.state = ReelState::Spinning;
            r.offset_px = -400.0;
        });

        store.reset_reels_idle(&[-80.0, -160.0]);
        let reels = store.reels();
        assert!(reels.iter().all(|r| r.state == ReelState::Idle));
        assert_eq!(reels[0].offset_px, -80.0);
        assert_eq!(reels[1].offset_px, -160.0);
    }

    #[test]
    fn test_catalog_snapshot() {
        let store = SlotStore::new(3);
        store.set_catalog(vec![SymbolCard::new(1, SymbolKind::Character, "A", "a.png")]);
        assert_eq!(store.catalog_len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mode_toggle_debounce_window_expires() {
        let store = SlotStore::new(3);
        store.toggle_auto_mode();
        assert!(store.mode_toggle_active(Duration::from_millis(300)));

        tokio::time::advance(Duration::from_millis(301)).await;
        assert!(!store.mode_toggle_active(Duration::from_millis(300)));
    }
}
