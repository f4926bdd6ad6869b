//! Backend operations and their wire types
//!
//! Ordering contracts the orchestrators rely on:
//! - `consume_spin` must precede `verify_spin` (atomic decrement first)
//! - prize confirmation (`process_victory` / `process_claim_win`) must never
//!   precede the animation that reveals the prize
//! - server-authoritative balances override local values on every response,
//!   including failure responses that carry a corrected count

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sd_core::{PlayerRef, Rarity, SymbolCard, SymbolKind};

use crate::error::BackendResult;

// ─── Slot game ───

/// Megaspin progress carried on consume responses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MegaspinInfo {
    /// Spins counted toward the megaspin threshold
    pub count: u32,
    /// Whether the next spin is a guaranteed-win megaspin
    pub ready: bool,
}

/// Result of the atomic spin decrement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumeSpinResponse {
    /// Whether a spin was consumed
    pub success: bool,
    /// Corrected spins-remaining count, when the server reports one
    pub spins_remaining: Option<i64>,
    /// Megaspin progress, when the feature is active
    pub megaspin: Option<MegaspinInfo>,
}

/// Server-declared outcome for one reel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReelOutcome {
    pub symbol_id: u64,
    pub kind: SymbolKind,
}

/// Authoritative spin outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifySpinResponse {
    pub is_win: bool,
    /// One outcome per reel
    pub reels: Vec<ReelOutcome>,
    /// Prize rarity when the win carries one
    pub rarity: Option<Rarity>,
}

/// Prize confirmation payload for a non-claim win
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VictoryReport {
    pub rarity: Option<Rarity>,
    pub symbol_id: u64,
    pub kind: SymbolKind,
    pub megaspin: bool,
}

/// Claim-point balance after confirming a claim-type prize
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClaimWinResponse {
    pub balance: i64,
}

// ─── Reveal game ───

/// Guess direction for the next card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuessDirection {
    Higher,
    Lower,
}

/// How the drawn card actually compared to the previous one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Higher,
    Lower,
    Equal,
}

/// Reveal-game session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Betting,
    Playing,
    Finished,
}

/// One card the session has revealed so far
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevealedCard {
    pub card_id: u64,
    /// Rank used for higher/lower comparison
    pub value: u8,
}

/// Server-authoritative reveal-game session state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub id: Uuid,
    pub phase: GamePhase,
    pub bet: i64,
    pub multiplier: f64,
    /// Revealed cards, in reveal order
    pub cards: Vec<RevealedCard>,
    /// Total card slots in this session
    pub total_cards: usize,
    /// Next session may not start before this instant
    pub cooldown_until: Option<DateTime<Utc>>,
}

impl GameSession {
    /// Whether the session still accepts guesses
    pub fn is_active(&self) -> bool {
        self.phase == GamePhase::Playing
    }
}

/// Outcome of one guess
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuessResponse {
    pub correct: bool,
    /// Session state after the guess, held in a buffer until the animation
    /// boundary permits committing it
    pub session: GameSession,
    pub comparison: Comparison,
}

/// Result of ending a session early
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashOutResponse {
    pub payout: i64,
    pub balance: i64,
    pub session: GameSession,
}

// ─── The contract ───

/// Operations the game backend exposes to the client core.
///
/// All calls are non-blocking; the awaits around them are the only
/// suspension points in the orchestrators.
pub trait GameBackend: Send + Sync {
    /// Atomic server-side spin decrement; must precede [`Self::verify_spin`]
    fn consume_spin(
        &self,
        player: PlayerRef,
    ) -> impl Future<Output = BackendResult<ConsumeSpinResponse>> + Send;

    /// Authoritative outcome. The client's `draw_index` is advisory entropy
    /// only, never a binding decision.
    fn verify_spin(
        &self,
        player: PlayerRef,
        draw_index: usize,
        catalog: &[SymbolCard],
    ) -> impl Future<Output = BackendResult<VerifySpinResponse>> + Send;

    /// Finalize a non-claim prize after its reveal animation completed
    fn process_victory(
        &self,
        player: PlayerRef,
        report: &VictoryReport,
    ) -> impl Future<Output = BackendResult<()>> + Send;

    /// Finalize a claim-type prize after its reveal animation completed
    fn process_claim_win(
        &self,
        player: PlayerRef,
        amount: i64,
    ) -> impl Future<Output = BackendResult<ClaimWinResponse>> + Send;

    /// Begin a reveal-game session
    fn start_game(
        &self,
        player: PlayerRef,
        bet: i64,
    ) -> impl Future<Output = BackendResult<GameSession>> + Send;

    /// Reveal one card
    fn make_guess(
        &self,
        player: PlayerRef,
        game_id: Uuid,
        direction: GuessDirection,
    ) -> impl Future<Output = BackendResult<GuessResponse>> + Send;

    /// End the session early and collect the current multiplier
    fn cash_out(
        &self,
        player: PlayerRef,
        game_id: Uuid,
    ) -> impl Future<Output = BackendResult<CashOutResponse>> + Send;
}
