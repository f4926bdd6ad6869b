//! Scripted backend for integration tests and demos
//!
//! Responses are queued per operation and handed out in order; every call is
//! recorded with a timestamp so tests can assert ordering between network
//! calls and animation boundaries. An exhausted queue answers with a
//! transport error, which makes a test that issues an unexpected call fail
//! loudly instead of hanging on a default.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use sd_core::{PlayerRef, SymbolCard};

use crate::api::{
    CashOutResponse, ClaimWinResponse, ConsumeSpinResponse, GameBackend, GameSession,
    GuessDirection, GuessResponse, VerifySpinResponse, VictoryReport,
};
use crate::error::{BackendError, BackendResult};

/// What was called, with enough payload to assert on
#[derive(Debug, Clone, PartialEq)]
pub enum CallKind {
    ConsumeSpin,
    VerifySpin { draw_index: usize, catalog_len: usize },
    ProcessVictory(VictoryReport),
    ProcessClaimWin { amount: i64 },
    StartGame { bet: i64 },
    MakeGuess { game_id: Uuid, direction: GuessDirection },
    CashOut { game_id: Uuid },
}

/// One recorded backend call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub kind: CallKind,
    /// When the call arrived (tokio clock, so paused-time tests see it)
    pub at: Instant,
}

#[derive(Default)]
struct Script {
    consume: VecDeque<BackendResult<ConsumeSpinResponse>>,
    verify: VecDeque<BackendResult<VerifySpinResponse>>,
    victory: VecDeque<BackendResult<()>>,
    claim: VecDeque<BackendResult<ClaimWinResponse>>,
    start: VecDeque<BackendResult<GameSession>>,
    guess: VecDeque<BackendResult<GuessResponse>>,
    cash_out: VecDeque<BackendResult<CashOutResponse>>,
}

/// Backend test double with scripted responses and a call log
#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<Script>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Scripting ───

    pub fn push_consume(&self, result: BackendResult<ConsumeSpinResponse>) {
        self.script.lock().consume.push_back(result);
    }

    /// Successful consume reporting `spins_remaining`
    pub fn push_consume_ok(&self, spins_remaining: i64) {
        self.push_consume(Ok(ConsumeSpinResponse {
            success: true,
            spins_remaining: Some(spins_remaining),
            megaspin: None,
        }));
    }

    pub fn push_verify(&self, result: BackendResult<VerifySpinResponse>) {
        self.script.lock().verify.push_back(result);
    }

    pub fn push_victory_ok(&self) {
        self.script.lock().victory.push_back(Ok(()));
    }

    pub fn push_claim(&self, result: BackendResult<ClaimWinResponse>) {
        self.script.lock().claim.push_back(result);
    }

    pub fn push_start(&self, result: BackendResult<GameSession>) {
        self.script.lock().start.push_back(result);
    }

    pub fn push_guess(&self, result: BackendResult<GuessResponse>) {
        self.script.lock().guess.push_back(result);
    }

    pub fn push_cash_out(&self, result: BackendResult<CashOutResponse>) {
        self.script.lock().cash_out.push_back(result);
    }

    // ─── Call log ───

    /// Every recorded call, in arrival order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Number of calls matching a predicate
    pub fn count_calls(&self, pred: impl Fn(&CallKind) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(&c.kind)).count()
    }

    fn record(&self, kind: CallKind) {
        self.calls.lock().push(RecordedCall {
            kind,
            at: Instant::now(),
        });
    }

    fn exhausted<T>(op: &str) -> BackendResult<T> {
        Err(BackendError::Transport(format!("script exhausted: {op}")))
    }
}

impl GameBackend for ScriptedBackend {
    async fn consume_spin(&self, _player: PlayerRef) -> BackendResult<ConsumeSpinResponse> {
        self.record(CallKind::ConsumeSpin);
        match self.script.lock().consume.pop_front() {
            Some(result) => result,
            None => Self::exhausted("consume_spin"),
        }
    }

    async fn verify_spin(
        &self,
        _player: PlayerRef,
        draw_index: usize,
        catalog: &[SymbolCard],
    ) -> BackendResult<VerifySpinResponse> {
        self.record(CallKind::VerifySpin {
            draw_index,
            catalog_len: catalog.len(),
        });
        match self.script.lock().verify.pop_front() {
            Some(result) => result,
            None => Self::exhausted("verify_spin"),
        }
    }

    async fn process_victory(
        &self,
        _player: PlayerRef,
        report: &VictoryReport,
    ) -> BackendResult<()> {
        self.record(CallKind::ProcessVictory(report.clone()));
        match self.script.lock().victory.pop_front() {
            Some(result) => result,
            None => Self::exhausted("process_victory"),
        }
    }

    async fn process_claim_win(
        &self,
        _player: PlayerRef,
        amount: i64,
    ) -> BackendResult<ClaimWinResponse> {
        self.record(CallKind::ProcessClaimWin { amount });
        match self.script.lock().claim.pop_front() {
            Some(result) => result,
            None => Self::exhausted("process_claim_win"),
        }
    }

    async fn start_game(&self, _player: PlayerRef, bet: i64) -> BackendResult<GameSession> {
        self.record(CallKind::StartGame { bet });
        match self.script.lock().start.pop_front() {
            Some(result) => result,
            None => Self::exhausted("start_game"),
        }
    }

    async fn make_guess(
        &self,
        _player: PlayerRef,
        game_id: Uuid,
        direction: GuessDirection,
    ) -> BackendResult<GuessResponse> {
        self.record(CallKind::MakeGuess { game_id, direction });
        match self.script.lock().guess.pop_front() {
            Some(result) => result,
            None => Self::exhausted("make_guess"),
        }
    }

    async fn cash_out(&self, _player: PlayerRef, game_id: Uuid) -> BackendResult<CashOutResponse> {
        self.record(CallKind::CashOut { game_id });
        match self.script.lock().cash_out.pop_front() {
            Some(result) => result,
            None => Self::exhausted("cash_out"),
        }
    }
}
