//! # sd-slots — Slot machine orchestration
//!
//! Drives one spin end to end: input locking, the mandatory
//! consume-then-verify call order, staggered reel-stop timers, and the
//! deferred win resolution that only fires once the last reel has stopped
//! and the rarity wheel has settled.
//!
//! ## Spin lifecycle
//!
//! ```text
//! Idle ── guards ──> AwaitingConsume ──> AwaitingVerify ──> Animating ──> Resolving ──> Idle
//!                        │ failure             │ failure       (timers)     (wheel +
//!                        v                     v                            prize confirm)
//!                      abort                 abort
//! ```

pub mod autoplay;
pub mod gesture;
pub mod orchestrator;
pub mod wheel;

pub use autoplay::*;
pub use gesture::*;
pub use orchestrator::*;
pub use wheel::*;
