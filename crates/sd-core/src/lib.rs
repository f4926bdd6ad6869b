//! # sd-core — Shared model types and state plumbing for SpinDeck
//!
//! Provides the pieces both mini-games depend on:
//!
//! - **Catalog types**: symbols, rarity palette, reel view model
//! - **SlotStore**: explicit state container with a subscribe/notify contract
//! - **TimerPool**: bookkeeping for animation timers so a superseded spin
//!   can never mutate state belonging to a newer one
//!
//! ## Architecture
//!
//! ```text
//! UI event → orchestrator / state machine
//!     │            │
//!     │            ├── SlotStore (single writer, broadcast notify)
//!     │            └── TimerPool (staggered stop timers, settle timers)
//!     v
//! rendering reads snapshots, never decides
//! ```

pub mod store;
pub mod timers;
pub mod types;

pub use store::*;
pub use timers::*;
pub use types::*;
