//! # sd-reveal — Higher/lower card-reveal game core
//!
//! Two pieces:
//!
//! - **Identity allocator**: stable per-slot tokens decoupled from card
//!   content, so a card moving between the unrevealed and revealed stacks is
//!   recognized as the same element instead of vanishing and reappearing.
//! - **Guess/reveal state machine**: phase transitions around the flip and
//!   move animations, with the server's guess response held in a buffer and
//!   committed to visible state only at a phase boundary.

pub mod error;
pub mod identity;
pub mod machine;

pub use error::*;
pub use identity::*;
pub use machine::*;
