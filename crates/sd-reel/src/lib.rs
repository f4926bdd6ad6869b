//! # sd-reel — Reel transform geometry and spin timing
//!
//! Pure, deterministic mapping from a server-declared outcome index to the
//! scroll offsets a looping reel animation needs. No randomness lives here:
//! identical inputs always yield identical offsets, which is what guarantees
//! the visual stop position encodes the authoritative outcome.

pub mod timing;
pub mod transform;

pub use timing::*;
pub use transform::*;
