//! # sd-backend — Game-backend contract
//!
//! Semantic contract the orchestrators consume. The wire format and REST
//! plumbing behind it are external collaborators; this crate defines only
//! the operations, their inputs/outputs, and the error surface.
//!
//! The [`mock`] module provides a scripted backend with a recorded call log
//! for integration tests and demos.

pub mod api;
pub mod error;
pub mod mock;

pub use api::*;
pub use error::*;
