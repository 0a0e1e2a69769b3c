//! propquiz-core — Task evaluation, diagnostics and progression.
//!
//! This crate defines the content model, the pure task evaluator, and the
//! state machines that move a learner from the diagnostic quiz through the
//! practice modules to the final reflection.

pub mod diagnostic;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod parser;
pub mod progression;
pub mod runner;
pub mod session;
pub mod summary;
pub mod traits;
