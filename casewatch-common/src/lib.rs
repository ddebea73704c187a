//! Shared plumbing for the casewatch workspace.
//!
//! Currently this is only the [`observability`] module, which owns the
//! process-wide `tracing` setup. It is intentionally lightweight so every
//! crate can depend on it without pulling in heavy transitive costs.

pub mod observability;
