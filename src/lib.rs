//! Terminal enrollment wizard for SGEE entrance-exam candidates.
//!
//! The [`wizard`] module owns the form state, the step sequencer and the
//! submission sequence; [`api`] talks to the SGEE backend.

pub mod api;
pub mod error;
pub mod event;
pub mod ui;
pub mod vim;
pub mod wizard;
