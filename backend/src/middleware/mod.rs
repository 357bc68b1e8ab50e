//! Request middleware.
//!
//! Purpose: per-request trace identifiers and completion logging.

pub mod trace;

pub use trace::Trace;
