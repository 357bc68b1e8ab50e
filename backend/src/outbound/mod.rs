//! Outbound adapters implementing the driven ports against the hosted
//! backend. Adapters translate between domain types and wire formats and
//! contain no business logic.

pub mod supabase;
