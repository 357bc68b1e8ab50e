//! Supabase outbound adapters.
//!
//! One reqwest-backed [`SupabaseClient`] implements the auth, vows and SQL
//! RPC ports against a hosted project's REST surface.

mod auth;
mod client;
mod dto;
mod rest;

pub use client::SupabaseClient;
