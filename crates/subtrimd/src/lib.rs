//! subtrimd - backend relay for the subtrim mobile client.
//!
//! Accepts HTTP requests, forwards prompts to the completion API, and
//! normalizes the model's free-text replies into the strict JSON contracts
//! the client expects. Identity-gated routes verify the caller's bearer
//! token before any external call happens.

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod liveness;
pub mod llm;
pub mod prompts;
pub mod routes;
pub mod server;
