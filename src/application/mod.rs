//! Application layer orchestrating the cart.
//!
//! This module defines the `CartEngine`, the single entry point UI consumers use
//! to read and mutate a cart. It decides per call whether the local or the remote
//! store is authoritative and serializes mutations.

pub mod engine;
