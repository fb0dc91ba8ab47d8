//! Driven adapters: PostgreSQL repositories, the in-memory store, and the
//! Argon2 credential hasher.
//!
//! Adapters translate between domain types and their storage shapes and hold
//! no business rules.

pub mod credentials;
pub mod memory;
pub mod persistence;
