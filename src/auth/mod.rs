//! Session management for the POS client.
//!
//! This module provides:
//! - `SessionStore`: the authenticated user and bearer token, mirrored
//!   into durable storage, with a periodic client-side expiry check
//! - `token`: local JWT expiry-claim decoding
//!
//! Sessions are restored from storage at startup and revalidated against
//! the auth service before being trusted.

pub mod session;
pub mod token;

pub use session::SessionStore;
