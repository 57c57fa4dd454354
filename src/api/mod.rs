//! Auth service interface for the POS backend.
//!
//! `AuthService` is the capability the session store consumes; `AuthClient`
//! is its HTTP implementation. The stores never see transport details
//! beyond the `ApiError` taxonomy.

pub mod client;
pub mod error;

pub use client::{AuthClient, AuthService, Credentials, SessionGrant, Verification};
pub use error::ApiError;
