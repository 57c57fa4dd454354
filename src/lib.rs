//! Client-side state layer for a point-of-sale application.
//!
//! This crate owns the two state containers behind the POS UI:
//!
//! - [`auth::SessionStore`]: the authenticated user and bearer token,
//!   hydrated from durable storage, revalidated against the auth service,
//!   and watched for client-side token expiry
//! - [`cart::CartStore`]: the ordered cart lines and table designator,
//!   mirrored write-through into durable storage
//!
//! Both stores are cheap cloneable handles over shared state. UI views
//! receive read-only snapshots and mutate through the store operations;
//! network and storage details never leak through that surface. The
//! [`context`] module offers a process-wide provider for wiring the stores
//! to views.

pub mod api;
pub mod auth;
pub mod cart;
pub mod context;
pub mod models;
pub mod storage;

pub use api::{ApiError, AuthClient, AuthService, Credentials, SessionGrant, Verification};
pub use auth::SessionStore;
pub use cart::CartStore;
pub use context::StateContext;
pub use models::{CartLine, LineKey, MenuItem, MenuItemVariant, Role, User};
pub use storage::{FileKv, KvStore, MemoryKv};
