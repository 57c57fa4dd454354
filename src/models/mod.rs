//! Data models for the POS client state.
//!
//! This module contains the data structures shared between the stores and
//! the backend API:
//!
//! - `User`, `Role`: the authenticated operator and its access role
//! - `MenuItem`, `MenuItemVariant`: sellable entries from the menu service
//! - `CartLine`, `LineKey`: cart contents and line identity

pub mod cart;
pub mod menu;
pub mod user;

pub use cart::{CartLine, LineKey};
pub use menu::{MenuItem, MenuItemVariant};
pub use user::{Role, User};
