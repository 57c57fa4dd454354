//! Cart state for the POS client.
//!
//! `CartStore` keeps the ordered cart lines and the optional table
//! designator, with every mutation mirrored write-through into durable
//! storage.

pub mod store;

pub use store::CartStore;
