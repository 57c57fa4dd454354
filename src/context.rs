//! Process-wide access to the state stores.
//!
//! The application initializes a `StateContext` once at startup; UI views
//! read it through `current()`. Accessing the context before
//! initialization is a wiring defect, not a runtime condition, and fails
//! immediately rather than limping along.
//!
//! The stores are also cheap cloneable handles, so passing clones down
//! explicitly works just as well where a global is unwanted.

use std::sync::OnceLock;

use crate::auth::SessionStore;
use crate::cart::CartStore;

static CONTEXT: OnceLock<StateContext> = OnceLock::new();

/// The two state stores exposed to UI views.
pub struct StateContext {
    pub session: SessionStore,
    pub cart: CartStore,
}

/// Install the context.
///
/// # Panics
///
/// Panics when called more than once.
pub fn init(context: StateContext) {
    if CONTEXT.set(context).is_err() {
        panic!("state context initialized twice");
    }
}

/// The installed context.
///
/// # Panics
///
/// Panics when called before `init`.
pub fn current() -> &'static StateContext {
    CONTEXT
        .get()
        .expect("state context accessed before initialization")
}

/// Non-panicking variant of `current`, for call sites that can degrade.
pub fn try_current() -> Option<&'static StateContext> {
    CONTEXT.get()
}
