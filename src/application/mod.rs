//! Application layer managing state and workflows.
//!
//! Coordinates the domain and infrastructure layers: the persisted session
//! and program stores, the active workout view with its timer, the identity
//! adapter, and the [`App`] state the terminal front end renders.

pub mod clock;
pub mod identity;
pub mod session_view;
pub mod state;
pub mod store;

pub use clock::*;
pub use identity::*;
pub use session_view::*;
pub use state::*;
pub use store::*;
