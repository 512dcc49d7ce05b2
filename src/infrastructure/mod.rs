//! Infrastructure layer providing external service integrations.
//!
//! Partitioned JSON persistence, the identity providers and history export.

pub mod export;
pub mod identity;
pub mod persistence;

pub use export::*;
pub use identity::*;
pub use persistence::*;
