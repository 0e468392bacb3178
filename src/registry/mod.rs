//! Shared state actors
//!
//! The hidden registry and the client counter are the only state shared
//! between sessions; each is owned by one task and reached by message passing.

pub mod counter;
pub mod hidden;

pub use counter::{ClientCounter, ConnectedClient};
pub use hidden::HiddenRegistry;
