//! Domain entities for the adaptation layer.
//!
//! Entities are objects that have identity and lifecycle. Here the entity is
//! a `StoreHandle`: one long-lived cursor per record store.

mod cursor_state;
mod handle_pair;
mod store_handle;

pub use cursor_state::CursorState;
pub use handle_pair::HandlePair;
pub use store_handle::StoreHandle;
