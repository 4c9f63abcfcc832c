//! Application state

pub mod sessions;
pub mod state;

pub use sessions::SessionRegistry;
pub use state::AppState;
