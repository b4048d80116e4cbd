//! Voodoo Frontend
//!
//! egui-based viewer for the ragdoll pin board.

pub mod app;
pub mod config;
pub mod input;
pub mod render_state;
pub mod state;
pub mod viewport;

// Re-exports for convenience
pub use app::VoodooApp;
pub use state::{AppAction, AppError, AppState, SharedAppState, ViewerSession};
