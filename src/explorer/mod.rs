//! Host-facing side of the explorer.

pub mod confirm;
mod controller;
mod host;

pub use confirm::{confirm_by_name, drop_with_confirmation};
pub use controller::ExplorerTreeController;
pub use host::{HostWindow, InputBoxOptions, InputValidator};
