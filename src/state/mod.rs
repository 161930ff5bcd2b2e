// Explorer session state: settings, persistence, notices and live listeners

pub mod change_streams;
pub mod config;
pub mod events;
pub mod settings;
pub mod status;

pub use change_streams::ChangeStreamRegistry;
pub use config::ConfigManager;
pub use events::{ConnectionEvent, TreeChangeSignal};
pub use settings::ExplorerSettings;
pub use status::{StatusLevel, StatusMessage};
