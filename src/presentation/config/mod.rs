mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    DatabaseSettings, LlmProvider, LlmSettings, LoggingSettings, MediaSettings, ServerSettings,
    Settings, StorageProvider, StorageSettings, SweepSettings, WorkerSettings,
};
