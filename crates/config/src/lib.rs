// Configuration loading

pub mod settings;

pub use settings::{BenchSettings, ConfigError, LoadedSettings, TableSettings};
