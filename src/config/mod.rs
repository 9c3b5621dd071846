//! Project configuration (`.saltvault.toml`).

pub mod settings;

pub use settings::Settings;
