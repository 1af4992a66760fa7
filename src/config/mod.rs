// src/config/mod.rs
pub mod settings;
pub mod sources;

pub use settings::Settings;
pub use sources::{build_registry, load_sources_default, load_sources_from, SourceEntry};
