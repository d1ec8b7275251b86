pub mod toml_loader;

pub use toml_loader::{load_schema, load_schema_file, preset_schema};
