pub mod config;
pub mod env;
pub mod logger;
pub mod settings_toml;

pub use config::*;
pub use env::{apply_env_to_opts, load_dotenv};
pub use logger::{crate_level, render_line, setup_logging};
pub use settings_toml::{apply_file_to_opts, load_settings_toml, parse_settings_toml};
