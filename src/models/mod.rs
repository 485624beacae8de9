pub mod config;

pub use config::{parse_option, AppConfig};
