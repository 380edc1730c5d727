#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod config;
pub mod deploy;
pub mod error;
pub mod imaging;
pub mod mapping;
pub mod models;
pub mod project;
pub mod rename;
pub mod rewrite;

pub use config::{DEFAULT_CONFIG_FILE, PrepConfig};
pub use error::PrepError;
pub use mapping::FilenameMapping;
pub use project::SiteLayout;
