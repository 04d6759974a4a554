pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{Cli, Command};

pub use adapters::storage::LocalStorage;
pub use config::CatalogConfig;
pub use core::{etl::EtlEngine, pipeline::CatalogPipeline};
pub use domain::model::{ResponseDescriptor, ResponseKind, TranscribeMode};
pub use utils::error::{CatalogError, Result};
