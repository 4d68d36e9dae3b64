//! Client for the NextGIS Web REST API.
//!
//! Every operation lives on [`NgwClient`], built from an explicit
//! [`ConnectionConfig`]. Calls are issued one after another and carry HTTP
//! basic auth.

pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{Cli, Command};

pub use config::{toml_config::NgwConfig, ConnectionConfig, UploadMode, UploadSettings};
pub use core::{client::NgwClient, ordering::sort_layers_by_list};
pub use domain::model::{
    ErrorPolicy, ExportFormat, ExportOptions, Extent, NameSource, ReplaceOutcome, ResourceClass,
    ResourceInfo, ResourceItem, UploadMeta, WebmapItem,
};
pub use utils::error::{NgwError, Result};
