use crate::config::toml_config::NgwConfig;
use crate::config::ConnectionConfig;
use crate::core::webmap::DEFAULT_LAYER_ADAPTER;
use crate::domain::model::ExportFormat;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "ngw")]
#[command(about = "Command-line client for the NextGIS Web REST API")]
pub struct Cli {
    #[arg(long, short, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "NGW_URL", help = "Service URL, without a trailing slash")]
    pub url: Option<String>,

    #[arg(long, env = "NGW_LOGIN")]
    pub login: Option<String>,

    #[arg(long, env = "NGW_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long, short, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the children of a resource
    Children { parent_id: u64 },
    /// Print a resource as JSON
    Get { resource_id: u64 },
    /// Create a resource group
    CreateGroup {
        #[arg(long, default_value_t = 0)]
        parent_id: u64,
        name: String,
        #[arg(long, help = "Reuse and empty an existing group of that name")]
        truncate: bool,
    },
    /// Upload a GeoJSON or zipped shapefile as a vector layer
    UploadVector {
        file: PathBuf,
        #[arg(long)]
        group_id: u64,
        #[arg(long)]
        name: Option<String>,
    },
    /// Upload a raster file as a raster layer
    UploadRaster {
        file: PathBuf,
        #[arg(long)]
        group_id: u64,
        #[arg(long)]
        name: Option<String>,
    },
    /// Upload a .qml file as a QGIS style of a layer
    UploadStyle {
        file: PathBuf,
        #[arg(long)]
        layer_id: u64,
        #[arg(long)]
        name: Option<String>,
    },
    /// Delete a resource
    Delete {
        resource_id: u64,
        #[arg(long, help = "Ignore a failed response")]
        best_effort: bool,
    },
    /// Delete every child of a group
    Truncate { group_id: u64 },
    /// Export a vector layer to a file
    Download {
        layer_id: u64,
        output: PathBuf,
        #[arg(long, default_value = "geojson")]
        format: ExportFormat,
        #[arg(long, default_value_t = 4326)]
        srs: u32,
        #[arg(long)]
        zipped: bool,
    },
    /// Print the feature count of a layer
    FeatureCount { layer_id: u64 },
    /// Print the extent of a layer
    Extent { layer_id: u64 },
    /// Reorder the layers of a web map by display name
    Reorder {
        webmap_id: u64,
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Replace the data of a vector layer, keeping its styles and name
    ReplaceLayer {
        #[arg(long)]
        group_id: u64,
        name: String,
        file: PathBuf,
    },
    /// Create a web map from the styled vector layers of a group
    WebmapFromGroup {
        group_id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = DEFAULT_LAYER_ADAPTER)]
        adapter: String,
    },
    /// Print the XYZ tile URL template of a style
    TileUrl { style_id: u64 },
}

impl Cli {
    /// Config file first, then flags and environment on top.
    pub fn connection_config(&self) -> Result<ConnectionConfig> {
        let base = match &self.config {
            Some(path) => NgwConfig::from_file(path)?,
            None => NgwConfig::default(),
        };

        let mut connection = base.into_connection();
        if let Some(url) = &self.url {
            connection.url = url.clone();
        }
        if let Some(login) = &self.login {
            connection.login = login.clone();
        }
        if let Some(password) = &self.password {
            connection.password = password.clone();
        }
        Ok(connection)
    }
}
