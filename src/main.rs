use clap::Parser;
use ngw_client::utils::error::ErrorCategory;
use ngw_client::utils::logger;
use ngw_client::{Cli, Command, ErrorPolicy, ExportOptions, NgwClient, NgwError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting ngw CLI");
    if cli.verbose {
        tracing::debug!("Command: {:?}", cli.command);
    }

    if let Err(e) = run(cli).await {
        let Some(ngw_error) = e.downcast_ref::<NgwError>() else {
            tracing::error!("❌ {:#}", e);
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        };

        tracing::error!("❌ {:#} (Category: {:?})", e, ngw_error.category());
        tracing::error!("💡 Recovery suggestion: {}", ngw_error.recovery_suggestion());
        eprintln!("❌ {:#}", e);
        eprintln!("💡 {}", ngw_error.recovery_suggestion());

        let exit_code = match ngw_error.category() {
            ErrorCategory::Config => 2,
            ErrorCategory::Precondition => 3,
            ErrorCategory::Remote => 4,
            ErrorCategory::Transport => 5,
            ErrorCategory::Local => 1,
        };
        std::process::exit(exit_code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let client = NgwClient::new(cli.connection_config()?)?;

    match cli.command {
        Command::Children { parent_id } => {
            for item in client.get_child_resources(parent_id).await? {
                let r = item.resource;
                println!("{}\t{}\t{}", r.id, r.cls, r.display_name);
            }
        }
        Command::Get { resource_id } => {
            let value = client.get_resource(resource_id).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Command::CreateGroup {
            parent_id,
            name,
            truncate,
        } => {
            let id = if truncate {
                client.create_or_truncate_resource_group(parent_id, &name).await?
            } else {
                client.create_resource_group(parent_id, Some(&name)).await?
            };
            println!("{}", id);
        }
        Command::UploadVector { file, group_id, name } => {
            let id = client
                .upload_vector_layer(&file, group_id, name.as_deref())
                .await?;
            println!("{}", id);
        }
        Command::UploadRaster { file, group_id, name } => {
            let id = client
                .upload_raster_layer(&file, group_id, name.as_deref())
                .await?;
            println!("{}", id);
        }
        Command::UploadStyle { file, layer_id, name } => {
            let id = client
                .upload_qgis_style(&file, layer_id, name.as_deref())
                .await?;
            println!("{}", id);
        }
        Command::Delete {
            resource_id,
            best_effort,
        } => {
            let policy = if best_effort {
                ErrorPolicy::BestEffort
            } else {
                ErrorPolicy::Strict
            };
            client.delete_resource(resource_id, policy).await?;
        }
        Command::Truncate { group_id } => {
            client.truncate_group(group_id, ErrorPolicy::Strict).await?;
        }
        Command::Download {
            layer_id,
            output,
            format,
            srs,
            zipped,
        } => {
            let options = ExportOptions { format, srs, zipped };
            let written = client.download_vector_layer(&output, layer_id, options).await?;
            println!("📁 {} bytes written to {}", written, output.display());
        }
        Command::FeatureCount { layer_id } => match client.get_feature_count(layer_id).await? {
            Some(count) => println!("{}", count),
            None => println!("unknown"),
        },
        Command::Extent { layer_id } => {
            let extent = client.get_layer_extent(layer_id).await?;
            println!(
                "{} {} {} {}",
                extent.min_lon, extent.min_lat, extent.max_lon, extent.max_lat
            );
        }
        Command::Reorder { webmap_id, names } => {
            client.webmap_reorder_layers_by_list(webmap_id, &names).await?;
        }
        Command::ReplaceLayer { group_id, name, file } => {
            let outcome = client.replace_vector_layer(group_id, &name, &file).await?;
            println!(
                "✅ '{}' now {} (was {}), {} children moved",
                outcome.display_name,
                outcome.new_id,
                outcome.old_id,
                outcome.moved_children.len()
            );
        }
        Command::WebmapFromGroup {
            group_id,
            name,
            adapter,
        } => {
            let id = client
                .create_webmap_from_group(group_id, name.as_deref(), &adapter)
                .await?;
            println!("{}", id);
        }
        Command::TileUrl { style_id } => {
            println!("{}", client.tms_url(style_id));
        }
    }

    Ok(())
}
