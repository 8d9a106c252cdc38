//! Fetch commands: entity, section, blob and batch.

use std::io::Write;
use std::path::PathBuf;

use assetlayer::client::{AssetClient, BatchItem};
use serde_json::Value;

use crate::error::CliError;

/// What to fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchTarget {
    Entity {
        asset_type: String,
        id: String,
    },
    Section {
        asset_type: String,
        id: String,
        section: String,
    },
    Blob {
        hash: String,
        output: Option<PathBuf>,
    },
    Batch {
        items: Vec<BatchItem>,
    },
}

/// Run a fetch command, printing results to stdout.
///
/// Diagnostics go to stderr when `diagnostics` is set, whether or not the
/// fetch succeeded.
pub async fn run(
    client: &AssetClient,
    target: FetchTarget,
    diagnostics: bool,
) -> Result<(), CliError> {
    let outcome = fetch(client, target).await;

    if diagnostics {
        let snapshot = serde_json::to_string_pretty(&client.diagnostics())?;
        eprintln!("{}", snapshot);
    }

    outcome
}

async fn fetch(client: &AssetClient, target: FetchTarget) -> Result<(), CliError> {
    match target {
        FetchTarget::Entity { asset_type, id } => {
            let value = client
                .get_entity(&asset_type, &id)
                .await
                .ok_or_else(|| {
                    CliError::Unavailable(format!("entity {}/{} is unavailable", asset_type, id))
                })?;
            print_json(&value)
        }
        FetchTarget::Section {
            asset_type,
            id,
            section,
        } => {
            let value = client
                .get_section(&asset_type, &id, &section)
                .await
                .ok_or_else(|| {
                    CliError::Unavailable(format!(
                        "section {} of {}/{} is unavailable",
                        section, asset_type, id
                    ))
                })?;
            print_json(&value)
        }
        FetchTarget::Blob { hash, output } => {
            let bytes = client
                .get_blob(&hash)
                .await
                .ok_or_else(|| CliError::Unavailable(format!("blob {} is unavailable", hash)))?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &bytes)
                        .map_err(|source| CliError::Output { path: path.clone(), source })?;
                    println!("Wrote {} bytes to {}", bytes.len(), path.display());
                }
                None => std::io::stdout()
                    .write_all(&bytes)
                    .map_err(|source| CliError::Output {
                        path: PathBuf::from("<stdout>"),
                        source,
                    })?,
            }
            Ok(())
        }
        FetchTarget::Batch { items } => {
            let results = client.batch(&items).await;
            print_json(&serde_json::to_value(&results)?)?;

            let failed = results.iter().filter(|r| !r.is_ok()).count();
            if failed > 0 {
                return Err(CliError::Unavailable(format!(
                    "{} of {} batch items are unavailable",
                    failed,
                    results.len()
                )));
            }
            Ok(())
        }
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
