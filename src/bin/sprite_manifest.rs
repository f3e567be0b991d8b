// One-shot tool: scrape the remote sprite listing and write sprites.json.
// Errors are not handled beyond propagation; a failed fetch or parse
// terminates the run with a nonzero exit.

use anyhow::Context;
use chrono::Utc;

use media_vault::manifest::{self, RemoteFile};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // GitHub's API rejects requests without a user agent.
    let client = reqwest::Client::builder()
        .user_agent("media-vault-manifest")
        .build()?;

    let files: Vec<RemoteFile> = client
        .get(manifest::LISTING_URL)
        .send()
        .await
        .context("failed to fetch sprite listing")?
        .error_for_status()?
        .json()
        .await
        .context("failed to parse sprite listing")?;

    let entries = manifest::build_manifest(&files, manifest::RAW_BASE_URL, Utc::now());
    let json = serde_json::to_string_pretty(&entries)?;
    std::fs::write(manifest::OUTPUT_PATH, json)
        .with_context(|| format!("failed to write {}", manifest::OUTPUT_PATH))?;

    tracing::info!(
        "wrote {} sprite entries to {}",
        entries.len(),
        manifest::OUTPUT_PATH
    );
    Ok(())
}
