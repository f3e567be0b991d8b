// Sprite manifest generation: filter a remote directory listing down to PNG
// entries with derived raw URLs and a generation timestamp.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// GitHub contents listing for the sprite directory.
pub const LISTING_URL: &str =
    "https://api.github.com/repos/Purukitto/pokemon-data.json/contents/images/items/sprites";

/// Base URL under which the raw image bytes are served.
pub const RAW_BASE_URL: &str =
    "https://raw.githubusercontent.com/Purukitto/pokemon-data.json/master/images/items/sprites/";

/// Where the generated manifest is written.
pub const OUTPUT_PATH: &str = "sprites.json";

/// One file entry as returned by the listing API. Fields we do not use are
/// ignored during deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteFile {
    pub name: String,
}

/// One manifest entry for a remote sprite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub filename: String,
    pub url: String,
    pub upload_time: String,
}

/// Build manifest entries for every `.png` file in the listing. All entries
/// share the same UTC timestamp, rendered in RFC 3339 form with a `Z`
/// offset.
pub fn build_manifest(
    files: &[RemoteFile],
    raw_base_url: &str,
    now: DateTime<Utc>,
) -> Vec<ManifestEntry> {
    let upload_time = now.to_rfc3339_opts(SecondsFormat::Secs, true);
    files
        .iter()
        .filter(|file| file.name.ends_with(".png"))
        .map(|file| ManifestEntry {
            filename: file.name.clone(),
            url: format!("{raw_base_url}{}", file.name),
            upload_time: upload_time.clone(),
        })
        .collect()
}
