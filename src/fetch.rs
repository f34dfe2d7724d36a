use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, StatusCode};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::error::{IndexError, Result};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

pub fn client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(IndexError::Client)
}

pub async fn fetch_bytes(client: &Client, url: &str) -> Result<Vec<u8>> {
    info!("Fetching {}", url);
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|source| fetch_error(url, source))?;
    let bytes = response
        .bytes()
        .await
        .map_err(|source| fetch_error(url, source))?;
    info!("Fetched {} ({:.2} MB)", url, bytes.len() as f64 / 1024.0 / 1024.0);
    Ok(bytes.to_vec())
}

pub async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let bytes = fetch_bytes(client, url).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn fetch_error(url: &str, source: reqwest::Error) -> IndexError {
    IndexError::Fetch {
        url: url.to_string(),
        source,
    }
}

/// Font download stats returned after completion.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FontStats {
    pub total: usize,
    pub downloaded: usize,
    pub existing: usize,
    pub missing: usize,
    pub errors: usize,
}

enum FontOutcome {
    Downloaded,
    Existing,
    Missing,
    Failed(String),
}

/// Download `<base_url><file>` for every file into `dir`, skipping files
/// already on disk. At most `concurrency` requests are in flight.
pub async fn download_fonts(
    client: &Client,
    base_url: &str,
    dir: &Path,
    files: Vec<String>,
    concurrency: usize,
) -> Result<FontStats> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| IndexError::io(dir, e))?;

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let total = files.len();

    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
    {
        pb.set_style(style.progress_chars("=> "));
    }

    // Channel: workers send outcomes, the loop below tallies them
    let (tx, mut rx) = tokio::sync::mpsc::channel::<(String, FontOutcome)>(concurrency.max(1) * 2);

    for file in files {
        let client = client.clone();
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();
        let url = format!("{}{}", base_url, file);
        let path = dir.join(&file);

        tokio::spawn(async move {
            let outcome = match sem.acquire().await {
                Ok(_permit) => download_one(&client, &url, &path).await,
                Err(e) => FontOutcome::Failed(e.to_string()),
            };
            let _ = tx.send((file, outcome)).await;
        });
    }

    // Drop our copy of tx so rx closes when all spawned tasks finish
    drop(tx);

    let mut stats = FontStats {
        total,
        ..FontStats::default()
    };
    while let Some((file, outcome)) = rx.recv().await {
        match outcome {
            FontOutcome::Downloaded => stats.downloaded += 1,
            FontOutcome::Existing => stats.existing += 1,
            FontOutcome::Missing => {
                warn!("Not on GlyphWiki: {}", file);
                stats.missing += 1;
            }
            FontOutcome::Failed(e) => {
                warn!("Download failed for {}: {}", file, e);
                stats.errors += 1;
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!(
        "Fonts: {} total ({} downloaded, {} already present, {} missing, {} errors)",
        stats.total, stats.downloaded, stats.existing, stats.missing, stats.errors
    );
    Ok(stats)
}

async fn download_one(client: &Client, url: &str, path: &Path) -> FontOutcome {
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        return FontOutcome::Existing;
    }

    let response = match client.get(url).send().await {
        Ok(r) => r,
        Err(e) => return FontOutcome::Failed(e.to_string()),
    };
    if response.status() == StatusCode::NOT_FOUND {
        return FontOutcome::Missing;
    }
    let response = match response.error_for_status() {
        Ok(r) => r,
        Err(e) => return FontOutcome::Failed(e.to_string()),
    };
    let bytes = match response.bytes().await {
        Ok(b) => b,
        Err(e) => return FontOutcome::Failed(e.to_string()),
    };
    match write_atomically(path, &bytes).await {
        Ok(()) => FontOutcome::Downloaded,
        Err(e) => FontOutcome::Failed(e.to_string()),
    }
}

/// Write to `<path>.part` and rename, so an interrupted write never leaves a
/// truncated file under the final name.
async fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);

    let result = match tokio::fs::write(&part, bytes).await {
        Ok(()) => tokio::fs::rename(&part, path).await,
        Err(e) => Err(e),
    };
    if result.is_err() {
        let _ = tokio::fs::remove_file(&part).await;
    }
    result
}
