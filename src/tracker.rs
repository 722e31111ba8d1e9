use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::api::MangaPlusClient;
use crate::config::{Config, TrackedManga};
use crate::transport::Transport;
use crate::types::{Chapter, ImageQuality};

/// Written into a chapter directory once every page is on disk.
pub const COMPLETE_MARKER: &str = ".complete";

/// Outcome of syncing one tracked title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub chapters_seen: usize,
    pub chapters_downloaded: usize,
    pub pages_written: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub synced: usize,
    pub failed: usize,
    pub chapters_downloaded: usize,
    pub pages_written: usize,
}

/// Tracker owns a client and the tracked title list and keeps download directories up to date.
pub struct Tracker<T = reqwest::Client> {
    client: MangaPlusClient<T>,
    config: Config,
}

impl<T: Transport> Tracker<T> {
    pub fn new(client: MangaPlusClient<T>, config: Config) -> Self {
        if let Some(komga) = &config.komga {
            info!(base_url = %komga.base_url, user = %komga.username, "komga library configured");
        }
        Self { client, config }
    }

    pub fn client(&self) -> &MangaPlusClient<T> { &self.client }
    pub fn config(&self) -> &Config { &self.config }

    pub async fn download_chapter(&self, chapter: &Chapter, dir: &Path, force_overwrite: bool) -> Result<usize> {
        download_chapter(&self.client, chapter, dir, force_overwrite).await
    }

    /// Download every listed chapter of one tracked title that is not complete on disk yet.
    pub async fn sync_manga(&self, entry: &TrackedManga, base_dir: &Path, force_overwrite: bool) -> Result<SyncReport> {
        let manga = self
            .client
            .fetch_title(entry.id)
            .await
            .with_context(|| format!("fetching title {}", entry.id))?;
        let name = entry.title.as_deref().unwrap_or(&manga.title.name);
        let manga_dir = entry
            .download_dir
            .clone()
            .unwrap_or_else(|| base_dir.join(sanitize_file_name(name)));

        let mut report = SyncReport::default();
        for listed in manga.chapters() {
            report.chapters_seen += 1;
            let chapter_dir = manga_dir.join(sanitize_file_name(&listed.name));
            if !force_overwrite && path_exists(&chapter_dir.join(COMPLETE_MARKER)).await? { continue; }
            let chapter = self
                .client
                .fetch_chapter(listed.chapter_id, entry.quality)
                .await
                .with_context(|| format!("fetching chapter {}", listed.chapter_id))?;
            if chapter.pages.is_empty() {
                warn!(chapter = listed.chapter_id, "chapter has no image pages, skipping");
                continue;
            }
            report.pages_written += download_chapter(&self.client, &chapter, &chapter_dir, force_overwrite).await?;
            report.chapters_downloaded += 1;
        }
        info!(title = entry.id, name, seen = report.chapters_seen, downloaded = report.chapters_downloaded, "title synced");
        Ok(report)
    }

    /// Sync every tracked title. A failing title is logged and counted, the rest still run.
    pub async fn sync_all(&self, base_dir: &Path, force_overwrite: bool) -> SyncSummary {
        let mut summary = SyncSummary::default();
        for entry in &self.config.manga {
            match self.sync_manga(entry, base_dir, force_overwrite).await {
                Ok(report) => {
                    summary.synced += 1;
                    summary.chapters_downloaded += report.chapters_downloaded;
                    summary.pages_written += report.pages_written;
                }
                Err(e) => {
                    warn!(title = entry.id, "sync failed: {e:#}");
                    summary.failed += 1;
                }
            }
        }
        summary
    }
}

/// Fetch and decode every page of `chapter` into `dir` as `0001.<ext>`, `0002.<ext>`, ...
/// Existing files are kept unless `force_overwrite`. Pages are written to a `.part` file and
/// renamed into place; [`COMPLETE_MARKER`] is written after the last page.
/// Returns the number of files written.
pub async fn download_chapter<T: Transport>(
    client: &MangaPlusClient<T>,
    chapter: &Chapter,
    dir: &Path,
    force_overwrite: bool,
) -> Result<usize> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating {}", dir.display()))?;
    let mut written = 0;
    for (i, page) in chapter.pages.iter().enumerate() {
        let path = dir.join(format!("{:04}.{}", i + 1, page.file_extension()));
        if !force_overwrite && path_exists(&path).await? { continue; }
        let bytes = client
            .fetch_image(&page.image_url, &page.encryption_key)
            .await
            .with_context(|| format!("page {} of chapter {}", i + 1, chapter.chapter_id))?;
        let part = path.with_extension(format!("{}.part", page.file_extension()));
        tokio::fs::write(&part, &bytes)
            .await
            .with_context(|| format!("writing {}", part.display()))?;
        tokio::fs::rename(&part, &path)
            .await
            .with_context(|| format!("moving {} into place", path.display()))?;
        written += 1;
    }
    let marker = dir.join(COMPLETE_MARKER);
    tokio::fs::write(&marker, chapter.pages.len().to_string())
        .await
        .with_context(|| format!("writing {}", marker.display()))?;
    info!(chapter = chapter.chapter_id, name = %chapter.chapter_name, written, "chapter downloaded");
    Ok(written)
}

/// Download a single chapter by id outside of any tracked title.
/// Without `output_dir` the pages land in `<title name>/<chapter name>`.
pub async fn download_chapter_by_id<T: Transport>(
    client: &MangaPlusClient<T>,
    chapter_id: i64,
    quality: ImageQuality,
    output_dir: Option<PathBuf>,
    force_overwrite: bool,
) -> Result<(Chapter, usize)> {
    let chapter = client
        .fetch_chapter(chapter_id, quality)
        .await
        .with_context(|| format!("fetching chapter {chapter_id}"))?;
    let dir = output_dir.unwrap_or_else(|| {
        PathBuf::from(sanitize_file_name(&chapter.title_name)).join(sanitize_file_name(&chapter.chapter_name))
    });
    let written = download_chapter(client, &chapter, &dir, force_overwrite).await?;
    Ok((chapter, written))
}

async fn path_exists(path: &Path) -> Result<bool> {
    tokio::fs::try_exists(path)
        .await
        .with_context(|| format!("checking {}", path.display()))
}

/// Replace characters that are not allowed in file names on common platforms.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_end_matches('.').trim();
    if trimmed.is_empty() { "_".to_string() } else { trimmed.to_string() }
}
