mod cli;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use clocktower::api::{title_url, viewer_url, MangaPlusClient};
use clocktower::config::Config;
use clocktower::tracker::{download_chapter_by_id, Tracker};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Title { id, json } => {
            let client = MangaPlusClient::new()?;
            let manga = client.fetch_title(id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&manga)?);
            } else {
                println!("{} by {} ({})", manga.title.name, manga.title.author, title_url(id));
                if let Some(desc) = &manga.viewing_period_description { println!("{}", desc); }
                for c in manga.chapters() {
                    let sub = c.sub_title.as_deref().unwrap_or("");
                    println!("  {:>8}  {:<8} {}", c.chapter_id, c.name, sub);
                }
            }
        }
        Commands::Chapter { id, quality, json } => {
            let client = MangaPlusClient::new()?;
            let chapter = client.fetch_chapter(id, quality).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&chapter)?);
            } else {
                println!("{} {} ({})", chapter.title_name, chapter.chapter_name, viewer_url(id));
                println!("{} pages, {} comments", chapter.pages.len(), chapter.number_of_comments);
                for (i, p) in chapter.pages.iter().enumerate() {
                    println!("  {:>3}  {}x{}  {}", i + 1, p.width, p.height, p.image_url);
                }
            }
        }
        Commands::Download { id, quality, output, force } => {
            let client = MangaPlusClient::new()?;
            let (chapter, written) = download_chapter_by_id(&client, id, quality, output, force).await?;
            println!("{} {}: {} of {} pages written", chapter.title_name, chapter.chapter_name, written, chapter.pages.len());
        }
        Commands::Sync { config, output, force } => {
            let config = load_config(config)?;
            let tracker = Tracker::new(MangaPlusClient::new()?, config);
            let summary = tracker.sync_all(&output, force).await;
            println!(
                "synced {} titles ({} failed): {} chapters, {} pages",
                summary.synced, summary.failed, summary.chapters_downloaded, summary.pages_written
            );
            if summary.failed > 0 {
                anyhow::bail!("{} titles failed to sync", summary.failed);
            }
        }
        Commands::Config { config } => {
            let config = load_config(config)?;
            for m in &config.manga {
                println!(
                    "{:>8}  quality={}  title={}  dir={}",
                    m.id,
                    m.quality,
                    m.title.as_deref().unwrap_or("-"),
                    m.download_dir.as_ref().map(|d| d.display().to_string()).unwrap_or_else(|| "-".to_string()),
                );
            }
            match &config.komga {
                Some(k) => println!("komga: {} as {}", k.base_url, k.username),
                None => println!("komga: not configured"),
            }
        }
    }
    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = match path {
        Some(p) => p,
        None => Config::default_path()?,
    };
    Config::load(&path).with_context(|| format!("loading config {}", path.display()))
}
