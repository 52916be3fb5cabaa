use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use pereskaz_core::generate::Generator;
use pereskaz_core::images::ImageClient;
use pereskaz_core::publish::MediumClient;
use pereskaz_core::transcript::TranscriptClient;
use pereskaz_core::youtube::YouTubeClient;
use pereskaz_core::{
    ApiKeys, AppConfig, ArticleStore, Language, PairStatus, PipelineController, VideoItem,
};

#[derive(Parser)]
#[command(name = "pereskaz")]
#[command(about = "List channel videos, retell them as long-form articles, and publish to Medium")]
struct Cli {
    /// Path to the TOML configuration file. Defaults to ./pereskaz.toml,
    /// falling back to the user config directory.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Process at most this many videos
    #[arg(short, long)]
    limit: Option<usize>,

    /// Override the configured inter-item delay, in seconds
    #[arg(long)]
    delay: Option<u64>,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn status_line(item: &VideoItem, language: Language, status: &PairStatus) -> String {
    let label = format!("{} [{}]", item.title, language);
    match status {
        PairStatus::Published(url) => format!(
            "{} {} → {}",
            style("✓").green().bold(),
            label,
            style(url).cyan()
        ),
        PairStatus::SavedUnpublished => format!(
            "{} {} {}",
            style("✓").green().bold(),
            label,
            style("(draft saved, publish failed)").dim()
        ),
        PairStatus::Resumed(url) => format!(
            "{} {} → {}",
            style("↻").yellow().bold(),
            label,
            style(url).cyan()
        ),
        PairStatus::ResumeDeferred => format!(
            "{} {} {}",
            style("↻").yellow(),
            label,
            style("(publish still failing)").dim()
        ),
        PairStatus::SkippedPublished => format!(
            "{} {} {}",
            style("•").dim(),
            label,
            style("(already published)").dim()
        ),
        PairStatus::NoTranscript => format!(
            "{} {} {}",
            style("-").dim(),
            label,
            style("(no transcript)").dim()
        ),
        PairStatus::Failed(reason) => format!(
            "{} {} {}",
            style("✗").red().bold(),
            label,
            style(reason).red()
        ),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pereskaz=info")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(|| {
        let local = PathBuf::from("pereskaz.toml");
        if local.exists() {
            local
        } else {
            pereskaz_core::config::default_config_path()
        }
    });
    let config = AppConfig::load(&config_path)?;

    // Validate API keys early
    let keys = match ApiKeys::from_env() {
        Ok(keys) => keys,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    println!(
        "\n{}  {}\n",
        style("pereskaz").cyan().bold(),
        style("Channel Retold").dim()
    );

    let youtube = YouTubeClient::new(keys.youtube.clone());
    let spinner = create_spinner("Listing channel videos...");
    let mut items = youtube.list_channel_videos(&config.channel.id).await?;
    if let Some(limit) = cli.limit {
        items.truncate(limit);
    }
    spinner.finish_with_message(format!(
        "{} {} videos to consider",
        style("✓").green().bold(),
        items.len()
    ));

    let delay = Duration::from_secs(cli.delay.unwrap_or(config.pipeline.delay_secs));
    let publication = config.publications.get(&config.niche).cloned();

    let controller = PipelineController::new(
        ArticleStore::new(&config.pipeline.articles_dir),
        Box::new(TranscriptClient::new(config.languages.source)),
        Box::new(Generator::new(
            keys.openai.clone(),
            config.models.clone(),
            config.niche,
        )),
        Box::new(ImageClient::new(
            keys.pexels.clone(),
            config.images.collection.clone(),
        )),
        Box::new(MediumClient::new(
            keys.medium.clone(),
            config.pipeline.publish_status,
            publication,
        )),
        delay,
    );

    let summary = controller
        .run(&items, &config.languages.outputs, |item, language, status| {
            println!("{}", status_line(item, language, status));
        })
        .await?;

    println!("\n{}", style("─".repeat(60)).dim());
    println!(
        "{} pairs: {} published, {} drafts, {} resumed, {} deferred, {} skipped, {} without transcript, {} failed",
        style(summary.total()).bold(),
        style(summary.published).green(),
        summary.saved_unpublished,
        summary.resumed,
        summary.resume_deferred,
        style(summary.skipped).dim(),
        summary.no_transcript,
        style(summary.failed).red()
    );

    Ok(())
}
