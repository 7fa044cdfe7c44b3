//! CLI entry point for the confex tool.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use confex_core::{
    ContentApi, ContentWalker, Credentials, ExportConfig, ExportOutcome, Exporter, Renderer,
    RestClient, RootTarget, RunSummary, TextLayoutRenderer, parse_root_url, resolve_base_url,
};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    // Recognize the root before touching credentials: an unparseable root
    // is fatal no matter what the environment holds.
    let target = parse_root_url(&args.root).context("could not recognize the export root")?;
    info!(kind = target.label(), "recognized export root");

    // A .env file in the working directory supplies credentials when the
    // environment does not.
    dotenvy::dotenv().ok();
    let credentials = Credentials::from_env().context("missing Confluence credentials")?;
    let base_url = resolve_base_url(&args.root).context("could not determine the site URL")?;

    let config = ExportConfig {
        base_url,
        output_root: args.output.clone(),
        show_progress: !args.no_progress && !args.quiet,
    };

    let api: Arc<dyn ContentApi> = Arc::new(RestClient::new(&config.base_url, &credentials));

    // Resolve the root against the API; failure here is the fatal class.
    let root = match &target {
        RootTarget::Page { id } | RootTarget::Folder { id } => api
            .content_info(id)
            .await
            .with_context(|| format!("could not resolve root content {id}"))?,
        RootTarget::Space { key } => api
            .space_info(key)
            .await
            .with_context(|| format!("could not resolve space {key}"))?,
    };
    info!(
        kind = root.kind.label(),
        id = %root.id,
        title = %root.title,
        "resolved export root"
    );

    let walker = ContentWalker::new(api.as_ref());
    let pages = walker.discover(&root).await;

    if pages.is_empty() {
        println!("No pages found under \"{}\"", root.title);
        return Ok(());
    }
    println!(
        "Exporting {} page(s) from \"{}\" to {}",
        pages.len(),
        root.title,
        config.output_root.display()
    );

    let renderer: Arc<dyn Renderer> = Arc::new(TextLayoutRenderer::new());
    let exporter = Exporter::new(Arc::clone(&api), renderer, &config);
    let results = exporter.run(&pages).await;

    let summary = RunSummary::from_results(&results);
    println!("Export complete: {summary}");
    println!("Output root: {}", config.output_root.display());

    for result in results
        .iter()
        .filter(|r| r.outcome != ExportOutcome::Success)
    {
        println!(
            "  {} \"{}\": {}",
            result.outcome.label(),
            result.title,
            result.failure_reason.as_deref().unwrap_or("unknown reason")
        );
    }

    // Individual page failures are reported above but never change the
    // exit code; only root resolution aborts the run.
    Ok(())
}
