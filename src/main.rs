//! Command line entry point running the inlining pass over a tag list exported by the
//! template generator.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use html_inline_source::{
  ArtifactTable, AssetTags, BuildContext, InlineConfig, InlineSource, MissingAssetPolicy,
  Placement,
};

#[derive(Debug, Parser)]
#[command(name = "html-inline-source", version, about)]
struct Cli {
  /// JSON file holding the `head` and `body` tag groups.
  #[arg(long)]
  tags: PathBuf,
  /// Build output directory artifacts are read from.
  #[arg(long)]
  output_dir: PathBuf,
  /// Public path prefix of emitted asset URLs (`auto` means none).
  #[arg(long)]
  public_path: Option<String>,
  /// Output filename of the HTML document, relative to the output directory.
  #[arg(long, default_value = "index.html")]
  filename: String,
  /// Pattern selecting the references to inline.
  #[arg(long)]
  inline_source: Option<String>,
  /// Handling of matching references without a build artifact.
  #[arg(long, value_enum)]
  missing_asset: Option<MissingAssetPolicy>,
  /// Group inlined tags are moved into.
  #[arg(long, value_enum)]
  inject_target: Option<Placement>,
  /// Configuration file; defaults to `inline-source.config.json` in the working directory.
  #[arg(long)]
  config: Option<PathBuf>,
  /// Write the resulting tag groups here instead of standard output.
  #[arg(long)]
  out: Option<PathBuf>,
  /// Log every resolution decision.
  #[arg(short, long)]
  verbose: bool,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let config = load_config(&cli)?;
  let context = BuildContext::new(&cli.output_dir, cli.public_path.as_deref(), &cli.filename);

  let tags_json = fs::read_to_string(&cli.tags)
    .with_context(|| format!("failed to read {}", cli.tags.display()))?;
  let tags: AssetTags = serde_json::from_str(&tags_json)
    .with_context(|| format!("failed to parse tag groups in {}", cli.tags.display()))?;

  let artifacts = ArtifactTable::scan_dir(&cli.output_dir)
    .with_context(|| format!("failed to scan {}", cli.output_dir.display()))?;
  tracing::debug!(artifacts = artifacts.len(), "Scanned build output");

  let result = InlineSource::new(config, context)
    .process_tags(tags, &artifacts)
    .context("inline source pass failed")?;
  let rendered = serde_json::to_string_pretty(&result)?;

  match &cli.out {
    Some(path) => {
      fs::write(path, rendered).with_context(|| format!("failed to write {}", path.display()))?
    }
    None => println!("{rendered}"),
  }

  Ok(())
}

fn load_config(cli: &Cli) -> Result<InlineConfig> {
  let mut config = match &cli.config {
    Some(path) => InlineConfig::load_from_path(path)?,
    None => {
      let cwd = std::env::current_dir().context("failed to resolve working directory")?;
      InlineConfig::discover(&cwd)?
    }
  };

  if let Some(pattern) = &cli.inline_source {
    config.inline_source = Some(pattern.clone());
  }
  if let Some(policy) = cli.missing_asset {
    config.missing_asset = policy;
  }
  if let Some(target) = cli.inject_target {
    config.inject_target = Some(target);
  }

  Ok(config)
}

fn init_tracing(verbose: bool) {
  let default_level = if verbose { "debug" } else { "warn" };
  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();
}
