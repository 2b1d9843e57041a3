use cadm::api::AdminApi;
use cadm::cache::{CacheLayer, CacheStats};
use cadm::config::Config;
use cadm::domain::ScoreCardQuery;
use cadm::http::ProgressFn;
use cadm::logging;
use cadm::resource::{Operation, ResourceError};
use cadm::store::{AdminStore, FileDownload, FileUpload, TemplateDownload, TemplateUpload};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "cadm")]
#[command(about = "Command-line client for the compliance admin API")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/cadm/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Override api.base_url from the config file
  #[arg(long)]
  base_url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List companies, or show one by id
  Companies { id: Option<String> },
  /// List sites of a company, or show one by id
  Sites {
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    id: Option<String>,
  },
  /// List users, or show one by id
  Users { id: Option<String> },
  /// List activity masters, or show one by id
  Activities { id: Option<String> },
  /// List document templates
  Templates,
  /// Upload a document template
  UploadTemplate { name: String, path: PathBuf },
  /// Download a document template
  DownloadTemplate {
    id: String,
    #[arg(short, long)]
    out: Option<PathBuf>,
  },
  /// List uploaded files
  Files {
    #[arg(long)]
    folder: Option<String>,
  },
  /// Upload a file
  UploadFile {
    path: PathBuf,
    #[arg(long)]
    folder: Option<String>,
  },
  /// Download a file
  DownloadFile {
    id: String,
    #[arg(short, long)]
    out: Option<PathBuf>,
  },
  /// Delete a file
  DeleteFile { id: String },
  /// Score-card report for a date range
  Scorecard {
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    from: NaiveDate,
    #[arg(long)]
    to: NaiveDate,
  },
  /// Load the reference lists and show cache diagnostics
  Cache,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let _guard = logging::init("info")?;

  // Load configuration
  let config = Config::load(args.config.as_deref())?;

  // Override base URL if specified on command line
  let config = if let Some(base_url) = args.base_url {
    let mut config = config;
    config.api.base_url = base_url;
    config
  } else {
    config
  };

  let api = AdminApi::new(&config)?;
  let cache = CacheLayer::new();
  let store = AdminStore::new(api, cache, &config);

  info!("Running {:?}", args.command);
  run(&store, args.command).await
}

async fn run(store: &AdminStore, command: Command) -> Result<()> {
  match command {
    Command::Companies { id: Some(id) } => print(&run_op(store.companies.by_id(), id).await?),
    Command::Companies { id: None } => print(&run_op(store.companies.list(), None).await?),
    Command::Sites { id: Some(id), .. } => print(&run_op(store.sites.by_id(), id).await?),
    Command::Sites { company, id: None } => print(&run_op(store.sites.list(), company).await?),
    Command::Users { id: Some(id) } => print(&run_op(store.users.by_id(), id).await?),
    Command::Users { id: None } => print(&run_op(store.users.list(), None).await?),
    Command::Activities { id: Some(id) } => print(&run_op(store.activities.by_id(), id).await?),
    Command::Activities { id: None } => print(&run_op(store.activities.list(), None).await?),
    Command::Templates => print(&run_op(store.templates.list(), ()).await?),
    Command::UploadTemplate { name, path } => {
      let (file_name, bytes) = read_upload(&path).await?;
      let upload = TemplateUpload {
        name,
        file_name,
        bytes,
        on_progress: Some(progress_logger()),
      };
      print(&run_op(store.templates.upload(), upload).await?)
    }
    Command::DownloadTemplate { id, out } => {
      let path = run_op(store.templates.download(), TemplateDownload { id, target: out }).await?;
      print(&json!({ "path": path }))
    }
    Command::Files { folder } => print(&run_op(store.files.list(), folder).await?),
    Command::UploadFile { path, folder } => {
      let (file_name, bytes) = read_upload(&path).await?;
      let upload = FileUpload {
        folder,
        file_name,
        bytes,
        on_progress: Some(progress_logger()),
      };
      print(&run_op(store.files.upload(), upload).await?)
    }
    Command::DownloadFile { id, out } => {
      let path = run_op(store.files.download(), FileDownload { id, target: out }).await?;
      print(&json!({ "path": path }))
    }
    Command::DeleteFile { id } => {
      run_op(store.files.delete(), id.clone()).await?;
      print(&json!({ "deleted": id }))
    }
    Command::Scorecard { company, from, to } => {
      if from > to {
        return Err(eyre!("--from {} is after --to {}", from, to));
      }
      let query = ScoreCardQuery {
        company_id: company,
        from,
        to,
      };
      print(&run_op(store.score_card.report(), query).await?)
    }
    Command::Cache => {
      run_op(store.companies.list(), None).await?;
      run_op(store.users.list(), None).await?;
      run_op(store.activities.list(), None).await?;
      run_op(store.templates.list(), ()).await?;
      // Second pass is served from the cache
      run_op(store.companies.list(), None).await?;
      print(&stats_json(&store.cache().stats()))
    }
  }
}

/// Trigger an operation and turn its normalised error into a report.
async fn run_op<I, T>(op: &Operation<I, T>, input: I) -> Result<T>
where
  I: Clone + Send + Sync + 'static,
  T: Clone + Send + Sync + 'static,
{
  debug!(operation = op.name(), kind = ?op.kind(), "triggering");
  op.trigger(input)
    .await
    .map_err(|e: ResourceError| eyre!("{}: {}", op.name(), e))
}

fn print<T: Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

async fn read_upload(path: &Path) -> Result<(String, Vec<u8>)> {
  let file_name = path
    .file_name()
    .and_then(|n| n.to_str())
    .ok_or_else(|| eyre!("Not a file path: {}", path.display()))?
    .to_string();
  let bytes = tokio::fs::read(path)
    .await
    .map_err(|e| eyre!("Failed to read {}: {}", path.display(), e))?;
  Ok((file_name, bytes))
}

fn progress_logger() -> ProgressFn {
  Arc::new(|sent: u64, total: u64| debug!("Uploaded {}/{} bytes", sent, total))
}

fn stats_json(stats: &CacheStats) -> serde_json::Value {
  let entries: Vec<_> = stats
    .entries
    .iter()
    .map(|e| {
      json!({
        "key": e.key,
        "age_ms": e.age.as_millis() as u64,
        "ttl_ms": e.ttl.as_millis() as u64,
        "expired": e.expired,
        "stored_at": e.stored_at,
      })
    })
    .collect();
  json!({
    "entries": entries,
    "hits": stats.hits,
    "misses": stats.misses,
  })
}
