use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use folio::cache::FsPlaintextStore;
use folio::core::config::{CacheConfig, ExtractionConfig, ExtractionStrategy};
use folio::{Document, OcrBackend};

/// Folio - extract per-page plaintext from PDFs, with OCR for pages without a text layer
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract a PDF into per-page documents
    Extract {
        /// Path to the PDF file
        file_path: PathBuf,

        /// Key used to look up and store the extracted plaintext
        #[arg(long)]
        cache_key: Option<String>,

        /// Plaintext cache directory (enables the cache)
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Look up the cache but never write to it
        #[arg(long)]
        no_write_back: bool,

        /// Configuration file (TOML, YAML or JSON); defaults to a discovered folio.toml
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Page extraction strategy
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,

        /// Comma-separated OCR language codes
        #[arg(long, value_delimiter = ',')]
        languages: Vec<String>,

        /// OCR model directory
        #[arg(long)]
        model_dir: Option<PathBuf>,

        /// Keep blank pages instead of running OCR
        #[arg(long)]
        no_ocr: bool,
    },

    /// Inspect or clear the plaintext cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Show entry count and size
    Stats {
        /// Plaintext cache directory
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },
    /// Remove every cached entry
    Clear {
        /// Plaintext cache directory
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Standard,
    OcrOnly,
}

impl From<StrategyArg> for ExtractionStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Standard => ExtractionStrategy::Standard,
            StrategyArg::OcrOnly => ExtractionStrategy::OcrOnly,
        }
    }
}

/// Command-line overrides applied on top of the loaded configuration.
#[derive(Debug, Default)]
struct Overrides {
    cache_dir: Option<PathBuf>,
    no_write_back: bool,
    strategy: Option<StrategyArg>,
    languages: Vec<String>,
    model_dir: Option<PathBuf>,
    no_ocr: bool,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ExtractionConfig> {
    match path {
        Some(path) => ExtractionConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(ExtractionConfig::discover()?.unwrap_or_default()),
    }
}

fn apply_overrides(mut config: ExtractionConfig, overrides: Overrides) -> ExtractionConfig {
    if let Some(dir) = overrides.cache_dir {
        config.cache.get_or_insert_with(CacheConfig::default).dir = Some(dir);
    }
    if overrides.no_write_back
        && let Some(cache) = config.cache.as_mut()
    {
        cache.write_back = false;
    }
    if let Some(strategy) = overrides.strategy {
        config.strategy = strategy.into();
    }
    if overrides.no_ocr {
        config.ocr = None;
    } else if let Some(ocr) = config.ocr.as_mut() {
        if !overrides.languages.is_empty() {
            ocr.languages = overrides.languages;
        }
        if let Some(dir) = overrides.model_dir {
            ocr.model_dir = Some(dir);
        }
    }
    config
}

fn ocr_backend() -> Option<Arc<dyn OcrBackend>> {
    #[cfg(feature = "tesseract")]
    {
        Some(Arc::new(folio::ocr::TesseractBackend::new()))
    }
    #[cfg(not(feature = "tesseract"))]
    {
        None
    }
}

/// Fail early with a usable hint when OCR is requested but this build has no
/// engine to run it.
fn require_ocr_engine(config: &ExtractionConfig, backend: Option<&Arc<dyn OcrBackend>>) -> anyhow::Result<()> {
    if config.ocr_config().is_some() && backend.is_none() {
        anyhow::bail!("OCR is enabled but this build has no OCR engine; rebuild with `--features tesseract` or pass --no-ocr");
    }
    Ok(())
}

fn render(documents: &[Document], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(documents
            .iter()
            .map(|doc| doc.page_content())
            .collect::<Vec<_>>()
            .join(folio::extractor::PAGE_SEPARATOR)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(documents)?),
    }
}

fn cache_store(cache_dir: Option<PathBuf>) -> anyhow::Result<FsPlaintextStore> {
    let config = CacheConfig {
        dir: cache_dir,
        ..Default::default()
    };
    let dir = config.resolved_dir()?;
    Ok(FsPlaintextStore::new(dir, None)?)
}

fn init_tracing() {
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Extract {
            file_path,
            cache_key,
            cache_dir,
            no_write_back,
            config,
            format,
            strategy,
            languages,
            model_dir,
            no_ocr,
        } => {
            let config = apply_overrides(
                load_config(config.as_ref())?,
                Overrides {
                    cache_dir,
                    no_write_back,
                    strategy,
                    languages,
                    model_dir,
                    no_ocr,
                },
            );

            let backend = ocr_backend();
            require_ocr_engine(&config, backend.as_ref())?;

            let documents = folio::extract_file(&file_path, cache_key.as_deref(), &config, backend)
                .await
                .with_context(|| format!("Failed to extract {}", file_path.display()))?;

            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", render(&documents, format)?)?;
        }
        Command::Cache { action } => match action {
            CacheAction::Stats { cache_dir } => {
                let store = cache_store(cache_dir)?;
                let stats = store.get_stats()?;
                println!("Cache directory: {}", store.cache_dir().display());
                println!("Entries: {}", stats.total_files);
                println!("Size: {:.2} MB", stats.total_size_mb);
                if stats.total_files > 0 {
                    println!("Oldest entry: {:.1} days", stats.oldest_file_age_days);
                    println!("Newest entry: {:.1} days", stats.newest_file_age_days);
                }
            }
            CacheAction::Clear { cache_dir } => {
                let store = cache_store(cache_dir)?;
                let (removed, freed_mb) = store.clear()?;
                println!("Removed {} entries ({:.2} MB)", removed, freed_mb);
            }
        },
    }

    Ok(())
}
