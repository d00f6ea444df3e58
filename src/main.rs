mod calibrate;
mod catalog;
mod classifier;
mod config;
mod db;
mod enrich;
mod export;
mod fetch;
mod normalize;
mod parser;
mod pipeline;
mod sources;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use classifier::{CompanyClassifier, UnknownPolicy};
use config::Settings;
use enrich::pacing::Pacing;
use enrich::recombine::default_rules;
use enrich::{BatchOptions, Enricher};
use fetch::Fetcher;
use parser::chunker::ProperNounChunker;
use pipeline::CandidatePipeline;

#[derive(Parser)]
#[command(name = "techscrape", about = "Find tech companies in news articles and enrich them with firmographics")]
struct Cli {
    /// SQLite record store
    #[arg(long, global = true, env = "TECHSCRAPE_DB", default_value = config::DEFAULT_DB_PATH)]
    db: PathBuf,
    /// Directory holding vocab.json and model.json
    #[arg(long, global = true, env = "TECHSCRAPE_MODEL_DIR", default_value = config::DEFAULT_MODEL_DIR)]
    model_dir: PathBuf,
    /// Proxy URL applied to every request
    #[arg(long, global = true, env = "TECHSCRAPE_PROXY")]
    proxy: Option<String>,
    /// Per-request timeout in seconds
    #[arg(long, global = true, env = "TECHSCRAPE_TIMEOUT", default_value_t = config::REQUEST_TIMEOUT.as_secs())]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl news sources for a query and list the company names found
    Search {
        /// Free-text query, e.g. "machine learning in healthcare"
        query: String,
        /// Source to crawl (repeatable)
        #[arg(short, long = "source", default_value = "sifted")]
        sources: Vec<String>,
        /// JSON file with extra source descriptors
        #[arg(long)]
        sources_file: Option<PathBuf>,
        #[command(flatten)]
        scoring: ScoringArgs,
        /// Enrich the names found and store them
        #[arg(long)]
        enrich: bool,
        #[command(flatten)]
        batch: BatchArgs,
    },
    /// Scrape the curated startup catalog
    Catalog {
        #[arg(long, default_value = catalog::CATALOG_URL)]
        url: String,
        /// Write the catalog as JSON
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Enrich the catalog companies and store them
        #[arg(long)]
        enrich: bool,
        #[command(flatten)]
        batch: BatchArgs,
    },
    /// Enrich company names (arguments or a file with one name per line)
    Enrich {
        names: Vec<String>,
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[command(flatten)]
        batch: BatchArgs,
    },
    /// Load a JSON export into the record store
    Import { path: PathBuf },
    /// Export the record store
    Export {
        #[arg(long)]
        json: Option<PathBuf>,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Show record store statistics
    Stats,
    /// Sweep thresholds over a labeled set and write the ROC curve
    Calibrate {
        /// CSV with company_name,is_biotech columns
        labeled: PathBuf,
        #[arg(short, long, default_value = "roc.csv")]
        out: PathBuf,
        #[arg(long, value_enum, default_value_t = UnknownPolicy::Substitute)]
        unknown: UnknownPolicy,
    },
}

#[derive(Args)]
struct ScoringArgs {
    /// Minimum classifier score to keep a name
    #[arg(short, long, default_value_t = config::DEFAULT_THRESHOLD)]
    threshold: f32,
    /// What to do with characters outside the vocabulary
    #[arg(long, value_enum, default_value_t = UnknownPolicy::Substitute)]
    unknown: UnknownPolicy,
}

#[derive(Args)]
struct BatchArgs {
    /// Names looked up per step
    #[arg(long, default_value_t = 1)]
    step_size: usize,
    /// Max names to look up this run (default: all pending)
    #[arg(short = 'n', long)]
    limit: Option<usize>,
    /// Seconds between steps before jitter
    #[arg(long, default_value_t = config::DEFAULT_BASE_DELAY_SECS)]
    base_delay: u64,
    /// Mean of the exponential jitter, in seconds
    #[arg(long, default_value_t = config::DEFAULT_JITTER_SCALE_SECS, value_parser = parse_jitter)]
    jitter: f64,
    /// Organization profile URL prefix
    #[arg(long, env = "TECHSCRAPE_ENRICH_ENDPOINT", default_value = config::ENRICH_ENDPOINT)]
    endpoint: String,
}

impl BatchArgs {
    fn options(&self) -> BatchOptions {
        BatchOptions {
            step_size: self.step_size,
            limit: self.limit,
            pacing: Pacing {
                base: Duration::from_secs(self.base_delay),
                jitter_scale: self.jitter,
            },
        }
    }
}

fn parse_jitter(raw: &str) -> Result<f64, String> {
    let v: f64 = raw.parse().map_err(|e| format!("{e}"))?;
    if !v.is_finite() || v < 0.0 {
        return Err(format!("{raw} is not a non-negative number of seconds"));
    }
    Ok(v)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings {
        db_path: cli.db,
        model_dir: cli.model_dir,
        proxy: cli.proxy,
        timeout: Duration::from_secs(cli.timeout),
    };

    let result = match cli.command {
        Commands::Search {
            query,
            sources,
            sources_file,
            scoring,
            enrich,
            batch,
        } => {
            let extra = match &sources_file {
                Some(p) => sources::load_file(p)?,
                None => Vec::new(),
            };
            let sources = sources::resolve(&sources, extra)?;
            let classifier = CompanyClassifier::load(&settings.vocab_path(), &settings.model_path())
                .context("loading classifier")?
                .with_threshold(scoring.threshold)
                .with_policy(scoring.unknown);
            let fetcher = Fetcher::new(settings.proxy.as_deref(), settings.timeout)?;

            let mut pipeline = CandidatePipeline::new(&fetcher, &classifier, &ProperNounChunker);
            let report = pipeline
                .run(&query, &sources)
                .await
                .with_context(|| format!("pipeline stopped while {}", pipeline.stage()))?;
            println!(
                "{} links, {} articles ({} failed), {} candidates, {} kept",
                report.links,
                report.branches_ok,
                report.branches_failed,
                report.candidates,
                report.companies.len()
            );
            for c in &report.companies {
                println!("  {:<32} {:.3}", c.name, c.score);
            }

            if enrich {
                enrich_names(&settings, &fetcher, &report.names(), &batch).await?;
            }
            Ok(())
        }
        Commands::Catalog {
            url,
            out,
            enrich,
            batch,
        } => {
            let fetcher = Fetcher::new(settings.proxy.as_deref(), settings.timeout)?;
            let categories = catalog::scrape(&fetcher, &url).await?;
            for c in &categories {
                println!("{} ({})", c.name, c.companies.len());
                for e in &c.companies {
                    println!("  {}", e.company);
                }
            }
            if let Some(path) = out {
                std::fs::write(&path, serde_json::to_string_pretty(&categories)?)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("Wrote {}", path.display());
            }
            if enrich {
                let names = catalog::company_names(&categories);
                enrich_names(&settings, &fetcher, &names, &batch).await?;
            }
            Ok(())
        }
        Commands::Enrich { names, file, batch } => {
            let mut names = names;
            if let Some(path) = file {
                names.extend(read_names(&path)?);
            }
            if names.is_empty() {
                println!("No names given. Pass names or --file.");
                return Ok(());
            }
            let fetcher = Fetcher::new(settings.proxy.as_deref(), settings.timeout)?;
            enrich_names(&settings, &fetcher, &names, &batch).await
        }
        Commands::Import { path } => {
            let conn = open_store(&settings)?;
            let records = export::read_json(&path)?;
            let n = db::save_records(&conn, &records)?;
            println!("Imported {} records from {}", n, path.display());
            Ok(())
        }
        Commands::Export { json, csv } => {
            if json.is_none() && csv.is_none() {
                println!("Nothing to do. Pass --json and/or --csv.");
                return Ok(());
            }
            let conn = open_store(&settings)?;
            let records = db::fetch_records(&conn)?;
            if let Some(path) = json {
                export::to_json(&records, &path)?;
                println!("Wrote {} records to {}", records.len(), path.display());
            }
            if let Some(path) = csv {
                export::to_csv(&records, &path)?;
                println!("Wrote {} records to {}", records.len(), path.display());
            }
            Ok(())
        }
        Commands::Stats => {
            let conn = open_store(&settings)?;
            let s = db::get_stats(&conn)?;
            println!("Records:   {}", s.records);
            println!("With data: {}", s.with_data);
            println!("Not found: {}", s.not_found);
            println!("Attempts:  {}", s.attempts);
            println!("Blocked:   {}", s.blocked);
            Ok(())
        }
        Commands::Calibrate {
            labeled,
            out,
            unknown,
        } => {
            let classifier = CompanyClassifier::load(&settings.vocab_path(), &settings.model_path())
                .context("loading classifier")?
                .with_policy(unknown);
            let rows = calibrate::read_labeled(&labeled)?;
            let curve = calibrate::sweep(&classifier, &rows);
            calibrate::write_roc(&curve, &out)?;
            println!("Wrote {} ROC points to {}", curve.len(), out.display());
            if let Some(best) = calibrate::best_threshold(&curve) {
                println!(
                    "Best threshold {:.2} (tpr {:.3}, fpr {:.3})",
                    best.threshold, best.tp, best.fp
                );
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn open_store(settings: &Settings) -> Result<rusqlite::Connection> {
    settings.ensure_db_dir()?;
    let conn = db::connect(&settings.db_path)?;
    db::init_schema(&conn)?;
    Ok(conn)
}

async fn enrich_names(settings: &Settings, fetcher: &Fetcher, names: &[String], batch: &BatchArgs) -> Result<()> {
    let conn = open_store(settings)?;
    let enricher = Enricher::new(fetcher, &batch.endpoint, default_rules());
    let stats = enrich::enrich_batch(&conn, &enricher, names, batch.options()).await?;
    println!(
        "Enriched {} ({} found, {} not found, {} failed, {} already stored)",
        stats.pending, stats.found, stats.not_found, stats.failed, stats.already_known
    );
    Ok(())
}

fn read_names(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect())
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
