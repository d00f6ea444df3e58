//! Firmographic enrichment of confirmed company names.
//!
//! Each name is looked up on an organization-profile site. A not-found
//! response triggers the next respelling rule; a bot block stops the whole
//! batch. Requests are sequential and paced between steps.

pub mod fields;
pub mod pacing;
pub mod recombine;

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config;
use crate::db::{self, RecordStatus};
use crate::fetch::{FetchError, Fetcher};
use pacing::Pacing;
use recombine::MutationRule;

/// Scraped firmographics. Every field is the list of raw matches on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub total_funding: Vec<String>,
    pub n_employees: Vec<String>,
    pub series: Vec<String>,
    pub location: Vec<String>,
    pub website: Vec<String>,
}

impl CompanyRecord {
    pub fn is_empty(&self) -> bool {
        self.total_funding.is_empty()
            && self.n_employees.is_empty()
            && self.series.is_empty()
            && self.location.is_empty()
            && self.website.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupAttempt {
    pub name: String,
    /// `None` when no response arrived.
    pub status: Option<u16>,
    pub at: DateTime<Utc>,
}

impl LookupAttempt {
    fn now(name: &str, status: Option<u16>) -> Self {
        Self {
            name: name.to_string(),
            status,
            at: Utc::now(),
        }
    }
}

/// Every request made for one lookup, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttemptLog(Vec<LookupAttempt>);

impl AttemptLog {
    pub fn attempts(&self) -> &[LookupAttempt] {
        &self.0
    }

    fn push(&mut self, attempt: LookupAttempt) {
        self.0.push(attempt);
    }
}

impl fmt::Display for AttemptLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, a) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            match a.status {
                Some(s) => write!(f, "{} ({})", a.name, s)?,
                None => write!(f, "{} (no response)", a.name)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("blocked while looking up {name}: {log}")]
    Blocked { name: String, log: AttemptLog },

    #[error("no profile found for {name} after {} attempts: {log}", .log.attempts().len())]
    Exhausted { name: String, log: AttemptLog },

    #[error("request for {name} failed: {source}")]
    Transport {
        name: String,
        log: AttemptLog,
        #[source]
        source: FetchError,
    },

    #[error("unexpected status {status} for {name}: {log}")]
    UnexpectedStatus {
        name: String,
        status: u16,
        log: AttemptLog,
    },
}

impl EnrichError {
    pub fn log(&self) -> &AttemptLog {
        match self {
            EnrichError::Blocked { log, .. }
            | EnrichError::Exhausted { log, .. }
            | EnrichError::Transport { log, .. }
            | EnrichError::UnexpectedStatus { log, .. } => log,
        }
    }
}

/// A successful lookup.
#[derive(Debug)]
pub struct Found {
    /// The spelling that resolved.
    pub resolved: String,
    pub record: CompanyRecord,
    pub log: AttemptLog,
}

/// Slug form used on the profile site: lowercase, trimmed, spaces and `_` → `-`.
pub fn prepare_name(name: &str) -> String {
    name.trim().to_lowercase().replace([' ', '_'], "-")
}

pub struct Enricher<'a> {
    fetcher: &'a Fetcher,
    endpoint: String,
    referer: String,
    rules: Vec<MutationRule>,
}

impl<'a> Enricher<'a> {
    /// `endpoint` is the profile URL prefix; the slug is appended to it.
    pub fn new(fetcher: &'a Fetcher, endpoint: &str, rules: Vec<MutationRule>) -> Self {
        Self {
            fetcher,
            endpoint: endpoint.to_string(),
            referer: config::ENRICH_REFERER.to_string(),
            rules,
        }
    }

    /// Look one company up, respelling on not-found until the rules run out.
    ///
    /// Every not-found response consumes the next rule and retries, so a
    /// name that is never found costs exactly one request per rule plus the
    /// first. A rule that does not match retries the current spelling.
    pub async fn lookup(&self, raw_name: &str) -> Result<Found, EnrichError> {
        let mut name = prepare_name(raw_name);
        let mut log = AttemptLog::default();
        let mut rules = self.rules.iter();

        loop {
            let url = format!("{}{}", self.endpoint, name);
            let page = match self.fetcher.get_page(&url, Some(&self.referer)).await {
                Ok(page) => page,
                Err(source) => {
                    log.push(LookupAttempt::now(&name, None));
                    return Err(EnrichError::Transport { name, log, source });
                }
            };
            log.push(LookupAttempt::now(&name, Some(page.status.as_u16())));

            match page.status {
                s if s.is_success() => {
                    let record = fields::extract(&page.body);
                    return Ok(Found {
                        resolved: name,
                        record,
                        log,
                    });
                }
                StatusCode::FORBIDDEN => return Err(EnrichError::Blocked { name, log }),
                StatusCode::NOT_FOUND => {
                    warn!("{} not found", url);
                    let Some(rule) = rules.next() else {
                        return Err(EnrichError::Exhausted { name, log });
                    };
                    if let Some(next) = rule.apply(&name) {
                        name = next;
                    }
                }
                other => {
                    return Err(EnrichError::UnexpectedStatus {
                        name,
                        status: other.as_u16(),
                        log,
                    })
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub step_size: usize,
    pub limit: Option<usize>,
    pub pacing: Pacing,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            step_size: 1,
            limit: None,
            pacing: Pacing::default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchStats {
    pub pending: usize,
    pub already_known: usize,
    pub found: usize,
    pub not_found: usize,
    pub failed: usize,
}

/// Enrich every name not already in the store, saving as it goes.
///
/// A bot block stops the batch and is returned as the error; everything
/// stored before it stays stored.
pub async fn enrich_batch(
    conn: &Connection,
    enricher: &Enricher<'_>,
    names: &[String],
    opts: BatchOptions,
) -> anyhow::Result<BatchStats> {
    let known = db::known_names(conn)?;
    let mut seen = HashSet::new();
    let mut stats = BatchStats::default();

    let mut pending = Vec::new();
    for name in names {
        let key = prepare_name(name);
        if key.is_empty() || !seen.insert(key.clone()) {
            continue;
        }
        if known.contains(&key) {
            stats.already_known += 1;
            continue;
        }
        pending.push(key);
    }
    if let Some(limit) = opts.limit {
        pending.truncate(limit);
    }
    stats.pending = pending.len();
    info!(
        "Enriching {} names ({} already stored)",
        stats.pending, stats.already_known
    );

    let pb = ProgressBar::new(pending.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    for (step, chunk) in pending.chunks(opts.step_size.max(1)).enumerate() {
        if step > 0 {
            opts.pacing.wait().await;
        }
        for name in chunk {
            pb.set_message(name.clone());
            match enricher.lookup(name).await {
                Ok(found) => {
                    db::save_attempts(conn, &found.log)?;
                    db::save_record(conn, name, Some(&found.resolved), &found.record, RecordStatus::Found)?;
                    stats.found += 1;
                }
                Err(e @ EnrichError::Exhausted { .. }) => {
                    db::save_attempts(conn, e.log())?;
                    db::save_record(conn, name, None, &CompanyRecord::default(), RecordStatus::NotFound)?;
                    warn!("{}", e);
                    stats.not_found += 1;
                }
                Err(e @ EnrichError::Blocked { .. }) => {
                    db::save_attempts(conn, e.log())?;
                    pb.finish_and_clear();
                    return Err(e.into());
                }
                Err(e) => {
                    db::save_attempts(conn, e.log())?;
                    warn!("Skipping: {}", e);
                    stats.failed += 1;
                }
            }
            pb.inc(1);
        }
    }

    pb.finish_and_clear();
    info!(
        "Enriched {} ({} found, {} not found, {} failed)",
        stats.pending, stats.found, stats.not_found, stats.failed
    );
    Ok(stats)
}
