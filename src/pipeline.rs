//! Query → company names.
//!
//! Runs strictly in order: search page, article links, article pages, text,
//! entities, normalized names, scores. One request is in flight at a time.

use std::collections::BTreeSet;
use std::fmt;

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::classifier::{CompanyClassifier, ScoredName};
use crate::fetch::{FetchError, Fetcher};
use crate::normalize::normalize;
use crate::parser::{self, chunker::Chunker, links};
use crate::sources::Source;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("search on {source_name} failed: {source}")]
    Search {
        source_name: String,
        #[source]
        source: FetchError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Fetching,
    ExtractingLinks,
    FetchingBranches,
    Scrubbing,
    ExtractingEntities,
    Normalizing,
    Classifying,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Idle => "idle",
            Stage::Fetching => "fetching",
            Stage::ExtractingLinks => "extracting-links",
            Stage::FetchingBranches => "fetching-branches",
            Stage::Scrubbing => "scrubbing",
            Stage::ExtractingEntities => "extracting-entities",
            Stage::Normalizing => "normalizing",
            Stage::Classifying => "classifying",
            Stage::Done => "done",
        };
        f.write_str(s)
    }
}

/// What a run found, stage by stage.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub links: usize,
    pub branches_ok: usize,
    pub branches_failed: usize,
    pub candidates: usize,
    pub normalized: usize,
    pub companies: Vec<ScoredName>,
}

impl PipelineReport {
    pub fn names(&self) -> Vec<String> {
        self.companies.iter().map(|c| c.name.clone()).collect()
    }
}

pub struct CandidatePipeline<'a> {
    fetcher: &'a Fetcher,
    classifier: &'a CompanyClassifier,
    chunker: &'a dyn Chunker,
    stage: Stage,
}

impl<'a> CandidatePipeline<'a> {
    pub fn new(fetcher: &'a Fetcher, classifier: &'a CompanyClassifier, chunker: &'a dyn Chunker) -> Self {
        Self {
            fetcher,
            classifier,
            chunker,
            stage: Stage::Idle,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn enter(&mut self, stage: Stage) {
        debug!("pipeline: {} -> {}", self.stage, stage);
        self.stage = stage;
    }

    /// Crawl every source for `query` and return the names the classifier accepts.
    ///
    /// A failed search page aborts the run; a failed article page is skipped.
    pub async fn run(&mut self, query: &str, sources: &[Source]) -> Result<PipelineReport, PipelineError> {
        let mut report = PipelineReport::default();
        self.enter(Stage::Fetching);

        let mut searches = Vec::with_capacity(sources.len());
        for source in sources {
            let url = source.search_url_for(query);
            info!("Searching {}: {}", source.name, url);
            let page = self
                .fetcher
                .get_text(&url)
                .await
                .map_err(|source_err| PipelineError::Search {
                    source_name: source.name.clone(),
                    source: source_err,
                })?;
            searches.push((source, page));
        }

        self.enter(Stage::ExtractingLinks);
        let branches: Vec<(&Source, String)> = searches
            .iter()
            .flat_map(|(source, page)| {
                links::extract(page, &source.links)
                    .into_iter()
                    .map(move |fragment| (*source, source.branch_url_for(&fragment)))
            })
            .collect();
        report.links = branches.len();
        info!("Found {} article links", branches.len());
        if branches.is_empty() {
            self.enter(Stage::Done);
            return Ok(report);
        }

        self.enter(Stage::FetchingBranches);
        let pages = self.fetch_branches(&branches, &mut report).await;

        self.enter(Stage::Scrubbing);
        let texts: Vec<String> = pages
            .iter()
            .map(|(source, page)| parser::scrub::scrub(page, &source.text))
            .filter(|t| !t.is_empty())
            .collect();

        self.enter(Stage::ExtractingEntities);
        let candidates: BTreeSet<String> = texts
            .iter()
            .flat_map(|t| parser::entities::extract(t, self.chunker))
            .collect();
        report.candidates = candidates.len();

        self.enter(Stage::Normalizing);
        let normalized: BTreeSet<String> = candidates
            .iter()
            .map(|c| normalize(c))
            .filter(|n| !n.is_empty())
            .collect();
        report.normalized = normalized.len();

        self.enter(Stage::Classifying);
        report.companies = self.classifier.filter(normalized.iter().map(String::as_str));

        self.enter(Stage::Done);
        info!(
            "{} candidates, {} normalized, {} kept at threshold {:.2}",
            report.candidates,
            report.normalized,
            report.companies.len(),
            self.classifier.threshold
        );
        Ok(report)
    }

    async fn fetch_branches<'s>(
        &self,
        branches: &[(&'s Source, String)],
        report: &mut PipelineReport,
    ) -> Vec<(&'s Source, String)> {
        let pb = ProgressBar::new(branches.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}") {
            pb.set_style(style.progress_chars("=> "));
        }

        let mut pages = Vec::with_capacity(branches.len());
        for (source, url) in branches {
            match self.fetcher.get_text(url).await {
                Ok(body) => {
                    debug!("{} connected", url);
                    report.branches_ok += 1;
                    pages.push((*source, body));
                }
                Err(e) => {
                    warn!("Skipping article: {}", e);
                    report.branches_failed += 1;
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();
        pages
    }
}
