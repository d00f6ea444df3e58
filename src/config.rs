use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DB_PATH: &str = "data/techscrape.sqlite";
pub const DEFAULT_MODEL_DIR: &str = "models";
pub const VOCAB_FILE: &str = "vocab.json";
pub const MODEL_FILE: &str = "model.json";

pub const DEFAULT_THRESHOLD: f32 = 0.46;

pub const ENRICH_ENDPOINT: &str = "https://www.crunchbase.com/organization/";
pub const ENRICH_REFERER: &str = "https://www.crunchbase.com/";

/// Seconds slept between enrichment steps before jitter is added.
pub const DEFAULT_BASE_DELAY_SECS: u64 = 60;
/// Scale (mean) of the exponential jitter, in seconds.
pub const DEFAULT_JITTER_SCALE_SECS: f64 = 20.0;

pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/90.0.4430.212 Safari/537.36";
pub const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,\
    image/avif,image/webp,image/apng,*/*;q=0.8";
pub const ACCEPT_LANGUAGE: &str = "en-GB,en-US;q=0.9,en;q=0.8";

/// Per-request timeout unless `--timeout` says otherwise.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Runtime settings shared by every command.
#[derive(Debug, Clone)]
pub struct Settings {
    pub db_path: PathBuf,
    pub model_dir: PathBuf,
    pub proxy: Option<String>,
    pub timeout: Duration,
}

impl Settings {
    pub fn vocab_path(&self) -> PathBuf {
        self.model_dir.join(VOCAB_FILE)
    }

    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(MODEL_FILE)
    }

    pub fn ensure_db_dir(&self) -> std::io::Result<()> {
        match self.db_path.parent() {
            Some(dir) if dir != Path::new("") => std::fs::create_dir_all(dir),
            _ => Ok(()),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            proxy: None,
            timeout: REQUEST_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_paths_live_in_model_dir() {
        let s = Settings {
            model_dir: PathBuf::from("/opt/ts"),
            ..Default::default()
        };
        assert_eq!(s.vocab_path(), PathBuf::from("/opt/ts/vocab.json"));
        assert_eq!(s.model_path(), PathBuf::from("/opt/ts/model.json"));
    }

    #[test]
    fn bare_db_filename_needs_no_dir() {
        let s = Settings {
            db_path: PathBuf::from("records.sqlite"),
            ..Default::default()
        };
        assert!(s.ensure_db_dir().is_ok());
    }
}
