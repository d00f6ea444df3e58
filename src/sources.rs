//! Declarative descriptors for the sites the pipeline can crawl.
//!
//! Each site is described by where to search, how to join query words, where
//! article pages live, and two patterns: one that pulls article-path fragments
//! out of a search-results page and one that pulls readable text out of an
//! article page. Adding or fixing a site only touches a descriptor.

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("unknown source '{0}'")]
    Unknown(String),

    #[error("invalid {field} pattern for source '{source_name}': {error}")]
    InvalidPattern {
        source_name: String,
        field: &'static str,
        error: regex::Error,
    },

    #[error("failed to read sources file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse sources file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Uncompiled descriptor, as written in a sources file.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSpec {
    pub name: String,
    pub search_url: String,
    #[serde(default = "default_separator")]
    pub separator: String,
    pub branch_url: String,
    pub link_pattern: String,
    pub text_pattern: String,
}

fn default_separator() -> String {
    "+".to_string()
}

/// A compiled source, ready for the pipeline.
#[derive(Debug, Clone)]
pub struct Source {
    pub name: String,
    pub search_url: String,
    pub separator: String,
    pub branch_url: String,
    pub links: Regex,
    pub text: Regex,
}

impl Source {
    pub fn compile(spec: &SourceSpec) -> Result<Self, SourceError> {
        let compile = |pattern: &str, field| {
            Regex::new(pattern).map_err(|error| SourceError::InvalidPattern {
                source_name: spec.name.clone(),
                field,
                error,
            })
        };
        Ok(Self {
            name: spec.name.clone(),
            search_url: spec.search_url.clone(),
            separator: spec.separator.clone(),
            branch_url: spec.branch_url.clone(),
            links: compile(&spec.link_pattern, "link")?,
            text: compile(&spec.text_pattern, "text")?,
        })
    }

    /// Full search URL for a free-text query.
    pub fn search_url_for(&self, query: &str) -> String {
        format!("{}{}", self.search_url, format_query(query, &self.separator))
    }

    /// Full article URL for a fragment captured from the search page.
    pub fn branch_url_for(&self, fragment: &str) -> String {
        format!("{}{}", self.branch_url, fragment)
    }
}

/// Percent-encode each word of the query and join them with the site's separator.
pub fn format_query(query: &str, separator: &str) -> String {
    query
        .split_whitespace()
        .map(|w| urlencoding::encode(w).into_owned())
        .collect::<Vec<_>>()
        .join(separator)
}

pub fn builtin() -> Vec<SourceSpec> {
    vec![
        SourceSpec {
            name: "sifted".into(),
            search_url: "https://sifted.eu/?s=".into(),
            separator: "+".into(),
            branch_url: "https://sifted.eu/articles/".into(),
            link_pattern: concat!(
                r#"<a href="https://sifted\.eu/articles/([a-z0-9\-]+/)" "#,
                r#"class="hover:text-(?:[a-z\-]+) sifted__analytics__latest-from-sifted""#,
                r#">(?:[:'",a-zA-Z0-9$£€? \-]+)</a>"#,
            )
            .into(),
            text_pattern: r#"<span style="font-weight: 400;">(.+?)</span>"#.into(),
        },
        SourceSpec {
            name: "biocentury".into(),
            search_url: "https://www.biocentury.com/search?q=".into(),
            separator: "%20".into(),
            branch_url: "https://www.biocentury.com/article/".into(),
            link_pattern: r#"<a href="/article/([0-9]+/[a-z0-9\-]+)""#.into(),
            text_pattern: r"<p>(.+?)</p>".into(),
        },
    ]
}

/// Read extra descriptors from a JSON array file.
pub fn load_file(path: &Path) -> Result<Vec<SourceSpec>, SourceError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Compile the requested sources, looking names up in `extra` first, then the built-ins.
pub fn resolve(names: &[String], extra: Vec<SourceSpec>) -> Result<Vec<Source>, SourceError> {
    let mut known: HashMap<String, SourceSpec> =
        builtin().into_iter().map(|s| (s.name.clone(), s)).collect();
    for spec in extra {
        known.insert(spec.name.clone(), spec);
    }

    names
        .iter()
        .map(|name| {
            let spec = known
                .get(&name.to_lowercase())
                .ok_or_else(|| SourceError::Unknown(name.clone()))?;
            Source::compile(spec)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_uses_site_separator() {
        assert_eq!(format_query("  machine learning in healthcare ", "+"), "machine+learning+in+healthcare");
        assert_eq!(format_query("drug discovery", "%20"), "drug%20discovery");
    }

    #[test]
    fn query_words_are_encoded() {
        assert_eq!(format_query("R&D spend", "+"), "R%26D+spend");
        assert_eq!(format_query("ai  #1", "%20"), "ai%20%231");
    }

    #[test]
    fn builtins_compile() {
        for spec in builtin() {
            Source::compile(&spec).unwrap();
        }
    }

    #[test]
    fn sifted_urls() {
        let s = resolve(&["sifted".into()], vec![]).unwrap().remove(0);
        assert_eq!(s.search_url_for("ai health"), "https://sifted.eu/?s=ai+health");
        assert_eq!(s.branch_url_for("some-story/"), "https://sifted.eu/articles/some-story/");
    }

    #[test]
    fn unknown_source_is_rejected() {
        let err = resolve(&["nowhere".into()], vec![]).unwrap_err();
        assert!(matches!(err, SourceError::Unknown(n) if n == "nowhere"));
    }

    #[test]
    fn bad_pattern_names_the_field() {
        let spec = SourceSpec {
            name: "broken".into(),
            search_url: "http://x/?q=".into(),
            separator: "+".into(),
            branch_url: "http://x/".into(),
            link_pattern: "(".into(),
            text_pattern: "ok".into(),
        };
        let err = Source::compile(&spec).unwrap_err();
        assert!(matches!(err, SourceError::InvalidPattern { field: "link", .. }));
    }

    #[test]
    fn sources_file_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.json");
        std::fs::write(
            &path,
            r#"[{"name":"sifted","search_url":"http://local/?s=","branch_url":"http://local/a/",
                "link_pattern":"href=\"/a/([a-z]+)\"","text_pattern":"<p>(.+?)</p>"}]"#,
        )
        .unwrap();

        let extra = load_file(&path).unwrap();
        let s = resolve(&["sifted".into()], extra).unwrap().remove(0);
        assert_eq!(s.search_url, "http://local/?s=");
        assert_eq!(s.separator, "+");
    }
}
