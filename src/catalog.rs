//! Curated startup catalog: one blog post listing AI drug-discovery startups
//! by category, each with a short descriptor block.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};

use crate::fetch::{FetchError, Fetcher};

pub const CATALOG_URL: &str =
    "https://blog.benchsci.com/startups-using-artificial-intelligence-in-drug-discovery";

/// How far past its heading the final category reaches.
const TAIL_SPAN: usize = 500;

static CATEGORY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"h3 style="clear: both;">(.+)</h3>"#).unwrap());

static COMPANY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a target="_blank" href="(?:.+)" rel="noopener">(.+)</a>.*?</h4>"#).unwrap()
});

static DESCRIPTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"<p><strong>Uses AI to</strong>: (.*?)\..*?",
        r"<strong>Allows researchers to</strong>: (.*?)\..*?",
        r"<strong>Founded</strong>: ([0-9]*?)\..*?",
        r"<strong>Headquarters</strong>: (.*?)\.",
    ))
    .unwrap()
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Descriptor {
    pub uses_ai_to: String,
    pub allows_researchers_to: String,
    pub founded: String,
    pub hq: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub company: String,
    pub descriptor: Option<Descriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    pub companies: Vec<CatalogEntry>,
}

pub async fn scrape(fetcher: &Fetcher, url: &str) -> Result<Vec<Category>, FetchError> {
    let page = fetcher.get_text(url).await?;
    let categories = parse(&page);
    info!(
        "Catalog: {} categories, {} companies",
        categories.len(),
        categories.iter().map(|c| c.companies.len()).sum::<usize>()
    );
    Ok(categories)
}

/// Split the page at category headings and pair each listed company with
/// the next descriptor block in document order.
pub fn parse(page: &str) -> Vec<Category> {
    let headings: Vec<_> = CATEGORY_RE.captures_iter(page).collect();
    let mut descriptors = DESCRIPTOR_RE.captures_iter(page).map(|c| Descriptor {
        uses_ai_to: c[1].to_string(),
        allows_researchers_to: c[2].to_string(),
        founded: c[3].to_string(),
        hq: c[4].to_string(),
    });

    let mut out = Vec::with_capacity(headings.len());
    for (i, heading) in headings.iter().enumerate() {
        let start = heading.get(0).map_or(0, |m| m.end());
        let end = match headings.get(i + 1).and_then(|h| h.get(0)) {
            Some(next) => next.start(),
            None => floor_char_boundary(page, start + TAIL_SPAN),
        };

        let companies = COMPANY_RE
            .captures_iter(&page[start..end])
            .map(|c| {
                let company = c[1].to_string();
                let descriptor = descriptors.next();
                if descriptor.is_none() {
                    warn!("No descriptor left for {}", company);
                }
                CatalogEntry { company, descriptor }
            })
            .collect();
        out.push(Category {
            name: heading[1].to_string(),
            companies,
        });
    }
    out
}

/// Every company name in catalog order.
pub fn company_names(categories: &[Category]) -> Vec<String> {
    categories
        .iter()
        .flat_map(|c| c.companies.iter().map(|e| e.company.clone()))
        .collect()
}

fn floor_char_boundary(s: &str, mut i: usize) -> usize {
    if i >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}
