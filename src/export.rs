use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::enrich::CompanyRecord;

/// Written wherever a field has no scraped value.
pub const NA: &str = "NA";

/// A field as it appears in the JSON export: the scraped list, or `"NA"`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Field {
    Values(Vec<String>),
    Missing(String),
}

impl From<&[String]> for Field {
    fn from(values: &[String]) -> Self {
        if values.is_empty() {
            Field::Missing(NA.to_string())
        } else {
            Field::Values(values.to_vec())
        }
    }
}

impl From<Field> for Vec<String> {
    fn from(field: Field) -> Self {
        match field {
            Field::Values(v) => v,
            Field::Missing(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ExportRecord {
    total_funding: Field,
    n_employees: Field,
    series: Field,
    location: Field,
    website: Field,
}

impl From<&CompanyRecord> for ExportRecord {
    fn from(r: &CompanyRecord) -> Self {
        Self {
            total_funding: r.total_funding.as_slice().into(),
            n_employees: r.n_employees.as_slice().into(),
            series: r.series.as_slice().into(),
            location: r.location.as_slice().into(),
            website: r.website.as_slice().into(),
        }
    }
}

impl From<ExportRecord> for CompanyRecord {
    fn from(r: ExportRecord) -> Self {
        Self {
            total_funding: r.total_funding.into(),
            n_employees: r.n_employees.into(),
            series: r.series.into(),
            location: r.location.into(),
            website: r.website.into(),
        }
    }
}

/// Pretty JSON object keyed by company, four-space indented.
pub fn to_json(records: &BTreeMap<String, CompanyRecord>, path: &Path) -> Result<()> {
    debug!("Exporting {} records to JSON: {}", records.len(), path.display());
    let out: BTreeMap<&str, ExportRecord> = records
        .iter()
        .map(|(name, r)| (name.as_str(), ExportRecord::from(r)))
        .collect();

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut ser = serde_json::Serializer::with_formatter(
        file,
        serde_json::ser::PrettyFormatter::with_indent(b"    "),
    );
    out.serialize(&mut ser)?;
    info!("Exported {} records to {}", records.len(), path.display());
    Ok(())
}

pub fn read_json(path: &Path) -> Result<BTreeMap<String, CompanyRecord>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let parsed: BTreeMap<String, ExportRecord> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    Ok(parsed.into_iter().map(|(k, v)| (k, v.into())).collect())
}

/// One row per company; first value of each field, all locations joined by `;`.
pub fn to_csv(records: &BTreeMap<String, CompanyRecord>, path: &Path) -> Result<()> {
    debug!("Exporting {} records to CSV: {}", records.len(), path.display());
    let mut wtr = Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;

    wtr.write_record([
        "company",
        "location",
        "n_employees",
        "last_funding",
        "total_funding",
        "website",
    ])?;
    for (name, r) in records {
        let location = if r.location.is_empty() {
            NA.to_string()
        } else {
            r.location.join(";")
        };
        wtr.write_record([
            name.as_str(),
            location.as_str(),
            first(&r.n_employees),
            first(&r.series),
            first(&r.total_funding),
            first(&r.website),
        ])?;
    }

    wtr.flush()?;
    info!("Exported {} records to {}", records.len(), path.display());
    Ok(())
}

fn first(values: &[String]) -> &str {
    values.first().map_or(NA, String::as_str)
}
