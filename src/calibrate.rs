use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::classifier::metrics::{roc_sweep, RocPoint};
use crate::classifier::CompanyClassifier;
use crate::normalize::normalize;

#[derive(Debug, Deserialize)]
struct LabeledRow {
    company_name: String,
    is_biotech: u8,
}

/// `company_name,is_biotech` rows as (name, is-company) pairs.
pub fn read_labeled(path: &Path) -> Result<Vec<(String, bool)>> {
    let mut rdr = csv::Reader::from_path(path).with_context(|| format!("opening {}", path.display()))?;
    let mut rows = Vec::new();
    for row in rdr.deserialize() {
        let row: LabeledRow = row?;
        rows.push((row.company_name, row.is_biotech != 0));
    }
    Ok(rows)
}

/// ROC curve of the classifier over a labeled set.
pub fn sweep(classifier: &CompanyClassifier, labeled: &[(String, bool)]) -> Vec<RocPoint> {
    let mut predictions = Vec::with_capacity(labeled.len());
    let mut targets = Vec::with_capacity(labeled.len());
    for (raw, target) in labeled {
        let name = normalize(raw);
        match classifier.score(&name) {
            Ok(p) => {
                predictions.push(p);
                targets.push(*target);
            }
            Err(e) => debug!("Not scored: {}", e),
        }
    }
    info!("Scored {} of {} labeled names", predictions.len(), labeled.len());
    roc_sweep(&predictions, &targets)
}

/// Threshold with the widest gap between true- and false-positive rate.
pub fn best_threshold(curve: &[RocPoint]) -> Option<RocPoint> {
    curve.iter().copied().fold(None, |best, p| match best {
        Some(b) if b.tp - b.fp >= p.tp - p.fp => Some(b),
        _ => Some(p),
    })
}

pub fn write_roc(curve: &[RocPoint], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for p in curve {
        wtr.serialize(p)?;
    }
    wtr.flush()?;
    Ok(())
}
