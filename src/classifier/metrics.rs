use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RocPoint {
    pub threshold: f32,
    /// True-positive rate.
    pub tp: f64,
    /// False-positive rate.
    pub fp: f64,
}

/// True- and false-positive rates of `predictions` at one threshold.
///
/// A class with no members contributes a rate of 0.0.
pub fn roc_point(predictions: &[f32], targets: &[bool], threshold: f32) -> (f64, f64) {
    let (mut tp, mut fp, mut pos, mut neg) = (0usize, 0usize, 0usize, 0usize);
    for (&p, &t) in predictions.iter().zip(targets) {
        let predicted = p >= threshold;
        match (predicted, t) {
            (true, true) => tp += 1,
            (true, false) => fp += 1,
            _ => {}
        }
        if t {
            pos += 1;
        } else {
            neg += 1;
        }
    }
    (rate(tp, pos), rate(fp, neg))
}

fn rate(hits: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

/// ROC curve over thresholds 0.00, 0.01, … 0.99.
pub fn roc_sweep(predictions: &[f32], targets: &[bool]) -> Vec<RocPoint> {
    (0..100)
        .map(|step| {
            let threshold = step as f32 / 100.0;
            let (tp, fp) = roc_point(predictions, targets, threshold);
            RocPoint { threshold, tp, fp }
        })
        .collect()
}
