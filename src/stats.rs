//! Descriptive statistics over the per-post sentiment distribution.
//!
//! Conventions (fixed once, used everywhere): standard deviation is the
//! sample deviation (ddof = 1, 0.0 when fewer than two samples); quantiles
//! use linear interpolation between closest ranks.

use serde::{Deserialize, Serialize};

/// Summary block persisted inside the knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    #[serde(rename = "media_sentimiento")]
    pub mean: f64,
    #[serde(rename = "mediana_sentimiento")]
    pub median: f64,
    #[serde(rename = "desviacion_estandar")]
    pub std_dev: f64,
    #[serde(rename = "rango_intercuartil")]
    pub iqr: f64,
}

impl SummaryStats {
    /// Compute all four statistics over a score sample.
    /// An empty sample yields all-zero statistics; callers reject empty
    /// corpora before getting here.
    pub fn from_scores(scores: &[f64]) -> Self {
        if scores.is_empty() {
            return Self {
                mean: 0.0,
                median: 0.0,
                std_dev: 0.0,
                iqr: 0.0,
            };
        }
        let mut sorted = scores.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).expect("finite scores"));

        Self {
            mean: mean(scores),
            median: quantile(&sorted, 0.5),
            std_dev: sample_std_dev(scores),
            iqr: quantile(&sorted, 0.75) - quantile(&sorted, 0.25),
        }
    }
}

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample standard deviation (ddof = 1). Returns 0.0 for n < 2.
pub fn sample_std_dev(xs: &[f64]) -> f64 {
    let n = xs.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(xs);
    let var = xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (n - 1) as f64;
    var.sqrt()
}

/// Quantile with linear interpolation over an already sorted sample.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let q = q.clamp(0.0, 1.0);
    let pos = (sorted.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
