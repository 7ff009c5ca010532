// src/ingest/mod.rs
pub mod json_dir;
pub mod types;

use crate::ingest::types::Post;
use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use std::fs;
use std::path::Path;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_posts_total", "Posts loaded from batch files.");
        describe_counter!("ingest_batches_loaded_total", "Batch files parsed successfully.");
        describe_counter!(
            "ingest_batches_skipped_total",
            "Batch files skipped due to read/parse errors."
        );
        describe_gauge!("ingest_last_run_ts", "Unix ts when batch loading last ran.");
    });
}

/// Normalize post text: entity decode, tag strip, quote folding, whitespace
/// collapse. Trailing punctuation is kept; exclamation marks feed the
/// sentiment scorer's emphasis rule.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 5) Length cap: 1500 chars
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}

/// Result of loading one topic directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub batches_loaded: usize,
    pub batches_skipped: usize,
}

/// Load every `DB_*.json` batch in `dir`, in filename order.
///
/// A batch that fails to read or parse is skipped with a warning; loading
/// fails only when no valid batch remains.
pub fn load_topic_batches(dir: &Path) -> Result<(Vec<Post>, BatchReport)> {
    ensure_metrics_described();

    let mut names: Vec<String> = fs::read_dir(dir)
        .with_context(|| format!("reading batch directory {}", dir.display()))?
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|n| n.starts_with("DB_") && n.ends_with(".json"))
        .collect();
    names.sort();

    let mut posts = Vec::new();
    let mut report = BatchReport {
        batches_loaded: 0,
        batches_skipped: 0,
    };

    for name in &names {
        let path = dir.join(name);
        let parsed = fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|raw| serde_json::from_str::<Vec<Post>>(&raw).map_err(Into::into));
        match parsed {
            Ok(batch) => {
                tracing::info!(batch = %name, posts = batch.len(), "batch loaded");
                report.batches_loaded += 1;
                posts.extend(batch.into_iter().map(|mut p| {
                    p.text = normalize_text(&p.text);
                    p
                }));
            }
            Err(e) => {
                tracing::warn!(batch = %name, error = ?e, "skipping unreadable batch");
                report.batches_skipped += 1;
            }
        }
    }

    if report.batches_loaded == 0 {
        anyhow::bail!(
            "no valid batches in {} ({} skipped)",
            dir.display(),
            report.batches_skipped
        );
    }

    counter!("ingest_posts_total").increment(posts.len() as u64);
    counter!("ingest_batches_loaded_total").increment(report.batches_loaded as u64);
    counter!("ingest_batches_skipped_total").increment(report.batches_skipped as u64);
    gauge!("ingest_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);

    Ok((posts, report))
}
