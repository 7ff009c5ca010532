// src/ingest/json_dir.rs
//! Batch-directory provider: yields every post stored under a topic
//! directory as `DB_*.json` files.

use std::path::PathBuf;

use anyhow::Result;

use crate::ingest::types::{Post, PostProvider};

#[derive(Debug, Clone)]
pub struct JsonDirProvider {
    dir: PathBuf,
}

impl JsonDirProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait::async_trait]
impl PostProvider for JsonDirProvider {
    async fn fetch_posts(&self) -> Result<Vec<Post>> {
        let (posts, report) = super::load_topic_batches(&self.dir)?;
        tracing::debug!(
            loaded = report.batches_loaded,
            skipped = report.batches_skipped,
            "json_dir fetch complete"
        );
        Ok(posts)
    }

    fn name(&self) -> &'static str {
        "json_dir"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn provider_surfaces_directory_errors() {
        let p = JsonDirProvider::new("/definitely/not/here");
        assert!(p.fetch_posts().await.is_err());
    }
}
