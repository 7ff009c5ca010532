// src/ingest/types.rs
use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One collected post. Field names on the wire follow the upstream tabular
/// contract (`Fecha`/`Usuario`/`Texto`/...); derived values (sentiment,
/// engagement) are computed, never stored input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "Fecha", with = "fecha_format")]
    pub timestamp: NaiveDateTime,
    #[serde(rename = "Usuario")]
    pub author: String,
    #[serde(rename = "Texto")]
    pub text: String,
    #[serde(rename = "Likes", default)]
    pub likes: u64,
    #[serde(rename = "Retweets", default)]
    pub retweets: u64,
    #[serde(rename = "Respuestas", default)]
    pub replies: u64,
    #[serde(rename = "Idioma", default = "default_language")]
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

fn default_language() -> String {
    "es".to_string()
}

impl Post {
    /// Engagement weighting: retweets and replies carry more signal than
    /// likes. `likes + 2.0 * retweets + 1.5 * replies`.
    pub fn engagement_score(&self) -> f64 {
        self.likes as f64 + 2.0 * self.retweets as f64 + 1.5 * self.replies as f64
    }

    /// Calendar-month bucket key, `YYYY-MM`.
    pub fn month_key(&self) -> String {
        self.timestamp.format("%Y-%m").to_string()
    }
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS`, or a bare
/// date; serializes back as `YYYY-MM-DD HH:MM:SS`.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let s = raw.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }
    anyhow::bail!("unrecognized timestamp: {s:?}")
}

mod fecha_format {
    use super::parse_timestamp;
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&dt.format("%Y-%m-%d %H:%M:%S").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(de)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

#[async_trait::async_trait]
pub trait PostProvider {
    async fn fetch_posts(&self) -> Result<Vec<Post>>;
    fn name(&self) -> &'static str;
}
