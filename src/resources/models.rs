//! Item models for the July list endpoints
//!
//! Every model tolerates missing optional fields and accepts ids written as
//! JSON strings or numbers.

use super::filters::InteractionType;
use crate::types::JsonValue;
use crate::view::Identify;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize an id that may be a JSON string or number
fn flexible_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match JsonValue::deserialize(deserializer)? {
        JsonValue::String(s) => Ok(s),
        JsonValue::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

fn flexible_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<JsonValue>::deserialize(deserializer)? {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s)),
        Some(JsonValue::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// Tags arrive as an array, a JSON-encoded array, or a comma separated string
fn flexible_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<JsonValue>::deserialize(deserializer)? {
        None | Some(JsonValue::Null) => Ok(Vec::new()),
        Some(JsonValue::Array(values)) => Ok(values
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect()),
        Some(JsonValue::String(s)) => {
            if let Ok(tags) = serde_json::from_str::<Vec<String>>(&s) {
                return Ok(tags);
            }
            Ok(s.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect())
        }
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected tag list, got {other}"
        ))),
    }
}

/// Knowledge base article (`/mind/knowledge`, `/mind/star/mine`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeItem {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "flexible_tags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub read_count: u64,
}

/// Community topic (`/topic`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default, deserialize_with = "flexible_opt_id")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub star_count: u64,
    #[serde(default)]
    pub create_time: Option<String>,
}

/// Comment under a topic (`/comment`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default, deserialize_with = "flexible_opt_id")]
    pub topic_id: Option<String>,
    #[serde(default, deserialize_with = "flexible_opt_id")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub create_time: Option<String>,
}

/// Star, hug or pat on a topic (`/star`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default, deserialize_with = "flexible_opt_id")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "flexible_opt_id")]
    pub topic_id: Option<String>,
    #[serde(default)]
    pub interaction_type: InteractionType,
    #[serde(default)]
    pub topic: Option<JsonValue>,
    #[serde(default)]
    pub create_time: Option<String>,
}

/// Daily emotion count (`/emotion/stat`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionStat {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub stat_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "flexible_opt_id")]
    pub emotion_label_id: Option<String>,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub emotion_label: Option<Label>,
}

/// User-written affirmation (`/soul/custom/list`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affirmation {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub create_time: Option<String>,
}

/// Emotion or topic label (`/label`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    #[serde(deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(rename = "type", default)]
    pub label_type: Option<String>,
    #[serde(default)]
    pub use_count: u64,
}

macro_rules! identify_by_id {
    ($($model:ty),+ $(,)?) => {
        $(
            impl Identify for $model {
                type Id = String;

                fn id(&self) -> String {
                    self.id.clone()
                }
            }
        )+
    };
}

identify_by_id!(KnowledgeItem, Topic, Comment, Star, EmotionStat, Affirmation, Label);
