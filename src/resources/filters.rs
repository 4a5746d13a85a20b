//! Resource kinds and their filters
//!
//! A filter is the variable part of a list query. Converting it with
//! [`ListFilter::to_query`] validates it and drops empty values.

use super::models::{Affirmation, Comment, EmotionStat, KnowledgeItem, Star, Topic};
use crate::error::{Error, Result};
use crate::types::QueryParams;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Date format the backend expects for date parameters
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// List endpoints of the July backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Knowledge,
    MyStar,
    Topic,
    Comment,
    Star,
    EmotionStat,
    CustomAffirmation,
    Label,
}

impl ResourceKind {
    /// Every resource kind
    pub const ALL: [Self; 8] = [
        Self::Knowledge,
        Self::MyStar,
        Self::Topic,
        Self::Comment,
        Self::Star,
        Self::EmotionStat,
        Self::CustomAffirmation,
        Self::Label,
    ];

    /// Path relative to the API base URL
    pub fn path(self) -> &'static str {
        match self {
            Self::Knowledge => "/mind/knowledge",
            Self::MyStar => "/mind/star/mine",
            Self::Topic => "/topic",
            Self::Comment => "/comment",
            Self::Star => "/star",
            Self::EmotionStat => "/emotion/stat",
            Self::CustomAffirmation => "/soul/custom/list",
            Self::Label => "/label",
        }
    }

    /// Name used in config files and on the command line
    pub fn name(self) -> &'static str {
        match self {
            Self::Knowledge => "knowledge",
            Self::MyStar => "my_star",
            Self::Topic => "topic",
            Self::Comment => "comment",
            Self::Star => "star",
            Self::EmotionStat => "emotion_stat",
            Self::CustomAffirmation => "custom_affirmation",
            Self::Label => "label",
        }
    }

    /// Whether the endpoint pages its results
    pub fn is_paginated(self) -> bool {
        self != Self::Label
    }

    /// Page size the mobile client uses for this list, if it differs from the global one
    pub fn default_page_size(self) -> Option<u32> {
        match self {
            Self::Knowledge => Some(16),
            Self::EmotionStat => Some(20),
            Self::CustomAffirmation => Some(50),
            _ => None,
        }
    }

    /// Field of the response payload holding the items, if not the default
    pub fn default_items_field(self) -> Option<&'static str> {
        match self {
            Self::EmotionStat => Some("stats"),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|k| k.name()).collect();
                Error::config(format!(
                    "Unknown resource '{s}'. Expected one of: {}",
                    names.join(", ")
                ))
            })
    }
}

/// Kind of interaction recorded by a star
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InteractionType {
    #[default]
    Star,
    Hug,
    Pat,
}

impl InteractionType {
    /// Wire value sent as `interaction_type`
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Star => "STAR",
            Self::Hug => "HUG",
            Self::Pat => "PAT",
        }
    }
}

impl FromStr for InteractionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "STAR" => Ok(Self::Star),
            "HUG" => Ok(Self::Hug),
            "PAT" => Ok(Self::Pat),
            _ => Err(Error::invalid_query(
                "interaction_type",
                format!("'{s}' is not one of STAR, HUG, PAT"),
            )),
        }
    }
}

/// Typed filter for one paginated resource
pub trait ListFilter {
    /// Item model of the list
    type Item: DeserializeOwned + Clone + Send + Sync;

    /// Resource the filter applies to
    const KIND: ResourceKind;

    /// Validate and convert to query parameters
    fn to_query(&self) -> Result<QueryParams>;
}

/// Insert a parameter unless the value is missing or blank
fn put(query: &mut QueryParams, key: &str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        query.insert(key.to_string(), value.to_string());
    }
}

/// Knowledge base search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeFilter {
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
}

impl KnowledgeFilter {
    /// Match titles and content containing `keyword`
    #[must_use]
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Restrict to one category
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Restrict to items carrying `tag`
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

impl ListFilter for KnowledgeFilter {
    type Item = KnowledgeItem;
    const KIND: ResourceKind = ResourceKind::Knowledge;

    fn to_query(&self) -> Result<QueryParams> {
        let mut query = QueryParams::new();
        put(&mut query, "keyword", self.keyword.as_deref());
        put(&mut query, "category", self.category.as_deref());
        put(&mut query, "tag", self.tag.as_deref());
        Ok(query)
    }
}

/// Knowledge items the current user starred
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MyStarFilter;

impl ListFilter for MyStarFilter {
    type Item = KnowledgeItem;
    const KIND: ResourceKind = ResourceKind::MyStar;

    fn to_query(&self) -> Result<QueryParams> {
        Ok(QueryParams::new())
    }
}

/// Topic feed, optionally narrowed to one author or label
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicFilter {
    pub user_id: Option<String>,
    pub label_id: Option<String>,
}

impl ListFilter for TopicFilter {
    type Item = Topic;
    const KIND: ResourceKind = ResourceKind::Topic;

    fn to_query(&self) -> Result<QueryParams> {
        let mut query = QueryParams::new();
        put(&mut query, "user_id", self.user_id.as_deref());
        put(&mut query, "label_id", self.label_id.as_deref());
        Ok(query)
    }
}

/// Comments of a topic or by a user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentFilter {
    pub topic_id: Option<String>,
    pub user_id: Option<String>,
}

impl ListFilter for CommentFilter {
    type Item = Comment;
    const KIND: ResourceKind = ResourceKind::Comment;

    fn to_query(&self) -> Result<QueryParams> {
        let mut query = QueryParams::new();
        put(&mut query, "topic_id", self.topic_id.as_deref());
        put(&mut query, "user_id", self.user_id.as_deref());
        Ok(query)
    }
}

/// Stars, hugs and pats
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StarFilter {
    pub topic_id: Option<String>,
    pub user_id: Option<String>,
    pub interaction_type: Option<InteractionType>,
}

impl ListFilter for StarFilter {
    type Item = Star;
    const KIND: ResourceKind = ResourceKind::Star;

    fn to_query(&self) -> Result<QueryParams> {
        let mut query = QueryParams::new();
        put(&mut query, "topic_id", self.topic_id.as_deref());
        put(&mut query, "user_id", self.user_id.as_deref());
        put(
            &mut query,
            "interaction_type",
            self.interaction_type.map(InteractionType::as_str),
        );
        Ok(query)
    }
}

/// Emotion statistics over the last `days` days or an explicit date range
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmotionStatFilter {
    pub days: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl EmotionStatFilter {
    /// Stats for the last `days` days
    pub fn last_days(days: u32) -> Self {
        Self {
            days: Some(days),
            ..Self::default()
        }
    }

    /// Stats from `start_date` to `end_date`
    pub fn range(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            days: None,
            start_date: Some(start_date),
            end_date: Some(end_date),
        }
    }
}

impl ListFilter for EmotionStatFilter {
    type Item = EmotionStat;
    const KIND: ResourceKind = ResourceKind::EmotionStat;

    fn to_query(&self) -> Result<QueryParams> {
        let mut query = QueryParams::new();
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => {
                if start > end {
                    return Err(Error::invalid_query(
                        "start_date",
                        format!("{start} is after end_date {end}"),
                    ));
                }
                query.insert("start_date".into(), start.format(DATE_FORMAT).to_string());
                query.insert("end_date".into(), end.format(DATE_FORMAT).to_string());
            }
            (None, None) => {}
            (Some(_), None) => {
                return Err(Error::invalid_query("end_date", "required with start_date"));
            }
            (None, Some(_)) => {
                return Err(Error::invalid_query("start_date", "required with end_date"));
            }
        }
        match self.days {
            Some(0) => return Err(Error::invalid_query("days", "must be at least 1")),
            Some(days) => {
                query.insert("days".into(), days.to_string());
            }
            None => {}
        }
        Ok(query)
    }
}

/// Affirmations the current user wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CustomAffirmationFilter;

impl ListFilter for CustomAffirmationFilter {
    type Item = Affirmation;
    const KIND: ResourceKind = ResourceKind::CustomAffirmation;

    fn to_query(&self) -> Result<QueryParams> {
        Ok(QueryParams::new())
    }
}

/// Parse a `YYYY-MM-DD` date parameter
pub fn parse_date(param: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| Error::invalid_query(param, format!("'{value}' is not YYYY-MM-DD: {e}")))
}
