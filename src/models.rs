use serde::{Deserialize, Serialize};

use crate::entities::movie;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub year: Option<i32>,
    pub watched: bool,
    pub rating: Option<i32>,
    /// Epoch milliseconds.
    pub created_at: i64,
}

impl From<movie::Model> for Movie {
    fn from(m: movie::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            year: m.year,
            watched: m.watched,
            rating: m.rating,
            created_at: m.created_at,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    CreatedAt,
    Year,
    Title,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchedFilter {
    #[default]
    All,
    Watched,
    Unwatched,
}

impl WatchedFilter {
    pub fn matches(self, watched: bool) -> bool {
        match self {
            WatchedFilter::All => true,
            WatchedFilter::Watched => watched,
            WatchedFilter::Unwatched => !watched,
        }
    }
}

/// A numeric form field as typed by the user: either a JSON number or text.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FormNumber {
    Number(serde_json::Number),
    Text(String),
}

/// Raw add/edit input, validated into a [`MovieDraft`] before persistence.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MovieForm {
    pub title: String,
    #[serde(default)]
    pub year: Option<FormNumber>,
    #[serde(default)]
    pub rating: Option<FormNumber>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MovieDraft {
    pub title: String,
    pub year: Option<i32>,
    pub rating: Option<i32>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub filter: WatchedFilter,
    pub sort: Option<SortBy>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ListSnapshot {
    pub loading: bool,
    pub sort_by: SortBy,
    pub total: usize,
    pub watched: usize,
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct SortRequest {
    pub sort_by: SortBy,
}
