//! Core data models used by the library.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields requested from the index when the caller does not choose.
pub const DEFAULT_SELECT: &[&str] = &["title", "chunk"];

/// How a textual question is turned into a search request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Full-text search only.
    Keyword,
    /// Nearest neighbours of the query embedding only.
    Vector,
    /// Both; the service fuses the two rankings.
    #[default]
    Hybrid,
}

impl SearchMode {
    /// `true` when the question must be embedded first.
    pub fn needs_embedding(self) -> bool {
        !matches!(self, SearchMode::Keyword)
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SearchMode::Keyword => "keyword",
            SearchMode::Vector => "vector",
            SearchMode::Hybrid => "hybrid",
        })
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyword" | "text" => Ok(SearchMode::Keyword),
            "vector" => Ok(SearchMode::Vector),
            "hybrid" => Ok(SearchMode::Hybrid),
            other => Err(format!(
                "unknown search mode `{other}` (expected keyword, vector or hybrid)"
            )),
        }
    }
}

/// A ready query embedding plus the neighbour count.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorQuery {
    pub vector: Vec<f32>,
    pub k_nearest_neighbors: usize,
}

/// Shape of one search request. Constructed through [`SearchQuery`] helpers,
/// so a vector query always carries its embedding.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryKind {
    Keyword { text: String },
    Vector(VectorQuery),
    Hybrid { text: String, vector: VectorQuery },
}

/// Query parameters for one search call.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchQuery {
    pub kind: QueryKind,
    pub top_k: usize,
    pub select: Vec<String>,
}

impl SearchQuery {
    pub fn keyword(text: impl Into<String>, top_k: usize) -> Self {
        Self::with_kind(QueryKind::Keyword { text: text.into() }, top_k)
    }

    pub fn vector(vector: VectorQuery, top_k: usize) -> Self {
        Self::with_kind(QueryKind::Vector(vector), top_k)
    }

    pub fn hybrid(text: impl Into<String>, vector: VectorQuery, top_k: usize) -> Self {
        Self::with_kind(
            QueryKind::Hybrid {
                text: text.into(),
                vector,
            },
            top_k,
        )
    }

    /// Replaces the selected fields.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn mode(&self) -> SearchMode {
        match self.kind {
            QueryKind::Keyword { .. } => SearchMode::Keyword,
            QueryKind::Vector(_) => SearchMode::Vector,
            QueryKind::Hybrid { .. } => SearchMode::Hybrid,
        }
    }

    fn with_kind(kind: QueryKind, top_k: usize) -> Self {
        Self {
            kind,
            top_k,
            select: DEFAULT_SELECT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A single retrieval hit with score, title, content and the raw selected fields.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchHit {
    pub score: f32,
    pub title: String,
    pub content: String,
    pub fields: Map<String, Value>,
}

impl SearchHit {
    /// Builds a hit from one `value[]` entry of the search response.
    ///
    /// `chunk` is the content field; `content` is accepted as a fallback.
    pub(crate) fn from_document(score: f32, fields: Map<String, Value>) -> Self {
        let text = |key: &str| {
            fields
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Self {
            score,
            title: text("title").unwrap_or_default(),
            content: text("chunk").or_else(|| text("content")).unwrap_or_default(),
            fields,
        }
    }

    /// First `max_chars` characters of the content, for previews.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut out: String = self.content.chars().take(max_chars).collect();
        if self.content.chars().count() > max_chars {
            out.push_str("...");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!(" Hybrid ".parse::<SearchMode>(), Ok(SearchMode::Hybrid));
        assert_eq!("KEYWORD".parse::<SearchMode>(), Ok(SearchMode::Keyword));
        assert!("semantic".parse::<SearchMode>().is_err());
        assert!(!SearchMode::Keyword.needs_embedding());
    }

    #[test]
    fn hit_reads_title_and_chunk() {
        let doc = json!({"title": "Benefit_Options.pdf", "chunk": "Dental is covered."});
        let Value::Object(map) = doc else { unreachable!() };
        let hit = SearchHit::from_document(1.5, map);
        assert_eq!(hit.title, "Benefit_Options.pdf");
        assert_eq!(hit.content, "Dental is covered.");
        assert_eq!(hit.preview(6), "Dental...");
    }
}
