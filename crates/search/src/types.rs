//! Search request and result types.

use chatread_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Caption request used when semantic captions are wanted.
pub const EXTRACTIVE_CAPTIONS: &str = "extractive|highlight-false";

/// How the service should interpret the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    /// Plain keyword search
    Simple,
    /// Keyword retrieval re-ranked by the service's semantic ranker
    Semantic,
}

/// Parameters that only apply to semantic queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticOptions {
    /// Query language (e.g., "ja-jp")
    pub query_language: String,

    /// Speller mode (e.g., "none", "lexicon")
    pub speller: String,

    /// Semantic configuration defined on the index
    pub configuration: String,

    /// Caption mode, when captions are requested
    pub captions: Option<String>,
}

/// One query against the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Query text
    pub search: String,

    /// OData filter expression
    pub filter: Option<String>,

    /// Maximum number of documents to return
    pub top: u32,

    /// Semantic ranking parameters; `None` means keyword search
    pub semantic: Option<SemanticOptions>,
}

impl SearchRequest {
    /// A plain keyword query.
    pub fn keyword(search: impl Into<String>, top: u32) -> Self {
        Self {
            search: search.into(),
            filter: None,
            top,
            semantic: None,
        }
    }

    /// A semantically ranked query.
    pub fn semantic(search: impl Into<String>, top: u32, options: SemanticOptions) -> Self {
        Self {
            semantic: Some(options),
            ..Self::keyword(search, top)
        }
    }

    /// Restrict results with an OData filter.
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    /// Query type implied by the request.
    pub fn query_type(&self) -> QueryType {
        if self.semantic.is_some() {
            QueryType::Semantic
        } else {
            QueryType::Simple
        }
    }
}

/// An extractive caption attached to a semantic hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCaption {
    /// Caption text
    pub text: String,

    /// Caption with highlight markup, if requested
    #[serde(default)]
    pub highlights: Option<String>,
}

/// A document returned by the search service, in service relevance order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    /// Keyword relevance score
    #[serde(rename = "@search.score", default)]
    pub score: Option<f64>,

    /// Semantic ranker score
    #[serde(rename = "@search.rerankerScore", default)]
    pub reranker_score: Option<f64>,

    #[serde(rename = "@search.captions", default)]
    captions: Option<Vec<SearchCaption>>,

    /// Index fields
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl SearchDocument {
    /// Build a document from fields (used by tests and non-REST clients).
    pub fn new(fields: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            score: None,
            reranker_score: None,
            captions: None,
            fields,
        }
    }

    /// Attach captions.
    pub fn with_captions<I, S>(mut self, captions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.captions = Some(
            captions
                .into_iter()
                .map(|text| SearchCaption {
                    text: text.into(),
                    highlights: None,
                })
                .collect(),
        );
        self
    }

    /// Captions, empty when the service returned none.
    pub fn captions(&self) -> &[SearchCaption] {
        self.captions.as_deref().unwrap_or_default()
    }

    /// Best available score: semantic when present, keyword otherwise.
    pub fn best_score(&self) -> Option<f64> {
        self.reranker_score.or(self.score)
    }

    /// A string field. Missing or non-string fields are an error.
    pub fn text_field(&self, name: &str) -> AppResult<&str> {
        match self.fields.get(name) {
            Some(serde_json::Value::String(value)) => Ok(value),
            Some(other) => Err(AppError::Search(format!(
                "Field '{}' is not a string: {}",
                name, other
            ))),
            None => Err(AppError::Search(format!(
                "Search document has no field '{}'",
                name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_type_follows_semantic_options() {
        let keyword = SearchRequest::keyword("辛口", 3);
        assert_eq!(keyword.query_type(), QueryType::Simple);

        let semantic = SearchRequest::semantic(
            "辛口",
            3,
            SemanticOptions {
                query_language: "ja-jp".to_string(),
                speller: "none".to_string(),
                configuration: "default".to_string(),
                captions: None,
            },
        );
        assert_eq!(semantic.query_type(), QueryType::Semantic);
        assert_eq!(semantic.top, 3);
    }

    #[test]
    fn test_document_deserialization() {
        let raw = r#"{
            "@search.score": 2.5,
            "@search.rerankerScore": 1.9,
            "@search.captions": [{"text": "日本酒A: flavor_score 8", "highlights": ""}],
            "id": "file-doc1",
            "sourcepage": "doc1.pdf",
            "content": "日本酒A: flavor_score 8\n詳細情報"
        }"#;

        let doc: SearchDocument = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.best_score(), Some(1.9));
        assert_eq!(doc.captions().len(), 1);
        assert_eq!(doc.text_field("sourcepage").unwrap(), "doc1.pdf");
        assert!(doc.text_field("content").unwrap().contains('\n'));
    }

    #[test]
    fn test_null_captions_are_empty() {
        let raw = r#"{"@search.score": 1.0, "@search.captions": null, "content": "x"}"#;
        let doc: SearchDocument = serde_json::from_str(raw).unwrap();
        assert!(doc.captions().is_empty());
        assert_eq!(doc.best_score(), Some(1.0));
    }

    #[test]
    fn test_missing_or_non_string_field_is_error() {
        let raw = r#"{"content": 42}"#;
        let doc: SearchDocument = serde_json::from_str(raw).unwrap();
        assert!(matches!(doc.text_field("sourcepage"), Err(AppError::Search(_))));
        assert!(matches!(doc.text_field("content"), Err(AppError::Search(_))));
    }
}
