//! OData filter expressions.

use std::fmt;

/// Index field holding the document category.
pub const CATEGORY_FIELD: &str = "category";

/// A filter expression sent with a search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalFilter(String);

impl RetrievalFilter {
    /// Exclude one category: `category ne '<value>'`.
    ///
    /// Returns `None` for an empty category.
    pub fn exclude_category(category: &str) -> Option<Self> {
        if category.is_empty() {
            return None;
        }

        Some(Self(format!(
            "{} ne {}",
            CATEGORY_FIELD,
            quote_literal(category)
        )))
    }

    /// The expression text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the expression text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RetrievalFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Quote an OData string literal, doubling embedded single quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
