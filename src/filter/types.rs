use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Match operators understood by the document store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    /// Exact, unanalyzed equality (also used against `_id`)
    Term,
    /// Analyzed phrase: all tokens, adjacent, in order
    MatchPhrase,
    /// Analyzed full-text: any token matches
    Match,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Term => "term",
            FilterOp::MatchPhrase => "match_phrase",
            FilterOp::Match => "match",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    pub field: String,
    pub operator: FilterOp,
    pub data: Value,
}

/// Page window used by every collection endpoint.
///
/// `start = page * size` when a page is supplied, otherwise `0`; the size
/// falls back to [`Pagination::DEFAULT_SIZE`] when absent or zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl Pagination {
    pub const DEFAULT_SIZE: u32 = 20;
    pub const MAX_RESULT_WINDOW: u32 = 10_000;

    pub fn new(page: Option<u32>, size: Option<u32>) -> Self {
        Self { page, size }
    }

    pub fn size(&self) -> u32 {
        self.size.filter(|s| *s > 0).unwrap_or(Self::DEFAULT_SIZE)
    }

    pub fn start(&self) -> u32 {
        self.page.map(|p| p.saturating_mul(self.size())).unwrap_or(0)
    }

    /// True when the window ends past the store's `max_result_window`
    pub fn exceeds_result_window(&self) -> bool {
        u64::from(self.start()) + u64::from(self.size()) > u64::from(Self::MAX_RESULT_WINDOW)
    }
}
