use serde_json::{json, Map, Value};

use super::error::FilterError;
use super::filter_match::FilterMatch;
use super::types::{FilterClause, FilterOp, Pagination};

/// A conjunctive query against one index, plus an optional result window.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    index: String,
    clauses: Vec<FilterClause>,
    from: Option<u32>,
    size: Option<u32>,
}

impl Filter {
    pub fn new(index: impl Into<String>) -> Result<Self, FilterError> {
        let index = index.into();
        Self::validate_index_name(&index)?;
        Ok(Self {
            index,
            clauses: vec![],
            from: None,
            size: None,
        })
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    pub fn from(&self) -> Option<u32> {
        self.from
    }

    pub fn size(&self) -> Option<u32> {
        self.size
    }

    pub fn term(&mut self, field: &str, value: impl Into<Value>) -> Result<&mut Self, FilterError> {
        self.push(field, FilterOp::Term, value.into())
    }

    pub fn match_phrase(&mut self, field: &str, text: &str) -> Result<&mut Self, FilterError> {
        self.push(field, FilterOp::MatchPhrase, Value::String(text.to_string()))
    }

    pub fn matches(&mut self, field: &str, text: &str) -> Result<&mut Self, FilterError> {
        self.push(field, FilterOp::Match, Value::String(text.to_string()))
    }

    pub fn window(&mut self, from: u32, size: u32) -> &mut Self {
        self.from = Some(from);
        self.size = Some(size);
        self
    }

    pub fn paginate(&mut self, pagination: Pagination) -> &mut Self {
        self.window(pagination.start(), pagination.size())
    }

    /// Query DSL fragment: `match_all` for no clauses, a single clause as-is,
    /// otherwise a `bool.must` conjunction.
    pub fn to_query_json(&self) -> Value {
        let mut clauses: Vec<Value> = self.clauses.iter().map(Self::clause_json).collect();
        match clauses.len() {
            0 => json!({ "match_all": {} }),
            1 => clauses.remove(0),
            _ => json!({ "bool": { "must": clauses } }),
        }
    }

    /// Full `_search` request body including the window
    pub fn to_search_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".to_string(), self.to_query_json());
        if let Some(from) = self.from {
            body.insert("from".to_string(), json!(from));
        }
        if let Some(size) = self.size {
            body.insert("size".to_string(), json!(size));
        }
        Value::Object(body)
    }

    /// Evaluate the clauses against a stored document, as the in-memory store does
    pub fn matches_document(&self, id: &str, source: &Map<String, Value>) -> bool {
        self.clauses.iter().all(|clause| FilterMatch::evaluate(clause, id, source))
    }

    fn push(&mut self, field: &str, operator: FilterOp, data: Value) -> Result<&mut Self, FilterError> {
        Self::validate_field(field)?;
        if operator != FilterOp::Term && !data.is_string() {
            return Err(FilterError::InvalidValue {
                field: field.to_string(),
                reason: format!("{} expects text", operator.as_str()),
            });
        }
        self.clauses.push(FilterClause {
            field: field.to_string(),
            operator,
            data,
        });
        Ok(self)
    }

    fn clause_json(clause: &FilterClause) -> Value {
        let mut inner = Map::new();
        inner.insert(clause.field.clone(), clause.data.clone());
        let mut outer = Map::new();
        outer.insert(clause.operator.as_str().to_string(), Value::Object(inner));
        Value::Object(outer)
    }

    /// Elasticsearch index naming rules: lowercase, no path/wildcard characters,
    /// must not start with `-`, `_` or `+`.
    fn validate_index_name(name: &str) -> Result<(), FilterError> {
        if name.is_empty() || name == "." || name == ".." {
            return Err(FilterError::InvalidIndexName(format!("'{}'", name)));
        }
        if name.starts_with(['-', '_', '+']) {
            return Err(FilterError::InvalidIndexName(format!("{} starts with a reserved character", name)));
        }
        let forbidden = ['\\', '/', '*', '?', '"', '<', '>', '|', ' ', ',', '#', ':'];
        if name.chars().any(|c| c.is_ascii_uppercase() || forbidden.contains(&c)) {
            return Err(FilterError::InvalidIndexName(name.to_string()));
        }
        Ok(())
    }

    fn validate_field(field: &str) -> Result<(), FilterError> {
        let mut chars = field.chars();
        let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
        if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.') {
            return Err(FilterError::InvalidField(field.to_string()));
        }
        Ok(())
    }
}
