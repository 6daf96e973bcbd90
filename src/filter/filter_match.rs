use serde_json::{Map, Value};

use super::types::{FilterClause, FilterOp};

/// In-process evaluation of filter clauses.
///
/// Approximates the analyzers configured on the indices: text is split on
/// non-alphanumeric characters and lowercased; `match` hits when any query
/// token prefixes any field token (edge n-gram autocomplete), `match_phrase`
/// hits when the query tokens appear adjacent and in order.
pub struct FilterMatch;

impl FilterMatch {
    pub fn evaluate(clause: &FilterClause, id: &str, source: &Map<String, Value>) -> bool {
        if clause.field == "_id" {
            return match (&clause.operator, &clause.data) {
                (_, Value::String(wanted)) => wanted == id,
                _ => false,
            };
        }

        let Some(stored) = Self::lookup(source, &clause.field) else {
            return false;
        };

        match clause.operator {
            FilterOp::Term => Self::any_value(&stored, |v| v == &clause.data),
            FilterOp::MatchPhrase => {
                let phrase = Self::tokenize(clause.data.as_str().unwrap_or_default());
                Self::any_value(&stored, |v| Self::contains_phrase(&Self::tokenize(&Self::text_of(v)), &phrase))
            }
            FilterOp::Match => {
                let query = Self::tokenize(clause.data.as_str().unwrap_or_default());
                Self::any_value(&stored, |v| {
                    let tokens = Self::tokenize(&Self::text_of(v));
                    query.iter().any(|q| tokens.iter().any(|t| t.starts_with(q.as_str())))
                })
            }
        }
    }

    pub fn tokenize(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
            .collect()
    }

    /// Resolve a dotted path, flattening through arrays of objects
    fn lookup(source: &Map<String, Value>, path: &str) -> Option<Vec<Value>> {
        let mut current = vec![Value::Object(source.clone())];
        for segment in path.split('.') {
            let mut next = vec![];
            for value in current {
                match value {
                    Value::Object(map) => {
                        if let Some(v) = map.get(segment) {
                            next.push(v.clone());
                        }
                    }
                    Value::Array(items) => {
                        for item in items {
                            if let Some(v) = item.as_object().and_then(|m| m.get(segment)) {
                                next.push(v.clone());
                            }
                        }
                    }
                    _ => {}
                }
            }
            if next.is_empty() {
                return None;
            }
            current = next;
        }
        Some(current)
    }

    fn any_value(values: &[Value], predicate: impl Fn(&Value) -> bool) -> bool {
        values.iter().any(|v| match v {
            Value::Array(items) => items.iter().any(&predicate),
            other => predicate(other),
        })
    }

    fn text_of(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    fn contains_phrase(tokens: &[String], phrase: &[String]) -> bool {
        if phrase.is_empty() {
            return false;
        }
        tokens.windows(phrase.len()).any(|w| w == phrase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn clause(field: &str, operator: FilterOp, data: Value) -> FilterClause {
        FilterClause { field: field.to_string(), operator, data }
    }

    fn doc(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn term_on_id_and_field() {
        let source = doc(json!({ "Kind": "need", "Rate": 400.0 }));
        assert!(FilterMatch::evaluate(&clause("_id", FilterOp::Term, json!("a1")), "a1", &source));
        assert!(!FilterMatch::evaluate(&clause("_id", FilterOp::Term, json!("a2")), "a1", &source));
        assert!(FilterMatch::evaluate(&clause("Kind", FilterOp::Term, json!("need")), "a1", &source));
        assert!(!FilterMatch::evaluate(&clause("Kind", FilterOp::Term, json!("Need")), "a1", &source));
        assert!(FilterMatch::evaluate(&clause("Rate", FilterOp::Term, json!(400.0)), "a1", &source));
    }

    #[test]
    fn match_is_prefix_autocomplete() {
        let source = doc(json!({ "Name": "Société Générale" }));
        assert!(FilterMatch::evaluate(&clause("Name", FilterOp::Match, json!("soc")), "c", &source));
        assert!(FilterMatch::evaluate(&clause("Name", FilterOp::Match, json!("gén")), "c", &source));
        assert!(!FilterMatch::evaluate(&clause("Name", FilterOp::Match, json!("bnp")), "c", &source));
        assert!(!FilterMatch::evaluate(&clause("Name", FilterOp::Match, json!("")), "c", &source));
    }

    #[test]
    fn match_phrase_needs_adjacent_tokens() {
        let source = doc(json!({ "Name": "BNP PARIBAS" }));
        assert!(FilterMatch::evaluate(&clause("Name", FilterOp::MatchPhrase, json!("bnp paribas")), "c", &source));
        assert!(!FilterMatch::evaluate(&clause("Name", FilterOp::MatchPhrase, json!("paribas bnp")), "c", &source));
        assert!(!FilterMatch::evaluate(&clause("Name", FilterOp::MatchPhrase, json!("bnp ntm")), "c", &source));
    }

    #[test]
    fn nested_list_paths() {
        let source = doc(json!({ "Consultants": [{ "id": "u1" }, { "id": "u2" }] }));
        assert!(FilterMatch::evaluate(&clause("Consultants.id", FilterOp::Term, json!("u2")), "n", &source));
        assert!(!FilterMatch::evaluate(&clause("Consultants.id", FilterOp::Term, json!("u3")), "n", &source));
        assert!(!FilterMatch::evaluate(&clause("Missing", FilterOp::Term, json!("u3")), "n", &source));
    }
}
