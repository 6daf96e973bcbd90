pub mod customer_service;
pub mod need_service;
pub mod user_service;

pub use customer_service::{CustomerService, NewContact};
pub use need_service::{NeedFilter, NeedPatch, NeedService, NewNeed};
pub use user_service::{NewUser, UserService};

/// Upper bound on autocomplete suggestions
pub const AUTOCOMPLETE_SIZE: u32 = 10;

use serde_json::{json, Map, Value};

/// `[{key: "a"}, ...]` storage shape for list attributes
pub(crate) fn nested(items: &[String], key: &str) -> Value {
    Value::Array(items.iter().map(|item| json!({ key: item })).collect())
}

pub(crate) fn insert_text(document: &mut Map<String, Value>, field: &str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        document.insert(field.to_string(), Value::String(v.to_string()));
    }
}

pub(crate) fn insert_number(document: &mut Map<String, Value>, field: &str, value: Option<f64>) {
    if let Some(v) = value {
        document.insert(field.to_string(), json!(v));
    }
}

pub(crate) fn insert_list(document: &mut Map<String, Value>, field: &str, key: &str, items: &[String]) {
    if !items.is_empty() {
        document.insert(field.to_string(), nested(items, key));
    }
}
