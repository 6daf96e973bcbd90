pub mod collection;
pub mod item;

pub use collection::post as contents_post;
pub use item::delete as content_delete;
pub use item::get as content_get;

/// Reduce a client-supplied name to its final path component. Empty, `.`
/// and `..` collapse to an empty string.
pub fn sanitize_filename(raw: &str) -> String {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or("").trim();
    match name {
        "" | "." | ".." => String::new(),
        _ => name.to_string(),
    }
}
