pub mod collection;
pub mod item;
pub mod utils;

// Re-export handler functions for use in routing
pub use collection::get as needs_get;
pub use collection::post as needs_post;

pub use item::delete as need_delete;
pub use item::get as need_get;
pub use item::put as need_put;
