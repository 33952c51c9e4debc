pub mod extract;
pub mod markdown;

pub use extract::extract_json_object;
pub use markdown::markdown_to_plain;
