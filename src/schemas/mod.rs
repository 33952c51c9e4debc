pub mod schema;
pub mod validation;

pub use schema::{schema_type_name, CompletionSchema, SchemaHandle};
pub use validation::validate_structured_payload;
