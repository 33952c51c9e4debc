pub mod audit;
pub mod completion;
pub mod currency;
pub mod dates;
pub mod fields;
pub mod normalize;
pub mod pipeline;
pub mod value;

pub use audit::flags_budget_failure;
pub use completion::{
    complete_fields, CompletionSession, CompletionState, FieldPrompter, SubmitOutcome,
    REQUIRED_FIELDS_COARSE, REQUIRED_FIELDS_FULL,
};
pub use currency::resolve_currency;
pub use fields::TripFields;
pub use pipeline::{Approval, PlanOutcome, Reviewer, TripPlanner};
pub use value::FieldValue;
