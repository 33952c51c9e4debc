//! trip-agent-rs: a multi-stage trip-planning assistant over LLM reasoning
//! stages
//!
//! The pipeline extracts structured trip parameters from a free-text request,
//! completes missing fields interactively, proposes an activity shortlist for
//! human approval, sources real flight and hotel data, audits the plan
//! against the budget, and synthesizes a schema-validated itinerary.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use trip_agent_rs::core::{TripPlanner, Approval, Reviewer, FieldPrompter};
//! use trip_agent_rs::services::stages::OpenAIStageRunner;
//! use trip_agent_rs::tools::OfflineTravelData;
//!
//! struct AutoApprove;
//!
//! impl FieldPrompter for AutoApprove {
//!     fn prompt_field(&mut self, _field: &str, _message: &str) -> String {
//!         "2".to_string()
//!     }
//! }
//!
//! impl Reviewer for AutoApprove {
//!     fn review_shortlist(&mut self, _shortlist: &str) -> Approval {
//!         Approval::Approved
//!     }
//!     fn confirm_over_budget(&mut self, _audit_report: &str) -> bool {
//!         true
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = OpenAIStageRunner::from_env()?;
//!     let planner = TripPlanner::new(Box::new(runner), Box::new(OfflineTravelData));
//!
//!     let mut human = AutoApprove;
//!     let mut reviewer = AutoApprove;
//!     let outcome = planner
//!         .plan("5 days in Tokyo from Delhi, 2 people, 415000 INR", &mut human, &mut reviewer)
//!         .await?;
//!     if let Some(outcome) = outcome {
//!         println!("{}", outcome.itinerary_text);
//!     }
//!     Ok(())
//! }
//! ```

extern crate self as trip_agent_rs;

pub mod core;
pub mod error;
pub mod schemas;
pub mod services;
pub mod text;
pub mod tools;
pub mod types;

pub use core::{
    complete_fields, flags_budget_failure, resolve_currency, Approval, CompletionSession,
    CompletionState, FieldPrompter, FieldValue, PlanOutcome, Reviewer, SubmitOutcome, TripFields,
    TripPlanner, REQUIRED_FIELDS_COARSE, REQUIRED_FIELDS_FULL,
};
pub use error::{PlannerError, Result};
pub use schemas::{schema_type_name, validate_structured_payload, CompletionSchema, SchemaHandle};
pub use services::stages::{OpenAIStageRunner, Stage, StageRunner};
pub use text::{extract_json_object, markdown_to_plain};
pub use tools::{resolve_iata, AmadeusClient, OfflineTravelData, TravelData, DATA_NOT_FOUND};
pub use types::response::{deserialize_structured_response, StructuredPayload};
pub use types::trip::{DayPlan, TripPlan};

#[cfg(feature = "cli")]
pub mod cli;
