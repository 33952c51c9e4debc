use tracing::{debug, warn};

use crate::core::audit::flags_budget_failure;
use crate::core::completion::{complete_fields, FieldPrompter};
use crate::core::fields::{self, TripFields};
use crate::error::Result;
use crate::schemas::{validate_structured_payload, CompletionSchema};
use crate::services::stages::{
    audit_prompt, discovery_prompt, intent_prompt, itinerary_prompt, logistics_prompt, Stage,
    StageRunner,
};
use crate::text::extract::extract_json_object;
use crate::tools::iata::resolve_iata;
use crate::tools::travel::{TravelData, TravelResult, DATA_NOT_FOUND};
use crate::types::response::deserialize_structured_response;
use crate::types::trip::TripPlan;

/// Human verdict on the proposed shortlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Approval {
    Approved,
    /// Revision request; discovery runs again with this feedback embedded.
    Feedback(String),
    Abort,
}

/// Injected human-in-the-loop checkpoints. The CLI reads stdin; a UI host
/// resumes the session from its own widgets.
pub trait Reviewer {
    fn review_shortlist(&mut self, shortlist: &str) -> Approval;

    /// Called when the audit flags the budget as infeasible. Returning false
    /// ends the session without a plan.
    fn confirm_over_budget(&mut self, audit_report: &str) -> bool;
}

/// Everything the pipeline produced, whether or not the final payload could
/// be structured.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub fields: TripFields,
    pub shortlist: String,
    pub logistics_report: String,
    pub audit_report: String,
    /// Raw itinerary-stage text, always present.
    pub itinerary_text: String,
    /// Structured plan when the itinerary text parsed and validated; `None`
    /// means the caller falls back to `itinerary_text`.
    pub plan: Option<TripPlan>,
}

/// Sequential planning pipeline: intent, field completion, discovery with
/// shortlist approval, logistics over real travel data, budget audit, and
/// itinerary synthesis. Stages run once each; a stage failure surfaces as an
/// error with no retry.
pub struct TripPlanner {
    runner: Box<dyn StageRunner>,
    travel: Box<dyn TravelData>,
    required: &'static [&'static str],
}

impl TripPlanner {
    pub fn new(runner: Box<dyn StageRunner>, travel: Box<dyn TravelData>) -> Self {
        Self {
            runner,
            travel,
            required: crate::core::completion::REQUIRED_FIELDS_FULL,
        }
    }

    pub fn with_required_fields(mut self, required: &'static [&'static str]) -> Self {
        self.required = required;
        self
    }

    /// Run the full pipeline for one request. `Ok(None)` means the human
    /// ended the session (shortlist abort or declined over-budget plan);
    /// `Err` means a stage failed.
    pub async fn plan(
        &self,
        user_input: &str,
        prompter: &mut dyn FieldPrompter,
        reviewer: &mut dyn Reviewer,
    ) -> Result<Option<PlanOutcome>> {
        let mut fields = self.extract_fields(user_input).await?;
        complete_fields(&mut fields, self.required, prompter);
        fields.apply_derivations();
        let fields_block = fields.stage_block();
        debug!(target: "trip_agent::pipeline", "fields complete:\n{}", fields_block);

        let shortlist = match self
            .approved_shortlist(&fields_block, user_input, reviewer)
            .await?
        {
            Some(shortlist) => shortlist,
            None => return Ok(None),
        };

        let (flight_data, hotel_data) = self.gather_travel_data(&fields).await;
        let logistics_report = self
            .runner
            .run_stage(
                Stage::Logistics,
                &logistics_prompt(
                    &fields_block,
                    &shortlist,
                    "Approved",
                    &flight_data,
                    &hotel_data,
                ),
            )
            .await?;

        let audit_report = self
            .runner
            .run_stage(Stage::Audit, &audit_prompt(&fields_block, &logistics_report))
            .await?;

        if flags_budget_failure(&audit_report) && !reviewer.confirm_over_budget(&audit_report) {
            debug!(target: "trip_agent::pipeline", "plan declined after budget audit");
            return Ok(None);
        }

        let itinerary_text = self
            .runner
            .run_stage(
                Stage::Itinerary,
                &itinerary_prompt(&fields_block, &shortlist, &logistics_report, &audit_report),
            )
            .await?;
        let plan = structure_itinerary(&itinerary_text);

        Ok(Some(PlanOutcome {
            fields,
            shortlist,
            logistics_report,
            audit_report,
            itinerary_text,
            plan,
        }))
    }

    /// Intent stage plus extraction and normalization.
    async fn extract_fields(&self, user_input: &str) -> Result<TripFields> {
        let raw = self
            .runner
            .run_stage(Stage::Intent, &intent_prompt(user_input))
            .await?;
        let extracted = extract_json_object(&raw);
        let mut fields = TripFields::from_extracted(&extracted);
        fields.apply_derivations();
        Ok(fields)
    }

    /// Discovery loop: propose, review, revise on feedback. `None` on abort.
    async fn approved_shortlist(
        &self,
        fields_block: &str,
        user_input: &str,
        reviewer: &mut dyn Reviewer,
    ) -> Result<Option<String>> {
        let mut request = user_input.to_string();
        loop {
            let shortlist = self
                .runner
                .run_stage(Stage::Discovery, &discovery_prompt(fields_block, &request))
                .await?;
            match reviewer.review_shortlist(&shortlist) {
                Approval::Approved => return Ok(Some(shortlist)),
                Approval::Abort => return Ok(None),
                Approval::Feedback(feedback) => {
                    request = format!(
                        "{}\n\nRevision feedback on the previous shortlist:\n{}",
                        user_input, feedback
                    );
                }
            }
        }
    }

    /// Query flights and hotels once each. Unresolvable endpoints or failed
    /// queries yield the sentinel text, never fabricated options.
    async fn gather_travel_data(&self, fields: &TripFields) -> (String, String) {
        let origin = resolve_iata(fields.get(fields::ORIGIN));
        let destination = resolve_iata(fields.get(fields::DESTINATION));
        let currency = if fields.is_missing(fields::CURRENCY) {
            crate::core::currency::DEFAULT_CURRENCY
        } else {
            fields.get(fields::CURRENCY)
        };
        let adults = fields
            .get(fields::NUM_PEOPLE)
            .parse::<u32>()
            .unwrap_or(1)
            .max(1);

        let flight_data = match (&origin, &destination) {
            (Some(from), Some(to)) => sentinel_or(
                self.travel
                    .flight_search(from, to, fields.get(fields::START_DATE), currency, adults)
                    .await,
            ),
            _ => {
                debug!(target: "trip_agent::pipeline", "trip endpoints not resolvable to IATA codes");
                DATA_NOT_FOUND.to_string()
            }
        };

        let hotel_data = match &destination {
            Some(city) => sentinel_or(
                self.travel
                    .hotel_search(city, fields.get(fields::STYLE))
                    .await,
            ),
            None => DATA_NOT_FOUND.to_string(),
        };

        (flight_data, hotel_data)
    }
}

fn sentinel_or(result: TravelResult) -> String {
    result.unwrap_or_else(|_| DATA_NOT_FOUND.to_string())
}

/// Parse and validate the itinerary text into a `TripPlan`. Any failure
/// degrades to `None` so the session still ends with the raw text.
fn structure_itinerary(itinerary_text: &str) -> Option<TripPlan> {
    let extracted = extract_json_object(itinerary_text);
    if extracted.is_empty() {
        warn!(target: "trip_agent::pipeline", "itinerary text carried no JSON object");
        return None;
    }

    let payload = serde_json::Value::Object(extracted);
    if let Err(err) = validate_structured_payload(TripPlan::schema(), &payload) {
        warn!(target: "trip_agent::pipeline", error = %err, "itinerary payload failed validation");
        return None;
    }

    match deserialize_structured_response::<TripPlan>(&payload, TripPlan::schema()) {
        Ok(plan) => Some(plan),
        Err(err) => {
            warn!(target: "trip_agent::pipeline", error = %err, "itinerary payload failed deserialization");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sentinel_or_renders_failures() {
        assert_eq!(
            sentinel_or(Err(crate::tools::travel::DataUnavailable)),
            DATA_NOT_FOUND
        );
        assert_eq!(sentinel_or(Ok("1. option".to_string())), "1. option");
    }

    #[test]
    fn test_structure_itinerary_parses_fenced_payload() {
        let text = format!(
            "Here is the plan:\n```json\n{}\n```",
            json!({
                "destination": "Tokyo",
                "nights": 4,
                "total_budget": 415000.0,
                "itinerary": [
                    {"day": 1, "activities": ["Senso-ji"], "estimated_cost": 8000.0}
                ],
                "highlights": ["Senso-ji"]
            })
        );
        let plan = structure_itinerary(&text).unwrap();
        assert_eq!(plan.destination, "Tokyo");
        assert_eq!(plan.itinerary.len(), 1);
    }

    #[test]
    fn test_structure_itinerary_degrades_on_prose() {
        assert!(structure_itinerary("Day 1: arrive and rest.").is_none());
    }

    #[test]
    fn test_structure_itinerary_degrades_on_schema_mismatch() {
        let text = json!({"destination": "Tokyo", "nights": "four"}).to_string();
        assert!(structure_itinerary(&text).is_none());
    }
}
