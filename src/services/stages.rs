use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::error::{PlannerError, Result};
use crate::services::openai_client::{message_content, ChatCompletionRequest, OpenAIClient};

/// The reasoning stages of the pipeline, run strictly in sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Turn the free-text request into structured fields.
    Intent,
    /// Scout a shortlist of activities and places for approval.
    Discovery,
    /// Source flights and accommodation against the approved shortlist.
    Logistics,
    /// Audit the sourced plan against the stated budget.
    Audit,
    /// Synthesize the final day-by-day itinerary.
    Itinerary,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Intent => "intent_analysis",
            Stage::Discovery => "research_discovery",
            Stage::Logistics => "logistics_sourcing",
            Stage::Audit => "audit_optimization",
            Stage::Itinerary => "itinerary_synthesis",
        }
    }

    fn system_prompt(&self) -> &'static str {
        match self {
            Stage::Intent => {
                "You are the trip orchestrator. Read the traveler's request and reply with a \
                 single JSON object and nothing else. Keys: origin, destination, start_date, \
                 end_date, num_people, budget, style, interests. Dates are YYYY-MM-DD. Use null \
                 for anything the request does not state; never guess."
            }
            Stage::Discovery => {
                "You are the scout. Propose a focused shortlist of activities and places that \
                 fit the trip parameters, one line each with a short reason. The traveler will \
                 approve or send feedback before anything is booked."
            }
            Stage::Logistics => {
                "You are the logistician. Build flight and accommodation options strictly from \
                 the travel data provided. Where a data section reads DATA_NOT_FOUND, say so \
                 plainly and do not invent options, prices, or links."
            }
            Stage::Audit => {
                "You are the auditor. Check the sourced plan against the stated budget. State \
                 clearly whether the plan is within budget or over budget, itemize the largest \
                 costs, and flag anything that cannot be met."
            }
            Stage::Itinerary => {
                "You are the orchestrator assembling the final plan. Reply with a single JSON \
                 object and nothing else, matching the requested structure exactly."
            }
        }
    }
}

/// Prompt for the intent-analysis stage.
pub fn intent_prompt(user_input: &str) -> String {
    format!(
        "Traveler request:\n{}\n\nExtract the trip parameters as JSON.",
        user_input
    )
}

/// Prompt for the discovery stage; the canonical field block is embedded
/// verbatim.
pub fn discovery_prompt(fields_block: &str, user_input: &str) -> String {
    format!(
        "Trip parameters:\n{}\n\nOriginal request:\n{}\n\nPropose the activity shortlist.",
        fields_block, user_input
    )
}

/// Prompt for the logistics stage with the approved shortlist, the human's
/// approval or feedback, and raw travel data (or the DATA_NOT_FOUND sentinel)
/// embedded verbatim.
pub fn logistics_prompt(
    fields_block: &str,
    shortlist: &str,
    approval: &str,
    flight_data: &str,
    hotel_data: &str,
) -> String {
    format!(
        "Trip parameters:\n{}\n\nApproved shortlist:\n{}\n\nHuman approval: {}\n\n\
         Flight data:\n{}\n\nHotel data:\n{}\n\n\
         Produce the logistics plan: flights, accommodation, and local transport, \
         with prices in the trip currency.",
        fields_block, shortlist, approval, flight_data, hotel_data
    )
}

/// Prompt for the audit stage.
pub fn audit_prompt(fields_block: &str, logistics_report: &str) -> String {
    format!(
        "Trip parameters:\n{}\n\nLogistics plan:\n{}\n\n\
         Audit the plan against the budget.",
        fields_block, logistics_report
    )
}

/// Prompt for the itinerary-synthesis stage; asks for a `TripPlan`-shaped
/// JSON object.
pub fn itinerary_prompt(
    fields_block: &str,
    shortlist: &str,
    logistics_report: &str,
    audit_report: &str,
) -> String {
    format!(
        "Trip parameters:\n{}\n\nApproved shortlist:\n{}\n\nLogistics plan:\n{}\n\n\
         Audit report:\n{}\n\n\
         Assemble the final plan as one JSON object with keys: destination, origin, \
         nights, start_date, travelers, total_budget, total_cost, remaining_budget, \
         confidence, currency, itinerary (array of {{day, date, title, activities, \
         estimated_cost, booking_url, notes}}), accommodation, transportation, \
         highlights, notes.",
        fields_block, shortlist, logistics_report, audit_report
    )
}

/// A collaborator that runs one reasoning stage and returns its raw text.
#[async_trait]
pub trait StageRunner: Send + Sync {
    async fn run_stage(&self, stage: Stage, prompt: &str) -> Result<String>;
}

/// Stage runner over an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAIStageRunner {
    client: OpenAIClient,
    model: String,
    max_tokens: Option<u32>,
    timeout: Duration,
}

impl OpenAIStageRunner {
    pub fn new(api_key: String) -> Self {
        Self {
            client: OpenAIClient::new(api_key),
            model: "openai/gpt-4.1-mini".to_string(),
            max_tokens: Some(2000),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.client.set_base_url(base_url);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            PlannerError::Config(
                "OPENAI_API_KEY environment variable must be set before creating a stage runner"
                    .to_string(),
            )
        })?;
        let mut runner = Self::new(api_key);
        if let Ok(base_url) =
            std::env::var("OPENAI_BASE_URL").or_else(|_| std::env::var("OPENROUTER_BASE_URL"))
        {
            runner.client.set_base_url(base_url);
        }
        Ok(runner)
    }
}

#[async_trait]
impl StageRunner for OpenAIStageRunner {
    async fn run_stage(&self, stage: Stage, prompt: &str) -> Result<String> {
        debug!(target: "trip_agent::stages", stage = stage.name(), "running stage");

        let messages = vec![
            json!({"role": "system", "content": stage.system_prompt()}),
            json!({"role": "user", "content": prompt}),
        ];
        let body = ChatCompletionRequest::new(self.model.clone(), messages)
            .with_max_tokens(self.max_tokens)
            .into_value();

        let response = self.client.chat_completion(&body, self.timeout).await?;
        let content = message_content(&response).ok_or_else(|| {
            PlannerError::stage(stage.name(), "response carried no assistant message content")
        })?;

        Ok(content.to_string())
    }
}
