use std::sync::OnceLock;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::schemas::{CompletionSchema, SchemaHandle};

/// Structured itinerary returned by the synthesis stage.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TripPlan {
    /// Destination city and country (e.g., "Tokyo, Japan")
    pub destination: String,
    /// Origin city the trip departs from
    pub origin: Option<String>,
    /// Number of nights of accommodation
    pub nights: u32,
    /// Optional ISO-8601 start date for the trip
    pub start_date: Option<String>,
    /// Number of travelers the plan is designed for
    pub travelers: Option<u32>,
    /// Total estimated budget for the full trip in the selected currency
    pub total_budget: f64,
    /// Estimated total cost of everything in the itinerary
    pub total_cost: Option<f64>,
    /// Budget left over after the estimated total cost
    pub remaining_budget: Option<f64>,
    /// Auditor confidence that the plan fits the budget, 0.0 to 1.0
    pub confidence: Option<f64>,
    /// Currency code used for all monetary fields (e.g., "INR")
    pub currency: Option<String>,
    /// Day-by-day itinerary with planned activities
    pub itinerary: Vec<DayPlan>,
    /// Recommended lodging information (hotel, neighborhood, notes)
    pub accommodation: Option<String>,
    /// Summary of transportation logistics (flights, trains, passes)
    pub transportation: Option<String>,
    /// Key highlights or must-see experiences for the trip
    pub highlights: Vec<String>,
    /// Additional planning notes, tips, or follow-up actions
    pub notes: Option<String>,
}

/// Per-day itinerary details with activities and cost estimates.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DayPlan {
    /// 1-based day counter within the itinerary
    pub day: u32,
    /// ISO date for the day when known
    pub date: Option<String>,
    /// Short summary or theme for the day
    pub title: Option<String>,
    /// Primary activities or attractions for the day in chronological order
    pub activities: Vec<String>,
    /// Estimated total spend for the day in the plan currency
    pub estimated_cost: f64,
    /// Booking-ready link for the day's main reservation, if any
    pub booking_url: Option<String>,
    /// Optional notes about reservations, timing, or alternatives
    pub notes: Option<String>,
}

impl CompletionSchema for TripPlan {
    fn schema() -> &'static SchemaHandle {
        static HANDLE: OnceLock<SchemaHandle> = OnceLock::new();
        HANDLE.get_or_init(|| {
            SchemaHandle::from_root_schema::<TripPlan>(
                "TripPlan",
                std::any::type_name::<TripPlan>(),
                schemars::schema_for!(TripPlan),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_handle_is_cached_and_named() {
        let first = TripPlan::schema();
        let second = TripPlan::schema();
        assert_eq!(first.schema_name(), "TripPlan");
        assert!(std::ptr::eq(first, second));
        assert!(first.schema_json().get("properties").is_some());
    }

    #[test]
    fn test_round_trip_serialization() {
        let plan = TripPlan {
            destination: "Tokyo, Japan".to_string(),
            origin: Some("Delhi".to_string()),
            nights: 4,
            start_date: Some("2026-03-01".to_string()),
            travelers: Some(2),
            total_budget: 415000.0,
            total_cost: Some(390000.0),
            remaining_budget: Some(25000.0),
            confidence: Some(0.8),
            currency: Some("INR".to_string()),
            itinerary: vec![DayPlan {
                day: 1,
                date: Some("2026-03-01".to_string()),
                title: Some("Asakusa".to_string()),
                activities: vec!["Senso-ji".to_string()],
                estimated_cost: 8000.0,
                booking_url: None,
                notes: None,
            }],
            accommodation: Some("Asakusa guesthouse".to_string()),
            transportation: Some("DEL-TYO return, JR Pass".to_string()),
            highlights: vec!["Senso-ji".to_string()],
            notes: None,
        };

        let json = serde_json::to_value(&plan).unwrap();
        let back: TripPlan = serde_json::from_value(json).unwrap();
        assert_eq!(back.destination, plan.destination);
        assert_eq!(back.itinerary.len(), 1);
    }
}
