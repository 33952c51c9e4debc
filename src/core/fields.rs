use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::core::normalize;
use crate::core::value::FieldValue;

pub const ORIGIN: &str = "origin";
pub const DESTINATION: &str = "destination";
pub const START_DATE: &str = "start_date";
pub const END_DATE: &str = "end_date";
pub const START_OR_DATES: &str = "start_or_dates";
pub const DAYS: &str = "days";
pub const NIGHTS: &str = "nights";
pub const NUM_PEOPLE: &str = "num_people";
pub const BUDGET: &str = "budget";
pub const CURRENCY: &str = "currency";
pub const STYLE: &str = "style";
pub const INTERESTS: &str = "interests";

/// Strings that count as "no value supplied", compared case-insensitively
/// after trimming.
pub const MISSING_SENTINELS: &[&str] = &["none", "null", "n/a", "na", "unknown", "not provided"];

/// True when a stored value should be treated as absent.
pub fn is_missing_value(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return true;
    }
    let lower = trimmed.to_lowercase();
    MISSING_SENTINELS.iter().any(|s| *s == lower)
}

/// Canonical trip-request parameters keyed by field name.
///
/// Values are canonical strings; the empty string means absent. The map is
/// created once per planning session from the extraction output, mutated by
/// normalization and the completion loop, and read-only once handed to the
/// downstream stages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripFields {
    values: BTreeMap<String, String>,
}

impl TripFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fields map from a raw extraction object, running every known
    /// field through its normalizer. Unknown keys are ignored; normalization
    /// never fails, worst case a field comes out absent.
    pub fn from_extracted(raw: &Map<String, Value>) -> Self {
        let mut fields = Self::new();
        let value_of = |name: &str| -> FieldValue {
            raw.get(name).map(FieldValue::from).unwrap_or(FieldValue::Missing)
        };

        fields.set(ORIGIN, normalize::clean_text(&value_of(ORIGIN)));
        fields.set(DESTINATION, normalize::clean_text(&value_of(DESTINATION)));
        fields.set(START_DATE, normalize::normalize_date(&value_of(START_DATE)));
        fields.set(END_DATE, normalize::normalize_date(&value_of(END_DATE)));
        fields.set(
            START_OR_DATES,
            normalize::clean_text(&value_of(START_OR_DATES)),
        );
        fields.set(DAYS, normalize::normalize_count(&value_of(DAYS)));
        fields.set(NUM_PEOPLE, normalize::normalize_count(&value_of(NUM_PEOPLE)));
        fields.set(BUDGET, normalize::normalize_budget(&value_of(BUDGET)));
        fields.set(CURRENCY, normalize::clean_text(&value_of(CURRENCY)));
        fields.set(STYLE, normalize::clean_text(&value_of(STYLE)));
        fields.set(INTERESTS, normalize::normalize_interests(&value_of(INTERESTS)));
        fields
    }

    /// Current value for a field, empty string when absent.
    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// True when the field is empty or holds a missing-sentinel string.
    pub fn is_missing(&self, name: &str) -> bool {
        is_missing_value(self.get(name))
    }

    /// Fill in fields that can be computed from the ones already present:
    /// `days` from the date range (inclusive), `nights` from `days`,
    /// `start_or_dates` from the explicit dates, and `currency` from the
    /// budget string. Existing non-missing values are never overwritten.
    pub fn apply_derivations(&mut self) {
        if self.is_missing(DAYS) {
            if let Some(days) =
                crate::core::dates::trip_days(self.get(START_DATE), self.get(END_DATE))
            {
                self.set(DAYS, days.to_string());
            }
        }

        if self.is_missing(NIGHTS) {
            let days = self.get(DAYS).parse::<u32>().ok();
            if let Some(nights) = days.and_then(crate::core::dates::nights_from_days) {
                self.set(NIGHTS, nights.to_string());
            }
        }

        if self.is_missing(START_OR_DATES)
            && !self.is_missing(START_DATE)
            && !self.is_missing(END_DATE)
        {
            let span = format!("{} to {}", self.get(START_DATE), self.get(END_DATE));
            self.set(START_OR_DATES, span);
        }

        if self.is_missing(CURRENCY) && !self.is_missing(BUDGET) {
            let code = crate::core::currency::resolve_currency(self.get(BUDGET));
            self.set(CURRENCY, code);
        }
    }

    /// Fixed label:value block handed verbatim to downstream stages.
    pub fn stage_block(&self) -> String {
        let dates = if !self.is_missing(START_OR_DATES) {
            self.get(START_OR_DATES).to_string()
        } else {
            format!("{} to {}", self.get(START_DATE), self.get(END_DATE))
        };
        [
            format!("Origin: {}", self.get(ORIGIN)),
            format!("Destination: {}", self.get(DESTINATION)),
            format!("Dates: {}", dates),
            format!("Days: {}", self.get(DAYS)),
            format!("Nights: {}", self.get(NIGHTS)),
            format!("Travelers: {}", self.get(NUM_PEOPLE)),
            format!("Budget: {}", self.get(BUDGET)),
            format!("Currency: {}", self.get(CURRENCY)),
            format!("Style: {}", self.get(STYLE)),
            format!("Interests: {}", self.get(INTERESTS)),
        ]
        .join("\n")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
