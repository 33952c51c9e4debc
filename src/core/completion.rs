use crate::core::dates;
use crate::core::fields::{self, TripFields};
use crate::core::normalize;

/// Required-field set for the interactive CLI flow with explicit dates.
pub const REQUIRED_FIELDS_FULL: &[&str] = &[
    fields::ORIGIN,
    fields::DESTINATION,
    fields::START_DATE,
    fields::END_DATE,
    fields::NUM_PEOPLE,
    fields::BUDGET,
    fields::STYLE,
    fields::INTERESTS,
];

/// Coarser set for embedders that accept a free-text date span and a day
/// count instead of explicit dates.
pub const REQUIRED_FIELDS_COARSE: &[&str] = &[
    fields::ORIGIN,
    fields::DESTINATION,
    fields::START_OR_DATES,
    fields::DAYS,
    fields::BUDGET,
    fields::STYLE,
    fields::INTERESTS,
];

/// Injected "ask the human for field X" capability. The CLI reads stdin; a UI
/// host re-renders and resumes the session instead.
pub trait FieldPrompter {
    fn prompt_field(&mut self, field: &str, message: &str) -> String;
}

/// Where the completion session currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionState {
    /// Required fields still missing, in required-set order.
    Collecting { missing: Vec<String> },
    /// A candidate value is being checked for one field.
    Validating { field: String, value: String },
    /// Every required field holds a valid, non-missing value.
    Complete,
}

/// Outcome of submitting a candidate value.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Accepted,
    /// Value rejected with a corrective message; already-valid fields are
    /// untouched and the same field should be re-solicited.
    Rejected { message: String },
}

/// Field-completion state machine.
///
/// Suspension (waiting for the human) is a stay in `Collecting`, not a
/// blocking read; [`complete_fields`] layers the blocking terminal driver on
/// top of this.
#[derive(Debug, Clone)]
pub struct CompletionSession {
    required: Vec<String>,
    state: CompletionState,
}

impl CompletionSession {
    pub fn new(required: &[&str], fields: &TripFields) -> Self {
        let mut session = Self {
            required: required.iter().map(|f| f.to_string()).collect(),
            state: CompletionState::Complete,
        };
        session.recheck(fields);
        session
    }

    pub fn state(&self) -> &CompletionState {
        &self.state
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state, CompletionState::Complete)
    }

    /// Next field to solicit, if any.
    pub fn next_field(&self) -> Option<&str> {
        match &self.state {
            CompletionState::Collecting { missing } => missing.first().map(String::as_str),
            CompletionState::Validating { field, .. } => Some(field),
            CompletionState::Complete => None,
        }
    }

    /// Validate and store one candidate value. The whole required set is
    /// re-checked from scratch after every accepted value, since a newly
    /// supplied value may itself leave other fields missing.
    pub fn submit(&mut self, fields: &mut TripFields, field: &str, raw: &str) -> SubmitOutcome {
        self.state = CompletionState::Validating {
            field: field.to_string(),
            value: raw.to_string(),
        };

        match validate_field(field, raw) {
            Ok(canonical) => {
                if field == fields::END_DATE {
                    if let Some(start) =
                        dates::parse_iso_date(fields.get(fields::START_DATE))
                    {
                        let precedes_start = dates::parse_iso_date(&canonical)
                            .map_or(false, |end| end < start);
                        if precedes_start {
                            self.recheck(fields);
                            return SubmitOutcome::Rejected {
                                message: format!(
                                    "`end_date` must be on or after the start date ({}).",
                                    fields.get(fields::START_DATE)
                                ),
                            };
                        }
                    }
                }
                fields.set(field, canonical);
                self.recheck(fields);
                SubmitOutcome::Accepted
            }
            Err(message) => {
                self.recheck(fields);
                SubmitOutcome::Rejected { message }
            }
        }
    }

    fn recheck(&mut self, fields: &TripFields) {
        let mut missing: Vec<String> = self
            .required
            .iter()
            .filter(|name| fields.is_missing(name))
            .cloned()
            .collect();
        // A reversed date range is treated as a still-missing end date, so
        // the session cannot complete with `end_date` before `start_date`.
        if missing.is_empty()
            && self.required.iter().any(|f| f == fields::END_DATE)
            && dates_out_of_order(fields)
        {
            missing.push(fields::END_DATE.to_string());
        }
        self.state = if missing.is_empty() {
            CompletionState::Complete
        } else {
            CompletionState::Collecting { missing }
        };
    }
}

/// Both dates individually valid but in reverse order.
fn dates_out_of_order(trip: &TripFields) -> bool {
    match (
        dates::parse_iso_date(trip.get(fields::START_DATE)),
        dates::parse_iso_date(trip.get(fields::END_DATE)),
    ) {
        (Some(start), Some(end)) => end < start,
        _ => false,
    }
}

/// Per-field validation during solicitation. Returns the canonical value to
/// store, or a corrective message for re-prompting.
pub fn validate_field(field: &str, raw: &str) -> std::result::Result<String, String> {
    let trimmed = raw.trim();
    match field {
        fields::DAYS | fields::NUM_PEOPLE => normalize::parse_positive_int(trimmed)
            .map(|n| n.to_string())
            .ok_or_else(|| format!("`{}` must be a positive whole number.", field)),
        fields::START_DATE | fields::END_DATE => {
            // Store only the date part when the user pastes a timestamp.
            let head: String = trimmed.chars().take(10).collect();
            if normalize::is_iso_date(&head) {
                Ok(head)
            } else {
                Err(format!("`{}` must be an ISO date (YYYY-MM-DD).", field))
            }
        }
        fields::BUDGET => {
            if normalize::budget_has_amount(trimmed) {
                Ok(trimmed.to_string())
            } else {
                Err("`budget` must include a numeric amount (e.g. `20000 INR`).".to_string())
            }
        }
        _ => {
            if fields::is_missing_value(trimmed) {
                Err(format!("`{}` needs a non-empty value.", field))
            } else {
                Ok(trimmed.to_string())
            }
        }
    }
}

/// First-time prompt wording per field.
pub fn prompt_message(field: &str) -> String {
    match field {
        fields::ORIGIN => "Where does the trip start (city or IATA code)?".to_string(),
        fields::DESTINATION => "Where are you going (city or IATA code)?".to_string(),
        fields::START_DATE => "Start date (YYYY-MM-DD)?".to_string(),
        fields::END_DATE => "End date (YYYY-MM-DD)?".to_string(),
        fields::START_OR_DATES => "When are you travelling (dates or a rough span)?".to_string(),
        fields::DAYS => "How many days is the trip?".to_string(),
        fields::NUM_PEOPLE => "How many travelers?".to_string(),
        fields::BUDGET => "What is the budget (amount plus currency, e.g. `20000 INR`)?".to_string(),
        fields::STYLE => "Travel style (e.g. Budget, Luxury, Culture & Food)?".to_string(),
        fields::INTERESTS => "Interests (comma-separated)?".to_string(),
        other => format!("Please provide `{}`.", other),
    }
}

/// Blocking driver: solicit every missing required field through the prompter
/// until the whole set is simultaneously satisfied. Invalid input re-prompts
/// the same field with a corrective message and never discards other fields.
pub fn complete_fields(
    fields: &mut TripFields,
    required: &[&str],
    prompter: &mut dyn FieldPrompter,
) {
    let mut session = CompletionSession::new(required, fields);
    while let Some(field) = session.next_field().map(str::to_string) {
        let mut message = prompt_message(&field);
        loop {
            let raw = prompter.prompt_field(&field, &message);
            match session.submit(fields, &field, &raw) {
                SubmitOutcome::Accepted => break,
                SubmitOutcome::Rejected { message: why } => message = why,
            }
        }
    }
}
