use std::env;
use std::io::{self, BufRead, Write};

use clap::{Arg, Command};
use tracing::{error, info, warn};

use crate::core::{Approval, FieldPrompter, Reviewer, TripPlanner};
use crate::services::stages::OpenAIStageRunner;
use crate::text::markdown_to_plain;
use crate::tools::{AmadeusClient, OfflineTravelData, TravelData};
use crate::types::trip::TripPlan;

/// Terminal prompter: one question per line on stdout, answer from stdin.
struct StdinPrompter;

impl FieldPrompter for StdinPrompter {
    fn prompt_field(&mut self, _field: &str, message: &str) -> String {
        read_line(&format!("{} ", message))
    }
}

/// Terminal reviewer for the shortlist and budget checkpoints.
struct StdinReviewer;

impl Reviewer for StdinReviewer {
    fn review_shortlist(&mut self, shortlist: &str) -> Approval {
        println!("\nProposed shortlist:\n{}\n", shortlist);
        let answer = read_line("Approve this shortlist? [yes / quit / feedback text] ");
        let lower = answer.trim().to_lowercase();
        match lower.as_str() {
            "" | "y" | "yes" | "approve" | "approved" | "ok" => Approval::Approved,
            "q" | "quit" | "abort" | "no" => Approval::Abort,
            _ => Approval::Feedback(answer.trim().to_string()),
        }
    }

    fn confirm_over_budget(&mut self, audit_report: &str) -> bool {
        println!("\nBudget audit flagged a problem:\n{}\n", audit_report);
        let answer = read_line("Continue with an over-budget plan? [y/N] ");
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut line = String::new();
    let bytes_read = io::stdin().lock().read_line(&mut line).unwrap_or(0);
    match trimmed_line(bytes_read, line) {
        Some(text) => text,
        None => {
            // Zero bytes means stdin is closed; re-prompting would spin.
            eprintln!("stdin closed before the session finished");
            std::process::exit(1);
        }
    }
}

fn trimmed_line(bytes_read: usize, line: String) -> Option<String> {
    if bytes_read == 0 {
        return None;
    }
    Some(line.trim_end_matches(&['\n', '\r'][..]).to_string())
}

/// CLI entry point for the trip-agent tool
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let matches = Command::new("trip-agent")
        .version("0.1.0")
        .about("A multi-stage LLM trip-planning assistant with OpenRouter")
        .arg(
            Arg::new("request")
                .help("The free-text trip request")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("MODEL")
                .help("The OpenRouter model to use")
                .default_value("openai/gpt-4.1-mini"),
        )
        .arg(
            Arg::new("api-key")
                .short('k')
                .long("api-key")
                .value_name("KEY")
                .help("OpenRouter API key (or set OPENAI_API_KEY env var)"),
        )
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .value_name("URL")
                .help(
                    "OpenRouter base URL (or set OPENAI_BASE_URL / OPENROUTER_BASE_URL env vars)",
                ),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("SECONDS")
                .help("Per-stage request timeout in seconds")
                .default_value("120"),
        )
        .get_matches();

    // Get API key from argument or environment
    let api_key = matches
        .get_one::<String>("api-key")
        .cloned()
        .or_else(|| env::var("OPENAI_API_KEY").ok())
        .ok_or("OpenRouter API key is required. Set OPENAI_API_KEY environment variable or use --api-key")?;

    let base_url = matches
        .get_one::<String>("base-url")
        .cloned()
        .or_else(|| env::var("OPENAI_BASE_URL").ok())
        .or_else(|| env::var("OPENROUTER_BASE_URL").ok())
        .unwrap_or_else(|| "https://openrouter.ai/api/v1".to_string());

    let timeout_seconds: u64 = matches.get_one::<String>("timeout").unwrap().parse()?;

    let runner = OpenAIStageRunner::new(api_key)
        .with_model(matches.get_one::<String>("model").unwrap().as_str())
        .with_base_url(base_url.clone())
        .with_timeout(std::time::Duration::from_secs(timeout_seconds));

    // Real travel data when Amadeus credentials are configured, otherwise the
    // pipeline reports DATA_NOT_FOUND instead of inventing options.
    let travel: Box<dyn TravelData> = match AmadeusClient::from_env() {
        Ok(client) => Box::new(client),
        Err(err) => {
            warn!("{}; continuing without live travel data", err);
            Box::new(OfflineTravelData)
        }
    };

    let planner = TripPlanner::new(Box::new(runner), travel);

    let request = matches.get_one::<String>("request").unwrap();
    info!("Planning trip for request: {}", request);
    info!(
        "Using model: {}",
        matches.get_one::<String>("model").unwrap()
    );
    info!("Base URL: {}", base_url);

    let mut prompter = StdinPrompter;
    let mut reviewer = StdinReviewer;

    match planner.plan(request, &mut prompter, &mut reviewer).await {
        Ok(Some(outcome)) => {
            match &outcome.plan {
                Some(plan) => print_plan(plan),
                None => println!("\nItinerary:\n{}", markdown_to_plain(&outcome.itinerary_text)),
            }
            info!("Planning session completed");
        }
        Ok(None) => {
            println!("\nSession ended without a plan.");
        }
        Err(e) => {
            error!("Planning failed: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}

fn print_plan(plan: &TripPlan) {
    println!("\nTrip to {}", plan.destination);
    if let Some(origin) = &plan.origin {
        println!("From: {}", origin);
    }
    println!("Nights: {}", plan.nights);
    let currency = plan.currency.as_deref().unwrap_or("");
    println!("Budget: {} {}", plan.total_budget, currency);
    if let Some(total_cost) = plan.total_cost {
        println!("Estimated cost: {} {}", total_cost, currency);
    }

    for day in &plan.itinerary {
        let title = day.title.as_deref().unwrap_or("");
        println!("\nDay {} {}", day.day, title);
        for activity in &day.activities {
            println!("  - {}", markdown_to_plain(activity));
        }
        println!("  Estimated cost: {} {}", day.estimated_cost, currency);
        if let Some(url) = &day.booking_url {
            println!("  Booking: {}", url);
        }
    }

    if !plan.highlights.is_empty() {
        println!("\nHighlights:");
        for highlight in &plan.highlights {
            println!("  - {}", highlight);
        }
    }
    if let Some(notes) = &plan.notes {
        println!("\nNotes: {}", markdown_to_plain(notes));
    }
}
