use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::error::{PlannerError, Result};

/// Sentinel reported when no real-world data exists for the constraints.
/// Propagated verbatim into stage prompts so the model never invents options.
pub const DATA_NOT_FOUND: &str =
    "DATA_NOT_FOUND: No real-world options available for these constraints.";

/// Typed absence of real travel data, distinct from an empty successful
/// result. Callers render it as [`DATA_NOT_FOUND`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{}", DATA_NOT_FOUND)]
pub struct DataUnavailable;

pub type TravelResult = std::result::Result<String, DataUnavailable>;

/// Approximate exchange rates from USD. Update as needed.
pub const CURRENCY_RATES_FROM_USD: &[(&str, f64)] = &[
    ("USD", 1.0),
    ("EUR", 0.92),
    ("INR", 83.0),
    ("GBP", 0.79),
    ("JPY", 149.0),
];

fn rate_from_usd(currency: &str) -> f64 {
    CURRENCY_RATES_FROM_USD
        .iter()
        .find(|(code, _)| *code == currency)
        .map(|(_, rate)| *rate)
        .unwrap_or(1.0)
}

/// Convert between currencies with USD as the pivot, rounded to 2 decimals.
pub fn convert_currency(amount: f64, from_currency: &str, to_currency: &str) -> f64 {
    let from = from_currency.trim().to_uppercase();
    let to = to_currency.trim().to_uppercase();
    let from = if from.is_empty() { "USD" } else { from.as_str() };
    let to = if to.is_empty() { "USD" } else { to.as_str() };
    if from == to {
        return round2(amount);
    }
    let usd = amount / rate_from_usd(from);
    round2(usd * rate_from_usd(to))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Source of real-world flight, hotel, and points-of-interest data.
///
/// Every query returns a plain text block or [`DataUnavailable`]; the
/// implementation never fabricates results and the pipeline never retries a
/// failed call.
#[async_trait]
pub trait TravelData: Send + Sync {
    async fn flight_search(
        &self,
        origin: &str,
        destination: &str,
        date: &str,
        currency: &str,
        adults: u32,
    ) -> TravelResult;

    async fn hotel_search(&self, city_code: &str, travel_style: &str) -> TravelResult;

    async fn activity_search(&self, latitude: f64, longitude: f64) -> TravelResult;
}

/// Always reports the sentinel; used when no travel-data credentials are
/// configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineTravelData;

#[async_trait]
impl TravelData for OfflineTravelData {
    async fn flight_search(&self, _: &str, _: &str, _: &str, _: &str, _: u32) -> TravelResult {
        Err(DataUnavailable)
    }

    async fn hotel_search(&self, _: &str, _: &str) -> TravelResult {
        Err(DataUnavailable)
    }

    async fn activity_search(&self, _: f64, _: f64) -> TravelResult {
        Err(DataUnavailable)
    }
}

const DEFAULT_AMADEUS_BASE_URL: &str = "https://test.api.amadeus.com";
const MAX_FLIGHT_OFFERS: usize = 10;
const MAX_HOTELS: usize = 15;
const MAX_POIS: usize = 15;

/// Amadeus self-service API client. Constructed explicitly at the process
/// entry point and injected into the pipeline.
#[derive(Debug, Clone)]
pub struct AmadeusClient {
    client_id: String,
    client_secret: String,
    base_url: String,
    timeout: Duration,
}

impl AmadeusClient {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
            base_url: DEFAULT_AMADEUS_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `AMADEUS_API_KEY` / `AMADEUS_API_SECRET` (or the `CLIENT_ID` /
    /// `CLIENT_SECRET` variants). Missing credentials are fatal at this
    /// boundary.
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("AMADEUS_API_KEY")
            .or_else(|_| std::env::var("AMADEUS_CLIENT_ID"))
            .map_err(|_| missing_credentials())?;
        let client_secret = std::env::var("AMADEUS_API_SECRET")
            .or_else(|_| std::env::var("AMADEUS_CLIENT_SECRET"))
            .map_err(|_| missing_credentials())?;
        Ok(Self::new(client_id, client_secret))
    }

    async fn access_token(&self, client: &reqwest::Client) -> std::result::Result<String, DataUnavailable> {
        let url = format!("{}/v1/security/oauth2/token", self.base_url);
        let response = client
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(log_unavailable)?;

        let body: Value = response.json().await.map_err(log_unavailable)?;
        body.get("access_token")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or(DataUnavailable)
    }

    fn http_client(&self) -> std::result::Result<reqwest::Client, DataUnavailable> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(log_unavailable)
    }

    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> std::result::Result<Value, DataUnavailable> {
        let client = self.http_client()?;
        let token = self.access_token(&client).await?;
        let url = format!("{}{}", self.base_url, path);
        let response = client
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(log_unavailable)?;

        if !response.status().is_success() {
            debug!(target: "trip_agent::travel", status = %response.status(), path, "travel query failed");
            return Err(DataUnavailable);
        }

        response.json().await.map_err(log_unavailable)
    }
}

fn log_unavailable(err: reqwest::Error) -> DataUnavailable {
    debug!(target: "trip_agent::travel", error = %err, "travel request error");
    DataUnavailable
}

fn missing_credentials() -> PlannerError {
    PlannerError::Config(
        "AMADEUS_API_KEY and AMADEUS_API_SECRET (or AMADEUS_CLIENT_ID/AMADEUS_CLIENT_SECRET) \
         must be set"
            .to_string(),
    )
}

#[async_trait]
impl TravelData for AmadeusClient {
    async fn flight_search(
        &self,
        origin: &str,
        destination: &str,
        date: &str,
        currency: &str,
        adults: u32,
    ) -> TravelResult {
        let body = self
            .get_json(
                "/v2/shopping/flight-offers",
                &[
                    ("originLocationCode", origin.to_uppercase()),
                    ("destinationLocationCode", destination.to_uppercase()),
                    ("departureDate", date.to_string()),
                    ("adults", adults.max(1).to_string()),
                ],
            )
            .await?;

        flight_lines(&body, origin, destination, date, currency).ok_or(DataUnavailable)
    }

    async fn hotel_search(&self, city_code: &str, travel_style: &str) -> TravelResult {
        let body = self
            .get_json(
                "/v1/reference-data/locations/hotels/by-city",
                &[("cityCode", city_code.to_uppercase())],
            )
            .await?;

        hotel_lines(&body, travel_style).ok_or(DataUnavailable)
    }

    async fn activity_search(&self, latitude: f64, longitude: f64) -> TravelResult {
        let body = self
            .get_json(
                "/v1/reference-data/locations/pois",
                &[
                    ("latitude", latitude.to_string()),
                    ("longitude", longitude.to_string()),
                ],
            )
            .await?;

        poi_lines(&body).ok_or(DataUnavailable)
    }
}

/// Format flight offers as numbered lines with price converted to the
/// requested currency, the operating airline, and a booking-ready link.
/// `None` when the payload holds no offers.
pub fn flight_lines(
    body: &Value,
    origin: &str,
    destination: &str,
    date: &str,
    currency: &str,
) -> Option<String> {
    let offers = body.get("data")?.as_array()?;
    if offers.is_empty() {
        return None;
    }

    let mut lines = Vec::new();
    for (i, offer) in offers.iter().take(MAX_FLIGHT_OFFERS).enumerate() {
        let price = offer.get("price").cloned().unwrap_or(Value::Null);
        let total = price
            .get("total")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0);
        let from_currency = price
            .get("currency")
            .and_then(|v| v.as_str())
            .unwrap_or("USD");
        let converted = convert_currency(total, from_currency, currency);

        let carrier = offer
            .get("itineraries")
            .and_then(|v| v.get(0))
            .and_then(|v| v.get("segments"))
            .and_then(|v| v.get(0))
            .map(|segment| {
                segment
                    .get("operating")
                    .and_then(|op| op.get("carrierCode"))
                    .and_then(|v| v.as_str())
                    .or_else(|| segment.get("carrierCode").and_then(|v| v.as_str()))
                    .unwrap_or("")
            })
            .unwrap_or("");

        // Booking-ready link so the user can complete the purchase.
        let booking_link = format!(
            "https://www.google.com/travel/flights?q=Flights%20to%20{}%20from%20{}%20on%20{}",
            destination, origin, date
        );
        lines.push(format!(
            "{}. Price: {} {} | Airline: {} | Book: {}",
            i + 1,
            converted,
            currency,
            carrier,
            booking_link
        ));
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Format hotel properties as numbered `name | address` lines, filtered by
/// travel style when the style suggests budget lodging.
pub fn hotel_lines(body: &Value, travel_style: &str) -> Option<String> {
    let hotels = body.get("data")?.as_array()?;
    if hotels.is_empty() {
        return None;
    }

    let names: Vec<(String, String)> = hotels
        .iter()
        .map(|h| {
            let name = h
                .get("name")
                .and_then(|v| v.as_str())
                .or_else(|| h.get("hotelId").and_then(|v| v.as_str()))
                .unwrap_or("Hotel")
                .to_string();
            let address = h
                .get("address")
                .and_then(|a| a.get("lines"))
                .and_then(|l| l.get(0))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            (name, address)
        })
        .collect();

    let filtered = filter_hotels_by_style(&names, travel_style);

    let lines: Vec<String> = filtered
        .iter()
        .take(MAX_HOTELS)
        .enumerate()
        .map(|(i, (name, address))| format!("{}. {} | {}", i + 1, name, address))
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Budget-leaning travel styles prefer hostels and budget properties; when no
/// property name matches, fall back to the full list rather than nothing.
pub fn filter_hotels_by_style<'a>(
    hotels: &'a [(String, String)],
    travel_style: &str,
) -> Vec<&'a (String, String)> {
    let style = travel_style.to_lowercase();
    let budget_style = ["backpack", "hostel", "budget"]
        .iter()
        .any(|kw| style.contains(kw));

    if budget_style {
        let matched: Vec<&(String, String)> = hotels
            .iter()
            .filter(|(name, _)| {
                let lower = name.to_lowercase();
                ["hostel", "budget", "backpacker", "inn"]
                    .iter()
                    .any(|kw| lower.contains(kw))
            })
            .collect();
        if !matched.is_empty() {
            return matched;
        }
    }

    hotels.iter().collect()
}

/// Format points of interest as numbered `name | lat, long` lines.
pub fn poi_lines(body: &Value) -> Option<String> {
    let pois = body.get("data")?.as_array()?;
    if pois.is_empty() {
        return None;
    }

    let lines: Vec<String> = pois
        .iter()
        .take(MAX_POIS)
        .enumerate()
        .map(|(i, poi)| {
            let name = poi
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("Activity");
            let geo = poi.get("geoCode").cloned().unwrap_or(Value::Null);
            let lat = geo.get("latitude").and_then(|v| v.as_f64()).unwrap_or(0.0);
            let lon = geo.get("longitude").and_then(|v| v.as_f64()).unwrap_or(0.0);
            format!("{}. {} | lat={}, long={}", i + 1, name, lat, lon)
        })
        .collect();

    Some(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_convert_currency_identity() {
        assert_eq!(convert_currency(100.0, "USD", "USD"), 100.0);
        assert_eq!(convert_currency(99.999, "inr", "INR"), 100.0);
    }

    #[test]
    fn test_convert_currency_pivot() {
        assert_eq!(convert_currency(1.0, "USD", "INR"), 83.0);
        assert_eq!(convert_currency(83.0, "INR", "USD"), 1.0);
        assert_eq!(convert_currency(0.92, "EUR", "USD"), 1.0);
    }

    #[test]
    fn test_convert_currency_unknown_rate_falls_back() {
        // Unknown codes take a 1.0 rate, matching the fixed-table contract.
        assert_eq!(convert_currency(50.0, "XXX", "USD"), 50.0);
    }

    #[test]
    fn test_flight_lines() {
        let body = json!({"data": [{
            "price": {"total": "100.00", "currency": "USD"},
            "itineraries": [{"segments": [{"carrierCode": "AI", "operating": {"carrierCode": "JL"}}]}]
        }]});
        let lines = flight_lines(&body, "DEL", "TYO", "2026-03-01", "INR").unwrap();
        assert!(lines.starts_with("1. Price: 8300 INR | Airline: JL"));
        assert!(lines.contains("google.com/travel/flights"));
    }

    #[test]
    fn test_flight_lines_empty_is_none() {
        assert!(flight_lines(&json!({"data": []}), "DEL", "TYO", "d", "INR").is_none());
        assert!(flight_lines(&json!({}), "DEL", "TYO", "d", "INR").is_none());
    }

    #[test]
    fn test_hotel_lines_style_filter() {
        let body = json!({"data": [
            {"name": "Grand Palace", "address": {"lines": ["1 Main St"]}},
            {"name": "City Hostel", "address": {"lines": ["2 Side St"]}}
        ]});
        let budget = hotel_lines(&body, "Backpacking").unwrap();
        assert!(budget.contains("City Hostel"));
        assert!(!budget.contains("Grand Palace"));

        let all = hotel_lines(&body, "Luxury").unwrap();
        assert!(all.contains("Grand Palace"));
    }

    #[test]
    fn test_hotel_style_filter_falls_back_when_nothing_matches() {
        let hotels = vec![("Grand Palace".to_string(), "1 Main St".to_string())];
        let filtered = filter_hotels_by_style(&hotels, "budget");
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_poi_lines() {
        let body = json!({"data": [
            {"name": "Senso-ji", "geoCode": {"latitude": 35.71, "longitude": 139.79}}
        ]});
        let lines = poi_lines(&body).unwrap();
        assert_eq!(lines, "1. Senso-ji | lat=35.71, long=139.79");
    }

    #[tokio::test]
    async fn test_offline_travel_data_reports_sentinel() {
        let offline = OfflineTravelData;
        let result = offline
            .flight_search("DEL", "TYO", "2026-03-01", "INR", 2)
            .await;
        assert_eq!(result.unwrap_err().to_string(), DATA_NOT_FOUND);
    }
}
