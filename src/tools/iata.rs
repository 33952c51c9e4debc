/// Common city names (and variants) to IATA airport/city codes, so travel
/// queries can be addressed by code when the user typed a city name.
pub const CITY_TO_IATA: &[(&str, &str)] = &[
    ("ahmedabad", "AMD"),
    ("mumbai", "BOM"),
    ("bombay", "BOM"),
    ("delhi", "DEL"),
    ("new delhi", "DEL"),
    ("dehradun", "DED"),
    ("bangalore", "BLR"),
    ("bengaluru", "BLR"),
    ("chennai", "MAA"),
    ("madras", "MAA"),
    ("hyderabad", "HYD"),
    ("kolkata", "CCU"),
    ("calcutta", "CCU"),
    ("kochi", "COK"),
    ("cochin", "COK"),
    ("pune", "PNQ"),
    ("goa", "GOI"),
    ("jaipur", "JAI"),
    ("lucknow", "LKO"),
    ("chandigarh", "IXC"),
    ("new york", "NYC"),
    ("nyc", "NYC"),
    ("los angeles", "LAX"),
    ("lax", "LAX"),
    ("london", "LON"),
    ("paris", "PAR"),
    ("dubai", "DXB"),
    ("singapore", "SIN"),
    ("hong kong", "HKG"),
    ("tokyo", "TYO"),
];

/// Resolve a free-text place name to an IATA code. Known city names match
/// case-insensitively; bare 3-letter alphabetic inputs pass through
/// uppercased; anything else is unresolvable.
pub fn resolve_iata(place: &str) -> Option<String> {
    let key = place.trim().to_lowercase();
    if key.is_empty() {
        return None;
    }

    if let Some((_, code)) = CITY_TO_IATA.iter().find(|(name, _)| *name == key) {
        return Some((*code).to_string());
    }

    if key.chars().count() == 3 && key.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some(key.to_uppercase());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_cities_case_insensitive() {
        assert_eq!(resolve_iata("Tokyo"), Some("TYO".to_string()));
        assert_eq!(resolve_iata("NEW DELHI"), Some("DEL".to_string()));
        assert_eq!(resolve_iata("  bombay "), Some("BOM".to_string()));
    }

    #[test]
    fn test_bare_codes_pass_through() {
        assert_eq!(resolve_iata("del"), Some("DEL".to_string()));
        assert_eq!(resolve_iata("SFO"), Some("SFO".to_string()));
    }

    #[test]
    fn test_unknown_names_unresolvable() {
        assert_eq!(resolve_iata("Atlantis"), None);
        assert_eq!(resolve_iata(""), None);
        assert_eq!(resolve_iata("12a"), None);
    }
}
