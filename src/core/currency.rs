use std::sync::OnceLock;

use regex::Regex;

/// Fixed symbol → ISO-code table. Multi-character symbols come first so a
/// shorter substring match cannot shadow them (`S$` before `$`).
pub const CURRENCY_SYMBOLS: &[(&str, &str)] = &[
    ("د.إ", "AED"),
    ("S$", "SGD"),
    ("$", "USD"),
    ("€", "EUR"),
    ("£", "GBP"),
    ("₹", "INR"),
    ("¥", "JPY"),
    ("₩", "KRW"),
    ("₺", "TRY"),
    ("₫", "VND"),
    ("฿", "THB"),
];

pub const DEFAULT_CURRENCY: &str = "USD";

fn code_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[A-Z]{3}\b").unwrap())
}

/// Map a free-text budget string to an ISO 3-letter currency code.
///
/// Symbol membership wins; otherwise the first free-standing 3-letter
/// alphabetic token of the uppercased string; otherwise `USD`.
pub fn resolve_currency(budget: &str) -> String {
    for (symbol, code) in CURRENCY_SYMBOLS {
        if budget.contains(symbol) {
            return (*code).to_string();
        }
    }

    let upper = budget.to_uppercase();
    if let Some(token) = code_token_re().find(&upper) {
        return token.as_str().to_string();
    }

    DEFAULT_CURRENCY.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_wins_regardless_of_text() {
        assert_eq!(resolve_currency("₹15,000"), "INR");
        assert_eq!(resolve_currency("roughly €2k for two"), "EUR");
        assert_eq!(resolve_currency("£900"), "GBP");
        assert_eq!(resolve_currency("¥80000"), "JPY");
        assert_eq!(resolve_currency("฿40000 total"), "THB");
    }

    #[test]
    fn test_multi_char_symbols_not_shadowed() {
        assert_eq!(resolve_currency("S$3000"), "SGD");
        assert_eq!(resolve_currency("د.إ 5000"), "AED");
    }

    #[test]
    fn test_bare_code_fallback() {
        assert_eq!(resolve_currency("amount 20000 EUR please"), "EUR");
        assert_eq!(resolve_currency("20000 inr"), "INR");
    }

    #[test]
    fn test_default_usd() {
        assert_eq!(resolve_currency("20000"), "USD");
        assert_eq!(resolve_currency(""), "USD");
    }
}
