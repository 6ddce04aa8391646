//! Human-readable token counters.
//!
//! The output alphabet is limited to digits, unit letters, `.`, `,`, spaces and
//! parentheses, so callers may place it in markup without escaping.

use super::types::TokenCount;

/// Compact a token count: `999`, `12.3K`, `1.23M`, `4.56B`
pub fn format_token_count(count: u64) -> String {
    const UNITS: [(f64, &str); 3] = [(1e9, "B"), (1e6, "M"), (1e3, "K")];

    let value = count as f64;
    for (scale, unit) in UNITS {
        if value >= scale {
            let scaled = value / scale;
            return if scaled >= 100.0 {
                format!("{:.0}{}", scaled, unit)
            } else if scaled >= 10.0 {
                format!("{:.1}{}", scaled, unit)
            } else {
                format!("{:.2}{}", scaled, unit)
            };
        }
    }
    count.to_string()
}

/// Summary line for a set of counters
pub fn format_tokens(usage: &TokenCount) -> String {
    format!(
        "{} (in {}, cached {}, out {})",
        format_token_count(usage.total_tokens),
        format_token_count(usage.input_tokens),
        format_token_count(usage.cached_input_tokens),
        format_token_count(usage.output_tokens),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_token_count() {
        assert_eq!(format_token_count(0), "0");
        assert_eq!(format_token_count(999), "999");
        assert_eq!(format_token_count(1_000), "1.00K");
        assert_eq!(format_token_count(12_345), "12.3K");
        assert_eq!(format_token_count(123_456), "123K");
        assert_eq!(format_token_count(1_234_567), "1.23M");
        assert_eq!(format_token_count(4_560_000_000), "4.56B");
    }

    #[test]
    fn test_format_tokens() {
        let usage = TokenCount {
            input_tokens: 1_200,
            cached_input_tokens: 800,
            output_tokens: 45,
            reasoning_output_tokens: 10,
            total_tokens: 1_250,
        };
        assert_eq!(
            format_tokens(&usage),
            "1.25K (in 1.20K, cached 800, out 45)"
        );
    }

    #[test]
    fn test_output_is_markup_safe() {
        let usage = TokenCount {
            input_tokens: u64::MAX,
            cached_input_tokens: 7,
            output_tokens: 123_456_789,
            reasoning_output_tokens: 0,
            total_tokens: 42,
        };
        let text = format_tokens(&usage);
        assert!(!text.contains(['<', '>', '&', '"', '\'']));
    }
}
