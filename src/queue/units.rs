//! Rate and byte-count normalization for display.
//!
//! Unit detection is substring-based with single-letter fallbacks (`g`, `m`,
//! `k`, `b`) checked in that priority order. A string that merely contains one
//! of those letters is classified by it; the order is kept stable so values
//! render identically across clients.

#![allow(clippy::cast_precision_loss)]

use std::sync::LazyLock;

use regex::Regex;

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+(\.[0-9]+)?").unwrap_or_else(|_| unreachable!("static pattern compiles"))
});

const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

fn is_zero_expression(raw: &str) -> bool {
    raw.is_empty() || raw == "0" || raw == "0 bps"
}

/// Convert a rate expression to megabits per second.
///
/// `""`, `"0"` and `"0 bps"` are zero; an expression without a leading number
/// is zero; an expression without a recognized unit is treated as raw bps.
#[must_use]
pub fn parse_rate_to_mbps(raw: &str) -> f64 {
    if is_zero_expression(raw) {
        return 0.0;
    }

    let clean: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    let Some(value) = LEADING_NUMBER
        .find(&clean)
        .and_then(|m| m.as_str().parse::<f64>().ok())
    else {
        return 0.0;
    };

    if clean.contains("gbps") || clean.contains('g') {
        value * 1000.0
    } else if clean.contains("mbps") || clean.contains('m') {
        value
    } else if clean.contains("kbps") || clean.contains('k') {
        value / 1000.0
    } else {
        // "bps", a bare "b", or no unit at all: raw bits per second.
        value / 1_000_000.0
    }
}

/// Render a rate expression in the most readable unit.
#[must_use]
pub fn format_rate(raw: &str) -> String {
    if is_zero_expression(raw) {
        return "0 Mbps".to_string();
    }

    let mbps = parse_rate_to_mbps(raw);
    if mbps >= 1000.0 {
        format!("{:.2} Gbps", mbps / 1000.0)
    } else if mbps >= 0.01 {
        format!("{mbps:.2} Mbps")
    } else if mbps > 0.0 {
        format!("{:.0} kbps", mbps * 1000.0)
    } else {
        "0 Mbps".to_string()
    }
}

/// Human-readable byte count with one decimal, capped at TB.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", BYTE_UNITS[unit])
}

/// Utilization percentage with one decimal, e.g. `"85.0%"`.
#[must_use]
pub fn format_utilization(utilization: f64) -> String {
    format!("{utilization:.1}%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn parse_canonical_units() {
        assert!(approx(parse_rate_to_mbps("10Mbps"), 10.0));
        assert!(approx(parse_rate_to_mbps("1Gbps"), 1000.0));
        assert!(approx(parse_rate_to_mbps("500kbps"), 0.5));
        assert!(approx(parse_rate_to_mbps("2500000bps"), 2.5));
        assert!(approx(parse_rate_to_mbps(""), 0.0));
    }

    #[test]
    fn parse_zero_expressions() {
        assert!(approx(parse_rate_to_mbps("0"), 0.0));
        assert!(approx(parse_rate_to_mbps("0 bps"), 0.0));
    }

    #[test]
    fn parse_ignores_whitespace_and_case() {
        assert!(approx(parse_rate_to_mbps(" 12.5  MBPS "), 12.5));
        assert!(approx(parse_rate_to_mbps("1.5 G"), 1500.0));
        assert!(approx(parse_rate_to_mbps("800 k"), 0.8));
    }

    #[test]
    fn parse_without_unit_is_raw_bps() {
        assert!(approx(parse_rate_to_mbps("3000000"), 3.0));
    }

    #[test]
    fn parse_without_leading_number_is_zero() {
        assert!(approx(parse_rate_to_mbps("Mbps"), 0.0));
        assert!(approx(parse_rate_to_mbps("-5Mbps"), 0.0));
        assert!(approx(parse_rate_to_mbps("n/a"), 0.0));
    }

    #[test]
    fn single_letter_priority_is_preserved() {
        // "gbps" wins over "m" even when both letters occur.
        assert!(approx(parse_rate_to_mbps("2gm"), 2000.0));
        // "b" alone is bps, but a stray "m" promotes to Mbps.
        assert!(approx(parse_rate_to_mbps("5mb"), 5.0));
        assert!(approx(parse_rate_to_mbps("7kb"), 0.007));
    }

    #[test]
    fn format_rate_tiers() {
        assert_eq!(format_rate(""), "0 Mbps");
        assert_eq!(format_rate("0"), "0 Mbps");
        assert_eq!(format_rate("0 bps"), "0 Mbps");
        assert_eq!(format_rate("1500Mbps"), "1.50 Gbps");
        assert_eq!(format_rate("1Gbps"), "1.00 Gbps");
        assert_eq!(format_rate("10Mbps"), "10.00 Mbps");
        assert_eq!(format_rate("100Mbps"), "100.00 Mbps");
        assert_eq!(format_rate("500kbps"), "0.50 Mbps");
        assert_eq!(format_rate("10kbps"), "0.01 Mbps");
        assert_eq!(format_rate("5kbps"), "5 kbps");
        assert_eq!(format_rate("garbage"), "0 Mbps");
    }

    #[test]
    fn format_bytes_examples() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512.0 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1_048_576), "1.0 MB");
        assert_eq!(format_bytes(1_073_741_824), "1.0 GB");
    }

    #[test]
    fn format_bytes_caps_at_terabytes() {
        let two_pib = 2 * 1024_u64.pow(5);
        assert_eq!(format_bytes(two_pib), "2048.0 TB");
    }

    #[test]
    fn utilization_has_one_decimal() {
        assert_eq!(format_utilization(85.0), "85.0%");
        assert_eq!(format_utilization(0.04), "0.0%");
        assert_eq!(format_utilization(123.45), "123.5%");
    }

    proptest! {
        #[test]
        fn canonical_mbps_reparses_within_rounding(hundredths in 1_u32..99_999) {
            let mbps = f64::from(hundredths) / 100.0;
            let rendered = format!("{mbps:.2} Mbps");
            let reparsed = parse_rate_to_mbps(&rendered);
            prop_assert!((reparsed - mbps).abs() < 0.005 + 1e-9);
            let again = parse_rate_to_mbps(&format!("{reparsed:.2} Mbps"));
            prop_assert!((again - reparsed).abs() < 1e-9);
        }

        #[test]
        fn parse_never_negative(raw in ".{0,16}") {
            prop_assert!(parse_rate_to_mbps(&raw) >= 0.0);
        }
    }
}
