//! CLI argument validators.
//!
//! Shared validation functions for CLI argument parsing.

/// Parse and validate a timing tolerance in seconds.
pub fn parse_jitter_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !value.is_finite() || value <= 0.0 {
        return Err(format!(
            "jitter threshold must be a positive number of seconds, got {value}"
        ));
    }

    Ok(value)
}

/// Parse a byte size with an optional binary suffix (`K`, `M`, `G`, `T`).
///
/// `512`, `64K`, `1.5G` and `2TiB` are all accepted; suffixes are case
/// insensitive and may end in `B` or `iB`.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let trimmed = s.trim();
    let upper = trimmed.to_ascii_uppercase();
    let without_unit = upper
        .strip_suffix("IB")
        .or_else(|| upper.strip_suffix('B'))
        .unwrap_or(&upper);

    let (number, multiplier) = match without_unit.chars().last() {
        Some('K') => (&without_unit[..without_unit.len() - 1], 1u64 << 10),
        Some('M') => (&without_unit[..without_unit.len() - 1], 1u64 << 20),
        Some('G') => (&without_unit[..without_unit.len() - 1], 1u64 << 30),
        Some('T') => (&without_unit[..without_unit.len() - 1], 1u64 << 40),
        _ => (without_unit, 1),
    };

    if let Ok(value) = number.parse::<u64>() {
        return value
            .checked_mul(multiplier)
            .ok_or_else(|| format!("size '{trimmed}' is too large"));
    }

    let value: f64 = number
        .parse()
        .map_err(|_| format!("'{trimmed}' is not a valid size"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("'{trimmed}' is not a valid size"));
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let bytes = (value * multiplier as f64) as u64;
    Ok(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_jitter_threshold_valid() {
        assert_eq!(parse_jitter_threshold("0.01").ok(), Some(0.01));
        assert_eq!(parse_jitter_threshold("2").ok(), Some(2.0));
    }

    #[test]
    fn test_parse_jitter_threshold_invalid() {
        assert!(parse_jitter_threshold("0").is_err());
        assert!(parse_jitter_threshold("-0.1").is_err());
        assert!(parse_jitter_threshold("inf").is_err());
        assert!(parse_jitter_threshold("abc").is_err());
    }

    #[test]
    fn test_parse_size_plain_bytes() {
        assert_eq!(parse_size("4096").ok(), Some(4096));
        assert_eq!(parse_size(" 100 ").ok(), Some(100));
    }

    #[test]
    fn test_parse_size_suffixes() {
        assert_eq!(parse_size("64K").ok(), Some(64 * 1024));
        assert_eq!(parse_size("2m").ok(), Some(2 * 1024 * 1024));
        assert_eq!(parse_size("1GiB").ok(), Some(1 << 30));
        assert_eq!(parse_size("1TB").ok(), Some(1 << 40));
        assert_eq!(parse_size("1.5K").ok(), Some(1536));
    }

    #[test]
    fn test_parse_size_invalid() {
        let err = parse_size("lots");
        assert!(err.unwrap_err().contains("not a valid size"));
        assert!(parse_size("-5").is_err());
        assert!(parse_size("99999999999T").is_err());
    }
}
