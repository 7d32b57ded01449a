//! Go-style duration parsing (`1h`, `90s`, `1h30m`, `1.5h`, `250ms`).

use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SECOND: u128 = 1_000_000_000;
const NANOS_PER_MINUTE: u128 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MINUTE;

/// Parse a duration written as a sequence of `<number><unit>` components.
///
/// Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. Numbers may
/// carry a fractional part. A bare `0` is accepted; signs are not.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidDuration`] when the input is empty, contains
/// an unknown unit or a malformed number, or overflows.
pub fn parse_duration(input: &str) -> ConfigResult<Duration> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::invalid_duration(input, "empty"));
    }
    if trimmed == "0" {
        return Ok(Duration::ZERO);
    }

    let mut rest = trimmed;
    let mut total: u128 = 0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(ConfigError::invalid_duration(input, "missing_number"));
        }
        let (number, tail) = rest.split_at(number_len);

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_len);
        if unit.is_empty() {
            return Err(ConfigError::invalid_duration(input, "missing_unit"));
        }
        let scale =
            unit_nanos(unit).ok_or_else(|| ConfigError::invalid_duration(input, "unknown_unit"))?;

        let component = component_nanos(number, scale)
            .ok_or_else(|| ConfigError::invalid_duration(input, "invalid_number"))?;
        total = total
            .checked_add(component)
            .ok_or_else(|| ConfigError::invalid_duration(input, "out_of_range"))?;
        rest = next;
    }

    let nanos =
        u64::try_from(total).map_err(|_| ConfigError::invalid_duration(input, "out_of_range"))?;
    Ok(Duration::from_nanos(nanos))
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SECOND),
        "m" => Some(NANOS_PER_MINUTE),
        "h" => Some(NANOS_PER_HOUR),
        _ => None,
    }
}

fn component_nanos(number: &str, scale: u128) -> Option<u128> {
    let (whole, fraction) = match number.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (number, ""),
    };
    if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
        return None;
    }

    let whole_value: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().ok()?
    };
    let mut nanos = whole_value.checked_mul(scale)?;

    let mut divisor: u128 = 1;
    for digit in fraction.chars() {
        divisor = divisor.checked_mul(10)?;
        let value = u128::from(digit.to_digit(10)?);
        nanos = nanos.checked_add(value.checked_mul(scale)? / divisor)?;
    }
    Some(nanos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_units() -> ConfigResult<()> {
        assert_eq!(parse_duration("1h")?, Duration::from_secs(3_600));
        assert_eq!(parse_duration("90s")?, Duration::from_secs(90));
        assert_eq!(parse_duration("250ms")?, Duration::from_millis(250));
        assert_eq!(parse_duration("15m")?, Duration::from_secs(900));
        assert_eq!(parse_duration("10us")?, Duration::from_micros(10));
        assert_eq!(parse_duration("7ns")?, Duration::from_nanos(7));
        Ok(())
    }

    #[test]
    fn parses_compound_and_fractional_values() -> ConfigResult<()> {
        assert_eq!(parse_duration("1h30m")?, Duration::from_secs(5_400));
        assert_eq!(parse_duration("1.5h")?, Duration::from_secs(5_400));
        assert_eq!(parse_duration(".5s")?, Duration::from_millis(500));
        assert_eq!(parse_duration("2m3.25s")?, Duration::from_millis(123_250));
        assert_eq!(parse_duration("0")?, Duration::ZERO);
        Ok(())
    }

    #[test]
    fn rejects_malformed_input() {
        for input in ["", "   ", "10", "h", "5x", "-1h", "1..5s", ".s", "1h-"] {
            assert!(
                matches!(
                    parse_duration(input),
                    Err(ConfigError::InvalidDuration { .. })
                ),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn rejects_overflow() {
        assert!(matches!(
            parse_duration("99999999999999999999999h"),
            Err(ConfigError::InvalidDuration { .. })
        ));
    }
}
