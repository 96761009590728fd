//! Derived per-record metrics and lenient numeric coercion
//!
//! CSV numeric fields are coerced, never rejected: a leading numeric prefix is
//! used when present (`"12.5 USD"` → 12.5) and anything else becomes 0.

/// Round half away from zero to six decimal places
pub fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// Market penetration as a percentage of population, six decimals
///
/// Returns `None` when the population is unknown or zero; the result is
/// always finite.
pub fn market_penetration(order_count: i64, population: Option<u64>) -> Option<f64> {
    match population {
        Some(pop) if pop > 0 => {
            let value = round6(order_count as f64 / pop as f64 * 100.0);
            value.is_finite().then_some(value)
        }
        _ => None,
    }
}

/// Net merchandise value per order, 0 when there are no orders
pub fn mv_per_order(net_mv: f64, order_count: i64) -> f64 {
    if order_count > 0 {
        net_mv / order_count as f64
    } else {
        0.0
    }
}

/// Parse a float leniently; 0 when no numeric prefix exists
pub fn coerce_f64(raw: Option<&str>) -> f64 {
    raw.and_then(|s| float_prefix(s.trim()))
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Parse an integer count leniently (truncating any fraction); 0 otherwise
pub fn coerce_count(raw: Option<&str>) -> i64 {
    raw.and_then(|s| integer_prefix(s.trim()))
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(0)
}

/// Longest prefix of `s` matching `[+-]?digits[.digits][e[+-]digits]`
fn float_prefix(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut end = sign_len(bytes);
    let int_digits = digit_run(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digit_run(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let exp_start = end + 1;
        let exp_sign = sign_len(&bytes[exp_start..]);
        let exp_digits = digit_run(&bytes[exp_start + exp_sign..]);
        if exp_digits > 0 {
            end = exp_start + exp_sign + exp_digits;
        }
    }

    Some(&s[..end])
}

/// Longest prefix of `s` matching `[+-]?digits`
fn integer_prefix(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let sign = sign_len(bytes);
    let digits = digit_run(&bytes[sign..]);
    (digits > 0).then(|| &s[..sign + digits])
}

fn sign_len(bytes: &[u8]) -> usize {
    usize::from(matches!(bytes.first(), Some(b'+') | Some(b'-')))
}

fn digit_run(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_penetration_formula() {
        assert_eq!(market_penetration(50, Some(21000)), Some(0.238095));
        assert_eq!(market_penetration(1, Some(3)), Some(33.333333));
        assert_eq!(market_penetration(0, Some(500)), Some(0.0));
    }

    #[test]
    fn test_penetration_matches_rounded_ratio() {
        for (orders, population) in [(7_i64, 13_u64), (1234, 98765), (99, 100), (5, 1)] {
            let expected = round6(orders as f64 / population as f64 * 100.0);
            assert_eq!(market_penetration(orders, Some(population)), Some(expected));
        }
    }

    #[test]
    fn test_penetration_without_population() {
        assert_eq!(market_penetration(50, None), None);
        assert_eq!(market_penetration(50, Some(0)), None);
    }

    #[test]
    fn test_round6() {
        assert_eq!(round6(0.2380952380), 0.238095);
        assert_eq!(round6(2.0000004), 2.0);
        assert_eq!(round6(-2.5), -2.5);
    }

    #[test]
    fn test_mv_per_order() {
        assert_eq!(mv_per_order(1000.0, 50), 20.0);
        assert_eq!(mv_per_order(1000.0, 0), 0.0);
    }

    #[test]
    fn test_coerce_f64() {
        assert_eq!(coerce_f64(Some("1000")), 1000.0);
        assert_eq!(coerce_f64(Some(" 12.5 USD")), 12.5);
        assert_eq!(coerce_f64(Some("-.5")), -0.5);
        assert_eq!(coerce_f64(Some("1e3")), 1000.0);
        assert_eq!(coerce_f64(Some("3e")), 3.0);
        assert_eq!(coerce_f64(Some("n/a")), 0.0);
        assert_eq!(coerce_f64(Some("")), 0.0);
        assert_eq!(coerce_f64(None), 0.0);
    }

    #[test]
    fn test_coerce_count() {
        assert_eq!(coerce_count(Some("50")), 50);
        assert_eq!(coerce_count(Some("12.9")), 12);
        assert_eq!(coerce_count(Some("1,234")), 1);
        assert_eq!(coerce_count(Some("-3")), -3);
        assert_eq!(coerce_count(Some("abc")), 0);
        assert_eq!(coerce_count(None), 0);
    }
}
