//! Number formatting for human output.

/// Format a percentage, no decimals.
#[must_use]
pub fn format_percent(value: f64) -> String {
    format!("{value:.0}%")
}

/// Format a cost in USD.
///
/// Per-request estimates are often fractions of a cent, so small values keep
/// more digits.
#[must_use]
pub fn format_cost(value: f64) -> String {
    if value == 0.0 {
        "$0.00".to_string()
    } else if value.abs() < 0.01 {
        format!("${value:.6}")
    } else {
        format!("${value:.2}")
    }
}

/// Format a latency in milliseconds.
#[must_use]
pub fn format_latency(ms: u64) -> String {
    if ms >= 1_000 {
        #[allow(clippy::cast_precision_loss)]
        let secs = ms as f64 / 1_000.0;
        format!("{secs:.1}s")
    } else {
        format!("{ms}ms")
    }
}

/// Format a token count compactly.
#[must_use]
pub fn format_tokens(value: u64) -> String {
    fn format_compact(value: u64, divisor: u64, suffix: &str) -> String {
        let major = value / divisor;
        let minor = (value % divisor) / (divisor / 10);
        format!("{major}.{minor}{suffix}")
    }

    if value >= 1_000_000 {
        format_compact(value, 1_000_000, "M")
    } else if value >= 1_000 {
        format_compact(value, 1_000, "K")
    } else {
        value.to_string()
    }
}

/// Format a duration in seconds as `1h 5m`, `3m 20s` or `45s`.
#[must_use]
pub fn format_uptime(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let (hours, minutes, secs) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_keeps_precision_for_fractions_of_a_cent() {
        assert_eq!(format_cost(0.0), "$0.00");
        assert_eq!(format_cost(0.000_075), "$0.000075");
        assert_eq!(format_cost(1.5), "$1.50");
    }

    #[test]
    fn latency_switches_to_seconds() {
        assert_eq!(format_latency(800), "800ms");
        assert_eq!(format_latency(2000), "2.0s");
    }

    #[test]
    fn tokens_millions() {
        assert_eq!(format_tokens(1_500_000), "1.5M");
    }

    #[test]
    fn tokens_thousands() {
        assert_eq!(format_tokens(12_500), "12.5K");
    }

    #[test]
    fn tokens_small() {
        assert_eq!(format_tokens(500), "500");
    }

    #[test]
    fn percent_rounds() {
        assert_eq!(format_percent(74.6), "75%");
    }

    #[test]
    fn uptime_units() {
        assert_eq!(format_uptime(45), "45s");
        assert_eq!(format_uptime(200), "3m 20s");
        assert_eq!(format_uptime(3900), "1h 5m");
        assert_eq!(format_uptime(-4), "0s");
    }
}
