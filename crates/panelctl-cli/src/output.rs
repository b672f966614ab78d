//! Output formatting helpers shared by the command modules.

/// Truncate a string to `max` characters, appending an ellipsis when cut.
pub fn truncate(s: &str, max: usize) -> String {
    let count = s.chars().count();
    if count <= max {
        s.to_string()
    } else {
        format!("{}…", s.chars().take(max - 1).collect::<String>())
    }
}

/// Render an optional ISO timestamp, keeping just the date part.
pub fn short_date(ts: Option<&str>) -> String {
    ts.map_or_else(
        || "-".to_string(),
        |t| t.split('T').next().unwrap_or(t).to_string(),
    )
}

/// Render a traffic allowance; 0 means unlimited.
pub fn traffic_limit(gb: f64) -> String {
    if gb <= 0.0 {
        "unlimited".to_string()
    } else {
        format!("{gb} GB")
    }
}

/// yes/no flags for table cells.
pub const fn yes_no(v: bool) -> &'static str {
    if v { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_strings_unchanged() {
        assert_eq!(truncate("bob", 10), "bob");
    }

    #[test]
    fn truncate_cuts_with_ellipsis() {
        assert_eq!(truncate("abcdefgh", 5), "abcd…");
    }

    #[test]
    fn short_date_strips_time() {
        assert_eq!(short_date(Some("2026-09-30T00:00:00")), "2026-09-30");
        assert_eq!(short_date(None), "-");
    }

    #[test]
    fn zero_traffic_limit_means_unlimited() {
        assert_eq!(traffic_limit(0.0), "unlimited");
        assert_eq!(traffic_limit(50.0), "50 GB");
    }
}
