use chrono::{DateTime, Utc};

/// Returns "{percent}% used", rounded to the nearest integer.
pub fn format_used_percent(used_percent: f64) -> String {
    let used = used_percent.clamp(0.0, 100.0).round() as u64;
    format!("{}% used", used)
}

/// Returns "[██░░░░░░░░░░]" where █ = used portion, ░ = headroom.
pub fn format_usage_bar(used_percent: f64, width: usize) -> String {
    let used_percent = used_percent.clamp(0.0, 100.0);
    let used_blocks = ((used_percent / 100.0) * width as f64).round() as usize;
    let free_blocks = width.saturating_sub(used_blocks);
    format!("[{}{}]", "█".repeat(used_blocks), "░".repeat(free_blocks))
}

/// Returns "Resets in Xh Ym" relative to now; "Resets now" if past.
/// Spans beyond a day include the day count.
pub fn format_reset_countdown(resets_at: &DateTime<Utc>) -> String {
    let total_seconds = (*resets_at - Utc::now()).num_seconds();
    if total_seconds <= 0 {
        return "Resets now".to_string();
    }

    let total_minutes = total_seconds / 60;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 24 {
        let days = hours / 24;
        let rest = hours % 24;
        if rest == 0 {
            format!("Resets in {}d", days)
        } else {
            format!("Resets in {}d {}h", days, rest)
        }
    } else if hours > 0 {
        format!("Resets in {}h {}m", hours, minutes)
    } else {
        format!("Resets in {}m", total_minutes.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn format_used_percent_rounds_and_clamps() {
        assert_eq!(format_used_percent(28.4), "28% used");
        assert_eq!(format_used_percent(0.0), "0% used");
        assert_eq!(format_used_percent(110.0), "100% used");
    }

    #[test]
    fn usage_bar_proportions() {
        assert_eq!(format_usage_bar(0.0, 4), "[░░░░]");
        assert_eq!(format_usage_bar(50.0, 4), "[██░░]");
        assert_eq!(format_usage_bar(100.0, 4), "[████]");
    }

    #[test]
    fn countdown_past_is_now() {
        let past = Utc::now() - Duration::seconds(10);
        assert_eq!(format_reset_countdown(&past), "Resets now");
    }

    #[test]
    fn countdown_minutes_only() {
        let future = Utc::now() + Duration::minutes(45);
        let result = format_reset_countdown(&future);
        assert!(result.starts_with("Resets in "));
        assert!(result.ends_with('m'));
        assert!(!result.contains('h'));
    }

    #[test]
    fn countdown_hours_and_minutes() {
        let future = Utc::now() + Duration::minutes(135);
        let result = format_reset_countdown(&future);
        assert!(result.contains('h'));
        assert!(result.contains('m'));
    }

    #[test]
    fn countdown_days() {
        let future = Utc::now() + Duration::hours(49);
        let result = format_reset_countdown(&future);
        assert!(result.contains('d'));
    }
}
