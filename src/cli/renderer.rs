use colored::{control, Colorize};

use crate::core::formatter::{format_reset_countdown, format_usage_bar, format_used_percent};
use crate::core::models::usage::{AggregatedSnapshot, UsageRecord};
use crate::core::providers::Provider;

const BAR_WIDTH: usize = 12;

/// Render a snapshot as one block per provider.
///
/// Providers with an empty slot are omitted entirely; a reachable provider
/// without consumption data renders as "Connected".
///
/// ```text
///  Claude
///   Session   26% used [███░░░░░░░░░]
///             Resets in 2h 15m
///   Period    61% used [███████░░░░░]
/// ```
pub fn render_snapshot(snapshot: &AggregatedSnapshot, use_color: bool) -> String {
    control::set_override(use_color);

    let mut sections: Vec<String> = Vec::new();
    for provider in Provider::all() {
        if let Some(record) = snapshot.get(*provider) {
            sections.push(render_provider(*provider, record));
        }
    }
    control::unset_override();
    sections.join("\n\n")
}

fn render_provider(provider: Provider, record: &UsageRecord) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(format!(" {}", provider.display_name()).bold().to_string());

    if is_bare_connected(record) {
        lines.push(format!("  {}", "Connected".green()));
        return lines.join("\n");
    }

    render_window(
        &mut lines,
        "Session",
        record.session_percent,
        record.session_reset_at.as_ref(),
    );
    render_window(
        &mut lines,
        "Period ",
        record.period_percent,
        record.period_reset_at.as_ref(),
    );
    lines.join("\n")
}

fn render_window(
    lines: &mut Vec<String>,
    label: &str,
    used_percent: f64,
    resets_at: Option<&chrono::DateTime<chrono::Utc>>,
) {
    let bar = format_usage_bar(used_percent, BAR_WIDTH);
    let percent = format_used_percent(used_percent);
    let colored_percent = if used_percent >= 90.0 {
        percent.red().to_string()
    } else if used_percent >= 70.0 {
        percent.yellow().to_string()
    } else {
        percent.green().to_string()
    };
    lines.push(format!("  {}   {} {}", label.cyan(), colored_percent, bar));
    if let Some(reset) = resets_at {
        lines.push(format!("            {}", format_reset_countdown(reset)));
    }
}

fn is_bare_connected(record: &UsageRecord) -> bool {
    record.session_percent == 0.0
        && record.period_percent == 0.0
        && record.session_reset_at.is_none()
        && record.period_reset_at.is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(snapshot: &AggregatedSnapshot) -> String {
        render_snapshot(snapshot, false)
    }

    #[test]
    fn empty_slots_are_omitted() {
        let snapshot = AggregatedSnapshot::new(
            Some(UsageRecord::from_windows(26.0, Some(61.0), None, None)),
            None,
            None,
        );
        let text = plain(&snapshot);
        assert!(text.contains("Claude"));
        assert!(!text.contains("Codex"));
        assert!(!text.contains("Gemini"));
    }

    #[test]
    fn usage_windows_render_with_bars() {
        let snapshot = AggregatedSnapshot::new(
            Some(UsageRecord::from_windows(26.0, Some(61.0), None, None)),
            None,
            None,
        );
        let text = plain(&snapshot);
        assert!(text.contains("Session"));
        assert!(text.contains("26% used"));
        assert!(text.contains("61% used"));
        assert!(text.contains('['));
    }

    #[test]
    fn connected_record_renders_as_connected() {
        let snapshot =
            AggregatedSnapshot::new(None, None, Some(UsageRecord::connected()));
        let text = plain(&snapshot);
        assert!(text.contains("Gemini"));
        assert!(text.contains("Connected"));
        assert!(!text.contains("% used"));
    }

    #[test]
    fn reset_countdown_shown_when_known() {
        let reset = chrono::Utc::now() + chrono::Duration::minutes(90);
        let snapshot = AggregatedSnapshot::new(
            Some(UsageRecord::from_windows(10.0, None, Some(reset), None)),
            None,
            None,
        );
        let text = plain(&snapshot);
        assert!(text.contains("Resets in"));
    }

    #[test]
    fn all_empty_renders_nothing() {
        let snapshot = AggregatedSnapshot::new(None, None, None);
        assert!(plain(&snapshot).is_empty());
    }
}
