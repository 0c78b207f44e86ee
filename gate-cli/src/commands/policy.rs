//! Policy command - print the effective rate-limit table.

use std::time::Duration;
use sync_gate_core::Policies;
use sync_gate_types::RequestType;

/// Print the policy table to stdout.
pub fn run(policies: &Policies) {
    print!("{}", render(policies));
}

/// Render the policy table as aligned text.
pub fn render(policies: &Policies) -> String {
    let mut out = format!(
        "{:<12} {:>13} {:>13}\n",
        "REQUEST TYPE", "SHORT WINDOW", "LONG WINDOW"
    );

    for request_type in RequestType::ALL {
        let (short, long) = match policies.tier(request_type) {
            Some(tier) => (
                format!("{} / {}", tier.short_limit, format_duration(tier.short_window)),
                format!("{} / {}", tier.long_limit, format_duration(tier.long_window)),
            ),
            None => (
                "-".to_string(),
                format!("1 / {}", format_duration(policies.automated_interval)),
            ),
        };
        out.push_str(&format!("{:<12} {:>13} {:>13}\n", request_type, short, long));
    }
    out
}

/// Format a duration with the largest whole unit (`8h`, `30m`, `45s`).
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs > 0 && secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs > 0 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_picks_largest_unit() {
        assert_eq!(format_duration(Duration::from_secs(8 * 3600)), "8h");
        assert_eq!(format_duration(Duration::from_secs(180)), "3m");
        assert_eq!(format_duration(Duration::from_secs(90)), "90s");
        assert_eq!(format_duration(Duration::ZERO), "0s");
    }

    #[test]
    fn render_lists_every_request_type() {
        let table = render(&Policies::default());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("Automated"));
        assert!(lines[1].ends_with("1 / 8h"));
        assert!(lines[2].contains("2 / 3m"));
        assert!(lines[2].ends_with("5 / 30m"));
        assert!(lines[3].contains("1 / 3m"));
        assert!(lines[3].ends_with("3 / 30m"));
    }
}
