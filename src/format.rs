//! Display formatting shared by every report surface.
//!
//! All views format numbers through these helpers so percentages,
//! currency, and durations read the same everywhere.

use crate::analysis::stats::round1;

/// Formats a percentage with one decimal, e.g. `33.3%`.
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", round1(value))
}

/// Formats an amount as dollars with thousands separators, e.g. `$1,234.56`.
pub fn format_currency(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let cents = format!("{:.2}", value.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    format!("{}${}.{}", sign, group_thousands(int_part), dec_part)
}

/// Formats a count with thousands separators, e.g. `12,408`.
pub fn format_count(count: usize) -> String {
    group_thousands(&count.to_string())
}

/// Formats a duration given in minutes, e.g. `45m` or `2h 30m`.
pub fn format_minutes(minutes: f64) -> String {
    let total = minutes.round().max(0.0) as i64;
    if total < 60 {
        return format!("{}m", total);
    }
    let hours = total / 60;
    let rem = total % 60;
    if rem == 0 {
        format!("{}h", hours)
    } else {
        format!("{}h {}m", hours, rem)
    }
}

/// Formats a duration given in hours, e.g. `3h 30m` or `2d 4h`.
///
/// Minutes are dropped once the duration crosses a day.
pub fn format_hours(hours: f64) -> String {
    let total_minutes = (hours * 60.0).round().max(0.0) as i64;
    if total_minutes < 60 {
        return format!("{}m", total_minutes);
    }

    let days = total_minutes / (24 * 60);
    let rem_hours = (total_minutes % (24 * 60)) / 60;
    let rem_minutes = total_minutes % 60;

    if days > 0 {
        if rem_hours > 0 {
            format!("{}d {}h", days, rem_hours)
        } else {
            format!("{}d", days)
        }
    } else if rem_minutes > 0 {
        format!("{}h {}m", rem_hours, rem_minutes)
    } else {
        format!("{}h", rem_hours)
    }
}

/// Renders a unit-interval fraction as a text bar of the given width.
pub fn format_bar(fraction: f64, width: usize) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * width as f64).round() as usize;
    "█".repeat(filled)
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
