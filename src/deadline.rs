use chrono::{DateTime, TimeZone, Utc};

/// Parse a deadline entered as `dd-mm-yyyy`, `dd.mm.yyyy` or `dd mm yyyy`.
///
/// Mixed or repeated separators collapse. Returns `None` for blank input,
/// malformed strings and calendar-invalid dates.
pub fn parse_deadline(input: &str) -> Option<DateTime<Utc>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parts: Vec<&str> = trimmed
        .split(|c: char| c == '-' || c == '.' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect();
    if parts.len() != 3 {
        return None;
    }

    let day: u32 = parts[0].parse().ok()?;
    let month: u32 = parts[1].parse().ok()?;
    let year: i32 = parts[2].parse().ok()?;

    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).single()
}

/// Render a deadline as `dd.mm.yyyy`, or a placeholder when absent.
pub fn format_deadline(deadline: Option<&DateTime<Utc>>) -> String {
    match deadline {
        Some(dt) => dt.format("%d.%m.%Y").to_string(),
        None => "—".to_string(),
    }
}
