use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};

const MONTHS: [&str; 12] = [
    "Jan.", "Feb.", "Mar.", "Apr.", "May", "Jun.", "Jul.", "Aug.", "Sep.", "Oct.", "Nov.", "Dec.",
];

/// Ids at or below this are short legacy ids rather than timestamps.
const TIMESTAMP_FLOOR: i64 = 1_000_000_000_000;

pub fn ordinal(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

pub fn parse_iso(iso: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(iso.get(..10)?, "%Y-%m-%d").ok()
}

pub fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `2026-02-15` as `15th Feb. 2026`. Anything unparseable is shown as is.
pub fn format_dex_date(iso: &str) -> String {
    parse_iso(iso).map_or_else(
        || iso.to_owned(),
        |date| {
            format!(
                "{}{} {} {}",
                date.day(),
                ordinal(date.day()),
                MONTHS[date.month0() as usize],
                date.year()
            )
        },
    )
}

pub fn dd_mm(date: NaiveDate) -> String {
    date.format("%d/%m").to_string()
}

/// Birth date for a new animal, `DD/MM/YY`.
pub fn born_on(date: NaiveDate) -> String {
    date.format("%d/%m/%y").to_string()
}

/// Whole days from `iso` to `today`, `None` when the date is missing or bad.
pub fn days_ago(iso: &str, today: NaiveDate) -> Option<i64> {
    parse_iso(iso).map(|date| (today - date).num_days())
}

/// Label for a stat line: `TODAY`, `1 DAY AGO`, `12 DAYS AGO`.
pub fn days_ago_label(iso: &str, today: NaiveDate) -> String {
    match days_ago(iso, today) {
        Some(0) => "TODAY".to_owned(),
        Some(1) => "1 DAY AGO".to_owned(),
        Some(days) => format!("{days} DAYS AGO"),
        None => "--".to_owned(),
    }
}

/// Millisecond timestamp at the start of a log id.
pub fn entry_millis(id: &str) -> Option<i64> {
    let digits = id.find(|c: char| !c.is_ascii_digit()).map_or(id, |end| &id[..end]);
    digits.parse::<i64>().ok().filter(|millis| *millis > TIMESTAMP_FLOOR)
}

/// Local calendar date a log entry was written on, if its id carries one.
pub fn entry_date(id: &str) -> Option<NaiveDate> {
    let millis = entry_millis(id)?;
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|at: DateTime<Local>| at.date_naive())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn ordinals() {
        let suffixes: Vec<_> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 23, 31]
            .into_iter()
            .map(ordinal)
            .collect();
        assert_eq!(
            suffixes,
            ["st", "nd", "rd", "th", "th", "th", "th", "st", "nd", "rd", "st"]
        );
    }

    #[test]
    fn dex_dates() {
        assert_eq!(format_dex_date("2026-02-15"), "15th Feb. 2026");
        assert_eq!(format_dex_date("2025-05-02"), "2nd May 2025");
        assert_eq!(format_dex_date("2026-02-15T10:00:00Z"), "15th Feb. 2026");
        assert_eq!(format_dex_date("soon"), "soon");
    }

    #[test]
    fn short_formats() {
        assert_eq!(dd_mm(date(2026, 2, 5)), "05/02");
        assert_eq!(born_on(date(2023, 3, 15)), "15/03/23");
    }

    #[test]
    fn days_ago_counts_whole_days() {
        let today = date(2026, 2, 15);
        assert_eq!(days_ago("2026-02-12", today), Some(3));
        assert_eq!(days_ago_label("2026-02-15", today), "TODAY");
        assert_eq!(days_ago_label("2026-02-14", today), "1 DAY AGO");
        assert_eq!(days_ago_label("", today), "--");
    }

    #[test]
    fn only_timestamp_ids_carry_a_date() {
        assert_eq!(entry_millis("1"), None);
        assert_eq!(entry_millis("1771156800000"), Some(1_771_156_800_000));
        assert_eq!(entry_millis("1771156800000-rx"), Some(1_771_156_800_000));
        assert!(entry_date("1771156800000").is_some());
        assert_eq!(entry_date("abc"), None);
    }
}
