//! Minimal TIMEX reader used to tell definite dates from ambiguous ones.
//!
//! Only the parts of the grammar the booking flow relies on are parsed:
//! dates (`2023-06-01`, `XXXX-06-01`, `2023-06`, `2023-W10`,
//! `XXXX-WXX-6`, `2023-SU`), times (`T14`, `T14:30`, `TMO`), durations
//! (`P3D`, `PT2H`), ranges (`(2023-06-01,2023-06-05,P4D)`) and `PRESENT_REF`.

use std::collections::BTreeSet;

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimexType {
    Present,
    Definite,
    Date,
    DateRange,
    Duration,
    Time,
    TimeRange,
    DateTime,
    DateTimeRange,
}

impl TimexType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimexType::Present => "present",
            TimexType::Definite => "definite",
            TimexType::Date => "date",
            TimexType::DateRange => "daterange",
            TimexType::Duration => "duration",
            TimexType::Time => "time",
            TimexType::TimeRange => "timerange",
            TimexType::DateTime => "datetime",
            TimexType::DateTimeRange => "datetimerange",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimexProperty {
    pub now: bool,
    pub year: Option<u32>,
    pub month: Option<u32>,
    pub day_of_month: Option<u32>,
    pub day_of_week: Option<u32>,
    pub week_of_year: Option<u32>,
    pub week_of_month: Option<u32>,
    pub season: Option<String>,
    pub weekend: bool,
    pub part_of_day: Option<String>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub second: Option<u32>,
    pub has_duration: bool,
}

pub fn parse(timex: &str) -> TimexProperty {
    let mut prop = TimexProperty::default();
    let timex = timex.trim();

    if timex == "PRESENT_REF" {
        prop.now = true;
    } else if let Some(inner) = timex.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        // Range: only the start and the duration carry information we need.
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if let Some(start) = parts.first() {
            parse_date_time(start, &mut prop);
        }
        if let Some(duration) = parts.get(2) {
            prop.has_duration = is_duration(duration);
        }
    } else if timex.starts_with('P') {
        prop.has_duration = is_duration(timex);
    } else {
        parse_date_time(timex, &mut prop);
    }

    prop
}

pub fn classify(timex: &str) -> BTreeSet<TimexType> {
    infer_types(&parse(timex))
}

/// A value is ambiguous when it does not pin down one calendar day.
pub fn is_ambiguous(timex: &str) -> bool {
    !classify(timex).contains(&TimexType::Definite)
}

pub fn infer_types(p: &TimexProperty) -> BTreeSet<TimexType> {
    let mut types = BTreeSet::new();

    if p.now {
        types.insert(TimexType::Present);
    }
    if p.year.is_some() && p.month.is_some() && p.day_of_month.is_some() {
        types.insert(TimexType::Definite);
    }
    let is_date = (p.month.is_some() && p.day_of_month.is_some()) || p.day_of_week.is_some();
    if is_date {
        types.insert(TimexType::Date);
    }
    let is_date_range = (p.year.is_some() && p.day_of_month.is_none())
        || (p.month.is_some() && p.day_of_month.is_none())
        || p.season.is_some()
        || p.week_of_year.is_some()
        || p.week_of_month.is_some();
    if is_date_range {
        types.insert(TimexType::DateRange);
    }
    if p.has_duration {
        types.insert(TimexType::Duration);
    }
    let is_time = p.hour.is_some() && p.minute.is_some() && p.second.is_some();
    if is_time {
        types.insert(TimexType::Time);
    }
    let is_time_range = p.part_of_day.is_some();
    if is_time_range {
        types.insert(TimexType::TimeRange);
    }
    if is_date && is_time {
        types.insert(TimexType::DateTime);
    }
    if is_date && is_time_range {
        types.insert(TimexType::DateTimeRange);
    }

    types
}

/// Turn a user's answer into a definite date, or `None` if it is not one.
///
/// Accepts definite TIMEX values (time part dropped) and a handful of
/// written formats, which come back as `YYYY-MM-DD`.
pub fn resolve_user_date(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let candidate = if text.starts_with('(') {
        text
    } else {
        text.split('T').next().unwrap_or(text)
    };
    if !is_ambiguous(candidate) {
        return Some(candidate.to_string());
    }

    const FORMATS: [&str; 11] = [
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%m/%d/%Y",
        "%d.%m.%Y",
        "%B %d %Y",
        "%B %d, %Y",
        "%d %B %Y",
        "%b %d %Y",
        "%b %d, %Y",
        "%d %b %Y",
        "%A %B %d %Y",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
}

fn parse_date_time(s: &str, prop: &mut TimexProperty) {
    match s.split_once('T') {
        Some((date, time)) => {
            if !date.is_empty() {
                parse_date(date, prop);
            }
            parse_time(time, prop);
        }
        None => parse_date(s, prop),
    }
}

fn parse_date(s: &str, prop: &mut TimexProperty) {
    let mut parts = s.split('-');

    match parts.next() {
        Some(year) if year.len() == 4 => prop.year = parse_number(year),
        _ => return,
    }

    match parts.next() {
        Some(week) if week.starts_with('W') => {
            prop.week_of_year = parse_number(&week[1..]);
            match parts.next() {
                Some("WE") => prop.weekend = true,
                Some(day) => prop.day_of_week = parse_number(day).filter(|d| (1..=7).contains(d)),
                None => {}
            }
            return;
        }
        Some(season @ ("SP" | "SU" | "FA" | "WI")) => {
            prop.season = Some(season.to_string());
            return;
        }
        Some(month) => prop.month = parse_number(month).filter(|m| (1..=12).contains(m)),
        None => return,
    }

    match parts.next() {
        Some(week) if week.starts_with('W') => {
            prop.week_of_month = parse_number(&week[1..]);
            match parts.next() {
                Some("WE") => prop.weekend = true,
                Some(day) => prop.day_of_week = parse_number(day).filter(|d| (1..=7).contains(d)),
                None => {}
            }
        }
        Some(day) => prop.day_of_month = parse_number(day).filter(|d| (1..=31).contains(d)),
        None => {}
    }
}

fn parse_time(s: &str, prop: &mut TimexProperty) {
    if matches!(s, "MO" | "AF" | "EV" | "NI" | "DT") {
        prop.part_of_day = Some(s.to_string());
        return;
    }

    let mut parts = s.split(':');
    prop.hour = parts.next().and_then(parse_number).filter(|h| *h < 24);
    if prop.hour.is_some() {
        prop.minute = Some(parts.next().and_then(parse_number).unwrap_or(0));
        prop.second = Some(parts.next().and_then(parse_number).unwrap_or(0));
    }
}

fn is_duration(s: &str) -> bool {
    let Some(body) = s.strip_prefix('P') else {
        return false;
    };
    let mut saw_unit = false;
    let mut digits = String::new();
    for c in body.chars() {
        match c {
            '0'..='9' | '.' => digits.push(c),
            'T' => {}
            'Y' | 'M' | 'W' | 'D' | 'H' | 'S' => {
                if digits.parse::<f64>().is_err() {
                    return false;
                }
                digits.clear();
                saw_unit = true;
            }
            _ => return false,
        }
    }
    saw_unit && digits.is_empty()
}

/// `XX` placeholders and anything non-numeric read as "unspecified".
fn parse_number(s: &str) -> Option<u32> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
