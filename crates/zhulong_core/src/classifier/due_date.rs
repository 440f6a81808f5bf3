//! Relative and absolute due-date expressions.
//!
//! # Responsibility
//! - Detect whether free text carries a due-date expression.
//! - Resolve the expression against a reference time in the caller's offset.
//!
//! # Invariants
//! - Detection and resolution are separate: a detected expression that cannot
//!   be resolved yields `DueDate::Unresolved`, never an error.
//! - A date without a time resolves to 09:00 (20:00 for evening words).
//! - A time without a date resolves to its next occurrence after `now`.
//! - `晚上12点` is the midnight that closes its day.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Weekday};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static RELATIVE_OFFSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bin\s+(\d{1,4}|an?|one|two|three)\s+(minute|min|hour|hr|day|week)s?\b")
        .expect("valid relative offset regex")
});
static ZH_RELATIVE_OFFSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,4})\s*(分钟|小时|个小时|天|周)[之以]?后").expect("valid zh offset regex")
});
static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{4})[-/](\d{1,2})[-/](\d{1,2})(?:[T ](\d{1,2}):(\d{2}))?\b")
        .expect("valid iso date regex")
});
static DAY_WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(day after tomorrow|tomorrow|today|tonight)\b|(大后天|后天|明天|明晚|今天|今晚)")
        .expect("valid day word regex")
});
static WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:(next|this|on)\s+)?(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
    )
    .expect("valid weekday regex")
});
static ZH_WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(下|这|本)?(?:周|星期|礼拜)([一二三四五六日天])").expect("valid zh weekday regex")
});
static MERIDIEM_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?::(\d{2}))?\s*(a\.?m\.?|p\.?m\.?)(?:\s|$|[,.;!?])")
        .expect("valid meridiem time regex")
});
static CLOCK_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2}):(\d{2})\b").expect("valid clock time regex"));
static AT_HOUR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bat\s+(\d{1,2})\b").expect("valid at-hour regex"));
static NAMED_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(noon|midnight)\b").expect("valid named time regex"));
static ZH_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(凌晨|上午|早上|中午|下午|傍晚|晚上)?\s*(\d{1,2})\s*[点點时](半|(\d{1,2})分?)?")
        .expect("valid zh time regex")
});

const DEFAULT_HOUR: u32 = 9;
const EVENING_HOUR: u32 = 20;

/// Outcome of scanning text for a due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueDate {
    /// No date or time expression in the text.
    Absent,
    /// An expression was found but does not name a valid instant.
    Unresolved,
    /// Resolved instant in the reference offset.
    At(DateTime<FixedOffset>),
}

impl DueDate {
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Absent)
    }

    pub fn resolved(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::At(value) => Some(*value),
            _ => None,
        }
    }
}

/// Scans `text` for a due-date expression relative to `now`.
pub fn find_due_date(text: &str, now: DateTime<FixedOffset>) -> DueDate {
    if let Some(caps) = RELATIVE_OFFSET_RE.captures(text) {
        return resolve_offset(&caps[1], &caps[2], now);
    }
    if let Some(caps) = ZH_RELATIVE_OFFSET_RE.captures(text) {
        return resolve_offset(&caps[1], &caps[2], now);
    }

    let day = find_day(text, now);
    let time = find_time(text);
    if day.is_none() && time.is_none() {
        return DueDate::Absent;
    }

    let (date, evening, day_time) = match day {
        Some(Some(found)) => (Some(found.date), found.evening, found.time),
        Some(None) => return DueDate::Unresolved,
        None => (None, false, None),
    };
    let time = match (day_time, time) {
        (Some(value), _) => Some(FoundTime::at(value)),
        (None, Some(Some(value))) => Some(value),
        (None, Some(None)) => return DueDate::Unresolved,
        (None, None) => None,
    };

    let naive = match (date, time) {
        (Some(date), Some(found)) if found.closes_day => match date.succ_opt() {
            Some(next) => next.and_time(found.time),
            None => return DueDate::Unresolved,
        },
        (Some(date), Some(found)) => date.and_time(found.time),
        (Some(date), None) => {
            let hour = if evening { EVENING_HOUR } else { DEFAULT_HOUR };
            match date.and_hms_opt(hour, 0, 0) {
                Some(value) => value,
                None => return DueDate::Unresolved,
            }
        }
        (None, Some(found)) => {
            let today = now.date_naive().and_time(found.time);
            if today <= now.naive_local() {
                today + Duration::days(1)
            } else {
                today
            }
        }
        (None, None) => return DueDate::Absent,
    };

    match now.offset().from_local_datetime(&naive).single() {
        Some(value) => DueDate::At(value),
        None => DueDate::Unresolved,
    }
}

struct FoundDay {
    date: NaiveDate,
    evening: bool,
    /// Clock time written into an ISO timestamp.
    time: Option<NaiveTime>,
}

struct FoundTime {
    time: NaiveTime,
    /// Midnight at the end of the stated day rather than its start.
    closes_day: bool,
}

impl FoundTime {
    fn at(time: NaiveTime) -> Self {
        Self {
            time,
            closes_day: false,
        }
    }
}

/// `None` when no day expression exists, `Some(None)` when one exists but is
/// not a real calendar date.
fn find_day(text: &str, now: DateTime<FixedOffset>) -> Option<Option<FoundDay>> {
    let today = now.date_naive();

    if let Some(caps) = ISO_DATE_RE.captures(text) {
        let date = parse_u32(&caps[2])
            .zip(parse_u32(&caps[3]))
            .zip(caps[1].parse::<i32>().ok())
            .and_then(|((month, day), year)| NaiveDate::from_ymd_opt(year, month, day));
        let time = match (caps.get(4), caps.get(5)) {
            (Some(hour), Some(minute)) => {
                match parse_u32(hour.as_str())
                    .zip(parse_u32(minute.as_str()))
                    .and_then(|(hour, minute)| NaiveTime::from_hms_opt(hour, minute, 0))
                {
                    Some(value) => Some(value),
                    None => return Some(None),
                }
            }
            _ => None,
        };
        return Some(date.map(|date| FoundDay {
            date,
            evening: false,
            time,
        }));
    }

    if let Some(caps) = DAY_WORD_RE.captures(text) {
        let word = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_lowercase())
            .unwrap_or_default();
        let (offset, evening) = match word.as_str() {
            "today" | "今天" => (0, false),
            "tonight" | "今晚" => (0, true),
            "tomorrow" | "明天" => (1, false),
            "明晚" => (1, true),
            "day after tomorrow" | "后天" => (2, false),
            "大后天" => (3, false),
            _ => return Some(None),
        };
        return Some(
            today
                .checked_add_signed(Duration::days(offset))
                .map(|date| FoundDay {
                    date,
                    evening,
                    time: None,
                }),
        );
    }

    if let Some(caps) = WEEKDAY_RE.captures(text) {
        let allow_today = caps
            .get(1)
            .is_some_and(|m| m.as_str().eq_ignore_ascii_case("this"));
        let weekday = caps[2].to_lowercase().parse::<Weekday>().ok()?;
        return Some(Some(FoundDay {
            date: next_weekday(today, weekday, allow_today),
            evening: false,
            time: None,
        }));
    }

    if let Some(caps) = ZH_WEEKDAY_RE.captures(text) {
        let weekday = zh_weekday(&caps[2])?;
        let date = match caps.get(1).map(|m| m.as_str()) {
            Some("下") => {
                let monday_next_week = today
                    + Duration::days(7 - i64::from(today.weekday().num_days_from_monday()));
                monday_next_week + Duration::days(i64::from(weekday.num_days_from_monday()))
            }
            Some(_) => next_weekday(today, weekday, true),
            None => next_weekday(today, weekday, false),
        };
        return Some(Some(FoundDay {
            date,
            evening: false,
            time: None,
        }));
    }

    None
}

/// `None` when no time expression exists, `Some(None)` when one exists but
/// names an impossible clock time.
fn find_time(text: &str) -> Option<Option<FoundTime>> {
    if let Some(caps) = MERIDIEM_TIME_RE.captures(text) {
        let hour = parse_u32(&caps[1])?;
        let minute = optional_minute(&caps, 2)?;
        let pm = caps[3].to_ascii_lowercase().starts_with('p');
        let hour = match (hour, pm) {
            (1..=11, true) => hour + 12,
            (12, false) => 0,
            (1..=12, _) => hour,
            _ => return Some(None),
        };
        return Some(NaiveTime::from_hms_opt(hour, minute, 0).map(FoundTime::at));
    }

    if let Some(caps) = CLOCK_TIME_RE.captures(text) {
        let hour = parse_u32(&caps[1])?;
        let minute = parse_u32(&caps[2])?;
        return Some(NaiveTime::from_hms_opt(hour, minute, 0).map(FoundTime::at));
    }

    if let Some(caps) = ZH_TIME_RE.captures(text) {
        let hour = parse_u32(&caps[2])?;
        let minute = match caps.get(3).map(|m| m.as_str()) {
            Some("半") => 30,
            Some(_) => optional_minute(&caps, 4)?,
            None => 0,
        };
        let (hour, closes_day) = match caps.get(1).map(|m| m.as_str()) {
            Some("晚上") if hour == 12 => (0, true),
            Some("凌晨") if hour == 12 => (0, false),
            Some("下午" | "傍晚" | "晚上") if hour < 12 => (hour + 12, false),
            Some("中午") if hour < 11 => (hour + 12, false),
            _ => (hour, false),
        };
        return Some(
            NaiveTime::from_hms_opt(hour, minute, 0).map(|time| FoundTime { time, closes_day }),
        );
    }

    if let Some(caps) = NAMED_TIME_RE.captures(text) {
        let hour = if caps[1].eq_ignore_ascii_case("noon") {
            12
        } else {
            0
        };
        return Some(NaiveTime::from_hms_opt(hour, 0, 0).map(FoundTime::at));
    }

    if let Some(caps) = AT_HOUR_RE.captures(text) {
        let hour = parse_u32(&caps[1])?;
        return Some(NaiveTime::from_hms_opt(hour, 0, 0).map(FoundTime::at));
    }

    None
}

fn resolve_offset(amount: &str, unit: &str, now: DateTime<FixedOffset>) -> DueDate {
    let amount = match amount.to_ascii_lowercase().as_str() {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        digits => match digits.parse::<i64>() {
            Ok(value) => value,
            Err(_) => return DueDate::Unresolved,
        },
    };
    let step = match unit.to_ascii_lowercase().as_str() {
        "minute" | "min" | "分钟" => Duration::minutes(amount),
        "hour" | "hr" | "小时" | "个小时" => Duration::hours(amount),
        "day" | "天" => Duration::days(amount),
        "week" | "周" => Duration::weeks(amount),
        _ => return DueDate::Unresolved,
    };
    match now.checked_add_signed(step) {
        Some(value) => DueDate::At(value),
        None => DueDate::Unresolved,
    }
}

fn next_weekday(from: NaiveDate, target: Weekday, allow_today: bool) -> NaiveDate {
    let current = i64::from(from.weekday().num_days_from_monday());
    let wanted = i64::from(target.num_days_from_monday());
    let mut ahead = (wanted - current).rem_euclid(7);
    if ahead == 0 && !allow_today {
        ahead = 7;
    }
    from + Duration::days(ahead)
}

fn zh_weekday(value: &str) -> Option<Weekday> {
    match value {
        "一" => Some(Weekday::Mon),
        "二" => Some(Weekday::Tue),
        "三" => Some(Weekday::Wed),
        "四" => Some(Weekday::Thu),
        "五" => Some(Weekday::Fri),
        "六" => Some(Weekday::Sat),
        "日" | "天" => Some(Weekday::Sun),
        _ => None,
    }
}

fn parse_u32(value: &str) -> Option<u32> {
    value.parse().ok()
}

fn optional_minute(caps: &Captures<'_>, index: usize) -> Option<u32> {
    match caps.get(index) {
        Some(m) => parse_u32(m.as_str()),
        None => Some(0),
    }
}
