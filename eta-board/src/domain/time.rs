//! Scheduled-time handling for arrival remarks.
//!
//! Remarks are free text, sometimes carrying the printed timetable time as
//! `HH:MM` (e.g. `"原定班次 09:55"`). The remark itself has no date, so
//! comparisons against real-time timestamps reconstruct it on a given day.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Timelike};

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A wall-clock `HH:MM` time with no date attached.
///
/// # Examples
///
/// ```
/// use eta_board::domain::ScheduledTime;
///
/// let time = ScheduledTime::parse_hhmm("09:55").unwrap();
/// assert_eq!(time.to_string(), "09:55");
///
/// assert!(ScheduledTime::parse_hhmm("9:55").is_err());
/// assert!(ScheduledTime::parse_hhmm("24:00").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScheduledTime(NaiveTime);

impl ScheduledTime {
    /// Parse exactly `HH:MM`.
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();

        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }

        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| TimeError::new("invalid time"))
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// This time on `date`, in `offset`.
    ///
    /// No midnight rollover is applied: a scheduled `23:58` paired with a
    /// timestamp just after midnight lands on the wrong day.
    pub fn on(&self, date: NaiveDate, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
        offset.from_local_datetime(&date.and_time(self.0)).single()
    }
}

impl fmt::Debug for ScheduledTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScheduledTime({self})")
    }
}

impl fmt::Display for ScheduledTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Find the first valid `HH:MM` inside a remark.
///
/// Returns `None` for remarks with no time in them, such as a bare
/// "scheduled" note or a cancellation message.
pub fn extract_scheduled_time(remark: &str) -> Option<ScheduledTime> {
    // HH:MM is pure ASCII, so a byte window that matches it is always a
    // valid str slice even inside a CJK remark.
    remark
        .as_bytes()
        .windows(5)
        .filter(|w| w[2] == b':' && w[..2].iter().chain(&w[3..]).all(u8::is_ascii_digit))
        .find_map(|w| {
            std::str::from_utf8(w)
                .ok()
                .and_then(|s| ScheduledTime::parse_hhmm(s).ok())
        })
}

/// Format a timestamp as `HH:MM` in the given offset.
pub fn format_hhmm(timestamp: &DateTime<FixedOffset>, offset: FixedOffset) -> String {
    timestamp.with_timezone(&offset).format("%H:%M").to_string()
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}
