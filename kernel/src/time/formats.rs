//! Datetime packing and rendering helpers.
//!
//! The on-disk timestamp packs one field per byte group, so the values read
//! directly in a hex dump: `year << 40 | month << 32 | day << 24 |
//! hour << 16 | minute << 8 | second`.

use alloc::format;
use alloc::string::String;

use crate::time::RtcDateTime;

const DAYS_IN_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

fn is_leap_year(year: u16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn month_length(year: u16, month: u8) -> u8 {
    if month == 2 && is_leap_year(year) {
        return 29;
    }
    DAYS_IN_MONTH[(month - 1) as usize]
}

pub fn pack_datetime(dt: &RtcDateTime) -> u64 {
    (dt.year as u64) << 40
        | (dt.month as u64) << 32
        | (dt.day as u64) << 24
        | (dt.hour as u64) << 16
        | (dt.minute as u64) << 8
        | dt.second as u64
}

pub fn unpack_datetime(packed: u64) -> RtcDateTime {
    RtcDateTime {
        year: (packed >> 40) as u16,
        month: (packed >> 32) as u8,
        day: (packed >> 24) as u8,
        hour: (packed >> 16) as u8,
        minute: (packed >> 8) as u8,
        second: packed as u8,
        weekday: 0,
    }
}

/// Applies a whole-hour timezone offset, rolling the date as needed.
pub fn apply_tz(dt: &RtcDateTime, offset_hours: i32) -> RtcDateTime {
    let mut out = *dt;
    // offsets are bounded to ±23, so at most one day of rollover
    let mut hour = dt.hour as i32 + offset_hours.clamp(-23, 23);

    if hour < 0 {
        hour += 24;
        if out.day > 1 {
            out.day -= 1;
        } else {
            if out.month > 1 {
                out.month -= 1;
            } else {
                out.month = 12;
                out.year -= 1;
            }
            out.day = month_length(out.year, out.month);
        }
    } else if hour >= 24 {
        hour -= 24;
        if out.day < month_length(out.year, out.month) {
            out.day += 1;
        } else {
            out.day = 1;
            if out.month < 12 {
                out.month += 1;
            } else {
                out.month = 1;
                out.year += 1;
            }
        }
    }

    out.hour = hour as u8;
    out
}

pub fn format_time(dt: &RtcDateTime) -> String {
    format!("{:02}:{:02}:{:02}", dt.hour, dt.minute, dt.second)
}

pub fn format_date(dt: &RtcDateTime) -> String {
    format!("{:04}-{:02}-{:02}", dt.year, dt.month, dt.day)
}

pub fn format_datetime(packed: u64) -> String {
    let dt = unpack_datetime(packed);
    format!("{} {}", format_date(&dt), format_time(&dt))
}
