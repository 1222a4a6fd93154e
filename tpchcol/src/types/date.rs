/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # Calendar dates and timestamps
//!
//! Dates are Julian day numbers, converted to and from the Gregorian calendar
//! with the Fliegel-Van Flandern algorithm. Timestamps count milliseconds as
//! `julian_day * MS_PER_DAY + ms_since_midnight`; zero means no value.
//!
//! Input dates are only range checked (year 0..=9999, month 1..=12,
//! day 1..=31). Month lengths and leap years are not validated.

use super::Integer;
use super::hash_raw;
use super::trim_spaces;
use crate::error::ParseError;
use std::fmt;

const DATE: &str = "date";
const TIMESTAMP: &str = "timestamp";

pub const MS_PER_DAY: u64 = 24 * 60 * 60 * 1000;

/// Julian day number of a Gregorian date
pub fn merge_julian_day(year: u32, month: u32, day: u32) -> i32 {
    let (year, month, day) = (i64::from(year), i64::from(month), i64::from(day));
    let a = (14 - month) / 12;
    let y = year + 4800 - a;
    let m = month + 12 * a - 3;
    let jd = day + (153 * m + 2) / 5 + 365 * y + y / 4 - y / 100 + y / 400 - 32045;
    jd as i32
}

/// Gregorian `(year, month, day)` of a Julian day number
pub fn split_julian_day(jd: i32) -> (u32, u32, u32) {
    let a = i64::from(jd) + 32044;
    let b = (4 * a + 3) / 146097;
    let c = a - (146097 * b) / 4;
    let d = (4 * c + 3) / 1461;
    let e = c - (1461 * d) / 4;
    let m = (5 * e + 2) / 153;

    let day = e - (153 * m + 2) / 5 + 1;
    let month = m + 3 - 12 * (m / 10);
    let year = 100 * b + d - 4800 + m / 10;
    (year as u32, month as u32, day as u32)
}

/// Milliseconds since midnight of a wall-clock time
pub const fn merge_time(hour: u32, minute: u32, second: u32, ms: u32) -> u32 {
    ms + 1000 * second + 60 * 1000 * minute + 60 * 60 * 1000 * hour
}

/// `(hour, minute, second, ms)` of milliseconds since midnight
pub const fn split_time(value: u32) -> (u32, u32, u32, u32) {
    let ms = value % 1000;
    let value = value / 1000;
    let second = value % 60;
    let value = value / 60;
    let minute = value % 60;
    let hour = (value / 60) % 24;
    (hour, minute, second, ms)
}

fn invalid(kind: &'static str) -> ParseError {
    ParseError::format(kind, "invalid date format")
}

/// Read decimal digits up to `terminator`, or up to the end of the text when
/// there is none
fn read_field(
    text: &[u8],
    pos: &mut usize,
    terminator: Option<u8>,
    kind: &'static str,
) -> Result<u32, ParseError> {
    let mut value: u32 = 0;
    loop {
        let Some(&c) = text.get(*pos) else {
            return match terminator {
                Some(_) => Err(invalid(kind)),
                None => Ok(value),
            };
        };
        *pos += 1;
        match c {
            b'0'..=b'9' => value = value.saturating_mul(10).saturating_add(u32::from(c - b'0')),
            c if Some(c) == terminator => return Ok(value),
            _ => return Err(invalid(kind)),
        }
    }
}

/// Parse `YYYY-MM-DD` into a range checked `(year, month, day)`
fn parse_ymd(text: &[u8], kind: &'static str) -> Result<(u32, u32, u32), ParseError> {
    let mut pos = 0;
    let year = read_field(text, &mut pos, Some(b'-'), kind)?;
    let month = read_field(text, &mut pos, Some(b'-'), kind)?;
    let day = read_field(text, &mut pos, None, kind)?;
    check_ymd(year, month, day, kind)?;
    Ok((year, month, day))
}

fn check_ymd(year: u32, month: u32, day: u32, kind: &'static str) -> Result<(), ParseError> {
    if year > 9999 || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(invalid(kind));
    }
    Ok(())
}

/// Calendar date as a Julian day number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Date(pub i32);

impl Date {
    pub fn from_ymd(year: u32, month: u32, day: u32) -> Result<Self, ParseError> {
        check_ymd(year, month, day, DATE)?;
        Ok(Date(merge_julian_day(year, month, day)))
    }

    pub fn to_ymd(self) -> (u32, u32, u32) {
        split_julian_day(self.0)
    }

    /// Calendar year of the date
    pub fn year(self) -> Integer {
        let (year, _, _) = self.to_ymd();
        Integer(year as i32)
    }

    /// Parse `YYYY-MM-DD`; the day field runs to the end of the span
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let (year, month, day) = parse_ymd(trim_spaces(bytes), DATE)?;
        Ok(Date(merge_julian_day(year, month, day)))
    }

    pub fn hash(&self) -> u64 {
        hash_raw(i64::from(self.0) as u64)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (year, month, day) = self.to_ymd();
        write!(f, "{:04}-{:02}-{:02}", year, month, day)
    }
}

/// Milliseconds since the Julian epoch; zero is the null timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const fn null() -> Self {
        Timestamp(0)
    }

    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    pub fn from_parts(date: Date, ms_since_midnight: u32) -> Self {
        Timestamp(date.0 as u64 * MS_PER_DAY + u64::from(ms_since_midnight))
    }

    pub fn date(&self) -> Date {
        Date((self.0 / MS_PER_DAY) as i32)
    }

    pub fn ms_since_midnight(&self) -> u32 {
        (self.0 % MS_PER_DAY) as u32
    }

    /// Parse `YYYY-MM-DD[ H:MM:SS[.fff]]`
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let text = trim_spaces(bytes);
        let (date_part, time_part) = match text.iter().position(|&c| c == b' ') {
            Some(split) => (&text[..split], Some(&text[split + 1..])),
            None => (text, None),
        };

        let (year, month, day) = parse_ymd(date_part, TIMESTAMP)?;
        let date = Date(merge_julian_day(year, month, day));
        let ms = match time_part {
            Some(time) => parse_time(time)?,
            None => 0,
        };
        Ok(Timestamp::from_parts(date, ms))
    }

    pub fn hash(&self) -> u64 {
        hash_raw(self.0)
    }
}

/// Parse `H:MM:SS[.f[f[f]]]` into milliseconds since midnight
fn parse_time(text: &[u8]) -> Result<u32, ParseError> {
    let bad_time = || ParseError::format(TIMESTAMP, "invalid time format");

    let (clock, fraction) = match text.iter().position(|&c| c == b'.') {
        Some(point) => (&text[..point], Some(&text[point + 1..])),
        None => (text, None),
    };

    let mut pos = 0;
    let hour = read_field(clock, &mut pos, Some(b':'), TIMESTAMP).map_err(|_| bad_time())?;
    let minute = read_field(clock, &mut pos, Some(b':'), TIMESTAMP).map_err(|_| bad_time())?;
    let second = read_field(clock, &mut pos, None, TIMESTAMP).map_err(|_| bad_time())?;
    if hour >= 24 || minute >= 60 || second >= 60 {
        return Err(bad_time());
    }

    let ms = match fraction {
        None => 0,
        Some(digits)
            if (1..=3).contains(&digits.len()) && digits.iter().all(u8::is_ascii_digit) =>
        {
            let value = digits
                .iter()
                .fold(0u32, |acc, &c| acc * 10 + u32::from(c - b'0'));
            value * 10u32.pow(3 - digits.len() as u32)
        }
        Some(_) => return Err(bad_time()),
    };

    Ok(merge_time(hour, minute, second, ms))
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("NULL");
        }
        let date = self.date();
        let (hour, minute, second, ms) = split_time(self.ms_since_midnight());
        if ms != 0 {
            write!(f, "{} {}:{:02}:{:02}.{:03}", date, hour, minute, second, ms)
        } else {
            write!(f, "{} {}:{:02}:{:02}", date, hour, minute, second)
        }
    }
}
