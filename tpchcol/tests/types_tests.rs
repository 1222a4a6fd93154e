/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! Value type laws: parse/format round trips, calendar conversion and
//! hashing.

use chrono::Datelike;
use chrono::NaiveDate;
use tpchcol::ParseError;
use tpchcol::Value;
use tpchcol::ValueKind;
use tpchcol::types::Date;
use tpchcol::types::Integer;
use tpchcol::types::Numeric;
use tpchcol::types::date::merge_julian_day;
use tpchcol::types::date::split_julian_day;
use tpchcol::types::hash_key;

/// Julian day number of 0001-01-01 minus one, relative to chrono's day count
const CE_TO_JULIAN: i32 = 1_721_425;

/// Decimal text formats to its canonical form at the column's precision
#[test]
fn test_decimal_round_trip() {
    let cases = [
        ("0", "0.00"),
        ("1", "1.00"),
        ("1.5", "1.50"),
        ("1.50", "1.50"),
        ("-1.5", "-1.50"),
        ("-0.05", "-0.05"),
        ("  901.00 ", "901.00"),
        ("173665.47", "173665.47"),
        ("+3.1", "3.10"),
        ("0.1000", "0.10"),
        ("9999999999999.99", "9999999999999.99"),
    ];

    for (input, canonical) in cases {
        let value = Numeric::parse(input.as_bytes(), 15, 2).unwrap();
        assert_eq!(value.to_string(), canonical, "input {:?}", input);

        let reparsed = Numeric::parse(value.to_string().as_bytes(), 15, 2).unwrap();
        assert_eq!(reparsed, value);
    }
}

/// Decimal inputs that cannot be represented are rejected
#[test]
fn test_decimal_rejections() {
    assert!(matches!(
        Numeric::parse(b"1.234", 15, 2),
        Err(ParseError::Overflow { .. })
    ));
    assert!(matches!(
        Numeric::parse(b"1234567890123456789", 19, 0),
        Err(ParseError::Overflow { .. })
    ));
    assert!(matches!(
        Numeric::parse(b"12a", 15, 2),
        Err(ParseError::Format { .. })
    ));
    assert!(matches!(
        Numeric::parse(b".", 15, 2),
        Err(ParseError::Format { .. })
    ));
}

/// Formatting an i32 and parsing it back yields the same value
#[test]
fn test_integer_round_trip() {
    let mut samples = vec![i32::MIN, i32::MIN + 1, -1, 0, 1, i32::MAX - 1, i32::MAX];
    samples.extend((i32::MIN..=i32::MAX).step_by(65_537));

    for x in samples {
        let parsed = Integer::parse(x.to_string().as_bytes()).unwrap();
        assert_eq!(parsed, Integer(x));
    }

    assert!(matches!(
        Integer::parse(b"10000000000"),
        Err(ParseError::Overflow { .. })
    ));
    assert!(matches!(
        Integer::parse(b"-99999999999"),
        Err(ParseError::Overflow { .. })
    ));
}

/// Julian conversion agrees with chrono for every valid date in 0000..=9999
#[test]
fn test_julian_round_trip_against_chrono() {
    let mut date = NaiveDate::from_ymd_opt(0, 1, 1).unwrap();
    let last = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap();

    loop {
        let (y, m, d) = (date.year() as u32, date.month(), date.day());
        let jd = merge_julian_day(y, m, d);

        assert_eq!(jd, date.num_days_from_ce() + CE_TO_JULIAN, "date {}", date);
        assert_eq!(split_julian_day(jd), (y, m, d), "julian day {}", jd);

        if date == last {
            break;
        }
        date = date.succ_opt().unwrap();
    }
}

/// Dates format as zero-padded ISO text and parse back to the same day
#[test]
fn test_date_text_round_trip() {
    for text in ["0000-01-01", "1970-01-01", "1992-02-29", "1998-12-01", "9999-12-31"] {
        let date = Date::parse(text.as_bytes()).unwrap();
        assert_eq!(date.to_string(), text);
    }
}

/// Hashes are deterministic and the key combiner ignores order
#[test]
fn test_hash_properties() {
    let a = ValueKind::Integer.parse(b"42").unwrap();
    let b = ValueKind::Varchar { max_len: 10 }.parse(b"abc").unwrap();
    let c = ValueKind::Date.parse(b"1995-03-15").unwrap();

    assert_eq!(a.hash(), ValueKind::Integer.parse(b" 42 ").unwrap().hash());
    assert_ne!(a.hash(), ValueKind::Integer.parse(b"43").unwrap().hash());

    let forward = hash_key(&[a, b, c]);
    let backward = hash_key(&[c, b, a]);
    assert_eq!(forward, backward);
    assert_eq!(hash_key(&[a]), a.hash());
    assert_eq!(hash_key(&[]), 0);
}

/// Values of one kind order naturally; different kinds do not compare
#[test]
fn test_value_ordering() {
    let low = ValueKind::Numeric {
        length: 15,
        precision: 2,
    }
    .parse(b"-3.50")
    .unwrap();
    let high = ValueKind::Numeric {
        length: 15,
        precision: 2,
    }
    .parse(b"2")
    .unwrap();
    assert!(low < high);

    let integer = Value::Integer(Integer(1));
    assert_eq!(integer.partial_cmp(&low), None);
}
