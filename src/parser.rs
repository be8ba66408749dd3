//! Grammars for the scalar values embedded in ledger elements: `num/denom`
//! amounts, posted timestamps and plain calendar dates.

use crate::error::{Error, Result};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use nom::branch::alt;
use nom::bytes::complete::take_while_m_n;
use nom::character::complete::{char, digit1, space0, space1};
use nom::combinator::{all_consuming, map, map_opt, map_res, opt, recognize};
use nom::sequence::{pair, preceded, terminated, tuple};
use nom::IResult;
use rust_decimal::Decimal;
use std::str::FromStr;

/// A posted timestamp together with the UTC offset it was written with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timestamp {
	pub local: NaiveDateTime,
	pub utc_offset_minutes: Option<i32>,
}

/// Decodes a `num/denom` pair. A negative denominator is a multiplier:
/// `5/-2` is `5 * -2`.
pub fn decode(numerator: i64, denominator: i64) -> Result<Decimal> {
	let num = Decimal::from(numerator);
	let value = if denominator > 0 {
		num.checked_div(Decimal::from(denominator))
	} else if denominator < 0 {
		num.checked_mul(Decimal::from(denominator))
	} else {
		None
	};
	value.ok_or_else(|| Error::InvalidValue(format!("{}/{}", numerator, denominator)))
}

pub fn parse_value(text: &str) -> Result<Decimal> {
	match all_consuming(numeric)(text.trim()) {
		Ok((_, (num, denom))) => decode(num, denom),
		Err(_) => Err(Error::InvalidValue(text.to_string())),
	}
}

pub fn parse_timestamp(text: &str) -> Result<Timestamp> {
	match all_consuming(terminated(timestamp, space0))(text.trim()) {
		Ok((_, ts)) => Ok(ts),
		Err(_) => Err(Error::InvalidDate(text.to_string())),
	}
}

pub fn parse_date(text: &str) -> Result<NaiveDate> {
	match all_consuming(date)(text.trim()) {
		Ok((_, date)) => Ok(date),
		Err(_) => Err(Error::InvalidDate(text.to_string())),
	}
}

pub(crate) fn numeric(input: &str) -> IResult<&str, (i64, i64)> {
	tuple((signed_integer, preceded(char('/'), signed_integer)))(input)
}

pub(crate) fn signed_integer(input: &str) -> IResult<&str, i64> {
	map_res(recognize(pair(opt(char('-')), digit1)), i64::from_str)(input)
}

// 2014-01-05 10:59:00 +0000
pub(crate) fn timestamp(input: &str) -> IResult<&str, Timestamp> {
	map(
		tuple((date, preceded(space1, time), opt(preceded(space1, utc_offset)))),
		|(date, time, utc_offset_minutes)| Timestamp {
			local: NaiveDateTime::new(date, time),
			utc_offset_minutes,
		},
	)(input)
}

pub(crate) fn date(input: &str) -> IResult<&str, NaiveDate> {
	map_opt(
		tuple((
			fixed::<i32>(4),
			char('-'),
			fixed::<u32>(2),
			char('-'),
			fixed::<u32>(2),
		)),
		|(year, _, month, _, day)| NaiveDate::from_ymd_opt(year, month, day),
	)(input)
}

pub(crate) fn time(input: &str) -> IResult<&str, NaiveTime> {
	map_opt(
		tuple((
			fixed::<u32>(2),
			char(':'),
			fixed::<u32>(2),
			char(':'),
			fixed::<u32>(2),
		)),
		|(hour, _, minute, _, second)| NaiveTime::from_hms_opt(hour, minute, second),
	)(input)
}

pub(crate) fn utc_offset(input: &str) -> IResult<&str, i32> {
	map(
		tuple((alt((char('+'), char('-'))), fixed::<i32>(2), fixed::<i32>(2))),
		|(sign, hours, minutes)| {
			let total = hours * 60 + minutes;
			if sign == '-' {
				-total
			} else {
				total
			}
		},
	)(input)
}

fn fixed<'a, T: FromStr>(digits: usize) -> impl Fn(&'a str) -> IResult<&'a str, T> {
	move |input: &'a str| {
		map_res(
			take_while_m_n(digits, digits, |c: char| c.is_ascii_digit()),
			|s: &str| s.parse::<T>(),
		)(input)
	}
}
