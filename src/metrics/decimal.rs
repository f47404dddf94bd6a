//! Exact decimal rounding for throughput values
//!
//! Broker runtime stats report throughput as decimal strings. The dashboard
//! contract is an average rounded half-up to exactly 5 fractional digits,
//! e.g. `["1.0", "2.0", "3.0"]` averages to `"2.00000"`. Binary floats
//! cannot honor half-up on decimal digits, so the arithmetic here is fixed
//! point over `i128`: inputs are scaled to 10 fractional digits, summed
//! exactly, and the final division rounds half away from zero at digit 5.

use crate::error::{CollectError, Result};

/// Internal fixed-point scale (fractional digits) for parsed values.
const PARSE_SCALE: u32 = 10;

/// Output scale: values are rendered with exactly this many fractional digits.
const OUT_SCALE: u32 = 5;

fn pow10(exp: u32) -> Option<i128> {
    10i128.checked_pow(exp)
}

fn overflow(text: &str) -> CollectError {
    CollectError::parse_msg(format!("decimal {:?} out of range", text))
}

/// Parse a decimal string into an `i128` scaled by `10^PARSE_SCALE`.
///
/// Accepts an optional sign, a plain `digits[.digits]` body, and an optional
/// `e`/`E` exponent (broker stats occasionally render large or tiny values in
/// scientific notation). Digits beyond the internal scale are rounded
/// half-up on entry.
fn parse_scaled(text: &str) -> Result<i128> {
    let bad = || CollectError::parse_msg(format!("invalid decimal {:?}", text));

    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let (body, exp) = match rest.find(['e', 'E']) {
        Some(pos) => {
            let exp: i32 = rest[pos + 1..].parse().map_err(|_| bad())?;
            (&rest[..pos], exp)
        }
        None => (rest, 0i32),
    };

    let (int_digits, frac_digits) = match body.split_once('.') {
        Some((i, f)) => (i, f),
        None => (body, ""),
    };
    if int_digits.is_empty() && frac_digits.is_empty() {
        return Err(bad());
    }

    let mut mantissa: i128 = 0;
    for c in int_digits.chars().chain(frac_digits.chars()) {
        let digit = c.to_digit(10).ok_or_else(bad)?;
        mantissa = mantissa
            .checked_mul(10)
            .and_then(|m| m.checked_add(digit as i128))
            .ok_or_else(|| overflow(text))?;
    }
    if mantissa == 0 {
        return Ok(0);
    }

    // value = mantissa / 10^(frac - exp); rescale to PARSE_SCALE digits.
    let shift = PARSE_SCALE as i64 - (frac_digits.len() as i64 - exp as i64);
    let scaled = if shift >= 0 {
        let factor = u32::try_from(shift)
            .ok()
            .and_then(pow10)
            .ok_or_else(|| overflow(text))?;
        mantissa.checked_mul(factor).ok_or_else(|| overflow(text))?
    } else {
        let divisor = u32::try_from(-shift)
            .ok()
            .and_then(pow10)
            .ok_or_else(|| overflow(text))?;
        let quotient = mantissa / divisor;
        let remainder = mantissa % divisor;
        if remainder * 2 >= divisor {
            quotient + 1
        } else {
            quotient
        }
    };

    Ok(if negative { -scaled } else { scaled })
}

/// Divide with rounding half away from zero.
fn div_half_up(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.unsigned_abs() * 2 >= denominator.unsigned_abs() {
        if (numerator < 0) == (denominator < 0) {
            quotient + 1
        } else {
            quotient - 1
        }
    } else {
        quotient
    }
}

/// Render an `i128` scaled by `10^OUT_SCALE` with exactly 5 fractional digits.
fn format_scaled(value: i128) -> String {
    let magnitude = value.unsigned_abs();
    let divisor = 10u128.pow(OUT_SCALE);
    let sign = if value < 0 { "-" } else { "" };
    format!(
        "{}{}.{:05}",
        sign,
        magnitude / divisor,
        magnitude % divisor
    )
}

/// Round one decimal string half-up to 5 fractional digits.
pub fn round_half_up_5(text: &str) -> Result<String> {
    let scaled = parse_scaled(text)?;
    let divisor = pow10(PARSE_SCALE - OUT_SCALE).unwrap_or(1);
    Ok(format_scaled(div_half_up(scaled, divisor)))
}

/// Average decimal strings, rounding the quotient half-up to 5 digits.
///
/// Matches the legacy dashboard's scale-5 half-up division contract exactly:
/// the sum is exact and a single rounding happens at the division.
/// An empty input is a parse error; a cycle never averages zero samples.
pub fn average_half_up_5<'a, I>(values: I) -> Result<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut sum: i128 = 0;
    let mut count: i128 = 0;
    for value in values {
        sum = sum
            .checked_add(parse_scaled(value)?)
            .ok_or_else(|| overflow(value))?;
        count += 1;
    }
    if count == 0 {
        return Err(CollectError::parse_msg("cannot average zero samples"));
    }

    let denominator = pow10(PARSE_SCALE - OUT_SCALE)
        .and_then(|p| p.checked_mul(count))
        .ok_or_else(|| CollectError::parse_msg("average denominator out of range"))?;
    Ok(format_scaled(div_half_up(sum, denominator)))
}
