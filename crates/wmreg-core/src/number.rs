//! Numeric argument parsing shared by the definition file and the REPL
//!
//! Literals have no width limit. Where the caller range-checks the result
//! (indices, addresses) use [`parse_int`], which saturates; where the caller
//! masks the result to a register field use [`parse_wrapping`], which keeps
//! the low bits of arbitrarily long literals.

use crate::error::{Error, Result};

/// Sign, magnitude modulo 2^64, and whether the magnitude overflowed
fn parse_parts(token: &str) -> Result<(bool, u64, bool)> {
    let token = token.trim();
    let (negative, digits) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };

    let (radix, body) = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => (16, hex),
        None => (10, digits),
    };

    if body.is_empty() {
        return Err(Error::InvalidNumber);
    }

    let mut magnitude: u64 = 0;
    let mut overflowed = false;
    for c in body.chars() {
        let digit = c.to_digit(radix).ok_or(Error::InvalidNumber)?;
        let (shifted, o1) = magnitude.overflowing_mul(radix as u64);
        let (sum, o2) = shifted.overflowing_add(digit as u64);
        overflowed |= o1 | o2;
        magnitude = sum;
    }

    Ok((negative, magnitude, overflowed))
}

/// Parse a decimal or `0x`-prefixed hexadecimal integer
///
/// A leading `+` or `-` is accepted. Leading zeros are allowed and do not
/// select octal: `010` is ten. Values beyond the `i64` range saturate, so a
/// later range check still rejects them.
pub fn parse_int(token: &str) -> Result<i64> {
    let (negative, magnitude, overflowed) = parse_parts(token)?;
    Ok(match (negative, overflowed) {
        (false, true) => i64::MAX,
        (true, true) => i64::MIN,
        (false, false) => i64::try_from(magnitude).unwrap_or(i64::MAX),
        (true, false) => 0i64.checked_sub_unsigned(magnitude).unwrap_or(i64::MIN),
    })
}

/// Parse like [`parse_int`], but reduce the value modulo 2^64
///
/// The low 64 bits of the two's complement value are exact for any literal
/// length, which is all a 9-bit or 7-bit mask looks at.
pub fn parse_wrapping(token: &str) -> Result<i64> {
    let (negative, magnitude, _) = parse_parts(token)?;
    let value = magnitude as i64;
    Ok(if negative { value.wrapping_neg() } else { value })
}
