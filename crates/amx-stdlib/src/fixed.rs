//! Fixed-point native implementations
//!
//! A fixed-point value is a cell holding the number times [`MULTIPLIER`],
//! giving three decimal digits. Intermediate products are computed in 64
//! bits and rounded half away from zero. Results that do not fit in a cell
//! are a `DomainError`.

use amx_sdk::{AmxError, AmxResult};

/// Scale of a fixed-point value
pub const MULTIPLIER: i32 = 1000;

const M: i64 = MULTIPLIER as i64;

/// Rounding mode of [`round`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundMode {
    /// Nearest integer, halves away from zero
    Nearest,
    /// Toward negative infinity
    Floor,
    /// Toward positive infinity
    Ceil,
    /// Drop the fraction
    TowardZero,
    /// Nearest integer, halves to even
    Unbiased,
}

impl RoundMode {
    /// Mode for the script-level code (0 to 4)
    pub fn from_code(code: i32) -> AmxResult<Self> {
        match code {
            0 => Ok(RoundMode::Nearest),
            1 => Ok(RoundMode::Floor),
            2 => Ok(RoundMode::Ceil),
            3 => Ok(RoundMode::TowardZero),
            4 => Ok(RoundMode::Unbiased),
            _ => Err(AmxError::ParameterError),
        }
    }
}

fn to_cell(value: i64) -> AmxResult<i32> {
    i32::try_from(value).map_err(|_| AmxError::DomainError)
}

/// `n / d` rounded half away from zero; `d` must not be zero
fn div_round(n: i64, d: i64) -> i64 {
    let q = n / d;
    let r = n % d;
    if 2 * r.abs() >= d.abs() {
        q + (n.signum() * d.signum())
    } else {
        q
    }
}

/// Integer to fixed point
pub fn from_int(value: i32) -> AmxResult<i32> {
    to_cell(value as i64 * M)
}

/// Parse a decimal number such as `-12.5`
///
/// Leading whitespace is skipped, digits past the third decimal are ignored
/// and parsing stops at the first character that does not fit the format.
pub fn parse(text: &str) -> AmxResult<i32> {
    let mut chars = text.trim_start().chars().peekable();
    let negative = match chars.peek() {
        Some('-') => {
            chars.next();
            true
        }
        Some('+') => {
            chars.next();
            false
        }
        _ => false,
    };

    let mut value: i64 = 0;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        chars.next();
        value = value * 10 + digit as i64;
        if value > i32::MAX as i64 {
            return Err(AmxError::DomainError);
        }
    }
    value *= M;

    if chars.peek() == Some(&'.') {
        chars.next();
        let mut scale = M / 10;
        while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
            chars.next();
            value += digit as i64 * scale;
            scale /= 10;
        }
    }

    to_cell(if negative { -value } else { value })
}

/// Product of two fixed-point values
pub fn mul(a: i32, b: i32) -> AmxResult<i32> {
    to_cell(div_round(a as i64 * b as i64, M))
}

/// Quotient of two fixed-point values
pub fn div(a: i32, b: i32) -> AmxResult<i32> {
    if b == 0 {
        return Err(AmxError::DivideByZero);
    }
    to_cell(div_round(a as i64 * M, b as i64))
}

/// `a * b / c` with a 64-bit intermediate
pub fn mul_div(a: i32, b: i32, c: i32) -> AmxResult<i32> {
    if c == 0 {
        return Err(AmxError::DivideByZero);
    }
    to_cell(div_round(a as i64 * b as i64, c as i64))
}

/// Fractional part, with the sign of `a`
pub fn fract(a: i32) -> i32 {
    a % MULTIPLIER
}

/// Round to an integer
pub fn round(a: i32, mode: RoundMode) -> i32 {
    let a = a as i64;
    let rounded = match mode {
        RoundMode::Nearest => div_round(a, M),
        RoundMode::Floor => a.div_euclid(M),
        RoundMode::Ceil => -(-a).div_euclid(M),
        RoundMode::TowardZero => a / M,
        RoundMode::Unbiased => {
            let q = a.div_euclid(M);
            let r = a.rem_euclid(M);
            if 2 * r > M || (2 * r == M && q % 2 != 0) {
                q + 1
            } else {
                q
            }
        }
    };
    // |a| / 1000 always fits
    rounded as i32
}

/// `a` raised to the integer power `n`
///
/// Negative powers raise the reciprocal of `a`, so small bases with large
/// negative exponents stay in range.
pub fn power(a: i32, n: i32) -> AmxResult<i32> {
    let mut result = MULTIPLIER;
    let mut base = if n < 0 { div(MULTIPLIER, a)? } else { a };
    let mut exp = n.unsigned_abs();
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul(result, base)?;
        }
        exp >>= 1;
        if exp > 0 {
            base = mul(base, base)?;
        }
    }
    Ok(result)
}

/// Square root
pub fn sqroot(a: i32) -> AmxResult<i32> {
    if a < 0 {
        return Err(AmxError::DomainError);
    }
    let n = a as u64 * M as u64;
    let mut r = (n as f64).sqrt() as u64;
    // correct float error in either direction
    while r * r > n {
        r -= 1;
    }
    while (r + 1) * (r + 1) <= n {
        r += 1;
    }
    if n - r * r > r {
        r += 1;
    }
    to_cell(r as i64)
}

/// Absolute value
pub fn abs(a: i32) -> AmxResult<i32> {
    a.checked_abs().ok_or(AmxError::DomainError)
}
