//! Character native implementations
//!
//! Characters are whole cells. Values that are not valid Unicode scalars
//! pass through the case functions unchanged.

/// Lower-case a character
pub fn to_lower(c: i32) -> i32 {
    map_single(c, |ch| {
        let mut lower = ch.to_lowercase();
        match (lower.next(), lower.next()) {
            (Some(l), None) => l,
            _ => ch,
        }
    })
}

/// Upper-case a character
pub fn to_upper(c: i32) -> i32 {
    map_single(c, |ch| {
        let mut upper = ch.to_uppercase();
        match (upper.next(), upper.next()) {
            (Some(u), None) => u,
            _ => ch,
        }
    })
}

/// Reverse the byte order of a cell
pub fn swap_chars(c: i32) -> i32 {
    c.swap_bytes()
}

fn map_single(c: i32, f: impl Fn(char) -> char) -> i32 {
    u32::try_from(c)
        .ok()
        .and_then(char::from_u32)
        .map_or(c, |ch| f(ch) as i32)
}
