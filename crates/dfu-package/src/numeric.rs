//! Integers as operators type them.

use dfu_errors::ParseError;

/// Parse `0x`-prefixed hex, leading-`0` octal or decimal text.
pub fn parse_int(text: &str) -> Result<u32, ParseError> {
    let (digits, radix) = if let Some(hex) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        (hex, 16)
    } else if text.len() > 1 && text.starts_with('0') {
        (text.get(1..).unwrap_or_default(), 8)
    } else {
        (text, 10)
    };

    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(ParseError::invalid_integer(text));
    }
    let value = u64::from_str_radix(digits, radix).map_err(|_e| ParseError::invalid_integer(text))?;
    u32::try_from(value)
        .ok()
        .ok_or_else(|| ParseError::overflow("integer", text))
}

/// Like [`parse_int`], with `none` meaning absent.
pub fn parse_optional_int(text: &str) -> Result<Option<u32>, ParseError> {
    if text.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    parse_int(text).map(Some)
}
