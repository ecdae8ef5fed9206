use crate::error::ParseError;

/// Decode an unsigned LEB128 value from `data` starting at `offset`.
/// Returns (value, bytes_consumed).
pub fn decode_uleb128(data: &[u8], offset: usize) -> Result<(u32, usize), ParseError> {
    let mut result: u32 = 0;
    let mut shift = 0u32;
    let mut pos = offset;

    loop {
        let &byte = data.get(pos).ok_or(ParseError::InvalidLeb128(offset))?;
        pos += 1;

        result |= ((byte & 0x7f) as u32) << shift;
        if byte & 0x80 == 0 {
            return Ok((result, pos - offset));
        }
        shift += 7;
        // dex caps LEB128 at five bytes
        if shift >= 35 {
            return Err(ParseError::InvalidLeb128(offset));
        }
    }
}

/// Decode a signed LEB128 value from `data` starting at `offset`.
/// Returns (value, bytes_consumed).
pub fn decode_sleb128(data: &[u8], offset: usize) -> Result<(i32, usize), ParseError> {
    let mut result: i64 = 0;
    let mut shift = 0u32;
    let mut pos = offset;
    let mut byte;

    loop {
        byte = *data.get(pos).ok_or(ParseError::InvalidLeb128(offset))?;
        pos += 1;

        result |= ((byte & 0x7f) as i64) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            break;
        }
        if shift >= 35 {
            return Err(ParseError::InvalidLeb128(offset));
        }
    }

    // Sign extend
    if byte & 0x40 != 0 {
        result |= !0i64 << shift;
    }

    Ok((result as i32, pos - offset))
}
