//! Hex loading utilities

use std::{fs, io::Read, path::Path};

use alloy_primitives::{hex, Bytes};

use super::{BenchError, Result};

/// Loads hex-encoded bytes from an argument or a file. A file named `-` is read from stdin.
/// The argument wins over the file. Returns `None` if neither is given.
pub fn load_hex(arg: Option<&str>, file: Option<&Path>) -> Result<Option<Bytes>> {
    let text = match (arg, file) {
        (Some(arg), _) => arg.to_string(),
        (None, Some(file)) if file == Path::new("-") => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
        (None, Some(file)) => fs::read_to_string(file)?,
        (None, None) => return Ok(None),
    };
    decode_hex(&text).map(Some)
}

/// Decodes a hex string with an optional `0x` prefix and surrounding whitespace.
pub fn decode_hex(s: &str) -> Result<Bytes> {
    let s = s.trim();
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    if digits.len() % 2 != 0 {
        return Err(BenchError::InvalidInput(format!(
            "Invalid hex string length: {} (must be even)",
            digits.len()
        )));
    }
    Ok(hex::decode(digits)?.into())
}
