//! File-creation mask

use crate::error::{HandoffError, HandoffResult};

/// Parse an octal mask such as `"0002"` or `"022"`
pub fn parse_umask(s: &str) -> HandoffResult<u32> {
    let trimmed = s.trim();
    let digits = trimmed.strip_prefix("0o").unwrap_or(trimmed);
    match u32::from_str_radix(digits, 8) {
        Ok(mask) if mask <= 0o777 && !digits.is_empty() => Ok(mask),
        _ => Err(HandoffError::InvalidUmask(s.to_string())),
    }
}

/// Set the process umask, returning the previous one
pub fn set_umask(mask: u32) -> u32 {
    // SAFETY: umask only swaps a per-process value and cannot fail
    let previous = unsafe { libc::umask(mask as libc::mode_t) };
    previous as u32
}
