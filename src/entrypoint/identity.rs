//! UID/GID resolution from `PUID`/`PGID`

use crate::error::{HandoffError, HandoffResult};
use std::fmt;

pub const UID_VAR: &str = "PUID";
pub const GID_VAR: &str = "PGID";

/// Numeric user and group IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub uid: u32,
    pub gid: u32,
}

impl Identity {
    pub fn new(uid: u32, gid: u32) -> Self {
        Self { uid, gid }
    }

    /// Resolve from raw variable values; unset or empty falls back to the default
    ///
    /// Anything other than plain ASCII digits is rejected, including signs and
    /// surrounding whitespace.
    pub fn resolve(
        puid: Option<&str>,
        pgid: Option<&str>,
        default_uid: u32,
        default_gid: u32,
    ) -> HandoffResult<Self> {
        Ok(Self {
            uid: parse_id(UID_VAR, puid, default_uid)?,
            gid: parse_id(GID_VAR, pgid, default_gid)?,
        })
    }

    /// Resolve from the process environment
    pub fn from_env(default_uid: u32, default_gid: u32) -> HandoffResult<Self> {
        let puid = read_var(UID_VAR)?;
        let pgid = read_var(GID_VAR)?;
        Self::resolve(puid.as_deref(), pgid.as_deref(), default_uid, default_gid)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.uid, self.gid)
    }
}

/// Read a variable, treating a non-UTF-8 value as an invalid ID
fn read_var(var: &str) -> HandoffResult<Option<String>> {
    match std::env::var_os(var) {
        None => Ok(None),
        Some(raw) => raw
            .into_string()
            .map(Some)
            .map_err(|raw| HandoffError::InvalidId {
                var: var.to_string(),
                value: raw.to_string_lossy().into_owned(),
            }),
    }
}

/// `u32::MAX` is `(uid_t)-1`, which chown treats as "leave unchanged"
fn parse_id(var: &str, value: Option<&str>, default: u32) -> HandoffResult<u32> {
    let value = match value {
        None | Some("") => return Ok(default),
        Some(v) => v,
    };

    let digits_only = value.bytes().all(|b| b.is_ascii_digit());
    match value.parse::<u32>() {
        Ok(id) if digits_only && id != u32::MAX => Ok(id),
        _ => Err(HandoffError::InvalidId {
            var: var.to_string(),
            value: value.to_string(),
        }),
    }
}
