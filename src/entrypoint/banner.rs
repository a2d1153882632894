//! Startup log line

use crate::entrypoint::identity::Identity;
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;

/// `YYYY-MM-DD HH:MM:SS [INFO] Starting <product> with UID=<uid> GID=<gid>`
pub fn startup_line<Tz>(now: &DateTime<Tz>, product: &str, identity: Identity) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "{} [INFO] Starting {} with UID={} GID={}",
        now.format("%Y-%m-%d %H:%M:%S"),
        product,
        identity.uid,
        identity.gid
    )
}

/// Startup line stamped with local time
pub fn startup_line_now(product: &str, identity: Identity) -> String {
    startup_line(&Local::now(), product, identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn fixed_time_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let line = startup_line(&now, "Sonarr", Identity::new(1000, 100));
        assert_eq!(
            line,
            "2024-03-09 07:05:01 [INFO] Starting Sonarr with UID=1000 GID=100"
        );
    }

    #[test]
    fn timestamp_prefix_shape() {
        let line = startup_line_now("handoff", Identity::new(1, 2));
        let (stamp, rest) = line.split_at(19);
        let bytes = stamp.as_bytes();
        for (i, b) in bytes.iter().enumerate() {
            match i {
                4 | 7 => assert_eq!(*b, b'-'),
                10 => assert_eq!(*b, b' '),
                13 | 16 => assert_eq!(*b, b':'),
                _ => assert!(b.is_ascii_digit(), "position {i} in {stamp}"),
            }
        }
        assert_eq!(rest, " [INFO] Starting handoff with UID=1 GID=2");
    }
}
