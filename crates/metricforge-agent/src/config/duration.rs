//! Duration fields for the YAML config surface.
//!
//! Accepts suffixed strings (`500ms`, `1s`, `2m`, `1h`) or bare numbers,
//! which mean seconds.

use std::fmt;
use std::time::Duration;

use serde::de::{Deserializer, Error as DeError, Visitor};

const UNITS: [(&str, f64); 6] = [
    ("ns", 1e-9),
    ("us", 1e-6),
    ("ms", 1e-3),
    ("s", 1.0),
    ("m", 60.0),
    ("h", 3600.0),
];

pub(crate) fn parse(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration".to_string());
    }
    for (suffix, unit_secs) in UNITS {
        if let Some(num) = s.strip_suffix(suffix) {
            let n: f64 = num
                .trim()
                .parse()
                .map_err(|_| format!("invalid duration number in {:?}", s))?;
            return Duration::try_from_secs_f64(n * unit_secs)
                .map_err(|_| format!("duration out of range: {:?}", s));
        }
    }
    let n: f64 = s
        .parse()
        .map_err(|_| format!("invalid duration: {:?}", s))?;
    Duration::try_from_secs_f64(n).map_err(|_| format!("duration out of range: {:?}", s))
}

/// Deserialize a config duration from a suffixed string or a bare number of
/// seconds.
pub(crate) fn de_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct DurationVisitor;

    impl Visitor<'_> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a duration string like \"500ms\" or a number of seconds")
        }

        fn visit_str<E: DeError>(self, s: &str) -> Result<Duration, E> {
            parse(s).map_err(E::custom)
        }

        fn visit_u64<E: DeError>(self, n: u64) -> Result<Duration, E> {
            Ok(Duration::from_secs(n))
        }

        fn visit_i64<E: DeError>(self, n: i64) -> Result<Duration, E> {
            u64::try_from(n)
                .map(Duration::from_secs)
                .map_err(|_| E::custom("duration must not be negative"))
        }

        fn visit_f64<E: DeError>(self, n: f64) -> Result<Duration, E> {
            Duration::try_from_secs_f64(n).map_err(E::custom)
        }
    }

    deserializer.deserialize_any(DurationVisitor)
}
