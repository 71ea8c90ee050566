//! Outward timestamp format.
//!
//! Timestamps are held as `DateTime<Utc>` everywhere inside the system and
//! rendered as `MMM dd, yyyy HH:mm` in a fixed regional zone only when they
//! leave through the JSON boundary. Nothing reads the rendered form back.

use chrono::{DateTime, SubsecRound, Utc};
use chrono_tz::Tz;

/// Zone that outward timestamps are rendered in.
pub const DISPLAY_TIMEZONE: Tz = chrono_tz::Asia::Colombo;

/// `chrono` pattern for `MMM dd, yyyy HH:mm`.
pub const DISPLAY_FORMAT: &str = "%b %d, %Y %H:%M";

/// Current time at the precision the store keeps (microseconds).
///
/// Using this for every server-assigned timestamp means a value read back from
/// the store compares equal to the one that was written.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Render a timestamp in the display zone and format.
pub fn format_display(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&DISPLAY_TIMEZONE)
        .format(DISPLAY_FORMAT)
        .to_string()
}

/// `#[serde(with = "display_format")]` adapter for `DateTime<Utc>` fields.
pub mod display_format {
    use chrono::{DateTime, Utc};
    use serde::Serializer;

    /// Serialize as `MMM dd, yyyy HH:mm` in the display zone.
    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_display(ts))
    }
}
