//! Collision naming for uploads onto occupied destinations
//!
//! Generates alternate destination names following the pattern:
//! `dir/stem_YYYYMMDDTHHMMSS_XXXXXXXX.ext`

use chrono::Utc;
use uuid::Uuid;

/// Generates alternate names for occupied upload destinations
pub struct CollisionNamer;

impl CollisionNamer {
    /// Generates an alternate path for `original`
    ///
    /// Only the last segment is rewritten. Given "reports/q1/invoice.csv",
    /// produces something like "reports/q1/invoice_20261019T101500_a1b2c3d4.csv".
    pub fn generate(original: &str) -> String {
        let timestamp = Utc::now().format("%Y%m%dT%H%M%S");
        let short_uuid = &Uuid::new_v4().simple().to_string()[..8];
        Self::with_token(original, &format!("_{timestamp}_{short_uuid}"))
    }

    /// Inserts `token` between the stem and the extension of the last segment
    fn with_token(path: &str, token: &str) -> String {
        let name_start = path.rfind('/').map_or(0, |pos| pos + 1);
        let (dir, name) = path.split_at(name_start);

        // A leading dot marks a hidden file, not an extension
        match name.rfind('.') {
            Some(dot_pos) if dot_pos > 0 => {
                let (stem, ext) = name.split_at(dot_pos);
                format!("{dir}{stem}{token}{ext}")
            }
            _ => format!("{dir}{name}{token}"),
        }
    }
}
