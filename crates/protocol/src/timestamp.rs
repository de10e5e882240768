//! Row timestamps.
//!
//! Rows carry a bracketed `[dd-mm-yy, HH:mm]` stamp in the forum's local
//! time. It is read as the local time of this machine and converted to UTC.

use std::sync::LazyLock;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

static STAMP: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\[(\d\d-\d\d-\d\d, \d\d:\d\d)\]").expect("STAMP regex should compile"));

const FORMAT: &str = "%d-%m-%y, %H:%M";

/// Parses the first bracketed stamp in `html`.
///
/// Returns `None` when there is no stamp, when it does not name a valid
/// date, or when the local time does not exist (DST gap). An ambiguous local
/// time resolves to the earlier instant.
pub fn parse_stamp(html: &str) -> Option<DateTime<Utc>> {
	let caps = STAMP.captures(html)?;
	let naive = NaiveDateTime::parse_from_str(&caps[1], FORMAT).ok()?;
	Local.from_local_datetime(&naive).earliest().map(|local| local.with_timezone(&Utc))
}

/// Timestamp of a row, or `now` when the row has no usable stamp.
pub fn row_timestamp(meta_html: &str, now: DateTime<Utc>) -> DateTime<Utc> {
	parse_stamp(meta_html).unwrap_or(now)
}

#[cfg(test)]
mod tests {
	use chrono::{Datelike, Timelike};

	use super::*;

	#[test]
	fn parses_day_month_year_order() {
		let stamp = parse_stamp(r#"[18-03-24, 21:07] <a href="misc.php?ccbloc=1">#</a>"#).unwrap();
		let local = stamp.with_timezone(&Local);
		assert_eq!((local.year(), local.month(), local.day()), (2024, 3, 18));
		assert_eq!((local.hour(), local.minute()), (21, 7));
	}

	#[test]
	fn invalid_dates_are_rejected() {
		assert_eq!(parse_stamp("[31-02-24, 10:00]"), None);
		assert_eq!(parse_stamp("[01-01-24, 25:00]"), None);
	}

	#[test]
	fn missing_stamp_falls_back_to_now() {
		let now = Utc::now();
		assert_eq!(row_timestamp("<a href=\"member.php?u=1\">x</a>", now), now);
		assert_eq!(row_timestamp("[2024-03-18 21:07]", now), now);
	}
}
