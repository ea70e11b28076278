//! Run context — the time anchor every generator measures against.
//!
//! RULE: generators never read the wall clock themselves. "Today" and
//! "now" are fixed once at run start; with the anchor pinned, a run is a
//! pure function of (seed, sizes) and reproducible byte-for-byte.

use chrono::{Local, NaiveDate, NaiveDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenContext {
    /// Calendar "today" — the end of every trailing window.
    pub today: NaiveDate,
    /// Wall-clock "now" — timestamps are offset backwards from this.
    pub now: NaiveDateTime,
}

impl GenContext {
    /// Anchor to the local wall clock. Production entry point.
    pub fn from_wall_clock() -> Self {
        let now = Local::now().naive_local();
        Self {
            today: now.date(),
            now,
        }
    }

    /// Anchor to a fixed date at noon. Tests use this so two runs on
    /// different days still compare byte-identical.
    pub fn fixed(today: NaiveDate) -> Self {
        Self {
            today,
            now: today.and_hms_opt(12, 0, 0).unwrap(),
        }
    }
}
