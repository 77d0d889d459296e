//! Shared helpers for scheduling tests.

use crate::scheduling::domain::{ProjectGid, SectionGid, TaskGid};
use chrono::{DateTime, Local, NaiveDate, Utc};
use mockable::Clock;

/// Clock pinned to a fixed instant, for deterministic "now" in tests.
pub(crate) struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    /// Pins the clock to midday UTC on the given date.
    pub(crate) fn at(today: NaiveDate) -> Self {
        let now = today
            .and_hms_opt(12, 0, 0)
            .expect("midday is a valid time")
            .and_utc();
        Self { now }
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.now
    }
}

pub(crate) fn gid(value: &str) -> TaskGid {
    TaskGid::new(value).expect("valid task gid")
}

pub(crate) fn section(value: &str) -> SectionGid {
    SectionGid::new(value).expect("valid section gid")
}

pub(crate) fn project(value: &str) -> ProjectGid {
    ProjectGid::new(value).expect("valid project gid")
}

pub(crate) fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date")
}
