//! Stage dating.
//!
//! Each reached stage is entered at its nominal point on the timing curve,
//! nudged by jitter proportional to the span of the stage before it, then
//! clamped so entries never run backwards or past the deal's horizon
//! (close date when closed, as-of date when open).

use crate::{
    calendar::{add_days, days_between},
    outcome::DealResolution,
    profile::StageTimingCurve,
    rng::DealRng,
    types::{Stage, StageMap},
};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub entry_dates: StageMap<NaiveDate>,
    pub dwell_days:  StageMap<i64>,
}

pub struct TimelineInputs<'a> {
    pub curve:           &'a StageTimingCurve,
    pub created_at:      NaiveDate,
    pub cycle_days:      i64,
    pub resolution:      DealResolution,
    pub as_of:           NaiveDate,
    pub jitter_fraction: f64,
}

impl TimelineInputs<'_> {
    pub fn close_date(&self) -> NaiveDate {
        add_days(self.created_at, self.cycle_days)
    }

    /// Last date any stage of this deal may be entered.
    fn horizon(&self) -> NaiveDate {
        if self.resolution.is_closed() {
            self.close_date()
        } else {
            self.as_of
        }
    }
}

/// One jitter draw per reached stage after the first.
pub fn build_timeline(inputs: &TimelineInputs<'_>, rng: &mut DealRng) -> Timeline {
    let curve = inputs.curve;
    let cycle = inputs.cycle_days as f64;
    let horizon = inputs.horizon();
    let floor_date = add_days(inputs.created_at, 1);
    let last = inputs.resolution.highest_reached();

    let mut entry_dates = StageMap::empty();
    entry_dates.set(Stage::LeadQualification, inputs.created_at);

    let mut previous = inputs.created_at;
    for pair in Stage::OPEN.windows(2) {
        let (prior, stage) = (pair[0], pair[1]);
        if stage > last {
            break;
        }
        let nominal = (cycle * curve.position(stage)).round() as i64;
        let span = cycle * (curve.position(stage) - curve.position(prior));
        let reach = (span * inputs.jitter_fraction) as i64;
        let jitter = rng.range_inclusive(-reach, reach);

        let entry = add_days(inputs.created_at, nominal + jitter)
            .max(previous.max(floor_date))
            .min(horizon);
        entry_dates.set(stage, entry);
        previous = entry;
    }

    if let Some(terminal) = inputs.resolution.terminal() {
        entry_dates.set(terminal, horizon);
    }

    let mut dwell_days = StageMap::empty();
    let reached: Vec<(Stage, NaiveDate)> = entry_dates.present().collect();
    for (i, &(stage, entry)) in reached.iter().enumerate() {
        let dwell = if stage.is_terminal() {
            0
        } else {
            let next = reached.get(i + 1).map_or(horizon, |&(_, d)| d);
            days_between(entry, next)
        };
        dwell_days.set(stage, dwell);
    }

    Timeline { entry_dates, dwell_days }
}

impl Timeline {
    /// Sum of all recorded dwell.
    pub fn total_dwell(&self) -> i64 {
        self.dwell_days.present().map(|(_, d)| d).sum()
    }
}
