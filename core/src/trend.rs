//! Time-varying market conditions.
//!
//! Everything here is a pure function of (segment, date) or (stage, date).
//! No RNG is consumed except by `GrowthConfig::multiplier`, which takes the
//! deal's own stream.

use crate::{
    calendar::{months_since, quarter_of, quarters_since},
    config::{EventConfig, GrowthConfig, SeasonalFactor, SeasonalityConfig, TrendCurve, TrendTable},
    rng::DealRng,
    types::{Segment, Stage, OPEN_STAGE_COUNT},
};
use chrono::NaiveDate;

impl TrendCurve {
    /// Rate after `months` whole months of drift.
    pub fn rate_at(&self, months: u32) -> f64 {
        (self.base + self.slope * months as f64).clamp(self.floor, self.ceiling)
    }
}

impl TrendTable {
    pub fn rate(&self, segment: Segment, date: NaiveDate) -> f64 {
        self.curves
            .get(segment)
            .rate_at(months_since(self.epoch, date))
    }
}

impl SeasonalityConfig {
    pub fn factor(&self, date: NaiveDate) -> SeasonalFactor {
        self.quarters[(quarter_of(date) - 1) as usize]
    }
}

impl EventConfig {
    pub fn is_active(&self, date: NaiveDate) -> bool {
        date >= self.start_date
    }
}

impl GrowthConfig {
    /// Compound quarterly growth since the epoch, with uniform noise of
    /// +/- `volatility`. Consumes one draw.
    pub fn multiplier(&self, date: NaiveDate, rng: &mut DealRng) -> f64 {
        let quarters = quarters_since(self.epoch, date) as i32;
        let trend = (1.0 + self.quarterly_rate).powi(quarters);
        let noise = 1.0 - self.volatility + 2.0 * self.volatility * rng.next_f64();
        trend * noise
    }
}

/// Combined effect of every active event on one stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageModifier {
    pub advance: f64,
    pub dwell:   f64,
}

impl StageModifier {
    pub const NEUTRAL: StageModifier = StageModifier { advance: 1.0, dwell: 1.0 };

    fn compose(self, event: &EventConfig) -> Self {
        Self {
            advance: self.advance * event.advance_modifier,
            dwell:   self.dwell * event.dwell_modifier,
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.advance == 1.0 && self.dwell == 1.0
    }
}

/// Modifiers for each non-terminal stage. `stage_dates[i]` is the date the
/// deal is nominally in `Stage::OPEN[i]`; an event counts for that stage
/// once the date reaches its start.
pub fn stage_modifiers(
    events: &[EventConfig],
    stage_dates: &[NaiveDate; OPEN_STAGE_COUNT],
) -> [StageModifier; OPEN_STAGE_COUNT] {
    let mut out = [StageModifier::NEUTRAL; OPEN_STAGE_COUNT];
    for (i, stage) in Stage::OPEN.into_iter().enumerate() {
        out[i] = events
            .iter()
            .filter(|e| e.stage == stage && e.is_active(stage_dates[i]))
            .fold(StageModifier::NEUTRAL, StageModifier::compose);
    }
    out
}

/// Apply a multiplier to an advance probability.
/// Certain outcomes (exactly 0 or 1) are never softened.
pub fn adjusted_probability(base: f64, multiplier: f64) -> f64 {
    if base <= 0.0 || base >= 1.0 {
        return base.clamp(0.0, 1.0);
    }
    (base * multiplier).clamp(0.0, 1.0)
}
