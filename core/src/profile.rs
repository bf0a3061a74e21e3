//! Behavioral profiles and the registry that resolves them.
//!
//! A profile is the complete behavioral description of one
//! (segment, classification) pair: how long its deals take, how likely each
//! stage is to advance, where in the cycle each stage begins, and what
//! probability an open deal reports per stage.
//!
//! The registry is built once at startup and is read-only afterwards.
//! Every pair reachable under the classification rules must resolve;
//! a missing or malformed profile is a startup failure, never a per-deal one.

use crate::{
    classifier::{reachable_classifications, ClassificationRule},
    error::{PipelineError, PipelineResult},
    rng::DealRng,
    types::{Classification, Segment, Stage, OPEN_STAGE_COUNT},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Longest cycle any profile may produce, in days.
pub const MAX_CYCLE_DAYS: i64 = 3_650;

/// Spreads past the mean covered by the cycle bound check.
const CYCLE_SPREAD_BOUND: f64 = 6.0;

/// Normal cycle-length distribution in days, truncated toward zero and floored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleDistribution {
    pub mean:   f64,
    /// Standard deviation in days.
    pub spread: f64,
    pub floor:  i64,
}

impl CycleDistribution {
    /// Consumes exactly two draws. Never exceeds `MAX_CYCLE_DAYS`.
    pub fn sample(&self, rng: &mut DealRng) -> i64 {
        (rng.normal(self.mean, self.spread) as i64)
            .max(self.floor)
            .min(MAX_CYCLE_DAYS)
    }
}

/// Fraction of the cycle elapsed when each stage is nominally entered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageTimingCurve(pub [f64; 7]);

impl StageTimingCurve {
    pub fn position(&self, stage: Stage) -> f64 {
        self.0[stage.index()]
    }

    /// Starts at 0, strictly increases across the open stages, stays
    /// below 1 until close, and puts both terminal stages at 1.
    pub fn validate(&self) -> Result<(), String> {
        let c = &self.0;
        if c[0] != 0.0 {
            return Err(format!("timing curve must start at 0.0, got {}", c[0]));
        }
        for i in 1..OPEN_STAGE_COUNT {
            if !(c[i] > c[i - 1]) {
                return Err(format!(
                    "timing curve must strictly increase: {} at {} after {}",
                    c[i],
                    Stage::OPEN[i],
                    c[i - 1]
                ));
            }
        }
        if !(c[OPEN_STAGE_COUNT - 1] < 1.0) {
            return Err("last open stage must begin before 1.0".into());
        }
        if c[Stage::ClosedLost.index()] != 1.0 || c[Stage::ClosedWon.index()] != 1.0 {
            return Err("terminal stages must sit at 1.0".into());
        }
        Ok(())
    }

    /// Stretch each open stage's span by its dwell modifier, then
    /// renormalise so the curve still closes at 1.0.
    pub fn with_dwell_modifiers(&self, dwell: &[f64; OPEN_STAGE_COUNT]) -> Self {
        if dwell.iter().all(|&m| m == 1.0) {
            return *self;
        }

        let mut widths = [0.0; OPEN_STAGE_COUNT];
        for i in 0..OPEN_STAGE_COUNT {
            let end = if i + 1 < OPEN_STAGE_COUNT { self.0[i + 1] } else { 1.0 };
            widths[i] = (end - self.0[i]) * dwell[i];
        }
        let total: f64 = widths.iter().sum();

        let mut out = [1.0; 7];
        let mut acc = 0.0;
        for i in 0..OPEN_STAGE_COUNT {
            out[i] = acc / total;
            acc += widths[i];
        }
        Self(out)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralProfile {
    pub segment:                     Segment,
    pub classification:              Classification,
    pub cycle_days:                  CycleDistribution,
    pub stage_advance_probabilities: [f64; OPEN_STAGE_COUNT],
    pub stage_timing_curve:          StageTimingCurve,
    /// Reported probability (percent) for an open deal, per open stage.
    pub open_stage_probabilities:    [u8; OPEN_STAGE_COUNT],
    /// Headline win rate this profile is tuned toward.
    pub nominal_win_rate:            f64,
}

impl BehavioralProfile {
    pub fn validate(&self) -> PipelineResult<()> {
        let fail = |reason: String| PipelineError::InvalidProfile {
            segment:        self.segment,
            classification: self.classification,
            reason,
        };

        let cycle = &self.cycle_days;
        if !(cycle.mean > 0.0) || !cycle.mean.is_finite() {
            return Err(fail(format!("cycle mean {} must be positive", cycle.mean)));
        }
        if !(cycle.spread >= 0.0) || !cycle.spread.is_finite() {
            return Err(fail(format!("cycle spread {} must be non-negative", cycle.spread)));
        }
        if cycle.floor < 1 {
            return Err(fail(format!("cycle floor {} must be at least one day", cycle.floor)));
        }
        let longest = cycle.mean + CYCLE_SPREAD_BOUND * cycle.spread;
        if longest > MAX_CYCLE_DAYS as f64 || cycle.floor > MAX_CYCLE_DAYS {
            return Err(fail(format!(
                "cycle of up to {longest:.0} days (floor {}) exceeds {MAX_CYCLE_DAYS}",
                cycle.floor
            )));
        }

        for (stage, p) in Stage::OPEN.iter().zip(self.stage_advance_probabilities) {
            if !(0.0..=1.0).contains(&p) {
                return Err(fail(format!("advance probability {p} at {stage} outside [0, 1]")));
            }
        }
        for (stage, p) in Stage::OPEN.iter().zip(self.open_stage_probabilities) {
            if p > 100 {
                return Err(fail(format!("open probability {p}% at {stage} above 100")));
            }
        }
        if !(0.0..=1.0).contains(&self.nominal_win_rate) {
            return Err(fail(format!("nominal win rate {} outside [0, 1]", self.nominal_win_rate)));
        }

        self.stage_timing_curve.validate().map_err(fail)
    }

    pub fn open_probability(&self, stage: Stage) -> u8 {
        if stage.is_terminal() {
            return 0;
        }
        self.open_stage_probabilities[stage.index()]
    }
}

/// Read-only lookup of profiles by (segment, classification).
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: HashMap<(Segment, Classification), BehavioralProfile>,
}

impl ProfileRegistry {
    pub fn new(
        profiles: Vec<BehavioralProfile>,
        rules: &[ClassificationRule],
    ) -> PipelineResult<Self> {
        let mut map = HashMap::with_capacity(profiles.len());
        for profile in profiles {
            profile.validate()?;
            let key = (profile.segment, profile.classification);
            if map.insert(key, profile).is_some() {
                return Err(PipelineError::InvalidConfig(format!(
                    "duplicate profile for {}/{}",
                    key.0, key.1
                )));
            }
        }

        for segment in Segment::ALL {
            for classification in reachable_classifications(rules, segment) {
                if !map.contains_key(&(segment, classification)) {
                    return Err(PipelineError::Configuration { segment, classification });
                }
            }
        }

        Ok(Self { profiles: map })
    }

    pub fn resolve(
        &self,
        segment: Segment,
        classification: Classification,
    ) -> PipelineResult<&BehavioralProfile> {
        self.profiles
            .get(&(segment, classification))
            .ok_or(PipelineError::Configuration { segment, classification })
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
