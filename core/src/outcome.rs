//! Outcome simulation.
//!
//! A closed deal walks the open stages as an absorbing Markov chain: at each
//! stage it either advances or is lost there. An open deal is placed by how
//! much of its cycle has elapsed, using the same timing curve that dates
//! its stages.

use crate::{
    profile::StageTimingCurve,
    rng::DealRng,
    trend::adjusted_probability,
    types::{Stage, OPEN_STAGE_COUNT},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// `ClosedWon` or `ClosedLost`.
    pub terminal:        Stage,
    /// Last open stage the deal occupied.
    pub highest_reached: Stage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealResolution {
    Closed(Outcome),
    Open { current: Stage },
}

impl DealResolution {
    pub fn highest_reached(&self) -> Stage {
        match self {
            Self::Closed(outcome) => outcome.highest_reached,
            Self::Open { current } => *current,
        }
    }

    pub fn terminal(&self) -> Option<Stage> {
        match self {
            Self::Closed(outcome) => Some(outcome.terminal),
            Self::Open { .. } => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }
}

/// One draw per stage attempted; stops at the first failure.
pub fn simulate_outcome(probabilities: &[f64; OPEN_STAGE_COUNT], rng: &mut DealRng) -> Outcome {
    for (stage, p) in Stage::OPEN.into_iter().zip(probabilities) {
        if rng.next_f64() >= *p {
            return Outcome {
                terminal:        Stage::ClosedLost,
                highest_reached: stage,
            };
        }
    }
    Outcome {
        terminal:        Stage::ClosedWon,
        highest_reached: Stage::ContractReview,
    }
}

/// Highest open stage whose curve position is at or below `elapsed_fraction`.
pub fn current_open_stage(curve: &StageTimingCurve, elapsed_fraction: f64) -> Stage {
    Stage::OPEN
        .into_iter()
        .rev()
        .find(|&stage| curve.position(stage) <= elapsed_fraction)
        .unwrap_or(Stage::LeadQualification)
}

/// Base probabilities with a multiplier applied per stage.
pub fn effective_probabilities(
    base: &[f64; OPEN_STAGE_COUNT],
    multipliers: &[f64; OPEN_STAGE_COUNT],
) -> [f64; OPEN_STAGE_COUNT] {
    let mut out = [0.0; OPEN_STAGE_COUNT];
    for i in 0..OPEN_STAGE_COUNT {
        out[i] = adjusted_probability(base[i], multipliers[i]);
    }
    out
}
