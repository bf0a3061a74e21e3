//! The deal engine: one independent stochastic trial per deal.
//!
//! EXECUTION ORDER per deal (fixed, documented, never reordered):
//!   1. Validate inputs
//!   2. Classify            (2 draws: competitive, then targeting)
//!   3. Resolve profile
//!   4. Pick account        (draws owned by the ReferenceData provider)
//!   5. Sample cycle length (2 draws)
//!   6. Apply events to the timing curve and advance probabilities
//!   7. Resolve outcome     (1 draw per stage attempted, closed deals only)
//!   8. Build timeline      (1 jitter draw per reached stage after the first)
//!   9. Pick competitor     (1 draw, competitive deals only)
//!  10. Assemble and validate the record
//!
//! RULES:
//!   - All randomness flows through the deal's own DealRng.
//!   - The engine holds no per-deal state; config is read-only.
//!   - There is no ambient clock. Every deal carries its as-of date.

use crate::{
    assembler::{assemble, OpportunityRecord},
    calendar::{add_days, checked_add_days, days_between},
    classifier::{classify, Classified},
    config::EngineConfig,
    error::{PipelineError, PipelineResult},
    outcome::{current_open_stage, effective_probabilities, simulate_outcome, DealResolution},
    profile::ProfileRegistry,
    rng::DealRng,
    roster::ReferenceData,
    timeline::{build_timeline, Timeline, TimelineInputs},
    trend::stage_modifiers,
    types::{DealId, Segment, Stage, OPEN_STAGE_COUNT},
};
use chrono::NaiveDate;

/// Static attributes of one deal, fixed before simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct DealInput {
    pub deal_id:    DealId,
    pub segment:    Segment,
    pub created_at: NaiveDate,
    pub amount:     f64,
    /// Point in time the pipeline is observed at.
    pub as_of:      NaiveDate,
}

impl DealInput {
    pub fn validate(&self) -> PipelineResult<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(PipelineError::InvalidInput(format!(
                "{}: amount {} must be positive and finite",
                self.deal_id, self.amount
            )));
        }
        if self.created_at > self.as_of {
            return Err(PipelineError::InvalidInput(format!(
                "{}: created {} is after as-of {}",
                self.deal_id, self.created_at, self.as_of
            )));
        }
        Ok(())
    }
}

/// Working state of one deal's simulation. Built fresh per deal.
#[derive(Debug, Clone)]
pub struct DealTrial {
    pub input:          DealInput,
    pub stream:         u64,
    pub classified:     Classified,
    pub cycle_days:     i64,
    pub expected_close: NaiveDate,
    pub resolution:     DealResolution,
    pub timeline:       Timeline,
}

impl DealTrial {
    /// Everything needed to replay this deal.
    pub fn describe_inputs(&self) -> String {
        let i = &self.input;
        format!(
            "deal_id={} segment={} created_at={} amount={} as_of={} stream={} classification={} cycle_days={}",
            i.deal_id,
            i.segment,
            i.created_at,
            i.amount,
            i.as_of,
            self.stream,
            self.classified.classification,
            self.cycle_days
        )
    }
}

pub struct DealEngine {
    config:   EngineConfig,
    registry: ProfileRegistry,
}

impl DealEngine {
    /// Validate the config and build the profile registry.
    /// Fails if any reachable (segment, classification) pair lacks a profile.
    pub fn new(config: EngineConfig) -> PipelineResult<Self> {
        config.validate()?;
        let registry = ProfileRegistry::new(config.profiles.clone(), &config.rules)?;
        log::debug!(
            "Deal engine ready: {} profiles, {} rules, {} events",
            registry.len(),
            config.rules.len(),
            config.events.len()
        );
        Ok(Self { config, registry })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    /// Simulate one deal end to end.
    pub fn generate(
        &self,
        input: DealInput,
        reference: &dyn ReferenceData,
        rng: &mut DealRng,
    ) -> PipelineResult<OpportunityRecord> {
        input.validate()?;
        let config = &self.config;
        let created = input.created_at;

        let classified = classify(config, input.segment, created, rng);
        let profile = self.registry.resolve(input.segment, classified.classification)?;
        let account = reference.pick(classified.flags.targeted, rng);
        let cycle_days = profile.cycle_days.sample(rng);
        // Jittered entries can land up to two cycles past creation.
        if checked_add_days(created, 2 * cycle_days).is_none() {
            return Err(PipelineError::InvalidInput(format!(
                "{}: a {cycle_days}-day cycle from {created} runs past the calendar",
                input.deal_id
            )));
        }

        // Events and seasonality key off each stage's nominal date on the
        // unmodified curve.
        let base_curve = &profile.stage_timing_curve;
        let mut nominal_dates = [created; OPEN_STAGE_COUNT];
        for (i, stage) in Stage::OPEN.into_iter().enumerate() {
            let offset = (cycle_days as f64 * base_curve.position(stage)).round() as i64;
            nominal_dates[i] = add_days(created, offset);
        }
        let modifiers = stage_modifiers(&config.events, &nominal_dates);
        let curve = base_curve.with_dwell_modifiers(&modifiers.map(|m| m.dwell));

        let expected_close = add_days(created, cycle_days);
        let resolution = if expected_close <= input.as_of {
            let mut multipliers = [1.0; OPEN_STAGE_COUNT];
            for i in 0..OPEN_STAGE_COUNT {
                let quality = config.seasonality.factor(nominal_dates[i]).quality;
                multipliers[i] = quality * modifiers[i].advance;
            }
            let probabilities =
                effective_probabilities(&profile.stage_advance_probabilities, &multipliers);
            DealResolution::Closed(simulate_outcome(&probabilities, rng))
        } else {
            let elapsed = days_between(created, input.as_of) as f64 / cycle_days as f64;
            DealResolution::Open { current: current_open_stage(&curve, elapsed) }
        };

        let timeline = build_timeline(
            &TimelineInputs {
                curve:           &curve,
                created_at:      created,
                cycle_days,
                resolution,
                as_of:           input.as_of,
                jitter_fraction: config.jitter_fraction,
            },
            rng,
        );

        let competitor = if classified.flags.competitive {
            rng.pick(&config.competitors).cloned()
        } else {
            None
        };

        let trial = DealTrial {
            input,
            stream: rng.stream,
            classified,
            cycle_days,
            expected_close,
            resolution,
            timeline,
        };
        let record = assemble(&trial, profile, account, competitor, &config.product_type)?;

        log::debug!(
            "{} {} {} cycle={}d -> {} (p={}%)",
            record.opportunity_id,
            record.segment,
            record.classification,
            record.cycle_days,
            record.stage,
            record.probability
        );
        Ok(record)
    }
}
