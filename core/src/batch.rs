//! Batch generation: N independent deals under one master seed.
//!
//! Deal `i` draws its inputs and its whole simulation from stream `i` of
//! the run's RngBank, so any single deal can be regenerated in isolation
//! with `generate_one(i)` and the result matches the full run.

use crate::{
    assembler::OpportunityRecord,
    calendar::{add_days, days_between},
    engine::{DealEngine, DealInput},
    error::{PipelineError, PipelineResult},
    rng::{DealRng, RngBank},
    roster::ReferenceData,
    types::{DealId, Segment},
};
use chrono::NaiveDate;
use serde::Serialize;

/// Creation dates are drawn this many times against seasonal volume
/// before falling back to a uniform date.
const MAX_DATE_ATTEMPTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailurePolicy {
    /// Log the failed deal, count it, keep going.
    SkipAndLog,
    /// Stop the batch on the first failure.
    AbortAll,
}

#[derive(Debug, Clone)]
pub struct BatchSpec {
    pub deals:      u64,
    pub seed:       u64,
    /// Earliest creation date.
    pub start_date: NaiveDate,
    pub as_of:      NaiveDate,
    pub policy:     FailurePolicy,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedDeal {
    pub index:   u64,
    pub deal_id: DealId,
    pub reason:  String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub records: Vec<OpportunityRecord>,
    pub skipped: Vec<SkippedDeal>,
}

pub struct BatchGenerator<'a> {
    engine:    &'a DealEngine,
    reference: &'a dyn ReferenceData,
    spec:      BatchSpec,
    bank:      RngBank,
}

impl<'a> BatchGenerator<'a> {
    pub fn new(
        engine: &'a DealEngine,
        reference: &'a dyn ReferenceData,
        spec: BatchSpec,
    ) -> PipelineResult<Self> {
        if spec.start_date > spec.as_of {
            return Err(PipelineError::InvalidInput(format!(
                "batch start {} is after as-of {}",
                spec.start_date, spec.as_of
            )));
        }
        let bank = RngBank::new(spec.seed);
        Ok(Self { engine, reference, spec, bank })
    }

    pub fn deal_id(index: u64) -> DealId {
        format!("OPP-{:06}", index + 1)
    }

    pub fn run(&self) -> PipelineResult<BatchReport> {
        log::info!(
            "Generating {} deals (seed={}, {} to {})",
            self.spec.deals,
            self.spec.seed,
            self.spec.start_date,
            self.spec.as_of
        );

        let mut report = BatchReport::default();
        for index in 0..self.spec.deals {
            match self.generate_one(index) {
                Ok(record) => report.records.push(record),
                Err(e) => match self.spec.policy {
                    FailurePolicy::AbortAll => return Err(e),
                    FailurePolicy::SkipAndLog => {
                        let deal_id = Self::deal_id(index);
                        log::warn!("Skipping {deal_id}: {e}");
                        report.skipped.push(SkippedDeal {
                            index,
                            deal_id,
                            reason: e.to_string(),
                        });
                    }
                },
            }
        }

        log::info!(
            "Batch complete: {} records, {} skipped",
            report.records.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Generate deal `index` exactly as `run` would.
    pub fn generate_one(&self, index: u64) -> PipelineResult<OpportunityRecord> {
        let mut rng = self.bank.for_deal(index);
        let input = self.sample_input(index, &mut rng);
        self.engine.generate(input, self.reference, &mut rng)
    }

    fn sample_input(&self, index: u64, rng: &mut DealRng) -> DealInput {
        let config = self.engine.config();
        let created_at = self.sample_created(rng);

        let shares: Vec<f64> = Segment::ALL
            .iter()
            .map(|&s| config.segments.get(s).share)
            .collect();
        let segment = Segment::ALL[rng.weighted_index(&shares)];

        let deal = config.segments.get(segment);
        let base = rng.range_inclusive(deal.min_amount as i64, deal.max_amount as i64) as f64;
        let growth = config.growth.multiplier(created_at, rng);

        DealInput {
            deal_id: Self::deal_id(index),
            segment,
            created_at,
            amount: (base * growth).trunc(),
            as_of: self.spec.as_of,
        }
    }

    /// Recent dates are likelier (exponential lookback from as-of),
    /// thinned by each quarter's seasonal volume.
    fn sample_created(&self, rng: &mut DealRng) -> NaiveDate {
        let seasonality = &self.engine.config().seasonality;
        let total_days = days_between(self.spec.start_date, self.spec.as_of);
        let peak = seasonality
            .quarters
            .iter()
            .map(|q| q.volume)
            .fold(f64::MIN_POSITIVE, f64::max);

        for _ in 0..MAX_DATE_ATTEMPTS {
            let back = rng.exponential(total_days as f64 / 4.0) as i64;
            if back > total_days {
                continue;
            }
            let candidate = add_days(self.spec.as_of, -back);
            if rng.chance(seasonality.factor(candidate).volume / peak) {
                return candidate;
            }
        }
        add_days(self.spec.start_date, rng.range_inclusive(0, total_days))
    }
}
