//! Record assembly and post-assembly validation.
//!
//! RULES:
//!   - Closed-won reports probability 100 and expected revenue = amount.
//!   - Closed-lost reports probability 0 and expected revenue 0.
//!   - Open deals report the profile's probability for their current stage.
//!   - Only closed-lost deals report the highest stage reached.
//!   - Every assembled record is validated before it leaves the engine.
//!     A failure is a bug in the engine, and the error carries the inputs
//!     needed to reproduce it.

use crate::{
    calendar::{days_between, fiscal_quarter},
    engine::DealTrial,
    error::{PipelineError, PipelineResult},
    outcome::DealResolution,
    profile::BehavioralProfile,
    roster::AccountRef,
    types::{Classification, DealId, Segment, Stage, StageMap},
};
use chrono::NaiveDate;
use serde::Serialize;

pub const ICP_MISMATCH_REASON: &str = "Industry not core ICP";

/// One generated opportunity, ready for export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityRecord {
    pub opportunity_id:        DealId,
    pub opportunity_name:      String,
    pub account_name:          String,
    pub industry:              String,
    pub region:                String,
    pub geo:                   String,
    pub area:                  String,
    pub owner:                 String,
    pub product_type:          String,
    pub segment:               Segment,
    pub amount:                f64,
    pub created_date:          NaiveDate,
    /// Actual close date when closed, expected close date when open.
    pub close_date:            NaiveDate,
    pub fiscal_quarter:        String,
    pub age_days:              i64,
    pub cycle_days:            i64,
    pub stage:                 Stage,
    /// Set for closed-lost deals only.
    pub highest_stage_reached: Option<Stage>,
    pub probability:           u8,
    pub expected_revenue:      f64,
    pub is_closed:             bool,
    pub is_won:                bool,
    pub classification:        Classification,
    pub competitive:           bool,
    pub targeted:              bool,
    pub primary_competitor:    Option<String>,
    pub icp_mismatch_reason:   Option<String>,
    pub stage_entry_dates:     StageMap<NaiveDate>,
    pub days_in_stage:         StageMap<i64>,
}

/// Build the record for a finished trial and validate it.
pub fn assemble(
    trial: &DealTrial,
    profile: &BehavioralProfile,
    account: AccountRef,
    competitor: Option<String>,
    product_type: &str,
) -> PipelineResult<OpportunityRecord> {
    let input = &trial.input;

    let (stage, probability, expected_revenue) = match trial.resolution {
        DealResolution::Closed(outcome) if outcome.terminal == Stage::ClosedWon => {
            (Stage::ClosedWon, 100, input.amount)
        }
        DealResolution::Closed(outcome) => (outcome.terminal, 0, 0.0),
        DealResolution::Open { current } => {
            let p = profile.open_probability(current);
            (current, p, (input.amount * p as f64 / 100.0).trunc())
        }
    };

    let first_word = account.company.split_whitespace().next().unwrap_or("Account");
    let targeted = trial.classified.flags.targeted;

    let record = OpportunityRecord {
        opportunity_id:        input.deal_id.clone(),
        opportunity_name:      format!("{first_word} - {product_type} Implementation"),
        product_type:          product_type.to_string(),
        segment:               input.segment,
        amount:                input.amount,
        created_date:          input.created_at,
        close_date:            trial.expected_close,
        fiscal_quarter:        fiscal_quarter(trial.expected_close),
        age_days:              days_between(input.created_at, input.as_of),
        cycle_days:            trial.cycle_days,
        stage,
        highest_stage_reached: (stage == Stage::ClosedLost)
            .then(|| trial.resolution.highest_reached()),
        probability,
        expected_revenue,
        is_closed:             trial.resolution.is_closed(),
        is_won:                stage == Stage::ClosedWon,
        classification:        trial.classified.classification,
        competitive:           trial.classified.flags.competitive,
        targeted,
        primary_competitor:    competitor,
        icp_mismatch_reason:   (!targeted).then(|| ICP_MISMATCH_REASON.to_string()),
        stage_entry_dates:     trial.timeline.entry_dates,
        days_in_stage:         trial.timeline.dwell_days,
        account_name:          account.company,
        industry:              account.industry,
        region:                account.region,
        geo:                   account.geo,
        area:                  account.area,
        owner:                 account.owner,
    };

    validate(&record, input.as_of).map_err(|detail| PipelineError::InvariantViolation {
        detail,
        inputs: trial.describe_inputs(),
    })?;
    Ok(record)
}

/// Check every cross-field invariant of a record.
pub fn validate(record: &OpportunityRecord, as_of: NaiveDate) -> Result<(), String> {
    let amount = record.amount;
    if record.probability > 100 {
        return Err(format!("probability {} above 100", record.probability));
    }
    if !(record.expected_revenue >= 0.0 && record.expected_revenue <= amount) {
        return Err(format!(
            "expected revenue {} outside [0, {amount}]",
            record.expected_revenue
        ));
    }
    if record.created_date > as_of {
        return Err(format!("created {} after as-of {as_of}", record.created_date));
    }

    match record.stage {
        Stage::ClosedWon => {
            if record.probability != 100 || record.expected_revenue != amount {
                return Err("won deal must report 100% and full amount".into());
            }
        }
        Stage::ClosedLost => {
            if record.probability != 0 || record.expected_revenue != 0.0 {
                return Err("lost deal must report 0% and zero revenue".into());
            }
        }
        _ => {
            if record.is_closed {
                return Err(format!("closed deal reports open stage {}", record.stage));
            }
        }
    }

    // Won deals passed every open stage; open deals sit in their furthest one.
    let reached = match (record.stage, record.highest_stage_reached) {
        (Stage::ClosedLost, Some(highest)) if !highest.is_terminal() => highest,
        (Stage::ClosedLost, other) => {
            return Err(format!("lost deal reports highest stage {other:?}"));
        }
        (_, Some(highest)) => {
            return Err(format!("{} deal reports highest stage {highest}", record.stage));
        }
        (Stage::ClosedWon, None) => Stage::ContractReview,
        (current, None) => current,
    };

    let mut previous: Option<NaiveDate> = None;
    for (stage, entry) in record.stage_entry_dates.present() {
        if previous.is_some_and(|p| entry < p) {
            return Err(format!("entry into {stage} on {entry} precedes the prior stage"));
        }
        previous = Some(entry);

        let past_highest = !stage.is_terminal() && stage > reached;
        let wrong_terminal = stage.is_terminal() && stage != record.stage;
        if past_highest || wrong_terminal {
            return Err(format!("{stage} has an entry date but was never reached"));
        }
    }
    if record.stage_entry_dates.get(record.stage).is_none() {
        return Err(format!("current stage {} has no entry date", record.stage));
    }

    for (stage, dwell) in record.days_in_stage.present() {
        if dwell < 0 {
            return Err(format!("negative dwell {dwell} in {stage}"));
        }
    }

    let total: i64 = record.days_in_stage.present().map(|(_, d)| d).sum();
    let (end, label) = if record.is_closed {
        (record.close_date, "close")
    } else {
        (as_of, "as-of")
    };
    let span = days_between(record.created_date, end);
    if total != span {
        return Err(format!("dwell total {total} != {span} days from created to {label}"));
    }
    Ok(())
}
