//! Deal classification.
//!
//! Two independent boolean trends are drawn per deal (competitive pressure,
//! then targeting discipline), and an ordered rule list turns the flags into
//! exactly one `Classification`.

use crate::{
    config::EngineConfig,
    rng::DealRng,
    types::{Classification, Segment},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleCondition {
    /// The deal faces a named competitor.
    Competitive,
    /// The deal was sold outside the ideal customer profile.
    OffTarget,
}

/// One entry of the ordered classification rule list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub classification: Classification,
    /// `None` admits every segment.
    #[serde(default)]
    pub segments:       Option<Vec<Segment>>,
    pub condition:      RuleCondition,
}

impl ClassificationRule {
    pub fn admits(&self, segment: Segment) -> bool {
        self.segments
            .as_ref()
            .map_or(true, |allowed| allowed.contains(&segment))
    }

    pub fn matches(&self, segment: Segment, flags: DealFlags) -> bool {
        self.admits(segment)
            && match self.condition {
                RuleCondition::Competitive => flags.competitive,
                RuleCondition::OffTarget   => !flags.targeted,
            }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DealFlags {
    pub competitive: bool,
    pub targeted:    bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified {
    pub flags:          DealFlags,
    pub classification: Classification,
}

/// Draw both flags for a deal created on `date`. Consumes exactly two draws,
/// competitive first.
pub fn classify(
    config: &EngineConfig,
    segment: Segment,
    date: NaiveDate,
    rng: &mut DealRng,
) -> Classified {
    let competitive_rate = config.competitive.rate(segment, date);
    let targeting_rate = config.targeting.rate(segment, date);

    let flags = DealFlags {
        competitive: rng.next_f64() < competitive_rate,
        targeted:    rng.next_f64() < targeting_rate,
    };

    Classified {
        flags,
        classification: resolve_classification(&config.rules, segment, flags),
    }
}

/// First matching rule wins; `Baseline` when none match.
pub fn resolve_classification(
    rules: &[ClassificationRule],
    segment: Segment,
    flags: DealFlags,
) -> Classification {
    rules
        .iter()
        .find(|rule| rule.matches(segment, flags))
        .map_or(Classification::Baseline, |rule| rule.classification)
}

/// Every classification a deal in `segment` can end up with under `rules`.
pub fn reachable_classifications(
    rules: &[ClassificationRule],
    segment: Segment,
) -> Vec<Classification> {
    let mut out = vec![Classification::Baseline];
    for rule in rules.iter().filter(|r| r.admits(segment)) {
        if !out.contains(&rule.classification) {
            out.push(rule.classification);
        }
    }
    out
}
