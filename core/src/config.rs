use crate::{
    classifier::{ClassificationRule, RuleCondition},
    error::{PipelineError, PipelineResult},
    profile::{BehavioralProfile, CycleDistribution, StageTimingCurve},
    types::{Classification, Segment, Stage, OPEN_STAGE_COUNT},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One value per segment. Total by construction, so lookups never fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerSegment<T> {
    pub enterprise: T,
    pub mid_market: T,
    pub smb:        T,
}

impl<T> PerSegment<T> {
    pub fn get(&self, segment: Segment) -> &T {
        match segment {
            Segment::Enterprise => &self.enterprise,
            Segment::MidMarket  => &self.mid_market,
            Segment::Smb        => &self.smb,
        }
    }

    pub fn get_mut(&mut self, segment: Segment) -> &mut T {
        match segment {
            Segment::Enterprise => &mut self.enterprise,
            Segment::MidMarket  => &mut self.mid_market,
            Segment::Smb        => &mut self.smb,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Segment, &T)> {
        Segment::ALL.into_iter().map(move |s| (s, self.get(s)))
    }
}

// ── Trend tables ──────────────────────────────────────────────────

/// Linear drift in months since the table's epoch, clamped to [floor, ceiling].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendCurve {
    pub base:    f64,
    /// Change per calendar month (negative for eroding trends).
    pub slope:   f64,
    pub floor:   f64,
    pub ceiling: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendTable {
    pub epoch:  NaiveDate,
    pub curves: PerSegment<TrendCurve>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonalFactor {
    /// Relative weight of deal creation in this quarter.
    pub volume:  f64,
    /// Multiplier on interior stage-advance probabilities.
    pub quality: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityConfig {
    /// Calendar quarters Q1..Q4.
    pub quarters: [SeasonalFactor; 4],
}

/// A one-time business change that slows or weakens a single stage
/// from `start_date` onward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventConfig {
    pub name:             String,
    pub start_date:       NaiveDate,
    pub stage:            Stage,
    pub advance_modifier: f64,
    pub dwell_modifier:   f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthConfig {
    pub epoch:          NaiveDate,
    pub quarterly_rate: f64,
    pub volatility:     f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDealConfig {
    /// Relative share of generated deals.
    pub share:      f64,
    pub min_amount: u64,
    pub max_amount: u64,
}

// ── Engine config ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub competitive:     TrendTable,
    pub targeting:       TrendTable,
    pub seasonality:     SeasonalityConfig,
    pub events:          Vec<EventConfig>,
    pub growth:          GrowthConfig,
    /// Evaluated top-down; first match wins, baseline otherwise.
    pub rules:           Vec<ClassificationRule>,
    pub profiles:        Vec<BehavioralProfile>,
    pub segments:        PerSegment<SegmentDealConfig>,
    pub competitors:     Vec<String>,
    pub product_type:    String,
    /// Stage-entry jitter as a fraction of the preceding stage's span.
    pub jitter_fraction: f64,
}

impl EngineConfig {
    /// Load from a JSON file.
    /// In tests, use EngineConfig::standard() and override fields.
    pub fn load(path: &str) -> PipelineResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject tables the engine cannot run with. Profile shape is checked
    /// separately by the profile registry.
    pub fn validate(&self) -> PipelineResult<()> {
        for (name, table) in [("competitive", &self.competitive), ("targeting", &self.targeting)] {
            for (segment, curve) in table.curves.iter() {
                let in_unit = |v: f64| (0.0..=1.0).contains(&v);
                if !in_unit(curve.floor) || !in_unit(curve.ceiling) || curve.floor > curve.ceiling {
                    return Err(PipelineError::InvalidConfig(format!(
                        "{name} trend for {segment}: bounds [{}, {}] must satisfy 0 <= floor <= ceiling <= 1",
                        curve.floor, curve.ceiling
                    )));
                }
                if !curve.base.is_finite() || !curve.slope.is_finite() {
                    return Err(PipelineError::InvalidConfig(format!(
                        "{name} trend for {segment}: base and slope must be finite"
                    )));
                }
            }
        }

        for (i, q) in self.seasonality.quarters.iter().enumerate() {
            if !(q.volume > 0.0) || !(q.quality >= 0.0) {
                return Err(PipelineError::InvalidConfig(format!(
                    "seasonality Q{}: volume must be > 0 and quality >= 0",
                    i + 1
                )));
            }
        }

        for event in &self.events {
            if event.stage.is_terminal() {
                return Err(PipelineError::InvalidConfig(format!(
                    "event '{}' targets terminal stage {}",
                    event.name, event.stage
                )));
            }
            if !(event.dwell_modifier > 0.0) || !(event.advance_modifier >= 0.0) {
                return Err(PipelineError::InvalidConfig(format!(
                    "event '{}': dwell modifier must be > 0 and advance modifier >= 0",
                    event.name
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.growth.volatility) {
            return Err(PipelineError::InvalidConfig(format!(
                "growth volatility {} must be in [0, 1]",
                self.growth.volatility
            )));
        }

        for (segment, deal) in self.segments.iter() {
            if deal.min_amount == 0 || deal.min_amount > deal.max_amount || !(deal.share >= 0.0) {
                return Err(PipelineError::InvalidConfig(format!(
                    "segment {segment}: need 0 < min_amount <= max_amount and share >= 0"
                )));
            }
        }
        if self.segments.iter().map(|(_, d)| d.share).sum::<f64>() <= 0.0 {
            return Err(PipelineError::InvalidConfig("segment shares sum to zero".into()));
        }

        if !(0.0..1.0).contains(&self.jitter_fraction) {
            return Err(PipelineError::InvalidConfig(format!(
                "jitter_fraction {} must be in [0, 1)",
                self.jitter_fraction
            )));
        }
        Ok(())
    }

    pub fn profile_mut(
        &mut self,
        segment: Segment,
        classification: Classification,
    ) -> Option<&mut BehavioralProfile> {
        self.profiles
            .iter_mut()
            .find(|p| p.segment == segment && p.classification == classification)
    }

    /// The stock tables: competition rising fastest in Mid-Market,
    /// targeting discipline eroding fastest in Enterprise.
    pub fn standard() -> Self {
        let epoch = date(2023, 1, 1);

        let competitive = TrendTable {
            epoch,
            curves: PerSegment {
                enterprise: TrendCurve { base: 0.15, slope: 0.005, floor: 0.0, ceiling: 0.45 },
                mid_market: TrendCurve { base: 0.20, slope: 0.020, floor: 0.0, ceiling: 0.70 },
                smb:        TrendCurve { base: 0.10, slope: 0.003, floor: 0.0, ceiling: 0.25 },
            },
        };

        let targeting = TrendTable {
            epoch,
            curves: PerSegment {
                enterprise: TrendCurve { base: 0.90, slope: -0.025, floor: 0.30, ceiling: 1.0 },
                mid_market: TrendCurve { base: 0.80, slope: -0.003, floor: 0.45, ceiling: 1.0 },
                smb:        TrendCurve { base: 0.60, slope: -0.001, floor: 0.40, ceiling: 1.0 },
            },
        };

        let seasonality = SeasonalityConfig {
            quarters: [
                SeasonalFactor { volume: 1.3, quality: 0.90 }, // budget flush
                SeasonalFactor { volume: 1.0, quality: 1.00 },
                SeasonalFactor { volume: 0.8, quality: 1.05 }, // summer slowdown
                SeasonalFactor { volume: 1.2, quality: 1.10 }, // year-end push
            ],
        };

        let events = vec![
            EventConfig {
                name:             "security_process_change".into(),
                start_date:       date(2024, 4, 1),
                stage:            Stage::ContractReview,
                advance_modifier: 0.85,
                dwell_modifier:   1.4,
            },
            EventConfig {
                name:             "competitive_launch".into(),
                start_date:       date(2024, 6, 1),
                stage:            Stage::Discovery,
                advance_modifier: 0.90,
                dwell_modifier:   1.25,
            },
            EventConfig {
                name:             "pricing_model_change".into(),
                start_date:       date(2024, 7, 1),
                stage:            Stage::Negotiation,
                advance_modifier: 0.80,
                dwell_modifier:   1.3,
            },
        ];

        let rules = vec![
            ClassificationRule {
                classification: Classification::TargetingLapsed,
                segments:       Some(vec![Segment::Enterprise]),
                condition:      RuleCondition::OffTarget,
            },
            ClassificationRule {
                classification: Classification::Competitive,
                segments:       None,
                condition:      RuleCondition::Competitive,
            },
        ];

        Self {
            competitive,
            targeting,
            seasonality,
            events,
            growth: GrowthConfig {
                epoch,
                quarterly_rate: 0.25,
                volatility:     0.10,
            },
            rules,
            profiles: standard_profiles(),
            segments: PerSegment {
                enterprise: SegmentDealConfig { share: 0.25, min_amount: 100_000, max_amount: 500_000 },
                mid_market: SegmentDealConfig { share: 0.50, min_amount: 25_000,  max_amount: 100_000 },
                smb:        SegmentDealConfig { share: 0.25, min_amount: 5_000,   max_amount: 30_000 },
            },
            competitors:     vec!["OpenAI".into(), "Perplexity".into()],
            product_type:    "AI Platform".into(),
            jitter_fraction: 0.2,
        }
    }
}

// Timing curves: where in the cycle each stage is normally entered.
const BASE_CURVE: [f64; 7]        = [0.0, 0.15, 0.35, 0.55, 0.75, 1.0, 1.0];
const COMPETITIVE_CURVE: [f64; 7] = [0.0, 0.08, 0.15, 0.18, 0.90, 1.0, 1.0];
const LAPSED_CURVE: [f64; 7]      = [0.0, 0.05, 0.75, 0.85, 0.95, 1.0, 1.0];

const BASE_OPEN_PROBS: [u8; OPEN_STAGE_COUNT]        = [15, 25, 40, 65, 85];
const COMPETITIVE_OPEN_PROBS: [u8; OPEN_STAGE_COUNT] = [10, 15, 25, 35, 60];
const LAPSED_OPEN_PROBS: [u8; OPEN_STAGE_COUNT]      = [8, 12, 30, 50, 70];

fn standard_profiles() -> Vec<BehavioralProfile> {
    use Classification::*;
    use Segment::*;

    vec![
        profile(Enterprise, Baseline,        180.0, [0.80, 0.70, 0.60, 0.75, 0.85], BASE_CURVE,        BASE_OPEN_PROBS,        0.30),
        profile(Enterprise, Competitive,     240.0, [0.75, 0.65, 0.50, 0.55, 0.75], COMPETITIVE_CURVE, COMPETITIVE_OPEN_PROBS, 0.20),
        profile(Enterprise, TargetingLapsed, 280.0, [0.75, 0.15, 0.65, 0.70, 0.80], LAPSED_CURVE,      LAPSED_OPEN_PROBS,      0.15),
        profile(MidMarket,  Baseline,         90.0, [0.75, 0.65, 0.70, 0.80, 0.85], BASE_CURVE,        BASE_OPEN_PROBS,        0.45),
        profile(MidMarket,  Competitive,     135.0, [0.70, 0.60, 0.80, 0.05, 0.90], COMPETITIVE_CURVE, COMPETITIVE_OPEN_PROBS, 0.25),
        profile(MidMarket,  TargetingLapsed, 110.0, [0.70, 0.50, 0.65, 0.75, 0.85], BASE_CURVE,        BASE_OPEN_PROBS,        0.35),
        profile(Smb,        Baseline,         45.0, [0.70, 0.75, 0.75, 0.85, 0.90], BASE_CURVE,        BASE_OPEN_PROBS,        0.60),
        profile(Smb,        Competitive,      65.0, [0.65, 0.70, 0.60, 0.75, 0.85], COMPETITIVE_CURVE, COMPETITIVE_OPEN_PROBS, 0.40),
        profile(Smb,        TargetingLapsed,  55.0, [0.65, 0.70, 0.70, 0.80, 0.85], BASE_CURVE,        BASE_OPEN_PROBS,        0.55),
    ]
}

fn profile(
    segment: Segment,
    classification: Classification,
    mean_cycle_days: f64,
    advance: [f64; OPEN_STAGE_COUNT],
    curve: [f64; 7],
    open_probs: [u8; OPEN_STAGE_COUNT],
    nominal_win_rate: f64,
) -> BehavioralProfile {
    BehavioralProfile {
        segment,
        classification,
        cycle_days: CycleDistribution {
            mean:   mean_cycle_days,
            spread: mean_cycle_days * 0.3,
            floor:  20,
        },
        stage_advance_probabilities: advance,
        stage_timing_curve:          StageTimingCurve(curve),
        open_stage_probabilities:    open_probs,
        nominal_win_rate,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    // Constant calendar dates; construction cannot fail.
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}
