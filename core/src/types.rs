//! Shared primitive types used across the entire pipeline engine.

use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use std::fmt;

/// A stable, unique identifier for a generated opportunity.
pub type DealId = String;

/// Deal-size tier. Drives which behavioral profiles apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Segment {
    #[serde(rename = "Enterprise")]
    Enterprise,
    #[serde(rename = "Mid-Market")]
    MidMarket,
    #[serde(rename = "SMB")]
    Smb,
}

impl Segment {
    pub const ALL: [Segment; 3] = [Segment::Enterprise, Segment::MidMarket, Segment::Smb];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Enterprise => "Enterprise",
            Self::MidMarket  => "Mid-Market",
            Self::Smb        => "SMB",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pipeline stages in their fixed order.
/// The discriminant is the stable ordinal. NEVER reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Stage {
    #[serde(rename = "1 - Lead Qualification")]
    LeadQualification = 1,
    #[serde(rename = "2 - Discovery")]
    Discovery = 2,
    #[serde(rename = "3 - Proposal")]
    Proposal = 3,
    #[serde(rename = "4 - Negotiation")]
    Negotiation = 4,
    #[serde(rename = "5 - Contract Review")]
    ContractReview = 5,
    #[serde(rename = "6 - Closed Lost")]
    ClosedLost = 6,
    #[serde(rename = "7 - Closed Won")]
    ClosedWon = 7,
}

/// Number of stages a deal can occupy before it closes.
pub const OPEN_STAGE_COUNT: usize = 5;

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::LeadQualification,
        Stage::Discovery,
        Stage::Proposal,
        Stage::Negotiation,
        Stage::ContractReview,
        Stage::ClosedLost,
        Stage::ClosedWon,
    ];

    /// Non-terminal stages, in order.
    pub const OPEN: [Stage; OPEN_STAGE_COUNT] = [
        Stage::LeadQualification,
        Stage::Discovery,
        Stage::Proposal,
        Stage::Negotiation,
        Stage::ContractReview,
    ];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Zero-based position, usable as an array index.
    pub fn index(self) -> usize {
        self as usize - 1
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::ClosedLost | Self::ClosedWon)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::LeadQualification => "1 - Lead Qualification",
            Self::Discovery         => "2 - Discovery",
            Self::Proposal          => "3 - Proposal",
            Self::Negotiation       => "4 - Negotiation",
            Self::ContractReview    => "5 - Contract Review",
            Self::ClosedLost        => "6 - Closed Lost",
            Self::ClosedWon         => "7 - Closed Won",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Mutually exclusive behavioral tag selected per deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    Baseline,
    Competitive,
    TargetingLapsed,
}

impl Classification {
    pub const ALL: [Classification; 3] = [
        Classification::Baseline,
        Classification::Competitive,
        Classification::TargetingLapsed,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Baseline        => "baseline",
            Self::Competitive     => "competitive",
            Self::TargetingLapsed => "targeting-lapsed",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One optional value per stage, indexed by stage ordinal.
///
/// Serializes as a map keyed by stage label, with `null` for stages
/// that hold no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageMap<T: Copy>([Option<T>; 7]);

impl<T: Copy> StageMap<T> {
    pub fn empty() -> Self {
        Self([None; 7])
    }

    pub fn get(&self, stage: Stage) -> Option<T> {
        self.0[stage.index()]
    }

    pub fn set(&mut self, stage: Stage, value: T) {
        self.0[stage.index()] = Some(value);
    }

    /// Every stage with its value, in stage order.
    pub fn iter(&self) -> impl Iterator<Item = (Stage, Option<T>)> + '_ {
        Stage::ALL.into_iter().map(|s| (s, self.get(s)))
    }

    /// Only the stages that hold a value, in stage order.
    pub fn present(&self) -> impl Iterator<Item = (Stage, T)> + '_ {
        Stage::ALL
            .into_iter()
            .filter_map(|s| self.get(s).map(|v| (s, v)))
    }
}

impl<T: Copy> Default for StageMap<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Copy + Serialize> Serialize for StageMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Stage::ALL.len()))?;
        for (stage, value) in self.iter() {
            map.serialize_entry(stage.label(), &value)?;
        }
        map.end()
    }
}
