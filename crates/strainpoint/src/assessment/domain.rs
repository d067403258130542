use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

/// Closed identifier set for one questionnaire family.
///
/// Every lookup table in the engine is keyed by an implementor of this trait, so a
/// criterion that is missing from a mapping is visible at the type level rather than
/// as a silent string mismatch.
pub trait CriterionKey:
    Copy + Ord + Hash + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Every key in declaration order.
    const ALL: &'static [Self];

    /// Stable kebab-case identifier used in question ids and exports.
    fn slug(self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImpactTier {
    VeryHigh,
    High,
    ModerateHigh,
    Moderate,
}

impl ImpactTier {
    pub const fn ordered() -> [Self; 4] {
        [Self::VeryHigh, Self::High, Self::ModerateHigh, Self::Moderate]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::VeryHigh => "Very High",
            Self::High => "High",
            Self::ModerateHigh => "Moderate-High",
            Self::Moderate => "Moderate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Stage1,
    Stage2,
    Stage3,
    Done,
}

impl Stage {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Stage1 => "Broad Assessment",
            Self::Stage2 => "Domain Deep Dive",
            Self::Stage3 => "Scenario Review",
            Self::Done => "Complete",
        }
    }

    pub const fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Scalar,
    Scenario,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub String);

impl QuestionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A single prompt placed into a stage sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question<K> {
    pub id: QuestionId,
    pub prompt: String,
    pub stage: Stage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub criterion: K,
    pub weight: f64,
    pub kind: QuestionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

/// Answer value on the 0..=10 scale. Out-of-range input is clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 10;

    pub fn new(value: i64) -> Self {
        // clamp keeps the cast lossless
        Self(value.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }
}

impl From<i64> for Score {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<Score> for u8 {
    fn from(value: Score) -> Self {
        value.0
    }
}

/// Recorded answers keyed by question id. Re-recording overwrites.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers(BTreeMap<QuestionId, Score>);

impl Answers {
    pub fn record(&mut self, id: QuestionId, score: Score) {
        self.0.insert(id, score);
    }

    pub fn get(&self, id: &QuestionId) -> Option<Score> {
        self.0.get(id).copied()
    }

    pub fn contains(&self, id: &QuestionId) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, Score)> {
        self.0.iter().map(|(id, score)| (id, *score))
    }
}

impl FromIterator<(QuestionId, Score)> for Answers {
    fn from_iter<T: IntoIterator<Item = (QuestionId, Score)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Moderate,
    Low,
}

impl Priority {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Moderate => "Moderate",
            Self::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Moderate,
    Mild,
    Minimal,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::Moderate => "Moderate",
            Self::Mild => "Mild",
            Self::Minimal => "Minimal",
        }
    }
}

/// Raw-score cut points for priority and severity bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringThresholds {
    pub critical: f64,
    pub weakest_link: f64,
    pub moderate: f64,
    pub strong: f64,
}

impl Default for ScoringThresholds {
    fn default() -> Self {
        Self {
            critical: 3.0,
            weakest_link: 4.0,
            moderate: 5.0,
            strong: 7.0,
        }
    }
}

impl ScoringThresholds {
    pub fn priority(&self, raw: f64) -> Priority {
        if raw <= self.critical {
            Priority::Critical
        } else if raw <= self.weakest_link {
            Priority::High
        } else if raw <= self.moderate {
            Priority::Moderate
        } else {
            Priority::Low
        }
    }

    pub fn severity(&self, raw: f64) -> Severity {
        if raw <= self.critical {
            Severity::Critical
        } else if raw <= self.moderate {
            Severity::Moderate
        } else if raw <= self.strong {
            Severity::Mild
        } else {
            Severity::Minimal
        }
    }

    /// Weak-link floor: only criteria at or under the moderate band get a deep dive.
    pub fn is_deep_dive_candidate(&self, raw: f64) -> bool {
        raw <= self.moderate
    }
}

/// Multiplier applied per impact tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierWeights {
    pub very_high: f64,
    pub high: f64,
    pub moderate_high: f64,
    pub moderate: f64,
}

impl Default for TierWeights {
    fn default() -> Self {
        Self {
            very_high: 1.0,
            high: 0.9,
            moderate_high: 0.8,
            moderate: 0.7,
        }
    }
}

impl TierWeights {
    pub fn weight(&self, tier: ImpactTier) -> f64 {
        match tier {
            ImpactTier::VeryHigh => self.very_high,
            ImpactTier::High => self.high,
            ImpactTier::ModerateHigh => self.moderate_high,
            ImpactTier::Moderate => self.moderate,
        }
    }
}

/// Stage-1 scoring outcome for one criterion. Always derived, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionResult<K> {
    pub key: K,
    pub name: String,
    pub impact_tier: ImpactTier,
    pub raw_score: f64,
    pub tier_weight: f64,
    pub base_weight: f64,
    pub weighted_score: f64,
    pub priority: Priority,
    pub severity: Severity,
    pub answered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeakestLink<K> {
    pub rank: usize,
    #[serde(flatten)]
    pub result: CriterionResult<K>,
}

impl<K: CriterionKey> WeakestLink<K> {
    pub fn key(&self) -> K {
        self.result.key
    }
}
