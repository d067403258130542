use serde::{Deserialize, Serialize};

use super::catalog::{Catalog, CatalogError};
use super::domain::{CriterionKey, ImpactTier};
use super::strategy::StrategyTable;

const BUNDLED_CATALOG: &str = include_str!("../../catalogs/relationship.json");
const BUNDLED_STRATEGIES: &str = include_str!("../../catalogs/strategies.json");

/// Relationship catalog shipped with the crate.
pub fn bundled_catalog() -> Result<Catalog<CompatibilityPoint>, CatalogError> {
    Catalog::from_json_str(BUNDLED_CATALOG)
}

pub fn bundled_strategies() -> Result<StrategyTable<CompatibilityPoint>, CatalogError> {
    Ok(StrategyTable::from_json_str(BUNDLED_STRATEGIES)?)
}

/// The twenty compatibility points of the relationship questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompatibilityPoint {
    CoreValues,
    TrustReliability,
    PersonalBoundaries,
    MutualSupport,
    CommunicationStyles,
    EmotionalIntelligence,
    LifeGoals,
    ConflictResolution,
    EnergyDynamics,
    TransactionalCompatibility,
    ParentingCompatibility,
    RelationshipEfficiency,
    SexualCompatibility,
    FinancialCompatibility,
    IntellectualCompatibility,
    SpiritualCompatibility,
    WorkLifeBalance,
    TimeManagement,
    SocialCompatibility,
    LifestyleCompatibility,
}

impl CompatibilityPoint {
    pub const fn ordered() -> [Self; 20] {
        [
            Self::CoreValues,
            Self::TrustReliability,
            Self::PersonalBoundaries,
            Self::MutualSupport,
            Self::CommunicationStyles,
            Self::EmotionalIntelligence,
            Self::LifeGoals,
            Self::ConflictResolution,
            Self::EnergyDynamics,
            Self::TransactionalCompatibility,
            Self::ParentingCompatibility,
            Self::RelationshipEfficiency,
            Self::SexualCompatibility,
            Self::FinancialCompatibility,
            Self::IntellectualCompatibility,
            Self::SpiritualCompatibility,
            Self::WorkLifeBalance,
            Self::TimeManagement,
            Self::SocialCompatibility,
            Self::LifestyleCompatibility,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::CoreValues => "Core Values",
            Self::TrustReliability => "Trust and Reliability",
            Self::PersonalBoundaries => "Personal Boundaries",
            Self::MutualSupport => "Mutual Support and Dependability",
            Self::CommunicationStyles => "Communication Styles",
            Self::EmotionalIntelligence => "Emotional Intelligence",
            Self::LifeGoals => "Life Goals and Aspirations",
            Self::ConflictResolution => "Conflict Resolution Styles",
            Self::EnergyDynamics => "Energy Dynamics / Temperament",
            Self::TransactionalCompatibility => "Transactional Compatibility (Give and Take)",
            Self::ParentingCompatibility => "Parenting Compatibility",
            Self::RelationshipEfficiency => "Relationship Efficiency and Emotional Management",
            Self::SexualCompatibility => "Sexual Compatibility",
            Self::FinancialCompatibility => "Financial Compatibility",
            Self::IntellectualCompatibility => "Intellectual Compatibility",
            Self::SpiritualCompatibility => "Spiritual Compatibility",
            Self::WorkLifeBalance => "Work-Life Balance",
            Self::TimeManagement => "Time Management and Priorities",
            Self::SocialCompatibility => "Social Compatibility",
            Self::LifestyleCompatibility => "Lifestyle Compatibility",
        }
    }

    pub const fn impact_tier(self) -> ImpactTier {
        match self {
            Self::CoreValues
            | Self::TrustReliability
            | Self::PersonalBoundaries
            | Self::MutualSupport => ImpactTier::VeryHigh,
            Self::CommunicationStyles
            | Self::EmotionalIntelligence
            | Self::LifeGoals
            | Self::ConflictResolution
            | Self::EnergyDynamics
            | Self::TransactionalCompatibility
            | Self::ParentingCompatibility
            | Self::RelationshipEfficiency => ImpactTier::High,
            Self::SexualCompatibility
            | Self::FinancialCompatibility
            | Self::IntellectualCompatibility
            | Self::SpiritualCompatibility => ImpactTier::ModerateHigh,
            Self::WorkLifeBalance
            | Self::TimeManagement
            | Self::SocialCompatibility
            | Self::LifestyleCompatibility => ImpactTier::Moderate,
        }
    }
}

const ALL_POINTS: [CompatibilityPoint; 20] = CompatibilityPoint::ordered();

impl CriterionKey for CompatibilityPoint {
    const ALL: &'static [Self] = &ALL_POINTS;

    fn slug(self) -> &'static str {
        match self {
            Self::CoreValues => "core-values",
            Self::TrustReliability => "trust-reliability",
            Self::PersonalBoundaries => "personal-boundaries",
            Self::MutualSupport => "mutual-support",
            Self::CommunicationStyles => "communication-styles",
            Self::EmotionalIntelligence => "emotional-intelligence",
            Self::LifeGoals => "life-goals",
            Self::ConflictResolution => "conflict-resolution",
            Self::EnergyDynamics => "energy-dynamics",
            Self::TransactionalCompatibility => "transactional-compatibility",
            Self::ParentingCompatibility => "parenting-compatibility",
            Self::RelationshipEfficiency => "relationship-efficiency",
            Self::SexualCompatibility => "sexual-compatibility",
            Self::FinancialCompatibility => "financial-compatibility",
            Self::IntellectualCompatibility => "intellectual-compatibility",
            Self::SpiritualCompatibility => "spiritual-compatibility",
            Self::WorkLifeBalance => "work-life-balance",
            Self::TimeManagement => "time-management",
            Self::SocialCompatibility => "social-compatibility",
            Self::LifestyleCompatibility => "lifestyle-compatibility",
        }
    }
}
