//! Adaptive multi-stage assessment: a broad stage-1 pass over a weighted catalog,
//! targeted stage-2 probing of the weakest links, optional stage-3 scenarios for the
//! most critical ones, and a final classified report.
//!
//! The engine pieces ([`SequenceBuilder`], [`ScoreAggregator`], [`select`],
//! [`StageController`], [`ClassificationEngine`]) are synchronous and hold no global
//! state. [`AssessmentService`] and [`assessment_router`] adapt them to a
//! [`SessionStore`] and to HTTP.

pub mod catalog;
pub mod controller;
pub mod domain;
pub mod relationship;
pub mod report;
pub mod router;
pub mod sample;
pub mod scoring;
pub mod selector;
pub mod sequence;
pub mod service;
pub mod session;
pub mod store;
pub mod strategy;

#[cfg(test)]
mod tests;

pub use catalog::{
    AnalysisModule, Catalog, CatalogDocument, CatalogError, Criterion, CriterionPrompt,
    DomainInfo, DomainQuestionSet, InsightTable, ModuleConclusions, ScenarioPrompt,
};
pub use controller::{AssessmentPolicy, RestoreError, SessionError, StageController};
pub use domain::{
    Answers, CriterionKey, CriterionResult, ImpactTier, Priority, Question, QuestionId,
    QuestionKind, Score, ScoringThresholds, Severity, Stage, TierWeights, WeakestLink,
};
pub use relationship::CompatibilityPoint;
pub use report::{
    ClassificationEngine, FormatError, LinkGuidance, ModuleReadout, ModuleStatus, PointInsight,
    Report, ReportFormat, ReportFormatter, ReportInsights,
};
pub use router::assessment_router;
pub use sample::sample_session;
pub use scoring::{DomainScore, ScenarioResponseGroup, ScoreAggregator, Spillover};
pub use selector::{select, WeakestLinkSelector};
pub use sequence::{SequenceBuilder, GENERIC_DOMAIN};
pub use service::{AssessmentService, ServiceError, SessionView};
pub use session::{Advance, AssessmentSession};
pub use store::{
    decode_snapshot, encode_snapshot, JsonFileSessionStore, SessionId, SessionSnapshot,
    SessionStore, SnapshotError, StoreError,
};
pub use strategy::{StrategyGuidance, StrategySet, StrategyTable};
