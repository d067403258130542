//! Final classification of a session into a report.

pub mod export;
pub mod modules;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::catalog::Catalog;
use super::controller::AssessmentPolicy;
use super::domain::{CriterionKey, CriterionResult, WeakestLink};
use super::scoring::{DomainScore, ScenarioResponseGroup, ScoreAggregator, Spillover};
use super::selector::select;
use super::sequence::SequenceBuilder;
use super::session::AssessmentSession;
use super::strategy::{StrategyGuidance, StrategyTable};

pub use export::{
    CsvReportFormatter, FormatError, JsonReportFormatter, ReportFormat, ReportFormatter,
    TextReportFormatter,
};
pub use modules::{ModuleReadout, ModuleStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkGuidance<K> {
    #[serde(flatten)]
    pub link: WeakestLink<K>,
    pub strategies: StrategyGuidance,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointInsight<K> {
    pub key: K,
    pub rank: usize,
    pub text: String,
}

/// Catalog themes plus the notes for flagged criteria, in rank order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportInsights<K> {
    pub themes: BTreeMap<String, String>,
    pub points: Vec<PointInsight<K>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report<K> {
    pub scores: Vec<CriterionResult<K>>,
    pub weakest_links: Vec<LinkGuidance<K>>,
    pub domain_scores: Vec<DomainScore<K>>,
    pub spillover: Spillover,
    pub scenario_responses: Vec<ScenarioResponseGroup<K>>,
    pub modules: Vec<ModuleReadout<K>>,
    pub insights: ReportInsights<K>,
    pub generated_at: DateTime<Utc>,
}

impl<K: CriterionKey> Report<K> {
    /// Stage-1 scores, strongest first.
    pub fn overview(&self) -> Vec<&CriterionResult<K>> {
        let mut ranked: Vec<_> = self.scores.iter().collect();
        ranked.sort_by(|a, b| b.weighted_score.total_cmp(&a.weighted_score));
        ranked
    }

    pub fn domain_weak_areas(&self) -> impl Iterator<Item = &DomainScore<K>> {
        self.domain_scores.iter().filter(|score| score.weak)
    }
}

/// Pure function of a session plus the content tables.
pub struct ClassificationEngine<'a, K> {
    catalog: &'a Catalog<K>,
    strategies: &'a StrategyTable<K>,
    policy: AssessmentPolicy,
}

impl<'a, K: CriterionKey> ClassificationEngine<'a, K> {
    pub fn new(
        catalog: &'a Catalog<K>,
        strategies: &'a StrategyTable<K>,
        policy: AssessmentPolicy,
    ) -> Self {
        Self {
            catalog,
            strategies,
            policy,
        }
    }

    pub fn finalize(
        &self,
        session: &AssessmentSession<K>,
        generated_at: DateTime<Utc>,
    ) -> Report<K> {
        let aggregator = ScoreAggregator::new(self.catalog, self.policy.thresholds);
        let builder = SequenceBuilder::new(self.catalog);
        let answers = session.answers();
        let links = session.weakest_links();

        let scores = aggregator.stage1(answers);
        let stage2 = builder.stage2(links);
        let critical = select(
            links.iter().map(|link| link.result.clone()),
            self.policy.critical_link_limit,
        );
        let stage3 = builder.stage3(&critical);

        let weakest_links = links
            .iter()
            .map(|link| LinkGuidance {
                strategies: self.strategies.guidance(link.key(), link.result.severity),
                link: link.clone(),
            })
            .collect();

        let modules = self
            .catalog
            .modules()
            .iter()
            .map(|module| ModuleReadout::evaluate(module, &scores))
            .collect();

        let table = self.catalog.insights();
        let insights = ReportInsights {
            themes: table.themes.clone(),
            points: links
                .iter()
                .filter_map(|link| {
                    table.points.get(&link.key()).map(|text| PointInsight {
                        key: link.key(),
                        rank: link.rank,
                        text: text.clone(),
                    })
                })
                .collect(),
        };

        Report {
            domain_scores: aggregator.stage2(answers, &stage2),
            spillover: aggregator.spillover(answers, &stage2),
            scenario_responses: aggregator.scenario_responses(answers, &stage3, &critical),
            weakest_links,
            modules,
            insights,
            scores,
            generated_at,
        }
    }
}
