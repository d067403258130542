use crate::infra::{load_catalog, load_strategies};
use clap::Args;
use std::fmt::Write as _;
use std::path::PathBuf;
use strainpoint::assessment::{Catalog, CompatibilityPoint, CriterionKey, StrategyTable};
use strainpoint::config::AppConfig;
use strainpoint::error::AppError;
use strainpoint::telemetry::{self, LogOutput};
use tracing::warn;

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogCheckArgs {
    /// Catalog file to check instead of the configured one
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Strategy file to check instead of the configured one
    #[arg(long)]
    pub(crate) strategies: Option<PathBuf>,
}

/// Gaps that do not stop an assessment from running but degrade it.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct CoverageReport {
    pub(crate) criteria: usize,
    pub(crate) missing_criteria: Vec<CompatibilityPoint>,
    pub(crate) without_stage2: Vec<CompatibilityPoint>,
    pub(crate) synthesized_scenarios: Vec<CompatibilityPoint>,
    pub(crate) generic_strategies: Vec<CompatibilityPoint>,
}

pub(crate) fn coverage(
    catalog: &Catalog<CompatibilityPoint>,
    strategies: &StrategyTable<CompatibilityPoint>,
) -> CoverageReport {
    let mut report = CoverageReport {
        criteria: catalog.len(),
        missing_criteria: catalog.missing_keys(),
        generic_strategies: strategies.missing_keys(),
        ..CoverageReport::default()
    };

    for criterion in catalog.criteria() {
        if !catalog.has_stage2_questions(criterion) {
            report.without_stage2.push(criterion.key);
        }
        if catalog.scenarios(criterion.key).is_none() {
            report.synthesized_scenarios.push(criterion.key);
        }
    }
    report
}

pub(crate) fn run_catalog_check(args: CatalogCheckArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, LogOutput::Stderr)?;

    let catalog_path = args.catalog.or(config.assessment.catalog_path);
    let strategy_path = args.strategies.or(config.assessment.strategy_path);
    let catalog = load_catalog(catalog_path.as_deref())?;
    let strategies = load_strategies(strategy_path.as_deref())?;

    let report = coverage(&catalog, &strategies);
    for key in &report.missing_criteria {
        warn!(criterion = key.slug(), "criterion missing from catalog");
    }
    for key in &report.without_stage2 {
        warn!(criterion = key.slug(), "no stage-2 questions can be built");
    }
    println!("{}", summarize(&report));
    Ok(())
}

fn slugs(keys: &[CompatibilityPoint]) -> String {
    if keys.is_empty() {
        return "none".to_string();
    }
    keys.iter().map(|key| key.slug()).collect::<Vec<_>>().join(", ")
}

pub(crate) fn summarize(report: &CoverageReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Catalog OK: {} criteria", report.criteria);
    let _ = writeln!(out, "Missing criteria: {}", slugs(&report.missing_criteria));
    let _ = writeln!(out, "No stage-2 questions: {}", slugs(&report.without_stage2));
    let _ = writeln!(
        out,
        "Synthesized scenarios: {}",
        slugs(&report.synthesized_scenarios)
    );
    let _ = write!(
        out,
        "Generic strategies: {}",
        slugs(&report.generic_strategies)
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use strainpoint::assessment::StrategySet;

    #[test]
    fn bundled_data_is_complete_where_it_matters() {
        let catalog = load_catalog(None).expect("catalog");
        let strategies = load_strategies(None).expect("strategies");
        let report = coverage(&catalog, &strategies);

        assert_eq!(report.criteria, 20);
        assert!(report.missing_criteria.is_empty());
        assert!(report.without_stage2.is_empty());
        assert!(!report
            .synthesized_scenarios
            .contains(&CompatibilityPoint::CoreValues));
        assert!(report
            .generic_strategies
            .contains(&CompatibilityPoint::LifestyleCompatibility));
    }

    #[test]
    fn empty_curated_sets_do_not_count_as_stage2_coverage() {
        let catalog = Catalog::<CompatibilityPoint>::from_json_str(
            r#"{
                "criteria": [
                    {
                        "key": "core-values",
                        "name": "Core Values",
                        "impact_tier": "very-high",
                        "questions": [{ "text": "only prompt" }]
                    },
                    {
                        "key": "trust-reliability",
                        "name": "Trust and Reliability",
                        "impact_tier": "very-high",
                        "questions": [{ "text": "first" }, { "text": "second" }]
                    }
                ],
                "domain_questions": {
                    "core-values": { "domain": "values", "questions": [] },
                    "trust-reliability": { "domain": "trust", "questions": [] }
                }
            }"#,
        )
        .expect("catalog parses");
        let strategies = StrategyTable::new(StrategySet::default());

        let report = coverage(&catalog, &strategies);
        assert_eq!(report.without_stage2, vec![CompatibilityPoint::CoreValues]);
    }

    #[test]
    fn an_empty_strategy_table_falls_back_everywhere() {
        let catalog = load_catalog(None).expect("catalog");
        let strategies = StrategyTable::new(StrategySet::default());
        let report = coverage(&catalog, &strategies);

        assert_eq!(report.generic_strategies.len(), 20);
        let summary = summarize(&report);
        assert!(summary.starts_with("Catalog OK: 20 criteria"));
        assert!(summary.contains("Missing criteria: none"));
    }
}
