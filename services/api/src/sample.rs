use crate::infra::{load_catalog, load_strategies};
use chrono::Utc;
use clap::Args;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use strainpoint::assessment::{sample_session, ClassificationEngine, ReportFormat, StageController};
use strainpoint::config::AppConfig;
use strainpoint::error::AppError;
use strainpoint::telemetry::{self, LogOutput};
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct SampleArgs {
    /// Seed for both question order and the random answers
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Output format for the generated report
    #[arg(long, default_value = "json")]
    pub(crate) format: ReportFormat,
}

pub(crate) fn run_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, LogOutput::Stderr)?;
    println!("{}", render_sample(&config, &args)?);
    Ok(())
}

pub(crate) fn render_sample(config: &AppConfig, args: &SampleArgs) -> Result<String, AppError> {
    let catalog = load_catalog(config.assessment.catalog_path.as_deref())?;
    let strategies = load_strategies(config.assessment.strategy_path.as_deref())?;
    let policy = config.assessment.policy();

    let seed = args
        .seed
        .or(config.assessment.shuffle_seed)
        .unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);
    let controller = StageController::new(&catalog, policy);
    let session = sample_session(&controller, seed, &mut rng)?;
    info!(seed, answers = session.answers().len(), "sample session finished");

    let report =
        ClassificationEngine::new(&catalog, &strategies, policy).finalize(&session, Utc::now());
    Ok(args.format.render(&report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use strainpoint::config::{AppEnvironment, AssessmentConfig, ServerConfig, TelemetryConfig};

    fn config() -> AppConfig {
        AppConfig {
            environment: AppEnvironment::Test,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            telemetry: TelemetryConfig {
                log_level: "warn".to_string(),
            },
            assessment: AssessmentConfig {
                weak_link_limit: 5,
                critical_link_limit: 5,
                shuffle_seed: None,
                session_dir: PathBuf::from("unused"),
                catalog_path: None,
                strategy_path: None,
            },
        }
    }

    #[test]
    fn seeded_samples_are_reproducible() {
        let args = SampleArgs {
            seed: Some(404),
            format: ReportFormat::Csv,
        };
        let first = render_sample(&config(), &args).expect("sample renders");
        let second = render_sample(&config(), &args).expect("sample renders");

        assert_eq!(first, second);
        assert_eq!(first.lines().count(), 21);
    }

    #[test]
    fn json_sample_lists_every_point() {
        let args = SampleArgs {
            seed: Some(9),
            format: ReportFormat::Json,
        };
        let rendered = render_sample(&config(), &args).expect("sample renders");
        let value: serde_json::Value = serde_json::from_str(&rendered).expect("json");

        assert_eq!(value["scores"].as_array().map(Vec::len), Some(20));
        assert!(value["weakest_links"].as_array().map(Vec::len).unwrap_or(0) <= 5);
    }
}
