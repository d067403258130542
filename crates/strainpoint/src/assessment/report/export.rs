use serde::Deserialize;
use std::fmt::Write as _;
use std::str::FromStr;

use super::super::domain::CriterionKey;
use super::Report;

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("json export failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("export produced invalid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Converts a report into a string for download or display.
pub trait ReportFormatter<K> {
    fn content_type(&self) -> &'static str;
    fn format(&self, report: &Report<K>) -> Result<String, FormatError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReportFormatter;

impl<K: CriterionKey> ReportFormatter<K> for JsonReportFormatter {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn format(&self, report: &Report<K>) -> Result<String, FormatError> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}

/// One row per stage-1 criterion, weakest-link rank filled when flagged.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvReportFormatter;

impl<K: CriterionKey> ReportFormatter<K> for CsvReportFormatter {
    fn content_type(&self) -> &'static str {
        "text/csv"
    }

    fn format(&self, report: &Report<K>) -> Result<String, FormatError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record([
            "criterion",
            "name",
            "impact_tier",
            "raw_score",
            "tier_weight",
            "base_weight",
            "weighted_score",
            "priority",
            "severity",
            "weakest_link_rank",
        ])?;

        for result in &report.scores {
            let rank = report
                .weakest_links
                .iter()
                .find(|entry| entry.link.key() == result.key)
                .map(|entry| entry.link.rank.to_string())
                .unwrap_or_default();
            writer.write_record([
                result.key.slug().to_string(),
                result.name.clone(),
                result.impact_tier.label().to_string(),
                format!("{:.1}", result.raw_score),
                format!("{:.2}", result.tier_weight),
                format!("{:.2}", result.base_weight),
                format!("{:.2}", result.weighted_score),
                result.priority.label().to_string(),
                result.severity.label().to_string(),
                rank,
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|err| csv::Error::from(err.into_error()))?;
        Ok(String::from_utf8(bytes)?)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextReportFormatter;

impl<K: CriterionKey> ReportFormatter<K> for TextReportFormatter {
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn format(&self, report: &Report<K>) -> Result<String, FormatError> {
        // fmt::Write into a String cannot fail
        let mut out = String::new();
        let _ = writeln!(out, "Assessment report ({})", report.generated_at.to_rfc3339());

        let _ = writeln!(out, "\nOverview");
        for result in report.overview() {
            let _ = writeln!(
                out,
                "  {:<48} raw {:>4.1}  weighted {:>5.2}  {}",
                result.name,
                result.raw_score,
                result.weighted_score,
                result.priority.label()
            );
        }

        if report.weakest_links.is_empty() {
            let _ = writeln!(out, "\nNo weakest links identified.");
        } else {
            let _ = writeln!(out, "\nWeakest links");
            for entry in &report.weakest_links {
                let _ = writeln!(
                    out,
                    "  {}. {} (weighted {:.2}, severity {})",
                    entry.link.rank,
                    entry.link.result.name,
                    entry.link.result.weighted_score,
                    entry.strategies.severity.label()
                );
                for step in &entry.strategies.immediate {
                    let _ = writeln!(out, "     - {step}");
                }
            }
        }

        let weak_areas: Vec<_> = report.domain_weak_areas().collect();
        if !weak_areas.is_empty() {
            let _ = writeln!(out, "\nDomain weak areas");
            for area in weak_areas {
                let _ = writeln!(
                    out,
                    "  {} / {}: {:.2}",
                    area.domain_name,
                    area.criterion.slug(),
                    area.score
                );
            }
        }
        if report.spillover.detected {
            let _ = writeln!(
                out,
                "\nStrain spills across domains: {}",
                report.spillover.weak_domains.join(", ")
            );
        }

        if !report.insights.points.is_empty() {
            let _ = writeln!(out, "\nInsights");
            for insight in &report.insights.points {
                let _ = writeln!(out, "  {}. {}", insight.rank, insight.text);
            }
        }

        if !report.modules.is_empty() {
            let _ = writeln!(out, "\nAnalysis modules");
            for module in &report.modules {
                let _ = writeln!(out, "  {} [{}]", module.title, module.status.label());
                if let Some(conclusion) = &module.conclusion {
                    let _ = writeln!(out, "     {conclusion}");
                }
            }
        }

        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
    Text,
}

impl ReportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
            Self::Text => "text/plain; charset=utf-8",
        }
    }

    pub fn render<K: CriterionKey>(self, report: &Report<K>) -> Result<String, FormatError> {
        match self {
            Self::Json => JsonReportFormatter.format(report),
            Self::Csv => CsvReportFormatter.format(report),
            Self::Text => TextReportFormatter.format(report),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "text" | "txt" => Ok(Self::Text),
            other => Err(format!("unknown report format '{other}'")),
        }
    }
}
