use serde::Serialize;

use super::super::catalog::AnalysisModule;
use super::super::domain::{CriterionKey, CriterionResult};

const URGENT_CEILING: f64 = 4.0;
const WATCH_CEILING: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    Strong,
    Watch,
    Urgent,
    Unscored,
}

impl ModuleStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Strong => "Strong",
            Self::Watch => "Watch",
            Self::Urgent => "Urgent",
            Self::Unscored => "Unscored",
        }
    }

    fn from_score(score: Option<f64>) -> Self {
        match score {
            None => Self::Unscored,
            Some(score) if score <= URGENT_CEILING => Self::Urgent,
            Some(score) if score <= WATCH_CEILING => Self::Watch,
            Some(_) => Self::Strong,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleReadout<K> {
    pub id: String,
    pub title: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub status: ModuleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,
    pub criteria: Vec<K>,
}

impl<K: CriterionKey> ModuleReadout<K> {
    /// Mean raw stage-1 score over the module's criteria that were scored.
    pub fn evaluate(module: &AnalysisModule<K>, scores: &[CriterionResult<K>]) -> Self {
        let raw: Vec<f64> = module
            .criteria
            .iter()
            .filter_map(|key| scores.iter().find(|result| result.key == *key))
            .map(|result| result.raw_score)
            .collect();
        let score = if raw.is_empty() {
            None
        } else {
            Some(raw.iter().sum::<f64>() / raw.len() as f64)
        };
        let status = ModuleStatus::from_score(score);
        let conclusion = match status {
            ModuleStatus::Strong => Some(module.conclusions.strong.clone()),
            ModuleStatus::Watch => Some(module.conclusions.watch.clone()),
            ModuleStatus::Urgent => Some(module.conclusions.urgent.clone()),
            ModuleStatus::Unscored => None,
        };

        Self {
            id: module.id.clone(),
            title: module.title.clone(),
            summary: module.summary.clone(),
            score,
            status,
            conclusion,
            criteria: module.criteria.clone(),
        }
    }
}
