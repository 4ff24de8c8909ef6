mod config;
mod policy;
mod rules;

pub use config::EvaluationConfig;
pub use policy::{RoutingDecision, RoutingProfile};
pub use rules::{Score, ScoreDimension, MAX_SCORE};

use serde::{Deserialize, Serialize};

use super::domain::Answers;
use policy::resolve_routing;

/// Stateless evaluator; every call re-derives from the answers alone.
#[derive(Debug, Clone, Default)]
pub struct EvaluationEngine {
    config: EvaluationConfig,
}

impl EvaluationEngine {
    pub fn new(config: EvaluationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub fn scores(&self, answers: &Answers) -> Scores {
        self.score_with_components(answers).0
    }

    pub fn routing(&self, scores: &Scores, answers: &Answers) -> RoutingDecision {
        resolve_routing(scores, answers, &self.config)
    }

    pub fn assess(&self, answers: &Answers) -> Assessment {
        let (scores, components) = self.score_with_components(answers);
        let routing = self.routing(&scores, answers);

        tracing::debug!(
            urgency = scores.urgency.value(),
            complexity = scores.complexity.value(),
            readiness = scores.readiness.value(),
            routing = ?routing,
            "intake assessed"
        );

        Assessment {
            scores,
            routing,
            components,
        }
    }

    fn score_with_components(&self, answers: &Answers) -> (Scores, Vec<ScoreComponent>) {
        let mut components = Vec::new();
        let scores = Scores {
            urgency: rules::urgency(answers, &mut components),
            complexity: rules::complexity(answers, &self.config, &mut components),
            readiness: rules::readiness(answers, &mut components),
        };
        (scores, components)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub urgency: Score,
    pub complexity: Score,
    pub readiness: Score,
}

/// Discrete contribution to a score, kept for audits and the review page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub dimension: ScoreDimension,
    pub points: u8,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub scores: Scores,
    pub routing: RoutingDecision,
    pub components: Vec<ScoreComponent>,
}
