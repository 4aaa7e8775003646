use serde::{Deserialize, Serialize};

/// The job a resume is being scored against. Entirely optional input: when no
/// target is supplied, the target-dependent evaluators (requirement coverage,
/// market fit) report themselves as not applicable instead of scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobTarget {
    pub role_title: String,
    pub market: Option<String>,
    pub required_years: Option<f64>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub required_credentials: Vec<String>,
}

impl JobTarget {
    pub fn has_requirements(&self) -> bool {
        !self.required_skills.is_empty() || !self.required_credentials.is_empty()
    }
}
