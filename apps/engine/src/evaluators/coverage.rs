//! Requirement Coverage — binary presence check of the target's required
//! skills and credentials against the detected fact tokens. Absent
//! requirements are critical findings. Disabled entirely without a job
//! target: it reports itself not applicable rather than inventing a score.

use crate::config::EngineConfig;
use crate::evaluators::Evaluator;
use crate::models::facts::NormalizedFacts;
use crate::models::report::{DimensionId, EvaluatorResult, Finding, FindingKind, Severity};
use crate::models::target::JobTarget;
use crate::reference::ReferenceData;

pub struct RequirementCoverage;

impl Evaluator for RequirementCoverage {
    fn dimension(&self) -> DimensionId {
        DimensionId::RequirementCoverage
    }

    fn evaluate(
        &self,
        facts: &NormalizedFacts,
        target: Option<&JobTarget>,
        reference: &ReferenceData,
        config: &EngineConfig,
    ) -> EvaluatorResult {
        let max = config.weights.coverage;
        let Some(target) = target else {
            return EvaluatorResult::not_applicable(
                self.dimension(),
                max,
                "no job target supplied; requirement coverage not assessed",
            );
        };

        let mut findings = Vec::new();
        let mut total = 0u32;
        let mut present = 0u32;

        for raw_skill in &target.required_skills {
            total += 1;
            let canonical = reference.canonicalize_skill(raw_skill);
            if facts.skill_tokens.contains(&canonical) {
                present += 1;
            } else {
                findings.push(Finding::new(
                    Severity::Critical,
                    FindingKind::MissingRequiredSkill,
                    format!("required skill '{raw_skill}' not found anywhere in the resume"),
                    None,
                ));
            }
        }

        for raw_credential in &target.required_credentials {
            total += 1;
            let wanted = raw_credential.trim().to_lowercase();
            let covered = facts
                .credential_tokens
                .iter()
                .any(|t| t.contains(&wanted) || wanted.contains(t.as_str()));
            if covered {
                present += 1;
            } else {
                findings.push(Finding::new(
                    Severity::Critical,
                    FindingKind::MissingRequiredCredential,
                    format!("required credential '{raw_credential}' not found in the resume"),
                    None,
                ));
            }
        }

        if total == 0 {
            return EvaluatorResult {
                dimension: self.dimension(),
                score: max,
                max_score: max,
                applicable: true,
                assessment: None,
                findings: vec![Finding::new(
                    Severity::Info,
                    FindingKind::NotApplicable,
                    "the job target lists no explicit skill or credential requirements",
                    None,
                )],
            };
        }

        // rounded fraction of requirements covered
        let score = (max * present + total / 2) / total;

        EvaluatorResult {
            dimension: self.dimension(),
            score,
            max_score: max,
            applicable: true,
            assessment: None,
            findings,
        }
    }
}
