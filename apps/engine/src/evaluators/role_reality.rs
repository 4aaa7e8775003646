//! Role Reality Index — does the career history actually support the role
//! being claimed or targeted? Compares the demonstrated seniority slope and
//! tool depth against the target title, banding the outcome as underfit,
//! aligned, or overreaching.

use crate::config::EngineConfig;
use crate::evaluators::{clamp_score, Evaluator};
use crate::models::facts::NormalizedFacts;
use crate::models::report::{
    Assessment, DimensionId, EvaluatorResult, Finding, FindingKind, Severity,
};
use crate::models::target::JobTarget;
use crate::reference::ReferenceData;

/// Rank gap at which the banding tips out of "aligned".
const BAND_GAP: i32 = 2;
/// Default IC rank assumed when no ladder keyword matches any title.
const BASELINE_RANK: i32 = 2;
/// Senior titles with fewer detected tools than this read as thin.
const MIN_TOOLS_FOR_SENIOR: usize = 3;

pub struct RoleReality;

impl Evaluator for RoleReality {
    fn dimension(&self) -> DimensionId {
        DimensionId::RoleReality
    }

    fn evaluate(
        &self,
        facts: &NormalizedFacts,
        target: Option<&JobTarget>,
        reference: &ReferenceData,
        config: &EngineConfig,
    ) -> EvaluatorResult {
        let max = config.weights.role_reality;

        if facts.experience_spans().next().is_none() {
            return EvaluatorResult {
                dimension: self.dimension(),
                score: 0,
                max_score: max,
                applicable: true,
                assessment: None,
                findings: vec![Finding::new(
                    Severity::Critical,
                    FindingKind::EmptyTimeline,
                    "no dated experience entries; role reality cannot be assessed",
                    None,
                )],
            };
        }

        let achieved = facts
            .experience_spans()
            .filter_map(|s| s.seniority_rank)
            .map(i32::from)
            .max()
            .unwrap_or(BASELINE_RANK);

        let mut findings = Vec::new();
        let expected = match target {
            Some(t) => reference
                .seniority_rank_of(&t.role_title)
                .map(i32::from)
                .unwrap_or(BASELINE_RANK),
            None => {
                findings.push(Finding::new(
                    Severity::Info,
                    FindingKind::NotApplicable,
                    "no job target supplied; assessed against resume-internal signals only",
                    None,
                ));
                achieved
            }
        };

        let gap = achieved - expected;
        let (assessment, mut score) = if gap <= -BAND_GAP {
            findings.push(Finding::new(
                Severity::Warning,
                FindingKind::SeniorityUnderfit,
                format!(
                    "target role reads {} ladder levels above the demonstrated history",
                    -gap
                ),
                None,
            ));
            (Assessment::Underfit, i64::from(max) / 3)
        } else if gap >= BAND_GAP {
            findings.push(Finding::new(
                Severity::Warning,
                FindingKind::SeniorityOverreach,
                format!(
                    "demonstrated titles sit {gap} ladder levels above the target role"
                ),
                None,
            ));
            (Assessment::Overreaching, i64::from(max) / 2)
        } else {
            (Assessment::Aligned, i64::from(max))
        };

        // Years requirement scales the aligned score down proportionally.
        if assessment == Assessment::Aligned {
            if let Some(required) = target.and_then(|t| t.required_years) {
                if required > 0.0 && facts.total_years_experience < required {
                    let ratio = (facts.total_years_experience / required).clamp(0.0, 1.0);
                    score = (score as f64 * ratio).round() as i64;
                    findings.push(Finding::new(
                        Severity::Warning,
                        FindingKind::InsufficientYears,
                        format!(
                            "{:.1} years of experience against {required:.0} required",
                            facts.total_years_experience
                        ),
                        None,
                    ));
                }
            }
        }

        // Tool depth: senior claims with almost no detectable tooling.
        if achieved >= 3 && facts.skill_tokens.len() < MIN_TOOLS_FOR_SENIOR {
            score -= i64::from(max) / 4;
            findings.push(Finding::new(
                Severity::Warning,
                FindingKind::TitleInflation,
                "senior title with very little detectable tool depth",
                None,
            ));
        }

        EvaluatorResult {
            dimension: self.dimension(),
            score: clamp_score(score, max),
            max_score: max,
            applicable: true,
            assessment: Some(assessment),
            findings,
        }
    }
}
