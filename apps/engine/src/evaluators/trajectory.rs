//! Career Trajectory — direction of the role-title progression over time,
//! classified as ascending, flat, or misaligned, with a skill-accumulation
//! check on top.

use crate::config::EngineConfig;
use crate::evaluators::{clamp_score, Evaluator};
use crate::models::facts::{EvidenceRef, NormalizedFacts};
use crate::models::report::{
    Assessment, DimensionId, EvaluatorResult, Finding, FindingKind, Severity,
};
use crate::models::target::JobTarget;
use crate::reference::ReferenceData;

pub struct CareerTrajectory;

impl Evaluator for CareerTrajectory {
    fn dimension(&self) -> DimensionId {
        DimensionId::CareerTrajectory
    }

    fn evaluate(
        &self,
        facts: &NormalizedFacts,
        _target: Option<&JobTarget>,
        _reference: &ReferenceData,
        config: &EngineConfig,
    ) -> EvaluatorResult {
        let max = config.weights.trajectory;
        let spans: Vec<_> = facts.experience_spans().collect();

        if spans.is_empty() {
            return EvaluatorResult {
                dimension: self.dimension(),
                score: 0,
                max_score: max,
                applicable: true,
                assessment: None,
                findings: vec![Finding::new(
                    Severity::Critical,
                    FindingKind::EmptyTimeline,
                    "no dated experience entries; trajectory cannot be assessed",
                    None,
                )],
            };
        }

        let mut findings = Vec::new();

        if spans.len() == 1 {
            findings.push(Finding::new(
                Severity::Info,
                FindingKind::FlatProgression,
                "single role on the timeline; progression cannot be demonstrated yet",
                None,
            ));
            return EvaluatorResult {
                dimension: self.dimension(),
                score: clamp_score(i64::from(max) * 3 / 5, max),
                max_score: max,
                applicable: true,
                assessment: Some(Assessment::Flat),
                findings,
            };
        }

        // Spans arrive sorted by start date from the extractor.
        let ranks: Vec<(usize, u8)> = spans
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.seniority_rank.map(|r| (i, r)))
            .collect();

        let mut descended_at: Option<usize> = None;
        let mut ascended = false;
        let mut peak: Option<u8> = None;
        for (i, rank) in &ranks {
            if let Some(p) = peak {
                if *rank > p {
                    ascended = true;
                }
                if *rank < p {
                    descended_at = Some(*i);
                }
            }
            peak = Some(peak.map_or(*rank, |p| p.max(*rank)));
        }

        let (assessment, score) = if let Some(i) = descended_at {
            findings.push(Finding::new(
                Severity::Warning,
                FindingKind::MisalignedProgression,
                format!(
                    "role '{}' steps down the seniority ladder from an earlier peak",
                    spans[i].title
                ),
                Some(EvidenceRef::Section {
                    name: "experience".to_string(),
                }),
            ));
            (Assessment::Misaligned, i64::from(max) / 5)
        } else if ascended {
            (Assessment::Ascending, i64::from(max))
        } else {
            findings.push(Finding::new(
                Severity::Info,
                FindingKind::FlatProgression,
                "titles stay on the same ladder level across roles",
                None,
            ));
            (Assessment::Flat, i64::from(max) * 3 / 5)
        };

        // Skill accumulation: a growing career usually picks up tools.
        let first_skills = &spans[0].skills;
        let accumulates = spans[1..]
            .iter()
            .any(|s| s.skills.difference(first_skills).next().is_some());
        if !accumulates && !first_skills.is_empty() {
            findings.push(Finding::new(
                Severity::Info,
                FindingKind::FlatProgression,
                "no new skills appear in roles after the first",
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
