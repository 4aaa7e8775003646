//! Content Signal Strength — how many bullets carry a quantified outcome, a
//! strong opening verb, and scope context. Quantification gates the whole
//! dimension: a resume where no bullet contains a number scores zero here no
//! matter how strong the verbs read.

use crate::config::EngineConfig;
use crate::evaluators::{clamp_score, Evaluator};
use crate::models::facts::NormalizedFacts;
use crate::models::report::{DimensionId, EvaluatorResult, Finding, FindingKind, Severity};
use crate::models::target::JobTarget;
use crate::reference::ReferenceData;

/// Criterion blend once the quantification gate passes.
const NUMBER_WEIGHT: f64 = 0.5;
const VERB_WEIGHT: f64 = 0.3;
const SCOPE_WEIGHT: f64 = 0.2;

/// At most this many per-bullet findings per criterion, to keep reports
/// readable on long resumes.
const MAX_FINDINGS_PER_KIND: usize = 5;

pub struct ContentSignal;

impl Evaluator for ContentSignal {
    fn dimension(&self) -> DimensionId {
        DimensionId::ContentSignal
    }

    fn evaluate(
        &self,
        facts: &NormalizedFacts,
        _target: Option<&JobTarget>,
        _reference: &ReferenceData,
        config: &EngineConfig,
    ) -> EvaluatorResult {
        let max = config.weights.content;

        if facts.bullets.is_empty() {
            return EvaluatorResult {
                dimension: self.dimension(),
                score: 0,
                max_score: max,
                applicable: true,
                assessment: None,
                findings: vec![Finding::new(
                    Severity::Critical,
                    FindingKind::NoExtractableSections,
                    "no bullet content found to assess",
                    None,
                )],
            };
        }

        let total = facts.bullets.len() as f64;
        let with_number = facts.bullets.iter().filter(|b| b.has_number).count();
        let with_verb = facts.bullets.iter().filter(|b| b.has_action_verb).count();
        let with_scope = facts.bullets.iter().filter(|b| b.has_scope_marker).count();

        let mut findings = Vec::new();
        collect_bullet_findings(
            facts,
            &mut findings,
            |b| !b.has_number,
            Severity::Warning,
            FindingKind::UnquantifiedBullet,
            "bullet has no quantified outcome",
        );
        collect_bullet_findings(
            facts,
            &mut findings,
            |b| !b.has_action_verb,
            Severity::Warning,
            FindingKind::WeakOpeningVerb,
            "bullet does not open with a recognized action verb",
        );
        collect_bullet_findings(
            facts,
            &mut findings,
            |b| !b.has_scope_marker,
            Severity::Info,
            FindingKind::MissingScopeContext,
            "bullet gives no scope context (team size, users, reach)",
        );

        // Quantification gate: no numbers anywhere means no credible signal.
        if with_number == 0 {
            findings.push(Finding::new(
                Severity::Critical,
                FindingKind::UnquantifiedBullet,
                "no bullet in the resume contains a quantified outcome",
                None,
            ));
            return EvaluatorResult {
                dimension: self.dimension(),
                score: 0,
                max_score: max,
                applicable: true,
                assessment: None,
                findings,
            };
        }

        // Deliberately a blend of the three per-criterion fractions, not the
        // fraction of bullets passing all three at once: a quantified,
        // verb-led bullet that merely lacks a scope word still moves the
        // score up.
        let blended = NUMBER_WEIGHT * (with_number as f64 / total)
            + VERB_WEIGHT * (with_verb as f64 / total)
            + SCOPE_WEIGHT * (with_scope as f64 / total);
        let score = clamp_score((f64::from(max) * blended).round() as i64, max);

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

fn collect_bullet_findings(
    facts: &NormalizedFacts,
    findings: &mut Vec<Finding>,
    fails: impl Fn(&crate::models::facts::BulletFact) -> bool,
    severity: Severity,
    kind: FindingKind,
    message: &str,
) {
    for bullet in facts.bullets.iter().filter(|b| fails(b)).take(MAX_FINDINGS_PER_KIND) {
        findings.push(Finding::new(
            severity,
            kind,
            message,
            Some(bullet.evidence()),
        ));
    }
}
