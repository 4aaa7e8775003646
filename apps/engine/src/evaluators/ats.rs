//! ATS Parseability — can an applicant tracking system segment this resume
//! at all? Penalizes missing standard headers, layout hazards, and absent
//! contact info. This is the gating dimension: the aggregator demotes every
//! other score to informational when this one falls below the gate ratio.

use crate::config::EngineConfig;
use crate::evaluators::{clamp_score, Evaluator};
use crate::models::facts::{EvidenceRef, NormalizedFacts};
use crate::models::report::{DimensionId, EvaluatorResult, Finding, FindingKind, Severity};
use crate::models::target::JobTarget;
use crate::reference::ReferenceData;

/// Penalties as percent of max score.
const MISSING_HEADER_PENALTY_PCT: i64 = 25;
const LAYOUT_RISK_PENALTY_PCT: i64 = 20;
const MISSING_CONTACT_PENALTY_PCT: i64 = 10;

pub struct AtsParseability;

impl Evaluator for AtsParseability {
    fn dimension(&self) -> DimensionId {
        DimensionId::AtsParseability
    }

    fn evaluate(
        &self,
        facts: &NormalizedFacts,
        _target: Option<&JobTarget>,
        reference: &ReferenceData,
        config: &EngineConfig,
    ) -> EvaluatorResult {
        let max = config.weights.ats;
        // Extraction-time findings (malformed dates, nothing extractable)
        // surface through this dimension.
        let mut findings = facts.extraction_findings.clone();

        if facts.is_empty() {
            return EvaluatorResult {
                dimension: self.dimension(),
                score: 0,
                max_score: max,
                applicable: true,
                assessment: None,
                findings,
            };
        }

        let mut penalty: i64 = 0;

        for spec in reference.standard_headers.iter().filter(|s| s.expected) {
            if !facts.headers_present.contains(&spec.label) {
                penalty += i64::from(max) * MISSING_HEADER_PENALTY_PCT / 100;
                findings.push(Finding::new(
                    Severity::Warning,
                    FindingKind::MissingSectionHeader,
                    format!("no '{}' section header found", spec.label),
                    Some(EvidenceRef::Section {
                        name: spec.label.clone(),
                    }),
                ));
            }
        }

        for risk in &facts.layout_risks {
            penalty += i64::from(max) * LAYOUT_RISK_PENALTY_PCT / 100;
            findings.push(Finding::new(
                Severity::Warning,
                FindingKind::LayoutRisk,
                format!("layout risk: {}", risk.describe()),
                Some(EvidenceRef::Document),
            ));
        }

        if !facts.has_contact {
            penalty += i64::from(max) * MISSING_CONTACT_PENALTY_PCT / 100;
            findings.push(Finding::new(
                Severity::Warning,
                FindingKind::MissingContact,
                "no email address or phone number detected",
                Some(EvidenceRef::Document),
            ));
        }

        EvaluatorResult {
            dimension: self.dimension(),
            score: clamp_score(i64::from(max) - penalty, max),
            max_score: max,
            applicable: true,
            assessment: None,
            findings,
        }
    }
}
