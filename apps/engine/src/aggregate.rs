//! Aggregator — merges the seven evaluator results into one
//! `AnalysisResult`: applies the ATS gate, computes the weighted overall
//! score, maps it to a status band, and runs the failure-cause breakdown
//! (the one step that deliberately depends on every other evaluator's
//! output, which is why it lives here and not in an evaluator).

use chrono::NaiveDate;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::errors::EngineError;
use crate::models::report::{
    AnalysisResult, DimensionId, EvaluatorResult, FailureCause, FindingKind, FixSuggestion,
    Severity, StatusBand,
};
use crate::reference::ReferenceData;

pub fn aggregate(
    results: Vec<EvaluatorResult>,
    config: &EngineConfig,
    reference: &ReferenceData,
    id: Uuid,
    generated_on: NaiveDate,
) -> Result<AnalysisResult, EngineError> {
    check_invariants(&results)?;

    let ats = results
        .iter()
        .find(|r| r.dimension == DimensionId::AtsParseability)
        .ok_or_else(|| EngineError::Invariant("ATS result missing after check".into()))?;

    // ATS gate: below the threshold, nothing else counts numerically.
    let ats_gated =
        f64::from(ats.score) < config.ats_gate_ratio * f64::from(ats.max_score);

    let overall_score = if ats_gated {
        normalized(ats.score, ats.max_score)
    } else {
        let applicable: Vec<&EvaluatorResult> =
            results.iter().filter(|r| r.applicable).collect();
        let sum_score: u32 = applicable.iter().map(|r| r.score).sum();
        let sum_max: u32 = applicable.iter().map(|r| r.max_score).sum();
        normalized(sum_score, sum_max)
    };

    let status = status_band(overall_score, config);
    let failure_causes = rank_failure_causes(&results, config);
    let suggestions = derive_suggestions(&results, config, reference)?;

    Ok(AnalysisResult {
        id,
        generated_on,
        overall_score,
        status,
        ats_gated,
        results,
        failure_causes,
        suggestions,
    })
}

/// Defensive invariant enforcement. Evaluators clamp their own scores; a
/// violation observed here is a bug in the engine, never bad input, so it is
/// surfaced as a fatal error instead of silently repaired.
fn check_invariants(results: &[EvaluatorResult]) -> Result<(), EngineError> {
    if results.len() != DimensionId::ALL.len() {
        return Err(EngineError::Invariant(format!(
            "expected {} evaluator results, got {}",
            DimensionId::ALL.len(),
            results.len()
        )));
    }
    for dimension in DimensionId::ALL {
        let count = results.iter().filter(|r| r.dimension == dimension).count();
        if count != 1 {
            return Err(EngineError::Invariant(format!(
                "dimension {dimension:?} appears {count} times"
            )));
        }
    }
    for result in results {
        if result.score > result.max_score {
            return Err(EngineError::Invariant(format!(
                "{:?} returned score {} above max {}",
                result.dimension, result.score, result.max_score
            )));
        }
    }
    Ok(())
}

fn normalized(score: u32, max: u32) -> u32 {
    if max == 0 {
        return 0;
    }
    (score * 100 + max / 2) / max
}

fn status_band(overall: u32, config: &EngineConfig) -> StatusBand {
    let bands = config.bands;
    if overall < bands.weak_from {
        StatusBand::Critical
    } else if overall < bands.moderate_from {
        StatusBand::Weak
    } else if overall < bands.strong_from {
        StatusBand::Moderate
    } else {
        StatusBand::Strong
    }
}

/// Failure Cause Breakdown: every warning-or-worse finding across all
/// evaluators (gated ones included — they stay visible even when excluded
/// from the number), sorted by severity, then evaluator weight, truncated to
/// the configured top N.
fn rank_failure_causes(results: &[EvaluatorResult], config: &EngineConfig) -> Vec<FailureCause> {
    let mut entries: Vec<(Severity, u32, DimensionId, usize, &crate::models::report::Finding)> =
        Vec::new();
    for result in results {
        let weight = config.weights.for_dimension(result.dimension);
        for (i, finding) in result.findings.iter().enumerate() {
            if finding.severity >= Severity::Warning {
                entries.push((finding.severity, weight, result.dimension, i, finding));
            }
        }
    }
    // severity desc, weight desc; dimension + original position keep the
    // ordering fully deterministic
    entries.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then(b.1.cmp(&a.1))
            .then(a.2.cmp(&b.2))
            .then(a.3.cmp(&b.3))
    });

    entries
        .into_iter()
        .take(config.top_failure_causes)
        .enumerate()
        .map(|(rank, (severity, _, dimension, _, finding))| FailureCause {
            rank: rank + 1,
            dimension,
            severity,
            message: finding.message.clone(),
            evidence: finding.evidence.clone(),
        })
        .collect()
}

/// One templated suggestion per distinct finding kind seen at warning or
/// critical severity, ranked by impact (the raising evaluator's weight) then
/// effort (reference-data lookup, easiest first).
fn derive_suggestions(
    results: &[EvaluatorResult],
    config: &EngineConfig,
    reference: &ReferenceData,
) -> Result<Vec<FixSuggestion>, EngineError> {
    let mut by_kind: Vec<(FindingKind, DimensionId, u32)> = Vec::new();
    for result in results {
        let weight = config.weights.for_dimension(result.dimension);
        for finding in &result.findings {
            if finding.severity < Severity::Warning {
                continue;
            }
            match by_kind.iter_mut().find(|(kind, _, _)| *kind == finding.kind) {
                Some(entry) if weight > entry.2 => {
                    entry.1 = result.dimension;
                    entry.2 = weight;
                }
                Some(_) => {}
                None => by_kind.push((finding.kind, result.dimension, weight)),
            }
        }
    }

    let mut suggestions = Vec::with_capacity(by_kind.len());
    for (kind, dimension, impact) in by_kind {
        let template = reference.suggestion_for(kind).ok_or_else(|| {
            EngineError::Invariant(format!("no suggestion template for {kind:?}"))
        })?;
        suggestions.push(FixSuggestion {
            rank: 0,
            kind,
            dimension,
            suggestion: template.text.clone(),
            impact,
            effort: template.effort,
        });
    }

    suggestions.sort_by(|a, b| {
        b.impact
            .cmp(&a.impact)
            .then(a.effort.cmp(&b.effort))
            .then(a.kind.cmp(&b.kind))
    });
    for (i, suggestion) in suggestions.iter_mut().enumerate() {
        suggestion.rank = i + 1;
    }
    Ok(suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::Finding;

    fn result(
        dimension: DimensionId,
        score: u32,
        max_score: u32,
        applicable: bool,
        findings: Vec<Finding>,
    ) -> EvaluatorResult {
        EvaluatorResult {
            dimension,
            score,
            max_score,
            applicable,
            assessment: None,
            findings,
        }
    }

    fn full_set(ats_score: u32) -> Vec<EvaluatorResult> {
        let config = EngineConfig::default();
        DimensionId::ALL
            .iter()
            .map(|d| {
                let max = config.weights.for_dimension(*d);
                let score = if *d == DimensionId::AtsParseability {
                    ats_score
                } else {
                    max
                };
                result(*d, score, max, true, vec![])
            })
            .collect()
    }

    fn run(results: Vec<EvaluatorResult>) -> Result<AnalysisResult, EngineError> {
        aggregate(
            results,
            &EngineConfig::default(),
            &ReferenceData::default(),
            Uuid::nil(),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        )
    }

    #[test]
    fn test_perfect_scores_are_strong_100() {
        let config = EngineConfig::default();
        let ats_max = config.weights.ats;
        let r = run(full_set(ats_max)).unwrap();
        assert_eq!(r.overall_score, 100);
        assert_eq!(r.status, StatusBand::Strong);
        assert!(!r.ats_gated);
    }

    #[test]
    fn test_ats_gate_caps_overall_at_ats_score() {
        // ATS at half its max is below the 0.75 gate; everything else is
        // perfect but must not count
        let config = EngineConfig::default();
        let ats_max = config.weights.ats;
        let r = run(full_set(ats_max / 2)).unwrap();
        assert!(r.ats_gated);
        assert_eq!(r.overall_score, 50);
        assert_eq!(r.status, StatusBand::Weak);
    }

    #[test]
    fn test_gate_boundary_exactly_at_threshold_passes() {
        let config = EngineConfig::default();
        let ats_max = config.weights.ats; // 20 → threshold 15
        let r = run(full_set(ats_max * 3 / 4)).unwrap();
        assert!(!r.ats_gated);
    }

    #[test]
    fn test_non_applicable_results_excluded_from_overall() {
        let config = EngineConfig::default();
        let mut results = full_set(config.weights.ats);
        for r in results.iter_mut() {
            if r.dimension == DimensionId::RequirementCoverage
                || r.dimension == DimensionId::MarketFit
            {
                r.applicable = false;
                r.score = 0;
            }
        }
        let r = run(results).unwrap();
        // remaining applicable evaluators are all at max → still 100
        assert_eq!(r.overall_score, 100);
    }

    #[test]
    fn test_missing_result_is_invariant_error() {
        let mut results = full_set(20);
        results.pop();
        assert!(matches!(run(results), Err(EngineError::Invariant(_))));
    }

    #[test]
    fn test_duplicate_dimension_is_invariant_error() {
        let mut results = full_set(20);
        let clone = results[0].clone();
        results[6] = clone;
        assert!(matches!(run(results), Err(EngineError::Invariant(_))));
    }

    #[test]
    fn test_out_of_range_score_is_invariant_error_not_clamped() {
        let mut results = full_set(20);
        results[2].score = results[2].max_score + 10;
        assert!(matches!(run(results), Err(EngineError::Invariant(_))));
    }

    #[test]
    fn test_failure_causes_sorted_by_severity_then_weight() {
        let config = EngineConfig::default();
        let mut results = full_set(config.weights.ats);
        // warning on the heaviest dimension (content, weight 25)
        results
            .iter_mut()
            .find(|r| r.dimension == DimensionId::ContentSignal)
            .unwrap()
            .findings
            .push(Finding::new(
                Severity::Warning,
                FindingKind::UnquantifiedBullet,
                "warning on heavy dimension",
                None,
            ));
        // critical on a light dimension (trajectory, weight 5)
        results
            .iter_mut()
            .find(|r| r.dimension == DimensionId::CareerTrajectory)
            .unwrap()
            .findings
            .push(Finding::new(
                Severity::Critical,
                FindingKind::EmptyTimeline,
                "critical on light dimension",
                None,
            ));
        let r = run(results).unwrap();
        assert_eq!(r.failure_causes.len(), 2);
        // severity beats weight
        assert_eq!(r.failure_causes[0].severity, Severity::Critical);
        assert_eq!(r.failure_causes[0].rank, 1);
        assert_eq!(r.failure_causes[1].severity, Severity::Warning);
    }

    #[test]
    fn test_failure_causes_truncated_to_top_n() {
        let config = EngineConfig::default();
        let mut results = full_set(config.weights.ats);
        for i in 0..10 {
            results[0].findings.push(Finding::new(
                Severity::Warning,
                FindingKind::MissingSectionHeader,
                format!("finding {i}"),
                None,
            ));
        }
        let r = run(results).unwrap();
        assert_eq!(r.failure_causes.len(), config.top_failure_causes);
    }

    #[test]
    fn test_suggestions_deduplicated_by_kind_and_ranked() {
        let config = EngineConfig::default();
        let mut results = full_set(config.weights.ats);
        for _ in 0..3 {
            results[0].findings.push(Finding::new(
                Severity::Warning,
                FindingKind::MissingSectionHeader,
                "missing header",
                None,
            ));
        }
        results
            .iter_mut()
            .find(|r| r.dimension == DimensionId::ContentSignal)
            .unwrap()
            .findings
            .push(Finding::new(
                Severity::Critical,
                FindingKind::UnquantifiedBullet,
                "no numbers",
                None,
            ));
        let r = run(results).unwrap();
        // one suggestion per distinct kind
        assert_eq!(r.suggestions.len(), 2);
        // content (weight 25) outranks ats (weight 20)
        assert_eq!(r.suggestions[0].kind, FindingKind::UnquantifiedBullet);
        assert_eq!(r.suggestions[0].rank, 1);
        assert_eq!(r.suggestions[0].impact, config.weights.content);
    }

    #[test]
    fn test_info_findings_never_become_causes_or_suggestions() {
        let config = EngineConfig::default();
        let mut results = full_set(config.weights.ats);
        results[0].findings.push(Finding::new(
            Severity::Info,
            FindingKind::NotApplicable,
            "informational only",
            None,
        ));
        let r = run(results).unwrap();
        assert!(r.failure_causes.is_empty());
        assert!(r.suggestions.is_empty());
    }
}
