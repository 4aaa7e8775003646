//! Report builder — projects an internal `AnalysisResult` into the
//! external `AnalysisReport` shape: category names instead of dimension
//! ids, per-category percentages, and the informational-only marker for
//! categories the ATS gate excluded from the overall number.

use crate::models::report::{AnalysisReport, AnalysisResult, CategoryReport, DimensionId};

pub fn build(result: &AnalysisResult) -> AnalysisReport {
    let categories = result
        .results
        .iter()
        .map(|r| CategoryReport {
            category: r.dimension.category_name().to_string(),
            score: r.score,
            max_score: r.max_score,
            percent: percent(r.score, r.max_score),
            applicable: r.applicable,
            informational_only: result.ats_gated
                && r.dimension != DimensionId::AtsParseability,
            assessment: r.assessment,
            findings: r.findings.clone(),
        })
        .collect();

    AnalysisReport {
        analysis_id: result.id,
        generated_on: result.generated_on,
        overall_score: result.overall_score,
        status: result.status,
        ats_gated: result.ats_gated,
        categories,
        failure_causes: result.failure_causes.clone(),
        suggestions: result.suggestions.clone(),
    }
}

fn percent(score: u32, max: u32) -> u32 {
    if max == 0 {
        return 0;
    }
    (score * 100 + max / 2) / max
}
