//! Experience Credibility — trust signals minus inflation signals, clamped.
//! Trust accrues from plausible quantified metrics, a dated experience
//! history, and verifiable credential mentions; inflation subtracts for
//! implausible metrics, superlative language, and senior titles unsupported
//! by tenure. A resume offering nothing verifiable earns no trust and
//! scores zero here.

use crate::config::EngineConfig;
use crate::evaluators::{clamp_score, Evaluator};
use crate::models::facts::NormalizedFacts;
use crate::models::report::{DimensionId, EvaluatorResult, Finding, FindingKind, Severity};
use crate::models::target::JobTarget;
use crate::reference::{contains_word, ReferenceData};

/// Trust earned per plausible quantified metric, as percent of max.
const METRIC_TRUST_PCT: i64 = 25;
/// Metric-derived trust is capped here; more numbers stop adding trust.
const METRIC_TRUST_CAP_PCT: i64 = 50;
/// Trust for a dated experience timeline backing the claims.
const TENURE_TRUST_PCT: i64 = 25;
/// Trust for verifiable credential mentions (degrees, certifications).
const CREDENTIAL_TRUST_PCT: i64 = 25;

/// Penalties as percent of max score.
const IMPLAUSIBLE_METRIC_PENALTY_PCT: i64 = 30;
const INFLATED_LANGUAGE_PENALTY_PCT: i64 = 20;
const TITLE_INFLATION_PENALTY_PCT: i64 = 30;

/// Senior-ladder rank that needs tenure behind it.
const SENIOR_RANK: u8 = 4;
/// Months of total experience below which a senior title reads inflated.
const SENIOR_TENURE_MONTHS: f64 = 36.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricKind {
    Percent,
    Multiplier,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metric {
    pub value: f64,
    pub kind: MetricKind,
}

/// Extracts "N%" and "Nx" style metrics from a bullet. Commas in digit
/// groups are tolerated ("1,200%").
pub fn parse_metrics(text: &str) -> Vec<Metric> {
    let mut metrics = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        let mut digits = String::new();
        while i < chars.len()
            && (chars[i].is_ascii_digit() || chars[i] == ',' || chars[i] == '.')
        {
            if chars[i] != ',' {
                digits.push(chars[i]);
            }
            i += 1;
        }
        // digit run must not be glued to a word on the left
        if start > 0 && chars[start - 1].is_alphanumeric() {
            continue;
        }
        let Ok(value) = digits.trim_end_matches('.').parse::<f64>() else {
            continue;
        };
        match chars.get(i) {
            Some('%') => metrics.push(Metric {
                value,
                kind: MetricKind::Percent,
            }),
            Some('x') | Some('X')
                if !chars
                    .get(i + 1)
                    .is_some_and(|c| c.is_alphanumeric()) =>
            {
                metrics.push(Metric {
                    value,
                    kind: MetricKind::Multiplier,
                })
            }
            _ => {}
        }
    }
    metrics
}

pub struct ExperienceCredibility;

impl Evaluator for ExperienceCredibility {
    fn dimension(&self) -> DimensionId {
        DimensionId::ExperienceCredibility
    }

    fn evaluate(
        &self,
        facts: &NormalizedFacts,
        _target: Option<&JobTarget>,
        reference: &ReferenceData,
        config: &EngineConfig,
    ) -> EvaluatorResult {
        let max = config.weights.credibility;

        if facts.is_empty() {
            return EvaluatorResult {
                dimension: self.dimension(),
                score: 0,
                max_score: max,
                applicable: true,
                assessment: None,
                findings: vec![Finding::new(
                    Severity::Critical,
                    FindingKind::NoExtractableSections,
                    "no content to assess credibility against",
                    None,
                )],
            };
        }

        let limits = reference.metric_limits;
        let mut findings = Vec::new();
        let mut penalty: i64 = 0;
        let mut plausible_metrics: i64 = 0;

        for bullet in &facts.bullets {
            for metric in parse_metrics(&bullet.text) {
                let implausible = match metric.kind {
                    MetricKind::Percent => metric.value > limits.max_percent,
                    MetricKind::Multiplier => metric.value > limits.max_multiplier,
                };
                if implausible {
                    penalty += i64::from(max) * IMPLAUSIBLE_METRIC_PENALTY_PCT / 100;
                    findings.push(Finding::new(
                        Severity::Critical,
                        FindingKind::ImplausibleMetric,
                        format!(
                            "metric {}{} is outside the plausible range",
                            metric.value,
                            match metric.kind {
                                MetricKind::Percent => "%",
                                MetricKind::Multiplier => "x",
                            }
                        ),
                        Some(bullet.evidence()),
                    ));
                } else {
                    plausible_metrics += 1;
                }
            }

            let lower = bullet.text.to_lowercase();
            if let Some(marker) = reference
                .inflation_markers
                .iter()
                .find(|m| contains_word(&lower, m))
            {
                penalty += i64::from(max) * INFLATED_LANGUAGE_PENALTY_PCT / 100;
                findings.push(Finding::new(
                    Severity::Warning,
                    FindingKind::InflatedLanguage,
                    format!("superlative '{marker}' without verifiable backing"),
                    Some(bullet.evidence()),
                ));
            }
        }

        // Trust must be earned; nothing verifiable means nothing to subtract
        // inflation from.
        let mut trust = (plausible_metrics * METRIC_TRUST_PCT).min(METRIC_TRUST_CAP_PCT);
        if plausible_metrics == 0 {
            findings.push(Finding::new(
                Severity::Info,
                FindingKind::UnquantifiedBullet,
                "no plausible quantified metrics back the resume's claims",
                None,
            ));
        }
        if facts.experience_spans().next().is_some() && facts.total_years_experience > 0.0 {
            trust += TENURE_TRUST_PCT;
        }
        if !facts.credential_tokens.is_empty() {
            trust += CREDENTIAL_TRUST_PCT;
        }

        let top_rank = facts
            .experience_spans()
            .filter_map(|s| s.seniority_rank)
            .max()
            .unwrap_or(0);
        if top_rank >= SENIOR_RANK
            && facts.total_years_experience * 12.0 < SENIOR_TENURE_MONTHS
        {
            penalty += i64::from(max) * TITLE_INFLATION_PENALTY_PCT / 100;
            findings.push(Finding::new(
                Severity::Warning,
                FindingKind::TitleInflation,
                format!(
                    "senior-level title held with only {:.1} years of total experience",
                    facts.total_years_experience
                ),
                None,
            ));
        }

        EvaluatorResult {
            dimension: self.dimension(),
            score: clamp_score(i64::from(max) * trust / 100 - penalty, max),
            max_score: max,
            applicable: true,
            assessment: None,
            findings,
        }
    }
}
