//! Result and report data models shared across evaluators, the aggregator,
//! and the report builder.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::facts::EvidenceRef;

/// Finding severity. Ordering matters: failure causes sort by severity
/// descending, so `Critical` must compare greatest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// The eight advertised analysis dimensions. Failure-cause breakdown is the
/// aggregator's dependent step, not an independent scorer, so it has no id
/// here.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DimensionId {
    AtsParseability,
    RequirementCoverage,
    ContentSignal,
    RoleReality,
    MarketFit,
    ExperienceCredibility,
    CareerTrajectory,
}

impl DimensionId {
    pub const ALL: [DimensionId; 7] = [
        DimensionId::AtsParseability,
        DimensionId::RequirementCoverage,
        DimensionId::ContentSignal,
        DimensionId::RoleReality,
        DimensionId::MarketFit,
        DimensionId::ExperienceCredibility,
        DimensionId::CareerTrajectory,
    ];

    /// External-facing category name, matching the product copy.
    pub fn category_name(&self) -> &'static str {
        match self {
            DimensionId::AtsParseability => "ATS Parseability",
            DimensionId::RequirementCoverage => "Requirement Coverage",
            DimensionId::ContentSignal => "Content Signal Strength",
            DimensionId::RoleReality => "Role Reality Index",
            DimensionId::MarketFit => "Market Fit",
            DimensionId::ExperienceCredibility => "Experience Credibility",
            DimensionId::CareerTrajectory => "Career Trajectory",
        }
    }
}

/// Machine-readable finding kinds. Each kind keys into the suggestion
/// template table in reference data, so adding a kind means adding a
/// template.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    NoExtractableSections,
    MissingSectionHeader,
    LayoutRisk,
    MissingContact,
    InvalidDateRange,
    MissingRequiredSkill,
    MissingRequiredCredential,
    UnquantifiedBullet,
    WeakOpeningVerb,
    MissingScopeContext,
    SeniorityUnderfit,
    SeniorityOverreach,
    InsufficientYears,
    LowMarketOverlap,
    ImplausibleMetric,
    InflatedLanguage,
    TitleInflation,
    FlatProgression,
    MisalignedProgression,
    EmptyTimeline,
    NotApplicable,
}

impl FindingKind {
    pub const ALL: [FindingKind; 21] = [
        FindingKind::NoExtractableSections,
        FindingKind::MissingSectionHeader,
        FindingKind::LayoutRisk,
        FindingKind::MissingContact,
        FindingKind::InvalidDateRange,
        FindingKind::MissingRequiredSkill,
        FindingKind::MissingRequiredCredential,
        FindingKind::UnquantifiedBullet,
        FindingKind::WeakOpeningVerb,
        FindingKind::MissingScopeContext,
        FindingKind::SeniorityUnderfit,
        FindingKind::SeniorityOverreach,
        FindingKind::InsufficientYears,
        FindingKind::LowMarketOverlap,
        FindingKind::ImplausibleMetric,
        FindingKind::InflatedLanguage,
        FindingKind::TitleInflation,
        FindingKind::FlatProgression,
        FindingKind::MisalignedProgression,
        FindingKind::EmptyTimeline,
        FindingKind::NotApplicable,
    ];
}

/// One explainable observation tied back to concrete input where any exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub kind: FindingKind,
    pub message: String,
    pub evidence: Option<EvidenceRef>,
}

impl Finding {
    pub fn new(
        severity: Severity,
        kind: FindingKind,
        message: impl Into<String>,
        evidence: Option<EvidenceRef>,
    ) -> Self {
        Finding {
            severity,
            kind,
            message: message.into(),
            evidence,
        }
    }
}

/// Banded assessment for the dimensions whose output is a classification as
/// well as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assessment {
    // Role reality
    Underfit,
    Aligned,
    Overreaching,
    // Market fit terciles
    BottomThird,
    MiddleThird,
    TopThird,
    // Career trajectory
    Ascending,
    Flat,
    Misaligned,
}

/// What one evaluator returns. Scores are already clamped to
/// `[0, max_score]` by the evaluator itself; the aggregator checks but never
/// repairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorResult {
    pub dimension: DimensionId,
    pub score: u32,
    pub max_score: u32,
    /// False when the evaluator could not run (e.g. no job target). Not
    /// counted in the overall score.
    pub applicable: bool,
    pub assessment: Option<Assessment>,
    pub findings: Vec<Finding>,
}

impl EvaluatorResult {
    /// A neutral, never-scored result for an evaluator that cannot run.
    pub fn not_applicable(dimension: DimensionId, max_score: u32, reason: &str) -> Self {
        EvaluatorResult {
            dimension,
            score: 0,
            max_score,
            applicable: false,
            assessment: None,
            findings: vec![Finding::new(
                Severity::Info,
                FindingKind::NotApplicable,
                reason,
                None,
            )],
        }
    }
}

/// Overall status band. Thresholds live in `EngineConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBand {
    Critical,
    Weak,
    Moderate,
    Strong,
}

/// One ranked failure cause, produced by the aggregator's dependent
/// breakdown step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureCause {
    pub rank: usize,
    pub dimension: DimensionId,
    pub severity: Severity,
    pub message: String,
    pub evidence: Option<EvidenceRef>,
}

/// One templated fix suggestion, ranked by impact (evaluator weight) then
/// effort (reference-data lookup, lower is easier).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixSuggestion {
    pub rank: usize,
    pub kind: FindingKind,
    pub dimension: DimensionId,
    pub suggestion: String,
    pub impact: u32,
    pub effort: u32,
}

/// The complete, immutable outcome of one engine run. Re-running produces a
/// new value; nothing here is ever mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Deterministic id derived from the input, so identical inputs yield
    /// identical results byte for byte.
    pub id: Uuid,
    pub generated_on: NaiveDate,
    pub overall_score: u32,
    pub status: StatusBand,
    /// True when the ATS gate fired and capped the overall score.
    pub ats_gated: bool,
    pub results: Vec<EvaluatorResult>,
    pub failure_causes: Vec<FailureCause>,
    pub suggestions: Vec<FixSuggestion>,
}

/// External-facing per-category view inside an `AnalysisReport`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub category: String,
    pub score: u32,
    pub max_score: u32,
    /// Integer percentage of `max_score`, 0 when not applicable.
    pub percent: u32,
    pub applicable: bool,
    /// True when the ATS gate excluded this category from the overall score.
    pub informational_only: bool,
    pub assessment: Option<Assessment>,
    pub findings: Vec<Finding>,
}

/// The serializable report handed to the presentation layer. Plain data
/// only; round-trips through JSON without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub analysis_id: Uuid,
    pub generated_on: NaiveDate,
    pub overall_score: u32,
    pub status: StatusBand,
    pub ats_gated: bool,
    pub categories: Vec<CategoryReport>,
    pub failure_causes: Vec<FailureCause>,
    pub suggestions: Vec<FixSuggestion>,
}
