//! Engine facade — owns the configuration, reference data, and evaluator
//! registry, and runs the full pipeline: extract, evaluate, aggregate.
//! Pure and deterministic: the same `AnalysisInput` always produces the
//! same `AnalysisResult`, id included.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::aggregate::aggregate;
use crate::config::EngineConfig;
use crate::errors::EngineError;
use crate::evaluators::{registry, Evaluator};
use crate::extract::extract;
use crate::models::report::{AnalysisReport, AnalysisResult};
use crate::models::resume::ResumeDocument;
use crate::models::target::JobTarget;
use crate::reference::ReferenceData;
use crate::report;

/// Everything one analysis run depends on. `now` is part of the input so
/// open-ended date ranges resolve identically on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub raw_text: Option<String>,
    pub document: Option<ResumeDocument>,
    pub target: Option<JobTarget>,
    pub now: NaiveDate,
}

pub struct Engine {
    config: EngineConfig,
    reference: ReferenceData,
    evaluators: Vec<Box<dyn Evaluator>>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let reference = ReferenceData::load(config.reference_dir.as_deref())?;
        Ok(Engine {
            config,
            reference,
            evaluators: registry(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs the pipeline and returns the internal result.
    pub fn analyze(&self, input: &AnalysisInput) -> Result<AnalysisResult, EngineError> {
        if input.raw_text.is_none() && input.document.is_none() {
            return Err(EngineError::InvalidInput(
                "nothing to analyze: supply raw_text, a document, or both".into(),
            ));
        }
        if let Some(target) = &input.target {
            if target.role_title.trim().is_empty() {
                return Err(EngineError::InvalidInput(
                    "job target has an empty role title".into(),
                ));
            }
        }

        let id = analysis_id(input)?;
        let facts = extract(
            input.raw_text.as_deref(),
            input.document.as_ref(),
            input.now,
            &self.reference,
        );
        debug!(
            bullets = facts.bullets.len(),
            spans = facts.timeline.len(),
            skills = facts.skill_tokens.len(),
            "extraction complete"
        );

        let results = self
            .evaluators
            .iter()
            .map(|e| e.evaluate(&facts, input.target.as_ref(), &self.reference, &self.config))
            .collect();

        let result = aggregate(results, &self.config, &self.reference, id, input.now)?;
        info!(
            analysis_id = %result.id,
            overall = result.overall_score,
            status = ?result.status,
            gated = result.ats_gated,
            "analysis complete"
        );
        Ok(result)
    }

    /// Runs the pipeline and projects the result into the external report.
    pub fn analyze_report(&self, input: &AnalysisInput) -> Result<AnalysisReport, EngineError> {
        Ok(report::build(&self.analyze(input)?))
    }
}

/// Name-based id over the serialized input: identical inputs get identical
/// ids, so re-runs are byte-for-byte reproducible.
fn analysis_id(input: &AnalysisInput) -> Result<Uuid, EngineError> {
    let bytes = serde_json::to_vec(input).map_err(anyhow::Error::from)?;
    Ok(Uuid::new_v5(&Uuid::NAMESPACE_OID, &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::{DimensionId, Severity, StatusBand};
    use crate::models::resume::{ContactInfo, DateRange, EntryKind, SectionEntry};

    fn engine() -> Engine {
        Engine::new(EngineConfig::default()).unwrap()
    }

    fn now() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn entry(
        kind: EntryKind,
        title: &str,
        start: NaiveDate,
        end: Option<NaiveDate>,
        bullets: &[&str],
    ) -> SectionEntry {
        SectionEntry {
            id: Uuid::nil(),
            kind,
            title: Some(title.to_string()),
            organization: None,
            date_range: Some(DateRange {
                start,
                end,
                current: end.is_none(),
            }),
            bullets: bullets.iter().map(|b| b.to_string()).collect(),
            details: None,
        }
    }

    fn solid_document() -> ResumeDocument {
        ResumeDocument {
            contact: ContactInfo {
                name: Some("Jane Doe".to_string()),
                email: Some("jane@example.com".to_string()),
                phone: None,
                location: None,
                links: vec![],
            },
            summary: Some("Backend engineer focused on data platforms.".to_string()),
            sections: vec![
                entry(
                    EntryKind::Experience,
                    "Engineer",
                    d(2018, 1),
                    Some(d(2021, 1)),
                    &[
                        "Built a python ingestion pipeline handling 5TB daily",
                        "Reduced page load time by 40% for 2M users",
                    ],
                ),
                entry(
                    EntryKind::Experience,
                    "Senior Engineer",
                    d(2021, 1),
                    None,
                    &[
                        "Led migration of 12 services to kubernetes across 3 teams",
                        "Improved query latency by 60% with sql tuning",
                    ],
                ),
                entry(
                    EntryKind::Education,
                    "BS Computer Science",
                    d(2014, 9),
                    Some(d(2018, 6)),
                    &[],
                ),
                SectionEntry {
                    id: Uuid::nil(),
                    kind: EntryKind::Skill,
                    title: Some("Skills".to_string()),
                    organization: None,
                    date_range: None,
                    bullets: vec![],
                    details: Some("python, sql, docker, kubernetes, aws, git".to_string()),
                },
            ],
        }
    }

    fn input(document: Option<ResumeDocument>, target: Option<JobTarget>) -> AnalysisInput {
        AnalysisInput {
            raw_text: None,
            document,
            target,
            now: now(),
        }
    }

    #[test]
    fn test_no_input_at_all_is_invalid() {
        let err = engine().analyze(&input(None, None)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_empty_document_scores_zero_with_critical_findings() {
        let r = engine()
            .analyze(&input(Some(ResumeDocument::default()), None))
            .unwrap();
        assert_eq!(r.overall_score, 0);
        assert_eq!(r.status, StatusBand::Critical);
        assert!(r.ats_gated);
        assert!(r
            .results
            .iter()
            .flat_map(|res| &res.findings)
            .any(|f| f.severity == Severity::Critical));
        assert!(!r.failure_causes.is_empty());
    }

    #[test]
    fn test_identical_inputs_identical_results() {
        let e = engine();
        let i = input(Some(solid_document()), None);
        let a = e.analyze(&i).unwrap();
        let b = e.analyze(&i).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn test_different_inputs_get_different_ids() {
        let e = engine();
        let a = e.analyze(&input(Some(solid_document()), None)).unwrap();
        let mut other = solid_document();
        other.summary = Some("Frontend engineer.".to_string());
        let b = e.analyze(&input(Some(other), None)).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_solid_resume_scores_well_ungated() {
        let r = engine().analyze(&input(Some(solid_document()), None)).unwrap();
        assert!(!r.ats_gated);
        assert!(r.overall_score >= 70, "got {}", r.overall_score);
        assert_eq!(r.status, StatusBand::Strong);
    }

    #[test]
    fn test_missing_required_skill_surfaces_as_failure_cause() {
        let target = JobTarget {
            role_title: "Senior Engineer".to_string(),
            market: None,
            required_years: None,
            required_skills: vec!["terraform".to_string()],
            required_credentials: vec![],
        };
        let r = engine()
            .analyze(&input(Some(solid_document()), Some(target)))
            .unwrap();
        let coverage = r
            .results
            .iter()
            .find(|res| res.dimension == DimensionId::RequirementCoverage)
            .unwrap();
        assert!(coverage.score < coverage.max_score);
        assert!(r
            .failure_causes
            .iter()
            .any(|c| c.message.contains("terraform")));
        assert!(!r.suggestions.is_empty());
    }

    #[test]
    fn test_unquantified_resume_missing_required_skill_lands_critical() {
        // no digit anywhere in the text, and the required skill never appears
        let raw = "jane@example.com\nExperience\n- Led the checkout team\n- Built the billing platform for customers\nEducation\nState University\nSkills\npython, docker";
        let target = JobTarget {
            role_title: "Backend Engineer".to_string(),
            market: None,
            required_years: None,
            required_skills: vec!["SQL".to_string()],
            required_credentials: vec![],
        };
        let i = AnalysisInput {
            raw_text: Some(raw.to_string()),
            document: None,
            target: Some(target),
            now: now(),
        };
        let r = engine().analyze(&i).unwrap();

        let content = r
            .results
            .iter()
            .find(|res| res.dimension == DimensionId::ContentSignal)
            .unwrap();
        assert_eq!(content.score, 0);
        assert!(r.failure_causes.iter().any(|c| c.message.contains("SQL")));
        assert_eq!(r.status, StatusBand::Critical, "overall {}", r.overall_score);
    }

    #[test]
    fn test_empty_target_title_is_invalid() {
        let target = JobTarget {
            role_title: "   ".to_string(),
            market: None,
            required_years: None,
            required_skills: vec![],
            required_credentials: vec![],
        };
        let err = engine()
            .analyze(&input(Some(solid_document()), Some(target)))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_garbled_raw_text_trips_the_ats_gate() {
        let glued = "JaneDoeSoftware EngineerAcme CorpBuilt systemsLed teamsShipped featuresEducationState UniversityBachelor of ScienceSkills PythonDocker KubernetesAwards DeansList HonorRoll".repeat(4);
        let i = AnalysisInput {
            raw_text: Some(glued),
            document: None,
            target: None,
            now: now(),
        };
        let r = engine().analyze(&i).unwrap();
        assert!(r.ats_gated);
        let report = report::build(&r);
        assert!(report
            .categories
            .iter()
            .filter(|c| c.category != "ATS Parseability")
            .all(|c| c.informational_only));
    }

    #[test]
    fn test_report_projection_round_trips_through_json() {
        let report = engine()
            .analyze_report(&input(Some(solid_document()), None))
            .unwrap();
        let json = serde_json::to_string_pretty(&report).unwrap();
        let back: AnalysisReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
