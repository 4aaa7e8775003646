//! Market Fit — overlap between the resume's detected skills and the
//! demand table for the target market. Percentile-style terciles. Disabled
//! without a job target or without a demand table for the market.

use crate::config::EngineConfig;
use crate::evaluators::{clamp_score, Evaluator};
use crate::models::facts::NormalizedFacts;
use crate::models::report::{
    Assessment, DimensionId, EvaluatorResult, Finding, FindingKind, Severity,
};
use crate::models::target::JobTarget;
use crate::reference::ReferenceData;

const FALLBACK_MARKET: &str = "global";
const MAX_LISTED_GAPS: usize = 5;

pub struct MarketFit;

impl Evaluator for MarketFit {
    fn dimension(&self) -> DimensionId {
        DimensionId::MarketFit
    }

    fn evaluate(
        &self,
        facts: &NormalizedFacts,
        target: Option<&JobTarget>,
        reference: &ReferenceData,
        config: &EngineConfig,
    ) -> EvaluatorResult {
        let max = config.weights.market_fit;
        let Some(target) = target else {
            return EvaluatorResult::not_applicable(
                self.dimension(),
                max,
                "no job target supplied; market fit not assessed",
            );
        };

        let market = target
            .market
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_else(|| FALLBACK_MARKET.to_string());
        let demand = reference
            .market_demand
            .get(&market)
            .or_else(|| reference.market_demand.get(FALLBACK_MARKET));
        let Some(demand) = demand.filter(|d| !d.is_empty()) else {
            return EvaluatorResult::not_applicable(
                self.dimension(),
                max,
                &format!("no skill-demand table available for market '{market}'"),
            );
        };

        let matched = demand
            .iter()
            .filter(|skill| facts.skill_tokens.contains(*skill))
            .count();
        let overlap = matched as f64 / demand.len() as f64;

        let assessment = if overlap < 1.0 / 3.0 {
            Assessment::BottomThird
        } else if overlap < 2.0 / 3.0 {
            Assessment::MiddleThird
        } else {
            Assessment::TopThird
        };

        let mut findings = Vec::new();
        if assessment == Assessment::BottomThird {
            let gaps: Vec<&str> = demand
                .iter()
                .filter(|skill| !facts.skill_tokens.contains(*skill))
                .take(MAX_LISTED_GAPS)
                .map(String::as_str)
                .collect();
            findings.push(Finding::new(
                Severity::Warning,
                FindingKind::LowMarketOverlap,
                format!(
                    "covers {matched} of {} in-demand skills for '{market}'; missing: {}",
                    demand.len(),
                    gaps.join(", ")
                ),
                None,
            ));
        }

        EvaluatorResult {
            dimension: self.dimension(),
            score: clamp_score((f64::from(max) * overlap).round() as i64, max),
            max_score: max,
            applicable: true,
            assessment: Some(assessment),
            findings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn facts_with_skills(skills: &[&str]) -> NormalizedFacts {
        let mut facts = NormalizedFacts::empty(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        facts.skill_tokens = skills.iter().map(|s| s.to_string()).collect();
        facts
    }

    fn target(market: Option<&str>) -> JobTarget {
        JobTarget {
            role_title: "Engineer".to_string(),
            market: market.map(|m| m.to_string()),
            required_years: None,
            required_skills: vec![],
            required_credentials: vec![],
        }
    }

    fn run(facts: &NormalizedFacts, target: Option<&JobTarget>) -> EvaluatorResult {
        MarketFit.evaluate(
            facts,
            target,
            &ReferenceData::default(),
            &EngineConfig::default(),
        )
    }

    #[test]
    fn test_disabled_without_target() {
        let facts = facts_with_skills(&["python", "sql"]);
        let r = run(&facts, None);
        assert!(!r.applicable);
        assert!(r.assessment.is_none());
    }

    #[test]
    fn test_disabled_without_demand_table() {
        let mut reference = ReferenceData::default();
        reference.market_demand.clear();
        let facts = facts_with_skills(&["python"]);
        let t = target(Some("mars"));
        let r = MarketFit.evaluate(&facts, Some(&t), &reference, &EngineConfig::default());
        assert!(!r.applicable);
    }

    #[test]
    fn test_unknown_market_falls_back_to_global() {
        let facts = facts_with_skills(&["python", "sql", "javascript"]);
        let t = target(Some("atlantis"));
        let r = run(&facts, Some(&t));
        assert!(r.applicable);
    }

    #[test]
    fn test_no_overlap_is_bottom_third_with_gaps_listed() {
        let facts = facts_with_skills(&["fortran"]);
        let t = target(None);
        let r = run(&facts, Some(&t));
        assert_eq!(r.assessment, Some(Assessment::BottomThird));
        assert_eq!(r.score, 0);
        assert!(r.findings[0].message.contains("missing:"));
    }

    #[test]
    fn test_high_overlap_is_top_third() {
        // global demand list: python, sql, javascript, aws, docker,
        // kubernetes, react, java, git, agile
        let facts = facts_with_skills(&[
            "python",
            "sql",
            "javascript",
            "aws",
            "docker",
            "kubernetes",
            "react",
            "java",
        ]);
        let t = target(None);
        let r = run(&facts, Some(&t));
        assert_eq!(r.assessment, Some(Assessment::TopThird));
        assert!(r.score >= r.max_score * 2 / 3);
        assert!(r.findings.is_empty());
    }
}
