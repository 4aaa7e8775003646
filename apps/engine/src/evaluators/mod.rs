//! Rule Evaluators — seven independent, pure scorers, one per analysis
//! dimension. Each reads the same immutable `NormalizedFacts` and never
//! another evaluator's output; the failure-cause breakdown (the only
//! dependent step) lives in the aggregator instead.
//!
//! Shared contract: total on empty input (minimum score plus an explanatory
//! finding), score clamped to `[0, max_score]` by the evaluator itself, and
//! every finding traceable to concrete input where any exists.

pub mod ats;
pub mod content;
pub mod coverage;
pub mod credibility;
pub mod market_fit;
pub mod role_reality;
pub mod trajectory;

use crate::config::EngineConfig;
use crate::models::facts::NormalizedFacts;
use crate::models::report::{DimensionId, EvaluatorResult};
use crate::models::target::JobTarget;
use crate::reference::ReferenceData;

/// The evaluator seam. Implementations are pure: same facts, target, and
/// tables in — same result out.
pub trait Evaluator: Send + Sync {
    fn dimension(&self) -> DimensionId;

    fn evaluate(
        &self,
        facts: &NormalizedFacts,
        target: Option<&JobTarget>,
        reference: &ReferenceData,
        config: &EngineConfig,
    ) -> EvaluatorResult;
}

/// All seven evaluators in dimension order. The aggregator expects exactly
/// this set.
pub fn registry() -> Vec<Box<dyn Evaluator>> {
    vec![
        Box::new(ats::AtsParseability),
        Box::new(coverage::RequirementCoverage),
        Box::new(content::ContentSignal),
        Box::new(role_reality::RoleReality),
        Box::new(market_fit::MarketFit),
        Box::new(credibility::ExperienceCredibility),
        Box::new(trajectory::CareerTrajectory),
    ]
}

/// Clamps a possibly-negative raw score into `[0, max]`. Every evaluator
/// funnels its final score through this.
pub(crate) fn clamp_score(raw: i64, max: u32) -> u32 {
    raw.clamp(0, i64::from(max)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::facts::{BulletFact, LayoutRisk, TimelineSpan};
    use crate::models::resume::EntryKind;
    use chrono::{Months, NaiveDate};
    use std::collections::BTreeSet;

    #[test]
    fn test_registry_covers_every_dimension_once() {
        let dims: Vec<_> = registry().iter().map(|e| e.dimension()).collect();
        assert_eq!(dims.len(), DimensionId::ALL.len());
        for d in DimensionId::ALL {
            assert_eq!(dims.iter().filter(|x| **x == d).count(), 1, "{d:?}");
        }
    }

    #[test]
    fn test_clamp_score_bounds() {
        assert_eq!(clamp_score(-5, 20), 0);
        assert_eq!(clamp_score(7, 20), 7);
        assert_eq!(clamp_score(50, 20), 20);
    }

    // Seeded generator for the bounds sweep below. Deterministic, so a
    // failure reproduces.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            self.0 >> 33
        }

        fn below(&mut self, n: u64) -> usize {
            (self.next() % n) as usize
        }

        fn chance(&mut self, pct: u64) -> bool {
            self.next() % 100 < pct
        }
    }

    const BULLET_TEXTS: &[&str] = &[
        "Led a team of 8 engineers across 3 departments",
        "Improved throughput by 50000% as a world-class rockstar",
        "Responsible for stuff",
        "Reduced costs by 40% for customers",
        "Made ingestion 10x faster",
        "Delivered 12,000% gains, unmatched visionary guru work",
        "Built the billing platform",
        "",
    ];

    fn random_facts(rng: &mut Lcg) -> NormalizedFacts {
        let now = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let mut facts = NormalizedFacts::empty(now);

        for index in 0..rng.below(9) {
            facts.bullets.push(BulletFact {
                text: BULLET_TEXTS[rng.below(BULLET_TEXTS.len() as u64)].to_string(),
                section: "experience".to_string(),
                index,
                has_number: rng.chance(50),
                has_action_verb: rng.chance(50),
                has_scope_marker: rng.chance(50),
            });
        }

        for _ in 0..rng.below(5) {
            let start = NaiveDate::from_ymd_opt(
                2000 + rng.below(24) as i32,
                1 + rng.below(12) as u32,
                1,
            )
            .unwrap();
            let end = start + Months::new(rng.below(120) as u32);
            let skills: BTreeSet<String> = ["python", "sql", "docker"]
                .iter()
                .filter(|_| rng.chance(30))
                .map(|s| s.to_string())
                .collect();
            facts.timeline.push(TimelineSpan {
                title: "role".to_string(),
                kind: if rng.chance(70) {
                    EntryKind::Experience
                } else {
                    EntryKind::Education
                },
                start,
                end,
                current: rng.chance(20),
                seniority_rank: if rng.chance(70) {
                    Some(rng.below(9) as u8)
                } else {
                    None
                },
                skills,
            });
        }
        facts.timeline.sort_by_key(|s| (s.start, s.end));

        for skill in ["python", "sql", "docker", "kubernetes", "aws", "react"] {
            if rng.chance(40) {
                facts.skill_tokens.insert(skill.to_string());
            }
        }
        for credential in ["bachelor", "certified"] {
            if rng.chance(30) {
                facts.credential_tokens.insert(credential.to_string());
            }
        }
        for header in ["experience", "education", "skills"] {
            if rng.chance(60) {
                facts.headers_present.insert(header.to_string());
            }
        }
        if rng.chance(20) {
            facts.layout_risks.push(LayoutRisk::GluedWords);
        }
        if rng.chance(10) {
            facts.layout_risks.push(LayoutRisk::NoLineBreaks);
        }
        facts.has_contact = rng.chance(70);
        facts.total_years_experience = rng.below(40) as f64;
        facts
    }

    fn random_target(rng: &mut Lcg) -> Option<JobTarget> {
        if rng.chance(40) {
            return None;
        }
        let titles = [
            "Junior Developer",
            "Engineer",
            "Senior Engineer",
            "Director of Engineering",
        ];
        Some(JobTarget {
            role_title: titles[rng.below(titles.len() as u64)].to_string(),
            market: if rng.chance(50) {
                Some("us".to_string())
            } else {
                None
            },
            required_years: if rng.chance(50) {
                Some(rng.below(15) as f64)
            } else {
                None
            },
            required_skills: ["sql", "terraform"]
                .iter()
                .filter(|_| rng.chance(50))
                .map(|s| s.to_string())
                .collect(),
            required_credentials: if rng.chance(30) {
                vec!["bachelor".to_string()]
            } else {
                vec![]
            },
        })
    }

    #[test]
    fn test_scores_stay_within_bounds_on_randomized_facts() {
        let reference = ReferenceData::default();
        let config = EngineConfig::default();
        let mut rng = Lcg(0x5eed_cafe);

        for _ in 0..250 {
            let facts = random_facts(&mut rng);
            let target = random_target(&mut rng);
            for evaluator in registry() {
                let r = evaluator.evaluate(&facts, target.as_ref(), &reference, &config);
                assert!(
                    r.score <= r.max_score,
                    "{:?} returned {} above max {}",
                    r.dimension,
                    r.score,
                    r.max_score
                );
                assert_eq!(r.max_score, config.weights.for_dimension(r.dimension));
            }
        }
    }
}
