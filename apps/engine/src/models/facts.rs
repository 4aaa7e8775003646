//! Normalized facts — the immutable, extractor-owned view of a resume that
//! every evaluator reads. Evaluators never see raw text or the source
//! document; everything they need is derived here once.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::report::Finding;
use crate::models::resume::EntryKind;

/// A traceable pointer back into the input. Every finding that refers to
/// concrete content carries one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceRef {
    /// A specific bullet, addressed by section label and bullet index.
    Bullet {
        section: String,
        index: usize,
        text: String,
    },
    /// A whole section (e.g. a missing or empty one).
    Section { name: String },
    /// The document as a whole.
    Document,
}

/// One tokenized bullet sentence with its lexical tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletFact {
    pub text: String,
    /// Section label the bullet came from.
    pub section: String,
    /// Position among all extracted bullets, stable across reruns.
    pub index: usize,
    pub has_number: bool,
    pub has_action_verb: bool,
    pub has_scope_marker: bool,
}

impl BulletFact {
    pub fn evidence(&self) -> EvidenceRef {
        EvidenceRef::Bullet {
            section: self.section.clone(),
            index: self.index,
            text: self.text.clone(),
        }
    }

    pub fn meets_all_criteria(&self) -> bool {
        self.has_number && self.has_action_verb && self.has_scope_marker
    }
}

/// One role or education interval on the chronological timeline. Open-ended
/// spans are resolved against the injected `now` at extraction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSpan {
    pub title: String,
    pub kind: EntryKind,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub current: bool,
    /// Rank on the seniority ladder, when a ladder keyword matches the title.
    pub seniority_rank: Option<u8>,
    /// Skill tokens detected inside this span's own text.
    pub skills: BTreeSet<String>,
}

impl TimelineSpan {
    pub fn months(&self) -> f64 {
        months_between(self.start, self.end)
    }
}

/// Fractional months between two dates. Clamped at zero.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> f64 {
    let years = end.year() - start.year();
    let months = end.month() as i32 - start.month() as i32;
    let total = years * 12 + months;
    let day_frac = (end.day() as f64 - start.day() as f64) / 30.0;
    (total as f64 + day_frac).max(0.0)
}

/// Heuristic layout hazards detected in raw text. Real layout information
/// does not survive text extraction, so these are risk flags, not proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutRisk {
    /// Words run together (camelCase joins), typical of multi-column PDFs.
    GluedWords,
    /// A single line far beyond plausible prose width.
    LongUnbrokenLines,
    /// Substantial text with no line breaks at all.
    NoLineBreaks,
}

impl LayoutRisk {
    pub fn describe(&self) -> &'static str {
        match self {
            LayoutRisk::GluedWords => {
                "words appear glued together, suggesting a multi-column layout that ATS parsers misread"
            }
            LayoutRisk::LongUnbrokenLines => "contains implausibly long unbroken lines",
            LayoutRisk::NoLineBreaks => "text arrived with no line breaks",
        }
    }
}

/// Everything the evaluators are allowed to know about a resume. Built once
/// by the extractor, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedFacts {
    pub bullets: Vec<BulletFact>,
    /// Canonical, lowercase skill tokens detected anywhere in the input.
    pub skill_tokens: BTreeSet<String>,
    /// Credential mentions (degrees, certifications), lowercase.
    pub credential_tokens: BTreeSet<String>,
    /// Role/education intervals sorted by start date.
    pub timeline: Vec<TimelineSpan>,
    /// Canonical labels of section headers found in the input.
    pub headers_present: BTreeSet<String>,
    pub layout_risks: Vec<LayoutRisk>,
    pub has_contact: bool,
    /// Merged experience duration in years.
    pub total_years_experience: f64,
    /// Findings raised during extraction itself (malformed dates, no
    /// extractable sections). Folded into the ATS evaluator's output.
    pub extraction_findings: Vec<Finding>,
    /// The injected clock. The only time source anywhere in the engine.
    pub now: NaiveDate,
}

impl NormalizedFacts {
    pub fn empty(now: NaiveDate) -> Self {
        NormalizedFacts {
            bullets: Vec::new(),
            skill_tokens: BTreeSet::new(),
            credential_tokens: BTreeSet::new(),
            timeline: Vec::new(),
            headers_present: BTreeSet::new(),
            layout_risks: Vec::new(),
            has_contact: false,
            total_years_experience: 0.0,
            extraction_findings: Vec::new(),
            now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bullets.is_empty() && self.timeline.is_empty() && self.headers_present.is_empty()
    }

    pub fn experience_spans(&self) -> impl Iterator<Item = &TimelineSpan> {
        self.timeline
            .iter()
            .filter(|s| s.kind == EntryKind::Experience)
    }
}
