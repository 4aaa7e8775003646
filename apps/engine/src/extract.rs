//! Text & Field Extractor — turns raw resume text and/or a structured
//! document into `NormalizedFacts`. Total on any input: malformed text never
//! fails, it degrades to empty facts plus a critical finding. Deterministic:
//! the only time source is the injected `now`.

use chrono::NaiveDate;

use crate::models::facts::{
    months_between, BulletFact, EvidenceRef, LayoutRisk, NormalizedFacts, TimelineSpan,
};
use crate::models::report::{Finding, FindingKind, Severity};
use crate::models::resume::{EntryKind, ResumeDocument, SectionEntry};
use crate::reference::{contains_word, ReferenceData};

/// Glued lowercase→uppercase joins beyond this count flag a multi-column
/// extraction.
const GLUED_WORD_THRESHOLD: usize = 8;
const LONG_LINE_CHARS: usize = 300;
const NO_BREAK_MIN_CHARS: usize = 400;

/// Sections whose free-running prose is worth tokenizing into bullets even
/// without bullet markers.
const PROSE_SECTIONS: &[&str] = &["experience", "projects", "leadership", "research"];

pub fn extract(
    raw_text: Option<&str>,
    doc: Option<&ResumeDocument>,
    now: NaiveDate,
    reference: &ReferenceData,
) -> NormalizedFacts {
    let mut facts = NormalizedFacts::empty(now);

    // The structured document is canonical for bullets and the timeline;
    // raw text supplements layout risks, headers, and token detection.
    if let Some(doc) = doc {
        extract_from_document(&mut facts, doc, now, reference);
    }
    if let Some(raw) = raw_text {
        extract_from_raw(&mut facts, raw, doc.is_some(), reference);
    }

    if facts.is_empty() {
        facts.extraction_findings.push(Finding::new(
            Severity::Critical,
            FindingKind::NoExtractableSections,
            "no extractable sections: the input contains no recognizable resume structure",
            Some(EvidenceRef::Document),
        ));
    }

    facts
}

fn extract_from_document(
    facts: &mut NormalizedFacts,
    doc: &ResumeDocument,
    now: NaiveDate,
    reference: &ReferenceData,
) {
    facts.has_contact = !doc.contact.is_empty();
    if doc.summary.as_deref().is_some_and(|s| !s.trim().is_empty()) {
        facts.headers_present.insert("summary".to_string());
    }

    for entry in &doc.sections {
        facts.headers_present.insert(entry.kind.label().to_string());

        for bullet in &entry.bullets {
            push_bullet(facts, bullet, entry.kind.label(), reference);
        }

        if let Some(span) = timeline_span(entry, now, reference, &mut facts.extraction_findings) {
            facts.timeline.push(span);
        }

        if entry.kind == EntryKind::Certification {
            if let Some(title) = &entry.title {
                facts.credential_tokens.insert(title.trim().to_lowercase());
            }
        }
    }

    facts.timeline.sort_by_key(|s| (s.start, s.end));
    let merged_years = merged_experience_years(facts);
    facts.total_years_experience = merged_years;

    let full_text = document_text(doc).to_lowercase();
    facts.skill_tokens.extend(reference.detect_skills(&full_text));
    collect_credential_markers(facts, &full_text, reference);
}

fn extract_from_raw(
    facts: &mut NormalizedFacts,
    raw: &str,
    doc_present: bool,
    reference: &ReferenceData,
) {
    let lower = raw.to_lowercase();

    detect_layout_risks(facts, raw);
    facts.skill_tokens.extend(reference.detect_skills(&lower));
    collect_credential_markers(facts, &lower, reference);

    let mut current_section: Option<String> = None;
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(label) = match_header(line, reference) {
            facts.headers_present.insert(label.clone());
            current_section = Some(label);
            continue;
        }

        if !facts.has_contact && looks_like_contact(line) {
            facts.has_contact = true;
        }

        // The structured document already supplied canonical bullets.
        if doc_present {
            continue;
        }

        let section = current_section.as_deref().unwrap_or("body");
        if let Some(text) = strip_bullet_marker(line) {
            push_bullet(facts, text, section, reference);
        } else if PROSE_SECTIONS.contains(&section) {
            for sentence in split_sentences(line) {
                push_bullet(facts, sentence, section, reference);
            }
        }
    }
}

fn push_bullet(facts: &mut NormalizedFacts, text: &str, section: &str, reference: &ReferenceData) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    let lower = text.to_lowercase();
    facts.bullets.push(BulletFact {
        text: text.to_string(),
        section: section.to_string(),
        index: facts.bullets.len(),
        has_number: has_number(text),
        has_action_verb: has_action_verb(&lower, reference),
        has_scope_marker: has_scope_marker(&lower, reference),
    });
}

/// True iff the text carries a digit sequence (optionally dressed up as a
/// percentage, multiplier, or currency amount).
pub fn has_number(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

/// True iff the first word of the (lowercased) sentence is on the action
/// verb list.
fn has_action_verb(lower: &str, reference: &ReferenceData) -> bool {
    lower
        .split_whitespace()
        .next()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .is_some_and(|w| reference.action_verbs.contains(w))
}

fn has_scope_marker(lower: &str, reference: &ReferenceData) -> bool {
    reference
        .scope_markers
        .iter()
        .any(|m| contains_word(lower, m))
}

fn timeline_span(
    entry: &SectionEntry,
    now: NaiveDate,
    reference: &ReferenceData,
    findings: &mut Vec<Finding>,
) -> Option<TimelineSpan> {
    if !matches!(
        entry.kind,
        EntryKind::Experience | EntryKind::Education | EntryKind::Leadership
    ) {
        return None;
    }
    let range = entry.date_range?;
    let title = entry
        .title
        .clone()
        .or_else(|| entry.organization.clone())
        .unwrap_or_else(|| "untitled".to_string());

    if !range.is_well_formed() {
        findings.push(Finding::new(
            Severity::Warning,
            FindingKind::InvalidDateRange,
            format!("entry '{title}' has an inconsistent date range"),
            Some(EvidenceRef::Section {
                name: entry.kind.label().to_string(),
            }),
        ));
        return None;
    }

    let own_text = entry_text(entry).to_lowercase();
    let seniority_rank = if entry.kind == EntryKind::Education {
        None
    } else {
        reference.seniority_rank_of(&title)
    };

    Some(TimelineSpan {
        title,
        kind: entry.kind,
        start: range.start,
        end: range.resolved_end(now),
        current: range.current || range.end.is_none(),
        seniority_rank,
        skills: reference.detect_skills(&own_text),
    })
}

/// Total experience years with overlapping spans merged, so concurrent roles
/// are not double-counted.
fn merged_experience_years(facts: &NormalizedFacts) -> f64 {
    let mut intervals: Vec<(NaiveDate, NaiveDate)> = facts
        .experience_spans()
        .map(|s| (s.start, s.end))
        .collect();
    intervals.sort();

    let mut months = 0.0;
    let mut open: Option<(NaiveDate, NaiveDate)> = None;
    for (start, end) in intervals {
        match open {
            None => open = Some((start, end)),
            Some((open_start, open_end)) => {
                if start <= open_end {
                    open = Some((open_start, open_end.max(end)));
                } else {
                    months += months_between(open_start, open_end);
                    open = Some((start, end));
                }
            }
        }
    }
    if let Some((start, end)) = open {
        months += months_between(start, end);
    }
    months / 12.0
}

fn detect_layout_risks(facts: &mut NormalizedFacts, raw: &str) {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }

    if trimmed.len() > NO_BREAK_MIN_CHARS && !trimmed.contains('\n') {
        facts.layout_risks.push(LayoutRisk::NoLineBreaks);
    }
    if trimmed.lines().any(|l| l.len() > LONG_LINE_CHARS) {
        facts.layout_risks.push(LayoutRisk::LongUnbrokenLines);
    }

    let glued = trimmed
        .as_bytes()
        .windows(2)
        .filter(|w| w[0].is_ascii_lowercase() && w[1].is_ascii_uppercase())
        .count();
    if glued >= GLUED_WORD_THRESHOLD {
        facts.layout_risks.push(LayoutRisk::GluedWords);
    }
}

/// Matches a line against the header table: short, optionally colon-suffixed,
/// equal to a canonical label or one of its aliases.
fn match_header(line: &str, reference: &ReferenceData) -> Option<String> {
    let candidate = line.trim_end_matches(':').trim().to_lowercase();
    if candidate.is_empty() || candidate.len() > 40 {
        return None;
    }
    for spec in &reference.standard_headers {
        if spec.label == candidate || spec.aliases.iter().any(|a| *a == candidate) {
            return Some(spec.label.clone());
        }
    }
    None
}

fn looks_like_contact(line: &str) -> bool {
    let has_email = line.contains('@') && line.contains('.');
    let digit_count = line.chars().filter(|c| c.is_ascii_digit()).count();
    has_email || digit_count >= 7
}

fn strip_bullet_marker(line: &str) -> Option<&str> {
    for marker in ["- ", "* ", "• ", "– ", "· "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(rest);
        }
    }
    // single-char markers with no trailing space
    for marker in ['•', '·'] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(rest.trim_start());
        }
    }
    None
}

/// Splits prose into sentences worth treating as bullets (at least four
/// words each).
fn split_sentences(line: &str) -> Vec<&str> {
    line.split(". ")
        .map(|s| s.trim().trim_end_matches('.'))
        .filter(|s| s.split_whitespace().count() >= 4)
        .collect()
}

fn document_text(doc: &ResumeDocument) -> String {
    let mut out = String::new();
    if let Some(summary) = &doc.summary {
        out.push_str(summary);
        out.push('\n');
    }
    for entry in &doc.sections {
        out.push_str(&entry_text(entry));
        out.push('\n');
    }
    out
}

fn entry_text(entry: &SectionEntry) -> String {
    let mut out = String::new();
    if let Some(title) = &entry.title {
        out.push_str(title);
        out.push('\n');
    }
    if let Some(org) = &entry.organization {
        out.push_str(org);
        out.push('\n');
    }
    for bullet in &entry.bullets {
        out.push_str(bullet);
        out.push('\n');
    }
    if let Some(details) = &entry.details {
        out.push_str(details);
        out.push('\n');
    }
    out
}

fn collect_credential_markers(facts: &mut NormalizedFacts, lower: &str, reference: &ReferenceData) {
    for marker in &reference.credential_markers {
        if contains_word(lower, marker) {
            facts.credential_tokens.insert(marker.clone());
        }
    }
}
