use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Contact block of a resume. Every field is optional — absence is a scoring
/// signal, not an input error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
}

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.location.is_none()
            && self.links.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Education,
    Experience,
    Project,
    Certification,
    Award,
    Publication,
    Skill,
    Leadership,
    Research,
}

impl EntryKind {
    /// Canonical section label used for headers and evidence references.
    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::Education => "education",
            EntryKind::Experience => "experience",
            EntryKind::Project => "projects",
            EntryKind::Certification => "certifications",
            EntryKind::Award => "awards",
            EntryKind::Publication => "publications",
            EntryKind::Skill => "skills",
            EntryKind::Leadership => "leadership",
            EntryKind::Research => "research",
        }
    }
}

/// A date range on an entry. `current == true` means the range is explicitly
/// open-ended and `end` must be `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
}

impl DateRange {
    /// A range is well-formed when it is either fully specified with
    /// `end >= start`, or explicitly open-ended.
    pub fn is_well_formed(&self) -> bool {
        match (self.current, self.end) {
            (true, Some(_)) => false,
            (true, None) => true,
            (false, Some(end)) => end >= self.start,
            (false, None) => true, // treated as open-ended
        }
    }

    /// End date resolved against the injected `now` for open-ended ranges.
    pub fn resolved_end(&self, now: NaiveDate) -> NaiveDate {
        match self.end {
            Some(end) if !self.current => end,
            _ => now,
        }
    }
}

/// One typed entry of a resume section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionEntry {
    #[serde(default)]
    pub id: Uuid,
    pub kind: EntryKind,
    pub title: Option<String>,
    pub organization: Option<String>,
    pub date_range: Option<DateRange>,
    #[serde(default)]
    pub bullets: Vec<String>,
    pub details: Option<String>,
}

/// Structured resume input. Arrives from the external document store; the
/// engine never mutates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeDocument {
    #[serde(default)]
    pub contact: ContactInfo,
    pub summary: Option<String>,
    #[serde(default)]
    pub sections: Vec<SectionEntry>,
}

impl ResumeDocument {
    pub fn is_empty(&self) -> bool {
        self.contact.is_empty() && self.summary.is_none() && self.sections.is_empty()
    }

    pub fn entries_of(&self, kind: EntryKind) -> impl Iterator<Item = &SectionEntry> {
        self.sections.iter().filter(move |e| e.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_closed_range_well_formed() {
        let r = DateRange {
            start: d(2020, 1, 1),
            end: Some(d(2022, 6, 1)),
            current: false,
        };
        assert!(r.is_well_formed());
    }

    #[test]
    fn test_end_before_start_is_malformed() {
        let r = DateRange {
            start: d(2022, 1, 1),
            end: Some(d(2020, 1, 1)),
            current: false,
        };
        assert!(!r.is_well_formed());
    }

    #[test]
    fn test_current_with_end_date_is_malformed() {
        let r = DateRange {
            start: d(2020, 1, 1),
            end: Some(d(2022, 1, 1)),
            current: true,
        };
        assert!(!r.is_well_formed());
    }

    #[test]
    fn test_open_range_resolves_to_now() {
        let r = DateRange {
            start: d(2020, 1, 1),
            end: None,
            current: true,
        };
        assert_eq!(r.resolved_end(d(2025, 3, 1)), d(2025, 3, 1));
    }

    #[test]
    fn test_document_deserializes_with_defaults() {
        let doc: ResumeDocument = serde_json::from_str(
            r#"{"sections": [{"kind": "experience", "title": "Engineer"}]}"#,
        )
        .unwrap();
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].kind, EntryKind::Experience);
        assert!(doc.contact.is_empty());
    }

    #[test]
    fn test_empty_document_is_empty() {
        assert!(ResumeDocument::default().is_empty());
    }
}
