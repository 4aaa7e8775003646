//! Reference Data Loader — the swappable lookup tables the rule evaluators
//! read. Everything here is data, not logic: action verbs, scope markers,
//! section headers, skill aliases, seniority ladder, market demand tables,
//! and the finding-kind → suggestion templates. Embedded defaults ship with
//! the binary; any table can be overridden by a JSON file in the configured
//! reference directory without touching code.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::models::report::FindingKind;

const DEFAULT_ACTION_VERBS: &[&str] = &[
    "accelerated",
    "achieved",
    "architected",
    "automated",
    "built",
    "created",
    "cut",
    "delivered",
    "designed",
    "developed",
    "directed",
    "drove",
    "eliminated",
    "engineered",
    "established",
    "expanded",
    "founded",
    "generated",
    "grew",
    "implemented",
    "increased",
    "launched",
    "led",
    "managed",
    "mentored",
    "migrated",
    "optimized",
    "orchestrated",
    "owned",
    "redesigned",
    "reduced",
    "refactored",
    "released",
    "scaled",
    "shipped",
    "spearheaded",
    "streamlined",
    "trained",
];

const DEFAULT_SCOPE_MARKERS: &[&str] = &[
    "team",
    "teams",
    "cross-functional",
    "org-wide",
    "company-wide",
    "organization",
    "stakeholders",
    "engineers",
    "direct reports",
    "customers",
    "clients",
    "users",
    "departments",
    "across",
];

/// Superlatives that read as inflation when unbacked by numbers.
const DEFAULT_INFLATION_MARKERS: &[&str] = &[
    "world-class",
    "best in the world",
    "best-in-class",
    "revolutionary",
    "unmatched",
    "unparalleled",
    "visionary",
    "guru",
    "ninja",
    "rockstar",
];

const DEFAULT_CREDENTIAL_MARKERS: &[&str] = &[
    "bachelor",
    "master",
    "mba",
    "phd",
    "doctorate",
    "b.s.",
    "m.s.",
    "b.sc",
    "m.sc",
    "certified",
    "certification",
    "certificate",
    "license",
    "licensed",
];

/// A canonical section header and the raw spellings that map to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderSpec {
    pub label: String,
    pub aliases: Vec<String>,
    /// Expected headers penalize ATS parseability when absent.
    pub expected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricLimits {
    /// Percent improvements above this read as implausible.
    pub max_percent: f64,
    /// "Nx" multipliers above this read as implausible.
    pub max_multiplier: f64,
}

/// Suggestion template and its estimated effort (1 = quick edit, 3 = real
/// work). Effort feeds the fix-suggestion ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionTemplate {
    pub text: String,
    pub effort: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeniorityRung {
    pub keyword: String,
    pub rank: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    pub action_verbs: BTreeSet<String>,
    pub scope_markers: Vec<String>,
    pub inflation_markers: Vec<String>,
    pub credential_markers: Vec<String>,
    pub standard_headers: Vec<HeaderSpec>,
    /// canonical skill → alternate spellings (the canonical form itself
    /// always matches).
    pub skill_aliases: BTreeMap<String, Vec<String>>,
    /// market key (lowercase) → in-demand canonical skills.
    pub market_demand: BTreeMap<String, Vec<String>>,
    pub seniority_ladder: Vec<SeniorityRung>,
    pub suggestions: BTreeMap<FindingKind, SuggestionTemplate>,
    pub metric_limits: MetricLimits,
}

impl Default for ReferenceData {
    fn default() -> Self {
        ReferenceData {
            action_verbs: DEFAULT_ACTION_VERBS.iter().map(|s| s.to_string()).collect(),
            scope_markers: DEFAULT_SCOPE_MARKERS.iter().map(|s| s.to_string()).collect(),
            inflation_markers: DEFAULT_INFLATION_MARKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            credential_markers: DEFAULT_CREDENTIAL_MARKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            standard_headers: default_headers(),
            skill_aliases: default_skill_aliases(),
            market_demand: default_market_demand(),
            seniority_ladder: default_seniority_ladder(),
            suggestions: default_suggestions(),
            metric_limits: MetricLimits {
                max_percent: 1000.0,
                max_multiplier: 100.0,
            },
        }
    }
}

impl ReferenceData {
    /// Builds reference data from embedded defaults, overriding any table
    /// for which a JSON file exists under `dir`. A malformed file is a
    /// configuration error: refusing to run beats silently mis-scoring.
    pub fn load(dir: Option<&Path>) -> Result<Self, EngineError> {
        let mut data = ReferenceData::default();
        let Some(dir) = dir else {
            return Ok(data);
        };

        if let Some(verbs) = load_table(dir, "action_verbs.json")? {
            data.action_verbs = verbs;
        }
        if let Some(markers) = load_table(dir, "scope_markers.json")? {
            data.scope_markers = markers;
        }
        if let Some(markers) = load_table(dir, "inflation_markers.json")? {
            data.inflation_markers = markers;
        }
        if let Some(markers) = load_table(dir, "credential_markers.json")? {
            data.credential_markers = markers;
        }
        if let Some(headers) = load_table(dir, "headers.json")? {
            data.standard_headers = headers;
        }
        if let Some(aliases) = load_table(dir, "skill_aliases.json")? {
            data.skill_aliases = aliases;
        }
        if let Some(demand) = load_table(dir, "market_demand.json")? {
            data.market_demand = demand;
        }
        if let Some(ladder) = load_table(dir, "seniority.json")? {
            data.seniority_ladder = ladder;
        }
        if let Some(suggestions) = load_table(dir, "suggestions.json")? {
            data.suggestions = suggestions;
        }
        if let Some(limits) = load_table(dir, "metric_limits.json")? {
            data.metric_limits = limits;
        }

        data.validate()?;
        Ok(data)
    }

    /// Rejects tables that would make the engine mis-score.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.action_verbs.is_empty() {
            return Err(EngineError::Config("action verb list is empty".into()));
        }
        if self.standard_headers.is_empty() {
            return Err(EngineError::Config("section header table is empty".into()));
        }
        if self.seniority_ladder.is_empty() {
            return Err(EngineError::Config("seniority ladder is empty".into()));
        }
        if self.metric_limits.max_percent <= 0.0 || self.metric_limits.max_multiplier <= 0.0 {
            return Err(EngineError::Config("metric limits must be positive".into()));
        }
        for kind in FindingKind::ALL {
            if !self.suggestions.contains_key(&kind) {
                return Err(EngineError::Config(format!(
                    "no suggestion template for finding kind {kind:?}"
                )));
            }
        }
        Ok(())
    }

    /// Highest ladder rank whose keyword occurs in the (lowercased) title.
    pub fn seniority_rank_of(&self, title: &str) -> Option<u8> {
        let title = title.to_lowercase();
        self.seniority_ladder
            .iter()
            .filter(|rung| contains_word(&title, &rung.keyword))
            .map(|rung| rung.rank)
            .max()
    }

    /// Canonical skills whose canonical form or any alias occurs as a word
    /// in the given lowercase text.
    pub fn detect_skills(&self, text_lower: &str) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        for (canonical, aliases) in &self.skill_aliases {
            let hit = contains_word(text_lower, canonical)
                || aliases.iter().any(|a| contains_word(text_lower, a));
            if hit {
                found.insert(canonical.clone());
            }
        }
        found
    }

    /// Resolves a raw skill name (e.g. from a job target) to its canonical
    /// form, falling back to the lowercased input.
    pub fn canonicalize_skill(&self, raw: &str) -> String {
        let lower = raw.trim().to_lowercase();
        for (canonical, aliases) in &self.skill_aliases {
            if *canonical == lower || aliases.iter().any(|a| *a == lower) {
                return canonical.clone();
            }
        }
        lower
    }

    pub fn suggestion_for(&self, kind: FindingKind) -> Option<&SuggestionTemplate> {
        self.suggestions.get(&kind)
    }
}

/// Word-boundary substring match over lowercase text. Prevents "sql" from
/// matching inside "sqlite".
pub fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let bytes = haystack.as_bytes();
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(needle) {
        let start = from + pos;
        let end = start + needle.len();
        let left_ok = start == 0 || !is_word_byte(bytes[start - 1]);
        let right_ok = end >= bytes.len() || !is_word_byte(bytes[end]);
        if left_ok && right_ok {
            return true;
        }
        // advance a full char, not one byte: slicing mid-character panics
        // when a needle starts with a multi-byte character
        from = start
            + haystack[start..]
                .chars()
                .next()
                .map_or(needle.len(), char::len_utf8);
    }
    false
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'+' || b == b'#'
}

fn load_table<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<Option<T>, EngineError> {
    let path = dir.join(name);
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(&path)
        .map_err(|e| EngineError::Config(format!("cannot read {}: {e}", path.display())))?;
    let parsed = serde_json::from_str(&raw)
        .map_err(|e| EngineError::Config(format!("malformed {}: {e}", path.display())))?;
    Ok(Some(parsed))
}

fn default_headers() -> Vec<HeaderSpec> {
    let spec = |label: &str, aliases: &[&str], expected: bool| HeaderSpec {
        label: label.to_string(),
        aliases: aliases.iter().map(|s| s.to_string()).collect(),
        expected,
    };
    vec![
        spec(
            "experience",
            &[
                "work experience",
                "professional experience",
                "employment",
                "employment history",
                "work history",
            ],
            true,
        ),
        spec("education", &["academic background", "academics"], true),
        spec(
            "skills",
            &["technical skills", "core competencies", "technologies"],
            true,
        ),
        spec("projects", &["personal projects", "selected projects"], false),
        spec("certifications", &["licenses", "licenses & certifications"], false),
        spec("summary", &["objective", "profile", "about", "about me"], false),
        spec("awards", &["honors", "honors & awards"], false),
        spec("publications", &[], false),
        spec("leadership", &["leadership experience"], false),
        spec("research", &["research experience"], false),
    ]
}

fn default_skill_aliases() -> BTreeMap<String, Vec<String>> {
    let entry = |canonical: &str, aliases: &[&str]| {
        (
            canonical.to_string(),
            aliases.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        )
    };
    BTreeMap::from([
        entry("rust", &[]),
        entry("python", &[]),
        entry("java", &[]),
        entry("javascript", &["js"]),
        entry("typescript", &["ts"]),
        entry("go", &["golang"]),
        entry("c++", &["cpp"]),
        entry("sql", &["postgresql", "postgres", "mysql", "sqlite"]),
        entry("kubernetes", &["k8s"]),
        entry("docker", &[]),
        entry("aws", &["amazon web services"]),
        entry("gcp", &["google cloud"]),
        entry("azure", &[]),
        entry("react", &[]),
        entry("terraform", &[]),
        entry("linux", &[]),
        entry("git", &[]),
        entry("kafka", &[]),
        entry("redis", &[]),
        entry("graphql", &[]),
        entry("machine learning", &["ml"]),
        entry("data analysis", &["data analytics"]),
        entry("excel", &[]),
        entry("ci/cd", &["continuous integration", "continuous delivery"]),
        entry("agile", &["scrum"]),
    ])
}

fn default_market_demand() -> BTreeMap<String, Vec<String>> {
    let list = |skills: &[&str]| skills.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    BTreeMap::from([
        (
            "global".to_string(),
            list(&[
                "python",
                "sql",
                "javascript",
                "aws",
                "docker",
                "kubernetes",
                "react",
                "java",
                "git",
                "agile",
            ]),
        ),
        (
            "us".to_string(),
            list(&[
                "python",
                "sql",
                "aws",
                "kubernetes",
                "typescript",
                "react",
                "terraform",
                "go",
                "machine learning",
                "ci/cd",
            ]),
        ),
    ])
}

fn default_seniority_ladder() -> Vec<SeniorityRung> {
    let rung = |keyword: &str, rank: u8| SeniorityRung {
        keyword: keyword.to_string(),
        rank,
    };
    vec![
        rung("intern", 0),
        rung("trainee", 0),
        rung("junior", 1),
        rung("associate", 1),
        rung("engineer", 2),
        rung("developer", 2),
        rung("analyst", 2),
        rung("senior", 3),
        rung("lead", 4),
        rung("staff", 4),
        rung("manager", 4),
        rung("principal", 5),
        rung("head of", 6),
        rung("director", 6),
        rung("vp", 7),
        rung("vice president", 7),
        rung("chief", 8),
        rung("cto", 8),
        rung("ceo", 8),
    ]
}

fn default_suggestions() -> BTreeMap<FindingKind, SuggestionTemplate> {
    let t = |text: &str, effort: u32| SuggestionTemplate {
        text: text.to_string(),
        effort,
    };
    BTreeMap::from([
        (
            FindingKind::NoExtractableSections,
            t(
                "Rebuild the resume with clearly labeled sections (Experience, Education, Skills) so parsers can find anything at all.",
                3,
            ),
        ),
        (
            FindingKind::MissingSectionHeader,
            t("Add the missing standard section header so ATS parsers can segment the document.", 1),
        ),
        (
            FindingKind::LayoutRisk,
            t("Export from a single-column template; multi-column layouts scramble extracted text.", 2),
        ),
        (
            FindingKind::MissingContact,
            t("Add an email address and phone number at the top of the resume.", 1),
        ),
        (
            FindingKind::InvalidDateRange,
            t("Fix the date range so the end date is not before the start date.", 1),
        ),
        (
            FindingKind::MissingRequiredSkill,
            t("Add concrete evidence of the required skill, or reconsider targeting this role.", 2),
        ),
        (
            FindingKind::MissingRequiredCredential,
            t("List the required credential explicitly, including issuer and year.", 1),
        ),
        (
            FindingKind::UnquantifiedBullet,
            t("Add a number to the bullet: how much, how many, how fast.", 2),
        ),
        (
            FindingKind::WeakOpeningVerb,
            t("Open the bullet with a strong action verb (led, built, reduced).", 1),
        ),
        (
            FindingKind::MissingScopeContext,
            t("State the scope: team size, user count, or organizational reach.", 1),
        ),
        (
            FindingKind::SeniorityUnderfit,
            t("Target a role one level closer to your demonstrated seniority, or surface more senior-scope work.", 3),
        ),
        (
            FindingKind::SeniorityOverreach,
            t("Ground senior titles with evidence of matching scope, or align the target role downward.", 3),
        ),
        (
            FindingKind::InsufficientYears,
            t("Make relevant earlier experience visible, or target roles matching your years of experience.", 3),
        ),
        (
            FindingKind::LowMarketOverlap,
            t("Add in-demand skills for the target market where you genuinely have them.", 2),
        ),
        (
            FindingKind::ImplausibleMetric,
            t("Replace the implausible metric with the verifiable underlying number.", 1),
        ),
        (
            FindingKind::InflatedLanguage,
            t("Replace superlatives with concrete, measurable outcomes.", 1),
        ),
        (
            FindingKind::TitleInflation,
            t("Back senior titles with tenure and scope details, or use the official title.", 2),
        ),
        (
            FindingKind::FlatProgression,
            t("Show growth explicitly: promotions, expanded scope, or new responsibilities per role.", 2),
        ),
        (
            FindingKind::MisalignedProgression,
            t("Explain apparent step-downs (pivots, relocations) in the role description.", 2),
        ),
        (
            FindingKind::EmptyTimeline,
            t("Add dated experience or education entries so a career timeline exists.", 3),
        ),
        (
            FindingKind::NotApplicable,
            t("Provide a job target to enable this analysis.", 1),
        ),
    ])
}
