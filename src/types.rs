use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Score value meaning "no data / not computable". Never a low score.
pub const NO_SCORE: f64 = -1.0;

/// Placeholder text for absent descriptive fields.
pub const NOT_AVAILABLE: &str = "N/A";

/// Sentinel for absent counts (stars, contributors).
pub const NO_COUNT: i64 = -1;

// ─── KPI Tree ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Threshold {
    pub name: String,
    pub value: f64,
}

/// One node of the health-assessment tree. A node without children is a leaf
/// (a raw measurement); any other node aggregates its children.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    pub id: String,
    pub display_name: String,
    pub score: f64,
    pub children: Vec<Kpi>,
    /// `None` when the source carried no thresholds; never `Some(vec![])`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Vec<Threshold>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Kpi {
    /// A bare node with the given score and no children, thresholds or metadata.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, score: f64) -> Self {
        Kpi {
            id: id.into(),
            display_name: display_name.into(),
            score,
            children: Vec::new(),
            thresholds: None,
            result_type: None,
            description: None,
            tags: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Kpi>) -> Self {
        self.children = children;
        self
    }

    pub fn with_thresholds(mut self, thresholds: Vec<Threshold>) -> Self {
        self.thresholds = if thresholds.is_empty() { None } else { Some(thresholds) };
        self
    }

    /// False for the `-1` sentinel.
    pub fn has_score(&self) -> bool {
        self.score != NO_SCORE
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The explicit thresholds, or an empty slice.
    pub fn threshold_list(&self) -> &[Threshold] {
        self.thresholds.as_deref().unwrap_or(&[])
    }
}

// ─── Repository Metadata ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Language {
    pub name: String,
    /// Relative proportion, unit-less.
    pub size: f64,
}

/// Project metadata. Scalars are stored as `Option` and projected to the
/// `-1` / `"N/A"` sentinels only through the accessors and in serialized output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoInfo {
    #[serde(serialize_with = "count_or_sentinel")]
    pub stars: Option<i64>,
    #[serde(serialize_with = "count_or_sentinel")]
    pub contributors: Option<i64>,
    #[serde(serialize_with = "text_or_sentinel")]
    pub last_commit_date: Option<String>,
    #[serde(serialize_with = "text_or_sentinel")]
    pub project_url: Option<String>,
    #[serde(serialize_with = "text_or_sentinel")]
    pub project_name: Option<String>,
    #[serde(serialize_with = "text_or_sentinel")]
    pub version: Option<String>,
    pub repo_languages: Vec<Language>,
}

impl RepoInfo {
    pub fn stars(&self) -> i64 {
        self.stars.unwrap_or(NO_COUNT)
    }

    pub fn contributors(&self) -> i64 {
        self.contributors.unwrap_or(NO_COUNT)
    }

    pub fn last_commit_date(&self) -> &str {
        self.last_commit_date.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn project_url(&self) -> &str {
        self.project_url.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn project_name(&self) -> &str {
        self.project_name.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or(NOT_AVAILABLE)
    }
}

fn count_or_sentinel<S: Serializer>(value: &Option<i64>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(value.unwrap_or(NO_COUNT))
}

fn text_or_sentinel<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(value.as_deref().unwrap_or(NOT_AVAILABLE))
}

// ─── Tools ────────────────────────────────────────────────────────────────────

/// Findings reported by one tool. Content is opaque; only the count matters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Findings {
    Records(Vec<Value>),
    /// Older reports carried only a number.
    Count(u64),
}

impl Findings {
    pub fn len(&self) -> usize {
        match self {
            Findings::Records(records) => records.len(),
            Findings::Count(n) => usize::try_from(*n).unwrap_or(usize::MAX),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Findings {
    fn default() -> Self {
        Findings::Records(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_date: Option<String>,
    pub findings: Findings,
    pub description: String,
}

impl Tool {
    pub fn finding_count(&self) -> usize {
        self.findings.len()
    }
}

// ─── Results & Products ───────────────────────────────────────────────────────

/// One complete analysis snapshot of a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Root score, same semantics as [`Kpi::score`].
    pub health_score: f64,
    pub repo_info: RepoInfo,
    pub root: Kpi,
    pub tools: Vec<Tool>,
    pub created_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn has_health_score(&self) -> bool {
        self.health_score != NO_SCORE
    }
}

/// A project and its result history, in observation order (last = current).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub created_at: DateTime<Utc>,
    pub results: Vec<AnalysisResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_info_sentinels_when_absent() {
        let info = RepoInfo::default();
        assert_eq!(info.stars(), -1);
        assert_eq!(info.contributors(), -1);
        assert_eq!(info.project_name(), "N/A");
        assert_eq!(info.project_url(), "N/A");
        assert_eq!(info.last_commit_date(), "N/A");
        assert_eq!(info.version(), "N/A");
    }

    #[test]
    fn test_repo_info_serializes_sentinels() {
        let json = serde_json::to_value(RepoInfo::default()).unwrap();
        assert_eq!(json["stars"], -1);
        assert_eq!(json["projectName"], "N/A");
        assert!(json["repoLanguages"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_findings_count_for_both_shapes() {
        let records = Findings::Records(vec![Value::Null, Value::Bool(true)]);
        assert_eq!(records.len(), 2);
        assert_eq!(Findings::Count(7).len(), 7);
        assert!(Findings::default().is_empty());
    }

    #[test]
    fn test_empty_thresholds_collapse_to_none() {
        let kpi = Kpi::new("k", "K", 50.0).with_thresholds(vec![]);
        assert!(kpi.thresholds.is_none(), "Empty threshold list must become None");
        assert!(kpi.threshold_list().is_empty());
    }

    #[test]
    fn test_sentinel_score_is_not_a_score() {
        assert!(!Kpi::new("k", "K", NO_SCORE).has_score());
        assert!(Kpi::new("k", "K", 0.0).has_score());
    }
}
