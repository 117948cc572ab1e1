//! One accessor per raw report field. Each returns `None` (or a typed default)
//! on any shape mismatch instead of failing the whole parse.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::types::{Findings, Language, RepoInfo, Tool, NOT_AVAILABLE};

/// Keys that may carry a tool's findings, newest shape first.
const FINDINGS_KEYS: &[&str] = &["origins", "origin", "findings"];

/// Presence test used for the required top-level sections. The upstream
/// format treats `null`, `false`, `0` and `""` as missing.
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

pub fn text(obj: &Value, key: &str) -> Option<String> {
    obj.get(key)?.as_str().map(str::to_string)
}

pub fn number(obj: &Value, key: &str) -> Option<f64> {
    obj.get(key)?.as_f64().filter(|f| f.is_finite())
}

/// Integer counts; floats are rounded rather than rejected.
pub fn count(obj: &Value, key: &str) -> Option<i64> {
    let value = obj.get(key)?;
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
}

pub fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

/// Reads a score from a KPI `result` record.
///
/// Two shapes are accepted: a bare numeric `score`, or a tagged variant that
/// carries both `type` and `score` (where the score may arrive as a string).
pub fn extract_score(result: Option<&Value>) -> Option<f64> {
    let result = result.filter(|r| !r.is_null())?;
    let score = result.get("score").filter(|s| !s.is_null())?;

    if let Some(n) = score.as_f64() {
        return Some(n);
    }

    if is_present(result.get("type")) {
        return score.as_str().and_then(|s| s.trim().parse::<f64>().ok());
    }

    None
}

pub fn repo_info(project_info: &Value) -> RepoInfo {
    RepoInfo {
        stars: count(project_info, "stars"),
        contributors: count(project_info, "numberOfContributors"),
        last_commit_date: text(project_info, "lastCommitDate"),
        project_url: text(project_info, "url"),
        project_name: text(project_info, "name"),
        version: text(project_info, "version"),
        repo_languages: languages(project_info.get("usedLanguages")),
    }
}

pub fn languages(value: Option<&Value>) -> Vec<Language> {
    let Some(items) = value.and_then(Value::as_array) else { return Vec::new() };
    items
        .iter()
        .map(|item| Language {
            name: text(item, "name").unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            size: number(item, "size")
                .or_else(|| number(item, "percentage"))
                .unwrap_or(0.0),
        })
        .collect()
}

/// Maps one `origins` entry to a [`Tool`]. Accepts the current
/// `{toolInfo: {...}, origins: [...]}` shape and the legacy `{name, origin: [...]}`.
pub fn tool(origin: &Value) -> Tool {
    let info = origin.get("toolInfo").filter(|v| v.is_object());
    let field = |key: &str| info.and_then(|i| text(i, key)).or_else(|| text(origin, key));

    Tool {
        name: field("name").unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        scan_date: field("scanDate"),
        findings: FINDINGS_KEYS
            .iter()
            .find_map(|key| origin.get(*key).and_then(findings))
            .unwrap_or_default(),
        description: field("description").unwrap_or_default(),
    }
}

fn findings(value: &Value) -> Option<Findings> {
    match value {
        Value::Array(records) => Some(Findings::Records(records.clone())),
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .map(Findings::Count),
        _ => None,
    }
}

/// Accepts a timestamp only if it parses to a real instant. Supports RFC 3339,
/// zone-less `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC) and bare dates.
pub fn parse_timestamp(candidate: &str) -> Option<DateTime<Utc>> {
    let s = candidate.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_score_bare_number() {
        assert_eq!(extract_score(Some(&json!({"score": 73}))), Some(73.0));
        assert_eq!(extract_score(Some(&json!({"score": 0}))), Some(0.0));
    }

    #[test]
    fn test_extract_score_tagged_variant() {
        let tagged = json!({"type": "Success", "score": 81.5});
        assert_eq!(extract_score(Some(&tagged)), Some(81.5));
        let stringly = json!({"type": "Success", "score": "42"});
        assert_eq!(extract_score(Some(&stringly)), Some(42.0));
    }

    #[test]
    fn test_extract_score_other_shapes_yield_none() {
        assert_eq!(extract_score(None), None);
        assert_eq!(extract_score(Some(&Value::Null)), None);
        assert_eq!(extract_score(Some(&json!({"type": "Error"}))), None);
        assert_eq!(extract_score(Some(&json!({"score": "42"}))), None,
            "A string score without a type tag is not a recognised shape");
        assert_eq!(extract_score(Some(&json!({"value": 10}))), None);
    }

    #[test]
    fn test_repo_info_defaults_each_field_independently() {
        let info = repo_info(&json!({"name": "demo", "stars": "many"}));
        assert_eq!(info.project_name.as_deref(), Some("demo"));
        assert_eq!(info.stars, None, "Non-numeric stars must fall back");
        assert_eq!(info.stars(), -1);
        assert_eq!(info.contributors(), -1);
        assert_eq!(info.project_url(), "N/A");
        assert!(info.repo_languages.is_empty());
    }

    #[test]
    fn test_languages_accept_size_or_percentage() {
        let langs = languages(Some(&json!([
            {"name": "Rust", "size": 70.5},
            {"name": "Shell", "percentage": 29.5},
            {}
        ])));
        assert_eq!(langs.len(), 3);
        assert_eq!(langs[0].size, 70.5);
        assert_eq!(langs[1].size, 29.5);
        assert_eq!(langs[2].name, "N/A");
        assert_eq!(langs[2].size, 0.0);
    }

    #[test]
    fn test_tool_current_shape() {
        let t = tool(&json!({
            "toolInfo": {"name": "OSV", "description": "Vulnerability scanner"},
            "origins": [{"id": 1}, {"id": 2}]
        }));
        assert_eq!(t.name, "OSV");
        assert_eq!(t.description, "Vulnerability scanner");
        assert_eq!(t.finding_count(), 2);
    }

    #[test]
    fn test_tool_legacy_shape_and_defaults() {
        let legacy = tool(&json!({"name": "ESLint", "origin": [{}, {}, {}]}));
        assert_eq!(legacy.name, "ESLint");
        assert_eq!(legacy.finding_count(), 3);
        assert_eq!(legacy.description, "");

        let bare = tool(&json!({}));
        assert_eq!(bare.name, "N/A");
        assert!(bare.findings.is_empty());
        assert!(bare.scan_date.is_none());
    }

    #[test]
    fn test_tool_numeric_findings_kept_as_count() {
        let t = tool(&json!({"name": "Sonar", "findings": 12}));
        assert_eq!(t.findings, Findings::Count(12));
    }

    #[test]
    fn test_parse_timestamp_accepts_iso_forms() {
        assert!(parse_timestamp("2024-01-15T10:30:00Z").is_some());
        assert!(parse_timestamp("2024-01-15T10:30:00+02:00").is_some());
        assert!(parse_timestamp("2024-01-15T10:30:00.123").is_some());
        assert!(parse_timestamp("2024-01-15").is_some());
    }

    #[test]
    fn test_parse_timestamp_rejects_invalid() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("   ").is_none());
        assert!(parse_timestamp("not a date").is_none());
        assert!(parse_timestamp("2024-13-01").is_none(), "Month 13 is not a real date");
        assert!(parse_timestamp("2024-02-30T00:00:00Z").is_none());
    }

    #[test]
    fn test_is_present_follows_truthiness() {
        let obj = json!({"a": {}, "b": null, "c": 0, "d": "", "e": [], "f": false});
        assert!(is_present(obj.get("a")));
        assert!(!is_present(obj.get("b")));
        assert!(!is_present(obj.get("c")));
        assert!(!is_present(obj.get("d")));
        assert!(is_present(obj.get("e")), "An empty array is still present");
        assert!(!is_present(obj.get("f")));
        assert!(!is_present(obj.get("missing")));
    }
}
