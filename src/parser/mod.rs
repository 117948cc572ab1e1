pub mod fields;
pub mod tree;

use std::path::Path;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde_json::Value;

use crate::error::{Result, SphaError};
use crate::types::{AnalysisResult, NO_SCORE};
use fields::{extract_score, is_present, parse_timestamp, repo_info, tool};
use tree::node_to_kpi;

/// Top-level sections a document must carry to be accepted as a report.
pub const REQUIRED_SECTIONS: [&str; 3] = ["resultHierarchy", "origins", "projectInfo"];

/// Normalizes a raw report into an [`AnalysisResult`].
///
/// Returns `None` only when one of [`REQUIRED_SECTIONS`] is missing. Every other
/// field falls back to its documented default, so a document that has the
/// three sections always parses, however sparse it is.
pub fn parse(raw: &Value) -> Option<AnalysisResult> {
    parse_at(raw, Utc::now())
}

/// Same as [`parse`], with `now` used when the report has no valid `createdAt`.
pub fn parse_at(raw: &Value, now: DateTime<Utc>) -> Option<AnalysisResult> {
    if let Some(missing) = REQUIRED_SECTIONS.iter().find(|key| !is_present(raw.get(**key))) {
        debug!("rejecting report: missing `{missing}`");
        return None;
    }

    let hierarchy_root = &raw["resultHierarchy"]["root"];

    Some(AnalysisResult {
        health_score: extract_score(hierarchy_root.get("result")).unwrap_or(NO_SCORE),
        repo_info: repo_info(&raw["projectInfo"]),
        root: node_to_kpi(hierarchy_root),
        tools: raw["origins"]
            .as_array()
            .map(|origins| origins.iter().map(tool).collect())
            .unwrap_or_default(),
        created_at: created_at(raw.get("createdAt"), now),
    })
}

/// Decodes `text` as JSON and parses it. Undecodable text is treated exactly
/// like a document missing its required sections.
pub fn parse_str(text: &str) -> Option<AnalysisResult> {
    match serde_json::from_str::<Value>(text) {
        Ok(raw) => parse(&raw),
        Err(e) => {
            debug!("rejecting report: not JSON ({e})");
            None
        }
    }
}

/// Reads and parses a report file, keeping "unreadable", "not JSON" and
/// "not a report" apart so callers can tell a bad file from an empty report.
pub fn load_report(path: &Path) -> Result<AnalysisResult> {
    let content = std::fs::read_to_string(path).map_err(|source| SphaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: Value = serde_json::from_str(&content).map_err(|source| SphaError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&raw).ok_or_else(|| SphaError::Rejected { path: path.to_path_buf() })
}

fn created_at(candidate: Option<&Value>, now: DateTime<Utc>) -> DateTime<Utc> {
    match candidate {
        None | Some(Value::Null) => now,
        Some(value) => match value.as_str().and_then(parse_timestamp) {
            Some(ts) => ts,
            None => {
                warn!("ignoring invalid createdAt {value}; using parse time");
                now
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "resultHierarchy": {"root": {
                "typeId": "root",
                "metaInfo": {"displayName": "Root"},
                "result": {"type": "Success", "score": 64},
                "edges": []
            }},
            "origins": [],
            "projectInfo": {"name": "demo"}
        })
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_object_is_rejected() {
        assert!(parse(&json!({})).is_none());
    }

    #[test]
    fn test_each_required_section_is_checked() {
        for key in REQUIRED_SECTIONS {
            let mut raw = minimal();
            raw.as_object_mut().unwrap().remove(key);
            assert!(parse(&raw).is_none(), "Missing '{key}' must reject the document");
        }
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(parse(&json!([1, 2, 3])).is_none());
        assert!(parse(&json!("report")).is_none());
        assert!(parse(&Value::Null).is_none());
    }

    #[test]
    fn test_sparse_document_parses_with_defaults() {
        let raw = json!({"resultHierarchy": {}, "origins": {}, "projectInfo": {}});
        let result = parse_at(&raw, fixed_now()).expect("three sections present -> success");
        assert_eq!(result.health_score, NO_SCORE);
        assert_eq!(result.root.id, "N/A");
        assert!(result.tools.is_empty(), "Non-array origins yields no tools");
        assert_eq!(result.repo_info.stars(), -1);
        assert_eq!(result.created_at, fixed_now());
    }

    #[test]
    fn test_health_score_from_root_result() {
        let result = parse(&minimal()).unwrap();
        assert_eq!(result.health_score, 64.0);
        assert_eq!(result.root.score, 64.0);
    }

    #[test]
    fn test_created_at_valid_is_kept() {
        let mut raw = minimal();
        raw["createdAt"] = json!("2024-06-01T08:00:00Z");
        let result = parse_at(&raw, fixed_now()).unwrap();
        assert_eq!(result.created_at, Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_created_at_invalid_falls_back_to_now() {
        for bad in [json!(""), json!("yesterday"), json!(1717228800), json!("2024-99-99")] {
            let mut raw = minimal();
            raw["createdAt"] = bad.clone();
            let result = parse_at(&raw, fixed_now()).unwrap();
            assert_eq!(result.created_at, fixed_now(), "createdAt {bad} should fall back");
        }
    }

    #[test]
    fn test_parse_is_idempotent_apart_from_clock() {
        let raw = minimal();
        let a = parse_at(&raw, fixed_now()).unwrap();
        let b = parse_at(&raw, fixed_now()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_str_treats_bad_json_as_absent() {
        assert!(parse_str("{ invalid json }").is_none());
        assert!(parse_str(r#"{"someOtherData": "value"}"#).is_none());
        assert!(parse_str(&minimal().to_string()).is_some());
    }
}
