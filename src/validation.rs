//! Advisory sanity checks over a parsed result. Parsing never fails on field
//! values, so this is where out-of-range or malformed data gets reported.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::types::{AnalysisResult, Kpi, RepoInfo, NOT_AVAILABLE};

static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2})(T\d{2}:\d{2}:\d{2}(Z|[+-]\d{2}:\d{2})?)?$")
        .expect("date regex")
});

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https?://[^\s/?#]+[^\s]*$").expect("url regex")
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// Location of the offending value, e.g. `/root/children/2/score`.
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

pub fn validate_result(result: &AnalysisResult) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    check_score(result.health_score, "/healthScore", &mut issues);
    check_repo_info(&result.repo_info, &mut issues);
    check_kpi(&result.root, "/root".to_string(), &mut issues);
    for (i, tool) in result.tools.iter().enumerate() {
        if tool.name.is_empty() {
            push(&mut issues, format!("/tools/{i}/name"), "tool name is empty");
        }
    }
    issues
}

/// A score is valid when it is the no-data sentinel or lies in `0..=100`.
pub fn is_valid_score(score: f64) -> bool {
    score == crate::types::NO_SCORE || (0.0..=100.0).contains(&score)
}

/// `YYYY-MM-DD` with optional time and zone, naming a real calendar date.
pub fn is_valid_date(date: &str) -> bool {
    if date == NOT_AVAILABLE {
        return true;
    }
    DATE_PATTERN
        .captures(date)
        .and_then(|caps| caps.get(1))
        .is_some_and(|day| NaiveDate::parse_from_str(day.as_str(), "%Y-%m-%d").is_ok())
}

pub fn is_valid_url(url: &str) -> bool {
    url == NOT_AVAILABLE || URL_PATTERN.is_match(url)
}

fn check_score(score: f64, path: &str, issues: &mut Vec<ValidationIssue>) {
    if !is_valid_score(score) {
        push(issues, path.to_string(), format!("score {score} is outside 0..=100"));
    }
}

fn check_repo_info(info: &RepoInfo, issues: &mut Vec<ValidationIssue>) {
    if let Some(stars) = info.stars.filter(|s| *s < 0) {
        push(issues, "/repoInfo/stars".into(), format!("negative star count {stars}"));
    }
    if let Some(n) = info.contributors.filter(|n| *n < 0) {
        push(issues, "/repoInfo/contributors".into(), format!("negative contributor count {n}"));
    }
    if let Some(date) = info.last_commit_date.as_deref().filter(|d| !is_valid_date(d)) {
        push(issues, "/repoInfo/lastCommitDate".into(), format!("'{date}' is not a valid date"));
    }
    if let Some(url) = info.project_url.as_deref().filter(|u| !is_valid_url(u)) {
        push(issues, "/repoInfo/projectUrl".into(), format!("'{url}' is not an http(s) URL"));
    }
    for (i, lang) in info.repo_languages.iter().enumerate() {
        if lang.name.is_empty() {
            push(issues, format!("/repoInfo/repoLanguages/{i}/name"), "language name is empty");
        }
        if !lang.size.is_finite() || lang.size < 0.0 {
            push(issues, format!("/repoInfo/repoLanguages/{i}/size"),
                format!("language size {} must be a non-negative number", lang.size));
        }
    }
}

fn check_kpi(kpi: &Kpi, path: String, issues: &mut Vec<ValidationIssue>) {
    if kpi.id.is_empty() {
        push(issues, format!("{path}/id"), "KPI id is empty");
    }
    if kpi.display_name.is_empty() {
        push(issues, format!("{path}/displayName"), "KPI display name is empty");
    }
    check_score(kpi.score, &format!("{path}/score"), issues);
    for (i, t) in kpi.threshold_list().iter().enumerate() {
        if t.name.is_empty() {
            push(issues, format!("{path}/thresholds/{i}/name"), "threshold name is empty");
        }
        if !t.value.is_finite() || t.value < 0.0 {
            push(issues, format!("{path}/thresholds/{i}/value"),
                format!("threshold value {} must be a non-negative number", t.value));
        }
    }
    for (i, child) in kpi.children.iter().enumerate() {
        check_kpi(child, format!("{path}/children/{i}"), issues);
    }
}

fn push(issues: &mut Vec<ValidationIssue>, path: String, message: impl Into<String>) {
    issues.push(ValidationIssue { path, message: message.into() });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Language, Threshold, Tool, NO_SCORE};
    use chrono::Utc;

    fn clean_result() -> AnalysisResult {
        AnalysisResult {
            health_score: 73.0,
            repo_info: RepoInfo {
                stars: Some(127),
                last_commit_date: Some("2024-01-15T10:30:00Z".into()),
                project_url: Some("https://github.com/example/awesome-project".into()),
                project_name: Some("Awesome Project".into()),
                repo_languages: vec![Language { name: "TypeScript".into(), size: 65.2 }],
                ..RepoInfo::default()
            },
            root: Kpi::new("root", "Root", 73.0)
                .with_children(vec![Kpi::new("child", "Child", NO_SCORE)]),
            tools: vec![Tool {
                name: "ESLint".into(),
                scan_date: None,
                findings: Default::default(),
                description: String::new(),
            }],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_clean_result_has_no_issues() {
        let issues = validate_result(&clean_result());
        assert!(issues.is_empty(), "Unexpected issues: {issues:?}");
    }

    #[test]
    fn test_out_of_range_scores_reported_with_path() {
        let mut r = clean_result();
        r.health_score = 101.0;
        r.root.children[0].score = -5.0;
        let paths: Vec<String> = validate_result(&r).into_iter().map(|i| i.path).collect();
        assert!(paths.contains(&"/healthScore".to_string()));
        assert!(paths.contains(&"/root/children/0/score".to_string()));
    }

    #[test]
    fn test_bad_threshold_and_language() {
        let mut r = clean_result();
        r.root.thresholds = Some(vec![Threshold { name: String::new(), value: -1.0 }]);
        r.repo_info.repo_languages.push(Language { name: String::new(), size: f64::NAN });
        let issues = validate_result(&r);
        assert_eq!(issues.len(), 4, "got: {issues:?}");
    }

    #[test]
    fn test_date_validation() {
        assert!(is_valid_date("2024-01-15"));
        assert!(is_valid_date("2024-01-15T10:30:00Z"));
        assert!(is_valid_date("2024-01-15T10:30:00+05:30"));
        assert!(is_valid_date("N/A"));
        assert!(!is_valid_date(""));
        assert!(!is_valid_date("2024-13-01"));
        assert!(!is_valid_date("2023-02-29"));
        assert!(!is_valid_date("15/01/2024"));
    }

    #[test]
    fn test_url_validation() {
        assert!(is_valid_url("https://github.com/org/repo"));
        assert!(is_valid_url("http://localhost:8080/x"));
        assert!(is_valid_url("N/A"));
        assert!(!is_valid_url(""));
        assert!(!is_valid_url("ftp://example.com"));
        assert!(!is_valid_url("github.com/org/repo"));
    }

    #[test]
    fn test_invalid_repo_fields_reported() {
        let mut r = clean_result();
        r.repo_info.stars = Some(-3);
        r.repo_info.last_commit_date = Some("yesterday".into());
        r.repo_info.project_url = Some("not a url".into());
        let issues = validate_result(&r);
        assert_eq!(issues.len(), 3, "got: {issues:?}");
        assert!(issues[0].to_string().starts_with("/repoInfo/stars:"));
    }
}
