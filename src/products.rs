//! Product registry: groups results by project name into per-project histories.

use chrono::{DateTime, Local, Utc};
use log::debug;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::Serialize;

use crate::types::{AnalysisResult, Product};

const SCORE_SUCCESS: f64 = 70.0;
const SCORE_WARNING: f64 = 50.0;

static GLOBAL: Lazy<ProductStore> = Lazy::new(ProductStore::new);

/// The process-wide registry.
pub fn global() -> &'static ProductStore {
    &GLOBAL
}

/// Owns every [`Product`] and all mutation of their histories.
///
/// The find-or-create in [`add_result`](Self::add_result) runs under a single
/// lock, so concurrent callers can never create two products with one name.
#[derive(Debug, Default)]
pub struct ProductStore {
    products: Mutex<Vec<Product>>,
}

impl ProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_result(&self, result: AnalysisResult) -> Product {
        self.add_result_at(result, Utc::now())
    }

    /// Appends `result` to the product named after its project, creating the
    /// product (first seen at `now`) if the name is new. Returns a snapshot.
    pub fn add_result_at(&self, result: AnalysisResult, now: DateTime<Utc>) -> Product {
        let mut products = self.products.lock();

        // An absent name reads as "N/A", so unnamed reports share one product.
        let name = Some(result.repo_info.project_name())
            .filter(|n| !n.is_empty())
            .map_or_else(|| format!("Product {}", products.len() + 1), str::to_string);

        if let Some(existing) = products.iter_mut().find(|p| p.name == name) {
            existing.results.push(result);
            debug!("appended result #{} to product '{}'", existing.results.len(), existing.name);
            return existing.clone();
        }

        let product = Product {
            id: product_id(&name, result.repo_info.project_url()),
            description: Some(format!("Analysis results for {name}")),
            version: Some(result.repo_info.version().to_string()),
            created_at: now,
            name,
            results: vec![result],
        };
        debug!("created product '{}' ({})", product.name, product.id);
        products.push(product.clone());
        product
    }

    pub fn product_by_id(&self, id: &str) -> Option<Product> {
        self.products.lock().iter().find(|p| p.id == id).cloned()
    }

    pub fn has_products(&self) -> bool {
        !self.products.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.products.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_products()
    }

    /// Snapshot of all products in creation order.
    pub fn products(&self) -> Vec<Product> {
        self.products.lock().clone()
    }
}

/// Stable id for a name/URL pair: a 32-bit multiply-by-31 string hash over
/// the UTF-16 code units of `"{name}-{url}"`.
pub fn product_id(name: &str, url: &str) -> String {
    let input = format!("{name}-{url}");
    let hash = input
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit)));
    format!("product-{}", hash.unsigned_abs())
}

// ─── Derived Views ────────────────────────────────────────────────────────────

/// Display tone for scores and trends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Success,
    Warning,
    Danger,
    Muted,
}

impl Tone {
    pub fn css_class(self) -> &'static str {
        match self {
            Tone::Success => "text-success",
            Tone::Warning => "text-warning",
            Tone::Danger  => "text-danger",
            Tone::Muted   => "text-muted",
        }
    }
}

/// Parallel label/value series for a history chart, in history order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthChartData {
    pub labels: Vec<String>,
    /// `None` where a result had no health score.
    pub data: Vec<Option<f64>>,
}

impl Product {
    /// The last result in history order.
    pub fn current(&self) -> Option<&AnalysisResult> {
        self.results.last()
    }

    pub fn newest_version(&self) -> &str {
        self.current().map_or("Unknown", |r| r.repo_info.version())
    }

    pub fn used_languages(&self) -> String {
        match self.current() {
            Some(r) if !r.repo_info.repo_languages.is_empty() => r
                .repo_info
                .repo_languages
                .iter()
                .map(|l| l.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            _ => "Unknown".to_string(),
        }
    }

    pub fn project_url(&self) -> &str {
        self.current().map_or("#", |r| r.repo_info.project_url())
    }

    pub fn current_health_score(&self) -> Option<f64> {
        self.current()
            .filter(|r| r.has_health_score())
            .map(|r| r.health_score)
    }

    /// Current minus previous health score; `None` with fewer than two results
    /// or when either score is missing.
    pub fn health_score_trend(&self) -> Option<f64> {
        let [.., previous, current] = self.results.as_slice() else { return None };
        if !previous.has_health_score() || !current.has_health_score() {
            return None;
        }
        Some(current.health_score - previous.health_score)
    }

    pub fn health_data_for_chart(&self) -> HealthChartData {
        HealthChartData {
            labels: self
                .results
                .iter()
                .map(|r| r.created_at.with_timezone(&Local).format("%Y-%m-%d").to_string())
                .collect(),
            data: self
                .results
                .iter()
                .map(|r| r.has_health_score().then_some(r.health_score))
                .collect(),
        }
    }

    pub fn health_score_tone(&self) -> Tone {
        health_score_tone(self.current_health_score())
    }
}

pub fn health_score_tone(score: Option<f64>) -> Tone {
    match score {
        None => Tone::Muted,
        Some(s) if s >= SCORE_SUCCESS => Tone::Success,
        Some(s) if s >= SCORE_WARNING => Tone::Warning,
        Some(_) => Tone::Danger,
    }
}

pub fn trend_tone(trend: Option<f64>) -> Tone {
    match trend {
        Some(t) if t > 0.0 => Tone::Success,
        Some(t) if t < 0.0 => Tone::Danger,
        _ => Tone::Muted,
    }
}

pub fn trend_icon(trend: Option<f64>) -> &'static str {
    match trend {
        None => "",
        Some(t) if t > 0.0 => "bi-arrow-up",
        Some(t) if t < 0.0 => "bi-arrow-down",
        Some(_) => "bi-dash",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Kpi, Language, RepoInfo, NO_SCORE};
    use chrono::TimeZone;

    fn result(name: Option<&str>, score: f64) -> AnalysisResult {
        AnalysisResult {
            health_score: score,
            repo_info: RepoInfo {
                project_name: name.map(str::to_string),
                project_url: Some("https://example.com/repo".to_string()),
                version: Some(format!("1.0.{}", score as i64)),
                repo_languages: vec![
                    Language { name: "Rust".into(), size: 80.0 },
                    Language { name: "Shell".into(), size: 20.0 },
                ],
                ..RepoInfo::default()
            },
            root: Kpi::new("root", "Root", score),
            tools: vec![],
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        }
    }

    fn product_with(scores: &[f64]) -> Product {
        let store = ProductStore::new();
        let mut last = None;
        for s in scores {
            last = Some(store.add_result(result(Some("demo"), *s)));
        }
        last.expect("at least one score")
    }

    #[test]
    fn test_same_name_appends_to_history() {
        let store = ProductStore::new();
        let first = store.add_result(result(Some("alpha"), 70.0));
        let second = store.add_result(result(Some("alpha"), 85.0));
        assert_eq!(store.len(), 1);
        assert_eq!(first.id, second.id);
        assert_eq!(second.results.len(), 2);
        assert_eq!(second.results[1].health_score, 85.0, "History keeps call order");
    }

    #[test]
    fn test_new_product_fields() {
        let store = ProductStore::new();
        let now = Utc.with_ymd_and_hms(2025, 5, 5, 5, 5, 5).unwrap();
        let p = store.add_result_at(result(Some("alpha"), 70.0), now);
        assert_eq!(p.name, "alpha");
        assert_eq!(p.description.as_deref(), Some("Analysis results for alpha"));
        assert_eq!(p.version.as_deref(), Some("1.0.70"));
        assert_eq!(p.created_at, now);
        assert_eq!(p.id, product_id("alpha", "https://example.com/repo"));
    }

    #[test]
    fn test_missing_name_reads_as_not_available() {
        let store = ProductStore::new();
        store.add_result(result(Some("alpha"), 70.0));
        let unnamed = store.add_result(result(None, 50.0));
        assert_eq!(unnamed.name, "N/A");
        let again = store.add_result(result(None, 55.0));
        assert_eq!(again.id, unnamed.id, "Unnamed reports must share one history");
        assert_eq!(again.results.len(), 2);
        let empty = store.add_result(result(Some(""), 50.0));
        assert_eq!(empty.name, "Product 3", "Empty names get a placeholder");
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_unnamed_parsed_reports_share_one_product() {
        let raw = r#"{"resultHierarchy":{"root":{"result":{"score":50}}},"origins":[],"projectInfo":{}}"#;
        let store = ProductStore::new();
        let first = store.add_result(crate::parser::parse_str(raw).expect("report parses"));
        let second = store.add_result(crate::parser::parse_str(raw).expect("report parses"));

        assert_eq!(store.len(), 1, "Both reports belong to the same product");
        assert_eq!(first.id, second.id);
        assert_eq!(second.name, "N/A");
        assert_eq!(second.id, product_id("N/A", "N/A"));
        assert_eq!(second.version.as_deref(), Some("N/A"));
        assert_eq!(second.newest_version(), "N/A");
        assert_eq!(second.project_url(), "N/A");
    }

    #[test]
    fn test_product_id_is_deterministic_across_stores() {
        let a = ProductStore::new().add_result(result(Some("alpha"), 70.0));
        let b = ProductStore::new().add_result(result(Some("alpha"), 10.0));
        assert_eq!(a.id, b.id);
        assert_ne!(product_id("alpha", "x"), product_id("alpha", "y"));
    }

    #[test]
    fn test_product_id_known_value() {
        // "a-" -> 97 * 31 + 45
        assert_eq!(product_id("a", ""), "product-3052");
    }

    #[test]
    fn test_lookup_and_presence() {
        let store = ProductStore::new();
        assert!(!store.has_products());
        let p = store.add_result(result(Some("alpha"), 70.0));
        assert!(store.has_products());
        assert_eq!(store.product_by_id(&p.id).map(|x| x.name), Some("alpha".to_string()));
        assert!(store.product_by_id("product-0").is_none());
    }

    #[test]
    fn test_concurrent_adds_do_not_duplicate() {
        let store = ProductStore::new();
        std::thread::scope(|s| {
            for i in 0..8 {
                let store = &store;
                s.spawn(move || store.add_result(result(Some("shared"), f64::from(i))));
            }
        });
        assert_eq!(store.len(), 1);
        assert_eq!(store.products()[0].results.len(), 8);
    }

    #[test]
    fn test_trend_positive_and_negative() {
        assert_eq!(product_with(&[70.0, 85.0]).health_score_trend(), Some(15.0));
        assert_eq!(product_with(&[85.0, 60.0]).health_score_trend(), Some(-25.0));
        assert_eq!(product_with(&[10.0, 85.0, 60.0]).health_score_trend(), Some(-25.0),
            "Only the last two results count");
    }

    #[test]
    fn test_trend_none_cases() {
        assert_eq!(product_with(&[70.0]).health_score_trend(), None);
        assert_eq!(product_with(&[NO_SCORE, 70.0]).health_score_trend(), None);
        let empty = Product {
            id: "p".into(),
            name: "p".into(),
            description: None,
            version: None,
            created_at: Utc::now(),
            results: vec![],
        };
        assert_eq!(empty.health_score_trend(), None);
        assert_eq!(empty.newest_version(), "Unknown");
        assert_eq!(empty.project_url(), "#");
        assert_eq!(empty.used_languages(), "Unknown");
        assert_eq!(empty.current_health_score(), None);
        assert_eq!(empty.health_score_tone(), Tone::Muted);
    }

    #[test]
    fn test_current_views_read_last_result() {
        let p = product_with(&[40.0, 72.0]);
        assert_eq!(p.newest_version(), "1.0.72");
        assert_eq!(p.current_health_score(), Some(72.0));
        assert_eq!(p.used_languages(), "Rust, Shell");
        assert_eq!(p.project_url(), "https://example.com/repo");
        assert_eq!(p.health_score_tone(), Tone::Success);
    }

    #[test]
    fn test_chart_data_in_history_order() {
        let p = product_with(&[55.0, NO_SCORE, 90.0]);
        let chart = p.health_data_for_chart();
        assert_eq!(chart.labels.len(), 3);
        assert_eq!(chart.data, vec![Some(55.0), None, Some(90.0)]);
    }

    #[test]
    fn test_tones_and_icons() {
        assert_eq!(health_score_tone(Some(70.0)), Tone::Success);
        assert_eq!(health_score_tone(Some(69.9)), Tone::Warning);
        assert_eq!(health_score_tone(Some(50.0)), Tone::Warning);
        assert_eq!(health_score_tone(Some(49.0)), Tone::Danger);

        assert_eq!(trend_tone(Some(15.0)).css_class(), "text-success");
        assert_eq!(trend_tone(Some(-10.0)).css_class(), "text-danger");
        assert_eq!(trend_tone(Some(0.0)).css_class(), "text-muted");
        assert_eq!(trend_tone(None).css_class(), "text-muted");

        assert_eq!(trend_icon(Some(15.0)), "bi-arrow-up");
        assert_eq!(trend_icon(Some(-10.0)), "bi-arrow-down");
        assert_eq!(trend_icon(Some(0.0)), "bi-dash");
        assert_eq!(trend_icon(None), "");
    }
}
