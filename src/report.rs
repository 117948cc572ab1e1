//! Output-ready view of the registry: one summary per product, built from its
//! current result plus its history.

use chrono::Utc;
use serde::Serialize;

use crate::analysis::severity::{self, Badge, Severity, SeverityReport};
use crate::analysis::threshold::{
    kpi_status_color, kpi_summary_text, kpi_threshold_debug_info, kpis_over_threshold, StatusColor,
};
use crate::products::{trend_icon, trend_tone, HealthChartData, Tone};
use crate::types::{Kpi, Product, RepoInfo};
use crate::validation::ValidationIssue;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    pub generated_at: String,
    pub default_threshold: f64,
    pub report_count: usize,
    pub product_count: usize,
    /// Files that could not be read, decoded, or recognised as reports.
    pub skipped: Vec<SkippedFile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

/// One top-level KPI measured against its effective threshold.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiRow {
    pub id: String,
    pub display_name: String,
    /// `None` when the report had no data for this KPI.
    pub score: Option<f64>,
    pub effective_threshold: f64,
    pub uses_default: bool,
    pub above_threshold: bool,
    pub badge: Badge,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityRow {
    pub id: String,
    pub display_name: String,
    pub score: f64,
    pub severity: Severity,
    pub lowest_threshold: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolRow {
    pub name: String,
    pub description: String,
    pub findings: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub version: String,
    pub project_url: String,
    pub languages: String,
    pub result_count: usize,
    pub repo_info: Option<RepoInfo>,
    pub health_score: Option<f64>,
    pub health_tone: Tone,
    pub trend: Option<f64>,
    pub trend_tone: Tone,
    pub trend_icon: &'static str,
    pub summary: String,
    pub kpis_above: usize,
    pub kpis_total: usize,
    pub percentage: u32,
    pub status_color: StatusColor,
    pub kpis: Vec<KpiRow>,
    pub critical_count: usize,
    pub warning_count: usize,
    /// Worst first, limited to the configured `top`.
    pub severity: Vec<SeverityRow>,
    pub tools: Vec<ToolRow>,
    pub chart: HealthChartData,
    pub issues: Vec<ValidationIssue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub meta: ReportMeta,
    pub products: Vec<ProductSummary>,
}

impl DashboardReport {
    pub fn new(
        products: &[Product],
        default_threshold: f64,
        top: usize,
        skipped: Vec<SkippedFile>,
    ) -> Self {
        DashboardReport {
            meta: ReportMeta {
                generated_at: Utc::now().to_rfc3339(),
                default_threshold,
                report_count: products.iter().map(|p| p.results.len()).sum(),
                product_count: products.len(),
                skipped,
            },
            products: products
                .iter()
                .map(|p| summarize_product(p, default_threshold, top))
                .collect(),
        }
    }

    pub fn issue_count(&self) -> usize {
        self.products.iter().map(|p| p.issues.len()).sum()
    }
}

pub fn summarize_product(product: &Product, default_threshold: f64, top: usize) -> ProductSummary {
    let trend = product.health_score_trend();
    let current = product.current();

    let mut summary = ProductSummary {
        id: product.id.clone(),
        name: product.name.clone(),
        description: product.description.clone(),
        version: product.newest_version().to_string(),
        project_url: product.project_url().to_string(),
        languages: product.used_languages(),
        result_count: product.results.len(),
        repo_info: current.map(|r| r.repo_info.clone()),
        health_score: product.current_health_score(),
        health_tone: product.health_score_tone(),
        trend,
        trend_tone: trend_tone(trend),
        trend_icon: trend_icon(trend),
        summary: "No KPIs available for analysis.".to_string(),
        kpis_above: 0,
        kpis_total: 0,
        percentage: 0,
        status_color: kpi_status_color(0),
        kpis: Vec::new(),
        critical_count: 0,
        warning_count: 0,
        severity: Vec::new(),
        tools: Vec::new(),
        chart: product.health_data_for_chart(),
        issues: Vec::new(),
    };

    let Some(result) = current else { return summary };

    let analysis = kpis_over_threshold(&result.root, default_threshold);
    summary.summary = kpi_summary_text(&analysis);
    summary.kpis_above = analysis.kpis_above_threshold;
    summary.kpis_total = analysis.total_kpis;
    summary.percentage = analysis.percentage;
    summary.status_color = kpi_status_color(analysis.percentage);

    summary.kpis = kpi_threshold_debug_info(&result.root, default_threshold)
        .into_iter()
        .zip(&result.root.children)
        .map(|(info, kpi)| KpiRow {
            id: info.id.to_string(),
            display_name: info.display_name.to_string(),
            score: kpi.has_score().then_some(info.score),
            effective_threshold: info.effective_threshold,
            uses_default: info.uses_default,
            above_threshold: info.is_above_threshold,
            badge: severity::badge(kpi),
        })
        .collect();

    let severity_report = SeverityReport::from_root(&result.root);
    summary.critical_count = severity_report.critical_kpis.len();
    summary.warning_count = severity_report.warning_kpis.len();
    summary.severity = severity_report
        .sorted_kpis_by_severity
        .iter()
        .filter_map(|kpi| severity_row(kpi))
        .take(top)
        .collect();

    summary.tools = result
        .tools
        .iter()
        .map(|t| ToolRow {
            name: t.name.clone(),
            description: t.description.clone(),
            findings: t.finding_count(),
        })
        .collect();

    summary.issues = crate::validation::validate_result(result);
    summary
}

fn severity_row(kpi: &Kpi) -> Option<SeverityRow> {
    Some(SeverityRow {
        id: kpi.id.clone(),
        display_name: kpi.display_name.clone(),
        score: kpi.score,
        severity: severity::severity_of(kpi)?,
        lowest_threshold: severity::lowest_threshold(kpi),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::ProductStore;
    use crate::types::{AnalysisResult, Findings, Threshold, Tool, NO_SCORE};

    fn sample_result(score: f64) -> AnalysisResult {
        let leaf = |id: &str, s: f64| Kpi::new(id, id, s);
        AnalysisResult {
            health_score: score,
            repo_info: RepoInfo { project_name: Some("demo".into()), ..RepoInfo::default() },
            root: Kpi::new("root", "Root", score).with_children(vec![
                Kpi::new("quality", "Quality", 78.0)
                    .with_thresholds(vec![Threshold { name: "min".into(), value: 60.0 }])
                    .with_children(vec![leaf("complexity", 82.0)]),
                Kpi::new("security", "Security", 12.0).with_children(vec![leaf("vulns", 5.0)]),
                Kpi::new("docs", "Docs", 45.0).with_children(vec![leaf("readme", 45.0)]),
                leaf("perf", NO_SCORE),
            ]),
            tools: vec![Tool {
                name: "OSV".into(),
                scan_date: None,
                findings: Findings::Count(4),
                description: "scanner".into(),
            }],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_reflects_current_result() {
        let store = ProductStore::new();
        store.add_result(sample_result(60.0));
        store.add_result(sample_result(66.0));
        let report = DashboardReport::new(&store.products(), 60.0, 10, vec![]);

        assert_eq!(report.meta.report_count, 2);
        assert_eq!(report.meta.product_count, 1);
        let p = &report.products[0];
        assert_eq!(p.health_score, Some(66.0));
        assert_eq!(p.trend, Some(6.0));
        assert_eq!(p.trend_icon, "bi-arrow-up");
        assert_eq!(p.kpis_total, 4);
        assert_eq!(p.kpis_above, 1);
        assert_eq!(p.percentage, 25);
        assert_eq!(p.kpis[3].score, None, "No-data KPI shows as missing");
        assert_eq!(p.critical_count, 1);
        assert_eq!(p.warning_count, 1);
        let order: Vec<&str> = p.severity.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, vec!["security", "docs"]);
        assert_eq!(p.tools[0].findings, 4);
        assert_eq!(p.chart.data.len(), 2);
    }

    #[test]
    fn test_top_limits_severity_rows() {
        let store = ProductStore::new();
        store.add_result(sample_result(60.0));
        let report = DashboardReport::new(&store.products(), 60.0, 1, vec![]);
        assert_eq!(report.products[0].severity.len(), 1);
        assert_eq!(report.products[0].critical_count, 1, "Counts are not truncated");
        assert_eq!(report.products[0].severity[0].id, "security", "Worst row is kept");
    }

    #[test]
    fn test_top_counts_produced_rows() {
        let store = ProductStore::new();
        store.add_result(sample_result(60.0));
        let p = &DashboardReport::new(&store.products(), 60.0, 2, vec![]).products[0];
        assert_eq!(p.severity.len(), 2, "Both classified KPIs fit within top = 2");
        assert_eq!(p.severity[1].severity, Severity::Warning);

        let wide = &DashboardReport::new(&store.products(), 60.0, 50, vec![]).products[0];
        assert_eq!(wide.severity.len(), p.critical_count + p.warning_count,
            "A large top yields every classified KPI and nothing more");
    }

    #[test]
    fn test_report_serializes() {
        let store = ProductStore::new();
        store.add_result(sample_result(60.0));
        let report = DashboardReport::new(&store.products(), 60.0, 10, vec![SkippedFile {
            path: "bad.json".into(),
            reason: "not JSON".into(),
        }]);
        let json = serde_json::to_value(&report).expect("report must serialize");
        assert_eq!(json["meta"]["skipped"][0]["path"], "bad.json");
        assert_eq!(json["products"][0]["severity"][0]["severity"], "critical");
        assert_eq!(json["products"][0]["statusColor"], "danger");
    }
}
