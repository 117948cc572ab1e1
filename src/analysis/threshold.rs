use serde::Serialize;

use crate::types::{Kpi, Threshold};

/// Cutoff applied to KPIs that carry no thresholds of their own.
pub const DEFAULT_THRESHOLD: f64 = 60.0;

const STATUS_EXCELLENT: u32 = 80;
const STATUS_GOOD:      u32 = 60;
const STATUS_ATTENTION: u32 = 40;

const NUMBER_WORDS: [&str; 11] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
];

/// Partition of a root's direct children around their effective thresholds.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdAnalysis<'a> {
    pub total_kpis: usize,
    pub kpis_above_threshold: usize,
    pub kpis_below_threshold: usize,
    pub kpis_above: Vec<&'a Kpi>,
    pub kpis_below: Vec<&'a Kpi>,
    /// `round(above / total * 100)`, 0 when there are no KPIs.
    pub percentage: u32,
}

/// Per-child view of how the threshold decision was made.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdDebugInfo<'a> {
    pub id: &'a str,
    pub display_name: &'a str,
    pub score: f64,
    pub effective_threshold: f64,
    pub available_thresholds: &'a [Threshold],
    pub is_above_threshold: bool,
    pub uses_default: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Success,
    Primary,
    Warning,
    Danger,
}

impl StatusColor {
    pub fn css_class(self) -> &'static str {
        match self {
            StatusColor::Success => "text-success",
            StatusColor::Primary => "text-primary",
            StatusColor::Warning => "text-warning",
            StatusColor::Danger  => "text-danger",
        }
    }
}

/// The smallest explicit threshold, or `default` when the KPI has none.
pub fn kpi_threshold(kpi: &Kpi, default: f64) -> f64 {
    kpi.threshold_list()
        .iter()
        .map(|t| t.value)
        .reduce(f64::min)
        .unwrap_or(default)
}

/// Splits the direct children of `root` (never the root itself, never
/// grandchildren) into those at or above their threshold and those below.
pub fn kpis_over_threshold(root: &Kpi, default: f64) -> ThresholdAnalysis<'_> {
    let (kpis_above, kpis_below): (Vec<&Kpi>, Vec<&Kpi>) = root
        .children
        .iter()
        .partition(|kpi| kpi.score >= kpi_threshold(kpi, default));

    let total = root.children.len();
    let percentage = if total > 0 {
        (kpis_above.len() as f64 / total as f64 * 100.0).round() as u32
    } else {
        0
    };

    ThresholdAnalysis {
        total_kpis: total,
        kpis_above_threshold: kpis_above.len(),
        kpis_below_threshold: kpis_below.len(),
        kpis_above,
        kpis_below,
        percentage,
    }
}

/// One-sentence dashboard summary of a [`ThresholdAnalysis`].
pub fn kpi_summary_text(analysis: &ThresholdAnalysis<'_>) -> String {
    if analysis.total_kpis == 0 {
        return "No KPIs available for analysis.".to_string();
    }

    let above = capitalize(&number_text(analysis.kpis_above_threshold));
    let total = number_text(analysis.total_kpis);
    let plural = if analysis.total_kpis == 1 { "KPI is" } else { "KPIs are" };

    let status = if analysis.percentage >= STATUS_EXCELLENT {
        "The project is in excellent shape."
    } else if analysis.percentage >= STATUS_GOOD {
        "The project is in good shape."
    } else if analysis.percentage >= STATUS_ATTENTION {
        "The project needs some attention."
    } else {
        "The project requires immediate attention."
    };

    format!("{above} out of {total} {plural} above the threshold. {status} Click Details below to see more.")
}

pub fn kpi_status_color(percentage: u32) -> StatusColor {
    if percentage >= STATUS_EXCELLENT { StatusColor::Success }
    else if percentage >= STATUS_GOOD { StatusColor::Primary }
    else if percentage >= STATUS_ATTENTION { StatusColor::Warning }
    else { StatusColor::Danger }
}

/// Derived from [`kpi_threshold`] exactly as [`kpis_over_threshold`] is, so
/// the two never disagree.
pub fn kpi_threshold_debug_info(root: &Kpi, default: f64) -> Vec<ThresholdDebugInfo<'_>> {
    root.children
        .iter()
        .map(|kpi| {
            let effective_threshold = kpi_threshold(kpi, default);
            ThresholdDebugInfo {
                id: &kpi.id,
                display_name: &kpi.display_name,
                score: kpi.score,
                effective_threshold,
                available_thresholds: kpi.threshold_list(),
                is_above_threshold: kpi.score >= effective_threshold,
                uses_default: kpi.thresholds.is_none(),
            }
        })
        .collect()
}

fn number_text(n: usize) -> String {
    NUMBER_WORDS.get(n).map_or_else(|| n.to_string(), |w| (*w).to_string())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
