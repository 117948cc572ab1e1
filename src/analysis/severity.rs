use std::cmp::Ordering;

use serde::Serialize;

use crate::types::Kpi;

// Bounds used when a KPI has no thresholds of its own.
const DEFAULT_CRITICAL_BOUND: f64 = 20.0;
const DEFAULT_WARNING_BOUND:  f64 = 50.0;
// Offset from the lowest threshold in either direction.
const BAND_OFFSET: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "CRITICAL"),
            Severity::Warning  => write!(f, "WARNING"),
        }
    }
}

/// Per-KPI badge shown next to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Badge {
    NoData,
    Danger,
    Warning,
    Success,
}

impl Badge {
    pub fn css_class(self) -> &'static str {
        match self {
            Badge::NoData  => "bg-secondary",
            Badge::Danger  => "bg-danger",
            Badge::Warning => "bg-warning",
            Badge::Success => "bg-success",
        }
    }
}

/// Every node of the tree, root first, depth first, children in order.
pub fn all_kpis(root: &Kpi) -> Vec<&Kpi> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(kpi) = stack.pop() {
        out.push(kpi);
        stack.extend(kpi.children.iter().rev());
    }
    out
}

pub fn lowest_threshold(kpi: &Kpi) -> Option<f64> {
    kpi.threshold_list().iter().map(|t| t.value).reduce(f64::min)
}

pub fn critical_bound(kpi: &Kpi) -> f64 {
    lowest_threshold(kpi).map_or(DEFAULT_CRITICAL_BOUND, |t| t - BAND_OFFSET)
}

pub fn warning_bound(kpi: &Kpi) -> f64 {
    lowest_threshold(kpi).map_or(DEFAULT_WARNING_BOUND, |t| t + BAND_OFFSET)
}

pub fn is_critical_kpi(kpi: &Kpi) -> bool {
    kpi.has_score() && kpi.score < critical_bound(kpi)
}

pub fn is_warning_kpi(kpi: &Kpi) -> bool {
    kpi.has_score() && kpi.score >= critical_bound(kpi) && kpi.score < warning_bound(kpi)
}

pub fn has_critical_or_warning_value(kpi: &Kpi) -> bool {
    kpi.has_score() && kpi.score < warning_bound(kpi)
}

pub fn severity_of(kpi: &Kpi) -> Option<Severity> {
    if is_critical_kpi(kpi) { Some(Severity::Critical) }
    else if is_warning_kpi(kpi) { Some(Severity::Warning) }
    else { None }
}

pub fn badge(kpi: &Kpi) -> Badge {
    if !kpi.has_score() { Badge::NoData }
    else if kpi.score < critical_bound(kpi) { Badge::Danger }
    else if kpi.score < warning_bound(kpi) { Badge::Warning }
    else { Badge::Success }
}

/// Scored KPIs first, then those without data; order is otherwise kept.
pub fn sort_children(children: &[Kpi]) -> Vec<&Kpi> {
    let (scored, no_data): (Vec<&Kpi>, Vec<&Kpi>) = children.iter().partition(|k| k.has_score());
    scored.into_iter().chain(no_data).collect()
}

/// Critical/warning classification of a whole tree.
///
/// Only aggregate nodes (with children) are classified, and the root is
/// always excluded: low leaves are raw measurements and would drown the
/// report in noise. Critical membership is decided first; warnings are taken
/// only from the nodes not already critical.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityReport<'a> {
    #[serde(skip)]
    pub all_kpis: Vec<&'a Kpi>,
    #[serde(skip)]
    pub non_leaf_kpis: Vec<&'a Kpi>,
    pub critical_kpis: Vec<&'a Kpi>,
    pub warning_kpis: Vec<&'a Kpi>,
    pub critical_and_low_kpis: Vec<&'a Kpi>,
    pub sorted_kpis_by_severity: Vec<&'a Kpi>,
}

impl<'a> SeverityReport<'a> {
    pub fn from_root(root: &'a Kpi) -> Self {
        let all_kpis = all_kpis(root);
        let non_leaf_kpis: Vec<&Kpi> = all_kpis.iter().copied().filter(|k| !k.is_leaf()).collect();
        let eligible = || {
            non_leaf_kpis
                .iter()
                .copied()
                .filter(move |k| !std::ptr::eq(*k, root))
        };

        let critical_kpis: Vec<&Kpi> = eligible().filter(|k| is_critical_kpi(k)).collect();
        let warning_kpis: Vec<&Kpi> = eligible()
            .filter(|k| !critical_kpis.iter().any(|c| std::ptr::eq(*c, *k)))
            .filter(|k| is_warning_kpi(k))
            .collect();
        let critical_and_low_kpis: Vec<&Kpi> =
            eligible().filter(|k| has_critical_or_warning_value(k)).collect();

        let mut sorted_kpis_by_severity = critical_and_low_kpis.clone();
        sorted_kpis_by_severity.sort_by(|a, b| by_severity(a, b));

        SeverityReport {
            all_kpis,
            non_leaf_kpis,
            critical_kpis,
            warning_kpis,
            critical_and_low_kpis,
            sorted_kpis_by_severity,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.critical_and_low_kpis.is_empty()
    }
}

/// Critical before warning, then ascending score (worst first).
fn by_severity(a: &Kpi, b: &Kpi) -> Ordering {
    match (is_critical_kpi(a), is_critical_kpi(b)) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.score.total_cmp(&b.score),
    }
}
