//! Pure analytics over a parsed KPI tree.
//!
//! [`threshold`] looks only at the root's direct children and answers "how
//! many top-level KPIs meet their cutoff"; [`severity`] walks the whole tree
//! and picks out aggregate KPIs that are critical or close to it.

pub mod severity;
pub mod threshold;

pub use severity::{Badge, Severity, SeverityReport};
pub use threshold::{StatusColor, ThresholdAnalysis, ThresholdDebugInfo, DEFAULT_THRESHOLD};
