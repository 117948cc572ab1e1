//! Reads software-product health reports (JSON KPI trees), analyses them
//! against their thresholds, and groups them into products with a history.
//!
//! The pipeline is: [`parser::load_report`] → [`products::ProductStore`] →
//! [`report::DashboardReport`] → one of the [`reporters`].

pub mod analysis;
pub mod config;
pub mod error;
pub mod parser;
pub mod products;
pub mod report;
pub mod reporters;
pub mod types;
pub mod validation;

pub use error::{Result, SphaError};
pub use types::{AnalysisResult, Kpi, Product, RepoInfo, Tool};
