use log::warn;
use serde_json::Value;

use super::fields::{extract_score, number, string_list, text};
use crate::types::{Kpi, Threshold, NOT_AVAILABLE, NO_SCORE};

/// Nodes deeper than this keep their own data but lose their children.
pub const MAX_DEPTH: usize = 256;

/// Builds a KPI tree from a raw hierarchy node, depth first, preserving edge order.
pub fn node_to_kpi(node: &Value) -> Kpi {
    build(node, 0)
}

fn build(node: &Value, depth: usize) -> Kpi {
    let meta = node.get("metaInfo");
    let result = node.get("result");

    let children = if depth >= MAX_DEPTH {
        warn!("KPI tree deeper than {MAX_DEPTH} levels; children below are dropped");
        Vec::new()
    } else {
        edge_targets(node).map(|target| build(target, depth + 1)).collect()
    };

    Kpi {
        id: text(node, "typeId")
            .or_else(|| text(node, "id"))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        display_name: meta
            .and_then(|m| text(m, "displayName"))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        score: extract_score(result).unwrap_or(NO_SCORE),
        children,
        thresholds: thresholds(node.get("thresholds")),
        result_type: result.and_then(|r| text(r, "type")),
        description: meta.and_then(|m| text(m, "description")),
        tags: string_list(meta.and_then(|m| m.get("tags")).or_else(|| node.get("tags"))),
    }
}

/// Edges without a `target` object are skipped.
fn edge_targets(node: &Value) -> impl Iterator<Item = &Value> {
    node.get("edges")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|edge| edge.get("target").filter(|t| t.is_object()))
}

fn thresholds(raw: Option<&Value>) -> Option<Vec<Threshold>> {
    let list: Vec<Threshold> = raw?
        .as_array()?
        .iter()
        .map(|t| Threshold {
            name: text(t, "name").unwrap_or_else(|| "unknown".to_string()),
            value: number(t, "value").unwrap_or(0.0),
        })
        .collect();
    if list.is_empty() { None } else { Some(list) }
}
