//! Cursor paging over an in-memory list, shaped like the real API's
//! `{"items": [...], "paging": {"cursors": {...}}}` envelope.

use std::collections::HashMap;

use serde_json::{json, Map, Value};

use crate::Failure;

fn cursor(pos: usize) -> String {
    format!("pos:{pos}")
}

fn parse_cursor(raw: &str) -> Result<usize, Failure> {
    raw.strip_prefix("pos:")
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| Failure::bad_request("invalid paging cursor"))
}

/// Slice `items` according to `limit` / `after` / `before` query params.
pub fn page(items: &[Value], params: &HashMap<String, String>) -> Result<Value, Failure> {
    let after = params.get("after");
    let before = params.get("before");
    if after.is_some() && before.is_some() {
        return Err(Failure::bad_request("only one of 'after' or 'before' allowed"));
    }
    let limit = match params.get("limit") {
        Some(raw) => raw
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| Failure::bad_request("invalid limit"))?,
        None => items.len().max(1),
    };

    let (start, end) = match (after, before) {
        (Some(a), _) => {
            let start = parse_cursor(a)?.min(items.len());
            (start, start.saturating_add(limit).min(items.len()))
        }
        (_, Some(b)) => {
            let end = parse_cursor(b)?.min(items.len());
            (end.saturating_sub(limit), end)
        }
        _ => (0, limit.min(items.len())),
    };

    let mut cursors = Map::new();
    if start > 0 {
        cursors.insert("before".to_string(), Value::String(cursor(start)));
    }
    if end < items.len() {
        cursors.insert("after".to_string(), Value::String(cursor(end)));
    }

    Ok(json!({
        "items": items[start..end].to_vec(),
        "paging": { "cursors": cursors },
    }))
}
