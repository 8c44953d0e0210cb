//! Restores caller order over rows fetched by id.
//!
//! A batch fetch (`WHERE id IN (...)`) returns rows in whatever order the
//! store likes, silently omits unknown ids and may include archived rows.
//! These helpers turn such a result back into exactly the requested items,
//! in request order, or say precisely what went wrong.

use model::records::record::Record;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not find id(s): {}", ids.join(","))]
pub struct NotFound {
    /// Requested ids with no matching row, in request order.
    pub ids: Vec<String>,
}

#[derive(Debug)]
pub struct RowFailure<E> {
    pub id: String,
    pub error: E,
}

#[derive(Debug, Error)]
pub enum BatchError<T, E> {
    #[error(transparent)]
    NotFound(#[from] NotFound),

    /// Some rows could not be mapped; `items` holds the ones that could.
    #[error("failed to map {} of the requested row(s)", failures.len())]
    Partial {
        items: Vec<T>,
        failures: Vec<RowFailure<E>>,
    },
}

/// Fails with every requested id that is absent from `found` when the two
/// counts differ.
pub fn ensure_all_found(found: &[&str], requested: &[String]) -> Result<(), NotFound> {
    if found.len() == requested.len() {
        return Ok(());
    }

    let ids: Vec<String> = requested
        .iter()
        .filter(|id| !found.contains(&id.as_str()))
        .cloned()
        .collect();
    warn!(missing = %ids.join(","), requested = requested.len(), "batch lookup incomplete");

    Err(NotFound { ids })
}

/// Maps fetched rows to items in the order of `ids`.
///
/// Archived rows count as found only when `consider_archived` is set. Every
/// row matching a requested id is mapped; mapping failures are collected and
/// reported together with the items that did map.
pub fn rows_to_items<R, T, E, F>(
    ids: &[String],
    rows: &[R],
    consider_archived: bool,
    mut map: F,
) -> Result<Vec<T>, BatchError<T, E>>
where
    R: Record,
    F: FnMut(&R) -> Result<T, E>,
{
    let found: Vec<&R> = rows
        .iter()
        .filter(|row| consider_archived || !row.is_archived())
        .collect();
    let found_ids: Vec<&str> = found.iter().map(|row| row.id()).collect();
    ensure_all_found(&found_ids, ids)?;

    let mut items = Vec::with_capacity(ids.len());
    let mut failures = Vec::new();
    for id in ids {
        for row in found.iter().filter(|row| row.id() == id.as_str()) {
            match map(row) {
                Ok(item) => items.push(item),
                Err(error) => failures.push(RowFailure {
                    id: id.clone(),
                    error,
                }),
            }
        }
    }

    if !failures.is_empty() {
        warn!(failed = failures.len(), mapped = items.len(), "batch mapping failed");
        return Err(BatchError::Partial { items, failures });
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::{BatchError, NotFound, ensure_all_found, rows_to_items};
    use chrono::{TimeZone, Utc};
    use model::{core::value::Value, records::row::RowData};

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn live(id: &str) -> RowData {
        RowData::from_pairs(
            "notes",
            [("id", Value::from(id)), ("archived_at", Value::Null)],
        )
    }

    fn archived(id: &str) -> RowData {
        let ts = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        RowData::from_pairs(
            "notes",
            [("id", Value::from(id)), ("archived_at", Value::Timestamp(ts))],
        )
    }

    fn id_of(row: &RowData) -> Result<String, String> {
        Ok(row.get_value("id").as_str().unwrap_or_default().to_string())
    }

    #[test]
    fn test_ensure_all_found_names_missing_ids() {
        let err = ensure_all_found(&["b"], &ids(&["a", "b", "c"])).unwrap_err();
        assert_eq!(err.ids, vec!["a", "c"]);
        assert_eq!(err.to_string(), "could not find id(s): a,c");

        assert!(ensure_all_found(&["c", "a"], &ids(&["a", "c"])).is_ok());
    }

    #[test]
    fn test_rows_come_back_in_request_order() {
        let rows = vec![live("c"), live("a"), live("b")];
        let items = rows_to_items(&ids(&["b", "c", "a"]), &rows, false, id_of).unwrap();
        assert_eq!(items, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_archived_rows_are_not_found_unless_considered() {
        let rows = vec![live("a"), archived("b")];

        let err = rows_to_items(&ids(&["a", "b"]), &rows, false, id_of).unwrap_err();
        match err {
            BatchError::NotFound(NotFound { ids }) => assert_eq!(ids, vec!["b"]),
            other => panic!("unexpected error: {other:?}"),
        }

        let items = rows_to_items(&ids(&["b", "a"]), &rows, true, id_of).unwrap();
        assert_eq!(items, vec!["b", "a"]);
    }

    #[test]
    fn test_mapping_failures_are_aggregated() {
        let rows = vec![live("a"), live("b"), live("c")];
        let err = rows_to_items(&ids(&["a", "b", "c"]), &rows, false, |row: &RowData| {
            match row.get_value("id").as_str() {
                Some("b") => Err("b is broken".to_string()),
                Some(id) => Ok(id.to_string()),
                None => Err("no id".to_string()),
            }
        })
        .unwrap_err();

        match err {
            BatchError::Partial { items, failures } => {
                assert_eq!(items, vec!["a", "c"]);
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].id, "b");
                assert_eq!(failures[0].error, "b is broken");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_request() {
        let rows: Vec<RowData> = vec![];
        let items = rows_to_items(&[], &rows, false, id_of).unwrap();
        assert!(items.is_empty());
    }
}
