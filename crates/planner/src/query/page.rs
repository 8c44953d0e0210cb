//! Turns the rows of a keyset query into a client-ordered page of ids.

use model::{
    core::value::Value,
    pagination::{
        cursor::{Cursor, CursorError, SortContract},
        page::Page,
    },
    records::row::RowData,
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("row has no '{column}' column")]
    MissingColumn { column: String },

    #[error("id column '{column}' must be a string, got {kind}")]
    InvalidId { column: String, kind: &'static str },

    #[error("build {which} cursor: {source}")]
    Cursor {
        which: &'static str,
        #[source]
        source: CursorError,
    },
}

/// Post-fetch half of a keyset plan. It is bound to the request it was
/// planned for, so it knows whether the rows arrive in native (inverted)
/// order and whether the caller is on the first page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageReconciler {
    pub page_size: usize,
    pub sort_column: String,
    pub id_column: String,
    pub is_backwards: bool,
    pub is_first_page: bool,
    pub contract: SortContract,
}

impl PageReconciler {
    pub fn reconcile(&self, mut rows: Vec<RowData>) -> Result<Page, ReconcileError> {
        // The plan fetches one row past the page; its presence is the only
        // signal that more rows exist beyond this page.
        let has_more = rows.len() > self.page_size;
        rows.truncate(self.page_size);

        let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
            debug!(backwards = self.is_backwards, "empty page");
            return Ok(Page::default());
        };

        let (next_cursor, previous_cursor) = if self.is_backwards {
            // Rows arrived in inverted order: the native first row is the one
            // closest to the anchor, the native last row is furthest from it.
            let native_first = first;
            let native_last = last;

            let next = self.cursor_for(native_first, false, "next")?;
            let previous = if has_more {
                Some(self.cursor_for(native_last, true, "previous")?)
            } else {
                None
            };
            (Some(next), previous)
        } else {
            let next = if has_more {
                Some(self.cursor_for(last, false, "next")?)
            } else {
                None
            };
            let previous = if self.is_first_page {
                None
            } else {
                Some(self.cursor_for(first, true, "previous")?)
            };
            (next, previous)
        };

        if self.is_backwards {
            rows.reverse();
        }

        let ids = rows
            .iter()
            .map(|row| self.row_id(row))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            rows = ids.len(),
            has_more,
            has_next = next_cursor.is_some(),
            has_previous = previous_cursor.is_some(),
            "reconciled page"
        );

        Ok(Page {
            ids,
            next_cursor,
            previous_cursor,
        })
    }

    fn row_id(&self, row: &RowData) -> Result<String, ReconcileError> {
        match row.get_value(&self.id_column) {
            Value::String(id) => Ok(id),
            other => Err(ReconcileError::InvalidId {
                column: self.id_column.clone(),
                kind: other.kind(),
            }),
        }
    }

    fn cursor_for(
        &self,
        row: &RowData,
        is_backwards: bool,
        which: &'static str,
    ) -> Result<Vec<u8>, ReconcileError> {
        let id = self.row_id(row)?;
        let field = row
            .get(&self.sort_column)
            .ok_or_else(|| ReconcileError::MissingColumn {
                column: self.sort_column.clone(),
            })?;
        let value = field.value.clone().unwrap_or(Value::Null);

        Cursor::from_value(id, &value, is_backwards, &self.contract)
            .and_then(|cursor| cursor.encode())
            .map_err(|source| ReconcileError::Cursor { which, source })
    }
}

#[cfg(test)]
mod tests {
    use super::{PageReconciler, ReconcileError};
    use model::{
        core::value::Value,
        pagination::cursor::{Cursor, CursorError, SortContract},
        records::row::RowData,
    };
    use uuid::Uuid;

    fn row(id: &str, seq: i64) -> RowData {
        RowData::from_pairs(
            "notes_live",
            [("id", Value::from(id)), ("seq", Value::Int64(seq))],
        )
    }

    fn rows(seqs: &[i64]) -> Vec<RowData> {
        seqs.iter().map(|s| row(&format!("n_{s}"), *s)).collect()
    }

    fn reconciler(page_size: usize, is_backwards: bool, is_first_page: bool) -> PageReconciler {
        PageReconciler {
            page_size,
            sort_column: "seq".to_string(),
            id_column: "id".to_string(),
            is_backwards,
            is_first_page,
            contract: SortContract::new("seq", false),
        }
    }

    fn decode(bytes: &[u8]) -> Cursor {
        Cursor::decode(bytes).unwrap()
    }

    #[test]
    fn test_first_page_with_more_rows() {
        let page = reconciler(3, false, true)
            .reconcile(rows(&[1, 2, 3, 4]))
            .unwrap();

        assert_eq!(page.ids, vec!["n_1", "n_2", "n_3"]);
        assert!(page.previous_cursor.is_none());

        let next = decode(page.next_cursor_bytes());
        assert_eq!(next.primary_id(), "n_3");
        assert!(next.is_forwards());
        assert_eq!(Value::from(next.order_value().clone()), Value::Int64(3));
    }

    #[test]
    fn test_last_forward_page_has_no_next() {
        let page = reconciler(3, false, false)
            .reconcile(rows(&[7, 8]))
            .unwrap();

        assert_eq!(page.ids, vec!["n_7", "n_8"]);
        assert!(page.next_cursor.is_none());

        let previous = decode(page.previous_cursor_bytes());
        assert_eq!(previous.primary_id(), "n_7");
        assert!(previous.is_backwards());
    }

    #[test]
    fn test_backward_page_restores_client_order() {
        // Native order of a backward scan over an ascending list.
        let page = reconciler(3, true, false)
            .reconcile(rows(&[6, 5, 4, 3]))
            .unwrap();

        assert_eq!(page.ids, vec!["n_4", "n_5", "n_6"]);

        let next = decode(page.next_cursor_bytes());
        assert_eq!(next.primary_id(), "n_6");
        assert!(next.is_forwards());

        let previous = decode(page.previous_cursor_bytes());
        assert_eq!(previous.primary_id(), "n_4");
        assert!(previous.is_backwards());
    }

    #[test]
    fn test_backward_page_reaching_start_has_no_previous() {
        let page = reconciler(3, true, false)
            .reconcile(rows(&[2, 1]))
            .unwrap();

        assert_eq!(page.ids, vec!["n_1", "n_2"]);
        assert!(page.previous_cursor.is_none());
        assert_eq!(decode(page.next_cursor_bytes()).primary_id(), "n_2");
    }

    #[test]
    fn test_empty_page_has_no_cursors() {
        let page = reconciler(3, false, false).reconcile(vec![]).unwrap();
        assert!(page.ids.is_empty());
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_cursors_carry_contract() {
        let page = reconciler(1, false, true)
            .reconcile(rows(&[1, 2]))
            .unwrap();
        let next = decode(page.next_cursor_bytes());

        assert!(next.verify(&SortContract::new("seq", false)).is_ok());
        assert!(next.verify(&SortContract::new("seq", true)).is_err());
    }

    #[test]
    fn test_missing_sort_column() {
        let bare = RowData::from_pairs("notes_live", [("id", Value::from("n_1"))]);
        let err = reconciler(1, false, true)
            .reconcile(vec![bare.clone(), bare])
            .unwrap_err();

        assert!(matches!(err, ReconcileError::MissingColumn { column } if column == "seq"));
    }

    #[test]
    fn test_unsupported_sort_value() {
        let uuid = Uuid::nil();
        let row = RowData::from_pairs(
            "notes_live",
            [("id", Value::from("n_1")), ("seq", Value::Uuid(uuid))],
        );
        let err = reconciler(1, false, false)
            .reconcile(vec![row])
            .unwrap_err();

        match err {
            ReconcileError::Cursor { which, source } => {
                assert_eq!(which, "previous");
                assert!(matches!(
                    source,
                    CursorError::UnsupportedOrderValue { kind: "uuid", .. }
                ));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_string_id() {
        let row = RowData::from_pairs(
            "notes_live",
            [("id", Value::Int64(1)), ("seq", Value::Int64(1))],
        );
        let err = reconciler(5, false, true)
            .reconcile(vec![row])
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "id column 'id' must be a string, got int64"
        );
    }
}
