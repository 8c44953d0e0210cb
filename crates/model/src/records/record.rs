use crate::{core::value::Value, records::row::RowData};
use chrono::{DateTime, Utc};

/// A row that can be looked up by id and may be soft-deleted.
pub trait Record {
    fn id(&self) -> &str;

    fn archived_at(&self) -> Option<DateTime<Utc>>;

    fn is_archived(&self) -> bool {
        self.archived_at().is_some()
    }
}

/// Generic rows expose their `id` column (which must hold a string) and
/// their `archived_at` column. A row without a string id resolves to `""`,
/// which never matches a requested id.
impl Record for RowData {
    fn id(&self) -> &str {
        self.get("id")
            .and_then(|f| f.value.as_ref())
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    fn archived_at(&self) -> Option<DateTime<Utc>> {
        self.get("archived_at")
            .and_then(|f| f.value.as_ref())
            .and_then(Value::as_timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::Record;
    use crate::{core::value::Value, records::row::RowData};
    use chrono::Utc;

    #[test]
    fn test_row_data_record() {
        let live = RowData::from_pairs("notes", [("id", Value::from("n_1"))]);
        assert_eq!(live.id(), "n_1");
        assert!(!live.is_archived());

        let archived = RowData::from_pairs(
            "notes",
            [
                ("id", Value::from("n_2")),
                ("archived_at", Value::Timestamp(Utc::now())),
            ],
        );
        assert!(archived.is_archived());

        let null_archived = RowData::from_pairs(
            "notes",
            [("id", Value::from("n_3")), ("archived_at", Value::Null)],
        );
        assert!(!null_archived.is_archived());
    }

    #[test]
    fn test_non_string_id_resolves_empty() {
        let row = RowData::from_pairs("notes", [("id", Value::Int64(1))]);
        assert_eq!(row.id(), "");
    }
}
