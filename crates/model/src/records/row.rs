use crate::core::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    pub name: String,
    pub value: Option<Value>,
}

impl FieldValue {
    pub fn new(name: &str, value: Value) -> Self {
        FieldValue {
            name: name.to_string(),
            value: Some(value),
        }
    }
}

/// A fetched row: the table (or view) it came from and its column values.
#[derive(Debug, Clone, PartialEq)]
pub struct RowData {
    pub table: String,
    pub field_values: Vec<FieldValue>,
}

impl RowData {
    pub fn new(table: &str, field_values: Vec<FieldValue>) -> Self {
        RowData {
            table: table.to_string(),
            field_values,
        }
    }

    /// Builds a row from `(column, value)` pairs.
    pub fn from_pairs<'a>(table: &str, pairs: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        let field_values = pairs
            .into_iter()
            .map(|(name, value)| FieldValue::new(name, value))
            .collect();
        RowData::new(table, field_values)
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.field_values
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(field))
    }

    pub fn get_value(&self, field: &str) -> Value {
        self.get(field)
            .and_then(|f| f.value.clone())
            .unwrap_or(Value::Null)
    }

    /// Keeps only the named columns, in the given order.
    pub fn project(&self, columns: &[String]) -> RowData {
        let field_values = columns
            .iter()
            .map(|name| FieldValue {
                name: name.clone(),
                value: self.get(name).and_then(|f| f.value.clone()),
            })
            .collect();
        RowData::new(&self.table, field_values)
    }
}
