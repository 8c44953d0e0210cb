use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const DEFAULT_SORTING_COLUMNS: [&str; 2] = ["created_at", "updated_at"];

/// Pagination behaviour shared by every listable entity, plus per-entity
/// overrides keyed by entity name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
    /// Column used when a request does not name one
    pub default_sort_column: String,
    /// Page size used when a request does not set one
    pub default_page_size: u32,
    /// Upper bound applied to requested page sizes
    pub max_page_size: u32,
    /// Tie-break column, unique per row
    pub id_column: String,
    pub entities: HashMap<String, EntitySettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntitySettings {
    /// Backing table; the entity name when unset.
    pub table: Option<String>,
    /// Columns a list request may sort by. Empty means the standard
    /// timestamp columns.
    pub sorting_column_names: Vec<String>,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_sort_column: "created_at".to_string(),
            default_page_size: 100,
            max_page_size: 100,
            id_column: "id".to_string(),
            entities: HashMap::new(),
        }
    }
}

impl PaginationSettings {
    pub fn from_json(raw: &str) -> Result<Self, SettingsError> {
        let settings: PaginationSettings = serde_json::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.default_page_size == 0 || self.max_page_size == 0 {
            return Err(SettingsError::ZeroPageSize);
        }
        if self.default_page_size > self.max_page_size {
            return Err(SettingsError::PageSizeOverMax {
                page_size: self.default_page_size,
                max: self.max_page_size,
            });
        }
        if self.default_sort_column.is_empty() {
            return Err(SettingsError::EmptyColumnName("default_sort_column".into()));
        }
        if self.id_column.is_empty() {
            return Err(SettingsError::EmptyColumnName("id_column".into()));
        }
        for (name, entity) in &self.entities {
            if entity.sorting_column_names.iter().any(String::is_empty) {
                return Err(SettingsError::EmptyColumnName(format!(
                    "entities.{name}.sorting_column_names"
                )));
            }
        }
        Ok(())
    }

    pub fn table_for<'a>(&'a self, entity: &'a str) -> &'a str {
        self.entities
            .get(entity)
            .and_then(|e| e.table.as_deref())
            .unwrap_or(entity)
    }

    pub fn sorting_columns(&self, entity: &str) -> Vec<String> {
        match self.entities.get(entity) {
            Some(e) if !e.sorting_column_names.is_empty() => e.sorting_column_names.clone(),
            _ => DEFAULT_SORTING_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Requested page size bounded by `max_page_size`. Zero or unset selects
    /// the default.
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        match requested {
            Some(n) if n > 0 => n.min(self.max_page_size),
            _ => self.default_page_size,
        }
    }
}
