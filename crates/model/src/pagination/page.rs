/// Parameters of a list request, as decoded from the caller's message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Sort column; `None` or empty selects the default column.
    pub sort_by: Option<String>,
    pub sort_desc: bool,
    /// Page size, already bounded by the caller; `None` selects the default.
    pub per_page: Option<u32>,
    /// Encoded cursor from a previous page; empty means "first page".
    pub cursor: Option<Vec<u8>>,
    /// List the archived rows instead of the live ones.
    pub show_archived: bool,
}

impl PageRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort_by(mut self, column: &str) -> Self {
        self.sort_by = Some(column.to_string());
        self
    }

    pub fn descending(mut self, desc: bool) -> Self {
        self.sort_desc = desc;
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn cursor(mut self, cursor: &[u8]) -> Self {
        self.cursor = Some(cursor.to_vec());
        self
    }

    pub fn show_archived(mut self, show: bool) -> Self {
        self.show_archived = show;
        self
    }

    pub fn sort_column(&self) -> Option<&str> {
        self.sort_by.as_deref().filter(|c| !c.is_empty())
    }

    pub fn cursor_bytes(&self) -> Option<&[u8]> {
        self.cursor.as_deref().filter(|c| !c.is_empty())
    }
}

/// One page of ids in client order, with the cursors to move either way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub ids: Vec<String>,
    pub next_cursor: Option<Vec<u8>>,
    pub previous_cursor: Option<Vec<u8>>,
}

impl Page {
    pub fn has_next(&self) -> bool {
        self.next_cursor.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous_cursor.is_some()
    }

    /// Wire form of the next cursor; empty when there is no next page.
    pub fn next_cursor_bytes(&self) -> &[u8] {
        self.next_cursor.as_deref().unwrap_or_default()
    }

    /// Wire form of the previous cursor; empty when there is no previous page.
    pub fn previous_cursor_bytes(&self) -> &[u8] {
        self.previous_cursor.as_deref().unwrap_or_default()
    }
}

/// Ids to hydrate, in the order the caller wants them back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchRequest {
    pub ids: Vec<String>,
    pub consider_archived: bool,
}

impl BatchRequest {
    pub fn new<I, S>(ids: I, consider_archived: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BatchRequest {
            ids: ids.into_iter().map(Into::into).collect(),
            consider_archived,
        }
    }
}
