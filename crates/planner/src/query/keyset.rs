//! Plans one page of a keyset-paginated list.
//!
//! A page is read with a single query shape: order by the sort column with
//! the id as tie-break, filter strictly past the cursor's anchor with a
//! row-value comparison, and fetch one sentinel row beyond the page. A
//! backward cursor is served by inverting the scan direction; the matching
//! [`PageReconciler`] restores the client's order afterwards.

use crate::query::{
    ast::{common::OrderDir, expr::BinaryOperator, expr::Expr, select::Select},
    binary,
    builder::select::SelectBuilder,
    dialect::Dialect,
    ident,
    page::PageReconciler,
    renderer::render_sql,
    value,
};
use crate::table_ref;
use model::{
    core::value::Value,
    pagination::{
        cursor::{Cursor, CursorError, SortContract},
        page::PageRequest,
    },
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid cursor: {0}")]
    InvalidCursor(#[from] CursorError),

    #[error("sorting by '{column}' is not supported for '{table}'")]
    UnsupportedSortColumn { column: String, table: String },
}

/// Per-entity inputs that are not part of the request itself.
#[derive(Debug, Clone, Copy)]
pub struct PlanParams<'a> {
    pub table: &'a str,
    pub default_sort_column: &'a str,
    pub default_page_size: u32,
    /// Columns the caller may sort by; `None` accepts any column.
    pub sortable_columns: Option<&'a [String]>,
    pub id_column: &'a str,
}

#[derive(Debug, Clone)]
pub struct KeysetPlan {
    pub select: Select,
    pub reconciler: PageReconciler,
}

impl KeysetPlan {
    pub fn build(request: &PageRequest, params: &PlanParams) -> Result<Self, PlanError> {
        // Only a column the client named is checked; the default always applies.
        if let (Some(requested), Some(allowed)) = (request.sort_column(), params.sortable_columns)
            && !allowed.iter().any(|c| c == requested)
        {
            return Err(PlanError::UnsupportedSortColumn {
                column: requested.to_string(),
                table: params.table.to_string(),
            });
        }
        let sort_column = request
            .sort_column()
            .unwrap_or(params.default_sort_column);

        let page_size = request
            .per_page
            .filter(|&n| n > 0)
            .unwrap_or(params.default_page_size) as usize;

        let contract = SortContract::new(sort_column, request.sort_desc);
        let cursor = match request.cursor_bytes() {
            Some(bytes) => {
                let cursor = Cursor::decode(bytes)?;
                cursor.verify(&contract)?;
                Some(cursor)
            }
            None => None,
        };

        let is_backwards = cursor.as_ref().is_some_and(Cursor::is_backwards);
        let descending = request.sort_desc != is_backwards;
        let direction = OrderDir::from_desc(descending);

        let row_set = if request.show_archived {
            format!("{}_archived", params.table)
        } else {
            format!("{}_live", params.table)
        };

        let mut columns = vec![ident(params.id_column)];
        if sort_column != params.id_column {
            columns.push(ident(sort_column));
        }

        let mut builder = SelectBuilder::new()
            .select(columns)
            .from(table_ref!(row_set), None);

        if let Some(cursor) = &cursor {
            let op = if descending {
                BinaryOperator::Lt
            } else {
                BinaryOperator::Gt
            };
            builder = builder.and_where(binary(
                Expr::Tuple(vec![ident(sort_column), ident(params.id_column)]),
                op,
                Expr::Tuple(vec![
                    value(Value::from(cursor.order_value().clone())),
                    value(Value::from(cursor.primary_id())),
                ]),
            ));
        }

        let select = builder
            .order_by(ident(sort_column), Some(direction))
            .order_by(ident(params.id_column), Some(direction))
            .limit(value(Value::Uint64(page_size as u64 + 1)))
            .build();

        debug!(
            table = %row_set,
            column = sort_column,
            descending,
            backwards = is_backwards,
            page_size,
            has_cursor = cursor.is_some(),
            "planned keyset page"
        );

        Ok(KeysetPlan {
            select,
            reconciler: PageReconciler {
                page_size,
                sort_column: sort_column.to_string(),
                id_column: params.id_column.to_string(),
                is_backwards,
                is_first_page: cursor.is_none(),
                contract,
            },
        })
    }

    /// Renders the page query for a concrete database.
    pub fn to_sql(&self, dialect: &dyn Dialect) -> (String, Vec<Value>) {
        render_sql(&self.select, dialect)
    }
}
