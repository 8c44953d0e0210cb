//! An in-memory relational store that executes planned `Select` ASTs.
//!
//! Each base table is exposed through two row-sets, `<table>_live` and
//! `<table>_archived`, split on the `archived_at` column the same way the
//! production views are.

use async_trait::async_trait;
use engine_core::list::RowSource;
use model::{core::value::Value, records::record::Record, records::row::RowData};
use planner::query::ast::{
    common::OrderDir,
    expr::{BinaryOperator, Expr},
    select::Select,
};
use std::{cmp::Ordering, collections::HashMap};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("query has no FROM clause")]
    MissingFrom,

    #[error("cannot compare {left} with {right}")]
    Incomparable { left: String, right: String },

    #[error("unsupported expression: {0}")]
    Unsupported(String),
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    tables: HashMap<String, Vec<RowData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: &str, row: RowData) {
        self.tables.entry(table.to_string()).or_default().push(row);
    }

    pub fn with_rows(table: &str, rows: impl IntoIterator<Item = RowData>) -> Self {
        let mut store = Self::new();
        store.tables.entry(table.to_string()).or_default();
        for row in rows {
            store.insert(table, row);
        }
        store
    }

    fn row_set(&self, name: &str) -> Result<Vec<&RowData>, MemoryError> {
        let (base, archived) = if let Some(base) = name.strip_suffix("_live") {
            (base, false)
        } else if let Some(base) = name.strip_suffix("_archived") {
            (base, true)
        } else {
            return Err(MemoryError::UnknownTable(name.to_string()));
        };

        let rows = self
            .tables
            .get(base)
            .ok_or_else(|| MemoryError::UnknownTable(name.to_string()))?;
        Ok(rows.iter().filter(|r| r.is_archived() == archived).collect())
    }

    /// Runs a query: row-set, filter, order, limit, then projection.
    pub fn execute(&self, select: &Select) -> Result<Vec<RowData>, MemoryError> {
        let from = select.from.as_ref().ok_or(MemoryError::MissingFrom)?;
        let mut rows = Vec::new();
        for row in self.row_set(&from.table.name)? {
            let keep = match &select.where_clause {
                Some(cond) => eval_condition(cond, row)?,
                None => true,
            };
            if keep {
                rows.push(row.clone());
            }
        }

        let mut failure = None;
        rows.sort_by(|a, b| {
            for order in &select.order_by {
                let (left, right) = match (eval_scalar(&order.expr, a), eval_scalar(&order.expr, b)) {
                    (Ok(l), Ok(r)) => (l, r),
                    (Err(e), _) | (_, Err(e)) => {
                        failure.get_or_insert(e);
                        return Ordering::Equal;
                    }
                };
                let ord = match compare(&left, &right) {
                    Ok(ord) => ord,
                    Err(e) => {
                        failure.get_or_insert(e);
                        return Ordering::Equal;
                    }
                };
                let ord = match order.direction {
                    Some(OrderDir::Desc) => ord.reverse(),
                    _ => ord,
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
        if let Some(e) = failure {
            return Err(e);
        }

        if let Some(limit) = &select.limit {
            rows.truncate(limit_of(limit)?);
        }

        let columns = select
            .columns
            .iter()
            .map(|c| match c {
                Expr::Identifier(ident) => Ok(ident.name.clone()),
                other => Err(MemoryError::Unsupported(format!("{other:?}"))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows.iter().map(|r| r.project(&columns)).collect())
    }
}

#[async_trait]
impl RowSource for MemoryStore {
    type Error = MemoryError;

    async fn fetch_page(&self, select: &Select) -> Result<Vec<RowData>, Self::Error> {
        self.execute(select)
    }

    /// Returns matches in reverse storage order so callers cannot rely on
    /// fetch order.
    async fn fetch_by_ids(
        &self,
        table: &str,
        ids: &[String],
        archived: bool,
    ) -> Result<Vec<RowData>, Self::Error> {
        let rows = self
            .tables
            .get(table)
            .ok_or_else(|| MemoryError::UnknownTable(table.to_string()))?;
        Ok(rows
            .iter()
            .rev()
            .filter(|r| archived || !r.is_archived())
            .filter(|r| ids.iter().any(|id| id == r.id()))
            .cloned()
            .collect())
    }
}

fn limit_of(expr: &Expr) -> Result<usize, MemoryError> {
    match expr {
        Expr::Value(Value::Uint64(n)) => Ok(*n as usize),
        Expr::Value(Value::Int64(n)) if *n >= 0 => Ok(*n as usize),
        other => Err(MemoryError::Unsupported(format!("LIMIT {other:?}"))),
    }
}

fn eval_scalar(expr: &Expr, row: &RowData) -> Result<Value, MemoryError> {
    match expr {
        Expr::Identifier(ident) => Ok(row.get_value(&ident.name)),
        Expr::Value(v) => Ok(v.clone()),
        other => Err(MemoryError::Unsupported(format!("{other:?}"))),
    }
}

/// Evaluates both sides of a comparison; tuples become row values.
fn eval_row_value(expr: &Expr, row: &RowData) -> Result<Vec<Value>, MemoryError> {
    match expr {
        Expr::Tuple(items) => items.iter().map(|e| eval_scalar(e, row)).collect(),
        other => Ok(vec![eval_scalar(other, row)?]),
    }
}

fn compare(left: &Value, right: &Value) -> Result<Ordering, MemoryError> {
    left.compare(right).ok_or_else(|| MemoryError::Incomparable {
        left: left.to_string(),
        right: right.to_string(),
    })
}

/// Row values compare lexicographically, as in SQL.
fn compare_rows(left: &[Value], right: &[Value]) -> Result<Ordering, MemoryError> {
    if left.len() != right.len() {
        return Err(MemoryError::Unsupported(format!(
            "row values of arity {} and {}",
            left.len(),
            right.len()
        )));
    }
    for (l, r) in left.iter().zip(right) {
        let ord = compare(l, r)?;
        if ord != Ordering::Equal {
            return Ok(ord);
        }
    }
    Ok(Ordering::Equal)
}

fn eval_condition(expr: &Expr, row: &RowData) -> Result<bool, MemoryError> {
    let Expr::BinaryOp(op) = expr else {
        return Err(MemoryError::Unsupported(format!("condition {expr:?}")));
    };

    match op.op {
        BinaryOperator::And => Ok(eval_condition(&op.left, row)? && eval_condition(&op.right, row)?),
        BinaryOperator::Or => Ok(eval_condition(&op.left, row)? || eval_condition(&op.right, row)?),
        cmp => {
            let left = eval_row_value(&op.left, row)?;
            let right = eval_row_value(&op.right, row)?;
            let ord = compare_rows(&left, &right)?;
            Ok(match cmp {
                BinaryOperator::Eq => ord == Ordering::Equal,
                BinaryOperator::NotEq => ord != Ordering::Equal,
                BinaryOperator::Lt => ord == Ordering::Less,
                BinaryOperator::LtEq => ord != Ordering::Greater,
                BinaryOperator::Gt => ord == Ordering::Greater,
                BinaryOperator::GtEq => ord != Ordering::Less,
                BinaryOperator::And | BinaryOperator::Or => unreachable!(),
            })
        }
    }
}
