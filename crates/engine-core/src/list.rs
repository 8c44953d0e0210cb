//! List and describe orchestration over a caller-supplied row source.

use crate::{
    error::ListError,
    reconcile::{BatchError, rows_to_items},
    settings::PaginationSettings,
};
use async_trait::async_trait;
use model::{
    pagination::page::{BatchRequest, Page, PageRequest},
    records::row::RowData,
};
use planner::query::{
    ast::select::Select,
    keyset::{KeysetPlan, PlanParams},
};
use std::fmt::Display;
use tracing::{debug, info, warn};

/// Read access to the relational store, typically bound to the caller's
/// open transaction.
#[async_trait]
pub trait RowSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Runs a planned page query and returns its rows in fetch order.
    async fn fetch_page(&self, select: &Select) -> Result<Vec<RowData>, Self::Error>;

    /// Fetches rows by id from `table`, in any order. Archived rows are
    /// included when `archived` is set; they must carry `archived_at`.
    async fn fetch_by_ids(
        &self,
        table: &str,
        ids: &[String],
        archived: bool,
    ) -> Result<Vec<RowData>, Self::Error>;
}

/// A page of ids together with the items they describe.
#[derive(Debug, Clone, PartialEq)]
pub struct DescribedPage<T> {
    pub page: Page,
    pub items: Vec<T>,
}

#[derive(Debug, Clone)]
pub struct Paginator {
    settings: PaginationSettings,
}

impl Paginator {
    pub fn new(settings: PaginationSettings) -> Result<Self, crate::error::SettingsError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &PaginationSettings {
        &self.settings
    }

    /// Plans the page query for `entity` without running it.
    pub fn plan(&self, entity: &str, request: &PageRequest) -> Result<KeysetPlan, ListError> {
        let sortable = self.settings.sorting_columns(entity);
        let params = PlanParams {
            table: self.settings.table_for(entity),
            default_sort_column: &self.settings.default_sort_column,
            default_page_size: self.settings.default_page_size,
            sortable_columns: Some(sortable.as_slice()),
            id_column: &self.settings.id_column,
        };

        let mut request = request.clone();
        request.per_page = Some(self.settings.page_size(request.per_page));

        Ok(KeysetPlan::build(&request, &params)?)
    }

    pub async fn list<S>(
        &self,
        source: &S,
        entity: &str,
        request: &PageRequest,
    ) -> Result<Page, ListError>
    where
        S: RowSource + ?Sized,
    {
        let plan = self.plan(entity, request)?;
        let rows = source
            .fetch_page(&plan.select)
            .await
            .map_err(|e| ListError::Source(Box::new(e)))?;
        debug!(entity, fetched = rows.len(), "fetched page rows");

        let page = plan.reconciler.reconcile(rows)?;
        info!(
            entity,
            ids = page.ids.len(),
            has_next = page.has_next(),
            has_previous = page.has_previous(),
            "listed page"
        );
        Ok(page)
    }

    pub async fn describe<S, T, E, F>(
        &self,
        source: &S,
        entity: &str,
        request: &BatchRequest,
        map: F,
    ) -> Result<Vec<T>, ListError>
    where
        S: RowSource + ?Sized,
        E: Display,
        F: FnMut(&RowData) -> Result<T, E>,
    {
        if request.ids.is_empty() {
            return Ok(Vec::new());
        }

        let table = self.settings.table_for(entity);
        let rows = source
            .fetch_by_ids(table, &request.ids, request.consider_archived)
            .await
            .map_err(|e| ListError::Source(Box::new(e)))?;

        match rows_to_items(&request.ids, &rows, request.consider_archived, map) {
            Ok(items) => {
                info!(entity, items = items.len(), "described items");
                Ok(items)
            }
            Err(BatchError::NotFound(not_found)) => Err(not_found.into()),
            Err(BatchError::Partial { failures, .. }) => {
                let failures: Vec<(String, String)> = failures
                    .into_iter()
                    .map(|f| (f.id, f.error.to_string()))
                    .collect();
                warn!(entity, failed = failures.len(), "could not describe items");
                Err(ListError::Mapping { failures })
            }
        }
    }

    /// Lists one page and hydrates its ids. Archived rows are considered
    /// exactly when the page was listed from the archived row-set.
    pub async fn list_and_describe<S, T, E, F>(
        &self,
        source: &S,
        entity: &str,
        request: &PageRequest,
        map: F,
    ) -> Result<DescribedPage<T>, ListError>
    where
        S: RowSource + ?Sized,
        E: Display,
        F: FnMut(&RowData) -> Result<T, E>,
    {
        let page = self.list(source, entity, request).await?;
        let batch = BatchRequest {
            ids: page.ids.clone(),
            consider_archived: request.show_archived,
        };
        let items = self.describe(source, entity, &batch, map).await?;

        Ok(DescribedPage { page, items })
    }
}
