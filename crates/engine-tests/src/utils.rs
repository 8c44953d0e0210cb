#![allow(dead_code)]

use crate::memory::MemoryStore;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use engine_core::{list::Paginator, settings::PaginationSettings};
use model::{
    core::value::Value,
    pagination::page::{Page, PageRequest},
    records::row::RowData,
};

pub const NOTES: &str = "notes";

/// Upper bound on pages followed by a walk, so a looping cursor chain
/// fails the test instead of hanging it.
const MAX_WALK: usize = 1_000;

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 24, 12, 0, 0).unwrap()
}

pub fn note_id(i: usize) -> String {
    format!("n_{i:04}")
}

/// A note created `offset_secs` after the base time.
pub fn note(i: usize, offset_secs: i64, archived: bool) -> RowData {
    let created_at = base_time() + TimeDelta::seconds(offset_secs);
    let archived_at = if archived {
        Value::Timestamp(created_at + TimeDelta::days(1))
    } else {
        Value::Null
    };
    RowData::from_pairs(
        NOTES,
        [
            ("id", Value::from(note_id(i))),
            ("created_at", Value::Timestamp(created_at)),
            ("updated_at", Value::Timestamp(created_at)),
            ("archived_at", archived_at),
        ],
    )
}

/// `count` live notes; every `tie_width` consecutive notes share a
/// creation time.
pub fn notes_store(count: usize, tie_width: usize) -> MemoryStore {
    let width = tie_width.max(1);
    MemoryStore::with_rows(
        NOTES,
        (0..count).map(|i| note(i, (i / width) as i64, false)),
    )
}

/// Notes with the given creation offsets, ids in index order.
pub fn notes_with_offsets(offsets: &[i64]) -> MemoryStore {
    MemoryStore::with_rows(
        NOTES,
        offsets
            .iter()
            .enumerate()
            .map(|(i, offset)| note(i, *offset, false)),
    )
}

pub fn paginator(page_size: u32) -> Paginator {
    let settings = PaginationSettings {
        default_page_size: page_size,
        ..PaginationSettings::default()
    };
    Paginator::new(settings).expect("valid settings")
}

/// Ids of notes built from `offsets`, in `(created_at, id)` order.
pub fn expected_order(offsets: &[i64], descending: bool) -> Vec<String> {
    let mut keyed: Vec<(i64, String)> = offsets
        .iter()
        .enumerate()
        .map(|(i, offset)| (*offset, note_id(i)))
        .collect();
    keyed.sort();
    if descending {
        keyed.reverse();
    }
    keyed.into_iter().map(|(_, id)| id).collect()
}

/// Follows next cursors from the first page until there are none.
pub async fn walk_forward(
    paginator: &Paginator,
    store: &MemoryStore,
    request: PageRequest,
) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut request = request;
    loop {
        let page = paginator
            .list(store, NOTES, &request)
            .await
            .expect("list page");
        let next = page.next_cursor.clone();
        pages.push(page);
        match next {
            Some(cursor) => request.cursor = Some(cursor),
            None => break,
        }
        assert!(pages.len() < MAX_WALK, "forward walk did not terminate");
    }
    pages
}

/// Follows previous cursors starting from `from` until there are none.
/// The starting page is not included.
pub async fn walk_backward(
    paginator: &Paginator,
    store: &MemoryStore,
    request: PageRequest,
    from: &Page,
) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut previous = from.previous_cursor.clone();
    while let Some(cursor) = previous {
        let mut request = request.clone();
        request.cursor = Some(cursor);
        let page = paginator
            .list(store, NOTES, &request)
            .await
            .expect("list page");
        previous = page.previous_cursor.clone();
        pages.push(page);
        assert!(pages.len() < MAX_WALK, "backward walk did not terminate");
    }
    pages
}

pub fn flatten(pages: &[Page]) -> Vec<String> {
    pages.iter().flat_map(|p| p.ids.iter().cloned()).collect()
}
