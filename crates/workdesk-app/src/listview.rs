// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Client-side list engine shared by every table in the portal.
//!
//! A [`ListView`] owns one loaded collection and derives the visible rows
//! from it: filter, then sort, then cut a page. The loaded set is never
//! touched by filtering or sorting; only a successful load replaces it.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{self, AtomicU64};

use tracing::{debug, warn};

use crate::error::LoadError;
use crate::model::SortDirection;

pub trait Record: Clone {
    type Id: Ord + Clone + fmt::Debug;

    fn id(&self) -> Self::Id;
}

/// Current filter values keyed by filter name. Blank values do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    values: BTreeMap<String, String>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        let key = key.into();
        if value.trim().is_empty() {
            self.values.remove(&key);
        } else {
            self.values.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

pub type Predicate<R> = Arc<dyn Fn(&R, &str) -> bool + Send + Sync>;

pub struct FilterField<R> {
    pub key: &'static str,
    pub label: &'static str,
    matches: Predicate<R>,
}

impl<R> FilterField<R> {
    pub fn new(
        key: &'static str,
        label: &'static str,
        matches: impl Fn(&R, &str) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            key,
            label,
            matches: Arc::new(matches),
        }
    }

    pub fn matches(&self, record: &R, value: &str) -> bool {
        (self.matches)(record, value)
    }
}

impl<R> Clone for FilterField<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            label: self.label,
            matches: Arc::clone(&self.matches),
        }
    }
}

impl<R> fmt::Debug for FilterField<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterField")
            .field("key", &self.key)
            .field("label", &self.label)
            .finish()
    }
}

pub type Comparator<R> = Arc<dyn Fn(&R, &R) -> Ordering + Send + Sync>;

pub struct SortKey<R> {
    pub name: &'static str,
    pub direction: SortDirection,
    compare: Comparator<R>,
}

impl<R> SortKey<R> {
    pub fn new(
        name: &'static str,
        compare: impl Fn(&R, &R) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            direction: SortDirection::Asc,
            compare: Arc::new(compare),
        }
    }

    pub fn descending(mut self) -> Self {
        self.direction = SortDirection::Desc;
        self
    }

    pub fn compare(&self, left: &R, right: &R) -> Ordering {
        let ordering = (self.compare)(left, right);
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl<R: Record + 'static> SortKey<R> {
    pub fn by_id() -> Self {
        Self::new("id", |left: &R, right: &R| left.id().cmp(&right.id()))
    }
}

impl<R> Clone for SortKey<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            direction: self.direction,
            compare: Arc::clone(&self.compare),
        }
    }
}

impl<R> fmt::Debug for SortKey<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortKey")
            .field("name", &self.name)
            .field("direction", &self.direction)
            .finish()
    }
}

/// Everything that differs between one table and the next.
#[derive(Debug, Clone)]
pub struct ListSchema<R> {
    pub name: &'static str,
    pub page_size: usize,
    pub filters: Vec<FilterField<R>>,
    pub default_sort: SortKey<R>,
}

/// Indices of `records` that satisfy every active filter, in load order.
///
/// Keys with no matching [`FilterField`] are ignored.
pub fn filter_records<R>(records: &[R], fields: &[FilterField<R>], spec: &FilterSpec) -> Vec<usize> {
    let active: Vec<(&FilterField<R>, &str)> = fields
        .iter()
        .filter_map(|field| spec.get(field.key).map(|value| (field, value)))
        .collect();
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| active.iter().all(|(field, value)| field.matches(record, value)))
        .map(|(index, _)| index)
        .collect()
}

pub fn sort_records<R: Record>(records: &[R], order: &mut [usize], key: &SortKey<R>) {
    order.sort_by(|left, right| {
        let (left, right) = (&records[*left], &records[*right]);
        key.compare(left, right)
            .then_with(|| left.id().cmp(&right.id()))
    });
}

pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

fn page_bounds(count: usize, page: usize, page_size: usize) -> Range<usize> {
    let page_size = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(page_size).min(count);
    let end = start.saturating_add(page_size).min(count);
    start..end
}

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Tickets come from one process-wide sequence, so a response addressed to
/// a view that has since been rebuilt never matches its replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn issue() -> Self {
        Self(NEXT_TICKET.fetch_add(1, atomic::Ordering::Relaxed))
    }

    pub const fn sequence(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { count: usize },
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView<'a, R> {
    pub rows: Vec<&'a R>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    /// 1-based position of the first row, 0 when there are no rows.
    pub first: usize,
    pub last: usize,
}

impl<R> PageView<'_, R> {
    pub fn summary(&self) -> String {
        format!(
            "Showing {} to {} of {} entries",
            self.first, self.last, self.total_count
        )
    }
}

pub trait RowFormatter<R> {
    fn columns(&self) -> Vec<&'static str>;

    fn cells(&self, record: &R) -> Vec<String>;

    fn emphasize(&self, _record: &R) -> bool {
        false
    }

    fn empty_message(&self) -> &'static str {
        "No records found"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedRow {
    Record { cells: Vec<String>, emphasized: bool },
    Placeholder { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationControls {
    pub current_page: usize,
    pub pages: Vec<usize>,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedList {
    pub columns: Vec<&'static str>,
    pub rows: Vec<RenderedRow>,
    pub summary: String,
    pub pagination: Option<PaginationControls>,
}

#[derive(Debug, Clone)]
pub struct ListView<R: Record> {
    schema: ListSchema<R>,
    loaded: Vec<R>,
    filter: FilterSpec,
    sort: SortKey<R>,
    visible: Vec<usize>,
    current_page: usize,
    issued: Option<LoadTicket>,
    loaded_once: bool,
    last_error: Option<LoadError>,
}

impl<R: Record> ListView<R> {
    pub fn new(schema: ListSchema<R>) -> Self {
        let sort = schema.default_sort.clone();
        Self {
            schema,
            loaded: Vec::new(),
            filter: FilterSpec::default(),
            sort,
            visible: Vec::new(),
            current_page: 1,
            issued: None,
            loaded_once: false,
            last_error: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.schema.name
    }

    pub fn schema(&self) -> &ListSchema<R> {
        &self.schema
    }

    pub fn loaded(&self) -> &[R] {
        &self.loaded
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded_once
    }

    pub fn last_error(&self) -> Option<&LoadError> {
        self.last_error.as_ref()
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn sort(&self) -> &SortKey<R> {
        &self.sort
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.schema.page_size
    }

    pub fn filtered_count(&self) -> usize {
        self.visible.len()
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.visible.len(), self.schema.page_size)
    }

    /// Filtered rows in display order.
    pub fn filtered(&self) -> impl Iterator<Item = &R> {
        self.visible.iter().map(|index| &self.loaded[*index])
    }

    pub fn find(&self, id: &R::Id) -> Option<&R> {
        self.loaded.iter().find(|record| &record.id() == id)
    }

    /// Runs `fetch` synchronously and applies its result.
    ///
    /// The fetcher receives the current filter so views backed by
    /// server-side filtering can forward it as query parameters.
    pub fn load<F>(&mut self, fetch: F) -> Result<usize, LoadError>
    where
        F: FnOnce(&FilterSpec) -> Result<Vec<R>, LoadError>,
    {
        // Supersedes anything still in flight.
        let ticket = self.begin_load();
        let result = fetch(&self.filter);
        self.apply_result(ticket, result)
    }

    /// Issues a ticket for a fetch that will complete later. Only the most
    /// recently issued ticket can change the loaded set.
    pub fn begin_load(&mut self) -> LoadTicket {
        let ticket = LoadTicket::issue();
        self.issued = Some(ticket);
        debug!(view = self.schema.name, ticket = ticket.0, "load started");
        ticket
    }

    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<R>, LoadError>,
    ) -> Result<LoadOutcome, LoadError> {
        if self.issued != Some(ticket) {
            debug!(
                view = self.schema.name,
                ticket = ticket.0,
                latest = self.issued.map(LoadTicket::sequence),
                "discarding stale load result"
            );
            return Ok(LoadOutcome::Stale);
        }
        let count = self.apply_result(ticket, result)?;
        Ok(LoadOutcome::Applied { count })
    }

    fn apply_result(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<R>, LoadError>,
    ) -> Result<usize, LoadError> {
        let records = match result {
            Ok(records) => records,
            Err(error) => {
                warn!(view = self.schema.name, ticket = ticket.0, %error, "load failed");
                self.last_error = Some(error.clone());
                return Err(error);
            }
        };

        let count = records.len();
        self.loaded = records;
        self.loaded_once = true;
        self.last_error = None;
        self.refresh();
        if self.current_page > self.total_pages() || self.visible.is_empty() {
            self.current_page = 1;
        }
        debug!(view = self.schema.name, ticket = ticket.0, count, "load finished");
        Ok(count)
    }

    /// Replaces the filter, resets to the first page and returns the number
    /// of matching records.
    pub fn apply_filter(&mut self, spec: FilterSpec) -> usize {
        self.filter = spec;
        self.refresh();
        self.current_page = 1;
        self.visible.len()
    }

    pub fn set_filter(&mut self, key: &str, value: &str) -> usize {
        let mut spec = self.filter.clone();
        spec.set(key, value);
        self.apply_filter(spec)
    }

    pub fn clear_filters(&mut self) -> usize {
        self.apply_filter(FilterSpec::default())
    }

    /// Reorders the filtered rows. `None` restores the view's default order.
    pub fn apply_sort(&mut self, key: Option<SortKey<R>>) {
        self.sort = key.unwrap_or_else(|| self.schema.default_sort.clone());
        sort_records(&self.loaded, &mut self.visible, &self.sort);
        self.current_page = self.current_page.min(self.total_pages());
    }

    pub fn page(&self) -> PageView<'_, R> {
        let bounds = page_bounds(
            self.visible.len(),
            self.current_page,
            self.schema.page_size,
        );
        let (first, last) = if bounds.is_empty() {
            (0, 0)
        } else {
            (bounds.start + 1, bounds.end)
        };
        PageView {
            rows: self.visible[bounds]
                .iter()
                .map(|index| &self.loaded[*index])
                .collect(),
            current_page: self.current_page,
            total_pages: self.total_pages(),
            total_count: self.visible.len(),
            first,
            last,
        }
    }

    /// Moves to `requested`. Out-of-range requests leave the page unchanged
    /// and return `None`.
    pub fn change_page(&mut self, requested: usize) -> Option<PageView<'_, R>> {
        if requested < 1 || requested > self.total_pages() {
            return None;
        }
        self.current_page = requested;
        Some(self.page())
    }

    pub fn next_page(&mut self) -> Option<PageView<'_, R>> {
        self.change_page(self.current_page + 1)
    }

    pub fn prev_page(&mut self) -> Option<PageView<'_, R>> {
        self.change_page(self.current_page.saturating_sub(1))
    }

    pub fn first_page(&mut self) -> Option<PageView<'_, R>> {
        self.change_page(1)
    }

    pub fn last_page(&mut self) -> Option<PageView<'_, R>> {
        self.change_page(self.total_pages())
    }

    pub fn render(&self, formatter: &dyn RowFormatter<R>) -> RenderedList {
        let page = self.page();
        let rows = if page.rows.is_empty() {
            vec![RenderedRow::Placeholder {
                message: formatter.empty_message().to_owned(),
            }]
        } else {
            page.rows
                .iter()
                .map(|record| RenderedRow::Record {
                    cells: formatter.cells(record),
                    emphasized: formatter.emphasize(record),
                })
                .collect()
        };
        let pagination = (page.total_pages > 1).then(|| PaginationControls {
            current_page: page.current_page,
            pages: (1..=page.total_pages).collect(),
            prev_enabled: page.current_page > 1,
            next_enabled: page.current_page < page.total_pages,
        });
        RenderedList {
            columns: formatter.columns(),
            rows,
            summary: page.summary(),
            pagination,
        }
    }

    fn refresh(&mut self) {
        self.visible = filter_records(&self.loaded, &self.schema.filters, &self.filter);
        sort_records(&self.loaded, &mut self.visible, &self.sort);
    }
}
