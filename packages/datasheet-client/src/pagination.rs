//! Single-page and full-collection record retrieval.
//!
//! A full fetch walks pages 1, 2, ... while `pageNum * pageSize < total`,
//! using the page number and size the server reports for each page.
//! By default a failed page ends the walk and the rows gathered so far are
//! returned after a warning; callers needing every row must compare the
//! count themselves or enable `strict_pagination`.

use async_trait::async_trait;

use datasheet_types::{Page, RawRow, RecordQuery};

use crate::api_request;
use crate::error::Result;

/// Anything that can serve one page of records for a query.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, query: &RecordQuery) -> Result<Page>;
}

/// Lazy page sequence over a [`PageSource`].
///
/// Each [`next_page`](Self::next_page) call issues at most one request.
/// Dropping the cursor abandons the remaining pages; rows already returned
/// stay valid.
pub struct PageCursor<'a, S: PageSource + ?Sized> {
    source: &'a S,
    query: RecordQuery,
    page_num: u64,
    page_size: u64,
    done: bool,
}

impl<'a, S: PageSource + ?Sized> PageCursor<'a, S> {
    /// Starts at the query's page number (default 1) with its page size
    /// (default `default_page_size`).
    pub fn new(source: &'a S, query: RecordQuery, default_page_size: u64) -> Self {
        let page_num = query.page_num.unwrap_or(1).max(1);
        let page_size = query.page_size.unwrap_or(default_page_size);
        Self {
            source,
            query,
            page_num,
            page_size,
            done: false,
        }
    }

    /// Page number the next request will ask for.
    pub fn page_num(&self) -> u64 {
        self.page_num
    }

    /// Fetches the next page, or `None` once the collection is exhausted or
    /// a request failed.
    pub async fn next_page(&mut self) -> Option<Result<Page>> {
        if self.done {
            return None;
        }

        let query = self
            .query
            .clone()
            .page_size(self.page_size)
            .page_num(self.page_num);

        match self.source.fetch_page(&query).await {
            Ok(page) => {
                // The server may cap the page size, so the walk follows the
                // page it reports. An empty page means the server stopped
                // serving rows even if `total` says otherwise.
                if page.records.is_empty() || !page.has_more() {
                    self.done = true;
                } else {
                    self.page_num = page.page_num.max(self.page_num) + 1;
                    if page.page_size > 0 {
                        self.page_size = page.page_size;
                    }
                }
                Some(Ok(page))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Fetches every page of `query` and concatenates rows in page order.
///
/// The query is validated before the first request. With `strict` unset a
/// failed page is logged and the rows fetched before it are returned.
pub async fn fetch_all<S: PageSource + ?Sized>(
    source: &S,
    query: RecordQuery,
    default_page_size: u64,
    strict: bool,
) -> Result<Vec<RawRow>> {
    api_request::query_params(&query)?;

    let mut cursor = PageCursor::new(source, query, default_page_size);
    let mut rows = Vec::new();

    while let Some(result) = cursor.next_page().await {
        match result {
            Ok(page) => rows.extend(page.records),
            Err(e) if strict || e.is_validation() => return Err(e),
            Err(e) => {
                tracing::warn!(
                    "Fetching page {} failed, returning {} rows gathered so far: {}",
                    cursor.page_num(),
                    rows.len(),
                    e
                );
                break;
            }
        }
    }

    Ok(rows)
}
