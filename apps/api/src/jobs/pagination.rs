//! Infinite-scroll accumulation over page-cursor responses.
//!
//! Each page tells us the next page number (`next_page`). Pages are kept in
//! fetch order and flattened on demand; fetching stops at the first page
//! without a cursor or once the page budget is spent.

use std::future::Future;

use crate::jobs::search::JobPage;
use crate::models::job::Job;

pub const FIRST_PAGE: u32 = 1;

/// A page of results that carries the cursor for the page after it.
pub trait CursorPage {
    type Item;

    fn items(&self) -> &[Self::Item];
    fn into_items(self) -> Vec<Self::Item>;
    fn next_page(&self) -> Option<u32>;
}

impl CursorPage for JobPage {
    type Item = Job;

    fn items(&self) -> &[Job] {
        &self.jobs
    }

    fn into_items(self) -> Vec<Job> {
        self.jobs
    }

    fn next_page(&self) -> Option<u32> {
        if self.has_more {
            self.next_page
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct InfinitePages<P> {
    pages: Vec<P>,
}

impl<P: CursorPage> Default for InfinitePages<P> {
    fn default() -> Self {
        Self { pages: Vec::new() }
    }
}

impl<P: CursorPage> InfinitePages<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, page: P) {
        self.pages.push(page);
    }

    /// Page number to request next. `Some(FIRST_PAGE)` before anything is
    /// fetched, then whatever cursor the last page returned.
    pub fn next_page_param(&self) -> Option<u32> {
        match self.pages.last() {
            None => Some(FIRST_PAGE),
            Some(last) => last.next_page(),
        }
    }

    pub fn has_next_page(&self) -> bool {
        !self.pages.is_empty() && self.next_page_param().is_some()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Number of items across every fetched page.
    pub fn len(&self) -> usize {
        self.pages.iter().map(|p| p.items().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_items(self) -> Vec<P::Item> {
        self.pages
            .into_iter()
            .flat_map(CursorPage::into_items)
            .collect()
    }
}

/// Fetches pages until the cursor runs out or `max_pages` pages are held.
pub async fn collect_pages<P, E, F, Fut>(max_pages: usize, mut fetch: F) -> Result<InfinitePages<P>, E>
where
    P: CursorPage,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<P, E>>,
{
    let mut pages = InfinitePages::new();
    while pages.page_count() < max_pages {
        let Some(page_param) = pages.next_page_param() else {
            break;
        };
        let page = fetch(page_param).await?;
        pages.push(page);
    }
    Ok(pages)
}
