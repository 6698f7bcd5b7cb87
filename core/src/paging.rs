#![deny(missing_docs)]

//! # Page Streaming Model
//!
//! Executable model of the iterator protocol emitted for paged methods: a buffered
//! page, a transparent fetch when the buffer runs dry, and a distinguished `Done`
//! sentinel once the last page (empty next-page token) has been drained.
//!
//! The generated Go iterators follow exactly these rules; this model pins them down
//! so they can be checked without a Go toolchain.

use std::collections::VecDeque;
use std::fmt;

/// Outcome of a failed `next` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterError<E> {
    /// No more results. Every later call returns this again.
    Done,
    /// The underlying fetch failed. Every later call returns this again.
    Fetch(E),
}

impl<E: fmt::Display> fmt::Display for IterError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IterError::Done => write!(f, "no more items in iterator"),
            IterError::Fetch(e) => write!(f, "fetch failed: {}", e),
        }
    }
}

/// One page returned by a fetch: its elements and the next-page token.
pub type Page<T> = (Vec<T>, String);

/// Clamps a requested page size into the protocol's `int32` range.
pub fn clamp_page_size(page_size: usize) -> i32 {
    i32::try_from(page_size).unwrap_or(i32::MAX)
}

/// Pull-based iterator over the elements of successive pages.
pub struct PageIterator<T, E, F>
where
    F: FnMut(i32, &str) -> Result<Page<T>, E>,
{
    fetch: F,
    items: VecDeque<T>,
    page_size: i32,
    token: String,
    last_page: bool,
    failure: Option<E>,
}

impl<T, E, F> PageIterator<T, E, F>
where
    E: Clone,
    F: FnMut(i32, &str) -> Result<Page<T>, E>,
{
    /// Creates an iterator; nothing is fetched until the first `next`.
    pub fn new(page_size: usize, fetch: F) -> Self {
        Self {
            fetch,
            items: VecDeque::new(),
            page_size: clamp_page_size(page_size),
            token: String::new(),
            last_page: false,
            failure: None,
        }
    }

    /// Returns the next element, fetching pages as needed.
    pub fn next(&mut self) -> Result<T, IterError<E>> {
        loop {
            if let Some(err) = &self.failure {
                return Err(IterError::Fetch(err.clone()));
            }
            if let Some(item) = self.items.pop_front() {
                return Ok(item);
            }
            if self.last_page {
                return Err(IterError::Done);
            }
            match (self.fetch)(self.page_size, &self.token) {
                Ok((items, next_token)) => {
                    self.items.extend(items);
                    self.last_page = next_token.is_empty();
                    self.token = next_token;
                }
                Err(err) => self.failure = Some(err),
            }
        }
    }

    /// Number of elements buffered from the current page.
    pub fn buffered(&self) -> usize {
        self.items.len()
    }
}
