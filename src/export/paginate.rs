//! Page-by-page traversal of list endpoints
//!
//! The API never tells us how many records exist up front, so a traversal
//! discovers the end incrementally: page numbers start at 1 and grow by
//! one, the page size stays fixed, and an empty page always ends it.
//!
//! Under [`PageTermination::ShortPage`] a page shorter than the requested
//! size also ends it, saving one trailing request. That is only exact if
//! the server never answers the final page with exactly `size` records;
//! when it does, the extra request returns an empty page and still ends
//! the loop. [`PageTermination::UntilEmpty`] drops the assumption and
//! always asks until a page comes back empty.

use super::ExportError;
use crate::client::ApiResult;
use std::future::Future;

/// How a traversal decides the last page was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageTermination {
    /// Stop after an empty page or a page shorter than the page size
    #[default]
    ShortPage,
    /// Stop only after an empty page
    UntilEmpty,
}

impl PageTermination {
    /// `strict` pagination keeps asking until an empty page
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            PageTermination::UntilEmpty
        } else {
            PageTermination::ShortPage
        }
    }
}

/// One page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u32,
    /// Records per page, fixed for a traversal
    pub size: u32,
}

/// Paginated collection with a fixed page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: u32,
    termination: PageTermination,
}

impl Paginator {
    pub fn new(page_size: u32, termination: PageTermination) -> Self {
        Self {
            page_size,
            termination,
        }
    }

    /// Request pages until exhaustion and return every record, in order
    ///
    /// Errors from `list_fn` propagate unchanged; records from earlier
    /// pages are discarded in that case. No retries happen here.
    pub async fn fetch_all<T, F, Fut>(&self, mut list_fn: F) -> Result<Vec<T>, ExportError>
    where
        F: FnMut(PageRequest) -> Fut,
        Fut: Future<Output = ApiResult<Vec<T>>>,
    {
        if self.page_size == 0 {
            return Err(ExportError::InvalidPageSize);
        }

        let size = self.page_size as usize;
        let mut records = Vec::new();
        let mut page = 1;

        loop {
            let items = list_fn(PageRequest {
                page,
                size: self.page_size,
            })
            .await?;

            let returned = items.len();
            tracing::trace!(page, returned, "Fetched page");

            if returned == 0 {
                break;
            }

            if returned > size {
                return Err(ExportError::OversizedPage {
                    page,
                    size: self.page_size,
                    returned,
                });
            }

            records.extend(items);

            if returned < size && self.termination == PageTermination::ShortPage {
                break;
            }

            page += 1;
        }

        Ok(records)
    }
}
