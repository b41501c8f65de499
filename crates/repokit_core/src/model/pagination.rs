//! Page descriptor for paginated reads.

use crate::repo::{RepoError, RepoResult};
use serde::{Deserialize, Serialize};

/// A 1-based page number and a page size.
///
/// Both values are validated at construction and cannot change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPagination")]
pub struct PaginationData {
    page_number: u32,
    page_size: u32,
}

#[derive(Deserialize)]
struct RawPagination {
    page_number: u32,
    page_size: u32,
}

impl TryFrom<RawPagination> for PaginationData {
    type Error = RepoError;

    fn try_from(value: RawPagination) -> Result<Self, Self::Error> {
        Self::new(value.page_number, value.page_size)
    }
}

impl PaginationData {
    /// # Errors
    /// - Returns `InvalidArgument` when `page_number` or `page_size` is zero.
    pub fn new(page_number: u32, page_size: u32) -> RepoResult<Self> {
        if page_number == 0 {
            return Err(RepoError::InvalidArgument(
                "page number must be at least 1".to_string(),
            ));
        }
        if page_size == 0 {
            return Err(RepoError::InvalidArgument(
                "page size must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            page_number,
            page_size,
        })
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of entries preceding this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page_number - 1) * u64::from(self.page_size)
    }

    /// Maximum number of entries on this page.
    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }

    /// Applies the page window to an ordered sequence.
    ///
    /// Pages past the end of the sequence produce an empty result.
    pub fn paginate<T, I>(&self, items: I) -> Vec<T>
    where
        I: IntoIterator<Item = T>,
    {
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        items
            .into_iter()
            .skip(offset)
            .take(self.page_size as usize)
            .collect()
    }
}
