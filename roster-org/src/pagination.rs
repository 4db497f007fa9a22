//! Limit/offset pagination for listing operations.

use serde::{Deserialize, Serialize};

use crate::error::{OrgError, OrgResult};

/// A window over an ordered result set.
///
/// `limit: None` means no limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Maximum number of items to return
    pub limit: Option<usize>,

    /// Number of items to skip
    pub offset: usize,
}

impl Page {
    /// A page with no limit starting at the first item.
    pub fn all() -> Self {
        Self::default()
    }

    /// A page with a fixed limit.
    pub fn new(limit: usize, offset: usize) -> Self {
        Self {
            limit: Some(limit),
            offset,
        }
    }

    /// Build a page from caller-supplied parameters.
    ///
    /// An absent or non-positive `limit` means no limit. An absent `offset`
    /// starts at the first item.
    ///
    /// # Errors
    ///
    /// Returns [`OrgError::Validation`] for a negative offset, or one that does
    /// not fit in `usize` on this target.
    ///
    /// # Examples
    ///
    /// ```
    /// use roster_org::Page;
    ///
    /// assert_eq!(Page::from_params(Some(0), None).unwrap(), Page::all());
    /// assert_eq!(Page::from_params(Some(20), Some(40)).unwrap(), Page::new(20, 40));
    /// assert!(Page::from_params(Some(10), Some(-1)).is_err());
    /// ```
    pub fn from_params(limit: Option<i64>, offset: Option<i64>) -> OrgResult<Self> {
        let offset = match offset {
            Some(o) if o < 0 => {
                return Err(OrgError::Validation(format!(
                    "offset must be non-negative, got {}",
                    o
                )))
            }
            Some(o) => usize::try_from(o)
                .map_err(|_| OrgError::Validation(format!("offset {} is out of range", o)))?,
            None => 0,
        };
        // A limit past usize::MAX is as good as no limit.
        let limit = limit
            .filter(|l| *l > 0)
            .and_then(|l| usize::try_from(l).ok());
        Ok(Self { limit, offset })
    }

    /// Apply this window to an ordered iterator.
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let iter = items.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => iter.take(limit).collect(),
            None => iter.collect(),
        }
    }
}
