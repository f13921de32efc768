//! Row capabilities injected into operators: comparison and
//! equality-with-hash over `(page, position)` pairs.

use std::cmp::Ordering;
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::page::Page;

/// Sort direction for one channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// Compares rows addressed as a page and a position within it.
///
/// Implementations must be total orders; operators feed rows from different
/// pages to the same comparator.  Closures with the matching signature
/// implement the trait directly.
pub trait RowComparator {
    /// Compares the row at `left_position` of `left_page` with the row at
    /// `right_position` of `right_page`.
    fn compare_rows(
        &self,
        left_page: &Page,
        left_position: usize,
        right_page: &Page,
        right_position: usize,
    ) -> Ordering;
}

impl<F> RowComparator for F
where
    F: Fn(&Page, usize, &Page, usize) -> Ordering,
{
    fn compare_rows(
        &self,
        left_page: &Page,
        left_position: usize,
        right_page: &Page,
        right_position: usize,
    ) -> Ordering {
        self(left_page, left_position, right_page, right_position)
    }
}

/// Orders rows by a list of channels with per-channel direction, using the
/// natural [Datum](crate::Datum) order within each channel.
pub struct SimpleRowComparator {
    channels: Vec<(usize, SortOrder)>,
}

impl SimpleRowComparator {
    /// Creates a comparator over `channels`, most significant first.
    pub fn new(channels: Vec<(usize, SortOrder)>) -> Self {
        Self { channels }
    }

    /// Ascending comparison over a single channel.
    pub fn ascending(channel: usize) -> Self {
        Self::new(vec![(channel, SortOrder::Ascending)])
    }
}

impl RowComparator for SimpleRowComparator {
    fn compare_rows(
        &self,
        left_page: &Page,
        left_position: usize,
        right_page: &Page,
        right_position: usize,
    ) -> Ordering {
        for (channel, order) in &self.channels {
            let left = left_page.column(*channel).value(left_position);
            let right = right_page.column(*channel).value(right_position);
            let ordering = match order {
                SortOrder::Ascending => left.cmp(right),
                SortOrder::Descending => right.cmp(left),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// Hashes rows and tests them for equality, for group resolution and
/// distinct-building operators.
pub trait RowEqualsAndHash {
    /// A hash of the row at `position` of `page`.
    fn hash_row(&self, page: &Page, position: usize) -> u64;

    /// True if the two rows are equal under this capability.  Must agree
    /// with [hash_row](Self::hash_row).
    fn rows_equal(
        &self,
        left_page: &Page,
        left_position: usize,
        right_page: &Page,
        right_position: usize,
    ) -> bool;
}

/// Equality and hashing over a list of channels, using the natural
/// [Datum](crate::Datum) equality.
pub struct ChannelEqualsAndHash {
    channels: Vec<usize>,
}

impl ChannelEqualsAndHash {
    /// Creates the capability over `channels`.
    pub fn new(channels: Vec<usize>) -> Self {
        Self { channels }
    }
}

impl RowEqualsAndHash for ChannelEqualsAndHash {
    fn hash_row(&self, page: &Page, position: usize) -> u64 {
        let mut hasher = DefaultHasher::new();
        for channel in &self.channels {
            page.column(*channel).value(position).hash(&mut hasher);
        }
        hasher.finish()
    }

    fn rows_equal(
        &self,
        left_page: &Page,
        left_position: usize,
        right_page: &Page,
        right_position: usize,
    ) -> bool {
        self.channels.iter().all(|channel| {
            left_page.column(*channel).value(left_position)
                == right_page.column(*channel).value(right_position)
        })
    }
}
