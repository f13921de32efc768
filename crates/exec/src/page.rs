//! Pages: the immutable column batches operators exchange.
//!
//! A [Column] is a view into shared, immutable backing storage; slicing a
//! page shares the backing, and [Page::compact] produces a dense copy that
//! releases references to larger backing buffers.  Cloning a page is cheap
//! (reference counts only) and never copies values.

use std::sync::Arc;

use crate::datum::Datum;

/// An immutable column of values: a view (offset, length) into shared
/// backing storage.
#[derive(Clone)]
pub struct Column {
    values: Arc<[Datum]>,
    offset: usize,
    len: usize,
}

impl Column {
    /// Creates a column owning `values`.
    pub fn from_values(values: Vec<Datum>) -> Self {
        let values: Arc<[Datum]> = values.into();
        Self {
            offset: 0,
            len: values.len(),
            values,
        }
    }

    /// The number of values visible through this view.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the view is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The value at `position` within the view.
    pub fn value(&self, position: usize) -> &Datum {
        assert!(position < self.len, "column position {position} out of range");
        &self.values[self.offset + position]
    }

    /// A sub-view sharing the same backing storage.
    pub fn slice(&self, offset: usize, len: usize) -> Self {
        assert!(offset + len <= self.len, "column slice out of range");
        Self {
            values: Arc::clone(&self.values),
            offset: self.offset + offset,
            len,
        }
    }

    /// The size of the backing buffer this view pins, in values.
    pub fn backing_len(&self) -> usize {
        self.values.len()
    }

    /// A dense copy of the view, releasing the original backing buffer.
    pub fn compact(&self) -> Self {
        if self.len == self.values.len() {
            return self.clone();
        }
        Self::from_values(
            self.values[self.offset..self.offset + self.len].to_vec(),
        )
    }

    pub(crate) fn backing(&self) -> &Arc<[Datum]> {
        &self.values
    }
}

/// An ordered set of equal-length columns: the unit of operator input and
/// output.
#[derive(Clone)]
pub struct Page {
    columns: Vec<Column>,
    row_count: usize,
}

impl Page {
    /// Creates a page from columns.
    ///
    /// # Panic
    ///
    /// Panics if the columns differ in length.
    pub fn new(columns: Vec<Column>) -> Self {
        let row_count = columns.first().map_or(0, Column::len);
        for column in &columns {
            assert_eq!(column.len(), row_count, "page columns differ in length");
        }
        Self { columns, row_count }
    }

    /// Creates a page from raw value vectors.
    pub fn from_columns(columns: Vec<Vec<Datum>>) -> Self {
        Self::new(columns.into_iter().map(Column::from_values).collect())
    }

    /// The number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// The number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// The column at `index`.
    pub fn column(&self, index: usize) -> &Column {
        &self.columns[index]
    }

    /// A dense copy of every column, releasing references to larger backing
    /// buffers.  Row identity and order are unchanged.
    pub fn compact(&self) -> Self {
        Self {
            columns: self.columns.iter().map(Column::compact).collect(),
            row_count: self.row_count,
        }
    }

    /// A rough accounting size of the rows visible through this page.
    pub fn estimated_bytes(&self) -> usize {
        self.columns
            .iter()
            .map(|c| (0..c.len()).map(|i| c.value(i).estimated_bytes()).sum::<usize>())
            .sum()
    }

    /// An address identifying the backing storage, for deciding when views
    /// from many different pages should be compacted together.
    pub(crate) fn backing_ptr(&self) -> usize {
        self.columns
            .first()
            .map_or(0, |c| c.backing().as_ptr() as usize)
    }
}

/// Row-at-a-time builder for output pages.
pub struct PageBuilder {
    columns: Vec<Vec<Datum>>,
}

impl PageBuilder {
    /// Creates a builder producing pages with `column_count` columns.
    pub fn new(column_count: usize) -> Self {
        Self {
            columns: vec![Vec::new(); column_count],
        }
    }

    /// Appends one row copied from `page`.  The source page must have at
    /// least as many columns as this builder appends to; extra builder
    /// columns (e.g. a rank column) are filled through [push](Self::push).
    pub fn append_row(&mut self, page: &Page, position: usize) {
        for (index, column) in self.columns.iter_mut().enumerate().take(page.column_count()) {
            column.push(page.column(index).value(position).clone());
        }
    }

    /// Appends a single value to column `index`.
    pub fn push(&mut self, index: usize, value: Datum) {
        self.columns[index].push(value);
    }

    /// The number of complete rows in the first column.
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Finishes the page.
    pub fn build(self) -> Page {
        Page::from_columns(self.columns)
    }
}

#[cfg(test)]
mod test {
    use super::{Column, Page, PageBuilder};
    use crate::datum::Datum;
    use std::sync::Arc;

    fn page() -> Page {
        Page::from_columns(vec![
            vec![Datum::from(1i64), Datum::from(2i64), Datum::from(3i64)],
            vec![Datum::from("a"), Datum::from("b"), Datum::from("c")],
        ])
    }

    #[test]
    fn slicing_shares_backing() {
        let page = page();
        let sliced = page.column(0).slice(1, 2);
        assert_eq!(sliced.len(), 2);
        assert_eq!(sliced.value(0), &Datum::from(2i64));
        assert_eq!(sliced.backing_len(), 3);
        assert!(Arc::ptr_eq(sliced.backing(), page.column(0).backing()));
    }

    #[test]
    fn compaction_releases_backing() {
        let page = page();
        let sliced = page.column(1).slice(0, 1);
        let compacted = sliced.compact();
        assert_eq!(compacted.len(), 1);
        assert_eq!(compacted.backing_len(), 1);
        assert_eq!(compacted.value(0), &Datum::from("a"));
        assert!(!Arc::ptr_eq(compacted.backing(), sliced.backing()));
    }

    #[test]
    #[should_panic(expected = "page columns differ in length")]
    fn mismatched_columns_panic() {
        Page::from_columns(vec![vec![Datum::Null], vec![]]);
    }

    #[test]
    fn builder_appends_rows_and_extra_columns() {
        let source = page();
        let mut builder = PageBuilder::new(3);
        builder.append_row(&source, 2);
        builder.push(2, Datum::from(1i64));
        builder.append_row(&source, 0);
        builder.push(2, Datum::from(2i64));
        let built = builder.build();
        assert_eq!(built.row_count(), 2);
        assert_eq!(built.column(0).value(0), &Datum::from(3i64));
        assert_eq!(built.column(1).value(1), &Datum::from("a"));
        assert_eq!(built.column(2).value(1), &Datum::from(2i64));
    }
}
