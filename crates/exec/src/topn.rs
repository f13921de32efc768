//! Grouped Top-N: a streaming operator that retains, per group, every row
//! ranking within the top N under an injected comparator, and emits the
//! survivors with their ranks once input is exhausted.
//!
//! Ranking follows SQL `RANK()`: a row's rank is one plus the number of
//! strictly better rows in its group, so comparator ties share a rank and a
//! group can retain more than N rows when the rank-N block ties.  Admitting
//! a better row re-ranks the group and evicts every row whose rank now
//! exceeds N.
//!
//! Processing is cooperative: [GroupedTopNBuilder::process_page] returns a
//! [Work] unit that the caller drives with [Work::process] until it reports
//! completion.  The unit yields (returns `false`) while the group hash is
//! blocked on memory or while the builder's own reservation stands denied,
//! and resumes exactly where it stopped, with no row lost or duplicated.

use std::collections::HashSet;

use smallvec::SmallVec;
use tracing::debug;

use crate::{
    datum::Datum,
    group_by_hash::{GroupByHash, GroupId},
    memory::UpdateMemory,
    page::{Page, PageBuilder},
    row::RowComparator,
};

/// Retained rows from more than this many distinct backing pages trigger a
/// dense re-copy of the group.
const COMPACTION_PAGE_LIMIT: usize = 4;

/// A reference to one retained input row.
#[derive(Clone)]
struct RetainedRow {
    page: Page,
    position: usize,
}

/// One group's retained rows, kept in comparator order with ties in
/// insertion order.
#[derive(Default)]
struct GroupRows {
    rows: SmallVec<[RetainedRow; 4]>,
}

impl GroupRows {
    /// Copies the retained rows into one dense page, releasing references
    /// to the input pages.  Order, and therefore ranking, is unchanged.
    fn compact(&mut self) {
        let Some(first) = self.rows.first() else {
            return;
        };
        let mut builder = PageBuilder::new(first.page.column_count());
        for row in &self.rows {
            builder.append_row(&row.page, row.position);
        }
        let dense = builder.build();
        self.rows = (0..dense.row_count())
            .map(|position| RetainedRow {
                page: dense.clone(),
                position,
            })
            .collect();
    }

    fn distinct_backings(&self) -> usize {
        let mut backings: SmallVec<[usize; 8]> =
            self.rows.iter().map(|r| r.page.backing_ptr()).collect();
        backings.sort_unstable();
        backings.dedup();
        backings.len()
    }

    fn estimated_bytes(&self) -> usize {
        self.rows
            .iter()
            .map(|row| {
                (0..row.page.column_count())
                    .map(|c| row.page.column(c).value(row.position).estimated_bytes())
                    .sum::<usize>()
            })
            .sum()
    }
}

/// Builds grouped Top-N results from a stream of pages.
///
/// The builder owns its per-group retained structures exclusively; all
/// processing happens on one logical thread of control, and suspension is
/// expressed through the [Work] return value rather than blocking.
pub struct GroupedTopNBuilder {
    hash: Box<dyn GroupByHash>,
    comparator: Box<dyn RowComparator>,
    n: usize,
    produce_ranking: bool,
    memory: Box<dyn UpdateMemory>,
    groups: Vec<GroupRows>,
    touched: HashSet<GroupId>,
    page_in_flight: bool,
}

impl GroupedTopNBuilder {
    /// Creates a builder retaining the top `n` rows per group under
    /// `comparator` (smallest first).  With `produce_ranking`, output pages
    /// carry a trailing BIGINT rank column.
    ///
    /// # Panic
    ///
    /// Panics if `n` is zero.
    pub fn new(
        hash: Box<dyn GroupByHash>,
        comparator: Box<dyn RowComparator>,
        n: usize,
        produce_ranking: bool,
        memory: Box<dyn UpdateMemory>,
    ) -> Self {
        assert!(n > 0, "top-n row count must be positive");
        Self {
            hash,
            comparator,
            n,
            produce_ranking,
            memory,
            groups: Vec::new(),
            touched: HashSet::new(),
            page_in_flight: false,
        }
    }

    /// Starts absorbing `page`.  The returned [Work] unit borrows the
    /// builder; drive it with [Work::process] until it returns `true`.
    ///
    /// # Panic
    ///
    /// Panics if a previous page's [Work] was abandoned before completing.
    pub fn process_page(&mut self, page: Page) -> Work<'_> {
        assert!(
            !self.page_in_flight,
            "previous page was not fully processed"
        );
        self.page_in_flight = true;
        self.touched.clear();
        Work {
            builder: self,
            page,
            position: 0,
            rows_absorbed: false,
            finished: false,
        }
    }

    /// The number of groups resolved so far.
    pub fn group_count(&self) -> usize {
        self.hash.group_count()
    }

    /// The number of rows currently retained across all groups.
    pub fn retained_row_count(&self) -> usize {
        self.groups.iter().map(|g| g.rows.len()).sum()
    }

    /// The current accounting size of the retained rows.
    pub fn retained_bytes(&self) -> usize {
        self.groups.iter().map(GroupRows::estimated_bytes).sum()
    }

    /// Emits the retained rows: per group, in comparator order, tagged
    /// with their rank when ranking output is enabled.  Groups appear in
    /// group-identifier order (the hash's first-seen order); that order is
    /// not a contract.
    ///
    /// # Panic
    ///
    /// Panics if a page is still in flight.
    pub fn build(self) -> TopNOutput {
        assert!(!self.page_in_flight, "page still in flight");
        debug!(
            groups = self.groups.len(),
            rows = self.retained_row_count(),
            "grouped top-n emitting output"
        );
        TopNOutput {
            comparator: self.comparator,
            produce_ranking: self.produce_ranking,
            groups: self.groups.into_iter(),
        }
    }

    /// Inserts one row into its group, keeping the retained set equal to
    /// the rows with rank at most `n`.
    fn insert_row(&mut self, group: GroupId, page: &Page, position: usize) {
        if group >= self.groups.len() {
            self.groups.resize_with(group + 1, GroupRows::default);
        }
        let comparator = &*self.comparator;
        let rows = &mut self.groups[group].rows;

        // rank = 1 + count of strictly better rows.
        let strictly_better = rows.partition_point(|r| {
            comparator.compare_rows(&r.page, r.position, page, position) == std::cmp::Ordering::Less
        });
        if strictly_better >= self.n {
            return;
        }

        // Stable insertion: equal rows go after the existing ties.
        let insert_at = rows.partition_point(|r| {
            comparator.compare_rows(&r.page, r.position, page, position)
                != std::cmp::Ordering::Greater
        });
        rows.insert(
            insert_at,
            RetainedRow {
                page: page.clone(),
                position,
            },
        );
        self.touched.insert(group);

        // Evict whole tie blocks whose rank now exceeds n.
        loop {
            let Some(worst) = rows.last() else { break };
            let (worst_page, worst_position) = (worst.page.clone(), worst.position);
            let block_start = rows.partition_point(|r| {
                comparator.compare_rows(&r.page, r.position, &worst_page, worst_position)
                    == std::cmp::Ordering::Less
            });
            if block_start >= self.n {
                rows.truncate(block_start);
            } else {
                break;
            }
        }
    }

    /// Re-copies any group now spanning too many input pages, so retained
    /// references stop pinning large consumed buffers.  Ranks are
    /// unaffected.
    fn compact_touched_groups(&mut self) {
        for group in self.touched.drain() {
            let rows = &mut self.groups[group];
            if rows.rows.len() > 1 && rows.distinct_backings() > COMPACTION_PAGE_LIMIT {
                debug!(group, rows = rows.rows.len(), "compacting retained rows");
                rows.compact();
            }
        }
    }
}

/// A resumable unit of page absorption.
///
/// `process` returns `false` while more work remains (the group hash or the
/// memory pool is blocked) and `true` once the page is fully absorbed.
/// Because the unit mutably borrows the builder, output cannot be built and
/// no second page can be started while one is in flight.
pub struct Work<'a> {
    builder: &'a mut GroupedTopNBuilder,
    page: Page,
    position: usize,
    rows_absorbed: bool,
    finished: bool,
}

impl Work<'_> {
    /// Runs one processing step.  Returns `true` when the page is fully
    /// absorbed; `false` means the operator yielded and the caller must
    /// call again once the memory pool is ready.
    pub fn process(&mut self) -> bool {
        assert!(!self.finished, "page already fully processed");
        let builder = &mut *self.builder;
        if !self.rows_absorbed {
            while self.position < self.page.row_count() {
                let Some(group) =
                    builder
                        .hash
                        .get_group_id(&self.page, self.position, &mut *builder.memory)
                else {
                    debug!(position = self.position, "grouped top-n yielding on group hash");
                    return false;
                };
                builder.insert_row(group, &self.page, self.position);
                self.position += 1;
            }
            self.rows_absorbed = true;
            builder.compact_touched_groups();
        }
        // Confirm the builder's own reservation before declaring the page
        // absorbed; a denial parks the work at this step.
        if !builder.memory.update(builder.retained_bytes()) {
            debug!("grouped top-n yielding on retained-row reservation");
            return false;
        }
        builder.page_in_flight = false;
        self.finished = true;
        true
    }

    /// True once the page has been fully absorbed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Iterator over the output pages of a finished [GroupedTopNBuilder].
pub struct TopNOutput {
    comparator: Box<dyn RowComparator>,
    produce_ranking: bool,
    groups: std::vec::IntoIter<GroupRows>,
}

impl Iterator for TopNOutput {
    type Item = Page;

    fn next(&mut self) -> Option<Page> {
        loop {
            let group = self.groups.next()?;
            if group.rows.is_empty() {
                continue;
            }
            // Groups are bounded by n plus one tie block; each fits one
            // output page.
            let column_count = group.rows[0].page.column_count();
            let extra = usize::from(self.produce_ranking);
            let mut builder = PageBuilder::new(column_count + extra);
            let mut rank = 1i64;
            for (index, row) in group.rows.iter().enumerate() {
                if index > 0 {
                    let previous = &group.rows[index - 1];
                    if self.comparator.compare_rows(
                        &previous.page,
                        previous.position,
                        &row.page,
                        row.position,
                    ) != std::cmp::Ordering::Equal
                    {
                        rank = index as i64 + 1;
                    }
                }
                builder.append_row(&row.page, row.position);
                if self.produce_ranking {
                    builder.push(column_count, Datum::Bigint(rank));
                }
            }
            return Some(builder.build());
        }
    }
}

#[cfg(test)]
mod test {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Arc;

    use itertools::Itertools;
    use rand::{seq::SliceRandom, Rng, SeedableRng};

    use super::GroupedTopNBuilder;
    use crate::{
        datum::Datum,
        group_by_hash::{DatumGroupByHash, SingleGroupByHash},
        memory::{UnboundedPool, UpdateMemory},
        page::Page,
        row::SimpleRowComparator,
    };

    fn double_page(values: &[f64]) -> Page {
        Page::from_columns(vec![values.iter().map(|v| Datum::double(*v)).collect()])
    }

    fn single_group_builder(n: usize, produce_ranking: bool) -> GroupedTopNBuilder {
        GroupedTopNBuilder::new(
            Box::new(SingleGroupByHash),
            Box::new(SimpleRowComparator::ascending(0)),
            n,
            produce_ranking,
            Box::new(UnboundedPool),
        )
    }

    fn absorb(builder: &mut GroupedTopNBuilder, page: Page) {
        let mut work = builder.process_page(page);
        assert!(work.process());
        assert!(work.is_finished());
    }

    /// Collects `(row values, rank)` pairs from the output pages, reading
    /// column `0` as a double.
    fn collect_ranked(output: super::TopNOutput) -> Vec<(f64, i64)> {
        let mut rows = Vec::new();
        for page in output {
            for position in 0..page.row_count() {
                let Datum::Double(value) = page.column(0).value(position) else {
                    panic!("expected a double column");
                };
                let Datum::Bigint(rank) = page.column(1).value(position) else {
                    panic!("expected a rank column");
                };
                rows.push((value.into_inner(), *rank));
            }
        }
        rows
    }

    #[test]
    fn retains_ranked_top_rows_and_drops_losing_pages() {
        let mut builder = single_group_builder(3, true);
        absorb(&mut builder, double_page(&[0.3, 0.3, 0.2]));

        // Every row of this page ranks below the retained set; the page is
        // not referenced afterwards.
        let losing = double_page(&[0.4]);
        let backing = Arc::clone(losing.column(0).backing());
        absorb(&mut builder, losing);
        assert_eq!(Arc::strong_count(&backing), 1);

        absorb(&mut builder, double_page(&[0.1, 0.2, 0.3, 0.2, 0.1]));

        assert_eq!(
            collect_ranked(builder.build()),
            vec![(0.1, 1), (0.1, 1), (0.2, 3), (0.2, 3), (0.2, 3)]
        );
    }

    #[test]
    fn ranking_column_is_optional() {
        let mut builder = single_group_builder(2, false);
        absorb(&mut builder, double_page(&[0.2, 0.1, 0.3]));
        let pages: Vec<Page> = builder.build().collect();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].column_count(), 1);
        assert_eq!(pages[0].row_count(), 2);
        assert_eq!(pages[0].column(0).value(0), &Datum::double(0.1));
        assert_eq!(pages[0].column(0).value(1), &Datum::double(0.2));
    }

    #[test]
    fn groups_rank_independently() {
        let comparator = SimpleRowComparator::ascending(1);
        let mut builder = GroupedTopNBuilder::new(
            Box::new(DatumGroupByHash::new(0)),
            Box::new(comparator),
            2,
            true,
            Box::new(UnboundedPool),
        );
        let page = Page::from_columns(vec![
            vec![
                Datum::from(7i64),
                Datum::from(8i64),
                Datum::from(7i64),
                Datum::from(8i64),
                Datum::from(7i64),
            ],
            vec![
                Datum::double(0.5),
                Datum::double(0.1),
                Datum::double(0.4),
                Datum::double(0.2),
                Datum::double(0.3),
            ],
        ]);
        absorb(&mut builder, page);
        assert_eq!(builder.group_count(), 2);

        let pages: Vec<Page> = builder.build().collect();
        // One page per group, groups in first-seen order: key 7, then 8.
        assert_eq!(pages.len(), 2);
        let values = |page: &Page| -> Vec<(i64, f64, i64)> {
            (0..page.row_count())
                .map(|i| {
                    let Datum::Bigint(key) = page.column(0).value(i) else {
                        panic!()
                    };
                    let Datum::Double(value) = page.column(1).value(i) else {
                        panic!()
                    };
                    let Datum::Bigint(rank) = page.column(2).value(i) else {
                        panic!()
                    };
                    (*key, value.into_inner(), *rank)
                })
                .collect()
        };
        assert_eq!(values(&pages[0]), vec![(7, 0.3, 1), (7, 0.4, 2)]);
        assert_eq!(values(&pages[1]), vec![(8, 0.1, 1), (8, 0.2, 2)]);
    }

    #[test]
    fn yields_under_memory_pressure_and_resumes() {
        // A pool that denies one growth request, then grants everything.
        let granted = Rc::new(Cell::new(false));
        let denials = Rc::new(Cell::new(0usize));
        let pool = {
            let granted = Rc::clone(&granted);
            let denials = Rc::clone(&denials);
            move |_bytes: usize| {
                if granted.get() {
                    true
                } else {
                    denials.set(denials.get() + 1);
                    false
                }
            }
        };
        let mut builder = GroupedTopNBuilder::new(
            Box::new(DatumGroupByHash::with_capacity(0, 4)),
            Box::new(SimpleRowComparator::ascending(1)),
            1,
            true,
            Box::new(pool),
        );

        let keys: Vec<i64> = (0..12).collect();
        let page = Page::from_columns(vec![
            keys.iter().map(|k| Datum::from(*k)).collect(),
            keys.iter().map(|k| Datum::double(*k as f64 / 10.0)).collect(),
        ]);

        let mut work = builder.process_page(page);
        // Blocked while the hash cannot grow.
        assert!(!work.process());
        assert!(!work.process());
        assert!(!work.is_finished());
        assert!(denials.get() >= 2);

        granted.set(true);
        assert!(work.process());
        assert!(work.is_finished());
        drop(work);

        // No row lost or duplicated: every key became a singleton group.
        assert_eq!(builder.group_count(), 12);
        let total_rows: usize = builder.build().map(|p| p.row_count()).sum();
        assert_eq!(total_rows, 12);
    }

    #[test]
    fn compaction_preserves_ranks() {
        // Ten single-row pages land in one group; the retained references
        // span enough distinct pages to force a dense re-copy.
        let mut builder = single_group_builder(8, true);
        let values = [0.9, 0.1, 0.8, 0.2, 0.7, 0.3, 0.6, 0.4, 0.5, 0.5];
        for value in values {
            absorb(&mut builder, double_page(&[value]));
        }
        // Ranks over the full input run 1,2,3,4,5,5,7,8,9,10; only rank <= 8
        // survives, so 0.8 and 0.9 are evicted.
        assert_eq!(builder.retained_row_count(), 8);

        let ranked = collect_ranked(builder.build());
        assert_eq!(
            ranked,
            vec![
                (0.1, 1),
                (0.2, 2),
                (0.3, 3),
                (0.4, 4),
                (0.5, 5),
                (0.5, 5),
                (0.6, 7),
                (0.7, 8)
            ]
        );
    }

    #[test]
    fn matches_naive_ranking_on_shuffled_input() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed);
        let mut values: Vec<f64> = (0..200).map(|_| rng.gen_range(0..50) as f64 / 10.0).collect();
        values.shuffle(&mut rng);

        let n = 5;
        let mut builder = single_group_builder(n, true);
        for chunk in values.chunks(17) {
            absorb(&mut builder, double_page(chunk));
        }

        // Naive reference: sort, rank, keep rank <= n.
        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let expected: Vec<(f64, i64)> = sorted
            .iter()
            .enumerate()
            .map(|(index, value)| {
                let rank = sorted.iter().position(|v| v == value).unwrap() as i64 + 1;
                (*value, rank, index)
            })
            .filter(|(_, rank, _)| *rank <= n as i64)
            .map(|(value, rank, _)| (value, rank))
            .collect();

        assert_eq!(collect_ranked(builder.build()), expected);
    }

    #[test]
    #[should_panic(expected = "previous page was not fully processed")]
    fn abandoned_work_poisons_the_builder() {
        let mut builder = GroupedTopNBuilder::new(
            Box::new(DatumGroupByHash::with_capacity(0, 4)),
            Box::new(SimpleRowComparator::ascending(0)),
            1,
            false,
            Box::new(|_bytes: usize| false),
        );
        let page = Page::from_columns(vec![(0..8).map(Datum::from).collect()]);
        let mut work = builder.process_page(page);
        assert!(!work.process());
        drop(work);
        // The page was never fully absorbed; starting another one is a
        // usage error.
        let _ = builder.process_page(double_page(&[0.1]));
    }

    #[test]
    #[should_panic(expected = "top-n row count must be positive")]
    fn zero_n_is_rejected() {
        let _ = single_group_builder(0, true);
    }

    #[test]
    fn empty_input_produces_no_pages() {
        let builder = single_group_builder(3, true);
        assert_eq!(builder.build().count(), 0);

        let mut builder = single_group_builder(3, true);
        absorb(&mut builder, double_page(&[]));
        assert_eq!(builder.build().count(), 0);
    }

    #[test]
    fn retained_bytes_track_evictions() {
        let mut builder = single_group_builder(1, false);
        absorb(&mut builder, double_page(&[0.5]));
        let before = builder.retained_bytes();
        assert!(before > 0);
        // A better row replaces the old one; accounting does not grow.
        absorb(&mut builder, double_page(&[0.4]));
        assert_eq!(builder.retained_bytes(), before);
        assert_eq!(builder.retained_row_count(), 1);
        let kept = builder.build().exactly_one().ok().unwrap();
        assert_eq!(kept.column(0).value(0), &Datum::double(0.4));
    }
}
