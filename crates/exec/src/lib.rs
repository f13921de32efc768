//! Execution operators for the Kairos SQL engine.
//!
//! Rows move between operators in [Page] batches of immutable [Column]s
//! over the [Datum] value types (including the temporal and decimal types
//! from the companion crates).  The [topn] module holds the grouped Top-N
//! builder; [group_by_hash] is its group-resolution collaborator, and
//! [memory] defines the cooperative memory-accounting contract both follow
//! under a bounded pool: exhaustion suspends processing, it never fails it.

pub mod datum;
pub mod group_by_hash;
pub mod memory;
pub mod page;
pub mod row;
pub mod topn;

pub use datum::{Datum, F64};
pub use group_by_hash::{DatumGroupByHash, GroupByHash, GroupId, SingleGroupByHash};
pub use memory::{UnboundedPool, UpdateMemory};
pub use page::{Column, Page, PageBuilder};
pub use row::{
    ChannelEqualsAndHash, RowComparator, RowEqualsAndHash, SimpleRowComparator, SortOrder,
};
pub use topn::{GroupedTopNBuilder, TopNOutput, Work};
