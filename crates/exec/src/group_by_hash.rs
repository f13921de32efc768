//! Group resolution: mapping each input row to a stable small-integer
//! group identifier.
//!
//! The hash owns its table growth and is the operator's suspension point:
//! when growing the table would exceed the memory budget, group resolution
//! reports "blocked" instead of allocating past it, and the caller yields
//! until the pool approves the reservation.

use std::hash::{DefaultHasher, Hash, Hasher};

use tracing::debug;

use crate::{datum::Datum, memory::UpdateMemory, page::Page};

/// Identifier of one group, stable for the lifetime of the operator
/// instance that produced it.
pub type GroupId = usize;

/// Maps rows to group identifiers.
pub trait GroupByHash {
    /// Resolves the group of the row at `position` of `page`, registering
    /// a new group if the key has not been seen.  Returns `None` when the
    /// hash cannot proceed because growth was denied by `memory`; the
    /// caller must yield and call again once the pool reports ready.
    fn get_group_id(
        &mut self,
        page: &Page,
        position: usize,
        memory: &mut dyn UpdateMemory,
    ) -> Option<GroupId>;

    /// True while the last growth request stands denied.
    fn is_blocked(&self) -> bool;

    /// The number of distinct groups seen so far.
    fn group_count(&self) -> usize;
}

/// The no-channel variant: every row belongs to group 0.  Never blocks.
#[derive(Clone, Copy, Debug, Default)]
pub struct SingleGroupByHash;

impl GroupByHash for SingleGroupByHash {
    fn get_group_id(
        &mut self,
        _page: &Page,
        _position: usize,
        _memory: &mut dyn UpdateMemory,
    ) -> Option<GroupId> {
        Some(0)
    }

    fn is_blocked(&self) -> bool {
        false
    }

    fn group_count(&self) -> usize {
        1
    }
}

/// Open-addressed group hash over a single key channel.
///
/// Group identifiers are assigned in first-seen order.  The table grows by
/// doubling at 3/4 occupancy; the new table is reserved through the
/// [UpdateMemory] callback before it is allocated, and a denial leaves the
/// hash blocked with the pending row unconsumed.
pub struct DatumGroupByHash {
    channel: usize,
    // group id -> key value
    keys: Vec<Datum>,
    // open addressing; -1 is empty, otherwise a group id
    table: Vec<i64>,
    blocked: bool,
}

impl DatumGroupByHash {
    const FILL_NUMERATOR: usize = 3;
    const FILL_DENOMINATOR: usize = 4;

    /// Creates a hash grouping on `channel` with the default initial
    /// capacity.
    pub fn new(channel: usize) -> Self {
        Self::with_capacity(channel, 16)
    }

    /// Creates a hash with an explicit initial table capacity (a power of
    /// two).  Small capacities force early growth, which tests use to
    /// exercise the yield path.
    pub fn with_capacity(channel: usize, capacity: usize) -> Self {
        assert!(capacity.is_power_of_two(), "capacity must be a power of two");
        Self {
            channel,
            keys: Vec::new(),
            table: vec![-1; capacity],
            blocked: false,
        }
    }

    fn hash_key(key: &Datum) -> u64 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish()
    }

    fn needs_growth(&self) -> bool {
        (self.keys.len() + 1) * Self::FILL_DENOMINATOR > self.table.len() * Self::FILL_NUMERATOR
    }

    /// Bytes the hash would occupy after growing to `capacity` slots.
    fn estimated_bytes(&self, capacity: usize) -> usize {
        capacity * std::mem::size_of::<i64>()
            + self.keys.iter().map(Datum::estimated_bytes).sum::<usize>()
    }

    fn grow(&mut self, memory: &mut dyn UpdateMemory) -> bool {
        let new_capacity = self.table.len() * 2;
        if !memory.update(self.estimated_bytes(new_capacity)) {
            if !self.blocked {
                debug!(new_capacity, "group-by hash growth denied; blocking");
            }
            self.blocked = true;
            return false;
        }
        self.blocked = false;
        let mut table = vec![-1i64; new_capacity];
        let mask = new_capacity - 1;
        for (group, key) in self.keys.iter().enumerate() {
            let mut slot = Self::hash_key(key) as usize & mask;
            while table[slot] >= 0 {
                slot = (slot + 1) & mask;
            }
            table[slot] = group as i64;
        }
        self.table = table;
        debug!(new_capacity, groups = self.keys.len(), "group-by hash grown");
        true
    }
}

impl GroupByHash for DatumGroupByHash {
    fn get_group_id(
        &mut self,
        page: &Page,
        position: usize,
        memory: &mut dyn UpdateMemory,
    ) -> Option<GroupId> {
        if self.needs_growth() && !self.grow(memory) {
            return None;
        }
        let key = page.column(self.channel).value(position);
        let mask = self.table.len() - 1;
        let mut slot = Self::hash_key(key) as usize & mask;
        loop {
            match self.table[slot] {
                -1 => {
                    let group = self.keys.len();
                    self.keys.push(key.clone());
                    self.table[slot] = group as i64;
                    return Some(group);
                }
                group if &self.keys[group as usize] == key => return Some(group as GroupId),
                _ => slot = (slot + 1) & mask,
            }
        }
    }

    fn is_blocked(&self) -> bool {
        self.blocked
    }

    fn group_count(&self) -> usize {
        self.keys.len()
    }
}

#[cfg(test)]
mod test {
    use super::{DatumGroupByHash, GroupByHash, SingleGroupByHash};
    use crate::{datum::Datum, memory::UnboundedPool, page::Page};

    fn key_page(keys: &[i64]) -> Page {
        Page::from_columns(vec![keys.iter().map(|k| Datum::from(*k)).collect()])
    }

    #[test]
    fn single_group() {
        let mut hash = SingleGroupByHash;
        let page = key_page(&[7, 8, 9]);
        for position in 0..3 {
            assert_eq!(
                hash.get_group_id(&page, position, &mut UnboundedPool),
                Some(0)
            );
        }
        assert_eq!(hash.group_count(), 1);
        assert!(!hash.is_blocked());
    }

    #[test]
    fn groups_assigned_in_first_seen_order() {
        let mut hash = DatumGroupByHash::new(0);
        let page = key_page(&[30, 10, 30, 20, 10]);
        let groups: Vec<_> = (0..5)
            .map(|p| hash.get_group_id(&page, p, &mut UnboundedPool).unwrap())
            .collect();
        assert_eq!(groups, vec![0, 1, 0, 2, 1]);
        assert_eq!(hash.group_count(), 3);
    }

    #[test]
    fn growth_blocks_until_memory_granted() {
        let mut hash = DatumGroupByHash::with_capacity(0, 4);
        let page = key_page(&[1, 2, 3, 4, 5, 6]);
        let mut deny = |_bytes: usize| false;
        let mut grant = |_bytes: usize| true;

        for position in 0..3 {
            assert_eq!(
                hash.get_group_id(&page, position, &mut deny),
                Some(position)
            );
        }
        // The fourth insertion would cross 3/4 occupancy.
        assert_eq!(hash.get_group_id(&page, 3, &mut deny), None);
        assert!(hash.is_blocked());
        // The row was not consumed; retrying under a granting pool resumes.
        assert_eq!(hash.get_group_id(&page, 3, &mut grant), Some(3));
        assert!(!hash.is_blocked());
        for position in 4..6 {
            assert!(hash.get_group_id(&page, position, &mut grant).is_some());
        }
        assert_eq!(hash.group_count(), 6);
    }
}
