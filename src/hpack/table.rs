// Copyright (c) 2023 Huawei Device Co., Ltd.
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The [static] and [dynamic] header tables of HPACK and the combined
//! address space over both.
//!
//! [static]: https://httpwg.org/specs/rfc7541.html#static.table
//! [dynamic]: https://httpwg.org/specs/rfc7541.html#dynamic.table
//!
//! Indexes 1 through 61 address the fixed static table; indexes from 62
//! upwards address the dynamic table, counted from its most recent entry.
//! Because dynamic entries are inserted at the front, the meaning of a
//! dynamic index shifts after every insertion while the entries themselves
//! never change.

use std::collections::VecDeque;

/// Number of entries in the static table (RFC 7541 Appendix A).
pub(crate) const STATIC_TABLE_LEN: usize = 61;

/// Estimated overhead in octets that an entry adds to a dynamic table
/// beyond its name and value lengths (RFC 7541 Section 4.1).
const ENTRY_OVERHEAD: usize = 32;

/// An immutable header field: a name and a value.
///
/// Equality and hashing cover both parts. A field is created when a
/// literal is decoded or when a table entry is resolved, and is never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HpackHeader {
    name: String,
    value: String,
}

impl HpackHeader {
    /// Creates a header field from a name and a value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Octets this field accounts for in a dynamic table and in header
    /// list size checks.
    pub(crate) fn table_size(&self) -> usize {
        self.name.len() + self.value.len() + ENTRY_OVERHEAD
    }
}

/// The static header table: 61 predefined fields, 1-indexed.
pub(crate) struct StaticTable;

static STATIC_HEADER_FIELDS: [(&str, &str); STATIC_TABLE_LEN] = [
    (":authority", ""),
    (":method", "GET"),
    (":method", "POST"),
    (":path", "/"),
    (":path", "/index.html"),
    (":scheme", "http"),
    (":scheme", "https"),
    (":status", "200"),
    (":status", "204"),
    (":status", "206"),
    (":status", "304"),
    (":status", "400"),
    (":status", "404"),
    (":status", "500"),
    ("accept-charset", ""),
    ("accept-encoding", "gzip, deflate"),
    ("accept-language", ""),
    ("accept-ranges", ""),
    ("accept", ""),
    ("access-control-allow-origin", ""),
    ("age", ""),
    ("allow", ""),
    ("authorization", ""),
    ("cache-control", ""),
    ("content-disposition", ""),
    ("content-encoding", ""),
    ("content-language", ""),
    ("content-length", ""),
    ("content-location", ""),
    ("content-range", ""),
    ("content-type", ""),
    ("cookie", ""),
    ("date", ""),
    ("etag", ""),
    ("expect", ""),
    ("expires", ""),
    ("from", ""),
    ("host", ""),
    ("if-match", ""),
    ("if-modified-since", ""),
    ("if-none-match", ""),
    ("if-range", ""),
    ("if-unmodified-since", ""),
    ("last-modified", ""),
    ("link", ""),
    ("location", ""),
    ("max-forwards", ""),
    ("proxy-authenticate", ""),
    ("proxy-authorization", ""),
    ("range", ""),
    ("referer", ""),
    ("refresh", ""),
    ("retry-after", ""),
    ("server", ""),
    ("set-cookie", ""),
    ("strict-transport-security", ""),
    ("transfer-encoding", ""),
    ("user-agent", ""),
    ("vary", ""),
    ("via", ""),
    ("www-authenticate", ""),
];

impl StaticTable {
    /// Field at the given 1-based index.
    pub(crate) fn get(index: usize) -> Option<(&'static str, &'static str)> {
        match index {
            1..=STATIC_TABLE_LEN => Some(STATIC_HEADER_FIELDS[index - 1]),
            _ => None,
        }
    }

    /// Lowest 1-based index whose name matches.
    pub(crate) fn index_of(name: &str) -> Option<usize> {
        STATIC_HEADER_FIELDS
            .iter()
            .position(|(n, _)| *n == name)
            .map(|i| i + 1)
    }

    /// 1-based index of an exact (name, value) pair.
    pub(crate) fn index_of_field(name: &str, value: &str) -> Option<usize> {
        STATIC_HEADER_FIELDS
            .iter()
            .position(|(n, v)| *n == name && *v == value)
            .map(|i| i + 1)
    }
}

/// The dynamic header table: a bounded, first-in first-out list of
/// recently seen fields.
///
/// The table's size is the sum of every entry's accounted size and never
/// exceeds `max_size` after a mutation: inserting evicts the oldest
/// entries until the invariant holds again, and an entry that alone
/// exceeds `max_size` leaves the table empty without being stored.
#[derive(Clone)]
pub(crate) struct DynamicTable {
    queue: VecDeque<HpackHeader>,
    size: usize,
    max_size: usize,
}

impl DynamicTable {
    /// Creates an empty `DynamicTable` with the given size limit.
    pub(crate) fn with_max_size(max_size: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            size: 0,
            max_size,
        }
    }

    /// Current size in accounted octets.
    pub(crate) fn size(&self) -> usize {
        self.size
    }

    /// Number of entries.
    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    /// Field at the given index, counted from the most recent entry at 0.
    pub(crate) fn get(&self, index: usize) -> Option<&HpackHeader> {
        self.queue.get(index)
    }

    /// Inserts a field at the front of the table, then evicts from the
    /// back until the size invariant holds.
    pub(crate) fn add(&mut self, field: HpackHeader) {
        self.size += field.table_size();
        self.queue.push_front(field);
        self.evict_to_fit();
    }

    /// Changes the size limit. Shrinking evicts from the back; growing
    /// never evicts.
    pub(crate) fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        self.evict_to_fit();
    }

    fn evict_to_fit(&mut self) {
        while self.size > self.max_size && !self.queue.is_empty() {
            if let Some(evicted) = self.queue.pop_back() {
                self.size -= evicted.table_size();
            }
        }
    }

    /// Exact-pair index if present, otherwise the lowest name-only index,
    /// counted from the most recent entry at 0.
    fn index_of(&self, name: &str, value: &str) -> Option<TableIndex> {
        let mut name_only = None;
        for (i, field) in self.queue.iter().enumerate() {
            match (field.name() == name, field.value() == value, &name_only) {
                (true, true, _) => return Some(TableIndex::Field(i)),
                (true, false, None) => name_only = Some(TableIndex::Name(i)),
                _ => {}
            }
        }
        name_only
    }
}

/// An encode-side lookup result: an exact field match or a name-only
/// match.
pub(crate) enum TableIndex {
    Field(usize),
    Name(usize),
}

/// Resolves the combined 1-based address space over the static table and
/// one dynamic table.
pub(crate) struct TableSearcher<'a> {
    dynamic: &'a DynamicTable,
}

impl<'a> TableSearcher<'a> {
    pub(crate) fn new(dynamic: &'a DynamicTable) -> Self {
        Self { dynamic }
    }

    /// Field at a combined index. Index 0 is never valid.
    pub(crate) fn field(&self, index: usize) -> Option<HpackHeader> {
        if index == 0 {
            None
        } else if index <= STATIC_TABLE_LEN {
            StaticTable::get(index).map(|(name, value)| HpackHeader::new(name, value))
        } else {
            self.dynamic.get(index - STATIC_TABLE_LEN - 1).cloned()
        }
    }

    /// Field name at a combined index.
    pub(crate) fn field_name(&self, index: usize) -> Option<String> {
        if index == 0 {
            None
        } else if index <= STATIC_TABLE_LEN {
            StaticTable::get(index).map(|(name, _)| String::from(name))
        } else {
            self.dynamic
                .get(index - STATIC_TABLE_LEN - 1)
                .map(|field| String::from(field.name()))
        }
    }

    /// Best combined index for encoding: a static exact match wins, then a
    /// dynamic exact match, then a static name match, then a dynamic name
    /// match.
    pub(crate) fn index(&self, name: &str, value: &str) -> Option<TableIndex> {
        if let Some(i) = StaticTable::index_of_field(name, value) {
            return Some(TableIndex::Field(i));
        }
        let dynamic = self.dynamic.index_of(name, value);
        if let Some(TableIndex::Field(i)) = dynamic {
            return Some(TableIndex::Field(i + STATIC_TABLE_LEN + 1));
        }
        if let Some(i) = StaticTable::index_of(name) {
            return Some(TableIndex::Name(i));
        }
        match dynamic {
            Some(TableIndex::Name(i)) => Some(TableIndex::Name(i + STATIC_TABLE_LEN + 1)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod ut_static_table {
    use super::{StaticTable, STATIC_TABLE_LEN};

    /// UT test cases for `StaticTable::get`.
    ///
    /// # Brief
    /// 1. Reads every valid index and the invalid neighbours.
    /// 2. Checks entries fixed by RFC 7541 Appendix A.
    #[test]
    fn ut_static_table_get() {
        assert_eq!(StaticTable::get(0), None);
        assert_eq!(StaticTable::get(62), None);
        for index in 1..=STATIC_TABLE_LEN {
            assert!(StaticTable::get(index).is_some());
        }

        assert_eq!(StaticTable::get(1), Some((":authority", "")));
        assert_eq!(StaticTable::get(2), Some((":method", "GET")));
        assert_eq!(StaticTable::get(16), Some(("accept-encoding", "gzip, deflate")));
        assert_eq!(StaticTable::get(61), Some(("www-authenticate", "")));
    }

    /// UT test cases for `StaticTable` lookups.
    ///
    /// # Brief
    /// 1. Looks up names and exact pairs.
    /// 2. Checks that name lookup returns the lowest matching index.
    #[test]
    fn ut_static_table_lookup() {
        assert_eq!(StaticTable::index_of(":method"), Some(2));
        assert_eq!(StaticTable::index_of(":status"), Some(8));
        assert_eq!(StaticTable::index_of("cache-control"), Some(24));
        assert_eq!(StaticTable::index_of("x-custom"), None);

        assert_eq!(StaticTable::index_of_field(":method", "POST"), Some(3));
        assert_eq!(StaticTable::index_of_field(":status", "404"), Some(13));
        assert_eq!(StaticTable::index_of_field(":status", "302"), None);
    }
}

#[cfg(test)]
mod ut_dynamic_table {
    use super::{DynamicTable, HpackHeader, TableIndex, TableSearcher};

    fn field(name: &str, value: &str) -> HpackHeader {
        HpackHeader::new(name, value)
    }

    /// UT test cases for `DynamicTable::add` eviction.
    ///
    /// # Brief
    /// 1. Inserts fields whose cumulative size exceeds the limit.
    /// 2. Checks the oldest entries leave first and the size invariant
    ///    holds.
    #[test]
    fn ut_dynamic_table_eviction() {
        // Each field below accounts for 2 + 3 + 32 = 37 octets.
        let mut table = DynamicTable::with_max_size(74);
        table.add(field("k1", "v01"));
        table.add(field("k2", "v02"));
        assert_eq!(table.len(), 2);
        assert_eq!(table.size(), 74);

        table.add(field("k3", "v03"));
        assert_eq!(table.len(), 2);
        assert_eq!(table.size(), 74);
        assert_eq!(table.get(0), Some(&field("k3", "v03")));
        assert_eq!(table.get(1), Some(&field("k2", "v02")));
    }

    /// UT test cases for an entry larger than the whole table.
    ///
    /// # Brief
    /// 1. Inserts a field whose own accounted size exceeds `max_size`.
    /// 2. Checks the table ends up empty.
    #[test]
    fn ut_dynamic_table_oversized_entry() {
        let mut table = DynamicTable::with_max_size(64);
        table.add(field("k1", "v01"));
        assert_eq!(table.len(), 1);

        table.add(field("key-larger-than-the-table", "a string of some length"));
        assert_eq!(table.len(), 0);
        assert_eq!(table.size(), 0);
    }

    /// UT test cases for `DynamicTable::set_max_size`.
    ///
    /// # Brief
    /// 1. Shrinks the limit below the current size, then grows it back.
    /// 2. Checks shrinking evicts and growing does not.
    #[test]
    fn ut_dynamic_table_set_max_size() {
        let mut table = DynamicTable::with_max_size(128);
        table.add(field("k1", "v01"));
        table.add(field("k2", "v02"));
        assert_eq!(table.len(), 2);

        table.set_max_size(40);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0), Some(&field("k2", "v02")));

        table.set_max_size(128);
        assert_eq!(table.len(), 1);

        table.set_max_size(0);
        assert_eq!(table.len(), 0);
        assert_eq!(table.size(), 0);
    }

    /// UT test cases for combined index biasing.
    ///
    /// # Brief
    /// 1. Resolves index 62 after successive insertions.
    /// 2. Checks it always addresses the most recent entry while older
    ///    entries shift upwards.
    #[test]
    fn ut_table_searcher_index_bias() {
        let mut table = DynamicTable::with_max_size(4096);
        table.add(field("k1", "v01"));
        {
            let searcher = TableSearcher::new(&table);
            assert_eq!(searcher.field(62), Some(field("k1", "v01")));
        }

        table.add(field("k2", "v02"));
        let searcher = TableSearcher::new(&table);
        assert_eq!(searcher.field(62), Some(field("k2", "v02")));
        assert_eq!(searcher.field(63), Some(field("k1", "v01")));
        assert_eq!(searcher.field(64), None);
        assert_eq!(searcher.field(0), None);
        assert_eq!(searcher.field_name(62).as_deref(), Some("k2"));
    }

    /// UT test cases for `TableSearcher::index` preference order.
    ///
    /// # Brief
    /// 1. Looks up fields present in the static table, the dynamic table,
    ///    both, or neither.
    /// 2. Checks the match preference: static exact, dynamic exact, static
    ///    name, dynamic name.
    #[test]
    fn ut_table_searcher_match_preference() {
        let mut table = DynamicTable::with_max_size(4096);
        table.add(field(":method", "GET"));
        table.add(field("cache-control", "no-cache"));
        table.add(field("x-trace", "abc"));
        let searcher = TableSearcher::new(&table);

        // Static exact match wins even with a dynamic copy present.
        assert!(matches!(searcher.index(":method", "GET"), Some(TableIndex::Field(2))));

        // Dynamic exact match beats the static name-only match.
        assert!(matches!(
            searcher.index("cache-control", "no-cache"),
            Some(TableIndex::Field(63))
        ));

        // Static name-only match beats a dynamic name-only match.
        assert!(matches!(
            searcher.index("cache-control", "private"),
            Some(TableIndex::Name(24))
        ));

        // Dynamic name-only match is the last resort.
        assert!(matches!(searcher.index("x-trace", "def"), Some(TableIndex::Name(62))));

        assert!(searcher.index("x-unknown", "1").is_none());
    }
}
