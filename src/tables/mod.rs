//! In-memory views over the container's storage tables. The container
//! reader itself lives with the caller; these types hold its already
//! extracted output and answer the lookups the decoder needs.

pub mod bytes;

use std::collections::{BTreeSet, HashMap};

use crate::types::Date;

/// Fixed-size metadata blocks, one per logical record. Byte 0 carries the
/// deletion flag, bytes 4-7 the offset of the record's data.
pub struct FixedMeta {
    items: Vec<Vec<u8>>,
}

impl FixedMeta {
    pub fn new(items: Vec<Vec<u8>>) -> FixedMeta {
        FixedMeta { items }
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn byte_array_value(&self, index: usize) -> Option<&[u8]> {
        self.items.get(index).map(|v| v.as_slice())
    }
}

/// Fixed-layout record data. Records are addressed by index, but metadata
/// references them by their offset within the table; deletions fragment
/// the offsets without compacting, so both lookups are kept explicit.
pub struct FixedData {
    items: Vec<Vec<u8>>,
    offset_index: HashMap<u32, usize>,
}

impl FixedData {
    pub fn new(items: Vec<(u32, Vec<u8>)>) -> FixedData {
        let mut offset_index = HashMap::new();
        let mut records = Vec::with_capacity(items.len());
        for (index, (offset, data)) in items.into_iter().enumerate() {
            offset_index.insert(offset, index);
            records.push(data);
        }
        FixedData {
            items: records,
            offset_index,
        }
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn byte_array_value(&self, index: usize) -> Option<&[u8]> {
        self.items.get(index).map(|v| v.as_slice())
    }

    pub fn index_from_offset(&self, offset: u32) -> Option<usize> {
        self.offset_index.get(&offset).copied()
    }
}

/// Identifier index over the variable-length store. A fixed record with no
/// entry here is orphaned and skipped by the decoder.
pub struct VarMeta {
    unique_ids: BTreeSet<i32>,
}

impl VarMeta {
    pub fn new(unique_ids: BTreeSet<i32>) -> VarMeta {
        VarMeta { unique_ids }
    }

    pub fn from_ids(ids: &[i32]) -> VarMeta {
        VarMeta {
            unique_ids: ids.iter().copied().collect(),
        }
    }

    pub fn unique_identifier_set(&self) -> &BTreeSet<i32> {
        &self.unique_ids
    }
}

/// Variable-length field store keyed by (record identifier, field key).
#[derive(Default)]
pub struct Var2Data {
    entries: HashMap<(i32, u8), Vec<u8>>,
}

impl Var2Data {
    pub fn new() -> Var2Data {
        Var2Data::default()
    }

    pub fn insert(&mut self, id: i32, key: u8, data: Vec<u8>) {
        self.entries.insert((id, key), data);
    }

    pub fn byte_array(&self, id: i32, key: u8) -> Option<&[u8]> {
        self.entries.get(&(id, key)).map(|v| v.as_slice())
    }

    pub fn string(&self, id: i32, key: u8) -> Option<String> {
        self.byte_array(id, key)
            .map(|data| bytes::get_unicode_string(data, 0))
    }

    pub fn short(&self, id: i32, key: u8) -> Option<u16> {
        self.byte_array(id, key).map(|data| bytes::get_short(data, 0))
    }

    pub fn int(&self, id: i32, key: u8) -> Option<i32> {
        self.byte_array(id, key).map(|data| bytes::get_int(data, 0))
    }

    pub fn double(&self, id: i32, key: u8) -> Option<f64> {
        self.byte_array(id, key).map(|data| bytes::get_double(data, 0))
    }

    pub fn timestamp(&self, id: i32, key: u8) -> Option<Date> {
        self.byte_array(id, key)
            .and_then(|data| bytes::get_timestamp(data, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_data_offset_lookup() {
        let table = FixedData::new(vec![(0, vec![1]), (40, vec![2]), (120, vec![3])]);
        assert_eq!(table.index_from_offset(40), Some(1));
        assert_eq!(table.index_from_offset(41), None);
        assert_eq!(table.byte_array_value(2), Some(&[3u8][..]));
        assert_eq!(table.byte_array_value(9), None);
    }

    #[test]
    fn test_var2data_typed_reads() {
        let mut store = Var2Data::new();
        store.insert(1, 5, vec![b'o', 0, b'k', 0, 0, 0]);
        store.insert(1, 6, 42i32.to_le_bytes().to_vec());
        assert_eq!(store.string(1, 5).as_deref(), Some("ok"));
        assert_eq!(store.int(1, 6), Some(42));
        assert_eq!(store.byte_array(2, 5), None);
    }
}
