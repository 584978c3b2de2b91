//! Field layout for assignment records. The same semantic field may live
//! at a fixed offset in one format variant and as a keyed variable-data
//! entry in the other; the map is resolved once per file, and population
//! runs an explicit per-field decode instead of reflective dispatch.

use std::collections::HashMap;

use num::FromPrimitive;

use crate::model::assignment::Assignment;
use crate::tables::bytes;
use crate::tables::Var2Data;
use crate::types::{Date, Duration, TimeUnit};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum AssignmentField {
    UniqueId,
    TaskUniqueId,
    ResourceUniqueId,
    Start,
    Finish,
    Units,
    Work,
    ActualWork,
    RemainingWork,
    /// Numbered boolean flag, 1 through 20.
    Flag(u8),
    Confirmed,
    ResponsePending,
    TeamStatusPending,
    HyperlinkData,
    Notes,
    CreateDate,
    CompleteWorkData,
    PlannedWorkData,
    VariableRateUnits,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FieldLocation {
    FixedData,
    VarData,
}

/// How the raw bytes of a field decode into a value.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FieldType {
    Int,
    /// Two-byte value scaled by 100, yielding units on a 0-100 scale.
    Units2,
    /// Eight-byte float in milli-minutes, yielding a duration in hours.
    WorkDouble,
    Timestamp,
    UnicodeString,
    Bool,
    /// Single-byte time-unit code; zero means unset.
    RateUnits,
    /// Opaque blob fetched directly by the decoder, never populated here.
    Raw,
}

#[derive(Clone, Copy, Debug)]
pub struct FieldItem {
    pub location: FieldLocation,
    /// Which fixed-data block the offset addresses (0 = primary, 1 = secondary).
    pub data_block: usize,
    pub fixed_offset: usize,
    pub var_data_key: u8,
    pub field_type: FieldType,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Int(i32),
    Double(f64),
    Duration(Duration),
    Date(Date),
    Text(String),
    Bool(bool),
    RateUnits(TimeUnit),
}

pub struct FieldMap {
    items: HashMap<AssignmentField, FieldItem>,
    max_fixed_offset: [usize; 2],
}

impl FieldMap {
    pub fn new() -> FieldMap {
        FieldMap {
            items: HashMap::new(),
            max_fixed_offset: [0, 0],
        }
    }

    pub fn add_fixed(
        &mut self,
        field: AssignmentField,
        data_block: usize,
        offset: usize,
        field_type: FieldType,
    ) {
        self.items.insert(
            field,
            FieldItem {
                location: FieldLocation::FixedData,
                data_block,
                fixed_offset: offset,
                var_data_key: 0,
                field_type,
            },
        );
        if data_block < self.max_fixed_offset.len() {
            let max = &mut self.max_fixed_offset[data_block];
            *max = (*max).max(offset);
        }
    }

    pub fn add_var(&mut self, field: AssignmentField, key: u8, field_type: FieldType) {
        self.items.insert(
            field,
            FieldItem {
                location: FieldLocation::VarData,
                data_block: 0,
                fixed_offset: 0,
                var_data_key: key,
                field_type,
            },
        );
    }

    pub fn field_location(&self, field: AssignmentField) -> Option<FieldLocation> {
        self.items.get(&field).map(|item| item.location)
    }

    pub fn fixed_data_offset(&self, field: AssignmentField) -> Option<usize> {
        self.items
            .get(&field)
            .filter(|item| item.location == FieldLocation::FixedData)
            .map(|item| item.fixed_offset)
    }

    pub fn var_data_key(&self, field: AssignmentField) -> Option<u8> {
        self.items
            .get(&field)
            .filter(|item| item.location == FieldLocation::VarData)
            .map(|item| item.var_data_key)
    }

    /// Largest fixed offset mapped for the given data block. Records
    /// shorter than this are padded before field extraction.
    pub fn max_fixed_data_offset(&self, data_block: usize) -> usize {
        self.max_fixed_offset.get(data_block).copied().unwrap_or(0)
    }

    /// Bulk-populate every mapped field. The assignment is expected to be
    /// in batch-mutation mode; `Raw` blobs are fetched by the decoder
    /// itself and skipped here.
    pub fn populate_container(
        &self,
        assignment: &mut Assignment,
        id: i32,
        fixed: &[Option<&[u8]>; 2],
        var_data: &Var2Data,
    ) {
        for (field, item) in &self.items {
            if item.field_type == FieldType::Raw {
                continue;
            }
            let value = match item.location {
                FieldLocation::FixedData => fixed
                    .get(item.data_block)
                    .and_then(|block| *block)
                    .and_then(|data| decode_fixed(data, item.fixed_offset, item.field_type)),
                FieldLocation::VarData => decode_var(var_data, id, item.var_data_key, item.field_type),
            };
            if let Some(value) = value {
                assignment.set_field_value(*field, value);
            }
        }
    }
}

impl Default for FieldMap {
    fn default() -> FieldMap {
        FieldMap::new()
    }
}

fn decode_fixed(data: &[u8], offset: usize, field_type: FieldType) -> Option<FieldValue> {
    match field_type {
        FieldType::Int => Some(FieldValue::Int(bytes::get_int(data, offset))),
        FieldType::Units2 => Some(FieldValue::Double(
            bytes::get_short(data, offset) as f64 / 100.0,
        )),
        FieldType::WorkDouble => Some(FieldValue::Duration(Duration::hours(
            bytes::get_double(data, offset) / 60000.0,
        ))),
        FieldType::Timestamp => bytes::get_timestamp(data, offset).map(FieldValue::Date),
        FieldType::Bool => Some(FieldValue::Bool(bytes::get_short(data, offset) != 0)),
        FieldType::RateUnits => {
            let code = bytes::get_byte(data, offset);
            TimeUnit::from_u8(code).map(FieldValue::RateUnits)
        }
        FieldType::UnicodeString => Some(FieldValue::Text(bytes::get_unicode_string(data, offset))),
        FieldType::Raw => None,
    }
}

fn decode_var(var_data: &Var2Data, id: i32, key: u8, field_type: FieldType) -> Option<FieldValue> {
    match field_type {
        FieldType::Int => var_data.int(id, key).map(FieldValue::Int),
        FieldType::Units2 => var_data
            .short(id, key)
            .map(|v| FieldValue::Double(v as f64 / 100.0)),
        FieldType::WorkDouble => var_data
            .double(id, key)
            .map(|v| FieldValue::Duration(Duration::hours(v / 60000.0))),
        FieldType::Timestamp => var_data.timestamp(id, key).map(FieldValue::Date),
        FieldType::Bool => var_data.short(id, key).map(|v| FieldValue::Bool(v != 0)),
        FieldType::RateUnits => var_data
            .byte_array(id, key)
            .map(|data| bytes::get_byte(data, 0))
            .and_then(TimeUnit::from_u8)
            .map(FieldValue::RateUnits),
        FieldType::UnicodeString => var_data.string(id, key).map(FieldValue::Text),
        FieldType::Raw => None,
    }
}

// Variable-data keys shared by both layouts.
pub const KEY_NOTES: u8 = 1;
pub const KEY_HYPERLINK_DATA: u8 = 2;
pub const KEY_COMPLETE_WORK_DATA: u8 = 3;
pub const KEY_PLANNED_WORK_DATA: u8 = 4;
pub const KEY_VARIABLE_RATE_UNITS: u8 = 5;
pub const KEY_CREATE_DATE: u8 = 6;
const KEY_FLAG_BASE: u8 = 20;
const KEY_CONFIRMED: u8 = 40;
const KEY_RESPONSE_PENDING: u8 = 41;
const KEY_TEAM_STATUS_PENDING: u8 = 42;

fn assignment_common() -> FieldMap {
    let mut map = FieldMap::new();
    map.add_fixed(AssignmentField::UniqueId, 0, 0, FieldType::Int);
    map.add_fixed(AssignmentField::TaskUniqueId, 0, 4, FieldType::Int);
    map.add_fixed(AssignmentField::ResourceUniqueId, 0, 8, FieldType::Int);
    map.add_fixed(AssignmentField::Start, 0, 12, FieldType::Timestamp);
    map.add_fixed(AssignmentField::Finish, 0, 16, FieldType::Timestamp);
    map.add_fixed(AssignmentField::Units, 0, 54, FieldType::Units2);
    map.add_fixed(AssignmentField::Work, 0, 62, FieldType::WorkDouble);
    map.add_fixed(AssignmentField::ActualWork, 0, 70, FieldType::WorkDouble);
    map.add_fixed(AssignmentField::RemainingWork, 0, 86, FieldType::WorkDouble);
    map.add_var(AssignmentField::Notes, KEY_NOTES, FieldType::UnicodeString);
    map.add_var(AssignmentField::HyperlinkData, KEY_HYPERLINK_DATA, FieldType::Raw);
    map.add_var(
        AssignmentField::CompleteWorkData,
        KEY_COMPLETE_WORK_DATA,
        FieldType::Raw,
    );
    map.add_var(
        AssignmentField::PlannedWorkData,
        KEY_PLANNED_WORK_DATA,
        FieldType::Raw,
    );
    map.add_var(
        AssignmentField::VariableRateUnits,
        KEY_VARIABLE_RATE_UNITS,
        FieldType::RateUnits,
    );
    map
}

/// Layout for the older variant: booleans stay packed in the fixed
/// metadata block, the creation date is backfilled from a secondary blob.
pub fn assignment_mpp9() -> FieldMap {
    assignment_common()
}

/// Layout for the newer variant: flags and the creation date moved into
/// the variable-data store.
pub fn assignment_mpp12() -> FieldMap {
    let mut map = assignment_common();
    map.add_var(AssignmentField::CreateDate, KEY_CREATE_DATE, FieldType::Timestamp);
    for flag in 1..=20u8 {
        map.add_var(
            AssignmentField::Flag(flag),
            KEY_FLAG_BASE + flag - 1,
            FieldType::Bool,
        );
    }
    map.add_var(AssignmentField::Confirmed, KEY_CONFIRMED, FieldType::Bool);
    map.add_var(
        AssignmentField::ResponsePending,
        KEY_RESPONSE_PENDING,
        FieldType::Bool,
    );
    map.add_var(
        AssignmentField::TeamStatusPending,
        KEY_TEAM_STATUS_PENDING,
        FieldType::Bool,
    );
    map
}
