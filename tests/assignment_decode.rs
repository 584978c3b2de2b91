//! End-to-end decode over hand-built fixed and variable tables.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{NaiveDate, Timelike};

use projfile::calendar::StandardCalendar;
use projfile::decode::AssignmentReader;
use projfile::fields::{self, FieldMap};
use projfile::model::{
    Assignment, DecodeConfig, FileVariant, ProjectFile, ProjectListener, Resource, Task,
};
use projfile::tables::{FixedData, FixedMeta, Var2Data, VarMeta};
use projfile::types::{Date, ResourceType, WorkContour};

const CALENDAR_ID: i32 = 1;

fn date(y: i32, m: u32, d: u32, h: u32) -> Date {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

/// Day count / tenths-of-minutes encoding used by record timestamps.
fn timestamp_bytes(value: Date) -> [u8; 4] {
    let epoch = NaiveDate::from_ymd_opt(1983, 12, 31).unwrap();
    let days = (value.date() - epoch).num_days() as u16;
    let minutes = value.time().hour() as u16 * 60 + value.time().minute() as u16;
    let mut out = [0u8; 4];
    out[..2].copy_from_slice(&(minutes * 10).to_le_bytes());
    out[2..].copy_from_slice(&days.to_le_bytes());
    out
}

struct RecordFixture {
    id: i32,
    task_id: i32,
    resource_id: i32,
    units: u16,
    start: Date,
    finish: Date,
    work_minutes: f64,
    remaining_minutes: f64,
    deleted: bool,
}

fn fixed_record(record: &RecordFixture) -> Vec<u8> {
    let mut data = vec![0u8; 95];
    data[..4].copy_from_slice(&record.id.to_le_bytes());
    data[4..8].copy_from_slice(&record.task_id.to_le_bytes());
    data[8..12].copy_from_slice(&record.resource_id.to_le_bytes());
    data[12..16].copy_from_slice(&timestamp_bytes(record.start));
    data[16..20].copy_from_slice(&timestamp_bytes(record.finish));
    data[54..56].copy_from_slice(&(record.units * 100).to_le_bytes());
    data[62..70].copy_from_slice(&(record.work_minutes * 60000.0 / 60.0).to_le_bytes());
    data[86..94].copy_from_slice(&(record.remaining_minutes * 60000.0 / 60.0).to_le_bytes());
    data
}

fn meta_record(offset: u32, deleted: bool) -> Vec<u8> {
    let mut meta = vec![0u8; 32];
    if deleted {
        meta[0] = 1;
    }
    meta[4..8].copy_from_slice(&offset.to_le_bytes());
    meta
}

fn build_tables(items: &[RecordFixture]) -> (FixedMeta, FixedData, VarMeta, Var2Data) {
    let mut metas = Vec::new();
    let mut records = Vec::new();
    let mut ids = Vec::new();
    let mut offset = 0u32;
    for item in items {
        let data = fixed_record(item);
        metas.push(meta_record(offset, item.deleted));
        offset += data.len() as u32;
        records.push((offset - data.len() as u32, data));
        ids.push(item.id);
    }
    (
        FixedMeta::new(metas),
        FixedData::new(records),
        VarMeta::from_ids(&ids),
        Var2Data::new(),
    )
}

fn project() -> ProjectFile {
    let mut file = ProjectFile::new(FileVariant::Mpp9);
    file.add_calendar(CALENDAR_ID, Box::new(StandardCalendar::new()));
    file.set_default_calendar(CALENDAR_ID);
    file.add_task(Task::new(10, "build"));
    file.add_resource(Resource::new(20, "dev", ResourceType::Work));
    file
}

fn record(id: i32) -> RecordFixture {
    RecordFixture {
        id,
        task_id: 10,
        resource_id: 20,
        units: 100,
        start: date(2023, 1, 2, 8),
        finish: date(2023, 1, 6, 17),
        work_minutes: 2400.0,
        remaining_minutes: 2400.0,
        deleted: false,
    }
}

fn decode(file: &mut ProjectFile, tables: &(FixedMeta, FixedData, VarMeta, Var2Data)) {
    decode_with_map(file, tables, &fields::assignment_mpp9());
}

fn decode_with_map(
    file: &mut ProjectFile,
    tables: &(FixedMeta, FixedData, VarMeta, Var2Data),
    map: &FieldMap,
) {
    let reader = AssignmentReader::new();
    let config = DecodeConfig::default();
    reader.process(
        file,
        map,
        &config,
        &tables.0,
        &tables.1,
        None,
        &tables.2,
        &tables.3,
    );
}

#[test]
fn deleted_records_produce_no_assignment() {
    let mut deleted = record(1);
    deleted.deleted = true;
    let tables = build_tables(&[deleted, record(2)]);
    let mut file = project();
    decode(&mut file, &tables);
    assert_eq!(file.assignments.len(), 1);
    assert_eq!(file.assignments[0].unique_id, 2);
}

#[test]
fn orphaned_record_without_variable_counterpart_is_skipped() {
    let (meta, data, _, var) = build_tables(&[record(1)]);
    let var_meta = VarMeta::from_ids(&[999]);
    let mut file = project();
    decode(&mut file, &(meta, data, var_meta, var));
    assert!(file.assignments.is_empty());
}

#[test]
fn undersized_record_is_padded_not_rejected() {
    let full = fixed_record(&record(1));
    let truncated = full[..20].to_vec();
    let meta = FixedMeta::new(vec![meta_record(0, false)]);
    let data = FixedData::new(vec![(0, truncated)]);
    let var_meta = VarMeta::from_ids(&[1]);
    let mut file = project();
    decode(&mut file, &(meta, data, var_meta, Var2Data::new()));
    assert_eq!(file.assignments.len(), 1);
    // Fields past the truncation decode from padding as unset/zero.
    let a = &file.assignments[0];
    assert_eq!(a.unique_id, 1);
    assert_eq!(a.start, Some(date(2023, 1, 2, 8)));
    assert_eq!(a.units, Some(0.0));
}

#[test]
fn unknown_task_leaves_assignment_unlinked_without_timephased() {
    let mut orphan = record(1);
    orphan.task_id = 999;
    let tables = build_tables(&[orphan]);
    let mut file = project();
    decode(&mut file, &tables);
    assert_eq!(file.assignments.len(), 1);
    let a = &file.assignments[0];
    assert!(a.timephased_planned.is_empty());
    assert!(a.work_contour.is_none());
    assert!(file.tasks[&10].assignments.is_empty());
}

#[test]
fn synthetic_segment_when_no_timephased_data() {
    let tables = build_tables(&[record(1)]);
    let mut file = project();
    decode(&mut file, &tables);
    let a = &file.assignments[0];
    assert_eq!(a.timephased_planned.len(), 1);
    assert!(a.timephased_complete.is_empty());
    let seg = &a.timephased_planned[0];
    assert_eq!(seg.start, date(2023, 1, 2, 8));
    assert_eq!(seg.finish, date(2023, 1, 6, 17));
    assert!(!seg.modified);
    // 100% units of a work resource takes the default 480 min/day.
    assert_eq!(seg.work_per_day.value, 480.0);
    assert_eq!(a.actual_start, None);
    // No contour: no planned-work blob was present.
    assert_eq!(a.work_contour, None);
}

#[test]
fn synthetic_rate_halves_at_fifty_units() {
    let mut half = record(1);
    half.units = 50;
    let tables = build_tables(&[half]);
    let mut file = project();
    decode(&mut file, &tables);
    let seg = &file.assignments[0].timephased_planned[0];
    assert_eq!(seg.work_per_day.value, 240.0);
}

#[test]
fn actual_finish_needs_zero_remaining_and_a_resource() {
    let mut done = record(1);
    done.remaining_minutes = 0.0;
    let tables = build_tables(&[done]);
    let mut file = project();
    decode(&mut file, &tables);
    assert_eq!(file.assignments[0].actual_finish, Some(date(2023, 1, 6, 17)));

    // Same record against a graph without the resource: finish stays unset.
    let mut no_resource = project();
    no_resource.resources.clear();
    decode(&mut no_resource, &tables);
    assert_eq!(no_resource.assignments[0].actual_finish, None);
}

#[test]
fn actual_finish_derives_without_any_calendar() {
    let mut done = record(1);
    done.remaining_minutes = 0.0;
    let tables = build_tables(&[done]);
    let mut file = ProjectFile::new(FileVariant::Mpp9);
    file.add_task(Task::new(10, "build"));
    file.add_resource(Resource::new(20, "dev", ResourceType::Work));
    decode(&mut file, &tables);
    let a = &file.assignments[0];
    // Timephased derivation needs a calendar; the actual dates do not.
    assert!(a.timephased_planned.is_empty());
    assert_eq!(a.actual_start, None);
    assert_eq!(a.actual_finish, Some(date(2023, 1, 6, 17)));
    assert_eq!(file.tasks[&10].assignments, vec![0]);
}

#[test]
fn contour_comes_from_shape_code_when_unmodified() {
    let mut tables = build_tables(&[record(1)]);
    let mut blob = vec![0u8; 40];
    blob[28..30].copy_from_slice(&6u16.to_le_bytes()); // bell
    tables.3.insert(1, fields::KEY_PLANNED_WORK_DATA, blob);
    let mut file = project();
    decode(&mut file, &tables);
    assert_eq!(file.assignments[0].work_contour, Some(WorkContour::Bell));
}

#[test]
fn modified_planned_blocks_classify_as_contoured() {
    let mut tables = build_tables(&[record(1)]);
    let mut blob = vec![0u8; 40 + 28];
    blob[..2].copy_from_slice(&1u16.to_le_bytes());
    blob[24..28].copy_from_slice(&(480 * 80i32).to_le_bytes());
    blob[28..30].copy_from_slice(&6u16.to_le_bytes()); // ignored shape code
    blob[44..52].copy_from_slice(&(480.0f64 * 1000.0).to_le_bytes());
    blob[60..62].copy_from_slice(&80u16.to_le_bytes());
    blob[62..64].copy_from_slice(&1u16.to_le_bytes()); // modified bit
    tables.3.insert(1, fields::KEY_PLANNED_WORK_DATA, blob);
    let mut file = project();
    decode(&mut file, &tables);
    let a = &file.assignments[0];
    assert_eq!(a.work_contour, Some(WorkContour::Contoured));
    assert_eq!(a.timephased_planned.len(), 1);
}

#[test]
fn completed_work_sets_actual_start() {
    let mut tables = build_tables(&[record(1)]);
    let mut blob = vec![0u8; 32 + 20];
    blob[..2].copy_from_slice(&1u16.to_le_bytes());
    blob[24..28].copy_from_slice(&(480 * 80i32).to_le_bytes());
    blob[36..44].copy_from_slice(&(480.0f64 * 1000.0).to_le_bytes());
    blob[44..48].copy_from_slice(&(480 * 125 / 6i32).to_le_bytes());
    tables.3.insert(1, fields::KEY_COMPLETE_WORK_DATA, blob);
    let mut file = project();
    decode(&mut file, &tables);
    let a = &file.assignments[0];
    assert_eq!(a.timephased_complete.len(), 1);
    assert_eq!(a.actual_start, Some(date(2023, 1, 2, 8)));
}

#[test]
fn hyperlink_fields_decode_from_blob() {
    let mut tables = build_tables(&[record(1)]);
    let mut blob = vec![0u8; 12];
    for text in ["A", "B", "C", "D"] {
        blob.extend_from_slice(&[0u8; 12]);
        for unit in text.encode_utf16() {
            blob.extend_from_slice(&unit.to_le_bytes());
        }
        blob.extend_from_slice(&[0, 0]);
    }
    tables.3.insert(1, fields::KEY_HYPERLINK_DATA, blob);
    let mut file = project();
    decode(&mut file, &tables);
    let a = &file.assignments[0];
    assert_eq!(a.hyperlink.as_deref(), Some("A"));
    assert_eq!(a.hyperlink_address.as_deref(), Some("B"));
    assert_eq!(a.hyperlink_sub_address.as_deref(), Some("C"));
    assert_eq!(a.hyperlink_screen_tip.as_deref(), Some("D"));
}

#[test]
fn notes_markup_is_stripped_by_default() {
    let mut tables = build_tables(&[record(1)]);
    let note = "{\\rtf1 plain\\par text}";
    let encoded: Vec<u8> = note
        .encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(|u| u.to_le_bytes())
        .collect();
    tables.3.insert(1, fields::KEY_NOTES, encoded);
    let mut file = project();
    decode(&mut file, &tables);
    assert_eq!(file.assignments[0].notes.as_deref(), Some("plain\ntext"));
}

#[test]
fn creation_date_backfills_from_secondary_blob() {
    let mut tables = build_tables(&[record(1)]);
    let mut blob = vec![0u8; 28];
    blob[24..28].copy_from_slice(&timestamp_bytes(date(2022, 6, 1, 9)));
    tables.3.insert(1, 138, blob);
    let mut file = project();
    decode(&mut file, &tables);
    assert_eq!(file.assignments[0].create_date, Some(date(2022, 6, 1, 9)));
}

#[test]
fn meta_flags_decode_for_legacy_layout() {
    let full = fixed_record(&record(1));
    let mut meta = meta_record(0, false);
    meta[8] = 0x80; // confirmed
    meta[29] = 0x01; // flag 2
    meta[31] = 0x04; // flag 20
    let tables = (
        FixedMeta::new(vec![meta]),
        FixedData::new(vec![(0, full)]),
        VarMeta::from_ids(&[1]),
        Var2Data::new(),
    );
    let mut file = project();
    decode(&mut file, &tables);
    let a = &file.assignments[0];
    assert!(a.confirmed);
    assert!(a.flag(2));
    assert!(a.flag(20));
    assert!(!a.flag(1));
}

#[test]
fn newer_layout_takes_flags_from_variable_data() {
    let full = fixed_record(&record(1));
    let mut meta = meta_record(0, false);
    meta[29] = 0xFF; // would set flags 2-9 under the legacy layout
    let mut var = Var2Data::new();
    var.insert(1, 22, vec![1, 0]); // flag 3
    let tables = (
        FixedMeta::new(vec![meta]),
        FixedData::new(vec![(0, full)]),
        VarMeta::from_ids(&[1]),
        var,
    );
    let mut file = ProjectFile::new(FileVariant::Mpp12);
    file.add_calendar(CALENDAR_ID, Box::new(StandardCalendar::new()));
    file.set_default_calendar(CALENDAR_ID);
    file.add_task(Task::new(10, "build"));
    file.add_resource(Resource::new(20, "dev", ResourceType::Work));
    decode_with_map(&mut file, &tables, &fields::assignment_mpp12());
    let a = &file.assignments[0];
    assert!(a.flag(3));
    assert!(!a.flag(2));
    assert!(!a.flag(9));
}

struct CountingListener(Rc<RefCell<Vec<i32>>>);

impl ProjectListener for CountingListener {
    fn assignment_read(&mut self, assignment: &Assignment) {
        self.0.borrow_mut().push(assignment.unique_id);
    }
}

#[test]
fn listener_fires_per_linked_assignment() {
    let mut unlinked = record(2);
    unlinked.task_id = 999;
    let tables = build_tables(&[record(1), unlinked]);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut file = project();
    file.add_listener(Box::new(CountingListener(Rc::clone(&seen))));
    decode(&mut file, &tables);
    assert_eq!(*seen.borrow(), vec![1]);
}

#[test]
fn decoding_twice_yields_equal_assignment_sets() {
    let tables = build_tables(&[record(1), record(2), record(3)]);
    let mut first = project();
    let mut second = project();
    decode(&mut first, &tables);
    decode(&mut second, &tables);
    assert_eq!(first.assignments, second.assignments);
}
