//! The assignment decode pass: iterates fixed records, populates the
//! assignment entity, decodes packed flags, hyperlinks and timephased
//! work, and links the result into the task graph. No per-record anomaly
//! aborts the pass; bad records degrade to a skipped step or a skipped
//! record, matching the irregularities real files are known to contain.

pub mod contour;
pub mod flags;
pub mod hyperlink;
pub mod normalise;
pub mod split;
pub mod synthetic;
pub mod timephased;

use std::borrow::Cow;

use log::{debug, warn};

use crate::calendar::ProjectCalendar;
use crate::fields::{AssignmentField, FieldLocation, FieldMap};
use crate::model::{Assignment, DecodeConfig, FileVariant, ProjectFile};
use crate::rtf;
use crate::tables::{bytes, FixedData, FixedMeta, Var2Data, VarMeta};

use normalise::{StandardNormaliser, TimephasedNormaliser};
use split::{GapSplitDetector, SplitDetector};
use timephased::TimephasedWorkFactory;

// Secondary variable-data blob holding the record creation timestamp in
// the older variant; the timestamp sits at byte 24 of a >= 28 byte blob.
const CREATION_DATA_KEY: u8 = 138;
const CREATION_DATA_MIN_LEN: usize = 28;
const CREATION_TIMESTAMP_OFFSET: usize = 24;

// Metadata layout: byte 0 flags deletion, bytes 4-7 hold the fixed-data
// offset of the record.
const META_DELETED_OFFSET: usize = 0;
const META_RECORD_OFFSET: usize = 4;

pub struct AssignmentReader {
    timephased: TimephasedWorkFactory,
    normaliser: Box<dyn TimephasedNormaliser>,
    split_detector: Box<dyn SplitDetector>,
}

impl AssignmentReader {
    pub fn new() -> AssignmentReader {
        AssignmentReader {
            timephased: TimephasedWorkFactory::new(),
            normaliser: Box::new(StandardNormaliser),
            split_detector: Box::new(GapSplitDetector),
        }
    }

    pub fn with_normaliser(mut self, normaliser: Box<dyn TimephasedNormaliser>) -> AssignmentReader {
        self.normaliser = normaliser;
        self
    }

    pub fn with_split_detector(mut self, detector: Box<dyn SplitDetector>) -> AssignmentReader {
        self.split_detector = detector;
        self
    }

    /// Decode every representable assignment out of the fixed and variable
    /// tables into `file`. Mutates the task graph directly; callers must
    /// not run two passes over the same graph concurrently.
    #[allow(clippy::too_many_arguments)]
    pub fn process(
        &self,
        file: &mut ProjectFile,
        field_map: &FieldMap,
        config: &DecodeConfig,
        fixed_meta: &FixedMeta,
        fixed_data: &FixedData,
        fixed_data2: Option<&FixedData>,
        var_meta: &VarMeta,
        var_data: &Var2Data,
    ) {
        let uid_offset = match field_map.fixed_data_offset(AssignmentField::UniqueId) {
            Some(offset) => offset,
            None => {
                warn!("field layout maps no fixed unique id; assignment pass aborted");
                return;
            }
        };

        for index in 0..fixed_meta.item_count() {
            let meta = match fixed_meta.byte_array_value(index) {
                Some(meta) => meta,
                None => continue,
            };
            if bytes::get_byte(meta, META_DELETED_OFFSET) != 0 {
                continue;
            }

            let offset = bytes::get_int(meta, META_RECORD_OFFSET) as u32;
            let data = match fixed_data
                .index_from_offset(offset)
                .and_then(|i| fixed_data.byte_array_value(i))
            {
                Some(data) => data,
                None => {
                    debug!("no fixed data at offset {}, record {} skipped", offset, index);
                    continue;
                }
            };

            // Some writers under-allocate trailing optional fields; pad
            // instead of failing the whole file.
            let max_offset = field_map.max_fixed_data_offset(0);
            let data: Cow<[u8]> = if data.len() <= max_offset {
                let mut padded = data.to_vec();
                padded.resize(max_offset + 8, 0);
                Cow::Owned(padded)
            } else {
                Cow::Borrowed(data)
            };

            let id = bytes::get_int(&data, uid_offset);
            if !var_meta.unique_identifier_set().contains(&id) {
                debug!("fixed record {} has no variable counterpart, skipped", index);
                continue;
            }

            let data2 = fixed_data2.and_then(|table| table.byte_array_value(index));

            let mut assignment = Assignment::new(id);
            assignment.disable_events();
            field_map.populate_container(&mut assignment, id, &[Some(&data), data2], var_data);
            assignment.enable_events();

            self.apply_meta_flags(&mut assignment, field_map, meta);
            hyperlink::process_hyperlink_data(
                &mut assignment,
                field_map
                    .var_data_key(AssignmentField::HyperlinkData)
                    .and_then(|key| var_data.byte_array(id, key)),
            );
            backfill_create_date(&mut assignment, file.variant, id, var_data);

            if let Some(notes) = assignment.notes.take() {
                assignment.notes = Some(if config.preserve_note_formatting {
                    notes
                } else {
                    rtf::strip(&notes)
                });
            }

            self.link_assignment(file, field_map, config, assignment, var_data);
        }
    }

    /// The older variant packs flags into fixed metadata; the newer one
    /// stores them in variable data, in which case population already
    /// handled them and the metadata bytes mean something else.
    fn apply_meta_flags(&self, assignment: &mut Assignment, field_map: &FieldMap, meta: &[u8]) {
        if field_map.field_location(AssignmentField::Flag(1)) != Some(FieldLocation::VarData) {
            flags::populate_flags(assignment, meta);
        }
        if field_map.field_location(AssignmentField::Confirmed) != Some(FieldLocation::VarData) {
            assignment.confirmed =
                flags::bit_flag(meta, flags::CONFIRMED_OFFSET, flags::CONFIRMED_MASK);
        }
        if field_map.field_location(AssignmentField::ResponsePending) != Some(FieldLocation::VarData)
        {
            assignment.response_pending = flags::bit_flag(
                meta,
                flags::RESPONSE_PENDING_OFFSET,
                flags::RESPONSE_PENDING_MASK,
            );
        }
        if field_map.field_location(AssignmentField::TeamStatusPending)
            != Some(FieldLocation::VarData)
        {
            assignment.team_status_pending = flags::bit_flag(
                meta,
                flags::TEAM_STATUS_PENDING_OFFSET,
                flags::TEAM_STATUS_PENDING_MASK,
            );
        }
    }

    /// Resolve the referenced task, derive the timephased curves and hand
    /// the finished assignment to the graph. An assignment whose task is
    /// unknown is stored but never linked, and its derivation is skipped.
    fn link_assignment(
        &self,
        file: &mut ProjectFile,
        field_map: &FieldMap,
        config: &DecodeConfig,
        mut assignment: Assignment,
        var_data: &Var2Data,
    ) {
        let task_context = assignment.task_unique_id.and_then(|uid| {
            file.task_by_unique_id(uid)
                .map(|task| (uid, task.calendar_id, task.ignore_resource_calendar))
        });
        let (task_uid, task_calendar_id, ignore_resource_calendar) = match task_context {
            Some(context) => context,
            None => {
                debug!(
                    "assignment {} references unknown task {:?}, left unlinked",
                    assignment.unique_id, assignment.task_unique_id
                );
                file.assignments.push(assignment);
                return;
            }
        };

        let resource = assignment
            .resource_unique_id
            .and_then(|uid| file.resource_by_unique_id(uid))
            .map(|resource| (resource.resource_type, resource.calendar_id));

        // Remaining work and the resolved resource decide the actual
        // finish; no calendar is involved.
        assignment.actual_finish = match (assignment.remaining_work, resource) {
            (Some(remaining), Some(_)) if remaining.is_zero() => assignment.finish,
            _ => None,
        };

        let id = assignment.unique_id;
        let complete_data = field_map
            .var_data_key(AssignmentField::CompleteWorkData)
            .and_then(|key| var_data.byte_array(id, key));
        let planned_data = field_map
            .var_data_key(AssignmentField::PlannedWorkData)
            .and_then(|key| var_data.byte_array(id, key));

        // Everything needing the calendar happens in this scope so the
        // immutable borrow of the graph ends before tasks are mutated.
        let derived = {
            let mut calendar: Option<&dyn ProjectCalendar> = resource
                .and_then(|(_, calendar_id)| calendar_id)
                .and_then(|calendar_id| file.calendar_by_id(calendar_id));
            if calendar.is_none() || ignore_resource_calendar {
                calendar = task_calendar_id.and_then(|calendar_id| file.calendar_by_id(calendar_id));
            }
            if calendar.is_none() {
                calendar = file.default_calendar();
            }

            calendar.map(|calendar| {
                let complete = self.timephased.complete_work(
                    calendar,
                    &file.properties,
                    assignment.start,
                    complete_data,
                );
                let planned = self.timephased.planned_work(
                    calendar,
                    &file.properties,
                    assignment.start,
                    assignment.units.unwrap_or(0.0),
                    planned_data,
                    &complete,
                );

                let mut planned_final = planned.clone();
                if planned.is_empty() && complete.is_empty() {
                    if let Some(segment) = synthetic::build(
                        &assignment,
                        resource.map(|(resource_type, _)| resource_type),
                        calendar,
                        &file.properties,
                        config.default_work_per_day,
                    ) {
                        planned_final.push(segment);
                    }
                }

                let modified = self.timephased.work_modified(&planned_final);

                let mut complete_final = complete.clone();
                if !config.use_raw_timephased {
                    self.normaliser
                        .normalise(calendar, &file.properties, &mut planned_final);
                    self.normaliser
                        .normalise(calendar, &file.properties, &mut complete_final);
                }

                (complete, planned, complete_final, planned_final, modified)
            })
        };

        let (complete, planned, complete_final, planned_final, modified) = match derived {
            Some(derived) => derived,
            None => {
                warn!(
                    "no calendar resolvable for assignment {}, timephased derivation skipped",
                    id
                );
                let index = file.assignments.len();
                file.assignments.push(assignment);
                if let Some(task) = file.tasks.get_mut(&task_uid) {
                    task.assignments.push(index);
                }
                file.fire_assignment_read(index);
                return;
            }
        };

        assignment.actual_start = if complete.is_empty() {
            None
        } else {
            assignment.start
        };

        if let Some(task) = file.tasks.get_mut(&task_uid) {
            if task.splits.as_ref().map_or(false, |splits| splits.is_empty()) {
                self.split_detector.process(task, &complete, &planned);
            }
        }

        assignment.timephased_planned = planned_final;
        assignment.timephased_complete = complete_final;

        if let Some(planned_bytes) = planned_data {
            assignment.work_contour = Some(contour::classify(planned_bytes, modified));
        }

        let index = file.assignments.len();
        file.assignments.push(assignment);
        if let Some(task) = file.tasks.get_mut(&task_uid) {
            task.assignments.push(index);
        }
        file.fire_assignment_read(index);
    }
}

impl Default for AssignmentReader {
    fn default() -> AssignmentReader {
        AssignmentReader::new()
    }
}

/// The older variant often leaves the creation date out of the main
/// layout; a secondary blob carries it instead.
fn backfill_create_date(
    assignment: &mut Assignment,
    variant: FileVariant,
    id: i32,
    var_data: &Var2Data,
) {
    if variant != FileVariant::Mpp9 || assignment.create_date.is_some() {
        return;
    }
    if let Some(blob) = var_data.byte_array(id, CREATION_DATA_KEY) {
        if blob.len() >= CREATION_DATA_MIN_LEN {
            assignment.create_date = bytes::get_timestamp(blob, CREATION_TIMESTAMP_OFFSET);
        }
    }
}

