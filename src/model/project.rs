use std::collections::HashMap;

use crate::calendar::ProjectCalendar;
use crate::model::assignment::Assignment;
use crate::model::resource::Resource;
use crate::model::task::Task;
use crate::types::{Duration, ProjectProperties};

/// The two legacy container variants this decoder understands. The older
/// one keeps booleans in fixed metadata and needs the creation-date
/// backfill; the newer one moved those into variable data.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FileVariant {
    Mpp9,
    Mpp12,
}

/// Observer notified as each assignment finishes decoding, e.g. for
/// incremental indexing. Fired only for assignments linked to a task.
pub trait ProjectListener {
    fn assignment_read(&mut self, assignment: &Assignment);
}

/// Caller-selected decode behaviour. The flat-rate fallback figure is
/// explicit configuration so differently configured projects can share
/// one process.
#[derive(Clone, Copy, Debug)]
pub struct DecodeConfig {
    pub default_work_per_day: Duration,
    pub use_raw_timephased: bool,
    pub preserve_note_formatting: bool,
}

impl Default for DecodeConfig {
    fn default() -> DecodeConfig {
        DecodeConfig {
            default_work_per_day: Duration::minutes(480.0),
            use_raw_timephased: false,
            preserve_note_formatting: false,
        }
    }
}

/// The entity graph one file decodes into. Tasks, resources and calendars
/// are registered by the surrounding reader before the assignment pass
/// runs; assignments land in a flat arena and tasks reference them by
/// index.
pub struct ProjectFile {
    pub variant: FileVariant,
    pub properties: ProjectProperties,
    pub tasks: HashMap<i32, Task>,
    pub resources: HashMap<i32, Resource>,
    calendars: HashMap<i32, Box<dyn ProjectCalendar>>,
    default_calendar_id: Option<i32>,
    pub assignments: Vec<Assignment>,
    listeners: Vec<Box<dyn ProjectListener>>,
}

impl ProjectFile {
    pub fn new(variant: FileVariant) -> ProjectFile {
        ProjectFile {
            variant,
            properties: ProjectProperties::default(),
            tasks: HashMap::new(),
            resources: HashMap::new(),
            calendars: HashMap::new(),
            default_calendar_id: None,
            assignments: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub fn add_task(&mut self, task: Task) {
        self.tasks.insert(task.unique_id, task);
    }

    pub fn add_resource(&mut self, resource: Resource) {
        self.resources.insert(resource.unique_id, resource);
    }

    pub fn add_calendar(&mut self, id: i32, calendar: Box<dyn ProjectCalendar>) {
        self.calendars.insert(id, calendar);
    }

    pub fn set_default_calendar(&mut self, id: i32) {
        self.default_calendar_id = Some(id);
    }

    pub fn task_by_unique_id(&self, id: i32) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn resource_by_unique_id(&self, id: i32) -> Option<&Resource> {
        self.resources.get(&id)
    }

    pub fn calendar_by_id(&self, id: i32) -> Option<&dyn ProjectCalendar> {
        self.calendars.get(&id).map(|c| c.as_ref())
    }

    pub fn default_calendar(&self) -> Option<&dyn ProjectCalendar> {
        self.default_calendar_id.and_then(|id| self.calendar_by_id(id))
    }

    pub fn add_listener(&mut self, listener: Box<dyn ProjectListener>) {
        self.listeners.push(listener);
    }

    /// Notify listeners about the assignment at `index`. The listener list
    /// is detached for the duration of the callbacks so listeners may read
    /// the graph they observe.
    pub fn fire_assignment_read(&mut self, index: usize) {
        if self.listeners.is_empty() {
            return;
        }
        let mut listeners = std::mem::take(&mut self.listeners);
        if let Some(assignment) = self.assignments.get(index) {
            for listener in listeners.iter_mut() {
                listener.assignment_read(assignment);
            }
        }
        self.listeners = listeners;
    }
}
