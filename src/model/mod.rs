pub mod assignment;
pub mod project;
pub mod resource;
pub mod segment;
pub mod task;

pub use assignment::Assignment;
pub use project::{DecodeConfig, FileVariant, ProjectFile, ProjectListener};
pub use resource::Resource;
pub use segment::WorkSegment;
pub use task::Task;
