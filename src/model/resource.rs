use crate::types::ResourceType;

#[derive(Clone, PartialEq, Debug)]
pub struct Resource {
    pub unique_id: i32,
    pub name: String,
    pub resource_type: ResourceType,
    pub calendar_id: Option<i32>,
}

impl Resource {
    pub fn new(unique_id: i32, name: &str, resource_type: ResourceType) -> Resource {
        Resource {
            unique_id,
            name: name.to_string(),
            resource_type,
            calendar_id: None,
        }
    }
}
