use std::fmt;

/// `CREATEPROCESS_MANIFEST_RESOURCE_ID`
pub const MANIFEST_RESOURCE_ID: u16 = 1;
/// Version and message table resources are always emitted under id 1.
pub const DEFAULT_RESOURCE_ID: u16 = 1;

/// Resource types this crate can emit, with their `RT_*` ordinals.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceType {
    MessageTable,
    Version,
    Manifest,
}

impl ResourceType {
    pub fn ordinal(self) -> u16 {
        match self {
            ResourceType::MessageTable => 11,
            ResourceType::Version => 16,
            ResourceType::Manifest => 24,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ResourceType::MessageTable => "RT_MESSAGETABLE",
            ResourceType::Version => "RT_VERSION",
            ResourceType::Manifest => "RT_MANIFEST",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An encoded resource, ready to be handed to a resource store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub kind: ResourceType,
    pub id: u16,
    pub data: Vec<u8>,
}

impl Resource {
    pub fn new(kind: ResourceType, id: u16, data: Vec<u8>) -> Self {
        Resource { kind, id, data }
    }
}
