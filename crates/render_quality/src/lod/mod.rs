mod registry;
mod types;

pub use registry::{LodEntry, LodHandleAllocator, LodRegistry};
pub use types::{select_level, LodError, LodHandle, LodLevel, ObjectId, RepresentationId, Vec3};
