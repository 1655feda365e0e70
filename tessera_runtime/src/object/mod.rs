//! Object model: type objects, the declaration builder, the registry,
//! instances, and descriptors.

pub mod builder;
pub mod descriptor;
pub mod instance;
pub mod registry;
pub mod type_obj;
