pub mod aliases;
pub mod capabilities;
pub mod media_types;
pub mod name_normalizer;
pub mod pipeline;
pub mod schema_resolver;
pub mod spec_to_ir;

pub use media_types::prioritize;
pub use pipeline::{ShapedApi, shape, shape_document};
pub use spec_to_ir::{TransformOptions, transform, transform_with_options};
