//! Post-processing of OpenAPI descriptions for code generators: operation
//! grouping, consumed media type ordering and capability derivation.
//!
//! ```no_run
//! use apishape_core::config::GeneratorSettings;
//!
//! let spec = apishape_core::parse::from_yaml("openapi: 3.0.3\n...").unwrap();
//! let shaped = apishape_core::shape_document(&spec, &GeneratorSettings::default()).unwrap();
//! for group in shaped.groups.values() {
//!     println!("{}: {:?}", group.api_name, group.operation_ids);
//! }
//! ```

pub mod config;
pub mod error;
pub mod ir;
pub mod parse;
pub mod transform;

pub use transform::{ShapedApi, shape, shape_document};
