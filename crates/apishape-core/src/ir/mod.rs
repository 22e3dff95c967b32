pub mod capability;
pub mod grouping;
pub mod operations;
pub mod schemas;
pub mod types;

pub use capability::{Capability, CapabilitySet, Serialization};
pub use grouping::{GroupingStrategy, OperationGroup};
pub use operations::*;
pub use schemas::*;
pub use types::{IrInfo, IrSpec, NormalizedName};
