pub mod batch;
pub mod failure;
pub mod loaders;
pub mod record;
pub mod schema;
pub mod task;

pub use batch::BatchRange;
pub use failure::{FailedLocator, FailureSet};
pub use loaders::load_schema;
pub use record::{ExtractionResult, StructuredText};
pub use schema::ExtractionSchema;
pub use task::{LocatorSource, Task};
