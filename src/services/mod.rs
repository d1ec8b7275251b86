pub mod checkpoint_store;
pub mod extractor;
pub mod failure_store;
pub mod noise;

pub use checkpoint_store::{BatchOutcome, CheckpointStore};
pub use extractor::RecordExtractor;
pub use failure_store::FailureStore;
pub use noise::{KeywordNoiseFilter, NoiseFilter};
