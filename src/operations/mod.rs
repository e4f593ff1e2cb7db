pub mod combine;
pub mod writer;

pub use combine::{CombineMode, CombineOptions, Combiner};
pub use writer::{CombineSummary, EntryWriter};
