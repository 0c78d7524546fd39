//! Core storage abstractions.
//!
//! Backends implement the traits in this module; everything above them (the
//! record access layer, the REST surface) is written against the traits so
//! a backend can be swapped without touching the domain logic.

mod backend;
mod bulk;
mod sequence;
mod storage;

pub use backend::Backend;
pub use bulk::{BulkOutcome, BulkStore};
pub use sequence::SequenceStore;
pub use storage::{RecordStorage, RelationSide};

/// Everything the record access layer needs from a backend.
pub trait Store: RecordStorage + SequenceStore + BulkStore + Backend {}

impl<T> Store for T where T: RecordStorage + SequenceStore + BulkStore + Backend {}
