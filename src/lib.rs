//! Grouping of DICOM instances into viewer display sets.
//!
//! Each series is split into display sets: multi-frame instances and
//! single image modalities stand alone, the remaining images are stacked
//! and split by configurable attributes. See [`partition::partition`].

pub mod app;
pub mod error;
pub mod event;
pub mod handler;
pub mod model;
pub mod partition;
pub mod sop_class;
pub mod study;
pub mod utils;
pub mod views;

pub use error::{Error, Result};
pub use handler::{HandlerRegistry, SopClassHandler, StackHandler};
pub use model::{DisplaySet, Instance};
pub use partition::{partition, Partition, PartitionOptions, SplitRule};
pub use study::Study;
