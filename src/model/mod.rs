pub mod display_set;
pub mod instance;
pub mod loader;
pub mod tree;

pub use display_set::DisplaySet;
pub use instance::Instance;
pub use tree::{SeriesKey, StudyTree};
