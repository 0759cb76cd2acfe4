pub mod formatting;

pub use formatting::{format_tag, truncate, value_to_string};
