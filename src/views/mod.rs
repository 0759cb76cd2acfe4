pub mod display_set_table;
pub mod tree_browser;

pub use display_set_table::write_display_set_table;
pub use tree_browser::write_study_tree;
