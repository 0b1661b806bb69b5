//! Shared utilities

pub mod display;
pub mod union_find;

pub use display::{format_duration, supports_color, write_file_checked, Color, ColorOutput};
pub use union_find::UnionFind;
