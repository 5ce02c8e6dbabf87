pub mod class;
pub mod lines;

pub use class::{ItemMeta, buckets_for_class, max_sockets_for_class, normalize_class};
pub use lines::{
    ItemDescription, Line, LineKind, SEPARATOR, is_rune_line, rune_line, sockets_line,
    strip_rune_suffix,
};
