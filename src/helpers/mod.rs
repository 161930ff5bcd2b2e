pub mod format;

pub use format::format_doc_count;
