//! Durable relation graph file I/O.

pub mod graph_file;

pub use graph_file::{GraphDocument, GraphFile};
