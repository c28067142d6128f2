//! Vector index and query-time retrieval

mod index;
mod retriever;

pub use index::{squared_l2, VectorIndex};
pub use retriever::Retriever;
