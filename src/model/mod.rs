pub mod edge;
pub mod embedding;
pub mod graph;
pub mod node;
pub mod record;

pub use edge::*;
pub use embedding::*;
pub use graph::*;
pub use node::*;
pub use record::*;
