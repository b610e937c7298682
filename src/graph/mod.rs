//! Core graph data structures and assembly

mod assembled;
mod assembler;
mod document;
mod edge;
mod node;

#[cfg(test)]
mod tests;

pub use assembled::AssembledGraph;
pub use assembler::{AssemblyBuilder, AssemblyError, AssemblyReport, GraphAssembler, MergePolicy};
pub use document::GraphDocument;
pub use edge::{Edge, EdgeKey};
pub use node::{Node, NodeId, Properties, UNKNOWN_NODE_TYPE};
