mod document;
mod selector;

pub use document::{Document, NodeId};
pub use selector::Selector;
