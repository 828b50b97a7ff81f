pub mod memory;
pub mod node;
pub mod selector;
