pub mod pipeline;
pub mod properties;
