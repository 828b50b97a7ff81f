pub mod descriptor;
pub mod render;
