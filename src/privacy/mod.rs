pub mod scrubber;
pub mod sensitivity;
