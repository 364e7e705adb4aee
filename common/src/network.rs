pub mod hop;
pub mod target;
