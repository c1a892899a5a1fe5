pub mod echo;
pub mod raw;
