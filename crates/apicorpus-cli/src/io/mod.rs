pub mod edit;
pub mod input;
