pub mod chips;
pub mod engine;
pub mod match_state;
pub mod serialization;
