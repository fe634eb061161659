pub mod completion;
pub mod cricket;
pub mod history;
pub mod match_state;
pub mod rules;
pub mod serialization;
pub mod session;
