pub mod compare;
pub mod defaults;
pub mod merge;
pub mod resolve;
pub mod resume_values;
