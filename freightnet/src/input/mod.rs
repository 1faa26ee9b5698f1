pub mod builder;
pub mod parameters;
