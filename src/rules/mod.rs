//! Deterministic rule tables mapping a reading to safety warnings and
//! baseline clothing recommendations

pub mod safety;
pub mod standard;

pub use safety::safety_warnings;
pub use standard::standard_recommendations;
