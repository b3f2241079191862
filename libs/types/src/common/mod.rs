//! Identifiers and error taxonomy shared by every engine stage

pub mod errors;
pub mod identifiers;
