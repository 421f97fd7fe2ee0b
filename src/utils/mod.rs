//! Small shared helpers.

pub mod ambient;
pub mod text;
