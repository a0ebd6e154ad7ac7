//! Call-mapping strategies: one source library idiom each.

pub mod collections;
pub mod console;
pub mod maps;
pub mod numeric;
pub mod sequence;
pub mod services;
pub mod strings;
pub mod tasks;
