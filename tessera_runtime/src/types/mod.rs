//! Concrete runtime types produced by the dispatch families.

pub mod cursor;
