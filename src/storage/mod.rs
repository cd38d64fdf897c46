pub mod disk;
pub mod page;
pub mod tuple;
