pub mod board;
pub mod boards;
pub mod core;
pub mod roll;
pub mod students;
