pub mod collector;
pub mod commenters;
pub mod draw;
pub mod session;
pub mod submission;
