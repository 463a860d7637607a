pub mod commenters;
pub mod draw;
pub mod health;
pub mod items;
pub mod reddit;
pub mod status;
