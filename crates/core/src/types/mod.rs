pub mod lines;
pub mod post_url;
