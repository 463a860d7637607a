mod client;
mod tree;
mod url;

pub use client::{RedditClient, RedditCredentials, RedditError};
pub use url::submission_id_from_url;
