use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: String,
    /// `None` when the author account was deleted or is otherwise unknown.
    pub author: Option<String>,
}

/// A resolved post with its fully expanded, flattened comment tree.
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub id: String,
    pub title: String,
    pub url: String,
    pub comments: Vec<Comment>,
}

impl Submission {
    pub fn comment_authors(&self) -> impl Iterator<Item = &str> {
        self.comments
            .iter()
            .filter_map(|comment| comment.author.as_deref())
            .filter(|author| !author.is_empty())
    }
}
