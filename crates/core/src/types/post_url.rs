use std::fmt;

use serde::Serialize;

use crate::error::CoreError;
use crate::types::lines::parse_lines;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PostUrl(String);

impl PostUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses one post url per line, dropping blank lines.
    pub fn parse_list(input: &str) -> Vec<PostUrl> {
        parse_lines(input).into_iter().map(PostUrl).collect()
    }
}

impl TryFrom<&str> for PostUrl {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidPostUrl("empty post url".to_string()));
        }
        Ok(PostUrl(trimmed.to_string()))
    }
}

impl fmt::Display for PostUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
