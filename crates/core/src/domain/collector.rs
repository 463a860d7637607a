use std::collections::BTreeSet;
use std::future::Future;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::submission::Submission;
use crate::types::post_url::PostUrl;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("not a submission: {0}")]
    NotASubmission(String),
    #[error("submission not found: {0}")]
    SubmissionNotFound(String),
    #[error("{0}")]
    Other(String),
}

/// A discussion platform that can resolve a post url to its comment tree.
///
/// Implementations must return the tree fully expanded, with every
/// "load more" placeholder already replaced by the comments it stands for.
pub trait DiscussionSource {
    fn fetch_submission(
        &self,
        post: &PostUrl,
    ) -> impl Future<Output = Result<Submission, SourceError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum SkipReason {
    InvalidUrl,
    NotFound,
    OtherError(String),
}

impl From<SourceError> for SkipReason {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NotASubmission(_) => SkipReason::InvalidUrl,
            SourceError::SubmissionNotFound(_) => SkipReason::NotFound,
            SourceError::Other(message) => SkipReason::OtherError(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PostOutcome {
    Processed { comments: usize },
    Skipped { reason: SkipReason },
}

impl PostOutcome {
    pub fn is_processed(&self) -> bool {
        matches!(self, PostOutcome::Processed { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostReport {
    pub url: PostUrl,
    pub outcome: PostOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct CollectReport {
    pub new_usernames: BTreeSet<String>,
    pub posts: Vec<PostReport>,
}

impl CollectReport {
    pub fn total(&self) -> usize {
        self.posts.len()
    }

    pub fn processed(&self) -> usize {
        self.posts
            .iter()
            .filter(|post| post.outcome.is_processed())
            .count()
    }

    /// Report for a batch that stopped before producing one: every post is
    /// skipped with `message`.
    pub fn aborted(posts: &[PostUrl], message: &str) -> Self {
        let posts = posts
            .iter()
            .map(|post| PostReport {
                url: post.clone(),
                outcome: PostOutcome::Skipped {
                    reason: SkipReason::OtherError(message.to_string()),
                },
            })
            .collect();
        Self {
            new_usernames: BTreeSet::new(),
            posts,
        }
    }
}

/// Collects the distinct comment authors of every post, in input order.
///
/// A post that fails to resolve is recorded as skipped and the batch moves
/// on; nothing here aborts the whole run.
pub async fn collect<S>(source: &S, posts: &[PostUrl]) -> CollectReport
where
    S: DiscussionSource,
{
    let total = posts.len();
    let mut report = CollectReport::default();
    for (index, post) in posts.iter().enumerate() {
        info!(position = index + 1, total, url = %post, "processing post");
        let outcome = match source.fetch_submission(post).await {
            Ok(submission) => {
                let mut comments = 0;
                for author in submission.comment_authors() {
                    report.new_usernames.insert(author.to_string());
                    comments += 1;
                }
                info!(position = index + 1, comments, "post processed");
                PostOutcome::Processed { comments }
            }
            Err(err) => {
                warn!(error = %err, url = %post, "post skipped");
                PostOutcome::Skipped {
                    reason: SkipReason::from(err),
                }
            }
        };
        report.posts.push(PostReport {
            url: post.clone(),
            outcome,
        });
    }
    info!(
        processed = report.processed(),
        total,
        commenters = report.new_usernames.len(),
        "collection finished"
    );
    report
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use super::{collect, CollectReport, DiscussionSource, PostOutcome, SkipReason, SourceError};
    use crate::domain::submission::{Comment, Submission};
    use crate::types::post_url::PostUrl;

    #[derive(Debug, Default, Clone)]
    pub(crate) struct FakeSource {
        posts: HashMap<String, Result<Submission, SourceError>>,
    }

    impl FakeSource {
        pub(crate) fn with_post(mut self, url: &str, authors: &[Option<&str>]) -> Self {
            let comments = authors
                .iter()
                .enumerate()
                .map(|(index, author)| Comment {
                    id: format!("c{index}"),
                    author: author.map(str::to_string),
                })
                .collect();
            let submission = Submission {
                id: url.to_string(),
                title: url.to_string(),
                url: url.to_string(),
                comments,
            };
            self.posts.insert(url.to_string(), Ok(submission));
            self
        }

        pub(crate) fn with_error(mut self, url: &str, err: SourceError) -> Self {
            self.posts.insert(url.to_string(), Err(err));
            self
        }
    }

    impl DiscussionSource for FakeSource {
        async fn fetch_submission(&self, post: &PostUrl) -> Result<Submission, SourceError> {
            self.posts
                .get(post.as_str())
                .cloned()
                .unwrap_or_else(|| Err(SourceError::SubmissionNotFound(post.to_string())))
        }
    }

    pub(crate) fn urls(values: &[&str]) -> Vec<PostUrl> {
        values
            .iter()
            .map(|value| PostUrl::try_from(*value).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn collect_unions_authors_across_posts() {
        let source = FakeSource::default()
            .with_post("p1", &[Some("alice"), Some("bob"), Some("alice")])
            .with_post("p2", &[Some("bob"), Some("carol")]);
        let report = collect(&source, &urls(&["p1", "p2"])).await;
        let names: Vec<&str> = report.new_usernames.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
        assert_eq!(report.processed(), 2);
        assert_eq!(report.total(), 2);
        assert_eq!(
            report.posts[0].outcome,
            PostOutcome::Processed { comments: 3 }
        );
    }

    #[tokio::test]
    async fn collect_skips_deleted_authors_without_counting() {
        let source = FakeSource::default().with_post("p1", &[None, Some("alice"), None]);
        let report = collect(&source, &urls(&["p1"])).await;
        assert_eq!(report.new_usernames.len(), 1);
        assert_eq!(
            report.posts[0].outcome,
            PostOutcome::Processed { comments: 1 }
        );
    }

    #[tokio::test]
    async fn collect_continues_after_failures() {
        let source = FakeSource::default()
            .with_error("bad", SourceError::NotASubmission("bad".to_string()))
            .with_post("p1", &[Some("alice")])
            .with_error("boom", SourceError::Other("timeout".to_string()))
            .with_post("p2", &[Some("bob")]);
        let report = collect(&source, &urls(&["bad", "p1", "missing", "boom", "p2"])).await;
        assert_eq!(report.total(), 5);
        assert_eq!(report.processed(), 2);
        assert!(report.new_usernames.contains("alice"));
        assert!(report.new_usernames.contains("bob"));
        let outcomes: Vec<&PostOutcome> = report.posts.iter().map(|post| &post.outcome).collect();
        assert_eq!(
            outcomes[0],
            &PostOutcome::Skipped {
                reason: SkipReason::InvalidUrl
            }
        );
        assert_eq!(
            outcomes[2],
            &PostOutcome::Skipped {
                reason: SkipReason::NotFound
            }
        );
        assert_eq!(
            outcomes[3],
            &PostOutcome::Skipped {
                reason: SkipReason::OtherError("timeout".to_string())
            }
        );
    }

    #[tokio::test]
    async fn collect_preserves_input_order() {
        let source = FakeSource::default()
            .with_post("p2", &[Some("bob")])
            .with_post("p1", &[Some("alice")]);
        let report = collect(&source, &urls(&["p2", "p1"])).await;
        let order: Vec<&str> = report.posts.iter().map(|post| post.url.as_str()).collect();
        assert_eq!(order, vec!["p2", "p1"]);
    }

    #[tokio::test]
    async fn collect_empty_batch() {
        let report = collect(&FakeSource::default(), &[]).await;
        assert_eq!(report.total(), 0);
        assert!(report.new_usernames.is_empty());
    }

    #[test]
    fn aborted_report_skips_every_post() {
        let report = CollectReport::aborted(&urls(&["p1", "p2"]), "worker panicked");
        assert_eq!(report.total(), 2);
        assert_eq!(report.processed(), 0);
        assert!(report.new_usernames.is_empty());
        assert!(report.posts.iter().all(|post| post.outcome
            == PostOutcome::Skipped {
                reason: SkipReason::OtherError("worker panicked".to_string())
            }));
    }
}
