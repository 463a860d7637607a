use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::domain::collector::{CollectReport, PostReport};
use crate::domain::commenters::CommenterSet;
use crate::domain::draw::{draw, DrawResult};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no commenters fetched")]
    NoCommenters,
    #[error("no giveaway items loaded")]
    NoItems,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectSummary {
    pub processed: usize,
    pub total: usize,
    pub new_commenters: usize,
    pub total_commenters: usize,
    pub posts: Vec<PostReport>,
}

impl CollectSummary {
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.processed == self.total
    }

    pub fn status_line(&self) -> String {
        if self.total == 0 {
            "No URLs provided.".to_string()
        } else if self.is_complete() {
            format!(
                "Finished fetching. Total unique commenters: {} from {} URL(s).",
                self.total_commenters, self.processed
            )
        } else {
            format!(
                "Partially completed fetching. Total unique commenters: {}. Processed {}/{} URLs.",
                self.total_commenters, self.processed, self.total
            )
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DrawRecord {
    pub drawn_at: DateTime<Utc>,
    pub result: DrawResult,
}

/// State of one giveaway run: who commented, what can be won, and the most
/// recent draw.
#[derive(Debug, Default)]
pub struct Session {
    commenters: CommenterSet,
    items: Vec<String>,
    last_draw: Option<DrawRecord>,
    last_collection: Option<CollectSummary>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commenters(&self) -> &CommenterSet {
        &self.commenters
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn last_draw(&self) -> Option<&DrawRecord> {
        self.last_draw.as_ref()
    }

    pub fn last_collection(&self) -> Option<&CollectSummary> {
        self.last_collection.as_ref()
    }

    /// Folds a finished batch into the commenter set and keeps its summary
    /// as the latest collection.
    pub fn merge_report(&mut self, report: CollectReport) -> CollectSummary {
        let processed = report.processed();
        let total = report.total();
        let new_commenters = self.commenters.merge(report.new_usernames);
        let summary = CollectSummary {
            processed,
            total,
            new_commenters,
            total_commenters: self.commenters.len(),
            posts: report.posts,
        };
        self.last_collection = Some(summary.clone());
        summary
    }

    /// Replaces the item list; returns the number of items now loaded.
    pub fn load_items(&mut self, items: Vec<String>) -> usize {
        self.items = items;
        self.items.len()
    }

    pub fn reset_commenters(&mut self) -> usize {
        self.commenters.clear()
    }

    pub fn can_draw(&self) -> bool {
        !self.commenters.is_empty() && !self.items.is_empty()
    }

    pub fn draw<R>(&mut self, rng: &mut R) -> Result<DrawResult, SessionError>
    where
        R: Rng + ?Sized,
    {
        if self.commenters.is_empty() {
            return Err(SessionError::NoCommenters);
        }
        if self.items.is_empty() {
            return Err(SessionError::NoItems);
        }
        let result = draw(&self.commenters, &self.items, rng);
        self.last_draw = Some(DrawRecord {
            drawn_at: Utc::now(),
            result: result.clone(),
        });
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::{Session, SessionError};
    use crate::domain::collector::tests::{urls, FakeSource};
    use crate::domain::collector::{collect, SourceError};

    fn items(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[tokio::test]
    async fn repeated_collection_does_not_double_count() {
        let source = FakeSource::default()
            .with_post("p1", &[Some("alice"), Some("bob")])
            .with_post("p2", &[Some("bob"), Some("carol")]);
        let mut session = Session::new();

        let first = session.merge_report(collect(&source, &urls(&["p1", "p2"])).await);
        assert_eq!(first.new_commenters, 3);
        assert_eq!(first.total_commenters, 3);

        let second = session.merge_report(collect(&source, &urls(&["p1"])).await);
        assert_eq!(second.new_commenters, 0);
        assert_eq!(second.total_commenters, 3);
        assert_eq!(session.commenters().len(), 3);
    }

    #[tokio::test]
    async fn merge_keeps_latest_collection() {
        let source = FakeSource::default()
            .with_post("p1", &[Some("alice")])
            .with_error("gone", SourceError::SubmissionNotFound("gone".to_string()));
        let mut session = Session::new();
        assert!(session.last_collection().is_none());

        session.merge_report(collect(&source, &urls(&["p1", "gone"])).await);
        let latest = session.last_collection().unwrap();
        assert_eq!((latest.processed, latest.total), (1, 2));
        assert_eq!(latest.posts.len(), 2);

        session.merge_report(collect(&source, &urls(&["p1"])).await);
        let latest = session.last_collection().unwrap();
        assert_eq!((latest.processed, latest.total), (1, 1));
        assert!(latest.is_complete());
    }

    #[tokio::test]
    async fn summary_reports_partial_batches() {
        let source = FakeSource::default()
            .with_post("p1", &[Some("alice")])
            .with_error("bad", SourceError::NotASubmission("bad".to_string()));
        let mut session = Session::new();
        let summary = session.merge_report(collect(&source, &urls(&["p1", "bad"])).await);
        assert!(!summary.is_complete());
        assert_eq!(
            summary.status_line(),
            "Partially completed fetching. Total unique commenters: 1. Processed 1/2 URLs."
        );
    }

    #[tokio::test]
    async fn summary_reports_complete_batches() {
        let source = FakeSource::default().with_post("p1", &[Some("alice"), Some("bob")]);
        let mut session = Session::new();
        let summary = session.merge_report(collect(&source, &urls(&["p1"])).await);
        assert!(summary.is_complete());
        assert_eq!(
            summary.status_line(),
            "Finished fetching. Total unique commenters: 2 from 1 URL(s)."
        );
    }

    #[test]
    fn draw_requires_commenters_and_items() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut session = Session::new();
        assert_eq!(session.draw(&mut rng), Err(SessionError::NoCommenters));
        session
            .commenters
            .merge(vec!["alice".to_string(), "bob".to_string()]);
        assert_eq!(session.draw(&mut rng), Err(SessionError::NoItems));
        session.load_items(items(&["Poster"]));
        assert!(session.can_draw());
        let result = session.draw(&mut rng).unwrap();
        assert_eq!(result.pairings.len(), 1);
        assert!(session.last_draw().is_some());
    }

    #[test]
    fn draw_does_not_consume_session_state() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut session = Session::new();
        session
            .commenters
            .merge(vec!["alice".to_string(), "bob".to_string()]);
        session.load_items(items(&["Poster", "Pin"]));
        session.draw(&mut rng).unwrap();
        assert_eq!(session.commenters().len(), 2);
        assert_eq!(session.items().len(), 2);
    }

    #[test]
    fn load_items_replaces_previous_list() {
        let mut session = Session::new();
        assert_eq!(session.load_items(items(&["Poster", "Pin"])), 2);
        assert_eq!(session.load_items(Vec::new()), 0);
        assert!(session.items().is_empty());
    }

    #[test]
    fn reset_clears_commenters_only() {
        let mut session = Session::new();
        session.commenters.merge(vec!["alice".to_string()]);
        session.load_items(items(&["Poster"]));
        assert_eq!(session.reset_commenters(), 1);
        assert!(session.commenters().is_empty());
        assert_eq!(session.items().len(), 1);
    }
}
