use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

use giveaway_core::domain::collector::{collect, CollectReport, DiscussionSource, PostOutcome};
use giveaway_core::domain::draw::DrawResult;
use giveaway_core::domain::session::{CollectSummary, DrawRecord, Session, SessionError};
use giveaway_core::types::post_url::PostUrl;

const COMMAND_BUFFER: usize = 32;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("reddit client not connected")]
    NotConnected,
    #[error("no post urls provided")]
    NoPostUrls,
    #[error("a collection is already running")]
    CollectionInProgress,
    #[error("{0}")]
    Session(#[from] SessionError),
    #[error("controller stopped")]
    Closed,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub connected: bool,
    pub collecting: bool,
    pub commenters: usize,
    pub items: usize,
    pub can_draw: bool,
    pub last_draw: Option<DrawRecord>,
    pub last_collection: Option<CollectionStatus>,
}

/// Latest finished collection, with the line shown to the operator.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionStatus {
    pub complete: bool,
    pub message: String,
    #[serde(flatten)]
    pub summary: CollectSummary,
}

impl From<&CollectSummary> for CollectionStatus {
    fn from(summary: &CollectSummary) -> Self {
        Self {
            complete: summary.is_complete(),
            message: summary.status_line(),
            summary: summary.clone(),
        }
    }
}

/// Resolves once a started collection has been merged into the session.
#[derive(Debug)]
pub struct CollectTicket {
    summary: oneshot::Receiver<CollectSummary>,
}

impl CollectTicket {
    pub async fn finished(self) -> Result<CollectSummary, ControlError> {
        self.summary.await.map_err(|_| ControlError::Closed)
    }
}

enum Command<S> {
    Connect {
        source: S,
        reply: oneshot::Sender<()>,
    },
    Disconnect {
        reply: oneshot::Sender<bool>,
    },
    Collect {
        urls: Vec<PostUrl>,
        reply: oneshot::Sender<Result<CollectTicket, ControlError>>,
    },
    Collected {
        report: CollectReport,
        notify: oneshot::Sender<CollectSummary>,
    },
    LoadItems {
        items: Vec<String>,
        reply: oneshot::Sender<usize>,
    },
    ResetCommenters {
        reply: oneshot::Sender<usize>,
    },
    Draw {
        seed: Option<u64>,
        reply: oneshot::Sender<Result<DrawResult, ControlError>>,
    },
    Status {
        reply: oneshot::Sender<SessionStatus>,
    },
    Commenters {
        reply: oneshot::Sender<Vec<String>>,
    },
}

/// Cloneable access to the task that owns the giveaway session.
pub struct ControllerHandle<S> {
    tx: mpsc::Sender<Command<S>>,
}

impl<S> Clone for ControllerHandle<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

/// Starts the controller task. It stops once every handle is dropped.
pub fn spawn<S>() -> ControllerHandle<S>
where
    S: DiscussionSource + Clone + Send + Sync + 'static,
{
    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    let controller = Controller {
        session: Session::new(),
        source: None,
        collecting: false,
        tx: tx.downgrade(),
        rx,
    };
    tokio::spawn(controller.run());
    ControllerHandle { tx }
}

impl<S> ControllerHandle<S>
where
    S: Send + 'static,
{
    /// Installs a verified source; later collections use it.
    pub async fn connect(&self, source: S) -> Result<(), ControlError> {
        self.request(|reply| Command::Connect { source, reply }).await
    }

    /// Drops the installed source; returns whether one was connected.
    pub async fn disconnect(&self) -> Result<bool, ControlError> {
        self.request(|reply| Command::Disconnect { reply }).await
    }

    /// Starts collecting in the background.
    pub async fn collect(&self, urls: Vec<PostUrl>) -> Result<CollectTicket, ControlError> {
        self.request(|reply| Command::Collect { urls, reply })
            .await?
    }

    pub async fn load_items(&self, items: Vec<String>) -> Result<usize, ControlError> {
        self.request(|reply| Command::LoadItems { items, reply })
            .await
    }

    pub async fn reset_commenters(&self) -> Result<usize, ControlError> {
        self.request(|reply| Command::ResetCommenters { reply })
            .await
    }

    pub async fn draw(&self, seed: Option<u64>) -> Result<DrawResult, ControlError> {
        self.request(|reply| Command::Draw { seed, reply }).await?
    }

    pub async fn status(&self) -> Result<SessionStatus, ControlError> {
        self.request(|reply| Command::Status { reply }).await
    }

    pub async fn commenters(&self) -> Result<Vec<String>, ControlError> {
        self.request(|reply| Command::Commenters { reply }).await
    }

    async fn request<T, F>(&self, build: F) -> Result<T, ControlError>
    where
        F: FnOnce(oneshot::Sender<T>) -> Command<S>,
    {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| ControlError::Closed)?;
        response.await.map_err(|_| ControlError::Closed)
    }
}

struct Controller<S> {
    session: Session,
    source: Option<S>,
    collecting: bool,
    tx: mpsc::WeakSender<Command<S>>,
    rx: mpsc::Receiver<Command<S>>,
}

impl<S> Controller<S>
where
    S: DiscussionSource + Clone + Send + Sync + 'static,
{
    async fn run(mut self) {
        while let Some(command) = self.rx.recv().await {
            self.handle(command);
        }
        info!("session controller stopped");
    }

    fn handle(&mut self, command: Command<S>) {
        match command {
            Command::Connect { source, reply } => {
                self.source = Some(source);
                info!("discussion source connected");
                let _ = reply.send(());
            }
            Command::Disconnect { reply } => {
                let was_connected = self.source.take().is_some();
                if was_connected {
                    info!("discussion source disconnected");
                }
                let _ = reply.send(was_connected);
            }
            Command::Collect { urls, reply } => {
                let _ = reply.send(self.start_collection(urls));
            }
            Command::Collected { report, notify } => {
                self.collecting = false;
                let summary = self.session.merge_report(report);
                for post in &summary.posts {
                    if let PostOutcome::Skipped { reason } = &post.outcome {
                        warn!(url = %post.url, ?reason, "post skipped during collection");
                    }
                }
                info!(
                    processed = summary.processed,
                    total = summary.total,
                    new_commenters = summary.new_commenters,
                    total_commenters = summary.total_commenters,
                    "{}",
                    summary.status_line()
                );
                let _ = notify.send(summary);
            }
            Command::LoadItems { items, reply } => {
                let loaded = self.session.load_items(items);
                info!(loaded, "giveaway items loaded");
                let _ = reply.send(loaded);
            }
            Command::ResetCommenters { reply } => {
                let removed = self.session.reset_commenters();
                info!(removed, "commenters reset");
                let _ = reply.send(removed);
            }
            Command::Draw { seed, reply } => {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                let result = self.session.draw(&mut rng).map_err(ControlError::from);
                match &result {
                    Ok(draw) => info!(seed, winners = draw.pairings.len(), "{}", draw.summary()),
                    Err(err) => warn!(error = %err, "draw refused"),
                }
                let _ = reply.send(result);
            }
            Command::Status { reply } => {
                let _ = reply.send(self.status());
            }
            Command::Commenters { reply } => {
                let names = self.session.commenters().iter().cloned().collect();
                let _ = reply.send(names);
            }
        }
    }

    fn start_collection(&mut self, urls: Vec<PostUrl>) -> Result<CollectTicket, ControlError> {
        let source = self.source.clone().ok_or(ControlError::NotConnected)?;
        if urls.is_empty() {
            return Err(ControlError::NoPostUrls);
        }
        if self.collecting {
            return Err(ControlError::CollectionInProgress);
        }
        let tx = self.tx.upgrade().ok_or(ControlError::Closed)?;
        let (notify, summary) = oneshot::channel();
        self.collecting = true;
        info!(urls = urls.len(), "starting commenter collection");
        tokio::spawn(async move {
            let posts = urls.clone();
            let worker = tokio::spawn(async move { collect(&source, &urls).await });
            let report = match worker.await {
                Ok(report) => report,
                Err(err) => {
                    error!(error = %err, "collection worker failed");
                    CollectReport::aborted(&posts, &format!("collection aborted: {err}"))
                }
            };
            if tx.send(Command::Collected { report, notify }).await.is_err() {
                warn!("controller stopped before collection finished");
            }
        });
        Ok(CollectTicket { summary })
    }

    fn status(&self) -> SessionStatus {
        SessionStatus {
            connected: self.source.is_some(),
            collecting: self.collecting,
            commenters: self.session.commenters().len(),
            items: self.session.items().len(),
            can_draw: self.session.can_draw(),
            last_draw: self.session.last_draw().cloned(),
            last_collection: self.session.last_collection().map(CollectionStatus::from),
        }
    }
}
