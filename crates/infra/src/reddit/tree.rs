use std::collections::{HashSet, VecDeque};

use serde::Deserialize;

use giveaway_core::domain::submission::Comment;

const DELETED_AUTHOR: &str = "[deleted]";

#[derive(Debug, Deserialize)]
pub(crate) struct Listing {
    pub(crate) data: ListingData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingData {
    #[serde(default)]
    pub(crate) children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub(crate) enum Thing {
    #[serde(rename = "t3")]
    Link(LinkData),
    #[serde(rename = "t1")]
    Comment(CommentData),
    #[serde(rename = "more")]
    More(MoreData),
}

#[derive(Debug, Deserialize)]
pub(crate) struct LinkData {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) permalink: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentData {
    id: String,
    author: Option<String>,
    #[serde(default)]
    replies: Replies,
}

/// Reddit sends `""` instead of a listing when a comment has no replies.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Replies {
    Listing(Box<Listing>),
    Empty(#[allow(dead_code)] String),
}

impl Default for Replies {
    fn default() -> Self {
        Replies::Empty(String::new())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MoreData {
    #[serde(default)]
    pub(crate) parent_id: String,
    #[serde(default)]
    pub(crate) children: Vec<String>,
}

/// Placeholder left in a tree that still has to be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Pending {
    /// Sibling ids to load through `morechildren`.
    Children(Vec<String>),
    /// A "continue this thread" link; the subtree under this comment id.
    Thread(String),
}

/// Flattens comment listings, deduplicating by id and queueing every
/// placeholder it meets.
#[derive(Debug, Default)]
pub(crate) struct TreeWalk {
    seen: HashSet<String>,
    requested: HashSet<String>,
    expanded_threads: HashSet<String>,
    comments: Vec<Comment>,
    pending: VecDeque<Pending>,
}

impl TreeWalk {
    pub(crate) fn visit(&mut self, things: Vec<Thing>) {
        let mut stack = things;
        stack.reverse();
        while let Some(thing) = stack.pop() {
            match thing {
                Thing::Comment(data) => {
                    if let Replies::Listing(listing) = data.replies {
                        stack.extend(listing.data.children.into_iter().rev());
                    }
                    if self.seen.insert(data.id.clone()) {
                        self.comments.push(Comment {
                            id: data.id,
                            author: normalize_author(data.author),
                        });
                    }
                }
                Thing::More(more) => self.queue_more(more),
                Thing::Link(_) => {}
            }
        }
    }

    pub(crate) fn next_pending(&mut self) -> Option<Pending> {
        self.pending.pop_front()
    }

    pub(crate) fn into_comments(self) -> Vec<Comment> {
        self.comments
    }

    /// Each child id is requested at most once, even when a response
    /// repeats the placeholder without returning the comment.
    fn queue_more(&mut self, more: MoreData) {
        if more.children.is_empty() {
            let Some(parent) = more.parent_id.strip_prefix("t1_") else {
                return;
            };
            if self.expanded_threads.insert(parent.to_string()) {
                self.pending.push_back(Pending::Thread(parent.to_string()));
            }
            return;
        }
        let children: Vec<String> = more
            .children
            .into_iter()
            .filter(|id| !self.seen.contains(id) && self.requested.insert(id.clone()))
            .collect();
        if !children.is_empty() {
            self.pending.push_back(Pending::Children(children));
        }
    }
}

fn normalize_author(author: Option<String>) -> Option<String> {
    author.filter(|name| !name.is_empty() && name != DELETED_AUTHOR)
}
