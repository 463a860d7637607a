use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::domain::commenters::CommenterSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pairing {
    pub winner: String,
    pub item: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrawResult {
    /// Winners in announcement order.
    pub pairings: Vec<Pairing>,
    pub leftover_users: BTreeSet<String>,
    pub leftover_items: Vec<String>,
}

impl DrawResult {
    pub fn summary(&self) -> String {
        let winners = self.pairings.len();
        let mut summary = format!("Giveaway complete! {winners} winner(s) drawn.");
        if winners > 0 && !self.leftover_users.is_empty() {
            summary.push_str(&format!(
                " {} users did not win an item.",
                self.leftover_users.len()
            ));
        }
        if winners > 0 && !self.leftover_items.is_empty() {
            summary.push_str(&format!(
                " {} items were not awarded.",
                self.leftover_items.len()
            ));
        }
        summary
    }
}

/// Pairs commenters with items uniformly at random, without replacement.
///
/// Both sequences are shuffled independently with `rng`; pairings are then
/// taken from the tail of each. Empty inputs produce an empty draw.
pub fn draw<R>(users: &CommenterSet, items: &[String], rng: &mut R) -> DrawResult
where
    R: Rng + ?Sized,
{
    let mut users: Vec<String> = users.iter().cloned().collect();
    let mut items = items.to_vec();
    users.shuffle(rng);
    items.shuffle(rng);
    pair_shuffled(users, items)
}

fn pair_shuffled(mut users: Vec<String>, mut items: Vec<String>) -> DrawResult {
    let rounds = users.len().min(items.len());
    let mut pairings = Vec::with_capacity(rounds);
    for _ in 0..rounds {
        let (Some(winner), Some(item)) = (users.pop(), items.pop()) else {
            break;
        };
        pairings.push(Pairing { winner, item });
    }
    DrawResult {
        pairings,
        leftover_users: users.into_iter().collect(),
        leftover_items: items,
    }
}
