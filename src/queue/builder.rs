use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::Settings;
use crate::inventory::{Inventory, Symbol, fold_id};

/// Extra copies of each priority symbol added to the pool, giving it
/// `1 + PRIORITY_REPLICATION` times the base probability mass.
pub const PRIORITY_REPLICATION: usize = 3;

/// Ordered symbols for one practice session. Immutable once built.
#[derive(Clone, Debug, Default)]
pub struct SessionQueue {
    items: Vec<Symbol>,
}

impl SessionQueue {
    pub fn get(&self, index: usize) -> Option<&Symbol> {
        self.items.get(index)
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count(&self, id: &str) -> usize {
        self.items.iter().filter(|s| s.id == id).count()
    }
}

pub fn build_queue<R: Rng + ?Sized>(
    inventory: &Inventory,
    settings: &Settings,
    rng: &mut R,
) -> SessionQueue {
    build_queue_with(inventory, settings, PRIORITY_REPLICATION, rng)
}

/// Weighted pool = inventory + `replication` copies of every priority symbol.
/// Shuffled passes over the pool are concatenated until the session limit is
/// reached, then truncated to exactly that length.
pub fn build_queue_with<R: Rng + ?Sized>(
    inventory: &Inventory,
    settings: &Settings,
    replication: usize,
    rng: &mut R,
) -> SessionQueue {
    if inventory.is_empty() {
        log::warn!("cannot build a session from an empty inventory");
        return SessionQueue::default();
    }

    let limit = settings.session_limit_for(inventory.len());
    let priority = settings.priority_ids();
    for id in priority.iter().filter(|id| inventory.find(id).is_none()) {
        log::debug!("priority letter {id} is not in the inventory, ignoring");
    }

    let mut pool: Vec<&Symbol> = inventory.symbols().iter().collect();
    let boosted: Vec<&Symbol> = inventory
        .symbols()
        .iter()
        .filter(|s| priority.contains(&fold_id(&s.id)))
        .collect();
    for _ in 0..replication {
        pool.extend(boosted.iter().copied());
    }

    let mut items: Vec<Symbol> = Vec::with_capacity(limit);
    while items.len() < limit {
        let mut pass = pool.clone();
        pass.shuffle(rng);
        items.extend(pass.into_iter().cloned());
    }
    items.truncate(limit);

    SessionQueue { items }
}

/// Recall mode order: difficult letters first in inventory order, then the
/// rest shuffled.
pub fn recall_order<R: Rng + ?Sized>(inventory: &Inventory, rng: &mut R) -> SessionQueue {
    let (mut items, mut regular): (Vec<Symbol>, Vec<Symbol>) = inventory
        .symbols()
        .iter()
        .cloned()
        .partition(|s| s.difficult);
    regular.shuffle(rng);
    items.extend(regular);
    SessionQueue { items }
}
