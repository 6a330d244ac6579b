use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::Settings;
use crate::inventory::{Inventory, Symbol};

/// Choices shown for one quiz question. Exactly one of them is the target.
#[derive(Clone, Debug)]
pub struct OptionSet {
    target: String,
    options: Vec<Symbol>,
}

impl OptionSet {
    pub fn target_id(&self) -> &str {
        &self.target
    }

    pub fn options(&self) -> &[Symbol] {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.options.iter().any(|s| s.id == id)
    }

    pub fn is_correct(&self, id: &str) -> bool {
        self.target == id
    }
}

/// Target first, then any configured confusing partner, then random distinct
/// fillers until `size` is reached or the inventory runs out. Presentation
/// order is shuffled afterwards.
pub fn build_option_set<R: Rng + ?Sized>(
    target: &Symbol,
    inventory: &Inventory,
    settings: &Settings,
    size: usize,
    rng: &mut R,
) -> OptionSet {
    let available = inventory.len() + usize::from(!inventory.contains(&target.id));
    let want = size.max(1).min(available);

    let mut options: Vec<Symbol> = Vec::with_capacity(want);
    options.push(target.clone());

    for pair in settings.confusing_pairs() {
        if options.len() >= want {
            break;
        }
        if let Some(partner) = pair.partner_of(&target.id)
            && let Some(symbol) = inventory.find(partner)
            && !options.iter().any(|s| s.id == symbol.id)
        {
            options.push(symbol.clone());
        }
    }

    let symbols = inventory.symbols();
    while options.len() < want {
        let candidate = &symbols[rng.gen_range(0..symbols.len())];
        if !options.iter().any(|s| s.id == candidate.id) {
            options.push(candidate.clone());
        }
    }

    options.shuffle(rng);
    OptionSet {
        target: target.id.clone(),
        options,
    }
}
