//! First-fit-decreasing batch planner

use super::tokens::TokenCost;

/// One planned group of items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch<T> {
    pub items: Vec<T>,
    /// Sum of the members' estimated costs
    pub estimated_tokens: usize,
}

impl<T> Batch<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Partition `items` into batches whose estimated cost stays within `max_tokens`.
///
/// Items are placed largest first into the first batch with room. An item that
/// alone exceeds the budget gets a singleton batch. Ties keep input order, so the
/// plan is deterministic. Empty input yields no batches.
pub fn plan_batches<T: TokenCost>(items: Vec<T>, max_tokens: usize) -> Vec<Batch<T>> {
    let mut weighted: Vec<(usize, T)> = items
        .into_iter()
        .map(|item| (item.estimated_tokens(), item))
        .collect();
    // stable sort keeps input order among equal costs
    weighted.sort_by(|a, b| b.0.cmp(&a.0));

    let mut batches: Vec<Batch<T>> = Vec::new();
    for (cost, item) in weighted {
        if cost > max_tokens {
            batches.push(Batch {
                items: vec![item],
                estimated_tokens: cost,
            });
            continue;
        }

        match batches
            .iter_mut()
            .find(|batch| batch.estimated_tokens + cost <= max_tokens)
        {
            Some(batch) => {
                batch.estimated_tokens += cost;
                batch.items.push(item);
            }
            None => batches.push(Batch {
                items: vec![item],
                estimated_tokens: cost,
            }),
        }
    }

    batches
}
