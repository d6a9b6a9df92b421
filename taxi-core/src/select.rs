//! Bounded top-K selection by repeated linear scans.
//!
//! [`select_top_k`] runs `k` rounds. Each round scans every item not yet
//! taken and keeps the first one whose score is strictly greater than the
//! current candidate. The winner is marked consumed and appended to the
//! result. Equal scores therefore keep their input order, and the cost is
//! `O(N·K)` time with `O(N)` extra space for the consumed markers.
//!
//! The selection never sorts. Swapping in a sort would change which of two
//! equal-scored items comes first.

/// An item carrying a ranking score.
///
/// Scores are expected to be finite; callers filter out rows that would
/// produce `NaN` or infinities before selection.
pub trait Scored {
    /// Score used to rank the item; larger is better.
    fn score(&self) -> f64;
}

impl<T: Scored + ?Sized> Scored for &T {
    fn score(&self) -> f64 {
        (**self).score()
    }
}

/// A generic identifier paired with a score.
///
/// # Examples
/// ```
/// use taxi_core::{ScoredItem, select_top_k};
///
/// let items = [ScoredItem::new("a", 1.0), ScoredItem::new("b", 2.0)];
/// let top = select_top_k(&items, 1);
/// assert_eq!(top, vec![ScoredItem::new("b", 2.0)]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoredItem<Id> {
    /// Opaque identifier; the selector never inspects it.
    pub id: Id,
    /// Ranking score.
    pub score: f64,
}

impl<Id> ScoredItem<Id> {
    /// Pair an identifier with its score.
    #[must_use]
    pub const fn new(id: Id, score: f64) -> Self {
        Self { id, score }
    }
}

impl<Id> Scored for ScoredItem<Id> {
    fn score(&self) -> f64 {
        self.score
    }
}

/// Return up to `k` items with the highest scores, best first.
///
/// Ties go to the item that appears first in `items`. The input slice is
/// only borrowed; the consumed markers live for the duration of the call.
///
/// # Examples
/// ```
/// use taxi_core::{ScoredItem, select_top_k};
///
/// let items = [
///     ScoredItem::new("a", 5.0),
///     ScoredItem::new("b", 9.0),
///     ScoredItem::new("c", 9.0),
///     ScoredItem::new("d", 1.0),
/// ];
/// let ids: Vec<_> = select_top_k(&items, 2).into_iter().map(|item| item.id).collect();
/// assert_eq!(ids, ["b", "c"]);
/// assert!(select_top_k(&items, 0).is_empty());
/// ```
#[must_use]
pub fn select_top_k<T>(items: &[T], k: usize) -> Vec<T>
where
    T: Scored + Clone,
{
    let mut consumed = vec![false; items.len()];
    let mut selected = Vec::with_capacity(k.min(items.len()));

    for _ in 0..k {
        let Some(winner) = best_unconsumed(items, &consumed) else {
            break;
        };
        if let (Some(flag), Some(item)) = (consumed.get_mut(winner), items.get(winner)) {
            *flag = true;
            selected.push(item.clone());
        }
    }

    selected
}

/// Index of the highest-scoring unconsumed item, first occurrence on ties.
fn best_unconsumed<T: Scored>(items: &[T], consumed: &[bool]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, (item, taken)) in items.iter().zip(consumed).enumerate() {
        if *taken {
            continue;
        }
        let score = item.score();
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((index, score));
        }
    }
    best.map(|(index, _)| index)
}
