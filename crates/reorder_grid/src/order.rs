//! Pure list bookkeeping. Identity lives in the ids, indices are derived.

/// Removes the item at `from` and reinserts it at `to`. Returns `None` when
/// either index is out of range, so callers can treat it as "no swap".
pub fn move_item<Id: Clone>(order: &[Id], from: usize, to: usize) -> Option<Vec<Id>> {
    if from >= order.len() || to >= order.len() {
        return None;
    }
    let mut reordered = order.to_vec();
    let moved = reordered.remove(from);
    reordered.insert(to, moved);
    Some(reordered)
}

/// True when both lists hold exactly the same ids, each once.
pub fn is_permutation<Id: PartialEq>(before: &[Id], after: &[Id]) -> bool {
    before.len() == after.len()
        && after
            .iter()
            .all(|id| before.iter().filter(|other| *other == id).count() == 1)
        && before
            .iter()
            .all(|id| after.iter().filter(|other| *other == id).count() == 1)
}
