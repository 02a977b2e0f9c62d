use std::collections::HashMap;
use std::hash::Hash;

/// Counter that remembers the order in which keys were first seen.
///
/// Ties are always resolved in favour of the key encountered first, which keeps
/// rankings deterministic regardless of hash iteration order.
#[derive(Clone, Debug)]
pub(crate) struct Tally<K> {
    entries: Vec<(K, u64)>,
    index: HashMap<K, usize>,
}

impl<K> Default for Tally<K> {
    fn default() -> Self {
        Self { entries: Vec::new(), index: HashMap::new() }
    }
}

impl<K: Clone + Eq + Hash> Tally<K> {
    pub(crate) fn add(&mut self, key: K, amount: u64) {
        match self.index.get(&key) {
            Some(&position) => self.entries[position].1 += amount,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, amount));
            }
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Key with the highest count; the earliest key wins a tie.
    pub(crate) fn leader(&self) -> Option<&K> {
        let mut best: Option<&(K, u64)> = None;
        for entry in &self.entries {
            if best.map_or(true, |current| entry.1 > current.1) {
                best = Some(entry);
            }
        }
        best.map(|(key, _)| key)
    }

    /// Entries sorted by descending count, first-seen order preserved on ties.
    pub(crate) fn ranked(&self) -> Vec<(K, u64)> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|left, right| right.1.cmp(&left.1));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::Tally;

    #[test]
    fn leader_prefers_first_seen_key_on_tie() {
        let mut tally = Tally::default();
        tally.add("Footwear", 2);
        tally.add("Clothing", 1);
        tally.add("Clothing", 1);

        assert_eq!(tally.leader(), Some(&"Footwear"));
    }

    #[test]
    fn ranked_is_stable_for_equal_counts() {
        let mut tally = Tally::default();
        tally.add("bags", 3);
        tally.add("jeans", 5);
        tally.add("shoes", 3);

        let ranked = tally.ranked();
        assert_eq!(ranked, vec![("jeans", 5), ("bags", 3), ("shoes", 3)]);
    }

    #[test]
    fn empty_tally_has_no_leader() {
        let tally: Tally<String> = Tally::default();
        assert!(tally.is_empty());
        assert_eq!(tally.leader(), None);
    }
}
