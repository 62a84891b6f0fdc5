use std::collections::{HashMap, HashSet};
use std::ops::Deref;

use log::warn;

use crate::item::Item;
use crate::page::Page;

/// An incoming item reused an id already held, with different content.
/// The held copy wins; callers wanting the fresh one must evict and refetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("item {id:?} arrived again with different content, keeping the first copy")]
pub struct MergeInputError<I> {
    pub id: I,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome<T: Item> {
    pub items: Vec<T>,
    pub conflicts: Vec<MergeInputError<T::Id>>,
}

/// `current` followed by `incoming`, keeping only the first occurrence of
/// every id. Items already held keep their position; new ones are appended
/// in source order.
pub fn merge<T: Item + Clone>(current: &[T], incoming: &Page<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(current.len() + incoming.items.len());

    current
        .iter()
        .chain(incoming.items.iter())
        .filter(|item| seen.insert(item.id()))
        .cloned()
        .collect()
}

/// Same as [`merge`], but also reports duplicates whose payload differs
/// from the copy that was kept.
pub fn merge_checked<T: Item + Clone + PartialEq>(current: &[T], incoming: &Page<T>) -> MergeOutcome<T> {
    let mut first_seen: HashMap<&T::Id, &T> =
        HashMap::with_capacity(current.len() + incoming.items.len());
    let mut items = Vec::with_capacity(current.len() + incoming.items.len());
    let mut conflicts = Vec::new();

    for item in current.iter().chain(incoming.items.iter()) {
        match first_seen.get(item.id()) {
            Some(kept) => {
                if *kept != item {
                    warn!("dropping conflicting copy of {:?}", item.id());
                    conflicts.push(MergeInputError {
                        id: item.id().clone(),
                    });
                }
            }
            None => {
                first_seen.insert(item.id(), item);
                items.push(item.clone());
            }
        }
    }

    MergeOutcome { items, conflicts }
}

/// Items held by one view, built only through merges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccumulatedList<T>(Vec<T>);

impl<T> Default for AccumulatedList<T> {
    fn default() -> Self {
        AccumulatedList(Vec::new())
    }
}

impl<T: Item + Clone> AccumulatedList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge_page(&self, page: &Page<T>) -> Self {
        AccumulatedList(merge(&self.0, page))
    }

    pub fn ids(&self) -> impl Iterator<Item = &T::Id> + '_ {
        self.0.iter().map(|item| item.id())
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn into_vec(self) -> Vec<T> {
        self.0
    }
}

impl<T> Deref for AccumulatedList<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Entry {
        id: u32,
        created_at: DateTime<Utc>,
        body: &'static str,
    }

    impl Item for Entry {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.id
        }

        fn created_at(&self) -> DateTime<Utc> {
            self.created_at
        }
    }

    fn entry(id: u32, day: u32, body: &'static str) -> Entry {
        Entry {
            id,
            created_at: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            body,
        }
    }

    fn ids(items: &[Entry]) -> Vec<u32> {
        items.iter().map(|e| e.id).collect()
    }

    #[test]
    fn merging_an_empty_page_changes_nothing() {
        let current = vec![entry(1, 1, "a"), entry(2, 1, "b")];
        assert_eq!(merge(&current, &Page::empty()), current);
        assert!(merge::<Entry>(&[], &Page::empty()).is_empty());
    }

    #[test]
    fn overlapping_page_keeps_held_copy_and_appends_new() {
        let current = vec![entry(1, 1, "held")];
        let page = Page::last(vec![entry(1, 1, "refetched"), entry(2, 2, "new")]);

        let merged = merge(&current, &page);

        assert_eq!(ids(&merged), vec![1, 2]);
        assert_eq!(merged[0].body, "held");
    }

    #[test]
    fn held_order_precedes_incoming_order() {
        let current = vec![entry(5, 1, "a"), entry(3, 1, "b")];
        let page = Page::last(vec![entry(9, 2, "c"), entry(3, 2, "b"), entry(1, 2, "d")]);

        let merged = merge(&current, &page);

        assert_eq!(ids(&merged), vec![5, 3, 9, 1]);
        assert!(merged.len() <= current.len() + page.items.len());
    }

    #[test]
    fn every_held_id_survives_in_place() {
        let cases: Vec<(Vec<u32>, Vec<u32>, Vec<u32>)> = vec![
            (vec![1, 2, 3], vec![3, 4, 5], vec![1, 2, 3, 4, 5]),
            (vec![1, 2, 3], vec![1, 2, 3], vec![1, 2, 3]),
            (vec![1, 2, 3], vec![2], vec![1, 2, 3]),
            (vec![4, 5], vec![1, 2, 3, 4], vec![4, 5, 1, 2, 3]),
            (vec![1], vec![], vec![1]),
            (vec![], vec![7, 7, 8], vec![7, 8]),
        ];

        for (held, incoming, expected) in cases {
            let current: Vec<Entry> = held.iter().map(|&id| entry(id, 1, "held")).collect();
            let page = Page::last(incoming.iter().map(|&id| entry(id, 2, "new")).collect());

            let merged = merge(&current, &page);

            assert_eq!(ids(&merged), expected, "held {:?} + {:?}", held, incoming);
            assert_eq!(ids(&merged[..held.len()]), held);
            assert!(merged[..held.len()].iter().all(|e| e.body == "held"));
        }
    }

    #[test]
    fn duplicates_inside_one_page_collapse_to_first() {
        let page = Page::last(vec![entry(1, 1, "x"), entry(2, 1, "y"), entry(1, 1, "z")]);
        let merged = merge(&[], &page);
        assert_eq!(ids(&merged), vec![1, 2]);
        assert_eq!(merged[0].body, "x");
    }

    #[test]
    fn checked_merge_reports_only_differing_duplicates() {
        let current = vec![entry(1, 1, "a"), entry(2, 1, "b")];
        let page = Page::last(vec![entry(1, 1, "a"), entry(2, 1, "edited"), entry(3, 2, "c")]);

        let outcome = merge_checked(&current, &page);

        assert_eq!(ids(&outcome.items), vec![1, 2, 3]);
        assert_eq!(outcome.items[1].body, "b");
        assert_eq!(outcome.conflicts, vec![MergeInputError { id: 2 }]);
    }

    #[test]
    fn accumulated_list_grows_monotonically() {
        let list = AccumulatedList::new()
            .merge_page(&Page::last(vec![entry(1, 1, "a"), entry(2, 1, "b")]))
            .merge_page(&Page::last(vec![entry(2, 1, "b"), entry(3, 2, "c")]));

        assert_eq!(list.ids().copied().collect::<Vec<_>>(), vec![1, 2, 3]);

        let mut list = list;
        list.clear();
        assert!(list.is_empty());
    }
}
