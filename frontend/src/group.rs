use std::hash::Hash;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use indexmap::IndexMap;

use crate::item::Item;
use crate::DAY_LABEL_FORMAT;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group<L, T> {
    pub label: L,
    pub items: Vec<T>,
}

/// Single left-to-right partition into runs of equal labels.
///
/// Nothing is sorted: items keep their input order, and a label that comes
/// back after a different one opens a new group rather than joining its
/// earlier run. Feeds arrive in time order, so runs coincide with days.
pub fn group<'a, T, L, F>(items: &'a [T], mut key_fn: F) -> Vec<Group<L, &'a T>>
where
    L: PartialEq,
    F: FnMut(&T) -> L,
{
    let mut groups: Vec<Group<L, &'a T>> = Vec::new();

    for item in items {
        let label = key_fn(item);
        if let Some(current) = groups.last_mut() {
            if current.label == label {
                current.items.push(item);
                continue;
            }
        }
        groups.push(Group {
            label,
            items: vec![item],
        });
    }

    groups
}

/// Coalescing variant of [`group`]: every item lands in the one group of its
/// label, and groups are ordered by the first occurrence of their label.
pub fn nest<'a, T, L, F>(items: &'a [T], mut key_fn: F) -> Vec<Group<L, &'a T>>
where
    L: Eq + Hash,
    F: FnMut(&T) -> L,
{
    let mut by_label: IndexMap<L, Vec<&'a T>> = IndexMap::new();

    for item in items {
        by_label.entry(key_fn(item)).or_default().push(item);
    }

    by_label
        .into_iter()
        .map(|(label, items)| Group { label, items })
        .collect()
}

/// Calendar-day labels in the viewer's offset. The format is a chrono
/// strftime string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayFormat {
    pub format: String,
    pub offset: FixedOffset,
}

impl Default for DayFormat {
    fn default() -> Self {
        DayFormat {
            format: DAY_LABEL_FORMAT.to_owned(),
            offset: Utc.fix(),
        }
    }
}

impl DayFormat {
    pub fn new(format: impl Into<String>, offset: FixedOffset) -> Self {
        DayFormat {
            format: format.into(),
            offset,
        }
    }

    pub fn label(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset).format(&self.format).to_string()
    }
}

pub fn group_by_day<'a, T: Item>(items: &'a [T], days: &DayFormat) -> Vec<Group<String, &'a T>> {
    group(items, |item| days.label(item.created_at()))
}
