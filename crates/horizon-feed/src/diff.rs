//! Identity-based differences between two snapshots.
//!
//! Items and sections are matched by identifier, never by position:
//!
//! - present in the old snapshot only: **removed** (reported at the old index path)
//! - present in the new snapshot only: **inserted** (reported at the new index path)
//! - present in both, but placed differently: **moved**
//! - present in both and marked with `reload_items`/`reload_sections`: **reloaded**
//!
//! Placement is compared among retained entries only. An item that stays in
//! the same section is moved when its ordinal among the items retained in that
//! section differs between the snapshots; an item whose section changed is
//! always moved. Inserting or removing neighbours therefore never turns
//! untouched items into moves.
//!
//! Swapping two items yields exactly two moves. [`SnapshotDiff::minimal_moves`]
//! narrows the moved set to the entries outside the longest run that kept its
//! relative order, which is the smallest set a consumer has to animate.

use std::collections::{HashMap, HashSet};

use crate::index::IndexPath;
use crate::snapshot::{Identifier, Snapshot};

/// An item that appeared, disappeared or was reloaded, with its index path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemChange<I> {
    /// The item identifier.
    pub item: I,
    /// Old index path for removals, new index path otherwise.
    pub index_path: IndexPath,
}

/// An item that kept its identity but changed placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemMove<I> {
    /// The item identifier.
    pub item: I,
    /// Index path in the old snapshot.
    pub from: IndexPath,
    /// Index path in the new snapshot.
    pub to: IndexPath,
    /// The item now lives in a section with a different identifier.
    pub section_changed: bool,
}

/// A section that appeared, disappeared or was reloaded, with its ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionChange<S> {
    /// The section identifier.
    pub section: S,
    /// Old ordinal for removals, new ordinal otherwise.
    pub index: usize,
}

/// A section that kept its identity but changed ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionMove<S> {
    /// The section identifier.
    pub section: S,
    /// Ordinal in the old snapshot.
    pub from: usize,
    /// Ordinal in the new snapshot.
    pub to: usize,
}

/// Counts of each change kind, cheap to copy into logs and render passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffSummary {
    /// Inserted items.
    pub inserted: usize,
    /// Removed items.
    pub removed: usize,
    /// Moved items.
    pub moved: usize,
    /// Reloaded items.
    pub reloaded: usize,
    /// Inserted + removed + moved + reloaded sections.
    pub section_changes: usize,
}

/// The transformation from one snapshot to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotDiff<S, I> {
    /// Sections only in the new snapshot, by new ordinal.
    pub inserted_sections: Vec<SectionChange<S>>,
    /// Sections only in the old snapshot, by old ordinal.
    pub removed_sections: Vec<SectionChange<S>>,
    /// Sections in both whose ordinal among retained sections changed.
    pub moved_sections: Vec<SectionMove<S>>,
    /// Retained sections marked for reload.
    pub reloaded_sections: Vec<SectionChange<S>>,
    /// Items only in the new snapshot, in new display order.
    pub inserted: Vec<ItemChange<I>>,
    /// Items only in the old snapshot, in old display order.
    pub removed: Vec<ItemChange<I>>,
    /// Items in both that changed placement, in new display order.
    pub moved: Vec<ItemMove<I>>,
    /// Retained items marked for reload, in new display order.
    pub reloaded: Vec<ItemChange<I>>,
}

impl<S, I> Default for SnapshotDiff<S, I> {
    fn default() -> Self {
        Self {
            inserted_sections: Vec::new(),
            removed_sections: Vec::new(),
            moved_sections: Vec::new(),
            reloaded_sections: Vec::new(),
            inserted: Vec::new(),
            removed: Vec::new(),
            moved: Vec::new(),
            reloaded: Vec::new(),
        }
    }
}

impl<S: Identifier, I: Identifier> SnapshotDiff<S, I> {
    /// Computes the diff from `old` to `new`.
    ///
    /// Both snapshots are expected to hold unique identifiers; with duplicates
    /// the last occurrence of an identifier wins.
    pub fn between(old: &Snapshot<S, I>, new: &Snapshot<S, I>) -> Self {
        let mut diff = Self::default();
        diff.diff_sections(old, new);
        diff.diff_items(old, new);
        diff
    }

    /// A diff that removes everything in `old` and inserts everything in `new`.
    ///
    /// Used for reload-data applies, where the consumer discards its state.
    pub fn full_reload(old: &Snapshot<S, I>, new: &Snapshot<S, I>) -> Self {
        let mut diff = Self::default();
        for (index, (section, _)) in old.sections().enumerate() {
            diff.removed_sections.push(SectionChange {
                section: section.clone(),
                index,
            });
        }
        for (index, (section, _)) in new.sections().enumerate() {
            diff.inserted_sections.push(SectionChange {
                section: section.clone(),
                index,
            });
        }
        diff.removed = changes_of(old);
        diff.inserted = changes_of(new);
        diff
    }

    fn diff_sections(&mut self, old: &Snapshot<S, I>, new: &Snapshot<S, I>) {
        let old_ids = old.section_identifiers();
        let new_ids = new.section_identifiers();
        let old_set: HashSet<&S> = old_ids.iter().collect();
        let new_set: HashSet<&S> = new_ids.iter().collect();

        for (index, section) in old_ids.iter().enumerate() {
            if !new_set.contains(section) {
                self.removed_sections.push(SectionChange {
                    section: section.clone(),
                    index,
                });
            }
        }

        let old_index: HashMap<&S, usize> =
            old_ids.iter().enumerate().map(|(i, s)| (s, i)).collect();
        let old_rank = retained_ranks(old_ids.iter(), &new_set);
        let new_rank = retained_ranks(new_ids.iter(), &old_set);

        for (index, section) in new_ids.iter().enumerate() {
            let Some(&from) = old_index.get(section) else {
                self.inserted_sections.push(SectionChange {
                    section: section.clone(),
                    index,
                });
                continue;
            };
            if old_rank.get(section) != new_rank.get(section) {
                self.moved_sections.push(SectionMove {
                    section: section.clone(),
                    from,
                    to: index,
                });
            }
            if new.reloaded_section_identifiers().contains(section) {
                self.reloaded_sections.push(SectionChange {
                    section: section.clone(),
                    index,
                });
            }
        }
    }

    fn diff_items(&mut self, old: &Snapshot<S, I>, new: &Snapshot<S, I>) {
        let old_places = placements(old);
        let new_places = placements(new);

        for (section_index, (_, items)) in old.sections().enumerate() {
            for (item_index, item) in items.iter().enumerate() {
                if !new_places.contains_key(item) {
                    self.removed.push(ItemChange {
                        item: item.clone(),
                        index_path: IndexPath::new(section_index, item_index),
                    });
                }
            }
        }

        // Ranks among items that are retained and stay in the same section.
        let old_rank = same_section_ranks(old, &new_places);
        let new_rank = same_section_ranks(new, &old_places);

        for (section_index, (section, items)) in new.sections().enumerate() {
            for (item_index, item) in items.iter().enumerate() {
                let to = IndexPath::new(section_index, item_index);
                let Some((old_section, from)) = old_places.get(item) else {
                    self.inserted.push(ItemChange {
                        item: item.clone(),
                        index_path: to,
                    });
                    continue;
                };

                let section_changed = *old_section != section;
                if section_changed || old_rank.get(item) != new_rank.get(item) {
                    self.moved.push(ItemMove {
                        item: item.clone(),
                        from: *from,
                        to,
                        section_changed,
                    });
                }
                if new.reloaded_item_identifiers().contains(item)
                    || new.reloaded_section_identifiers().contains(section)
                {
                    self.reloaded.push(ItemChange {
                        item: item.clone(),
                        index_path: to,
                    });
                }
            }
        }
    }

    /// The moved items a consumer must animate: section changes plus the items
    /// outside the longest order-preserving run of each section.
    pub fn minimal_moves(&self) -> Vec<&ItemMove<I>> {
        let mut minimal = Vec::new();
        // New section ordinal -> same-section moves, in new display order.
        let mut by_section: HashMap<usize, Vec<&ItemMove<I>>> = HashMap::new();
        for mv in &self.moved {
            if mv.section_changed {
                minimal.push(mv);
            } else {
                by_section.entry(mv.to.section).or_default().push(mv);
            }
        }

        for moves in by_section.into_values() {
            let old_order: Vec<usize> = moves.iter().map(|mv| mv.from.item).collect();
            let keep = longest_increasing_run(&old_order);
            minimal.extend(
                moves
                    .into_iter()
                    .enumerate()
                    .filter(|(i, _)| !keep.contains(i))
                    .map(|(_, mv)| mv),
            );
        }

        minimal.sort_by_key(|mv| mv.to);
        minimal
    }

    /// Returns `true` when nothing changed.
    pub fn is_empty(&self) -> bool {
        self.inserted_sections.is_empty()
            && self.removed_sections.is_empty()
            && self.moved_sections.is_empty()
            && self.reloaded_sections.is_empty()
            && self.inserted.is_empty()
            && self.removed.is_empty()
            && self.moved.is_empty()
            && self.reloaded.is_empty()
    }

    /// Total number of changes of every kind.
    pub fn len(&self) -> usize {
        let summary = self.summary();
        summary.inserted + summary.removed + summary.moved + summary.reloaded + summary.section_changes
    }

    /// Per-kind counts.
    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            inserted: self.inserted.len(),
            removed: self.removed.len(),
            moved: self.moved.len(),
            reloaded: self.reloaded.len(),
            section_changes: self.inserted_sections.len()
                + self.removed_sections.len()
                + self.moved_sections.len()
                + self.reloaded_sections.len(),
        }
    }

    /// Identifiers of inserted items.
    pub fn inserted_items(&self) -> Vec<&I> {
        self.inserted.iter().map(|c| &c.item).collect()
    }

    /// Identifiers of removed items.
    pub fn removed_items(&self) -> Vec<&I> {
        self.removed.iter().map(|c| &c.item).collect()
    }

    /// Identifiers of moved items.
    pub fn moved_items(&self) -> Vec<&I> {
        self.moved.iter().map(|m| &m.item).collect()
    }

    /// Identifiers of reloaded items.
    pub fn reloaded_items(&self) -> Vec<&I> {
        self.reloaded.iter().map(|c| &c.item).collect()
    }
}

fn changes_of<S: Identifier, I: Identifier>(snapshot: &Snapshot<S, I>) -> Vec<ItemChange<I>> {
    snapshot
        .sections()
        .enumerate()
        .flat_map(|(section_index, (_, items))| {
            items.iter().enumerate().map(move |(item_index, item)| ItemChange {
                item: item.clone(),
                index_path: IndexPath::new(section_index, item_index),
            })
        })
        .collect()
}

fn placements<S: Identifier, I: Identifier>(
    snapshot: &Snapshot<S, I>,
) -> HashMap<&I, (&S, IndexPath)> {
    let mut places = HashMap::with_capacity(snapshot.number_of_items());
    for (section_index, (section, items)) in snapshot.sections().enumerate() {
        for (item_index, item) in items.iter().enumerate() {
            places.insert(item, (section, IndexPath::new(section_index, item_index)));
        }
    }
    places
}

/// Rank of each entry among the entries that are also in `other`.
fn retained_ranks<'a, T: Identifier>(
    ordered: impl Iterator<Item = &'a T>,
    other: &HashSet<&T>,
) -> HashMap<&'a T, usize> {
    ordered
        .filter(|id| other.contains(id))
        .enumerate()
        .map(|(rank, id)| (id, rank))
        .collect()
}

/// Rank of each item among items of its section that the other snapshot keeps
/// in a section with the same identifier.
fn same_section_ranks<'a, S: Identifier, I: Identifier>(
    snapshot: &'a Snapshot<S, I>,
    other: &HashMap<&I, (&S, IndexPath)>,
) -> HashMap<&'a I, usize> {
    let mut ranks = HashMap::new();
    for (section, items) in snapshot.sections() {
        let stable = items
            .iter()
            .filter(|item| other.get(item).is_some_and(|(s, _)| *s == section));
        for (rank, item) in stable.enumerate() {
            ranks.insert(item, rank);
        }
    }
    ranks
}

/// Positions (into `values`) of one longest strictly increasing subsequence.
fn longest_increasing_run(values: &[usize]) -> HashSet<usize> {
    // tails[k]: position of the smallest tail of an increasing run of length k + 1.
    let mut tails: Vec<usize> = Vec::new();
    let mut previous: Vec<Option<usize>> = vec![None; values.len()];

    for (position, &value) in values.iter().enumerate() {
        let slot = tails.partition_point(|&tail| values[tail] < value);
        if slot > 0 {
            previous[position] = Some(tails[slot - 1]);
        }
        if slot == tails.len() {
            tails.push(position);
        } else {
            tails[slot] = position;
        }
    }

    let mut run = HashSet::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(position) = cursor {
        run.insert(position);
        cursor = previous[position];
    }
    run
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(items: &[char]) -> Snapshot<u8, char> {
        Snapshot::from_sections([(0, items.to_vec())])
    }

    #[test]
    fn test_identical_is_empty() {
        let s = single(&['a', 'b', 'c']);
        let diff = SnapshotDiff::between(&s, &s);
        assert!(diff.is_empty());
        assert_eq!(diff.len(), 0);
    }

    #[test]
    fn test_large_identical_snapshots_are_empty() {
        let items: Vec<u32> = (0..50_000).collect();
        let s: Snapshot<u8, u32> = Snapshot::from_sections([(0, items)]);
        let diff = SnapshotDiff::between(&s, &s);
        assert!(diff.is_empty());
    }

    #[test]
    fn test_section_reload_marks_its_retained_items() {
        let old: Snapshot<&str, u32> =
            Snapshot::from_sections([("hot", (0..5_000).collect()), ("cold", vec![9_000, 9_001])]);
        let mut new = old.clone();
        new.reload_sections(&["hot"]).unwrap();
        new.reload_items(&[9_001]).unwrap();

        let diff = SnapshotDiff::between(&old, &new);
        assert_eq!(diff.reloaded_sections.len(), 1);
        assert_eq!(diff.reloaded.len(), 5_001);
        assert!(diff.reloaded_items().contains(&&9_001));
        assert!(!diff.reloaded_items().contains(&&9_000));
        assert!(diff.moved.is_empty());
    }

    #[test]
    fn test_insert_and_remove_do_not_move_neighbours() {
        let old = single(&['a', 'b', 'c', 'd']);
        let new = single(&['x', 'a', 'c', 'd']);
        let diff = SnapshotDiff::between(&old, &new);

        assert_eq!(diff.inserted_items(), vec![&'x']);
        assert_eq!(diff.inserted[0].index_path, IndexPath::new(0, 0));
        assert_eq!(diff.removed_items(), vec![&'b']);
        assert_eq!(diff.removed[0].index_path, IndexPath::new(0, 1));
        assert!(diff.moved.is_empty());
    }

    #[test]
    fn test_swap_reports_both_items() {
        let old = single(&['a', 'b', 'c', 'd']);
        let new = single(&['a', 'c', 'b', 'd']);
        let diff = SnapshotDiff::between(&old, &new);

        assert_eq!(diff.moved_items(), vec![&'c', &'b']);
        assert_eq!(diff.moved[0].from, IndexPath::new(0, 2));
        assert_eq!(diff.moved[0].to, IndexPath::new(0, 1));
        assert_eq!(diff.minimal_moves().len(), 1);
    }

    #[test]
    fn test_rotation() {
        let old = single(&['a', 'b', 'c']);
        let new = single(&['c', 'a', 'b']);
        let diff = SnapshotDiff::between(&old, &new);

        assert!(diff.inserted.is_empty());
        assert!(diff.removed.is_empty());
        assert_eq!(diff.moved.len(), 3);

        let minimal = diff.minimal_moves();
        assert_eq!(minimal.len(), 1);
        assert_eq!(minimal[0].item, 'c');
    }

    #[test]
    fn test_cross_section_move() {
        let old: Snapshot<&str, char> = Snapshot::from_sections([("a", vec!['x', 'y']), ("b", vec!['z'])]);
        let new: Snapshot<&str, char> = Snapshot::from_sections([("a", vec!['y']), ("b", vec!['x', 'z'])]);
        let diff = SnapshotDiff::between(&old, &new);

        assert_eq!(diff.moved.len(), 1);
        assert_eq!(diff.moved[0].item, 'x');
        assert_eq!(diff.moved[0].from, IndexPath::new(0, 0));
        assert_eq!(diff.moved[0].to, IndexPath::new(1, 0));
        assert_eq!(diff.minimal_moves().len(), 1);
    }

    #[test]
    fn test_section_changes() {
        let old: Snapshot<&str, u8> =
            Snapshot::from_sections([("a", vec![1]), ("b", vec![2]), ("c", vec![3])]);
        let mut new: Snapshot<&str, u8> =
            Snapshot::from_sections([("c", vec![3]), ("b", vec![2]), ("d", vec![4])]);
        new.reload_sections(&["b"]).unwrap();
        let diff = SnapshotDiff::between(&old, &new);

        assert_eq!(diff.removed_sections, vec![SectionChange { section: "a", index: 0 }]);
        assert_eq!(diff.inserted_sections, vec![SectionChange { section: "d", index: 2 }]);
        assert_eq!(diff.moved_sections.len(), 2);
        assert_eq!(diff.reloaded_sections, vec![SectionChange { section: "b", index: 1 }]);
        // Item 2 is reloaded through its section; items keep their sections.
        assert_eq!(diff.reloaded_items(), vec![&2]);
        assert!(diff.moved.is_empty());
        assert_eq!(diff.removed_items(), vec![&1]);
        assert_eq!(diff.inserted_items(), vec![&4]);
    }

    #[test]
    fn test_reload_marks_only_retained() {
        let old = single(&['a', 'b']);
        let mut new = single(&['a', 'b', 'c']);
        new.reload_items(&['b', 'c']).unwrap();
        let diff = SnapshotDiff::between(&old, &new);

        assert_eq!(diff.reloaded_items(), vec![&'b']);
        assert_eq!(diff.inserted_items(), vec![&'c']);
        assert_eq!(diff.summary().reloaded, 1);
    }

    #[test]
    fn test_full_reload() {
        let old = single(&['a', 'b']);
        let new = single(&['a', 'c']);
        let diff = SnapshotDiff::full_reload(&old, &new);

        assert_eq!(diff.removed.len(), 2);
        assert_eq!(diff.inserted.len(), 2);
        assert_eq!(diff.removed_sections.len(), 1);
        assert_eq!(diff.inserted_sections.len(), 1);
        assert!(diff.moved.is_empty());
    }

    #[test]
    fn test_longest_increasing_run() {
        let run = longest_increasing_run(&[2, 0, 1]);
        assert_eq!(run, HashSet::from([1, 2]));
        assert_eq!(longest_increasing_run(&[]).len(), 0);
        assert_eq!(longest_increasing_run(&[0, 1, 2, 3]).len(), 4);
        assert_eq!(longest_increasing_run(&[3, 2, 1, 0]).len(), 1);
    }
}
