//! Snapshots: ordered sections of ordered item identifiers.
//!
//! A [`Snapshot`] describes one point-in-time list state. It is built with the
//! editing methods below and then handed to a
//! [`ListSynchronizer`](crate::ListSynchronizer), which takes ownership and
//! exposes it read-only from then on.
//!
//! Editing is lenient about uniqueness: appending the same identifier twice is
//! recorded as-is, and [`Snapshot::validate`] (run by every apply) reports the
//! first duplicate. Edits that need an anchor that does not exist fail and leave
//! the snapshot untouched.
//!
//! # Example
//!
//! ```
//! use horizon_feed::Snapshot;
//!
//! let mut snapshot = Snapshot::new();
//! snapshot.append_sections(["fruit"]);
//! snapshot.append_items(["apple", "cherry"]).unwrap();
//! snapshot.insert_items_before(["banana"], &"cherry").unwrap();
//!
//! assert_eq!(snapshot.item_identifiers(), vec!["apple", "banana", "cherry"]);
//! assert!(snapshot.validate().is_ok());
//! ```

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use horizon_feed_core::Outline;

use crate::error::{FeedError, IdentifierScope, Result};
use crate::index::IndexPath;

/// Bound for section and item identifiers.
///
/// Identity is value equality: two identifiers that compare equal are the
/// same row, whatever else they carry.
pub trait Identifier: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T: Clone + Eq + Hash + Debug + Send + Sync + 'static> Identifier for T {}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SectionEntry<S, I> {
    id: S,
    items: Vec<I>,
}

/// An ordered description of sections and item identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<S: Identifier, I: Identifier> {
    sections: Vec<SectionEntry<S, I>>,
    reloaded_sections: HashSet<S>,
    reloaded_items: HashSet<I>,
}

impl<S: Identifier, I: Identifier> Default for Snapshot<S, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Identifier, I: Identifier> Snapshot<S, I> {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
            reloaded_sections: HashSet::new(),
            reloaded_items: HashSet::new(),
        }
    }

    /// Creates a snapshot from `(section, items)` pairs in order.
    pub fn from_sections<It>(sections: It) -> Self
    where
        It: IntoIterator<Item = (S, Vec<I>)>,
    {
        Self {
            sections: sections
                .into_iter()
                .map(|(id, items)| SectionEntry { id, items })
                .collect(),
            ..Self::new()
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Number of sections.
    pub fn number_of_sections(&self) -> usize {
        self.sections.len()
    }

    /// Total number of items across all sections.
    pub fn number_of_items(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    /// Number of items in `section`, or `None` if the section is absent.
    pub fn number_of_items_in(&self, section: &S) -> Option<usize> {
        self.section_entry(section).map(|s| s.items.len())
    }

    /// Returns `true` if the snapshot has no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Section identifiers in order.
    pub fn section_identifiers(&self) -> Vec<S> {
        self.sections.iter().map(|s| s.id.clone()).collect()
    }

    /// All item identifiers in display order.
    pub fn item_identifiers(&self) -> Vec<I> {
        self.items().cloned().collect()
    }

    /// Item identifiers of one section, or `None` if the section is absent.
    pub fn item_identifiers_in(&self, section: &S) -> Option<&[I]> {
        self.section_entry(section).map(|s| s.items.as_slice())
    }

    /// Iterates over `(section, items)` in order.
    pub fn sections(&self) -> impl Iterator<Item = (&S, &[I])> {
        self.sections.iter().map(|s| (&s.id, s.items.as_slice()))
    }

    /// Iterates over all items in display order.
    pub fn items(&self) -> impl Iterator<Item = &I> {
        self.sections.iter().flat_map(|s| s.items.iter())
    }

    /// The section containing `item`.
    pub fn section_identifier_for(&self, item: &I) -> Option<&S> {
        self.locate_item(item).map(|path| &self.sections[path.section].id)
    }

    /// Ordinal of `section`.
    pub fn index_of_section(&self, section: &S) -> Option<usize> {
        self.sections.iter().position(|s| &s.id == section)
    }

    /// Flat ordinal of `item` across all sections.
    pub fn index_of_item(&self, item: &I) -> Option<usize> {
        self.items().position(|candidate| candidate == item)
    }

    /// Index path of `item`.
    pub fn index_path_of(&self, item: &I) -> Option<IndexPath> {
        self.locate_item(item)
    }

    /// The item at `index_path`.
    pub fn item_at(&self, index_path: IndexPath) -> Option<&I> {
        self.sections
            .get(index_path.section)
            .and_then(|s| s.items.get(index_path.item))
    }

    /// Returns `true` if `item` appears anywhere in the snapshot.
    pub fn contains_item(&self, item: &I) -> bool {
        self.locate_item(item).is_some()
    }

    /// Returns `true` if `section` is present.
    pub fn contains_section(&self, section: &S) -> bool {
        self.section_entry(section).is_some()
    }

    /// Items explicitly marked for reload.
    pub fn reloaded_item_identifiers(&self) -> &HashSet<I> {
        &self.reloaded_items
    }

    /// Sections explicitly marked for reload.
    pub fn reloaded_section_identifiers(&self) -> &HashSet<S> {
        &self.reloaded_sections
    }

    /// Returns `true` if `item` or its section was marked for reload.
    pub fn is_reloaded(&self, item: &I) -> bool {
        if self.reloaded_items.contains(item) {
            return true;
        }
        if self.reloaded_sections.is_empty() {
            return false;
        }
        self.section_identifier_for(item)
            .is_some_and(|section| self.reloaded_sections.contains(section))
    }

    /// Checks that section identifiers and item identifiers are unique.
    ///
    /// Sections are checked first; the first repeat in display order is named.
    pub fn validate(&self) -> Result<()> {
        let mut seen_sections = HashSet::with_capacity(self.sections.len());
        for section in &self.sections {
            if !seen_sections.insert(&section.id) {
                return Err(FeedError::duplicate(IdentifierScope::Section, &section.id));
            }
        }

        let mut seen_items = HashSet::with_capacity(self.number_of_items());
        for item in self.items() {
            if !seen_items.insert(item) {
                return Err(FeedError::duplicate(IdentifierScope::Item, item));
            }
        }
        Ok(())
    }

    /// Builds a debug outline: one group per section, one child per item.
    pub fn outline(&self) -> Outline {
        let mut outline = Outline::new("Snapshot");
        for section in &self.sections {
            outline.push_group(
                format!("{:?}", section.id),
                section.items.iter().map(|item| format!("{item:?}")),
            );
        }
        outline
    }

    // -------------------------------------------------------------------------
    // Section edits
    // -------------------------------------------------------------------------

    /// Appends sections at the end.
    pub fn append_sections<It>(&mut self, sections: It)
    where
        It: IntoIterator<Item = S>,
    {
        self.sections.extend(sections.into_iter().map(|id| SectionEntry {
            id,
            items: Vec::new(),
        }));
    }

    /// Inserts sections before `before`.
    pub fn insert_sections_before<It>(&mut self, sections: It, before: &S) -> Result<()>
    where
        It: IntoIterator<Item = S>,
    {
        let at = self.require_section(before)?;
        self.splice_sections(at, sections);
        Ok(())
    }

    /// Inserts sections after `after`.
    pub fn insert_sections_after<It>(&mut self, sections: It, after: &S) -> Result<()>
    where
        It: IntoIterator<Item = S>,
    {
        let at = self.require_section(after)? + 1;
        self.splice_sections(at, sections);
        Ok(())
    }

    /// Removes sections and their items. Absent sections are ignored.
    ///
    /// Returns the number of sections removed.
    pub fn delete_sections(&mut self, sections: &[S]) -> usize {
        let doomed: HashSet<&S> = sections.iter().collect();
        let before = self.sections.len();
        self.sections.retain(|s| !doomed.contains(&s.id));
        for id in sections {
            self.reloaded_sections.remove(id);
        }
        self.prune_reloaded_items();
        before - self.sections.len()
    }

    /// Moves `section` so it sits directly before `before`.
    pub fn move_section_before(&mut self, section: &S, before: &S) -> Result<()> {
        self.move_section(section, before, false)
    }

    /// Moves `section` so it sits directly after `after`.
    pub fn move_section_after(&mut self, section: &S, after: &S) -> Result<()> {
        self.move_section(section, after, true)
    }

    /// Marks sections as changed in place.
    pub fn reload_sections(&mut self, sections: &[S]) -> Result<()> {
        for id in sections {
            self.require_section(id)?;
        }
        self.reloaded_sections.extend(sections.iter().cloned());
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Item edits
    // -------------------------------------------------------------------------

    /// Appends items to the last section.
    pub fn append_items<It>(&mut self, items: It) -> Result<()>
    where
        It: IntoIterator<Item = I>,
    {
        let last = self.sections.last_mut().ok_or(FeedError::NoSections)?;
        last.items.extend(items);
        Ok(())
    }

    /// Appends items to `section`.
    pub fn append_items_to<It>(&mut self, items: It, section: &S) -> Result<()>
    where
        It: IntoIterator<Item = I>,
    {
        let at = self.require_section(section)?;
        self.sections[at].items.extend(items);
        Ok(())
    }

    /// Inserts items directly before `before`.
    pub fn insert_items_before<It>(&mut self, items: It, before: &I) -> Result<()>
    where
        It: IntoIterator<Item = I>,
    {
        let path = self.require_item(before)?;
        self.splice_items(path, items);
        Ok(())
    }

    /// Inserts items directly after `after`.
    pub fn insert_items_after<It>(&mut self, items: It, after: &I) -> Result<()>
    where
        It: IntoIterator<Item = I>,
    {
        let path = self.require_item(after)?;
        self.splice_items(path.with_item(path.item + 1), items);
        Ok(())
    }

    /// Removes items wherever they appear. Absent items are ignored.
    ///
    /// Returns the number of entries removed.
    pub fn delete_items(&mut self, items: &[I]) -> usize {
        let doomed: HashSet<&I> = items.iter().collect();
        let mut removed = 0;
        for section in &mut self.sections {
            let before = section.items.len();
            section.items.retain(|item| !doomed.contains(item));
            removed += before - section.items.len();
        }
        for item in items {
            self.reloaded_items.remove(item);
        }
        removed
    }

    /// Removes every section and item.
    pub fn delete_all_items(&mut self) {
        self.sections.clear();
        self.reloaded_sections.clear();
        self.reloaded_items.clear();
    }

    /// Moves `item` so it sits directly before `before`, possibly across sections.
    pub fn move_item_before(&mut self, item: &I, before: &I) -> Result<()> {
        self.move_item(item, before, false)
    }

    /// Moves `item` so it sits directly after `after`, possibly across sections.
    pub fn move_item_after(&mut self, item: &I, after: &I) -> Result<()> {
        self.move_item(item, after, true)
    }

    /// Marks items as changed in place (same identity, new content).
    pub fn reload_items(&mut self, items: &[I]) -> Result<()> {
        for item in items {
            self.require_item(item)?;
        }
        self.reloaded_items.extend(items.iter().cloned());
        Ok(())
    }

    /// Clears reload marks, keeping structure.
    pub(crate) fn clear_reload_marks(&mut self) {
        self.reloaded_items.clear();
        self.reloaded_sections.clear();
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn section_entry(&self, section: &S) -> Option<&SectionEntry<S, I>> {
        self.sections.iter().find(|s| &s.id == section)
    }

    fn locate_item(&self, item: &I) -> Option<IndexPath> {
        self.sections.iter().enumerate().find_map(|(section, entry)| {
            entry
                .items
                .iter()
                .position(|candidate| candidate == item)
                .map(|position| IndexPath::new(section, position))
        })
    }

    fn require_section(&self, section: &S) -> Result<usize> {
        self.index_of_section(section)
            .ok_or_else(|| FeedError::section_not_found(section))
    }

    fn require_item(&self, item: &I) -> Result<IndexPath> {
        self.locate_item(item)
            .ok_or_else(|| FeedError::item_not_found(item))
    }

    fn splice_sections<It>(&mut self, at: usize, sections: It)
    where
        It: IntoIterator<Item = S>,
    {
        let entries = sections.into_iter().map(|id| SectionEntry {
            id,
            items: Vec::new(),
        });
        self.sections.splice(at..at, entries);
    }

    fn splice_items<It>(&mut self, at: IndexPath, items: It)
    where
        It: IntoIterator<Item = I>,
    {
        let target = &mut self.sections[at.section].items;
        target.splice(at.item..at.item, items);
    }

    fn move_section(&mut self, section: &S, anchor: &S, after: bool) -> Result<()> {
        let from = self.require_section(section)?;
        self.require_section(anchor)?;
        if section == anchor {
            return Ok(());
        }

        let entry = self.sections.remove(from);
        // Anchor ordinal may have shifted after the removal.
        let anchor_at = self.require_section(anchor)?;
        let at = if after { anchor_at + 1 } else { anchor_at };
        self.sections.insert(at, entry);
        Ok(())
    }

    fn move_item(&mut self, item: &I, anchor: &I, after: bool) -> Result<()> {
        let from = self.require_item(item)?;
        self.require_item(anchor)?;
        if item == anchor {
            return Ok(());
        }

        let moved = self.sections[from.section].items.remove(from.item);
        let anchor_at = self.require_item(anchor)?;
        let at = if after {
            anchor_at.with_item(anchor_at.item + 1)
        } else {
            anchor_at
        };
        self.sections[at.section].items.insert(at.item, moved);
        Ok(())
    }

    fn prune_reloaded_items(&mut self) {
        let present: HashSet<&I> = self.sections.iter().flat_map(|s| s.items.iter()).collect();
        self.reloaded_items.retain(|item| present.contains(item));
    }
}
