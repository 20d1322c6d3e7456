//! Item tags and tag expansion.
//!
//! A tag is a named item category ("any plank"). Its value list holds
//! literal items and further tag references; references carry the
//! [`TAG_REFERENCE_PREFIX`] marker (`#minecraft:logs`). Expansion flattens an
//! [`IngredientSpec`] into the set of concrete items it accepts.

use ahash::{AHashMap, AHashSet};
use craftle_common::{CatalogError, CatalogResult, ItemId, TagId, TAG_REFERENCE_PREFIX};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::recipe::{IngredientChoice, IngredientSpec};

/// Set of concrete items accepted by an ingredient position.
pub type ItemSet = AHashSet<ItemId>;

/// One entry of a tag's value list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TagEntry {
    /// A literal item.
    Item(ItemId),
    /// A nested tag reference.
    Tag(TagId),
}

impl From<String> for TagEntry {
    fn from(raw: String) -> Self {
        if raw.starts_with(TAG_REFERENCE_PREFIX) {
            Self::Tag(TagId::new(raw))
        } else {
            Self::Item(ItemId::new(raw))
        }
    }
}

impl From<&str> for TagEntry {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<TagEntry> for String {
    fn from(entry: TagEntry) -> Self {
        match entry {
            TagEntry::Item(item) => item.as_str().to_string(),
            TagEntry::Tag(tag) => tag.to_string(),
        }
    }
}

/// All tags known to the catalog, keyed by normalised tag ID.
#[derive(Debug, Clone, Default)]
pub struct TagCatalog {
    tags: AHashMap<TagId, Vec<TagEntry>>,
}

impl TagCatalog {
    /// Creates an empty tag catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines (or replaces) a tag.
    pub fn insert(&mut self, tag: impl Into<TagId>, entries: Vec<TagEntry>) {
        self.tags.insert(tag.into(), entries);
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with_tag<E: Into<TagEntry>>(
        mut self,
        tag: impl Into<TagId>,
        entries: impl IntoIterator<Item = E>,
    ) -> Self {
        self.insert(tag, entries.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the raw value list of a tag.
    #[must_use]
    pub fn get(&self, tag: &TagId) -> Option<&[TagEntry]> {
        self.tags.get(tag).map(Vec::as_slice)
    }

    /// Check if a tag is defined.
    #[must_use]
    pub fn contains(&self, tag: &TagId) -> bool {
        self.tags.contains_key(tag)
    }

    /// Number of defined tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns true if no tags are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Returns a borrowing expander over this catalog.
    #[must_use]
    pub fn expander(&self) -> TagExpander<'_> {
        TagExpander::new(self)
    }
}

/// Worklist step for tag resolution.
enum Visit {
    Enter(TagId),
    Exit(TagId),
}

/// Resolves ingredient specs into concrete item sets.
#[derive(Debug, Clone, Copy)]
pub struct TagExpander<'a> {
    tags: &'a TagCatalog,
}

impl<'a> TagExpander<'a> {
    /// Creates an expander over a tag catalog.
    #[must_use]
    pub const fn new(tags: &'a TagCatalog) -> Self {
        Self { tags }
    }

    /// Expands an ingredient spec into every item it accepts.
    pub fn expand(&self, spec: &IngredientSpec) -> CatalogResult<ItemSet> {
        let mut items = ItemSet::default();
        let mut resolved = AHashSet::default();

        for choice in spec.choices() {
            match choice {
                IngredientChoice::Item { item } => {
                    items.insert(item.clone());
                },
                IngredientChoice::Tag { tag } => {
                    self.collect_tag(tag, &mut items, &mut resolved)?;
                },
            }
        }

        Ok(items)
    }

    /// Expands a single tag into every item it contains, transitively.
    pub fn expand_tag(&self, tag: &TagId) -> CatalogResult<ItemSet> {
        let mut items = ItemSet::default();
        self.collect_tag(tag, &mut items, &mut AHashSet::default())?;
        Ok(items)
    }

    /// Depth-first walk with an explicit stack. `on_path` holds the tags
    /// currently being resolved; meeting one of them again is a cycle.
    /// `resolved` tags were fully walked already and are skipped.
    fn collect_tag(
        &self,
        root: &TagId,
        items: &mut ItemSet,
        resolved: &mut AHashSet<TagId>,
    ) -> CatalogResult<()> {
        let mut on_path = AHashSet::default();
        let mut stack = vec![Visit::Enter(root.clone())];

        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(tag) => {
                    if resolved.contains(&tag) {
                        continue;
                    }
                    if on_path.contains(&tag) {
                        debug!("Tag {} references itself", tag);
                        return Err(CatalogError::TagCycle { tag });
                    }
                    let Some(entries) = self.tags.get(&tag) else {
                        debug!("Tag {} is not defined", tag);
                        return Err(CatalogError::UnknownTag(tag));
                    };

                    on_path.insert(tag.clone());
                    stack.push(Visit::Exit(tag));
                    for entry in entries.iter().rev() {
                        match entry {
                            TagEntry::Item(item) => {
                                items.insert(item.clone());
                            },
                            TagEntry::Tag(nested) => stack.push(Visit::Enter(nested.clone())),
                        }
                    }
                },
                Visit::Exit(tag) => {
                    on_path.remove(&tag);
                    resolved.insert(tag);
                },
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> ItemId {
        ItemId::new(id)
    }

    fn wood_tags() -> TagCatalog {
        TagCatalog::new()
            .with_tag("oak_logs", ["minecraft:oak_log", "minecraft:oak_wood"])
            .with_tag("birch_logs", ["minecraft:birch_log", "minecraft:birch_wood"])
            .with_tag(
                "logs_that_burn",
                ["#minecraft:oak_logs", "#minecraft:birch_logs"],
            )
            .with_tag("logs", ["#minecraft:logs_that_burn", "minecraft:crimson_stem"])
    }

    #[test]
    fn test_tag_entry_parsing() {
        assert_eq!(
            TagEntry::from("minecraft:stick"),
            TagEntry::Item(item("minecraft:stick"))
        );
        assert_eq!(
            TagEntry::from("#minecraft:planks"),
            TagEntry::Tag(TagId::new("planks"))
        );
        assert_eq!(
            String::from(TagEntry::Tag(TagId::new("planks"))),
            "#minecraft:planks"
        );
    }

    #[test]
    fn test_expand_literal_item() {
        let tags = TagCatalog::new();
        let set = tags
            .expander()
            .expand(&IngredientSpec::item("minecraft:stick"))
            .expect("literal");
        assert_eq!(set.len(), 1);
        assert!(set.contains(&item("minecraft:stick")));
    }

    #[test]
    fn test_expand_is_transitive() {
        let tags = wood_tags();
        let set = tags
            .expander()
            .expand(&IngredientSpec::tag("minecraft:logs"))
            .expect("logs");

        for expected in [
            "minecraft:oak_log",
            "minecraft:oak_wood",
            "minecraft:birch_log",
            "minecraft:birch_wood",
            "minecraft:crimson_stem",
        ] {
            assert!(set.contains(&item(expected)), "missing {expected}");
        }
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn test_expand_mixed_alternatives() {
        let tags = wood_tags();
        let spec = IngredientSpec::any_of(vec![
            IngredientChoice::Item {
                item: item("minecraft:coal"),
            },
            IngredientChoice::Tag {
                tag: TagId::new("oak_logs"),
            },
        ]);
        let set = tags.expander().expand(&spec).expect("mixed");
        assert_eq!(set.len(), 3);
        assert!(set.contains(&item("minecraft:coal")));
        assert!(set.contains(&item("minecraft:oak_wood")));
    }

    #[test]
    fn test_shared_nested_tag_is_not_a_cycle() {
        let tags = TagCatalog::new()
            .with_tag("base", ["minecraft:x", "minecraft:y"])
            .with_tag("left", ["#minecraft:base"])
            .with_tag("right", ["#minecraft:base", "minecraft:z"])
            .with_tag("top", ["#minecraft:left", "#minecraft:right", "#minecraft:base"]);

        let set = tags
            .expander()
            .expand_tag(&TagId::new("top"))
            .expect("diamond");
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_duplicate_entries_are_harmless() {
        let tags = TagCatalog::new()
            .with_tag("dupes", ["minecraft:x", "minecraft:x", "#minecraft:more"])
            .with_tag("more", ["minecraft:x"]);
        let set = tags
            .expander()
            .expand_tag(&TagId::new("dupes"))
            .expect("dupes");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_unknown_tag_is_lookup_error() {
        let tags = TagCatalog::new().with_tag("outer", ["#minecraft:missing"]);
        let err = tags
            .expander()
            .expand(&IngredientSpec::tag("outer"))
            .expect_err("missing nested tag");
        assert_eq!(err, CatalogError::UnknownTag(TagId::new("missing")));
    }

    #[test]
    fn test_cycle_is_detected() {
        let tags = TagCatalog::new()
            .with_tag("a", ["#minecraft:b", "minecraft:x"])
            .with_tag("b", ["#minecraft:c"])
            .with_tag("c", ["#minecraft:a"]);

        let err = tags
            .expander()
            .expand_tag(&TagId::new("a"))
            .expect_err("cycle");
        assert!(matches!(err, CatalogError::TagCycle { .. }));
    }

    #[test]
    fn test_self_reference_is_detected() {
        let tags = TagCatalog::new().with_tag("loop", ["#minecraft:loop"]);
        let err = tags
            .expander()
            .expand_tag(&TagId::new("loop"))
            .expect_err("self cycle");
        assert_eq!(
            err,
            CatalogError::TagCycle {
                tag: TagId::new("loop")
            }
        );
    }

    #[test]
    fn test_tags_deserialize_from_value_lists() {
        let entries: Vec<TagEntry> =
            serde_json::from_str(r##"["minecraft:oak_planks", "#minecraft:logs"]"##)
                .expect("entries");
        assert_eq!(
            entries,
            vec![
                TagEntry::Item(item("minecraft:oak_planks")),
                TagEntry::Tag(TagId::new("logs")),
            ]
        );
    }
}
