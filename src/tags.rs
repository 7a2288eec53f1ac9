//! Tag construction for metric emissions.
//!
//! A tag is a `key:value` dimension. Tag sets keep insertion order so the
//! same payload always renders the same sequence, and the builder drops any
//! field whose rendered value is empty rather than emitting a bare `key:`.
//!
//! The canonical profiles always put `client` first, then `group_id`,
//! `topic` and `partition`.

use std::fmt;

/// A single `key:value` dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    key: &'static str,
    value: String,
}

impl Tag {
    pub fn key(&self) -> &str {
        self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, self.value)
    }
}

/// Ordered set of tags attached to one emission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<Tag>,
}

impl TagSet {
    pub fn builder() -> TagBuilder {
        TagBuilder::new()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Check for a rendered `key:value` string.
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.to_string() == tag)
    }

    /// True if any tag uses `key`, whatever its value.
    pub fn has_key(&self, key: &str) -> bool {
        self.tags.iter().any(|t| t.key == key)
    }

    /// Render every tag as `key:value`, in order.
    pub fn to_strings(&self) -> Vec<String> {
        self.tags.iter().map(Tag::to_string).collect()
    }
}

impl Extend<Tag> for TagSet {
    /// Appends after the existing tags, keeping their order.
    fn extend<I: IntoIterator<Item = Tag>>(&mut self, iter: I) {
        self.tags.extend(iter);
    }
}

impl IntoIterator for TagSet {
    type Item = Tag;
    type IntoIter = std::vec::IntoIter<Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.into_iter()
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

/// Incremental builder for a [`TagSet`].
#[derive(Debug, Default)]
pub struct TagBuilder {
    tags: Vec<Tag>,
}

impl TagBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `key:value` unless the value renders empty.
    pub fn tag(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        let value = value.to_string();
        if !value.is_empty() {
            self.tags.push(Tag { key, value });
        }
        self
    }

    /// Append `key:value` only when the field is present.
    pub fn tag_opt(self, key: &'static str, value: Option<impl fmt::Display>) -> Self {
        match value {
            Some(value) => self.tag(key, value),
            None => self,
        }
    }

    pub fn build(self) -> TagSet {
        TagSet { tags: self.tags }
    }
}

// ============================================================================
// Canonical profiles
// ============================================================================

/// `client`, `group_id`.
pub fn client_group(client_id: &str, group_id: &str) -> TagSet {
    TagBuilder::new()
        .tag("client", client_id)
        .tag("group_id", group_id)
        .build()
}

/// `client`, `group_id`, `topic`, `partition`.
pub fn client_group_topic_partition(
    client_id: &str,
    group_id: &str,
    topic: &str,
    partition: i32,
) -> TagSet {
    TagBuilder::new()
        .tag("client", client_id)
        .tag("group_id", group_id)
        .tag("topic", topic)
        .tag("partition", partition)
        .build()
}

/// `client`, `topic`. Producer side.
pub fn client_topic(client_id: &str, topic: &str) -> TagSet {
    TagBuilder::new()
        .tag("client", client_id)
        .tag("topic", topic)
        .build()
}

/// `client` only. Producer delivery and acknowledgement.
pub fn client_only(client_id: &str) -> TagSet {
    TagBuilder::new().tag("client", client_id).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_profile_order() {
        let tags = client_group_topic_partition("racecar", "test_group", "test_topic", 1);
        assert_eq!(
            tags.to_strings(),
            vec![
                "client:racecar",
                "group_id:test_group",
                "topic:test_topic",
                "partition:1"
            ]
        );
    }

    #[test]
    fn test_client_group_profile() {
        let tags = client_group("racecar", "test_group");
        assert_eq!(tags.to_strings(), vec!["client:racecar", "group_id:test_group"]);
        assert!(!tags.has_key("topic"));
        assert!(!tags.has_key("partition"));
    }

    #[test]
    fn test_producer_profiles() {
        assert_eq!(
            client_topic("racecar", "test_topic").to_strings(),
            vec!["client:racecar", "topic:test_topic"]
        );
        assert_eq!(client_only("racecar").to_strings(), vec!["client:racecar"]);
    }

    #[test]
    fn test_empty_values_are_dropped() {
        let tags = client_group_topic_partition("racecar", "", "test_topic", 0);
        assert_eq!(
            tags.to_strings(),
            vec!["client:racecar", "topic:test_topic", "partition:0"]
        );
        assert!(tags.iter().all(|t| !t.value().is_empty()));
    }

    #[test]
    fn test_absent_field_yields_no_tag() {
        let partition: Option<i32> = None;
        let tags = TagBuilder::new()
            .tag("client", "racecar")
            .tag_opt("partition", partition)
            .build();
        assert_eq!(tags.len(), 1);
        assert!(!tags.has_key("partition"));

        let tags = TagBuilder::new().tag_opt("partition", Some(7)).build();
        assert!(tags.contains("partition:7"));
    }

    #[test]
    fn test_integer_rendering() {
        let tags = TagBuilder::new()
            .tag("partition", 10)
            .tag("offset", -3i64)
            .build();
        assert_eq!(tags.to_strings(), vec!["partition:10", "offset:-3"]);
    }

    #[test]
    fn test_extend_appends_in_order() {
        let mut tags = client_group("racecar", "test_group");
        tags.extend(TagBuilder::new().tag("topic", "test_topic").tag("partition", 3).build());

        assert_eq!(
            tags,
            client_group_topic_partition("racecar", "test_group", "test_topic", 3)
        );
        assert_eq!(tags.len(), 4);
    }

    #[test]
    fn test_builder_is_deterministic() {
        let a = client_group_topic_partition("a", "b", "c", 2);
        let b = client_group_topic_partition("a", "b", "c", 2);
        assert_eq!(a, b);
    }
}
