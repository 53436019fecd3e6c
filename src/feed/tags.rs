//! Feed tag tables
//!
//! Maps RSS and Atom element names to tag ids. Within one field, a later
//! variant has a higher priority: `pubDate` beats `dc:date`, `content:encoded`
//! beats `description`, and so on.

use super::item::{FeedField, FeedType};

/// Known item-level tags, ordered by priority within each field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum TagId {
    #[default]
    Unknown,

    // RSS
    RssDcDate,
    RssPubDate,
    RssTitle,
    RssMediaDescription,
    RssDescription,
    RssContentEncoded,
    RssGuid,
    RssLink,
    RssAuthor,
    RssDcCreator,

    // Atom
    AtomUpdated,
    AtomPublished,
    AtomMediaTitle,
    AtomTitle,
    AtomMediaDescription,
    AtomSummary,
    AtomContent,
    AtomId,
    AtomLink,
    AtomAuthor,
}

static RSS_TAGS: &[(&[u8], TagId)] = &[
    (b"author", TagId::RssAuthor),
    (b"content:encoded", TagId::RssContentEncoded),
    (b"dc:creator", TagId::RssDcCreator),
    (b"dc:date", TagId::RssDcDate),
    (b"description", TagId::RssDescription),
    (b"guid", TagId::RssGuid),
    (b"link", TagId::RssLink),
    (b"media:description", TagId::RssMediaDescription),
    (b"pubdate", TagId::RssPubDate),
    (b"title", TagId::RssTitle),
];

static ATOM_TAGS: &[(&[u8], TagId)] = &[
    (b"author", TagId::AtomAuthor),
    (b"content", TagId::AtomContent),
    (b"id", TagId::AtomId),
    (b"link", TagId::AtomLink),
    (b"media:description", TagId::AtomMediaDescription),
    (b"media:title", TagId::AtomMediaTitle),
    (b"published", TagId::AtomPublished),
    (b"summary", TagId::AtomSummary),
    (b"title", TagId::AtomTitle),
    (b"updated", TagId::AtomUpdated),
];

impl TagId {
    /// Look up an element name (case-insensitive) for the given feed type
    pub fn lookup(feed_type: FeedType, name: &[u8]) -> TagId {
        let table = match feed_type {
            FeedType::Rss => RSS_TAGS,
            FeedType::Atom => ATOM_TAGS,
            FeedType::None => return TagId::Unknown,
        };
        table
            .iter()
            .find(|(tag, _)| tag.eq_ignore_ascii_case(name))
            .map_or(TagId::Unknown, |&(_, id)| id)
    }

    /// The field this tag fills
    pub fn field(self) -> Option<FeedField> {
        use TagId::*;
        Some(match self {
            Unknown => return None,
            RssDcDate | RssPubDate | AtomUpdated | AtomPublished => FeedField::Time,
            RssTitle | AtomMediaTitle | AtomTitle => FeedField::Title,
            RssMediaDescription | RssDescription | RssContentEncoded | AtomMediaDescription
            | AtomSummary | AtomContent => FeedField::Content,
            RssGuid | AtomId => FeedField::Id,
            RssLink | AtomLink => FeedField::Link,
            RssAuthor | RssDcCreator | AtomAuthor => FeedField::Author,
        })
    }

    /// Whether the tag's body is content that may carry markup
    #[inline]
    pub fn is_content(self) -> bool {
        self.field() == Some(FeedField::Content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_case_insensitive() {
        assert_eq!(TagId::lookup(FeedType::Rss, b"pubDate"), TagId::RssPubDate);
        assert_eq!(TagId::lookup(FeedType::Rss, b"TITLE"), TagId::RssTitle);
        assert_eq!(TagId::lookup(FeedType::Atom, b"Content"), TagId::AtomContent);
        assert_eq!(TagId::lookup(FeedType::Atom, b"pubDate"), TagId::Unknown);
        assert_eq!(TagId::lookup(FeedType::None, b"title"), TagId::Unknown);
    }

    #[test]
    fn test_priorities() {
        assert!(TagId::RssDcDate < TagId::RssPubDate);
        assert!(TagId::RssMediaDescription < TagId::RssDescription);
        assert!(TagId::RssDescription < TagId::RssContentEncoded);
        assert!(TagId::RssAuthor < TagId::RssDcCreator);
        assert!(TagId::AtomUpdated < TagId::AtomPublished);
        assert!(TagId::AtomMediaTitle < TagId::AtomTitle);
        assert!(TagId::AtomSummary < TagId::AtomContent);
        assert!(TagId::Unknown < TagId::RssDcDate);
    }

    #[test]
    fn test_fields() {
        assert_eq!(TagId::RssGuid.field(), Some(FeedField::Id));
        assert_eq!(TagId::AtomLink.field(), Some(FeedField::Link));
        assert_eq!(TagId::Unknown.field(), None);
        assert!(TagId::AtomSummary.is_content());
        assert!(!TagId::AtomTitle.is_content());
    }
}
