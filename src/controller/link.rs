//! Group links embedded in chat replies.

use crate::types::Group;

/// Class that marks an anchor as an in-chat group link.
pub const GROUP_LINK_CLASS: &str = "group-link";

/// Attribute that marks an anchor as an in-chat group link.
pub const GROUP_LINK_MARKER: &str = "data-group-link";

/// An anchor the user followed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupLink {
    /// The `href` attribute.
    pub href: Option<String>,
    /// The `data-slug` attribute.
    pub data_slug: Option<String>,
    /// CSS classes on the anchor.
    pub classes: Vec<String>,
    /// Whether the anchor carries [`GROUP_LINK_MARKER`].
    pub marker: bool,
}

impl GroupLink {
    /// A marked link to `href`.
    pub fn href(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            marker: true,
            ..Self::default()
        }
    }

    /// A marked link carrying an explicit slug.
    pub fn slug(slug: impl Into<String>) -> Self {
        Self {
            data_slug: Some(slug.into()),
            marker: true,
            ..Self::default()
        }
    }

    /// Builds a link from user input: anything with a `/` is an href, otherwise a slug.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.contains('/') {
            Self::href(input)
        } else {
            Self::slug(input)
        }
    }

    /// Adds a CSS class.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Sets the marker attribute.
    pub fn with_marker(mut self, marker: bool) -> Self {
        self.marker = marker;
        self
    }

    /// Returns true if following this link should load a group in place.
    pub fn is_group_link(&self) -> bool {
        self.marker || self.classes.iter().any(|c| c == GROUP_LINK_CLASS)
    }

    /// The group slug: `data-slug` first, else the last path segment of `href`.
    pub fn resolve_slug(&self) -> Option<String> {
        if let Some(slug) = self.data_slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            return Some(slug.to_string());
        }
        let href = self.href.as_deref()?;
        let path = href.split(['?', '#']).next().unwrap_or_default();
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .next_back()
            .map(str::to_string)
    }
}

/// Receives loaded groups instead of the default header/message fallback.
pub trait GroupLoader: Send + Sync {
    /// Show `group`, which was loaded by `slug`.
    fn load_group(&self, slug: &str, group: &Group);
}

/// What following a link did.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkOutcome {
    /// The link is not a group link; nothing happened.
    NotIntercepted,
    /// The link had no usable slug.
    Invalid,
    /// The group was loaded and shown.
    Loaded {
        /// Slug the group was loaded by.
        slug: String,
        /// The group.
        group: Group,
    },
    /// Loading failed; an error was shown.
    Failed {
        /// Slug that failed to load.
        slug: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_slug_wins() {
        let link = GroupLink {
            href: Some("/group/other".to_string()),
            data_slug: Some("accra-savers".to_string()),
            marker: true,
            ..GroupLink::default()
        };
        assert_eq!(link.resolve_slug().as_deref(), Some("accra-savers"));
    }

    #[test]
    fn slug_from_trailing_segment() {
        assert_eq!(
            GroupLink::href("/group/accra-savers/").resolve_slug().as_deref(),
            Some("accra-savers")
        );
        assert_eq!(
            GroupLink::href("https://safihash.onrender.com/group/tema?tab=loans")
                .resolve_slug()
                .as_deref(),
            Some("tema")
        );
        assert_eq!(GroupLink::href("/").resolve_slug(), None);
        assert_eq!(GroupLink::slug("  ").resolve_slug(), None);
    }

    #[test]
    fn recognition() {
        assert!(GroupLink::href("/group/x").is_group_link());
        let plain = GroupLink::href("/group/x").with_marker(false);
        assert!(!plain.is_group_link());
        assert!(plain.with_class(GROUP_LINK_CLASS).is_group_link());
    }

    #[test]
    fn parse_input() {
        assert_eq!(GroupLink::parse("tema").data_slug.as_deref(), Some("tema"));
        assert_eq!(GroupLink::parse("/group/tema").href.as_deref(), Some("/group/tema"));
    }
}
