//! Registry tag set
//!
//! The immutable commit-addressed tag is pushed first; the floating
//! aliases are only repointed once the image is confirmed present.

/// Tags derived for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagSet {
    /// Immutable `<registry>/<ns>/<image>:<short-sha>` tags, one per
    /// enabled registry, ordered by registry. With no registry enabled
    /// this holds a single local `<image>:<short-sha>` reference.
    pub sha_tags: Vec<String>,
    /// Mutable human-meaningful aliases, deduplicated, stable order
    pub floating_tags: Vec<String>,
}

impl TagSet {
    /// Primary immutable tag, exposed to later workflow steps
    pub fn sha_tag(&self) -> &str {
        self.sha_tags
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Push a floating tag unless the identical string is already present
    pub fn push_floating(&mut self, tag: String) {
        if !self.floating_tags.contains(&tag) {
            self.floating_tags.push(tag);
        }
    }
}
