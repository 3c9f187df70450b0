//! Tag generator
//!
//! Expands a resolved version into the concrete tag set per enabled
//! registry. The sha tag is the immutable reference the build pushes
//! first; floating tags are only repointed after the image is confirmed
//! present, so they are kept separate.

use crate::config::RegistryTarget;
use crate::domain::{ResolvedVersion, TagSet};

/// Generate the tag set for one run.
///
/// Floating tags per registry: every cumulative dotted prefix of the
/// numeric version as `v<prefix>` (suffixed when the version carries a
/// suffix), a bare `<suffix>` alias, and `latest` only for non-suffixed
/// versions. With no registry enabled the build still needs a local
/// reference, so the sha tag falls back to `<image>:<short-sha>`.
pub fn generate(
    version: &ResolvedVersion,
    image_name: &str,
    short_sha: &str,
    targets: &[RegistryTarget],
) -> TagSet {
    let mut tags = TagSet::default();

    if targets.is_empty() {
        tags.sha_tags.push(format!("{}:{}", image_name, short_sha));
        return tags;
    }

    let aliases = version_aliases(version);
    for target in targets {
        tags.sha_tags.push(target.image_ref(image_name, short_sha));
        for alias in &aliases {
            tags.push_floating(target.image_ref(image_name, alias));
        }
    }

    tags
}

/// Version alias tags, without registry or image qualification
fn version_aliases(version: &ResolvedVersion) -> Vec<String> {
    let numeric = version.numeric_version();
    let mut aliases = Vec::new();

    let mut prefix = String::new();
    for component in numeric.split('.') {
        if !prefix.is_empty() {
            prefix.push('.');
        }
        prefix.push_str(component);
        match &version.suffix {
            Some(suffix) => aliases.push(format!("v{}-{}", prefix, suffix)),
            None => aliases.push(format!("v{}", prefix)),
        }
    }

    match &version.suffix {
        Some(suffix) => aliases.push(suffix.clone()),
        None => aliases.push("latest".to_string()),
    }

    aliases
}
