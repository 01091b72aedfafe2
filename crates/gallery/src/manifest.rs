use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    #[error("failed to parse gallery manifest: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("entry '{slug}' references missing shader source {path}")]
    MissingSource { slug: String, path: PathBuf },
    #[error("duplicate entry slug '{0}'")]
    DuplicateSlug(String),
}

/// On-disk description of a gallery: a TOML file with one `[[entry]]` table
/// per shader.
#[derive(Debug, Clone, Deserialize)]
pub struct GalleryManifest {
    pub version: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "entry")]
    pub entries: Vec<EntryManifest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntryManifest {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Shader body file, relative to the manifest's directory.
    pub source: PathBuf,
    #[serde(default)]
    pub shadertoy_url: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
}

impl GalleryManifest {
    pub fn from_toml_str(input: &str) -> Result<Self, GalleryError> {
        let manifest: GalleryManifest = toml::from_str(input)?;
        for (index, entry) in manifest.entries.iter().enumerate() {
            if manifest.entries[..index]
                .iter()
                .any(|other| other.slug == entry.slug)
            {
                return Err(GalleryError::DuplicateSlug(entry.slug.clone()));
            }
        }
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
version = 1
title = "Shader portfolio"

[[entry]]
slug = "plasma"
title = "Plasma"
description = "Flowing waves."
tags = ["animation", "plasma"]
source = "plasma.frag"
shadertoy_url = "https://www.shadertoy.com/view/XfyBDW"

[[entry]]
slug = "tree"
title = "Tree"
source = "tree.frag"
"#;

    #[test]
    fn parses_entries_with_defaults() {
        let manifest = GalleryManifest::from_toml_str(MANIFEST).unwrap();
        assert_eq!(manifest.entries.len(), 2);
        assert_eq!(manifest.entries[0].tags, vec!["animation", "plasma"]);
        let tree = &manifest.entries[1];
        assert_eq!(tree.slug, "tree");
        assert!(tree.description.is_empty());
        assert!(tree.tags.is_empty());
        assert!(tree.shadertoy_url.is_none());
    }

    #[test]
    fn rejects_duplicate_slugs() {
        let duplicated = r#"
version = 1

[[entry]]
slug = "one"
title = "One"
source = "one.frag"

[[entry]]
slug = "one"
title = "Other one"
source = "other.frag"
"#;
        assert!(matches!(
            GalleryManifest::from_toml_str(duplicated),
            Err(GalleryError::DuplicateSlug(slug)) if slug == "one"
        ));
    }
}
