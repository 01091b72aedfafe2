use std::fs;
use std::path::{Path, PathBuf};

use crate::manifest::{GalleryError, GalleryManifest};
use crate::wrap::wrap_fragment;

/// One gallery shader, fully resolved: metadata plus a complete fragment
/// stage ready for the renderer.
#[derive(Debug, Clone)]
pub struct ShaderEntry {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub shadertoy_url: Option<String>,
    body: String,
    fragment_source: String,
}

impl ShaderEntry {
    /// The wrapped, complete fragment stage handed to the renderer.
    pub fn fragment_source(&self) -> &str {
        &self.fragment_source
    }

    /// The author's `mainImage` body as written on disk.
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// A loaded gallery: manifest metadata plus every entry's shader source.
#[derive(Debug, Clone)]
pub struct Gallery {
    title: Option<String>,
    entries: Vec<ShaderEntry>,
}

impl Gallery {
    /// Loads `manifest.toml` and the shader files it references from `dir`.
    pub fn load(dir: &Path) -> Result<Self, GalleryError> {
        let manifest_path = dir.join("manifest.toml");
        let manifest_text = fs::read_to_string(&manifest_path).map_err(|source| {
            GalleryError::Io {
                path: manifest_path.clone(),
                source,
            }
        })?;
        let manifest = GalleryManifest::from_toml_str(&manifest_text)?;
        Self::from_manifest(manifest, dir)
    }

    fn from_manifest(manifest: GalleryManifest, dir: &Path) -> Result<Self, GalleryError> {
        let mut entries = Vec::with_capacity(manifest.entries.len());
        for entry in manifest.entries {
            let source_path = resolve_source(dir, &entry.source);
            if !source_path.is_file() {
                return Err(GalleryError::MissingSource {
                    slug: entry.slug,
                    path: source_path,
                });
            }
            let body = fs::read_to_string(&source_path).map_err(|source| GalleryError::Io {
                path: source_path.clone(),
                source,
            })?;
            let fragment_source = wrap_fragment(&body);
            tracing::debug!(slug = %entry.slug, path = %source_path.display(), "loaded gallery entry");
            entries.push(ShaderEntry {
                slug: entry.slug,
                title: entry.title,
                description: entry.description,
                tags: entry.tags,
                shadertoy_url: entry.shadertoy_url,
                body,
                fragment_source,
            });
        }

        Ok(Self {
            title: manifest.title,
            entries,
        })
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn entries(&self) -> &[ShaderEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the entry with the given slug.
    pub fn position(&self, slug: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.slug == slug)
    }
}

fn resolve_source(dir: &Path, source: &Path) -> PathBuf {
    if source.is_absolute() {
        source.to_path_buf()
    } else {
        dir.join(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    fn write_gallery(dir: &Path, manifest: &str, shaders: &[(&str, &str)]) {
        fs::write(dir.join("manifest.toml"), manifest).unwrap();
        for (name, body) in shaders {
            fs::write(dir.join(name), body).unwrap();
        }
    }

    const MANIFEST: &str = r#"
version = 1
title = "Test gallery"

[[entry]]
slug = "plasma"
title = "Plasma"
tags = ["animation"]
source = "plasma.frag"
"#;

    const BODY: &str = "void mainImage(out vec4 o, in vec2 fc) { o = vec4(1.0); }";

    #[test]
    fn loads_and_wraps_entries() {
        let dir = tempfile::tempdir().unwrap();
        write_gallery(dir.path(), MANIFEST, &[("plasma.frag", BODY)]);

        let gallery = Gallery::load(dir.path()).unwrap();
        assert_eq!(gallery.title(), Some("Test gallery"));
        assert_eq!(gallery.len(), 1);
        let entry = &gallery.entries()[0];
        assert_eq!(entry.body(), BODY);
        assert!(entry.fragment_source().starts_with("#version 450"));
        assert!(entry.fragment_source().contains("mainImage"));
    }

    #[test]
    fn missing_shader_file_is_reported_with_its_slug() {
        let dir = tempfile::tempdir().unwrap();
        write_gallery(dir.path(), MANIFEST, &[]);

        match Gallery::load(dir.path()) {
            Err(GalleryError::MissingSource { slug, .. }) => assert_eq!(slug, "plasma"),
            other => panic!("expected MissingSource, got {other:?}"),
        }
    }

    #[test]
    fn position_finds_entries_by_slug() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = r#"
version = 1

[[entry]]
slug = "a"
title = "A"
source = "a.frag"

[[entry]]
slug = "b"
title = "B"
source = "b.frag"
"#;
        write_gallery(dir.path(), manifest, &[("a.frag", BODY), ("b.frag", BODY)]);

        let gallery = Gallery::load(dir.path()).unwrap();
        assert_eq!(gallery.position("b"), Some(1));
        assert_eq!(gallery.position("missing"), None);
    }
}
