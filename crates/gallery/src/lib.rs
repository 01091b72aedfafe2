//! Gallery content for shaderdeck: the embedding collaborator's data side.
//!
//! A gallery is a directory holding `manifest.toml` plus one file per shader
//! body. The manifest carries display metadata (title, description, tags, an
//! optional Shadertoy link); each body is a `mainImage(out vec4, in vec2)`
//! function written against the fixed `iTime`/`iResolution` uniform names.
//! [`wrap_fragment`] turns a body into a complete fragment stage. The
//! renderer itself concatenates nothing, so supplying compilable source is
//! this crate's responsibility.

mod catalog;
mod manifest;
mod wrap;

pub use catalog::{Gallery, ShaderEntry};
pub use manifest::{EntryManifest, GalleryError, GalleryManifest};
pub use wrap::wrap_fragment;
