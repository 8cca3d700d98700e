//! Photo collections: a JSON index of galleries whose originals and
//! thumbnails live in an object-storage bucket.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One entry in the collection index file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoCollectionSummary {
    pub name: String,
    pub slug: String,
    /// Filename of the per-collection manifest, relative to `photos/`.
    pub collection: String,
    /// Image used as the collection's cover.
    pub image: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub thumbnail: String,
}

/// A fully shaped image inside a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoImage {
    pub name: String,
    pub s3url: String,
    pub thumbnail: String,
    pub url: String,
}

/// A collection manifest with its images expanded into full URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoCollection {
    pub name: String,
    pub slug: String,
    pub images: Vec<PhotoImage>,
}

#[derive(Debug, Deserialize)]
struct RawCollection {
    name: String,
    slug: String,
    images: Vec<String>,
}

pub fn thumbnail_url(base_url: &str, collection_slug: &str, image_name: &str) -> String {
    format!("{base_url}/{collection_slug}/thumbs/thumb_{image_name}")
}

pub fn photo_url(base_url: &str, collection_slug: &str, image_name: &str) -> String {
    format!("{base_url}/{collection_slug}/{image_name}")
}

/// Load the collection index and shape each entry with its page URL and
/// cover thumbnail.
pub fn load_collection_list(path: &Path, base_url: &str) -> Result<Vec<PhotoCollectionSummary>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading photo collection index {}", path.display()))?;
    let mut collections: Vec<PhotoCollectionSummary> = serde_json::from_str(&contents)
        .with_context(|| format!("parsing photo collection index {}", path.display()))?;

    for collection in &mut collections {
        collection.url = format!("/photos/{}", collection.slug);
        collection.thumbnail = thumbnail_url(base_url, &collection.slug, &collection.image);
    }

    Ok(collections)
}

/// Load one collection by slug. Returns `Ok(None)` when the slug is not in
/// the index.
pub fn load_collection(
    index_path: &Path,
    base_url: &str,
    collection_slug: &str,
) -> Result<Option<PhotoCollection>> {
    let collections = load_collection_list(index_path, base_url)?;
    let Some(summary) = collections.iter().find(|c| c.slug == collection_slug) else {
        return Ok(None);
    };

    // Manifests sit next to the index file, under the same directory.
    let manifest_path = index_path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(&summary.collection);
    let contents = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("reading photo collection {}", manifest_path.display()))?;
    let raw: RawCollection = serde_json::from_str(&contents)
        .with_context(|| format!("parsing photo collection {}", manifest_path.display()))?;

    let images = raw
        .images
        .iter()
        .map(|image| PhotoImage {
            name: image.clone(),
            s3url: photo_url(base_url, collection_slug, image),
            thumbnail: thumbnail_url(base_url, collection_slug, image),
            url: format!("/photos/{collection_slug}/{image}"),
        })
        .collect();

    Ok(Some(PhotoCollection {
        name: raw.name,
        slug: raw.slug,
        images,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const BASE: &str = "https://rainforestphotos.s3.amazonaws.com";

    fn photo_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();

        let index = r#"[{"name": "Costa Rica", "slug": "costa-rica",
                         "collection": "costa_rica.json", "image": "beach.jpg"}]"#;
        let manifest = r#"{"name": "Costa Rica", "slug": "costa-rica",
                           "images": ["beach.jpg", "sloth.jpg"]}"#;

        let mut f = std::fs::File::create(dir.path().join("photo_collections.json")).unwrap();
        f.write_all(index.as_bytes()).unwrap();
        let mut f = std::fs::File::create(dir.path().join("costa_rica.json")).unwrap();
        f.write_all(manifest.as_bytes()).unwrap();

        dir
    }

    #[test]
    fn url_helpers_follow_the_bucket_layout() {
        assert_eq!(
            thumbnail_url(BASE, "costa-rica", "beach.jpg"),
            "https://rainforestphotos.s3.amazonaws.com/costa-rica/thumbs/thumb_beach.jpg"
        );
        assert_eq!(
            photo_url(BASE, "costa-rica", "beach.jpg"),
            "https://rainforestphotos.s3.amazonaws.com/costa-rica/beach.jpg"
        );
    }

    #[test]
    fn index_entries_are_shaped_with_urls() {
        let dir = photo_dir();
        let list =
            load_collection_list(&dir.path().join("photo_collections.json"), BASE).unwrap();

        assert_eq!(list.len(), 1);
        assert_eq!(list[0].url, "/photos/costa-rica");
        assert_eq!(
            list[0].thumbnail,
            thumbnail_url(BASE, "costa-rica", "beach.jpg")
        );
    }

    #[test]
    fn collection_images_are_expanded() {
        let dir = photo_dir();
        let collection =
            load_collection(&dir.path().join("photo_collections.json"), BASE, "costa-rica")
                .unwrap()
                .expect("collection should exist");

        assert_eq!(collection.images.len(), 2);
        let sloth = &collection.images[1];
        assert_eq!(sloth.name, "sloth.jpg");
        assert_eq!(sloth.s3url, photo_url(BASE, "costa-rica", "sloth.jpg"));
        assert_eq!(sloth.url, "/photos/costa-rica/sloth.jpg");
    }

    #[test]
    fn unknown_slug_is_none() {
        let dir = photo_dir();
        let collection =
            load_collection(&dir.path().join("photo_collections.json"), BASE, "nope").unwrap();
        assert!(collection.is_none());
    }
}
