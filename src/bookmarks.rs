//! Bookmark collections loaded from a JSON file.
//!
//! The file is a list of collections, each with a display category, a URL
//! slug, and the bookmarks themselves. Loading assigns every collection
//! its list position (`ordinal`) and page URL.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkCollection {
    pub category: String,
    pub slug: String,
    pub bookmarks: Vec<Bookmark>,
    #[serde(default)]
    pub ordinal: usize,
    #[serde(default)]
    pub url: String,
}

/// Load and shape all bookmark collections.
pub fn load_bookmarks(path: &Path) -> Result<Vec<BookmarkCollection>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading bookmarks file {}", path.display()))?;
    let mut collections: Vec<BookmarkCollection> = serde_json::from_str(&contents)
        .with_context(|| format!("parsing bookmarks file {}", path.display()))?;

    for (ordinal, collection) in collections.iter_mut().enumerate() {
        collection.ordinal = ordinal;
        collection.url = format!("/bookmarks/{}", collection.slug);
    }

    Ok(collections)
}

pub fn find_collection<'a>(
    collections: &'a [BookmarkCollection],
    slug: &str,
) -> Option<&'a BookmarkCollection> {
    collections.iter().find(|c| c.slug == slug)
}

/// Lint the bookmarks file without loading it into the typed model, so
/// every problem is reported rather than just the first parse error.
pub fn validate_file(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading bookmarks file {}", path.display()))?;
    let data: serde_json::Value =
        serde_json::from_str(&contents).context("bookmarks file is not valid JSON")?;

    let mut errors = Vec::new();

    let Some(collections) = data.as_array() else {
        errors.push("Root element is not a list.".to_owned());
        return Ok(errors);
    };

    for (index, collection) in collections.iter().enumerate() {
        validate_collection(index, collection, &mut errors);
    }

    Ok(errors)
}

fn validate_collection(index: usize, collection: &serde_json::Value, errors: &mut Vec<String>) {
    for key in ["category", "slug", "bookmarks"] {
        match collection.get(key) {
            None => errors.push(format!("Collection {index} does not have key \"{key}\".")),
            Some(value) if !is_truthy(value) => {
                errors.push(format!("Collection {index} \"{key}\" can not be empty."));
            }
            Some(_) => {}
        }
    }
}

fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(a) => !a.is_empty(),
        serde_json::Value::Object(o) => !o.is_empty(),
        serde_json::Value::Number(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const SAMPLE: &str = r#"[
        {"category": "Python", "slug": "python",
         "bookmarks": [{"name": "Django", "url": "http://www.djangoproject.com"},
                       {"name": "Flask", "url": ""}]},
        {"category": "Clojure", "slug": "clojure",
         "bookmarks": [{"name": "Clojure", "url": ""}]}
    ]"#;

    #[test]
    fn loading_assigns_ordinals_and_urls() {
        let file = write_temp(SAMPLE);
        let collections = load_bookmarks(file.path()).unwrap();

        assert_eq!(collections.len(), 2);
        assert_eq!(collections[0].ordinal, 0);
        assert_eq!(collections[0].url, "/bookmarks/python");
        assert_eq!(collections[1].ordinal, 1);
        assert_eq!(collections[1].url, "/bookmarks/clojure");
        assert_eq!(collections[0].bookmarks[0].name, "Django");
    }

    #[test]
    fn find_collection_by_slug() {
        let file = write_temp(SAMPLE);
        let collections = load_bookmarks(file.path()).unwrap();
        assert_eq!(
            find_collection(&collections, "clojure").map(|c| c.category.as_str()),
            Some("Clojure")
        );
        assert!(find_collection(&collections, "rust").is_none());
    }

    #[test]
    fn valid_file_produces_no_errors() {
        let file = write_temp(SAMPLE);
        assert!(validate_file(file.path()).unwrap().is_empty());
    }

    #[test]
    fn non_list_root_is_reported() {
        let file = write_temp(r#"{"category": "Python"}"#);
        let errors = validate_file(file.path()).unwrap();
        assert_eq!(errors, vec!["Root element is not a list.".to_owned()]);
    }

    #[test]
    fn missing_and_empty_keys_are_each_reported() {
        let file = write_temp(r#"[{"category": "Python", "slug": "", "bookmarks": []}, {}]"#);
        let errors = validate_file(file.path()).unwrap();

        assert!(errors.contains(&"Collection 0 \"slug\" can not be empty.".to_owned()));
        assert!(errors.contains(&"Collection 0 \"bookmarks\" can not be empty.".to_owned()));
        assert!(errors.contains(&"Collection 1 does not have key \"category\".".to_owned()));
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let file = write_temp("[not json");
        assert!(validate_file(file.path()).is_err());
    }
}
