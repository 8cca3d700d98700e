//! Inline HTML templates for every page the site serves.
//!
//! Plain string rendering, no template engine: each page is a `format!`
//! over a shared stylesheet and a handful of fragments.

use crate::bookmarks::BookmarkCollection;
use crate::photos::{PhotoCollection, PhotoCollectionSummary, PhotoImage};
use crate::storage::FolderListing;

fn base_style() -> &'static str {
    r#"
    * { margin: 0; padding: 0; box-sizing: border-box; }
    body {
        font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
        background: #f5f5f5; color: #333; padding: 24px;
        max-width: 860px; margin: 0 auto;
    }
    nav { margin-bottom: 24px; }
    nav a { color: #4a6cf7; text-decoration: none; margin-right: 14px; font-size: 15px; }
    nav a:hover { text-decoration: underline; }
    h1 { font-size: 26px; color: #1a1a2e; margin-bottom: 16px; }
    h2 { font-size: 19px; color: #1a1a2e; margin: 18px 0 8px; }
    ul.plain { list-style: none; }
    ul.plain li { padding: 4px 0; font-size: 15px; }
    a { color: #4a6cf7; }
    .card {
        background: #fff; border-radius: 12px; padding: 24px;
        box-shadow: 0 2px 12px rgba(0,0,0,0.06); margin-bottom: 16px;
    }
    .form-group { margin-bottom: 14px; }
    .form-group label { display: block; font-size: 14px; font-weight: 500; margin-bottom: 5px; color: #444; }
    .form-group input {
        width: 100%; padding: 10px 12px; border: 1.5px solid #ddd;
        border-radius: 8px; font-size: 15px; outline: none;
    }
    .form-group input:focus { border-color: #4a6cf7; }
    .btn {
        padding: 10px 18px; border: none; border-radius: 8px;
        font-size: 15px; font-weight: 600; cursor: pointer;
        background: #4a6cf7; color: #fff;
    }
    .btn:hover { background: #3b5de7; }
    .error { background: #fff0f0; color: #d32f2f; padding: 10px 14px; border-radius: 8px; font-size: 14px; margin-bottom: 14px; }
    .gallery { display: flex; flex-wrap: wrap; gap: 12px; }
    .gallery img { border-radius: 8px; }
    textarea.token {
        width: 100%; height: 90px; font-family: monospace; font-size: 13px;
        padding: 10px; border: 1.5px solid #ddd; border-radius: 8px;
    }
    pre.note {
        background: #fff; border-radius: 8px; padding: 16px;
        font-size: 14px; overflow-x: auto; white-space: pre-wrap;
    }
    "#
}

/// Escape text that came from outside the templates.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en"><head>
<meta charset="utf-8"><meta name="viewport" content="width=device-width,initial-scale=1">
<title>{title}</title>
<style>{style}</style>
</head><body>
<nav>
  <a href="/">Home</a>
  <a href="/bookmarks">Bookmarks</a>
  <a href="/photos">Photos</a>
  <a href="/work">Work</a>
  <a href="/notes/">Notes</a>
  <a href="/files/">Files</a>
</nav>
{body}
</body></html>"#,
        style = base_style(),
    )
}

pub fn render_index() -> String {
    page(
        "Redwood",
        r#"<h1>Welcome</h1>
<div class="card"><p>Bookmarks, photo galleries, notes and files — a small
personal corner of the web.</p></div>"#,
    )
}

pub fn render_work() -> String {
    page(
        "Work",
        r#"<h1>Work</h1>
<div class="card"><p>Things I have worked on, past and present.</p></div>"#,
    )
}

pub fn render_login_page(action_url: &str, error_message: Option<&str>) -> String {
    let error_html = error_message
        .map(|e| format!(r#"<div class="error">{}</div>"#, escape(e)))
        .unwrap_or_default();

    let body = format!(
        r#"<h1>Login</h1>
<div class="card">
  {error_html}
  <form method="POST" action="{action_url}">
    <div class="form-group">
      <label>Username</label>
      <input type="text" name="username" autocomplete="username">
    </div>
    <div class="form-group">
      <label>Password</label>
      <input type="password" name="password" autocomplete="current-password">
    </div>
    <button type="submit" class="btn">Login</button>
  </form>
</div>"#
    );
    page("Login", &body)
}

pub fn render_token_page(token: &str) -> String {
    let body = format!(
        r#"<h1>Token</h1>
<div class="card">
  <p>A short-lived token for API use. It cannot mint further tokens.</p>
  <textarea class="token" readonly>{token}</textarea>
</div>"#
    );
    page("Token", &body)
}

pub fn render_bookmarks_page(collections: &[BookmarkCollection]) -> String {
    let mut body = String::from("<h1>Bookmarks</h1>\n");
    for collection in collections {
        body.push_str(&format!(
            "<h2><a href=\"{}\">{}</a></h2>\n<ul class=\"plain\">\n",
            collection.url,
            escape(&collection.category)
        ));
        for bookmark in &collection.bookmarks {
            if bookmark.url.is_empty() {
                body.push_str(&format!("<li>{}</li>\n", escape(&bookmark.name)));
            } else {
                body.push_str(&format!(
                    "<li><a href=\"{}\">{}</a></li>\n",
                    escape(&bookmark.url),
                    escape(&bookmark.name)
                ));
            }
        }
        body.push_str("</ul>\n");
    }
    page("Bookmarks", &body)
}

pub fn render_bookmark_collection_page(collection: &BookmarkCollection) -> String {
    render_bookmarks_page(std::slice::from_ref(collection))
}

pub fn render_photos_page(collections: &[PhotoCollectionSummary]) -> String {
    let mut body = String::from("<h1>Photos</h1>\n<div class=\"gallery\">\n");
    for collection in collections {
        body.push_str(&format!(
            "<a href=\"{}\"><img src=\"{}\" alt=\"{}\" title=\"{}\"></a>\n",
            collection.url,
            escape(&collection.thumbnail),
            escape(&collection.name),
            escape(&collection.name)
        ));
    }
    body.push_str("</div>\n");
    page("Photos", &body)
}

pub fn render_photo_collection_page(collection: &PhotoCollection) -> String {
    let mut body = format!("<h1>{}</h1>\n<div class=\"gallery\">\n", escape(&collection.name));
    for image in &collection.images {
        body.push_str(&format!(
            "<a href=\"{}\"><img src=\"{}\" alt=\"{}\"></a>\n",
            image.url,
            escape(&image.thumbnail),
            escape(&image.name)
        ));
    }
    body.push_str("</div>\n");
    page(&collection.name, &body)
}

pub fn render_photo_page(image: &PhotoImage) -> String {
    let body = format!(
        "<h1>{}</h1>\n<div class=\"card\"><img src=\"{}\" alt=\"{}\" style=\"max-width:100%\"></div>\n",
        escape(&image.name),
        escape(&image.s3url),
        escape(&image.name)
    );
    page(&image.name, &body)
}

pub fn render_notes_listing(folder: &str, listing: &FolderListing) -> String {
    let heading = if folder.is_empty() { "Notes" } else { folder };
    let mut body = format!("<h1>{}</h1>\n<ul class=\"plain\">\n", escape(heading));
    for sub in &listing.folders {
        body.push_str(&format!(
            "<li>📁 <a href=\"/notes/{}\">{}</a></li>\n",
            escape(sub),
            escape(sub)
        ));
    }
    for file in &listing.files {
        body.push_str(&format!(
            "<li>📄 <a href=\"/notes/{}\">{}</a></li>\n",
            escape(file),
            escape(file)
        ));
    }
    body.push_str("</ul>\n");
    page("Notes", &body)
}

pub fn render_note_page(key: &str, text: &str) -> String {
    let body = format!(
        "<h1>{}</h1>\n<pre class=\"note\">{}</pre>\n",
        escape(key),
        escape(text)
    );
    page(key, &body)
}

pub fn render_files_page(listing: &FolderListing) -> String {
    let mut body = String::from("<h1>Files</h1>\n<ul class=\"plain\">\n");
    for file in &listing.files {
        body.push_str(&format!(
            r#"<li>📄 <a href="/files/download/{key}">{name}</a>
<form method="POST" action="/files/delete" style="display:inline">
<input type="hidden" name="key" value="{key}">
<button type="submit" class="btn" style="padding:2px 8px;font-size:12px">delete</button>
</form></li>
"#,
            key = escape(file),
            name = escape(file),
        ));
    }
    body.push_str(
        r#"</ul>
<div class="card">
  <form method="POST" action="/files/upload" enctype="multipart/form-data">
    <div class="form-group">
      <label>Upload a file</label>
      <input type="file" name="file">
    </div>
    <button type="submit" class="btn">Upload</button>
  </form>
</div>"#,
    );
    page("Files", &body)
}

pub fn render_scratch_page(value: &str) -> String {
    let body = format!(
        r#"<h1>Scratch</h1>
<div class="card">
  <p>Current value: <strong>{}</strong></p>
  <form method="POST" action="/scratch">
    <div class="form-group">
      <input type="text" name="value">
    </div>
    <button type="submit" class="btn">Save</button>
  </form>
</div>"#,
        escape(value)
    );
    page("Scratch", &body)
}

pub fn render_error_page(title: &str, message: &str) -> String {
    let body = format!(
        "<h1>{}</h1>\n<div class=\"error\">{}</div>\n",
        escape(title),
        escape(message)
    );
    page(title, &body)
}
