//! HTML index pages for directories without an `index.html`.

use std::{fmt::Write, io, path::Path, time::SystemTime};

use chrono::{DateTime, Local};
use courier_wire::percent::encode_segment;
use log::debug;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Dir => "dir",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

/// Reads `dir` sorted by name. Entries that resolve outside the canonical
/// `root`, or whose metadata cannot be read, are skipped. Failing to open the
/// directory itself is an error.
pub async fn read_entries(dir: &Path, root: &Path) -> io::Result<Vec<DirectoryEntry>> {
    let mut read_dir = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == "." || name == ".." {
            continue;
        }
        let target = match tokio::fs::canonicalize(entry.path()).await {
            Ok(target) if target.starts_with(root) => target,
            Ok(target) => {
                debug!("hiding {name}, it resolves to {}", target.display());
                continue;
            }
            Err(err) => {
                debug!("skipping {name} in listing: {err}");
                continue;
            }
        };
        let metadata = match tokio::fs::metadata(&target).await {
            Ok(metadata) => metadata,
            Err(err) => {
                debug!("skipping {name} in listing: {err}");
                continue;
            }
        };
        entries.push(DirectoryEntry {
            name,
            kind: if metadata.is_dir() {
                EntryKind::Dir
            } else {
                EntryKind::File
            },
            size: metadata.len(),
            modified: metadata.modified().ok(),
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Absolute link to `name` inside the directory shown at `display_path`
pub fn entry_href(display_path: &str, name: &str, kind: EntryKind) -> String {
    let mut href = String::from("/");
    for segment in display_path.split('/').filter(|s| !s.is_empty()) {
        href.push_str(&encode_segment(segment));
        href.push('/');
    }
    href.push_str(&encode_segment(name));
    if kind == EntryKind::Dir {
        href.push('/');
    }
    href
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn format_modified(modified: Option<SystemTime>) -> String {
    modified.map_or_else(
        || "-".to_string(),
        |t| DateTime::<Local>::from(t).format(TIMESTAMP_FORMAT).to_string(),
    )
}

pub fn listing_html(display_path: &str, entries: &[DirectoryEntry]) -> String {
    let title = escape_html(display_path);
    let mut html = format!(
        "<html><head><title>Index of {title}</title></head>\n\
         <body><h1>Index of {title}</h1>\n\
         <table border=\"1\" style=\"border-collapse: collapse;\">\n\
         <tr><th>Name</th><th>Type</th><th>Size (bytes)</th><th>Last Modified</th></tr>\n"
    );
    for entry in entries {
        let size = match entry.kind {
            EntryKind::Dir => "-".to_string(),
            EntryKind::File => entry.size.to_string(),
        };
        // Writing into a String cannot fail
        let _ = writeln!(
            html,
            "<tr><td><a href=\"{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&entry_href(display_path, &entry.name, entry.kind)),
            escape_html(&entry.name),
            entry.kind.as_str(),
            size,
            format_modified(entry.modified),
        );
    }
    html.push_str("</table></body></html>\n");
    html
}

#[cfg(test)]
mod tests {
    use courier_test_suite::site;

    use super::*;

    #[test]
    fn hrefs_at_root_and_below() {
        assert_eq!(entry_href("/", "hello.txt", EntryKind::File), "/hello.txt");
        assert_eq!(entry_href("/", "docs", EntryKind::Dir), "/docs/");
        assert_eq!(
            entry_href("/docs", "a b.txt", EntryKind::File),
            "/docs/a%20b.txt"
        );
        assert_eq!(
            entry_href("/docs/notes", "todo.txt", EntryKind::File),
            "/docs/notes/todo.txt"
        );
        assert_eq!(
            entry_href("/a b/c#d", "e?f", EntryKind::Dir),
            "/a%20b/c%23d/e%3Ff/"
        );
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<a href=\"x\">&'"),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
    }

    #[tokio::test]
    async fn entries_are_sorted_with_kinds() {
        let site = site().unwrap();
        let root = site.path().canonicalize().unwrap();
        let entries = read_entries(&root, &root).await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["docs", "hello.txt", "photo.JPG", "site"]);

        let hello = &entries[1];
        assert_eq!(hello.kind, EntryKind::File);
        assert_eq!(hello.size, 10);
        assert!(hello.modified.is_some());
        assert_eq!(entries[0].kind, EntryKind::Dir);
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let site = site().unwrap();
        let missing = site.path().join("nope");
        assert!(read_entries(&missing, site.path()).await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn links_leaving_the_root_are_hidden() {
        let site = site().unwrap();
        let root = site.path().canonicalize().unwrap();
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), b"secret").unwrap();
        std::os::unix::fs::symlink(outside.path(), root.join("escape")).unwrap();
        std::os::unix::fs::symlink(outside.path().join("secret.txt"), root.join("leak.txt"))
            .unwrap();
        std::os::unix::fs::symlink(root.join("hello.txt"), root.join("alias.txt")).unwrap();

        let entries = read_entries(&root, &root).await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["alias.txt", "docs", "hello.txt", "photo.JPG", "site"]);
        assert_eq!(entries[0].size, 10);
    }

    #[test]
    fn html_rows() {
        let entries = [
            DirectoryEntry {
                name: "notes".into(),
                kind: EntryKind::Dir,
                size: 4096,
                modified: None,
            },
            DirectoryEntry {
                name: "a<b>.txt".into(),
                kind: EntryKind::File,
                size: 12,
                modified: Some(SystemTime::UNIX_EPOCH),
            },
        ];
        let html = listing_html("/docs", &entries);
        assert!(html.contains("<h1>Index of /docs</h1>"));
        assert!(html.contains(
            "<tr><td><a href=\"/docs/notes/\">notes</a></td><td>dir</td><td>-</td><td>-</td></tr>"
        ));
        assert!(html.contains(
            "<a href=\"/docs/a%3Cb%3E.txt\">a&lt;b&gt;.txt</a></td><td>file</td><td>12</td>"
        ));
        assert!(!html.contains("href=\"..\""));
        assert!(!html.contains("//"));
    }

    #[test]
    fn timestamp_shape() {
        let text = format_modified(Some(SystemTime::UNIX_EPOCH));
        assert_eq!(text.len(), "1970-01-01 00:00:00".len());
        assert_eq!(&text[4..5], "-");
        assert_eq!(&text[10..11], " ");
    }
}
