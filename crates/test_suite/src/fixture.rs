use std::{fs, io, path::Path};

use tempfile::TempDir;

/// Contents of `hello.txt`, exactly ten bytes
pub const HELLO_TXT: &[u8] = b"hello wire";
pub const INDEX_HTML: &[u8] = b"<html><body>welcome</body></html>";

/// A document root laid out as:
///
/// ```text
/// hello.txt            HELLO_TXT
/// photo.JPG
/// site/index.html      INDEX_HTML
/// site/style.css
/// docs/a b.txt
/// docs/notes/todo.txt
/// docs/report.pdf
/// ```
pub fn site() -> io::Result<TempDir> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    write(root, "hello.txt", HELLO_TXT)?;
    write(root, "photo.JPG", b"\xff\xd8\xff")?;
    write(root, "site/index.html", INDEX_HTML)?;
    write(root, "site/style.css", b"body { margin: 0 }")?;
    write(root, "docs/a b.txt", b"spaced")?;
    write(root, "docs/notes/todo.txt", b"- write tests\n")?;
    write(root, "docs/report.pdf", b"%PDF-1.4")?;
    Ok(dir)
}

fn write(root: &Path, rel: &str, contents: &[u8]) -> io::Result<()> {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}
