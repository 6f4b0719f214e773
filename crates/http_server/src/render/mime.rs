use std::path::Path;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Content type from the text after the last `.` of the file name. Matching
/// is case sensitive, so `photo.JPG` is served as a plain byte stream.
pub fn content_type(path: &Path) -> &'static str {
    let Some(extension) = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext)
    else {
        return OCTET_STREAM;
    };

    match extension {
        "html" | "htm" => "text/html",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "css" => "text/css",
        "js" => "application/javascript",
        "txt" => "text/plain",
        "pdf" => "application/pdf",
        _ => OCTET_STREAM,
    }
}
