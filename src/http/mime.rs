/// Guesses a Content-Type from the file name's last extension.
pub fn infer_content_type(path: &str) -> &'static str {
    match path.rsplit_once('.').map(|(_, ext)| ext) {
        Some("html") => "text/html",
        Some("jpg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "text/plain",
    }
}
