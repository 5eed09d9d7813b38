/// Normalizes a request target into a path rooted at the document root.
///
/// Drops the query string, empty and `.` segments, and resolves `..`.
/// Returns an empty string when the path is empty or climbs above the root.
pub fn canonicalize_path(uri: &str) -> String {
    let path = uri.split_once('?').map_or(uri, |(path, _)| path);
    if path.is_empty() {
        return String::new();
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return String::new();
                }
            }
            other => segments.push(other),
        }
    }

    format!("/{}", segments.join("/"))
}

/// Path of the `.htaccess` file governing a canonical path: the last segment
/// replaced by `.htaccess`. Empty when there is no path (escaping requests).
pub fn htaccess_path(canonical: &str) -> String {
    match canonical.rsplit_once('/') {
        Some((dir, _)) => format!("{dir}/.htaccess"),
        None => String::new(),
    }
}
