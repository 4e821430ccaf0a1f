//! Table path handling.

/// Joins path elements with `/` and normalizes the result.
///
/// Empty elements are ignored, repeated slashes collapse, `.` segments are
/// dropped and `..` removes the preceding segment. Joining only empty
/// elements yields an empty string.
///
/// ```
/// use ydb_sql_core::path::join_path;
///
/// assert_eq!(join_path(&["/local/", "app", "users"]), "/local/app/users");
/// assert_eq!(join_path(&["", "users"]), "users");
/// ```
#[must_use]
pub fn join_path(elements: &[&str]) -> String {
    let non_empty: Vec<&str> = elements.iter().copied().filter(|e| !e.is_empty()).collect();
    if non_empty.is_empty() {
        return String::new();
    }
    clean(&non_empty.join("/"))
}

/// Returns the path of `table` under `prefix`.
#[must_use]
pub fn table_path(prefix: &str, table: &str) -> String {
    join_path(&[prefix, table])
}

fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_path() {
        assert_eq!(table_path("/x/y", "users"), "/x/y/users");
        assert_eq!(table_path("/x/y/", "users"), "/x/y/users");
        assert_eq!(table_path("", "users"), "users");
        assert_eq!(table_path("/local", ""), "/local");
    }

    #[test]
    fn test_clean_rules() {
        assert_eq!(join_path(&["/a//b", "./c"]), "/a/b/c");
        assert_eq!(join_path(&["a/b", "../c"]), "a/c");
        assert_eq!(join_path(&["/", ".."]), "/");
        assert_eq!(join_path(&["..", "a"]), "../a");
        assert_eq!(join_path(&["a", ".."]), ".");
        assert_eq!(join_path(&["", ""]), "");
    }
}
