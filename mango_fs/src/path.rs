//! Path splitting helpers shared by the shell commands and the create
//! operations.

use crate::FsError;
use crate::structs::MAX_NAME;

/// Splits a path into `(parent, basename)`.
///
/// Trailing slashes are ignored. The parent is `""` for a bare relative
/// name, `"/"` when the basename sits directly under the root, and the
/// leading remainder otherwise:
///
/// - `"/a/b/c"` → `("/a/b", "c")`
/// - `"/c"` → `("/", "c")`
/// - `"c"` → `("", "c")`
pub fn split_path(path: &str) -> Result<(&str, &str), FsError> {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(FsError::BadPath);
    }

    let (parent, name) = match trimmed.rfind('/') {
        None => ("", trimmed),
        Some(0) => ("/", &trimmed[1..]),
        Some(pos) => (&trimmed[..pos], &trimmed[pos + 1..]),
    };

    if name.is_empty() {
        return Err(FsError::BadPath);
    }
    if name.len() >= MAX_NAME {
        return Err(FsError::NameTooLong);
    }

    Ok((parent, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_nested_absolute_paths() {
        assert_eq!(split_path("/a/b/c").unwrap(), ("/a/b", "c"));
        assert_eq!(split_path("/a/b/c///").unwrap(), ("/a/b", "c"));
    }

    #[test]
    fn splits_root_children_and_bare_names() {
        assert_eq!(split_path("/c").unwrap(), ("/", "c"));
        assert_eq!(split_path("c").unwrap(), ("", "c"));
        assert_eq!(split_path("a/c").unwrap(), ("a", "c"));
    }

    #[test]
    fn rejects_empty_and_overlong() {
        assert_eq!(split_path(""), Err(FsError::BadPath));
        assert_eq!(split_path("/"), Err(FsError::BadPath));
        assert_eq!(split_path("///"), Err(FsError::BadPath));

        let long = "x".repeat(MAX_NAME);
        assert_eq!(split_path(&long), Err(FsError::NameTooLong));
    }

    #[test]
    fn split_of_joined_basename_is_stable() {
        // split_path(join("/", basename)) == ("/", basename)
        for name in ["c", "notes.txt", "a-b_c"] {
            let mut joined = alloc::string::String::from("/");
            joined.push_str(name);
            assert_eq!(split_path(&joined).unwrap(), ("/", name));
        }
    }
}
