//! Slash-separated parameter paths.
//!
//! A parameter path names a node relative to a [`ParameterSet`](crate::ParameterSet),
//! e.g. `run/regime/endTime` or `resolutions/1/nax`. Array elements are
//! addressed by index, labeled array entries by key and selectable subsets
//! through their active case.

/// Joins a container path and a child name.
///
/// No separator is inserted when either side is empty, so joining onto the
/// root yields the bare child name.
///
/// # Examples
///
/// ```
/// use pdl_core::path::join_path;
///
/// assert_eq!(join_path("", "mesh"), "mesh");
/// assert_eq!(join_path("mesh", "nx"), "mesh/nx");
/// assert_eq!(join_path("mesh", ""), "mesh");
/// ```
pub fn join_path(container: &str, name: &str) -> String {
    let separator = if !container.is_empty() && !name.is_empty() {
        "/"
    } else {
        ""
    };
    format!("{container}{separator}{name}")
}

/// Splits a path into its non-empty components.
///
/// Leading, trailing and doubled slashes are ignored.
pub fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", ""), "");
        assert_eq!(join_path("a", "b"), "a/b");
        assert_eq!(join_path("a/b", "c"), "a/b/c");
    }

    #[test]
    fn test_components() {
        let parts: Vec<_> = components("/run//regime/endTime/").collect();
        assert_eq!(parts, vec!["run", "regime", "endTime"]);
    }
}
