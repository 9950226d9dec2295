//! Project name normalization for index directories

use regex::Regex;
use std::sync::OnceLock;

/// Normalize a project name according to PEP 503.
///
/// Lower-cases the name and collapses every run of `-`, `_` and `.` into a
/// single `-`. Two names that normalize to the same string share one index
/// directory, so `Foo.Bar`, `foo_bar` and `FOO--bar` all publish into `foo-bar/`.
///
/// # Examples
///
/// ```
/// # use pyidx_core::normalize::normalize_name;
/// assert_eq!(normalize_name("Django-REST-framework"), "django-rest-framework");
/// assert_eq!(normalize_name("some_package"), "some-package");
/// ```
pub fn normalize_name(name: &str) -> String {
    static NAME_SEPARATORS: OnceLock<Regex> = OnceLock::new();
    let re = NAME_SEPARATORS.get_or_init(|| {
        Regex::new(r"[-_.]+")
            .unwrap_or_else(|e| panic!("Failed to compile name normalization regex: {}", e))
    });
    re.replace_all(&name.trim().to_lowercase(), "-").to_string()
}
