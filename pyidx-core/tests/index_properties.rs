//! Round-trip, idempotence and ordering behaviour of the index model,
//! exercised the way a publish run drives it: parse stored HTML, merge one
//! package, render.

use proptest::prelude::*;
use pyidx_core::{Index, Package};

/// One publish cycle against previously stored HTML (None = nothing stored).
fn publish(stored: Option<&str>, package: &Package) -> String {
    let mut index = stored.map(Index::parse).unwrap_or_else(Index::empty);
    index
        .add_package(package)
        .expect("package should belong to this index");
    index.to_html()
}

fn anchor_count(html: &str) -> usize {
    html.matches("<a ").count()
}

#[test]
fn test_first_publish_to_empty_bucket() {
    let html = publish(None, &Package::new("foo", ["foo-1.0.tar.gz"]));

    assert_eq!(anchor_count(&html), 1);
    assert!(html.contains(r#"<a href="foo-1.0.tar.gz">foo-1.0.tar.gz</a>"#));

    let link = Index::parse(&html).links().next().cloned().unwrap();
    assert_eq!(link.filename, "foo-1.0.tar.gz");
    assert!(link.label.contains("1.0"));
}

#[test]
fn test_second_version_is_appended() {
    let first = publish(None, &Package::new("foo", ["foo-1.0.tar.gz"]));
    assert_eq!(Index::parse(&first).len(), 1);

    let second = publish(Some(&first), &Package::new("foo", ["foo-2.0.tar.gz"]));
    assert_eq!(anchor_count(&second), 2);

    let v1 = second.find("foo-1.0.tar.gz").unwrap();
    let v2 = second.find("foo-2.0.tar.gz").unwrap();
    assert!(v1 < v2);
}

#[test]
fn test_republish_is_byte_identical() {
    let package = Package::new("foo", ["foo-1.0.tar.gz"]);
    let first = publish(None, &package);
    let second = publish(Some(&first), &package);
    assert_eq!(first, second);
    assert_eq!(anchor_count(&second), 1);
}

#[test]
fn test_corrupt_stored_index_heals() {
    let html = publish(
        Some("\u{0}\u{1}<<garbage>> <a href="),
        &Package::new("foo", ["foo-1.0.tar.gz"]),
    );
    assert_eq!(Index::parse(&html).len(), 1);
}

#[test]
fn test_foreign_markup_is_preserved_on_merge() {
    // An index written by another tool, with absolute links and extra markup
    let stored = r#"<html><body><ul>
        <li><a class="dl" href="https://cdn.example.com/foo/foo-0.9.tar.gz">foo 0.9</a></li>
        </ul></body></html>"#;
    let html = publish(Some(stored), &Package::new("foo", ["foo-1.0.tar.gz"]));

    let index = Index::parse(&html);
    let labels: Vec<&str> = index.links().map(|l| l.label.as_str()).collect();
    assert_eq!(labels, vec!["foo 0.9", "foo-1.0.tar.gz"]);
    assert!(html.contains(r#"href="foo-0.9.tar.gz""#));
}

fn filename_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,6}-[0-9]\\.[0-9]{1,2}\\.tar\\.gz",
        "[a-z]{1,6}-[0-9]\\.[0-9]-py3-none-any\\.whl",
        "[a-zA-Z0-9 _.+%#?&<>'\"-]{1,16}",
    ]
}

/// Filenames from a small pool of shared versions
fn versioned_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "foo-[1-3]\\.0\\.tar\\.gz",
        "foo-[1-3]\\.0-py3-none-any\\.whl",
        "foo-[1-3]\\.0-cp3[0-9]-none-any\\.whl",
    ]
}

fn packages_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec(filename_strategy(), 1..4), 1..5)
}

proptest! {
    /// Rendering then parsing reproduces the index
    #[test]
    fn prop_round_trip(batches in packages_strategy()) {
        let mut index = Index::empty();
        for files in &batches {
            index.add_package(&Package::new("proj", files.iter().map(String::as_str))).unwrap();
        }
        let reparsed = Index::parse(&index.to_html());
        prop_assert_eq!(&reparsed, &index);

        let original: Vec<_> = index.links().collect();
        let recovered: Vec<_> = reparsed.links().collect();
        prop_assert_eq!(original, recovered);
    }

    /// Merging a package a second time changes nothing
    #[test]
    fn prop_merge_idempotent(batches in packages_strategy()) {
        let mut once = Index::empty();
        let mut twice = Index::empty();
        for files in &batches {
            let package = Package::new("proj", files.iter().map(String::as_str));
            once.add_package(&package).unwrap();
            twice.add_package(&package).unwrap();
            twice.add_package(&package).unwrap();
        }
        prop_assert_eq!(once.to_html(), twice.to_html());
    }

    /// Files from an earlier package render before files from a later one,
    /// even when the later package adds files to an older release
    #[test]
    fn prop_order_preserved(
        first in prop::collection::vec(versioned_strategy(), 1..4),
        second in prop::collection::vec(versioned_strategy(), 1..4),
    ) {
        let mut index = Index::empty();
        index.add_package(&Package::new("proj", first.iter().map(String::as_str))).unwrap();
        index.add_package(&Package::new("proj", second.iter().map(String::as_str))).unwrap();

        let mut expected: Vec<&str> = Vec::new();
        for filename in first.iter().chain(&second) {
            if !expected.contains(&filename.as_str()) {
                expected.push(filename);
            }
        }

        let reparsed = Index::parse(&index.to_html());
        let filenames: Vec<&str> = reparsed.links().map(|l| l.filename.as_str()).collect();
        prop_assert_eq!(filenames, expected);
    }
}

#[test]
fn test_wheel_for_older_release_renders_last() {
    let mut index = Index::empty();
    index
        .add_package(&Package::new("foo", ["foo-1.0.tar.gz", "foo-2.0.tar.gz"]))
        .unwrap();
    index
        .add_package(&Package::new("foo", ["foo-1.0-py3-none-any.whl"]))
        .unwrap();

    let reparsed = Index::parse(&index.to_html());
    let filenames: Vec<&str> = reparsed.links().map(|l| l.filename.as_str()).collect();
    assert_eq!(
        filenames,
        vec!["foo-1.0.tar.gz", "foo-2.0.tar.gz", "foo-1.0-py3-none-any.whl"]
    );

    let releases = reparsed.releases();
    assert_eq!(releases.keys().collect::<Vec<_>>(), vec!["1.0", "2.0"]);
    assert_eq!(releases["1.0"].len(), 2);
}
