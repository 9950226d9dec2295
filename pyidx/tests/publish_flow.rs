//! End-to-end publishes against a local bucket directory

use pyidx::{
    expand_inputs, group_distributions, PublishError, PublishOptions, Publisher, Storage,
    StorageOptions,
};
use pyidx_core::{sha256_hex, Index, Package};
use pyidx_store::{local::DIRECTORY_OBJECT, LocalStore, ObjectStore, PutOptions};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Fixture {
    _temp_dir: TempDir,
    dist: PathBuf,
    bucket: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("should create temp dir");
        let dist = temp_dir.path().join("dist");
        let bucket = temp_dir.path().join("bucket");
        fs::create_dir_all(&dist).unwrap();
        Self {
            _temp_dir: temp_dir,
            dist,
            bucket,
        }
    }

    fn write_dist(&self, name: &str, body: &str) -> PathBuf {
        let path = self.dist.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    fn publisher(&self, prefix: Option<&str>, static_website: bool) -> Publisher<LocalStore> {
        self.publisher_with(prefix, static_website, PublishOptions::default())
    }

    fn publisher_with(
        &self,
        prefix: Option<&str>,
        static_website: bool,
        options: PublishOptions,
    ) -> Publisher<LocalStore> {
        let storage = Storage::new(
            LocalStore::new(&self.bucket),
            StorageOptions {
                prefix: prefix.map(str::to_string),
                acl: "public-read".to_string(),
                static_website,
            },
        );
        Publisher::new(storage, options)
    }
}

fn stored_index(path: &Path) -> Index {
    Index::parse(&fs::read_to_string(path).expect("index should be stored"))
}

#[test]
fn test_publish_directory_of_distributions() {
    let fixture = Fixture::new();
    fixture.write_dist("foo-1.0.tar.gz", "foo sdist");
    fixture.write_dist("foo-1.0-py3-none-any.whl", "foo wheel");
    fixture.write_dist("bar_baz-0.1.tar.gz", "bar sdist");

    let paths = expand_inputs(&[&fixture.dist]).unwrap();
    let packages = group_distributions(&paths).unwrap();
    let publisher = fixture.publisher(Some("simple"), false);
    let reports = publisher.publish_all(&packages).unwrap();

    let directories: Vec<&str> = reports.iter().map(|r| r.directory.as_str()).collect();
    assert_eq!(directories, vec!["bar-baz", "foo"]);

    let foo = stored_index(&fixture.bucket.join("simple/foo").join(DIRECTORY_OBJECT));
    assert_eq!(foo.len(), 2);
    assert_eq!(foo.releases().len(), 1);
    assert!(fixture.bucket.join("simple/foo/foo-1.0.tar.gz").is_file());
    assert!(fixture.bucket.join("simple/bar-baz/bar_baz-0.1.tar.gz").is_file());

    let root = stored_index(&fixture.bucket.join("simple").join(DIRECTORY_OBJECT));
    let listed: Vec<&str> = root.links().map(|link| link.filename.as_str()).collect();
    assert_eq!(listed, vec!["bar-baz/", "foo/"]);
}

#[test]
fn test_new_version_appends_to_existing_index() {
    let fixture = Fixture::new();
    let publisher = fixture.publisher(None, true);

    let first = fixture.write_dist("foo-1.0.tar.gz", "one");
    publisher.publish(&Package::new("foo", [first])).unwrap();
    let second = fixture.write_dist("foo-2.0.tar.gz", "two");
    let report = publisher.publish(&Package::new("foo", [second])).unwrap();

    assert_eq!(report.index_key, "foo/index.html");
    assert_eq!(report.links, 2);

    let index = stored_index(&fixture.bucket.join("foo/index.html"));
    let releases: Vec<String> = index.releases().into_keys().collect();
    assert_eq!(releases, vec!["1.0", "2.0"]);

    let html = fs::read_to_string(fixture.bucket.join("foo/index.html")).unwrap();
    assert!(html.contains(&format!(
        r#"<a href="foo-2.0.tar.gz#sha256={}">foo-2.0.tar.gz</a>"#,
        sha256_hex(b"two")
    )));
    assert!(fixture.bucket.join("index.html").is_file());
}

#[test]
fn test_republish_is_idempotent() {
    let fixture = Fixture::new();
    let sdist = fixture.write_dist("foo-1.0.tar.gz", "sdist");
    let package = Package::new("foo", [sdist]);
    let publisher = fixture.publisher(Some("simple"), false);

    publisher.publish(&package).unwrap();
    let index_path = fixture.bucket.join("simple/foo").join(DIRECTORY_OBJECT);
    let first = fs::read(&index_path).unwrap();

    let report = publisher.publish(&package).unwrap();
    assert!(report.uploaded.is_empty());
    assert!(!report.index_changed);
    assert_eq!(fs::read(&index_path).unwrap(), first);
}

#[test]
fn test_corrupt_index_is_replaced() {
    let fixture = Fixture::new();
    let store = LocalStore::new(&fixture.bucket);
    store
        .store(
            "foo/",
            b"\x00\x01 definitely not an index",
            &PutOptions::new("text/html", "private"),
        )
        .unwrap();

    let sdist = fixture.write_dist("foo-1.0.tar.gz", "sdist");
    let publisher = fixture.publisher(None, false);
    let report = publisher.publish(&Package::new("foo", [sdist])).unwrap();

    assert_eq!(report.links, 1);
    assert!(!report.root_index_updated);
    let index = stored_index(&fixture.bucket.join("foo").join(DIRECTORY_OBJECT));
    assert!(index.contains("foo-1.0.tar.gz"));
}

#[test]
fn test_index_metadata_headers() {
    let fixture = Fixture::new();
    let sdist = fixture.write_dist("foo-1.0.tar.gz", "sdist");
    let publisher = fixture.publisher(Some("simple"), false);
    publisher.publish(&Package::new("foo", [sdist])).unwrap();

    let store = LocalStore::new(&fixture.bucket);
    let index = store.metadata("simple/foo/").unwrap();
    assert_eq!(index.options.content_type, "text/html");
    assert_eq!(
        index.options.cache_control.as_deref(),
        Some("public, must-revalidate, proxy-revalidate, max-age=0")
    );
    assert_eq!(index.options.acl, "public-read");

    let artifact = store.metadata("simple/foo/foo-1.0.tar.gz").unwrap();
    assert_eq!(artifact.options.content_type, "application/x-gzip");
    assert_eq!(artifact.sha256, sha256_hex(b"sdist"));
}

#[test]
fn test_skipping_root_index() {
    let fixture = Fixture::new();
    let sdist = fixture.write_dist("foo-1.0.tar.gz", "sdist");
    let publisher = fixture.publisher_with(
        Some("simple"),
        false,
        PublishOptions {
            force: false,
            root_index: false,
        },
    );

    let report = publisher.publish(&Package::new("foo", [sdist])).unwrap();
    assert!(!report.root_index_updated);
    assert!(!fixture.bucket.join("simple").join(DIRECTORY_OBJECT).exists());
}

#[test]
fn test_missing_file_leaves_bucket_untouched() {
    let fixture = Fixture::new();
    let publisher = fixture.publisher(None, false);
    let missing = fixture.dist.join("foo-1.0.tar.gz");

    let err = publisher
        .publish(&Package::new("foo", [missing]))
        .unwrap_err();
    assert!(matches!(err, PublishError::ReadArtifact { .. }));
    assert!(!fixture.bucket.exists());
}

#[test]
fn test_same_filename_from_two_directories_is_rejected() {
    let fixture = Fixture::new();
    let other = fixture.dist.join("rebuilt");
    fs::create_dir_all(&other).unwrap();
    let first = fixture.write_dist("foo-1.0.tar.gz", "original build");
    let second = other.join("foo-1.0.tar.gz");
    fs::write(&second, "rebuilt").unwrap();

    let packages = group_distributions(&[first, second]).unwrap();
    assert_eq!(packages.len(), 1);

    let publisher = fixture.publisher(None, false);
    let err = publisher.publish(&packages[0]).unwrap_err();
    assert!(matches!(err, PublishError::ConflictingFilename { .. }));
    assert!(err.to_string().contains("foo-1.0.tar.gz"));
    assert!(!fixture.bucket.exists());
}
