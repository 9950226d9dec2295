//! HttpStore against a scripted in-process HTTP endpoint

use pyidx_store::{HttpStore, HttpStoreConfig, ObjectStore, PutOptions, StoreError};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use url::Url;

#[derive(Debug)]
struct RecordedRequest {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl RecordedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Serve one scripted response per connection, recording each request.
fn scripted_endpoint(responses: Vec<(u16, &'static str)>) -> (Url, JoinHandle<Vec<RecordedRequest>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("should bind test listener");
    let addr = listener.local_addr().expect("should have local addr");

    let handle = thread::spawn(move || {
        let mut recorded = Vec::new();
        for (status, body) in responses {
            let (stream, _) = listener.accept().expect("should accept connection");
            let mut reader = BufReader::new(stream.try_clone().expect("should clone stream"));

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut parts = request_line.split_whitespace();
            let method = parts.next().unwrap_or_default().to_string();
            let path = parts.next().unwrap_or_default().to_string();

            let mut headers = Vec::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((key, value)) = line.split_once(':') {
                    headers.push((key.trim().to_string(), value.trim().to_string()));
                }
            }

            let length = headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.parse::<usize>().ok())
                .unwrap_or(0);
            let mut request_body = vec![0u8; length];
            reader.read_exact(&mut request_body).unwrap();

            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {status} Scripted\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            stream.flush().unwrap();

            recorded.push(RecordedRequest {
                method,
                path,
                headers,
                body: request_body,
            });
        }
        recorded
    });

    let url = Url::parse(&format!("http://{addr}/")).unwrap();
    (url, handle)
}

fn http_store(endpoint: Url) -> HttpStore {
    let config = HttpStoreConfig::new(endpoint, "bucket").with_timeout(Duration::from_secs(5));
    HttpStore::new(config).expect("should build http store")
}

#[test]
fn test_fetch_returns_body() {
    let (endpoint, server) = scripted_endpoint(vec![(200, "<html></html>")]);
    let store = http_store(endpoint);

    let body = store.fetch("foo/").unwrap();
    assert_eq!(body, b"<html></html>");

    let requests = server.join().unwrap();
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/bucket/foo/");
}

#[test]
fn test_fetch_404_is_not_found() {
    let (endpoint, server) = scripted_endpoint(vec![(404, "")]);
    let store = http_store(endpoint);

    assert!(store.fetch("foo/").unwrap_err().is_not_found());
    server.join().unwrap();
}

#[test]
fn test_fetch_other_failure_is_status_error() {
    let (endpoint, server) = scripted_endpoint(vec![(403, "denied")]);
    let store = http_store(endpoint);

    match store.fetch("foo/") {
        Err(StoreError::Status { status, .. }) => assert_eq!(status, 403),
        other => panic!("expected status error, got {other:?}"),
    }
    server.join().unwrap();
}

#[test]
fn test_store_sends_headers_and_body() {
    let (endpoint, server) = scripted_endpoint(vec![(200, "")]);
    let store = http_store(endpoint);

    let options = PutOptions::new("text/html", "public-read")
        .with_cache_control("public, must-revalidate, proxy-revalidate, max-age=0");
    store.store("simple/foo/index.html", b"<html/>", &options).unwrap();

    let requests = server.join().unwrap();
    let request = &requests[0];
    assert_eq!(request.method, "PUT");
    assert_eq!(request.path, "/bucket/simple/foo/index.html");
    assert_eq!(request.header("content-type"), Some("text/html"));
    assert_eq!(request.header("x-amz-acl"), Some("public-read"));
    assert_eq!(
        request.header("cache-control"),
        Some("public, must-revalidate, proxy-revalidate, max-age=0")
    );
    assert_eq!(request.body, b"<html/>");
}

#[test]
fn test_store_failure_is_reported() {
    let (endpoint, server) = scripted_endpoint(vec![(500, "boom")]);
    let store = http_store(endpoint);

    let err = store
        .store("foo/foo-1.0.tar.gz", b"data", &PutOptions::new("application/x-gzip", "private"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Status { status: 500, .. }));
    server.join().unwrap();
}
