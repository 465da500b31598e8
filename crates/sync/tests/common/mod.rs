//! Shared helpers for sync integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use nexttracker_core::item::{ItemStatus, ItemType, NewItem, TrackableItem};
use nexttracker_core::metadata::{BookMetadata, ItemMetadata, MovieMetadata};
use nexttracker_core::settings::AppSettings;
use nexttracker_core::types::ItemId;
use wiremock::{Request, Respond, ResponseTemplate};

/// Path of the user's WebDAV root on the fake server.
pub const DAV_ROOT: &str = "/remote.php/dav/files/ada";

/// `Basic` credentials for `ada:secret`.
const EXPECTED_AUTH: &str = "Basic YWRhOnNlY3JldA==";

pub fn nextcloud_settings(base_uri: &str) -> AppSettings {
    AppSettings {
        nextcloud_url: Some(format!("{base_uri}{DAV_ROOT}")),
        nextcloud_username: Some("ada".into()),
        nextcloud_password: Some("secret".into()),
        ..AppSettings::default()
    }
}

/// Five items spread over both shelves.
pub fn sample_collection() -> Vec<TrackableItem> {
    let movie = NewItem {
        external_id: Some("329865".into()),
        status: ItemStatus::Completed,
        rating: Some(4.5),
        metadata: ItemMetadata::Movie(MovieMetadata {
            director: Some("Denis Villeneuve".into()),
            runtime: Some(116),
            ..MovieMetadata::default()
        }),
        ..NewItem::planned(ItemType::Movie, "Arrival")
    };
    let book = NewItem {
        progress: 120,
        max_progress: Some(336),
        status: ItemStatus::InProgress,
        metadata: ItemMetadata::Book(BookMetadata {
            authors: vec!["Ted Chiang".into()],
            page_count: Some(336),
            ..BookMetadata::default()
        }),
        ..NewItem::planned(ItemType::Book, "Exhalation")
    };

    vec![
        movie.into_item(ItemId::new_v4(), 5_000),
        book.into_item(ItemId::new_v4(), 4_000),
        NewItem::planned(ItemType::Series, "Severance").into_item(ItemId::new_v4(), 3_000),
        NewItem::planned(ItemType::Fitness, "Morning run").into_item(ItemId::new_v4(), 2_000),
        NewItem::planned(ItemType::Book, "Piranesi").into_item(ItemId::new_v4(), 1_000),
    ]
}

/// In-memory WebDAV server for wiremock.
///
/// Understands `PROPFIND`, `MKCOL`, `PUT` and `GET` on a tree rooted at
/// [`DAV_ROOT`], checks basic auth, and honours `x-target-url` so it can sit
/// behind a forwarding proxy.
#[derive(Clone)]
pub struct FakeDav {
    state: Arc<Mutex<DavState>>,
}

struct DavState {
    collections: HashSet<String>,
    files: HashMap<String, Vec<u8>>,
}

impl FakeDav {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(DavState {
                collections: HashSet::from([DAV_ROOT.to_string()]),
                files: HashMap::new(),
            })),
        }
    }

    /// Seed a file at `path` (relative to [`DAV_ROOT`]), creating its folder.
    pub fn with_file(self, path: &str, contents: &str) -> Self {
        let full = format!("{DAV_ROOT}{path}");
        {
            let mut state = self.state.lock().unwrap();
            state.collections.insert(parent(&full).to_string());
            state.files.insert(full, contents.as_bytes().to_vec());
        }
        self
    }

    pub fn file(&self, path: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .files
            .get(&format!("{DAV_ROOT}{path}"))
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn has_collection(&self, path: &str) -> bool {
        let state = self.state.lock().unwrap();
        state.collections.contains(&format!("{DAV_ROOT}{path}"))
    }
}

impl Respond for FakeDav {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let authorized = request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some(EXPECTED_AUTH);
        if !authorized {
            return ResponseTemplate::new(401);
        }

        let path = resolve_path(request);
        let mut state = self.state.lock().unwrap();

        match request.method.as_str() {
            "PROPFIND" => {
                if state.collections.contains(&path) || state.files.contains_key(&path) {
                    ResponseTemplate::new(207)
                        .insert_header("content-type", "application/xml; charset=utf-8")
                        .set_body_string(multistatus(&path))
                } else {
                    ResponseTemplate::new(404)
                }
            }
            "MKCOL" => {
                if state.collections.contains(&path) {
                    ResponseTemplate::new(405)
                } else if !state.collections.contains(parent(&path)) {
                    ResponseTemplate::new(409)
                } else {
                    state.collections.insert(path);
                    ResponseTemplate::new(201)
                }
            }
            "PUT" => {
                if !state.collections.contains(parent(&path)) {
                    return ResponseTemplate::new(409);
                }
                let created = state.files.insert(path, request.body.clone()).is_none();
                ResponseTemplate::new(if created { 201 } else { 204 })
            }
            "GET" => match state.files.get(&path) {
                Some(bytes) => ResponseTemplate::new(200).set_body_bytes(bytes.clone()),
                None => ResponseTemplate::new(404),
            },
            _ => ResponseTemplate::new(405),
        }
    }
}

/// The path a request addresses, taken from `x-target-url` when present.
fn resolve_path(request: &Request) -> String {
    let url = request
        .headers
        .get("x-target-url")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| reqwest::Url::parse(s).ok())
        .unwrap_or_else(|| request.url.clone());
    url.path().trim_end_matches('/').to_string()
}

fn parent(path: &str) -> &str {
    path.rsplit_once('/').map(|(p, _)| p).unwrap_or("")
}

fn multistatus(path: &str) -> String {
    format!(
        r#"<?xml version="1.0"?><d:multistatus xmlns:d="DAV:"><d:response><d:href>{path}</d:href><d:propstat><d:status>HTTP/1.1 200 OK</d:status></d:propstat></d:response></d:multistatus>"#
    )
}
