//! Build-service and registry clients against in-process fake servers.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use sha2::{Digest, Sha256};
use tempfile::TempDir;

use openhub_core::{ActionMode, Credentials, Listener, ListenerName, Revision};
use openhub_remote::{artifacts, BuildState, HubClient, ObsClient, RemoteError};

// base64("user:password")
const BASIC_AUTH: &str = "Basic dXNlcjpwYXNzd29yZA==";
const TARBALL: &[u8] = b"pretend this is an image tarball";

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct ObsBehaviour {
    unauthorized: bool,
    malformed: bool,
    delay: Option<Duration>,
    code: &'static str,
    bad_checksum: bool,
    escaping_listing: bool,
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}")
}

async fn obs_handler(
    State(behaviour): State<Arc<ObsBehaviour>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let path = uri.path().to_string();
    if method != Method::GET || !path.starts_with("/build/") {
        return StatusCode::NOT_FOUND.into_response();
    }
    if let Some(delay) = behaviour.delay {
        tokio::time::sleep(delay).await;
    }
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(BASIC_AUTH);
    if behaviour.unauthorized || !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if behaviour.malformed {
        return (StatusCode::OK, "<").into_response();
    }

    if path.ends_with("/_status") {
        let body = format!(r#"<status package="portus" code="{}" />"#, behaviour.code);
        (StatusCode::OK, body).into_response()
    } else if path.ends_with("/_buildinfo") {
        (StatusCode::OK, "<buildinfo><rev>1234</rev></buildinfo>").into_response()
    } else if path.ends_with(".docker.tar") {
        (StatusCode::OK, TARBALL.to_vec()).into_response()
    } else if path.ends_with(".docker.tar.sha256") {
        let digest = if behaviour.bad_checksum {
            "0".repeat(64)
        } else {
            hex::encode(Sha256::digest(TARBALL))
        };
        (StatusCode::OK, format!("{digest}  portus.docker.tar\n")).into_response()
    } else if path.ends_with("/portus") && behaviour.escaping_listing {
        (
            StatusCode::OK,
            r#"<binarylist>
                 <binary filename="../escape.docker.tar" size="32" mtime="1"/>
                 <binary filename="../escape.docker.tar.sha256" size="64" mtime="1"/>
               </binarylist>"#,
        )
            .into_response()
    } else if path.ends_with("/portus") {
        (
            StatusCode::OK,
            r#"<binarylist>
                 <binary filename="_statistics" size="1" mtime="1"/>
                 <binary filename="portus.x86_64-2.3.docker.tar" size="32" mtime="1"/>
                 <binary filename="portus.x86_64-2.3.docker.tar.sha256" size="64" mtime="1"/>
               </binarylist>"#,
        )
            .into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn fake_obs(behaviour: ObsBehaviour) -> String {
    let router = Router::new()
        .fallback(obs_handler)
        .with_state(Arc::new(behaviour));
    serve(router).await
}

fn obs_client(server: String, timeout: Duration) -> ObsClient {
    let creds = Credentials {
        server,
        user: "user".to_string(),
        password: "password".to_string(),
        ..Credentials::default()
    };
    ObsClient::new(&creds, timeout).expect("client")
}

fn portus() -> Listener {
    Listener {
        name: ListenerName::from("portus-2.3"),
        project: "Virtualization:containers:Portus:2.3".to_string(),
        distribution: "openSUSE_Leap_15.0".to_string(),
        architecture: "x86_64".to_string(),
        package: "portus".to_string(),
        repository: "opensuse/portus".to_string(),
        tags: vec!["2.3".to_string(), "latest".to_string()],
        mode: ActionMode::RemoteTrigger,
    }
}

// ---------------------------------------------------------------------------
// 1. Build status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_succeeded() {
    let server = fake_obs(ObsBehaviour {
        code: "succeeded",
        ..ObsBehaviour::default()
    })
    .await;
    let state = obs_client(server, Duration::from_secs(5))
        .build_state(&portus())
        .await
        .expect("status");
    assert!(state.is_succeeded());
}

#[tokio::test]
async fn status_building_is_not_succeeded() {
    let server = fake_obs(ObsBehaviour {
        code: "building",
        ..ObsBehaviour::default()
    })
    .await;
    let state = obs_client(server, Duration::from_secs(5))
        .build_state(&portus())
        .await
        .expect("status");
    assert_eq!(state, BuildState::Other("building".to_string()));
}

#[tokio::test]
async fn status_unauthorized_reports_code() {
    let server = fake_obs(ObsBehaviour {
        unauthorized: true,
        ..ObsBehaviour::default()
    })
    .await;
    let err = obs_client(server, Duration::from_secs(5))
        .build_state(&portus())
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Status { status: 401, .. }), "got: {err}");
}

#[tokio::test]
async fn status_wrong_credentials_are_rejected() {
    let server = fake_obs(ObsBehaviour {
        code: "succeeded",
        ..ObsBehaviour::default()
    })
    .await;
    let creds = Credentials {
        server,
        user: "user".to_string(),
        password: "wrong".to_string(),
        ..Credentials::default()
    };
    let client = ObsClient::new(&creds, Duration::from_secs(5)).expect("client");
    let err = client.build_state(&portus()).await.unwrap_err();
    assert!(matches!(err, RemoteError::Status { status: 401, .. }), "got: {err}");
}

#[tokio::test]
async fn status_malformed_xml() {
    let server = fake_obs(ObsBehaviour {
        malformed: true,
        ..ObsBehaviour::default()
    })
    .await;
    let err = obs_client(server, Duration::from_secs(5))
        .build_state(&portus())
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Xml(_)), "got: {err}");
}

#[tokio::test]
async fn status_timeout() {
    let server = fake_obs(ObsBehaviour {
        code: "succeeded",
        delay: Some(Duration::from_secs(2)),
        ..ObsBehaviour::default()
    })
    .await;
    let err = obs_client(server, Duration::from_millis(200))
        .build_state(&portus())
        .await
        .unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got: {err}");
}

// ---------------------------------------------------------------------------
// 2. Revision
// ---------------------------------------------------------------------------

#[tokio::test]
async fn revision_from_buildinfo() {
    let server = fake_obs(ObsBehaviour::default()).await;
    let rev = obs_client(server, Duration::from_secs(5))
        .revision(&portus())
        .await
        .expect("revision");
    assert_eq!(rev, Some(Revision::from("1234")));
}

#[tokio::test]
async fn revision_unavailable_on_error_status() {
    let server = fake_obs(ObsBehaviour {
        unauthorized: true,
        ..ObsBehaviour::default()
    })
    .await;
    let result = obs_client(server, Duration::from_secs(5))
        .revision(&portus())
        .await;
    assert!(result.is_err());
}

// ---------------------------------------------------------------------------
// 3. Artifacts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_downloads_tarball_and_checksum_then_verifies() {
    let server = fake_obs(ObsBehaviour::default()).await;
    let obs = obs_client(server, Duration::from_secs(5));
    let root = TempDir::new().expect("tempdir");

    let fetched = artifacts::fetch(&obs, &portus(), root.path())
        .await
        .expect("fetch");
    assert_eq!(
        fetched.tarball,
        root.path()
            .join("portus-2.3")
            .join("portus.x86_64-2.3.docker.tar")
    );
    assert_eq!(std::fs::read(&fetched.tarball).expect("read"), TARBALL);
    artifacts::verify(&fetched).await.expect("checksum matches");

    artifacts::discard(root.path(), &portus()).await;
    assert!(!root.path().join("portus-2.3").exists());
}

#[tokio::test]
async fn fetch_with_wrong_checksum_fails_verification() {
    let server = fake_obs(ObsBehaviour {
        bad_checksum: true,
        ..ObsBehaviour::default()
    })
    .await;
    let obs = obs_client(server, Duration::from_secs(5));
    let root = TempDir::new().expect("tempdir");

    let fetched = artifacts::fetch(&obs, &portus(), root.path())
        .await
        .expect("fetch");
    let err = artifacts::verify(&fetched).await.unwrap_err();
    assert!(matches!(err, RemoteError::ChecksumMismatch { .. }), "got: {err}");
}

#[tokio::test]
async fn fetch_refuses_names_escaping_the_download_dir() {
    let server = fake_obs(ObsBehaviour {
        escaping_listing: true,
        ..ObsBehaviour::default()
    })
    .await;
    let obs = obs_client(server, Duration::from_secs(5));
    let work = TempDir::new().expect("tempdir");
    let root = work.path().join("downloads");

    let err = artifacts::fetch(&obs, &portus(), &root).await.unwrap_err();
    assert!(
        matches!(&err, RemoteError::UnsafeFilename { filename } if filename == "../escape.docker.tar"),
        "got: {err}"
    );
    assert!(!root.join("escape.docker.tar").exists());
    assert!(!work.path().join("escape.docker.tar").exists());
}

// ---------------------------------------------------------------------------
// 4. Registry trigger
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct HubState {
    fail_status: Option<StatusCode>,
    pushed: Arc<Mutex<Vec<(String, String)>>>,
}

async fn hub_handler(
    State(state): State<HubState>,
    uri: Uri,
    Json(body): Json<serde_json::Value>,
) -> Response {
    if let Some(status) = state.fail_status {
        return (status, "trigger rejected").into_response();
    }
    let tag = body["docker_tag"].as_str().unwrap_or_default().to_string();
    state
        .pushed
        .lock()
        .expect("lock")
        .push((uri.path().to_string(), tag));
    StatusCode::OK.into_response()
}

async fn fake_hub(state: HubState) -> String {
    let router = Router::new()
        .fallback(hub_handler)
        .with_state(state);
    serve(router).await
}

fn hub_client(server: String) -> HubClient {
    let creds = Credentials {
        hub_server: server,
        ..Credentials::default()
    };
    HubClient::new(&creds, Duration::from_secs(5)).expect("hub client")
}

#[tokio::test]
async fn trigger_posts_tag_to_repository_webhook() {
    let state = HubState::default();
    let server = fake_hub(state.clone()).await;
    let hub = hub_client(server);

    hub.trigger_tag("token", "opensuse/portus", "2.3")
        .await
        .expect("trigger 2.3");
    hub.trigger_tag("token", "opensuse/portus", "latest")
        .await
        .expect("trigger latest");

    let pushed = state.pushed.lock().expect("lock").clone();
    assert_eq!(
        pushed,
        vec![
            ("/u/opensuse/portus/trigger/token/".to_string(), "2.3".to_string()),
            ("/u/opensuse/portus/trigger/token/".to_string(), "latest".to_string()),
        ]
    );
}

#[tokio::test]
async fn trigger_failure_hides_token() {
    let state = HubState {
        fail_status: Some(StatusCode::INTERNAL_SERVER_ERROR),
        ..HubState::default()
    };
    let server = fake_hub(state).await;
    let err = hub_client(server)
        .trigger_tag("s3cret", "opensuse/portus", "latest")
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Status { status: 500, .. }), "got: {err}");
    assert!(!err.to_string().contains("s3cret"));
}

#[tokio::test]
async fn trigger_transport_error_hides_token() {
    let socket = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = socket.local_addr().expect("local addr");
    drop(socket);

    let err = hub_client(format!("http://{addr}"))
        .trigger_tag("s3cret", "opensuse/portus", "latest")
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Http(_)), "got: {err}");
    assert!(!err.to_string().contains("s3cret"), "got: {err}");
    assert!(!format!("{err:?}").contains("s3cret"), "got: {err:?}");
}
