//! Runs the `bloodbank-console` binary against an in-process stub backend.

use std::path::Path;
use std::process::{Command, Output};
use std::sync::mpsc;
use std::thread;

use actix_web::http::header;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde_json::{Value, json};
use tempfile::TempDir;

const SETTINGS_VARS: [&str; 6] = [
    "BLOODBANK_API_BASE_URL",
    "BLOODBANK_STORAGE_DIR",
    "BLOODBANK_REQUEST_TIMEOUT_SECS",
    "BLOODBANK_MAX_RETRIES",
    "BLOODBANK_USER_AGENT",
    "BLOODBANK_LOG_JSON",
];

async fn profile(request: HttpRequest) -> HttpResponse {
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if bearer == "Bearer admin-token" {
        HttpResponse::Ok().json(json!({
            "user": { "_id": "u-1", "role": "admin", "name": "Ops Desk" }
        }))
    } else {
        HttpResponse::Unauthorized().json(json!({ "message": "Invalid token" }))
    }
}

async fn donors() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "donors": [
            { "_id": "d1", "fullName": "Ann", "bloodGroup": "O+", "eligibleToDonate": true },
            { "_id": "d2", "fullName": "Bo", "bloodGroup": "A-" }
        ]
    }))
}

/// Serve the stub on its own actix system and return its API base URL.
fn spawn_stub() -> String {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        actix_rt::System::new().block_on(async move {
            let server = HttpServer::new(|| {
                App::new().service(
                    web::scope("/api")
                        .route("/auth/profile", web::get().to(profile))
                        .route("/admin/donors", web::get().to(donors)),
                )
            })
            .workers(1)
            .disable_signals()
            .bind(("127.0.0.1", 0))
            .expect("stub should bind");
            let address = server.addrs()[0];
            sender.send(address).expect("report stub address");
            server.run().await.expect("stub server");
        });
    });
    let address = receiver.recv().expect("stub address");
    format!("http://{address}/api")
}

fn console(base: &str, storage: &Path, args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_bloodbank-console"));
    for name in SETTINGS_VARS {
        command.env_remove(name);
    }
    command
        .current_dir(storage)
        .arg("--api-base-url")
        .arg(base)
        .arg("--storage-dir")
        .arg(storage)
        .args(args)
        .output()
        .expect("run bloodbank-console")
}

fn json_lines(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect()
}

#[test]
fn login_then_whoami_prints_profile() {
    let base = spawn_stub();
    let storage = TempDir::new().expect("temp dir");

    let login = console(&base, storage.path(), &["login", "--token", "admin-token"]);
    assert!(login.status.success(), "login failed: {login:?}");
    assert_eq!(json_lines(&login), [json!({ "event": "login", "stored": true })]);
    assert!(storage.path().join("token").exists());

    let whoami = console(&base, storage.path(), &["whoami"]);
    assert!(whoami.status.success(), "whoami failed: {whoami:?}");
    let lines = json_lines(&whoami);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["displayName"], "Ops Desk");
    assert_eq!(lines[0]["role"], "admin");
}

#[test]
fn whoami_without_token_redirects_to_login() {
    let base = spawn_stub();
    let storage = TempDir::new().expect("temp dir");

    let output = console(&base, storage.path(), &["whoami"]);

    assert_eq!(output.status.code(), Some(2));
    let lines = json_lines(&output);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["redirect"], "login");
}

#[test]
fn rejected_token_is_removed_from_storage() {
    let base = spawn_stub();
    let storage = TempDir::new().expect("temp dir");
    let login = console(&base, storage.path(), &["login", "--token", "stale-token"]);
    assert!(login.status.success(), "login failed: {login:?}");

    let output = console(&base, storage.path(), &["whoami"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(!storage.path().join("token").exists());
}

#[test]
fn donors_are_filtered_and_summarised() {
    let base = spawn_stub();
    let storage = TempDir::new().expect("temp dir");
    let login = console(&base, storage.path(), &["login", "--token", "admin-token"]);
    assert!(login.status.success(), "login failed: {login:?}");

    let output = console(&base, storage.path(), &["donors", "--blood-group", "O+"]);

    assert!(output.status.success(), "donors failed: {output:?}");
    let lines = json_lines(&output);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["id"], "d1");
    assert_eq!(lines[1], json!({ "shown": 1, "total": 2 }));
    assert_eq!(lines[2]["summary"]["total"], 2);
}

#[test]
fn blank_rejection_reason_fails_without_redirect() {
    let base = spawn_stub();
    let storage = TempDir::new().expect("temp dir");
    let login = console(&base, storage.path(), &["login", "--token", "admin-token"]);
    assert!(login.status.success(), "login failed: {login:?}");

    let output = console(&base, storage.path(), &["reject", "f1", "--reason", "  "]);

    assert_eq!(output.status.code(), Some(1));
    let lines = json_lines(&output);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["error"]["code"], "invalid_request");
}
