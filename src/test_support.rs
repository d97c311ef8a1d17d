//! Test fixtures: a local stand-in for an Ollama server, PDF bytes and a
//! scripted `pdftoppm`

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

#[derive(Clone)]
enum Reply {
    Json(Value),
    Text(String),
    Status(u16, String),
}

/// Canned behaviour for the mock server
#[derive(Clone)]
pub struct MockOllama {
    reply: Reply,
    tags: Value,
}

impl MockOllama {
    /// Answer every chat request with `text` in the `/api/chat` shape
    pub fn reply(text: &str) -> Self {
        Self {
            reply: Reply::Json(json!({
                "model": "deepseek-ocr",
                "message": { "role": "assistant", "content": text },
                "done": true
            })),
            tags: json!({ "models": [{ "name": "deepseek-ocr:latest" }] }),
        }
    }

    /// Answer every chat request with an arbitrary JSON body
    pub fn raw(body: Value) -> Self {
        Self {
            reply: Reply::Json(body),
            ..Self::reply("")
        }
    }

    /// Answer every chat request with `200 OK` and a non-JSON body
    pub fn text_body(body: &str) -> Self {
        Self {
            reply: Reply::Text(body.to_string()),
            ..Self::reply("")
        }
    }

    /// Answer every chat request with an HTTP error
    pub fn status(code: u16, body: &str) -> Self {
        Self {
            reply: Reply::Status(code, body.to_string()),
            ..Self::reply("")
        }
    }
}

struct MockState {
    mock: MockOllama,
    requests: Mutex<Vec<Value>>,
}

/// Handle to a running mock server
pub struct MockServer {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockServer {
    /// Chat request bodies received so far
    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().unwrap().clone()
    }
}

pub async fn spawn_mock_ollama(mock: MockOllama) -> MockServer {
    let state = Arc::new(MockState {
        mock,
        requests: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/api/tags", get(tags))
        .route("/api/chat", post(chat))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockServer {
        base_url: format!("http://{}", addr),
        state,
    }
}

async fn tags(State(state): State<Arc<MockState>>) -> Json<Value> {
    Json(state.mock.tags.clone())
}

async fn chat(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.requests.lock().unwrap().push(body);

    match &state.mock.reply {
        Reply::Json(value) => Json(value.clone()).into_response(),
        Reply::Text(body) => (StatusCode::OK, body.clone()).into_response(),
        Reply::Status(code, body) => {
            let status = StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, body.clone()).into_response()
        }
    }
}

/// Minimal PDF with `pages` blank letter-size pages and a valid xref table
pub fn blank_pdf(pages: usize) -> Vec<u8> {
    let kids: Vec<String> = (0..pages).map(|i| format!("{} 0 R", i + 3)).collect();
    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), pages),
    ];
    for _ in 0..pages {
        objects.push("<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] >>".to_string());
    }

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::new();
    for (i, object) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, object).as_bytes());
    }

    let xref_start = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for offset in offsets {
        pdf.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_start
        )
        .as_bytes(),
    );
    pdf
}

/// File where the scripted `pdftoppm` records the output prefix of its last run
pub const LAST_PREFIX_FILE: &str = "last-prefix";

/// Scripted `pdftoppm` that "renders" `pages` pages
///
/// Page `n` is written as `<prefix>-<n>.png`, zero-padded to the width of
/// the page count like poppler does, and holds `n` bytes so callers can
/// tell pages apart. `-v` prints a version banner on stderr.
#[cfg(unix)]
pub fn fake_pdftoppm(dir: &Path, pages: usize) -> PathBuf {
    let width = pages.to_string().len();
    let render: String = (1..=pages)
        .map(|n| format!("head -c {n} /dev/zero > \"$last-{n:0width$}.png\"\n"))
        .collect();
    write_script(dir, &render)
}

/// Scripted `pdftoppm` that fails every conversion with `stderr`
#[cfg(unix)]
pub fn failing_pdftoppm(dir: &Path, stderr: &str) -> PathBuf {
    let quoted = stderr.replace('\'', r"'\''");
    write_script(dir, &format!("echo '{}' >&2\nexit 1\n", quoted))
}

#[cfg(unix)]
fn write_script(dir: &Path, render: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = format!(
        "#!/bin/sh\n\
         if [ \"$1\" = \"-v\" ]; then echo 'pdftoppm version 0.0.0-test' >&2; exit 0; fi\n\
         for last; do :; done\n\
         printf '%s' \"$last\" > '{}'\n\
         {}",
        dir.join(LAST_PREFIX_FILE).display(),
        render
    );

    let path = dir.join("pdftoppm");
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Temporary directory used by the last run of a scripted `pdftoppm`
pub fn last_render_dir(dir: &Path) -> PathBuf {
    let prefix = std::fs::read_to_string(dir.join(LAST_PREFIX_FILE)).unwrap();
    Path::new(&prefix).parent().unwrap().to_path_buf()
}
