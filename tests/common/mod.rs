//! Mock RetroShow site for integration tests.
//!
//! Runs a warp server on its own tokio runtime in a background thread so the
//! blocking client under test never executes inside an async context.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use warp::http::{Method, Response, StatusCode};
use warp::hyper::body::Bytes;
use warp::path::FullPath;
use warp::Filter;

pub const SESSION_COOKIE: &str = "PHPSESSID=mock-session";

/// How `login.php` answers.
#[derive(Clone, Debug)]
pub enum LoginReply {
    /// 200 with this page body.
    Page(String),
    /// 302 to this location with an empty body.
    Redirect(String),
}

/// Status and body for an `upload.php` post.
#[derive(Clone, Debug)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Reply {
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn status(status: u16, body: &str) -> Self {
        Reply {
            status,
            body: body.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Behavior {
    pub login: LoginReply,
    /// Answer to `upload.php?p=1`.
    pub metadata: Reply,
    /// Answer to any other `upload.php` post.
    pub upload: Reply,
    /// Page served for a GET of anything but `login.php`.
    pub landing: String,
}

impl Default for Behavior {
    fn default() -> Self {
        Behavior {
            login: LoginReply::Page(signed_in_page()),
            metadata: Reply::ok("<form>Шаг 2</form>"),
            upload: Reply::ok(&uploaded_page()),
            landing: signed_in_page(),
        }
    }
}

pub fn signed_in_page() -> String {
    "<html><a href=\"/channel.php\">Мой канал</a></html>".to_string()
}

pub fn login_form_page() -> String {
    "<html><form action=\"login.php\"><input name=\"login\"></form></html>".to_string()
}

pub fn uploaded_page() -> String {
    "<html><div class=\"ok\">Видео успешно загружено!</div></html>".to_string()
}

/// One request as seen by the mock.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: String,
    pub cookie: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub struct MockSite {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockSite {
    pub fn start(behavior: Behavior) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&requests);
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("mock runtime");
            rt.block_on(async move {
                let routes = warp::method()
                    .and(warp::path::full())
                    .and(warp::query::raw().or(warp::any().map(String::new)).unify())
                    .and(warp::header::optional::<String>("cookie"))
                    .and(warp::header::optional::<String>("content-type"))
                    .and(warp::body::bytes())
                    .map(
                        move |method: Method,
                              path: FullPath,
                              query: String,
                              cookie: Option<String>,
                              content_type: Option<String>,
                              body: Bytes| {
                            recorder.lock().unwrap().push(Recorded {
                                method: method.to_string(),
                                path: path.as_str().to_string(),
                                query: query.clone(),
                                cookie,
                                content_type,
                                body: body.to_vec(),
                            });
                            respond(&behavior, &method, path.as_str(), &query)
                        },
                    );
                let (addr, server) =
                    warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
                tx.send(addr).expect("report mock address");
                server.await;
            });
        });

        let addr = rx.recv().expect("mock site failed to start");
        MockSite { addr, requests }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| {
                if r.query.is_empty() {
                    r.path.clone()
                } else {
                    format!("{}?{}", r.path, r.query)
                }
            })
            .collect()
    }
}

fn respond(behavior: &Behavior, method: &Method, path: &str, query: &str) -> Response<String> {
    let builder = Response::builder().header("set-cookie", format!("{}; Path=/", SESSION_COOKIE));
    if *method == Method::GET {
        let page = if path == "/login.php" {
            login_form_page()
        } else {
            behavior.landing.clone()
        };
        return builder.status(StatusCode::OK).body(page).unwrap();
    }
    let response = match (path, query) {
        ("/login.php", _) => match &behavior.login {
            LoginReply::Page(body) => builder.status(StatusCode::OK).body(body.clone()),
            LoginReply::Redirect(location) => builder
                .status(StatusCode::FOUND)
                .header("location", location.as_str())
                .body(String::new()),
        },
        ("/upload.php", "p=1") => reply(builder, &behavior.metadata),
        ("/upload.php", _) => reply(builder, &behavior.upload),
        _ => builder.status(StatusCode::NOT_FOUND).body(String::new()),
    };
    response.unwrap()
}

fn reply(builder: warp::http::response::Builder, reply: &Reply) -> warp::http::Result<Response<String>> {
    builder
        .status(StatusCode::from_u16(reply.status).unwrap())
        .body(reply.body.clone())
}

/// A small fake video (and optional preview) in a temp dir.
pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub video: std::path::PathBuf,
    pub preview: std::path::PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("clip.mp4");
        let preview = dir.path().join("thumb.jpg");
        std::fs::write(&video, b"\x00\x00\x00\x18ftypmp42fake video bytes").unwrap();
        std::fs::write(&preview, b"\xff\xd8\xff\xe0fake jpeg").unwrap();
        Fixture { dir, video, preview }
    }
}
