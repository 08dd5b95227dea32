// Uploader: signs in to a RetroShow site and posts videos through its
// `upload.php` form handler. Blocking and strictly sequential: login, then
// the upload step(s) one after another on the same cookie session.

use crate::error::UploadError;
use crate::markers::{self, LoginVerdict, Marker, EXCERPT_LIMIT};
use crate::session::Session;
use anyhow::{Context, Result};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Response;
use reqwest::header::LOCATION;
use reqwest::Url;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Site used when no `--server` is given.
pub const DEFAULT_BASE_URL: &str = "http://retroshow.hoho.ws";

/// Value of the login form's submit button ("Sign in").
const LOGIN_ACTION: &str = "Войти";

const VIDEO_MIME: &str = "video/mp4";
const PREVIEW_MIME: &str = "image/jpeg";

/// Login form payload. Lives only for the duration of `Uploader::login`.
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Sent as the `broadcast` form field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

/// Call pattern against `upload.php`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UploadMode {
    /// `?p=1` with metadata only, then `?p=2` with the files.
    #[default]
    Staged,
    /// A single `?p=2` post with metadata and files.
    Simple,
    /// A single post to the bare `upload.php`.
    Direct,
}

impl UploadMode {
    /// Query string of the file-bearing post.
    fn file_step_query(&self) -> Option<&'static str> {
        match self {
            UploadMode::Staged | UploadMode::Simple => Some("p=2"),
            UploadMode::Direct => None,
        }
    }

    /// Phrase the site returns after accepting the file.
    pub fn success_marker(&self) -> Marker {
        match self {
            UploadMode::Staged | UploadMode::Simple => markers::UPLOAD_MARKER,
            UploadMode::Direct => markers::UPLOAD_MARKER_LOOSE,
        }
    }
}

/// Everything needed for one upload. Built from the command line and
/// consumed once.
#[derive(Clone, Debug)]
pub struct UploadRequest {
    pub title: String,
    pub description: String,
    pub visibility: Visibility,
    pub video: PathBuf,
    pub preview: Option<PathBuf>,
    pub mode: UploadMode,
}

impl UploadRequest {
    /// Errors with `MissingFile` for the first path that is not a regular file.
    pub fn check_files(&self) -> Result<()> {
        for path in std::iter::once(&self.video).chain(self.preview.iter()) {
            if !path.is_file() {
                return Err(UploadError::MissingFile(path.clone()).into());
            }
        }
        Ok(())
    }
}

/// Owns the session for its whole lifetime; nothing else touches the cookies.
pub struct Uploader {
    base_url: String,
    session: Session,
}

impl Uploader {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).with_context(|| format!("Invalid server URL: {}", base_url))?;
        Ok(Uploader {
            base_url,
            session: Session::new()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn login_url(&self) -> String {
        format!("{}/login.php", &self.base_url)
    }

    fn upload_url(&self, query: Option<&str>) -> String {
        match query {
            Some(q) => format!("{}/upload.php?{}", &self.base_url, q),
            None => format!("{}/upload.php", &self.base_url),
        }
    }

    /// Sign in, printing the outcome. Transport errors count as failure.
    pub fn login(&self, credentials: &Credentials) -> bool {
        println!("Signing in as {}...", credentials.username);
        match self.try_login(credentials) {
            Ok(()) => {
                println!("Signed in.");
                true
            }
            Err(err) => {
                report(&err);
                false
            }
        }
    }

    pub fn try_login(&self, credentials: &Credentials) -> Result<()> {
        let url = self.login_url();
        log::debug!("POST {}", url);
        let res = self
            .session
            .no_redirect()
            .post(&url)
            .form(&[
                ("login", credentials.username.as_str()),
                ("pass", credentials.password.as_str()),
                ("action_login", LOGIN_ACTION),
            ])
            .send()
            .context("Failed to send login request")?;

        let status = res.status();
        let location = res
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        log::debug!("login answered {} (location: {:?})", status, location);
        let body = res.text().context("Failed to read login response")?;

        match markers::judge_login(status, location.as_deref(), &body) {
            LoginVerdict::Accepted => Ok(()),
            LoginVerdict::Follow(location) => self.check_landing(&url, &location),
            LoginVerdict::Rejected => Err(UploadError::LoginRejected.into()),
        }
    }

    /// Fetch the page a login redirect points at, on the same session, and
    /// look for the signed-in header there.
    fn check_landing(&self, login_url: &str, location: &str) -> Result<()> {
        let landing = Url::parse(login_url)
            .and_then(|base| base.join(location))
            .with_context(|| format!("Invalid login redirect: {}", location))?;
        log::debug!("GET {} (login landing page)", landing);
        let body = self
            .session
            .client()
            .get(landing)
            .send()
            .context("Failed to load page after login")?
            .text()
            .context("Failed to read page after login")?;
        if markers::landing_signed_in(&body) {
            Ok(())
        } else {
            Err(UploadError::LoginRejected.into())
        }
    }

    /// Upload a video, printing the outcome. Missing files, transport
    /// errors, non-2xx statuses and a missing success phrase all yield false.
    pub fn upload(&self, request: &UploadRequest) -> bool {
        upload_outcome(self.try_upload(request))
    }

    pub fn try_upload(&self, request: &UploadRequest) -> Result<()> {
        request.check_files()?;
        log::info!("uploading {} ({:?})", request.video.display(), request.mode);

        if request.mode == UploadMode::Staged {
            self.send_metadata(request)?;
        }

        let res = self.send_files(request)?;
        let status = res.status();
        if !status.is_success() {
            return Err(UploadError::UnexpectedStatus {
                step: "file upload",
                status,
            }
            .into());
        }
        let body = res.text().context("Failed to read upload response")?;
        if request.mode.success_marker().found_in(&body) {
            Ok(())
        } else {
            Err(UploadError::MarkerMissing {
                excerpt: markers::excerpt(&body, EXCERPT_LIMIT),
            }
            .into())
        }
    }

    /// Step 1 of the staged pattern: title and description only.
    fn send_metadata(&self, request: &UploadRequest) -> Result<()> {
        let url = self.upload_url(Some("p=1"));
        log::debug!("POST {} (metadata)", url);
        let form = Form::new()
            .text("title", request.title.clone())
            .text("description", request.description.clone());
        let res = self
            .session
            .client()
            .post(&url)
            .multipart(form)
            .send()
            .context("Failed to send video metadata")?;
        log::debug!("metadata step answered {}", res.status());
        if !res.status().is_success() {
            return Err(UploadError::UnexpectedStatus {
                step: "metadata step",
                status: res.status(),
            }
            .into());
        }
        Ok(())
    }

    /// The file-bearing post. The files are opened here and closed when the
    /// form is dropped, which `send` does whether it succeeds or fails.
    fn send_files(&self, request: &UploadRequest) -> Result<Response> {
        let url = self.upload_url(request.mode.file_step_query());
        log::debug!("POST {} (files)", url);
        let mut form = Form::new()
            .text("title", request.title.clone())
            .text("description", request.description.clone())
            .text("broadcast", request.visibility.as_str())
            .part("video", file_part(&request.video, VIDEO_MIME)?);
        if let Some(preview) = &request.preview {
            form = form.part("preview", file_part(preview, PREVIEW_MIME)?);
        }

        let res = self
            .session
            .client()
            .post(&url)
            .multipart(form)
            .send()
            .context("Failed to send video file")?;
        log::debug!("file step answered {}", res.status());
        Ok(res)
    }
}

/// Build a file part with a known length so the request gets a
/// Content-Length instead of chunked encoding.
fn file_part(path: &Path, mime: &str) -> Result<Part> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let len = file
        .metadata()
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .len();
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("upload")
        .to_string();
    let part = Part::reader_with_length(file, len)
        .file_name(file_name)
        .mime_str(mime)?;
    Ok(part)
}

/// Print the result of `try_upload` and collapse it to success/failure.
/// `ui` calls this directly once its spinner is cleared.
pub fn upload_outcome(result: Result<()>) -> bool {
    match result {
        Ok(()) => {
            println!("Video uploaded successfully.");
            true
        }
        Err(err) => {
            report(&err);
            false
        }
    }
}

/// Print an error and its causes, outermost first. reqwest repeats the
/// inner cause in its own message, so causes already shown are skipped.
pub fn report(err: &anyhow::Error) {
    for line in report_lines(err) {
        println!("{}", line);
    }
}

fn report_lines(err: &anyhow::Error) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for cause in err.chain() {
        let text = cause.to_string();
        if lines.last().map_or(false, |prev| prev.contains(&text)) {
            continue;
        }
        lines.push(text);
    }
    lines
}
