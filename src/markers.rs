// Success detection. RetroShow answers with HTML pages, so the only signal
// of success is a fixed Russian phrase in the body (or, for login, a
// redirect to the index page). All matching goes through this module.

use reqwest::StatusCode;

/// Shown in the site header once a user is signed in ("My channel").
pub const LOGIN_MARKER: Marker = Marker::exact("Мой канал");

/// Page the login handler redirects to on success.
pub const LOGIN_REDIRECT_PAGE: &str = "index.php";

/// Full confirmation phrase ("Video uploaded successfully").
pub const UPLOAD_MARKER: Marker = Marker::exact("Видео успешно загружено");

/// Looser form of the confirmation, matched regardless of case.
pub const UPLOAD_MARKER_LOOSE: Marker = Marker::ignore_case("успешно загружено");

/// Characters of a rejected response shown in diagnostics.
pub const EXCERPT_LIMIT: usize = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaseMatch {
    Exact,
    Insensitive,
}

/// A phrase expected in a response body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Marker {
    pub text: &'static str,
    pub case: CaseMatch,
}

impl Marker {
    pub const fn exact(text: &'static str) -> Self {
        Marker { text, case: CaseMatch::Exact }
    }

    pub const fn ignore_case(text: &'static str) -> Self {
        Marker { text, case: CaseMatch::Insensitive }
    }

    /// Returns whether the phrase occurs in `body`.
    pub fn found_in(&self, body: &str) -> bool {
        match self.case {
            CaseMatch::Exact => body.contains(self.text),
            CaseMatch::Insensitive => body.to_lowercase().contains(&self.text.to_lowercase()),
        }
    }
}

/// What the login handler's answer says about the attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginVerdict {
    Accepted,
    /// Redirected somewhere other than the index page; the landing page
    /// has to be fetched and checked with `landing_signed_in`.
    Follow(String),
    Rejected,
}

/// A login counts as successful when the handler redirects to the index
/// page, or when the returned page already shows the signed-in header.
/// Any other redirect defers the decision to the page it points at.
pub fn judge_login(status: StatusCode, location: Option<&str>, body: &str) -> LoginVerdict {
    let redirected_home = status == StatusCode::FOUND
        && location.map_or(false, |l| l.contains(LOGIN_REDIRECT_PAGE));
    if redirected_home || LOGIN_MARKER.found_in(body) {
        return LoginVerdict::Accepted;
    }
    match location {
        Some(l) if status.is_redirection() => LoginVerdict::Follow(l.to_string()),
        _ => LoginVerdict::Rejected,
    }
}

/// Whether the page reached after a login redirect shows the signed-in header.
pub fn landing_signed_in(body: &str) -> bool {
    LOGIN_MARKER.found_in(body)
}

/// First `limit` characters of `body`, with `...` appended when cut.
pub fn excerpt(body: &str, limit: usize) -> String {
    match body.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
