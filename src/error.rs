// Rejection reasons. They travel inside `anyhow::Error` so the CLI can print
// them and tests can `downcast_ref` to tell the causes apart.

use reqwest::StatusCode;
use std::error::Error;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum UploadError {
    /// A local file named on the command line does not exist.
    MissingFile(PathBuf),
    /// The login response carried neither the marker nor the redirect.
    LoginRejected,
    /// Non-2xx status at the given step.
    UnexpectedStatus { step: &'static str, status: StatusCode },
    /// The upload response lacked the success phrase.
    MarkerMissing { excerpt: String },
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::MissingFile(path) => write!(f, "File not found: {}", path.display()),
            Self::LoginRejected => write!(f, "Login rejected. Check username and password."),
            Self::UnexpectedStatus { step, status } => {
                write!(f, "HTTP error during {}: {}", step, status)
            }
            Self::MarkerMissing { excerpt } => {
                write!(f, "Server did not confirm the upload. Response:\n{}", excerpt)
            }
        }
    }
}

impl Error for UploadError {}
