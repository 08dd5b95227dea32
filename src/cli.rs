// Command-line flags. Each flag also answers to the spelling used by the
// older upload script (`--url`, `--username`, `--file`).

use crate::api::{UploadMode, Visibility, DEFAULT_BASE_URL};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Upload a video to a RetroShow site",
    long_about = "Signs in to a RetroShow site and uploads a video (and optional preview image) through its upload form."
)]
pub struct Args {
    /// Base URL of the site
    #[arg(
        long = "server",
        visible_alias = "url",
        value_name = "URL",
        env = "RETROSHOW_URL",
        default_value = DEFAULT_BASE_URL
    )]
    pub server: String,

    /// Account name
    #[arg(long = "login", visible_alias = "username", value_name = "USER")]
    pub username: String,

    /// Account password (prompted for when omitted)
    #[arg(long, env = "RETROSHOW_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Video file to upload
    #[arg(long = "video", visible_alias = "file", value_name = "PATH")]
    pub video: PathBuf,

    /// Optional preview image (JPEG)
    #[arg(long, value_name = "PATH")]
    pub preview: Option<PathBuf>,

    /// Video title
    #[arg(long)]
    pub title: String,

    /// Video description
    #[arg(long, default_value = "")]
    pub description: String,

    /// Publish the video as private
    #[arg(long)]
    pub private: bool,

    /// Upload in a single request instead of metadata first, then file
    #[arg(long, conflicts_with = "direct")]
    pub simple: bool,

    /// Post straight to upload.php without the step parameter
    #[arg(long)]
    pub direct: bool,
}

impl Args {
    pub fn visibility(&self) -> Visibility {
        if self.private {
            Visibility::Private
        } else {
            Visibility::Public
        }
    }

    pub fn mode(&self) -> UploadMode {
        if self.direct {
            UploadMode::Direct
        } else if self.simple {
            UploadMode::Simple
        } else {
            UploadMode::Staged
        }
    }
}
