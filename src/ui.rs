// UI layer: the one-shot terminal flow. Checks local files before touching
// the network, asks for a password if none was given, signs in, then uploads
// behind a spinner. Returns whether the whole run succeeded.

use crate::api::{self, Credentials, UploadRequest, Uploader};
use crate::cli::Args;
use anyhow::{Context, Result};
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub fn run(args: Args) -> Result<bool> {
    let request = UploadRequest {
        visibility: args.visibility(),
        mode: args.mode(),
        title: args.title,
        description: args.description,
        video: args.video,
        preview: args.preview,
    };

    // Nothing goes over the wire until both files are known to exist.
    if let Err(err) = request.check_files() {
        api::report(&err);
        return Ok(false);
    }

    let password = match args.password {
        Some(p) => p,
        // `Password` hides input in the terminal.
        None => Password::new()
            .with_prompt("Password")
            .interact()
            .context("Failed to read password")?,
    };
    let credentials = Credentials {
        username: args.username,
        password,
    };

    let uploader = Uploader::new(&args.server)?;
    if !uploader.login(&credentials) {
        println!("Could not sign in. Upload skipped.");
        return Ok(false);
    }
    drop(credentials);

    println!("Uploading \"{}\" from {}", request.title, request.video.display());
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")?);
    spinner.set_message("Uploading (this may take several minutes)...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result = uploader.try_upload(&request);
    spinner.finish_and_clear();

    // Same reporting as `Uploader::upload`, deferred until the spinner is gone.
    if api::upload_outcome(result) {
        println!("Upload completed successfully!");
        Ok(true)
    } else {
        println!("Upload failed!");
        Ok(false)
    }
}
