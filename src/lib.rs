// retroshow-upload
// ----------------
// Signs in to a RetroShow site and pushes a video through its upload form.
// Everything lives in the library; `main.rs` only wires up logging and
// exit codes around `ui::run`.
//
// Modules:
// - `session`: the cookie-backed HTTP session shared by login and upload.
// - `markers`: how a RetroShow HTML response is judged a success.
// - `api`: the `Uploader` (login + multipart upload) and its inputs.
// - `error`: reasons a login or upload was rejected.
// - `cli`: command-line flags.
// - `ui`: the sequential terminal flow driving `api`.
pub mod api;
pub mod cli;
pub mod error;
pub mod markers;
pub mod session;
pub mod ui;
