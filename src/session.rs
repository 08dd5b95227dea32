// HTTP session: two blocking clients over one cookie jar. The login handler
// answers with a redirect that must be inspected rather than followed, while
// uploads should follow redirects normally. Sharing the jar carries the PHP
// session cookie from one to the other.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::cookie::Jar;
use reqwest::redirect::Policy;
use std::sync::Arc;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub struct Session {
    jar: Arc<Jar>,
    client: Client,
    no_redirect: Client,
}

impl Session {
    pub fn new() -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let client = Self::builder(&jar)
            .build()
            .context("Failed to build HTTP client")?;
        let no_redirect = Self::builder(&jar)
            .redirect(Policy::none())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Session {
            jar,
            client,
            no_redirect,
        })
    }

    fn builder(jar: &Arc<Jar>) -> reqwest::blocking::ClientBuilder {
        // Uploads can take minutes; the blocking client otherwise gives up after 30s.
        Client::builder()
            .cookie_provider(Arc::clone(jar))
            .user_agent(USER_AGENT)
            .timeout(None)
    }

    /// Client that follows redirects.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Client that hands redirects back to the caller.
    pub fn no_redirect(&self) -> &Client {
        &self.no_redirect
    }

    pub fn jar(&self) -> &Jar {
        &self.jar
    }
}
