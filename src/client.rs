use crate::types::SearchOutcome;
use failure::Error;
use futures::TryFutureExt;
use log::{debug, info};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

/// HTTP client for the recognition backend. All paths are joined onto the
/// base URL built from the configured host.
#[derive(Clone)]
pub struct DashboardClient {
    http: reqwest::Client,
    base: Url,
}

impl DashboardClient {
    pub fn new(host: &str) -> Result<Self, Error> {
        let base = Url::parse(&format!("http://{}/", host))
            .map_err(|e| format_err!("Invalid backend host '{}': {}", host, e))?;
        // The backend tracks the login in a session cookie.
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self { http, base })
    }

    /// Establishes the session that the backend's guarded routes require.
    /// Rejected credentials come back as a 200 re-render of the login page
    /// rather than an error status, so the final URL gives the verdict.
    pub async fn login(&self) -> Result<(), Error> {
        let username = env::var("PLATE_WATCH_USERNAME")
            .map_err(|_| format_err!("PLATE_WATCH_USERNAME environment variable unset"))?;
        let password = env::var("PLATE_WATCH_PASSWORD")
            .map_err(|_| format_err!("PLATE_WATCH_PASSWORD environment variable unset"))?;
        let mut form = HashMap::new();
        form.insert("username", username.as_str());
        form.insert("password", password.as_str());
        let response = self
            .http
            .post(self.endpoint("login")?)
            .form(&form)
            .send()
            .map_err(|e| format_err!("Error logging in: {}", e))
            .await?
            .error_for_status()?;
        if session_rejected(response.url()) {
            return Err(format_err!("Login rejected for user '{}'", username));
        }
        info!("Logged in as {}", username);
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base.join(path)?)
    }

    /// Fetches the most recently detected plate. `None` when the backend has
    /// not populated the field yet; the "Invalid Plate" sentinel is passed
    /// through for the history to filter.
    pub async fn latest_plate(&self) -> Result<Option<String>, Error> {
        let value: Value = self
            .http
            .get(self.endpoint("get_latest_plate")?)
            .send()
            .map_err(|e| format_err!("Error requesting latest plate: {}", e))
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(parse_latest_plate(&value))
    }

    /// Looks up owner details for a plate. Misses and backend faults come
    /// back as non-2xx statuses carrying the error text in the JSON body,
    /// so the status is deliberately not checked here.
    pub async fn search(&self, plate: &str) -> Result<SearchOutcome, Error> {
        let mut body = HashMap::new();
        body.insert("plate_output", plate);
        let response = self
            .http
            .post(self.endpoint("search")?)
            .json(&body)
            .send()
            .map_err(|e| format_err!("Error requesting plate search: {}", e))
            .await?;
        if session_rejected(response.url()) {
            return Err(format_err!(
                "Search was redirected to the login page; session missing or expired"
            ));
        }
        let value: Value = response.json().await?;
        parse_search_response(&value)
    }

    /// Points the backend at a new RTSP source.
    pub async fn set_rtsp(&self, rtsp_url: &str) -> Result<(), Error> {
        let form = Form::new().text("rtsp_url", rtsp_url.to_string());
        self.http
            .post(self.endpoint("set_rtsp")?)
            .multipart(form)
            .send()
            .map_err(|e| format_err!("Error submitting RTSP URL: {}", e))
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn upload_image(&self, path: &Path) -> Result<(), Error> {
        self.upload("upload_image", path).await
    }

    pub async fn upload_video(&self, path: &Path) -> Result<(), Error> {
        self.upload("upload_video", path).await
    }

    async fn upload(&self, endpoint: &str, path: &Path) -> Result<(), Error> {
        let data = tokio::fs::read(path)
            .map_err(|e| format_err!("Unable to read {:?}: {}", path, e))
            .await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let form = Form::new().part("file", Part::bytes(data).file_name(file_name));
        self.http
            .post(self.endpoint(endpoint)?)
            .multipart(form)
            .send()
            .map_err(|e| format_err!("Error uploading {:?}: {}", path, e))
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Re-requests the stream resource with a cache-busting query parameter
    /// so the backend serves a fresh feed. The body is an endless MJPEG
    /// stream; receiving the response headers is enough, it is never read.
    pub async fn refresh_stream(&self) -> Result<(), Error> {
        let mut url = self.endpoint("video_feed")?;
        let millis = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis();
        url.query_pairs_mut().append_pair("t", &millis.to_string());
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|e| format_err!("Error refreshing video stream: {}", e))
            .await?
            .error_for_status()?;
        if session_rejected(response.url()) {
            return Err(format_err!(
                "Stream refresh was redirected to the login page; session missing or expired"
            ));
        }
        debug!("Refreshed stream at {}", response.url());
        Ok(())
    }
}

/// Guarded routes answer unauthenticated requests with a redirect to the
/// login page instead of an error status; after redirects the final URL is
/// what tells a live session from a bounced one.
fn session_rejected(final_url: &Url) -> bool {
    final_url.path() == "/login"
}

fn parse_latest_plate(value: &Value) -> Option<String> {
    value["formatted_plate"].as_str().map(str::to_string)
}

fn parse_search_response(value: &Value) -> Result<SearchOutcome, Error> {
    if let Some(error) = value["error"].as_str() {
        return Ok(SearchOutcome::Rejected(error.to_string()));
    }
    let field = |name: &str| {
        value[name]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| format_err!("Missing {} field in search response", name))
    };
    Ok(SearchOutcome::Found {
        name: field("name")?,
        name2: field("name2")?,
        national_code: field("national_code")?,
    })
}
