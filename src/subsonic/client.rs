use std::time::Duration;

use crate::config::{AuthSettings, ServerSettings};

use super::error::SubsonicError;
use super::model::{Artist, Directory, Entry, Envelope, ResponseBody};
use super::DirectoryBrowser;

const API_VERSION: &str = "1.8.0";
const CLIENT_NAME: &str = "stmp";

/// Blocking connection to a Subsonic server.
pub struct SubsonicConnection {
    host: String,
    username: String,
    password: String,
    agent: ureq::Agent,
}

impl SubsonicConnection {
    pub fn new(server: &ServerSettings, auth: &AuthSettings) -> Self {
        let config = ureq::Agent::config_builder()
            .user_agent(concat!("stmp/", env!("CARGO_PKG_VERSION")))
            .timeout_global(Some(Duration::from_millis(server.timeout_ms)))
            .build();

        Self {
            host: server.host.trim_end_matches('/').to_string(),
            username: auth.username.clone(),
            password: auth.password.clone(),
            agent: ureq::Agent::new_with_config(config),
        }
    }

    /// Query parameters every request carries.
    fn auth_params(&self) -> [(&'static str, String); 5] {
        [
            ("u", self.username.clone()),
            ("p", encode_password(&self.password)),
            ("v", API_VERSION.to_string()),
            ("c", CLIENT_NAME.to_string()),
            ("f", "json".to_string()),
        ]
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/rest/{}", self.host, method)
    }

    fn request(&self, method: &str, extra: &[(&str, &str)]) -> Result<ResponseBody, SubsonicError> {
        let mut request = self.agent.get(&self.endpoint(method));
        for (key, value) in self.auth_params() {
            request = request.query(key, value);
        }
        for (key, value) in extra {
            request = request.query(*key, *value);
        }

        tracing::debug!(method, "subsonic request");
        let mut resp = request.call()?;
        let body = resp.body_mut().read_to_string()?;
        parse_response(&body)
    }

    /// Check that the server is reachable and accepts the credentials.
    pub fn ping(&self) -> Result<(), SubsonicError> {
        self.request("ping", &[]).map(|_| ())
    }

    /// All artists of the server index, in index order.
    pub fn get_indexes(&self) -> Result<Vec<Artist>, SubsonicError> {
        let body = self.request("getIndexes", &[])?;
        let indexes = body
            .indexes
            .ok_or(SubsonicError::MissingPayload("indexes"))?;
        Ok(indexes
            .index
            .into_iter()
            .flat_map(|index| index.artist)
            .collect())
    }

    pub fn get_music_directory(&self, id: &str) -> Result<Directory, SubsonicError> {
        let body = self.request("getMusicDirectory", &[("id", id)])?;
        body.directory
            .map(Directory::from)
            .ok_or(SubsonicError::MissingPayload("directory"))
    }

    /// URL the engine can load to stream the song with the given id.
    pub fn stream_url(&self, id: &str) -> String {
        let mut url = self.endpoint("stream");
        url.push_str("?id=");
        url.push_str(&urlencoding::encode(id));
        for (key, value) in self.auth_params() {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(&value));
        }
        url
    }
}

impl DirectoryBrowser for SubsonicConnection {
    fn resolve(&self, id: &str) -> Result<Directory, SubsonicError> {
        self.get_music_directory(id)
    }

    fn play_url(&self, entry: &Entry) -> String {
        self.stream_url(&entry.id)
    }
}

/// Hex-encode the password as the protocol's `enc:` form.
pub(super) fn encode_password(password: &str) -> String {
    format!("enc:{}", hex::encode(password))
}

/// Decode a response body and turn `status="failed"` into an error.
pub(super) fn parse_response(body: &str) -> Result<ResponseBody, SubsonicError> {
    let envelope: Envelope = serde_json::from_str(body)?;
    let response = envelope.response;
    if response.status == "ok" {
        return Ok(response);
    }

    let (code, message) = response
        .error
        .map(|e| (e.code, e.message))
        .unwrap_or((0, format!("unexpected status {:?}", response.status)));
    Err(SubsonicError::Api { code, message })
}
