//! OAuth sign-in and token persistence.
//!
//! The Photos Library API needs a bearer token with the read-only photos
//! scope. [`Authenticator::access_token`] returns one, trying in order:
//!
//! 1. the saved token, if it has not expired;
//! 2. a refresh with the saved refresh token;
//! 3. an interactive consent flow: the user opens the printed URL and
//!    pastes back the authorization code, which is exchanged for a token.
//!
//! Every new token is written back to `token.json`.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::paths::AppPaths;

/// Read-only access to the user's photo library.
pub const PHOTOS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/photoslibrary.readonly";

/// Google's consent endpoint.
pub const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";

/// Google's token endpoint.
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Redirect for clients that show the code for the user to copy.
pub const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Tokens this close to expiry are treated as expired.
const EXPIRY_LEEWAY_SECS: i64 = 60;

/// Errors raised while signing in.
#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    /// A credential file could not be read or written.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A credential file is not valid JSON.
    #[error("Invalid credential file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The token endpoint could not be reached.
    #[error("Token request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The token endpoint rejected the request.
    #[error("Token endpoint returned status {code}: {body}")]
    TokenEndpoint { code: u16, body: String },

    /// The consent URL could not be built.
    #[error("Invalid OAuth URL: {0}")]
    Url(#[from] url::ParseError),

    /// The user supplied no value at a prompt.
    #[error("No {0} entered")]
    MissingInput(&'static str),

    /// Reading from the prompt failed.
    #[error("Failed to read input: {0}")]
    Prompt(#[source] io::Error),
}

/// OAuth client registration, stored in `oauth.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

fn default_redirect_uri() -> String {
    OOB_REDIRECT_URI.to_string()
}

fn default_scopes() -> Vec<String> {
    vec![PHOTOS_READONLY_SCOPE.to_string()]
}

impl OAuthConfig {
    /// Google endpoints and the read-only photos scope for a client.
    #[must_use]
    pub fn google(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_uri: default_auth_uri(),
            token_uri: default_token_uri(),
            redirect_uri: default_redirect_uri(),
            scopes: default_scopes(),
        }
    }

    /// Consent URL requesting offline access.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Url`] if `auth_uri` is not a valid URL.
    pub fn authorize_url(&self, state: &str) -> Result<Url, AuthError> {
        let mut url = Url::parse(&self.auth_uri)?;
        url.query_pairs_mut()
            .append_pair("access_type", "offline")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.scopes.join(" "))
            .append_pair("state", state);
        Ok(url)
    }
}

/// A bearer token, stored in `token.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Token {
    /// Whether the token is expired (or about to be) at `now`.
    ///
    /// A token without an expiry never expires.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry
            .is_some_and(|expiry| expiry - TimeDelta::seconds(EXPIRY_LEEWAY_SECS) <= now)
    }
}

/// Body returned by the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl TokenResponse {
    /// Build a token, keeping `previous_refresh` when the endpoint sends none.
    fn into_token(self, now: DateTime<Utc>, previous_refresh: Option<String>) -> Token {
        Token {
            access_token: self.access_token,
            token_type: self.token_type.unwrap_or_else(default_token_type),
            refresh_token: self.refresh_token.or(previous_refresh),
            expiry: self.expires_in.map(|secs| now + TimeDelta::seconds(secs)),
        }
    }
}

/// Source of interactive answers.
pub trait Prompt {
    /// Show `question` and return the trimmed answer.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn ask(&mut self, question: &str) -> io::Result<String>;
}

/// Prompts on stdout and reads a line from stdin.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{question}")?;
        stdout.flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, AuthError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(AuthError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| AuthError::Json {
            path: path.to_path_buf(),
            source,
        })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AuthError> {
    let io_err = |source| AuthError::Io {
        path: path.to_path_buf(),
        source,
    };
    let content = serde_json::to_string_pretty(value).map_err(|source| AuthError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, content).map_err(io_err)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(io_err)?;
    }
    Ok(())
}

/// Load `oauth.json`, prompting for and saving a new one if it is missing
/// or unreadable.
///
/// # Errors
///
/// Returns an error if prompting fails, an answer is empty, or the file
/// cannot be written.
pub fn load_or_prompt_config(
    path: &Path,
    prompt: &mut dyn Prompt,
) -> Result<OAuthConfig, AuthError> {
    match read_json::<OAuthConfig>(path) {
        Ok(Some(config)) => return Ok(config),
        Ok(None) => log::debug!("No OAuth client configuration at {}", path.display()),
        Err(e) => log::warn!("Ignoring unreadable OAuth configuration: {}", e),
    }

    let client_id = prompt.ask("OAuth Client ID: ").map_err(AuthError::Prompt)?;
    if client_id.is_empty() {
        return Err(AuthError::MissingInput("client id"));
    }
    let client_secret = prompt
        .ask("OAuth Client Secret: ")
        .map_err(AuthError::Prompt)?;
    if client_secret.is_empty() {
        return Err(AuthError::MissingInput("client secret"));
    }

    let config = OAuthConfig::google(client_id, client_secret);
    write_json(path, &config)?;
    Ok(config)
}

/// Obtains and persists access tokens.
#[derive(Debug)]
pub struct Authenticator {
    config: OAuthConfig,
    token_path: PathBuf,
    http: Client,
}

impl Authenticator {
    /// Create an authenticator saving tokens under `paths`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: OAuthConfig, paths: &AppPaths) -> Result<Self, AuthError> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            config,
            token_path: paths.token.clone(),
            http,
        })
    }

    /// The saved token, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn saved_token(&self) -> Result<Option<Token>, AuthError> {
        read_json(&self.token_path)
    }

    /// Persist a token.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_token(&self, token: &Token) -> Result<(), AuthError> {
        write_json(&self.token_path, token)
    }

    /// Return a usable token, refreshing or signing in as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if no token can be obtained.
    pub fn access_token(&self, prompt: &mut dyn Prompt) -> Result<Token, AuthError> {
        let saved = match self.saved_token() {
            Ok(saved) => saved,
            Err(e) => {
                log::warn!("Ignoring unreadable token: {}", e);
                None
            }
        };

        if let Some(token) = saved {
            if !token.is_expired_at(Utc::now()) {
                log::debug!("Using saved token");
                return Ok(token);
            }
            if let Some(refresh) = token.refresh_token.clone() {
                match self.refresh(&refresh) {
                    Ok(token) => {
                        self.save_token(&token)?;
                        return Ok(token);
                    }
                    Err(e) => log::warn!("Token refresh failed, signing in again: {}", e),
                }
            }
        }

        self.sign_in(prompt)
    }

    /// Run the interactive consent flow and save the resulting token.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is empty or the exchange fails.
    pub fn sign_in(&self, prompt: &mut dyn Prompt) -> Result<Token, AuthError> {
        let url = self.config.authorize_url("state")?;
        println!("1. Authorize this application: {url}");
        let code = prompt
            .ask("2. Paste the authorization code here: ")
            .map_err(AuthError::Prompt)?;
        if code.is_empty() {
            return Err(AuthError::MissingInput("authorization code"));
        }

        let token = self.exchange_code(&code)?;
        self.save_token(&token)?;
        log::info!("Saved token to {}", self.token_path.display());
        Ok(token)
    }

    /// Exchange an authorization code for a token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token endpoint fails.
    pub fn exchange_code(&self, code: &str) -> Result<Token, AuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
            ("redirect_uri", &self.config.redirect_uri),
        ];
        self.request_token(&params, None)
    }

    /// Get a new access token from a refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token endpoint fails.
    pub fn refresh(&self, refresh_token: &str) -> Result<Token, AuthError> {
        log::debug!("Refreshing access token");
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
        ];
        self.request_token(&params, Some(refresh_token.to_string()))
    }

    fn request_token(
        &self,
        params: &[(&str, &str)],
        previous_refresh: Option<String>,
    ) -> Result<Token, AuthError> {
        let response = self.http.post(&self.config.token_uri).form(params).send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(AuthError::TokenEndpoint {
                code: status.as_u16(),
                body,
            });
        }
        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|source| AuthError::Json {
                path: PathBuf::from(&self.config.token_uri),
                source,
            })?;
        Ok(parsed.into_token(Utc::now(), previous_refresh))
    }
}
