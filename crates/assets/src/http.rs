//! HTTP fetching that understands the deck's same-origin URLs.
//!
//! Records and branding settings hold paths such as `/image-proxy?url=...`
//! or `/branding/cover-1.jpg`. With a public origin they are fetched from
//! the deployed app; without one, proxy URLs are unwrapped and fetched
//! upstream directly, and other paths resolve against the asset root.

use deck_core::{DeckConfig, Error, FetchedResource, Fetcher, ProxyEndpoints, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::path::PathBuf;

/// Where relative asset paths live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetRoot {
    Directory(PathBuf),
    Url(String),
}

impl AssetRoot {
    /// URLs start with a scheme; anything else is a directory.
    pub fn parse(value: &str) -> Self {
        if is_absolute(value) {
            AssetRoot::Url(value.trim_end_matches('/').to_string())
        } else {
            AssetRoot::Directory(PathBuf::from(value))
        }
    }
}

/// A resolved fetch location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchTarget {
    Remote(String),
    File(PathBuf),
}

/// Blocking HTTP fetcher used by the assembler and the sheet client.
pub struct HttpFetcher {
    client: Client,
    public_origin: Option<String>,
    asset_root: Option<AssetRoot>,
    proxy: ProxyEndpoints,
}

impl HttpFetcher {
    pub fn new(config: &DeckConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network {
                url: String::new(),
                reason: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            public_origin: config
                .public_origin
                .as_deref()
                .map(|o| o.trim_end_matches('/').to_string()),
            asset_root: config.asset_root.as_deref().map(AssetRoot::parse),
            proxy: config.proxy.clone(),
        })
    }

    /// Decide where `url` is actually fetched from.
    pub fn resolve(&self, url: &str) -> Result<FetchTarget> {
        let url = url.trim();
        if is_absolute(url) {
            return Ok(FetchTarget::Remote(url.to_string()));
        }

        let path = if url.starts_with('/') {
            url.to_string()
        } else {
            format!("/{}", url)
        };

        if let Some(ref origin) = self.public_origin {
            return Ok(FetchTarget::Remote(format!("{}{}", origin, path)));
        }

        if let Some(upstream) = self.unwrap_proxy(&path)? {
            return Ok(FetchTarget::Remote(upstream));
        }

        match self.asset_root {
            Some(AssetRoot::Directory(ref dir)) => {
                let relative = path.split(['?', '#']).next().unwrap_or_default();
                Ok(FetchTarget::File(dir.join(relative.trim_start_matches('/'))))
            }
            Some(AssetRoot::Url(ref root)) => Ok(FetchTarget::Remote(format!("{}{}", root, path))),
            None => Err(Error::Network {
                url: url.to_string(),
                reason: "relative URL with no public origin or asset root configured".to_string(),
            }),
        }
    }

    /// The upstream URL of `/image-proxy?url=...` or `/pdf-proxy?url=...`.
    fn unwrap_proxy(&self, path: &str) -> Result<Option<String>> {
        let Some((endpoint, query)) = path.split_once('?') else {
            return Ok(None);
        };
        if endpoint != self.proxy.image && endpoint != self.proxy.pdf {
            return Ok(None);
        }

        let Some(encoded) = query.split('&').find_map(|pair| pair.strip_prefix("url=")) else {
            return Ok(None);
        };
        let decoded = urlencoding::decode(encoded).map_err(|e| Error::Network {
            url: path.to_string(),
            reason: format!("Bad proxy target encoding: {}", e),
        })?;

        log::debug!("Unwrapped proxy URL {} -> {}", path, decoded);
        Ok(Some(decoded.into_owned()))
    }

    fn fetch_remote(&self, url: &str) -> Result<FetchedResource> {
        let response = self.client.get(url).send().map_err(|e| Error::Network {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let bytes = response.bytes().map_err(|e| Error::Network {
            url: url.to_string(),
            reason: format!("Failed to read body: {}", e),
        })?;

        Ok(FetchedResource::new(content_type, bytes.to_vec()))
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedResource> {
        match self.resolve(url)? {
            FetchTarget::Remote(remote) => {
                log::debug!("GET {}", remote);
                self.fetch_remote(&remote)
            }
            FetchTarget::File(path) => {
                log::debug!("Reading asset {}", path.display());
                let bytes = std::fs::read(&path)?;
                Ok(FetchedResource::new(None, bytes))
            }
        }
    }
}

fn is_absolute(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
