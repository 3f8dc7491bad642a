//! Smart HTTP receive-pack client
//!
//! A push is two requests:
//!
//! 1. `GET <url>/info/refs?service=git-receive-pack` advertises the remote's
//!    branches. Only `refs/heads/master` is understood.
//! 2. `POST <url>/git-receive-pack` carries one pkt-line update command and
//!    the raw pack. The remote answers with a report-status stream.
//!
//! Both requests use HTTP basic authentication.

use crate::areas::refs::MASTER_REF;
use crate::artifacts::objects::OBJECT_ID_LENGTH;
use crate::artifacts::objects::object_id::{NULL_OID, ObjectId};
use crate::artifacts::protocol::pkt_line::{decode_lines, encode_lines, line_text};
use crate::errors::NibError;
use anyhow::Context;
use bytes::Bytes;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};

const SERVICE: &str = "git-receive-pack";
const SERVICE_BANNER: &[u8] = b"# service=git-receive-pack\n";
const REQUEST_CONTENT_TYPE: &str = "application/x-git-receive-pack-request";
const RESULT_CONTENT_TYPE: &str = "application/x-git-receive-pack-result";
const UNPACK_OK: &[u8] = b"unpack ok\n";
const CAPABILITIES: &str = "report-status";

/// Basic-auth credentials; the password stays wrapped until a request is built.
#[derive(Debug, Clone)]
pub struct Credentials {
    username: String,
    password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Credentials {
            username: username.into(),
            password,
        }
    }
}

pub struct SmartHttpClient {
    client: Client,
    url: String,
    credentials: Credentials,
}

impl SmartHttpClient {
    pub fn new(url: impl Into<String>, credentials: Credentials) -> anyhow::Result<Self> {
        let url = url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .user_agent(concat!("nib/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Unable to build HTTP client")?;

        Ok(SmartHttpClient {
            client,
            url,
            credentials,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Ask the remote where its master branch points
    ///
    /// `None` means the remote has no commits yet.
    pub async fn discover_remote_ref(&self) -> anyhow::Result<Option<ObjectId>> {
        let url = format!("{}/info/refs?service={SERVICE}", self.url);
        tracing::debug!(%url, "discovering remote refs");

        let response = self
            .client
            .get(&url)
            .basic_auth(
                &self.credentials.username,
                Some(self.credentials.password.expose_secret()),
            )
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?;
        let body = Self::success_body(response).await?;

        Self::parse_advertisement(&body)
    }

    /// Upload `pack` and move the remote master from `old` to `new`
    pub async fn send_pack(
        &self,
        old: Option<&ObjectId>,
        new: &ObjectId,
        pack: Bytes,
    ) -> anyhow::Result<()> {
        let url = format!("{}/{SERVICE}", self.url);
        let old = old.map(|oid| oid.as_ref()).unwrap_or(NULL_OID);
        let command = format!("{old} {new} {MASTER_REF}\0 {CAPABILITIES}");

        let mut body = encode_lines(&[command]).to_vec();
        body.extend_from_slice(&pack);
        tracing::debug!(%url, bytes = body.len(), "sending pack");

        let response = self
            .client
            .post(&url)
            .basic_auth(
                &self.credentials.username,
                Some(self.credentials.password.expose_secret()),
            )
            .header(CONTENT_TYPE, REQUEST_CONTENT_TYPE)
            .header(ACCEPT, RESULT_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .with_context(|| format!("POST {url} failed"))?;
        let body = Self::success_body(response).await?;

        Self::check_report(&body)
    }

    async fn success_body(response: reqwest::Response) -> anyhow::Result<Bytes> {
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, url = %response.url(), "remote rejected request");
            return Err(NibError::Protocol(format!("remote answered HTTP {status}")).into());
        }

        response
            .bytes()
            .await
            .context("Unable to read response body")
    }

    fn parse_advertisement(body: &Bytes) -> anyhow::Result<Option<ObjectId>> {
        let lines = decode_lines(body)?;

        match lines.first() {
            Some(banner) if banner.as_ref() == SERVICE_BANNER => {}
            other => {
                return Err(NibError::Protocol(format!(
                    "expected service banner, got {:?}",
                    other.map(|line| line_text(line))
                ))
                .into());
            }
        }

        if !lines.get(1).is_some_and(|line| line.is_empty()) {
            return Err(NibError::Protocol("expected flush after service banner".to_string()).into());
        }

        let advertised = lines
            .get(2)
            .ok_or_else(|| NibError::Protocol("missing ref advertisement".to_string()))?;

        if advertised.len() >= OBJECT_ID_LENGTH
            && advertised[..OBJECT_ID_LENGTH].iter().all(|&b| b == b'0')
        {
            tracing::debug!("remote has no commits");
            return Ok(None);
        }

        let text = line_text(advertised);
        let refs_part = text.split('\0').next().unwrap_or_default();
        let mut fields = refs_part.split_whitespace();
        let (hash, ref_name) = match (fields.next(), fields.next()) {
            (Some(hash), Some(ref_name)) => (hash, ref_name),
            _ => {
                return Err(
                    NibError::Protocol(format!("malformed ref advertisement {text:?}")).into(),
                );
            }
        };

        if ref_name != MASTER_REF {
            return Err(NibError::Protocol(format!(
                "expected {MASTER_REF} in advertisement, got {ref_name}"
            ))
            .into());
        }

        let oid = ObjectId::try_parse(hash.to_string())
            .map_err(|e| NibError::Protocol(format!("bad advertised hash: {e}")))?;
        tracing::debug!(%oid, "remote master");

        Ok(Some(oid))
    }

    fn check_report(body: &Bytes) -> anyhow::Result<()> {
        let lines = decode_lines(body)?;

        match lines.first() {
            Some(line) if line.as_ref() == UNPACK_OK => {}
            other => {
                let status = other.map(|line| line_text(line)).unwrap_or_default();
                tracing::warn!(%status, "remote failed to unpack");
                return Err(NibError::Protocol(format!("expected \"unpack ok\", got {status:?}")).into());
            }
        }

        let rejection_prefix = format!("ng {MASTER_REF} ");
        for line in lines.iter().skip(1) {
            let text = line_text(line);
            if let Some(reason) = text.strip_prefix(&rejection_prefix) {
                tracing::warn!(reason, "remote rejected {}", MASTER_REF);
                return Err(
                    NibError::Protocol(format!("remote rejected {MASTER_REF}: {reason}")).into(),
                );
            }
        }

        Ok(())
    }
}
