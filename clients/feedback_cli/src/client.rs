use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Response envelope of the core service.
#[derive(Deserialize)]
struct Envelope<T> {
    ok: bool,
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn open_envelope<T>(status: u16, body: Envelope<T>) -> anyhow::Result<T> {
    if !body.ok {
        let code = body.error.unwrap_or_else(|| format!("http_{status}"));
        match body.message {
            Some(message) => anyhow::bail!("{message} ({code})"),
            None => anyhow::bail!("{code}"),
        }
    }
    body.data.ok_or_else(|| anyhow::anyhow!("missing_data"))
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub username: String,
    pub expires_at: String,
}

pub struct Download {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// `filename="..."` out of a Content-Disposition value.
pub fn attachment_name(disposition: &str) -> Option<String> {
    let (_, rest) = disposition.split_once("filename=")?;
    let name = rest.split(';').next()?.trim().trim_matches('"');
    (!name.is_empty()).then(|| name.to_string())
}

pub struct CoreClient {
    http: reqwest::Client,
    base: String,
    token: Option<String>,
}

impl CoreClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            http,
            base: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn read<T: DeserializeOwned>(res: reqwest::Response) -> anyhow::Result<T> {
        let status = res.status().as_u16();
        let body: Envelope<T> = res
            .json()
            .await
            .map_err(|err| anyhow::anyhow!("http_{status}: {err}"))?;
        open_envelope(status, body)
    }

    pub async fn login(&mut self, username: &str, password: &str) -> anyhow::Result<Session> {
        #[derive(Serialize)]
        struct LoginRequest<'a> {
            username: &'a str,
            password: &'a str,
        }

        let res = self
            .http
            .post(self.url("/auth/login"))
            .json(&LoginRequest { username, password })
            .send()
            .await?;
        let session: Session = Self::read(res).await?;
        debug!("logged in as {} until {}", session.username, session.expires_at);
        self.token = Some(session.token.clone());
        Ok(session)
    }

    pub async fn get_ok<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let res = self.authorized(self.http.get(self.url(path))).send().await?;
        Self::read(res).await
    }

    pub async fn post_ok<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        let res = self
            .authorized(self.http.post(self.url(path)))
            .json(body)
            .send()
            .await?;
        Self::read(res).await
    }

    pub async fn download(&self, path: &str) -> anyhow::Result<Download> {
        let res = self.authorized(self.http.get(self.url(path))).send().await?;
        if !res.status().is_success() {
            return Err(Self::read::<serde_json::Value>(res)
                .await
                .err()
                .unwrap_or_else(|| anyhow::anyhow!("unexpected envelope")));
        }
        let file_name = res
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(attachment_name);
        let bytes = res.bytes().await?.to_vec();
        Ok(Download { file_name, bytes })
    }

    /// Opens the license SSE feed and hands every `data:` payload to
    /// `on_update` until the server closes the stream.
    pub async fn watch_license<F: FnMut(&str)>(&self, mut on_update: F) -> anyhow::Result<()> {
        let mut res = self
            .authorized(self.http.get(self.url("/license/events")))
            .send()
            .await?;
        if !res.status().is_success() {
            anyhow::bail!("http_{}", res.status().as_u16());
        }

        let mut pending = String::new();
        while let Some(chunk) = res.chunk().await? {
            pending.push_str(&String::from_utf8_lossy(&chunk));
            for payload in drain_sse_data(&mut pending) {
                on_update(&payload);
            }
        }
        Ok(())
    }
}

/// Removes complete lines from `buf` and returns their `data:` payloads.
/// A trailing partial line stays in the buffer.
pub fn drain_sse_data(buf: &mut String) -> Vec<String> {
    let Some(last_newline) = buf.rfind('\n') else {
        return Vec::new();
    };
    let complete: String = buf.drain(..=last_newline).collect();
    complete
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| data.trim().to_string())
        .filter(|data| !data.is_empty())
        .collect()
}
