//! Data source seam: the HTTP client that talks to the backend, and the trait the
//! poller and mutation command go through so the demo source can stand in for it.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{Result, SyncError};
use crate::types::{
    Ack, Aggregate, Alert, BlockedHost, Device, EntityList, MutateRequest, TrafficSample,
};

/// One independently polled collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Devices,
    Alerts,
    Blocked,
    Traffic,
}

impl Kind {
    pub const ALL: [Kind; 4] = [Kind::Devices, Kind::Alerts, Kind::Blocked, Kind::Traffic];

    pub fn path(self) -> &'static str {
        match self {
            Kind::Devices => "entities/devices",
            Kind::Alerts => "entities/alerts",
            Kind::Blocked => "entities/blocked",
            Kind::Traffic => "entities/traffic",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Kind::Devices => "devices",
            Kind::Alerts => "alerts",
            Kind::Blocked => "blocked",
            Kind::Traffic => "traffic",
        }
    }
}

/// Result of one successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Devices {
        items: Vec<Device>,
        aggregate: Option<Aggregate>,
    },
    Alerts(Vec<Alert>),
    Blocked(Vec<BlockedHost>),
    Traffic(TrafficSample),
}

impl Payload {
    pub fn kind(&self) -> Kind {
        match self {
            Payload::Devices { .. } => Kind::Devices,
            Payload::Alerts(_) => Kind::Alerts,
            Payload::Blocked(_) => Kind::Blocked,
            Payload::Traffic(_) => Kind::Traffic,
        }
    }
}

#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self, kind: Kind) -> Result<Payload>;
    async fn mutate(&self, req: &MutateRequest) -> Result<Ack>;
}

pub struct HttpSource {
    client: reqwest::Client,
    base: Url,
}

impl HttpSource {
    pub fn new(base: &str, tls_ca: Option<&str>, timeout: Duration) -> anyhow::Result<Self> {
        let mut base = Url::parse(base)?;
        if !matches!(base.scheme(), "http" | "https") {
            anyhow::bail!("unsupported scheme '{}': expected http:// or https://", base.scheme());
        }
        // Url::join drops the last segment unless the base ends with '/'
        if !base.path().ends_with('/') {
            let p = format!("{}/", base.path());
            base.set_path(&p);
        }

        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("lanwatch/", env!("CARGO_PKG_VERSION")));
        if let Some(path) = tls_ca {
            let pem = std::fs::read(path)?;
            builder = builder.add_root_certificate(reqwest::Certificate::from_pem(&pem)?);
        }
        Ok(Self {
            client: builder.build()?,
            base,
        })
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| SyncError::Network(format!("bad endpoint {path}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(SyncError::from_reqwest)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SyncError::Network(format!("{path}: HTTP {status}")));
        }
        let body = resp.text().await.map_err(SyncError::from_reqwest)?;
        serde_json::from_str(&body).map_err(|e| SyncError::Parse(format!("{path}: {e}")))
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch(&self, kind: Kind) -> Result<Payload> {
        let path = kind.path();
        Ok(match kind {
            Kind::Devices => {
                let l: EntityList<Device> = self.get_json(path).await?;
                Payload::Devices {
                    items: l.items,
                    aggregate: l.aggregate,
                }
            }
            Kind::Alerts => Payload::Alerts(self.get_json::<EntityList<Alert>>(path).await?.items),
            Kind::Blocked => {
                Payload::Blocked(self.get_json::<EntityList<BlockedHost>>(path).await?.items)
            }
            Kind::Traffic => Payload::Traffic(self.get_json(path).await?),
        })
    }

    async fn mutate(&self, req: &MutateRequest) -> Result<Ack> {
        let url = self
            .endpoint("entities/mutate")
            .map_err(|e| SyncError::Mutation(e.to_string()))?;
        debug!(%url, key = %req.key, action = ?req.action, "POST");
        let resp = self
            .client
            .post(url)
            .json(req)
            .send()
            .await
            .map_err(|e| SyncError::Mutation(e.to_string()))?;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            let detail = body.trim();
            return Err(SyncError::Mutation(if detail.is_empty() {
                format!("HTTP {status}")
            } else {
                format!("HTTP {status}: {detail}")
            }));
        }
        Ok(ack_from_body(&body))
    }
}

/// A 2xx body that is empty, plain text, or JSON without a `status` still
/// counts as an Ack with status "ok".
fn ack_from_body(body: &str) -> Ack {
    let mut ack = serde_json::from_str::<Ack>(body).unwrap_or_else(|_| Ack {
        status: String::new(),
        message: body.trim().to_string(),
    });
    if ack.status.trim().is_empty() {
        ack.status = "ok".into();
    }
    ack
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_base_path() {
        let src = HttpSource::new("http://127.0.0.1:8000/lan", None, Duration::from_secs(1)).unwrap();
        assert_eq!(
            src.endpoint(Kind::Devices.path()).unwrap().as_str(),
            "http://127.0.0.1:8000/lan/entities/devices"
        );
        let root = HttpSource::new("http://127.0.0.1:8000", None, Duration::from_secs(1)).unwrap();
        assert_eq!(
            root.endpoint("entities/mutate").unwrap().as_str(),
            "http://127.0.0.1:8000/entities/mutate"
        );
    }

    #[test]
    fn ack_without_status_reads_ok() {
        assert_eq!(ack_from_body(r#"{"detail":"queued"}"#).status, "ok");
        assert_eq!(ack_from_body("").status, "ok");
        let plain = ack_from_body("done\n");
        assert_eq!((plain.status.as_str(), plain.message.as_str()), ("ok", "done"));
        let full = ack_from_body(r#"{"status":"already_blocked","message":"x"}"#);
        assert_eq!(full.status, "already_blocked");
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert!(HttpSource::new("ws://127.0.0.1:3000/ws", None, Duration::from_secs(1)).is_err());
    }
}
