use std::future::Future;

use bytes::Bytes;
use eyre::{Context as _, Result};
use http_body_util::{BodyExt, Full};
use hyper::{
    body::Incoming,
    header::{ACCEPT, USER_AGENT},
    Method, Request, Response,
};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client as HyperClient},
    rt::TokioExecutor,
};

use crate::{config::ApiConfig, model::TrophyPage};

pub use self::response::ResponseBody;

mod response;

type InnerClient = HyperClient<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Source of trophy pages for a player.
pub trait TrophyApi {
    fn trophy_page(
        &self,
        player_id: &str,
        page: usize,
    ) -> impl Future<Output = Result<TrophyPage>>;
}

pub struct Client {
    client: InnerClient,
    base_url: Box<str>,
    user_agent: Box<str>,
}

impl Client {
    pub fn new(api: &ApiConfig) -> Self {
        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .build();

        let client = HyperClient::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            base_url: api.base_url.trim_end_matches('/').into(),
            user_agent: api.user_agent.clone(),
        }
    }

    /// Sends a GET request
    async fn send_get_request(&self, url: impl AsRef<str>) -> Result<Bytes> {
        let url = url.as_ref();
        trace!("sending GET request to url {url}");

        let req = Request::builder()
            .uri(url)
            .method(Method::GET)
            .header(USER_AGENT, &*self.user_agent)
            .header(ACCEPT, "application/json")
            .body(Full::default())
            .context("failed to build GET request")?;

        let response = self
            .client
            .request(req)
            .await
            .context("failed to receive GET response")?;

        Self::error_for_status(response, url).await
    }

    async fn error_for_status(response: Response<Incoming>, url: &str) -> Result<Bytes> {
        let status = response.status();

        let bytes = response
            .into_body()
            .collect()
            .await
            .context("failed to extract response bytes")?
            .to_bytes();

        if !status.is_success() {
            let body = ResponseBody::from(bytes);

            bail!("failed with status code {status} when requesting url {url}{body}");
        }

        Ok(bytes)
    }
}

impl TrophyApi for Client {
    async fn trophy_page(&self, player_id: &str, page: usize) -> Result<TrophyPage> {
        let url = format!("{}/player/{player_id}/trophies/{page}", self.base_url);
        let bytes = self.send_get_request(url).await?;

        serde_json::from_slice(&bytes).with_context(|| {
            let text = String::from_utf8_lossy(&bytes);

            format!("failed to deserialize trophy page: {text}")
        })
    }
}
