use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::crypto::decode_image;
use crate::error::ApiError;
use crate::transport::{Request, Transport};
use crate::types::{Chapter, ImageQuality, Manga};

pub const BASE_API: &str = "https://jumpg-webapi.tokyo-cdn.com/api";
pub const BASE_URL: &str = "https://mangaplus.shueisha.co.jp";
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/102.0.0.0 Safari/537.36";

/// MANGA Plus web API client.
///
/// Every request carries the same `User-Agent` and a `Session-Token` generated
/// once per client. Nothing else is kept between calls, so a single client can
/// be shared across tasks.
pub struct MangaPlusClient<T = reqwest::Client> {
    transport: T,
    base_api: String,
    headers: Vec<(&'static str, String)>,
}

impl MangaPlusClient<reqwest::Client> {
    pub fn new() -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::with_transport(client))
    }
}

impl<T: Transport> MangaPlusClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self::with_base_url(transport, BASE_API)
    }

    pub fn with_base_url(transport: T, base_api: impl Into<String>) -> Self {
        let headers = vec![
            ("User-Agent", USER_AGENT.to_string()),
            ("Session-Token", Uuid::new_v4().to_string()),
        ];
        Self { transport, base_api: base_api.into().trim_end_matches('/').to_string(), headers }
    }

    pub fn transport(&self) -> &T { &self.transport }
    pub fn headers(&self) -> &[(&'static str, String)] { &self.headers }

    pub fn session_token(&self) -> &str {
        self.headers
            .iter()
            .find(|(name, _)| *name == "Session-Token")
            .map(|(_, v)| v.as_str())
            .unwrap_or_default()
    }

    /// Fetch a title with its chapter listing.
    pub async fn fetch_title(&self, title_id: i64) -> Result<Manga, ApiError> {
        let query = [("title_id", title_id.to_string()), ("format", "json".to_string())];
        let json = self.get_json("title_detail", &query).await?;
        Ok(Manga::from_api(&json)?)
    }

    /// Fetch the viewer data of a chapter, page URLs included.
    pub async fn fetch_chapter(&self, chapter_id: i64, quality: ImageQuality) -> Result<Chapter, ApiError> {
        let query = [
            ("chapter_id", chapter_id.to_string()),
            ("split", "no".to_string()),
            ("img_quality", quality.as_wire().to_string()),
            ("format", "json".to_string()),
        ];
        let json = self.get_json("manga_viewer", &query).await?;
        Ok(Chapter::from_api(&json)?)
    }

    /// Download an image and strip its XOR obfuscation.
    pub async fn fetch_image(&self, image_url: &str, encryption_key: &str) -> Result<Vec<u8>, ApiError> {
        let body = self.get_bytes(image_url, &[]).await?;
        Ok(decode_image(body, encryption_key)?)
    }

    async fn get_json(&self, endpoint: &str, query: &[(&'static str, String)]) -> Result<Value, ApiError> {
        let url = format!("{}/{}", self.base_api, endpoint);
        let body = self.get_bytes(&url, query).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get_bytes(&self, url: &str, query: &[(&'static str, String)]) -> Result<Vec<u8>, ApiError> {
        debug!(url, ?query, "GET");
        let resp = self.transport.get(Request { url, headers: &self.headers, query }).await?;
        if !resp.is_success() {
            debug!(url, status = resp.status, body = %resp.text(), "request failed");
            return Err(ApiError::Status { url: url.to_string(), status: resp.status });
        }
        Ok(resp.body)
    }
}

pub fn title_url(title_id: i64) -> String {
    format!("{BASE_URL}/titles/{title_id}")
}

pub fn viewer_url(chapter_id: i64) -> String {
    format!("{BASE_URL}/viewer/{chapter_id}")
}
