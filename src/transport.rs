use std::borrow::Cow;

use async_trait::async_trait;

use crate::error::ApiError;

/// A single GET request.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    pub url: &'a str,
    pub headers: &'a [(&'static str, String)],
    pub query: &'a [(&'static str, String)],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Issues GET requests for the API client. Must be shareable across tasks.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, request: Request<'_>) -> Result<Response, ApiError>;
}

#[async_trait]
impl Transport for reqwest::Client {
    async fn get(&self, request: Request<'_>) -> Result<Response, ApiError> {
        let mut builder = reqwest::Client::get(self, request.url);
        for (name, value) in request.headers {
            builder = builder.header(*name, value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(request.query);
        }
        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?.to_vec();
        Ok(Response { status, body })
    }
}
