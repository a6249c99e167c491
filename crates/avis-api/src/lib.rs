// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use avis_app::{
    Client, ClientGateway, ClientId, Polarity, Sentiment, SentimentGateway, SentimentId,
};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Blocking JSON client for the review data service. Stateless between
/// calls apart from the connection pool; every method is one request.
#[derive(Debug, Clone)]
pub struct Api {
    base_url: String,
    timeout: Duration,
    http: HttpClient,
}

impl Api {
    /// `base_url` carries the full deployment prefix, for example
    /// `http://127.0.0.1:8080` or `http://127.0.0.1:8080/api`; the entity
    /// paths `/client` and `/sentiment` are appended to it.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("service.base_url must not be empty");
        }
        Url::parse(&base_url).context("parse service.base_url")?;

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn list_clients(&self) -> Result<Vec<Client>> {
        let response = self
            .http
            .get(format!("{}/client", self.base_url))
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let parsed: Vec<ClientRecord> = response.json().context("decode client list")?;
        Ok(parsed.into_iter().map(ClientRecord::into_model).collect())
    }

    pub fn create_client(&self, email: &str) -> Result<Client> {
        let response = self
            .http
            .post(format!("{}/client", self.base_url))
            .json(&ClientBody { email })
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let parsed: ClientRecord = response.json().context("decode created client")?;
        Ok(parsed.into_model())
    }

    pub fn update_client(&self, id: ClientId, email: &str) -> Result<Client> {
        let response = self
            .http
            .put(format!("{}/client/{}", self.base_url, id.get()))
            .json(&ClientBody { email })
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let parsed: ClientRecord = response.json().context("decode updated client")?;
        Ok(parsed.into_model())
    }

    pub fn delete_client(&self, id: ClientId) -> Result<()> {
        let response = self
            .http
            .delete(format!("{}/client/{}", self.base_url, id.get()))
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        Ok(())
    }

    pub fn list_sentiments(&self) -> Result<Vec<Sentiment>> {
        let response = self
            .http
            .get(format!("{}/sentiment", self.base_url))
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let parsed: Vec<SentimentRecord> = response.json().context("decode sentiment list")?;
        Ok(parsed
            .into_iter()
            .map(SentimentRecord::into_model)
            .collect())
    }

    /// The owning client travels as a nested `client: {id}` reference, the
    /// one wire convention the service speaks.
    pub fn create_sentiment(
        &self,
        text: &str,
        polarity: Polarity,
        client_id: ClientId,
    ) -> Result<Sentiment> {
        let body = SentimentCreateBody {
            text,
            polarity,
            client: ClientRef {
                id: client_id.get(),
            },
        };
        let response = self
            .http
            .post(format!("{}/sentiment", self.base_url))
            .json(&body)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let parsed: SentimentRecord = response.json().context("decode created sentiment")?;
        Ok(parsed.into_model())
    }

    /// Updates text and polarity only; the request body never mentions the
    /// owning client, so the reference established at creation stays put.
    pub fn update_sentiment(
        &self,
        id: SentimentId,
        text: &str,
        polarity: Polarity,
    ) -> Result<Sentiment> {
        let response = self
            .http
            .put(format!("{}/sentiment/{}", self.base_url, id.get()))
            .json(&SentimentUpdateBody { text, polarity })
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let parsed: SentimentRecord = response.json().context("decode updated sentiment")?;
        Ok(parsed.into_model())
    }

    pub fn delete_sentiment(&self, id: SentimentId) -> Result<()> {
        let response = self
            .http
            .delete(format!("{}/sentiment/{}", self.base_url, id.get()))
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        Ok(())
    }
}

impl ClientGateway for Api {
    fn list(&mut self) -> Result<Vec<Client>> {
        self.list_clients()
    }

    fn create(&mut self, email: &str) -> Result<Client> {
        self.create_client(email)
    }

    fn update(&mut self, id: ClientId, email: &str) -> Result<Client> {
        self.update_client(id, email)
    }

    fn remove(&mut self, id: ClientId) -> Result<()> {
        self.delete_client(id)
    }
}

impl SentimentGateway for Api {
    fn list(&mut self) -> Result<Vec<Sentiment>> {
        self.list_sentiments()
    }

    fn create(&mut self, text: &str, polarity: Polarity, client_id: ClientId) -> Result<Sentiment> {
        self.create_sentiment(text, polarity, client_id)
    }

    fn update(&mut self, id: SentimentId, text: &str, polarity: Polarity) -> Result<Sentiment> {
        self.update_sentiment(id, text, polarity)
    }

    fn remove(&mut self, id: SentimentId) -> Result<()> {
        self.delete_sentiment(id)
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- check service.base_url and that the data service is running ({})",
        base_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<MessageEnvelope>(body)
        && let Some(message) = parsed.message
        && !message.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), message);
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(error) = parsed.error
        && !error.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), error);
    }

    if body.len() < 100 && !body.contains('{') {
        return anyhow!("server error ({}): {}", status.as_u16(), body);
    }

    anyhow!("server returned {}", status.as_u16())
}

#[derive(Debug, Serialize)]
struct ClientBody<'a> {
    email: &'a str,
}

#[derive(Debug, Deserialize)]
struct ClientRecord {
    id: i64,
    email: String,
}

impl ClientRecord {
    fn into_model(self) -> Client {
        Client {
            id: ClientId::new(self.id),
            email: self.email,
        }
    }
}

#[derive(Debug, Serialize)]
struct SentimentCreateBody<'a> {
    text: &'a str,
    #[serde(rename = "type")]
    polarity: Polarity,
    client: ClientRef,
}

#[derive(Debug, Serialize)]
struct SentimentUpdateBody<'a> {
    text: &'a str,
    #[serde(rename = "type")]
    polarity: Polarity,
}

#[derive(Debug, Serialize)]
struct ClientRef {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct SentimentRecord {
    id: i64,
    text: String,
    #[serde(rename = "type")]
    polarity: Polarity,
    client: Option<ClientRefRecord>,
}

#[derive(Debug, Deserialize)]
struct ClientRefRecord {
    id: i64,
}

impl SentimentRecord {
    fn into_model(self) -> Sentiment {
        Sentiment {
            id: SentimentId::new(self.id),
            text: self.text,
            polarity: self.polarity,
            client_id: self.client.map(|client| ClientId::new(client.id)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessageEnvelope {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
}
