use crate::error::ApiError;
use async_trait::async_trait;
use configuration::Settings;
use core_types::Enrichment;
use serde::de::DeserializeOwned;

pub mod error;
pub mod responses;

// --- Public API ---
pub use responses::{AgeResponse, CountryGuess, GenderResponse, NationalityResponse};

/// The abstract interface for the name-inference services.
/// The record service only depends on this trait, so the live HTTP client can
/// be swapped for a scripted one in tests.
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Fetches the most likely gender label for a first name.
    async fn fetch_gender(&self, name: &str) -> Result<Option<String>, ApiError>;

    /// Fetches the estimated age for a first name.
    async fn fetch_age(&self, name: &str) -> Result<Option<i32>, ApiError>;

    /// Fetches the most likely country code for a first name.
    async fn fetch_country(&self, name: &str) -> Result<Option<String>, ApiError>;

    /// Queries all three services one after another.
    ///
    /// The first failure aborts the whole enrichment; there is no partial
    /// result and no retry.
    async fn enrich(&self, name: &str) -> Result<Enrichment, ApiError> {
        let gender = self.fetch_gender(name).await?;
        let age = self.fetch_age(name).await?;
        let country = self.fetch_country(name).await?;
        Ok(Enrichment { gender, age, country })
    }
}

/// A concrete `Enricher` backed by the genderize/agify/nationalize style APIs.
#[derive(Debug, Clone)]
pub struct NameApiClient {
    client: reqwest::Client,
    gender_url: String,
    age_url: String,
    nationality_url: String,
}

impl NameApiClient {
    pub fn new(settings: &Settings) -> Result<Self, ApiError> {
        Self::with_urls(
            &settings.gender_api_url,
            &settings.age_api_url,
            &settings.nationality_api_url,
        )
    }

    pub fn with_urls(
        gender_url: &str,
        age_url: &str,
        nationality_url: &str,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("persons-api/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            gender_url: gender_url.to_string(),
            age_url: age_url.to_string(),
            nationality_url: nationality_url.to_string(),
        })
    }

    async fn get_by_name<T: DeserializeOwned>(
        &self,
        service: &'static str,
        url: &str,
        name: &str,
    ) -> Result<T, ApiError> {
        tracing::debug!(service, name, "Querying inference service.");

        let response = self.client.get(url).query(&[("name", name)]).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str::<T>(&text)
                .map_err(|e| ApiError::Deserialization(format!("{service}: {e}")))
        } else {
            Err(ApiError::Status {
                service,
                status: status.as_u16(),
                body: text,
            })
        }
    }
}

#[async_trait]
impl Enricher for NameApiClient {
    async fn fetch_gender(&self, name: &str) -> Result<Option<String>, ApiError> {
        let response: GenderResponse = self.get_by_name("gender", &self.gender_url, name).await?;
        Ok(response.gender)
    }

    async fn fetch_age(&self, name: &str) -> Result<Option<i32>, ApiError> {
        let response: AgeResponse = self.get_by_name("age", &self.age_url, name).await?;
        Ok(response.age)
    }

    async fn fetch_country(&self, name: &str) -> Result<Option<String>, ApiError> {
        let response: NationalityResponse = self
            .get_by_name("nationality", &self.nationality_url, name)
            .await?;
        Ok(response.country.into_iter().next().map(|guess| guess.country_id))
    }
}
