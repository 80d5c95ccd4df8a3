//! Typed calls for each API route, built on [`ApiClient::fetch_api`]

use serde::de::DeserializeOwned;
use tracing::info;

use crate::client::{ApiClient, RequestOptions};
use crate::error::ClientError;
use crate::models::{Account, Credentials, Envelope, LoginData, NewPatient, Patient, PatientUpdate, Registration};

fn into_data<T>(endpoint: &str, envelope: Envelope<T>) -> Result<T, ClientError> {
    envelope
        .data
        .ok_or_else(|| ClientError::MissingData(endpoint.to_string()))
}

impl ApiClient {
    async fn fetch_data<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ClientError> {
        let envelope: Envelope<T> = self.fetch_api(endpoint, options).await?;
        into_data(endpoint, envelope)
    }

    /// Log in and keep the returned token for later calls
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginData, ClientError> {
        let data: LoginData = self
            .fetch_data(
                "/login",
                RequestOptions::post().json(&Credentials { username, password })?,
            )
            .await?;

        self.token_store().set(&data.token)?;
        info!("Logged in as {} ({})", data.user.username, data.user.role);
        Ok(data)
    }

    /// Forget the stored token; the server keeps no session
    pub fn logout(&self) -> Result<(), ClientError> {
        self.token_store().clear()?;
        Ok(())
    }

    pub fn is_logged_in(&self) -> bool {
        self.token_store().get().is_some()
    }

    /// Create an account; needs an admin token
    pub async fn register(&self, registration: &Registration) -> Result<Account, ClientError> {
        self.fetch_data("/register", RequestOptions::post().json(registration)?)
            .await
    }

    pub async fn list_patients(&self) -> Result<Vec<Patient>, ClientError> {
        self.fetch_data("/patients", RequestOptions::get()).await
    }

    pub async fn get_patient(&self, id: &str) -> Result<Patient, ClientError> {
        self.fetch_data(&format!("/patients/{}", id), RequestOptions::get())
            .await
    }

    pub async fn create_patient(&self, patient: &NewPatient) -> Result<Patient, ClientError> {
        self.fetch_data("/patients", RequestOptions::post().json(patient)?)
            .await
    }

    pub async fn update_patient(&self, id: &str, update: &PatientUpdate) -> Result<Patient, ClientError> {
        self.fetch_data(&format!("/patients/{}", id), RequestOptions::put().json(update)?)
            .await
    }

    pub async fn delete_patient(&self, id: &str) -> Result<(), ClientError> {
        let _: Envelope<serde_json::Value> = self
            .fetch_api(&format!("/patients/{}", id), RequestOptions::delete())
            .await?;
        Ok(())
    }

    /// `GET /health`, resolved against the origin of the base URL
    pub async fn health(&self) -> Result<serde_json::Value, ClientError> {
        let base = self.base_url().trim_end_matches('/');
        let origin = base.strip_suffix("/api").unwrap_or(base);
        ApiClient::with_client(self.http.clone(), origin, self.token_store().clone())
            .fetch_api("/health", RequestOptions::get())
            .await
    }
}
