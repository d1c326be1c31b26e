use std::{collections::HashMap, time::Duration};

use reqwest::Client;
use serde::Deserialize;

use crate::{config::Settings, error::ApiError};

/// Client for a USD-based rate feed (open.er-api.com shape).
#[derive(Clone)]
pub struct ExchangeRateClient {
    http: Client,
    url: String,
    fallback: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct LatestRatesResponse {
    #[serde(default)]
    pub result: Option<String>,

    #[serde(default)]
    pub base_code: Option<String>,

    #[serde(default)]
    pub rates: HashMap<String, Option<f64>>,
}

impl ExchangeRateClient {
    pub fn new(url: String, timeout: Duration, fallback: Option<f64>) -> Self {
        let http = match Client::builder().timeout(timeout).build() {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(error = %e, "rate client build failed, continuing without a request timeout");
                Client::new()
            }
        };

        Self { http, url, fallback }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.exchange_rate_url.clone(),
            Duration::from_secs(settings.exchange_rate_timeout_secs),
            settings.exchange_rate_fallback,
        )
    }

    pub async fn latest(&self) -> Result<LatestRatesResponse, String> {
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("rate request failed: {status} {body}"));
        }

        res.json::<LatestRatesResponse>().await.map_err(|e| e.to_string())
    }

    /// PKR per 1 USD.
    ///
    /// Fails closed unless a fallback rate was configured.
    pub async fn usd_to_pkr(&self) -> Result<f64, ApiError> {
        let fetched = self.latest().await.and_then(|resp| pkr_rate(&resp));

        match fetched {
            Ok(rate) => Ok(rate),
            Err(e) => match self.fallback {
                Some(rate) => {
                    tracing::warn!(error = %e, rate, "using fallback USD/PKR rate");
                    Ok(rate)
                }
                None => Err(ApiError::ExchangeRateUnavailable(e)),
            },
        }
    }
}

/// Pulls a usable PKR rate out of a feed response.
pub fn pkr_rate(resp: &LatestRatesResponse) -> Result<f64, String> {
    if let Some(result) = resp.result.as_deref() {
        if result != "success" {
            return Err(format!("rate feed reported '{result}'"));
        }
    }

    if let Some(base) = resp.base_code.as_deref() {
        if !base.eq_ignore_ascii_case("USD") {
            return Err(format!("rate feed base is {base}, expected USD"));
        }
    }

    match resp.rates.get("PKR").copied().flatten() {
        Some(rate) if rate.is_finite() && rate > 0.0 => Ok(rate),
        Some(rate) => Err(format!("unusable PKR rate {rate}")),
        None => Err("PKR rate missing from feed".to_string()),
    }
}
