//! Open-Meteo forecast client

use std::time::Duration;

use chrono::{NaiveDateTime, Timelike};
use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;
use soleil_core::{HourlyWeather, WeatherDay, WeatherKey, WeatherSource};
use tracing::debug;

use crate::{WeatherError, WeatherResult};

pub const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

pub const HOURLY_FIELDS: &str = "cloud_cover,direct_radiation,precipitation_probability";

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    hourly: HourlySeries,
}

#[derive(Debug, Deserialize)]
struct HourlySeries {
    time: Vec<String>,
    #[serde(default)]
    cloud_cover: Vec<Option<f64>>,
    #[serde(default)]
    direct_radiation: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability: Vec<Option<f64>>,
}

pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
    timezone: Tz,
}

impl OpenMeteoClient {
    pub fn new(base_url: impl Into<String>, timezone: Tz) -> WeatherResult<Self> {
        Self::with_timeout(base_url, timezone, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timezone: Tz,
        timeout: Duration,
    ) -> WeatherResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            timezone,
        })
    }

    pub async fn forecast(&self, key: &WeatherKey) -> WeatherResult<WeatherDay> {
        let date = key.date.format("%Y-%m-%d").to_string();
        let params = [
            ("latitude", key.cell.latitude().to_string()),
            ("longitude", key.cell.longitude().to_string()),
            ("hourly", HOURLY_FIELDS.to_string()),
            ("timezone", self.timezone.name().to_string()),
            ("start_date", date.clone()),
            ("end_date", date),
        ];

        debug!(key = %key, "Fetching forecast");

        let resp = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(WeatherError::Status(resp.status().as_u16()));
        }

        let body = resp.text().await?;
        parse_forecast(&body)
    }
}

#[async_trait::async_trait]
impl WeatherSource for OpenMeteoClient {
    async fn fetch_day(&self, key: &WeatherKey) -> anyhow::Result<WeatherDay> {
        Ok(self.forecast(key).await?)
    }
}

/// Reshape an Open-Meteo hourly response into samples keyed by local hour.
///
/// Hours without cloud cover are skipped; other missing values read as 0.
pub fn parse_forecast(body: &str) -> WeatherResult<WeatherDay> {
    let response: ForecastResponse =
        serde_json::from_str(body).map_err(|e| WeatherError::Malformed(e.to_string()))?;
    let series = response.hourly;

    let mut day = WeatherDay::empty();
    for (i, stamp) in series.time.iter().enumerate() {
        let at = NaiveDateTime::parse_from_str(stamp, "%Y-%m-%dT%H:%M")
            .map_err(|e| WeatherError::Malformed(format!("time {:?}: {}", stamp, e)))?;

        let Some(cloud_cover) = value_at(&series.cloud_cover, i) else {
            continue;
        };

        day.insert(
            at.hour(),
            HourlyWeather {
                cloud_cover: percent(cloud_cover),
                direct_radiation: value_at(&series.direct_radiation, i).unwrap_or(0.0),
                precipitation_probability: value_at(&series.precipitation_probability, i)
                    .map(percent)
                    .unwrap_or(0),
            },
        );
    }

    Ok(day)
}

fn value_at(values: &[Option<f64>], index: usize) -> Option<f64> {
    values.get(index).copied().flatten().filter(|v| v.is_finite())
}

fn percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}
