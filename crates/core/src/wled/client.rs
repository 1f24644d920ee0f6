use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::models::{DeviceInfo, StateUpdate};
use crate::output::fixture::FixtureClient;

/// Client for the WLED JSON API over HTTP.
///
/// The transport is connectionless, so "connected" means the device answered
/// the last exchange; any failed request clears it and the sync loop opens a
/// fresh connection.
pub struct WledClient {
    http: reqwest::Client,
    base_url: String,
    connected: bool,
}

impl WledClient {
    /// `address` is a hostname or IP, optionally with a port; a scheme may
    /// be omitted.
    pub fn new(address: &str, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("building the HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url(address),
            connected: false,
        })
    }

    async fn post_state(&mut self, update: &StateUpdate) -> Result<()> {
        let url = format!("{}/json/state", self.base_url);
        let result = self.http.post(&url).json(update).send().await;
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                self.connected = false;
                return Err(err).context("sending the state update");
            }
        };
        if let Err(err) = response.error_for_status() {
            self.connected = false;
            return Err(err).context("the fixture rejected the state update");
        }
        Ok(())
    }
}

fn base_url(address: &str) -> String {
    let address = address.trim_end_matches('/');
    if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("http://{address}")
    }
}

#[async_trait]
impl FixtureClient for WledClient {
    async fn connect(&mut self) -> Result<()> {
        let url = format!("{}/json/info", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("requesting device info")?;
        let response = response
            .error_for_status()
            .context("the fixture rejected the info request")?;
        let info: DeviceInfo = response.json().await.context("decoding device info")?;
        self.connected = true;
        log::debug!(
            "Connected to WLED device '{}' (version {})",
            info.name,
            info.version
        );
        Ok(())
    }

    fn connected(&self) -> bool {
        self.connected
    }

    async fn set_master(&mut self, on: bool, brightness: u8) -> Result<()> {
        self.post_state(&StateUpdate::master(on, brightness)).await
    }

    async fn set_segment(&mut self, segment: u8, brightness: u8, color_temp: u8) -> Result<()> {
        self.post_state(&StateUpdate::segment(segment, brightness, color_temp))
            .await
    }

    async fn close(&mut self) {
        self.connected = false;
    }
}
