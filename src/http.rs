use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;

/// Blocking client, no retries. `connect` bounds connection setup and
/// `total` the whole request including the body read.
pub fn client(connect: Duration, total: Duration, user_agent: &str) -> Result<Client> {
    Client::builder()
        .connect_timeout(connect)
        .timeout(total)
        .user_agent(user_agent)
        .build()
        .context("Failed to build HTTP client")
}

/// GET `url` and return the body, treating non-2xx as an error.
pub fn get_bytes(client: &Client, url: &str) -> reqwest::Result<Vec<u8>> {
    let response = client.get(url).send()?.error_for_status()?;
    Ok(response.bytes()?.to_vec())
}
