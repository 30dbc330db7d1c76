pub mod error;
pub mod platforms;
pub mod status_provider;

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

pub(crate) const DEFAULT_UA: &str = concat!("streambot/", env!("CARGO_PKG_VERSION"));

/// Default timeout applied to every platform request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Install the process-wide rustls crypto provider once.
pub fn install_rustls_provider() {
    static PROVIDER_INSTALLED: OnceLock<()> = OnceLock::new();
    PROVIDER_INSTALLED.get_or_init(|| {
        if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
            debug!(existing_provider = ?e, "rustls CryptoProvider already installed");
        }
    });
}

/// A client builder preconfigured for platform API calls.
///
/// `timeout` of `None` uses the default of 30 seconds.
pub fn create_client_builder(timeout: Option<Duration>) -> reqwest::ClientBuilder {
    install_rustls_provider();
    Client::builder()
        .user_agent(DEFAULT_UA)
        .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
        .pool_idle_timeout(Duration::from_secs(90))
}

/// Build the default platform client, falling back to reqwest defaults.
pub fn default_client() -> Client {
    create_client_builder(None).build().unwrap_or_else(|error| {
        warn!(%error, "Failed to build platform HTTP client; falling back to reqwest defaults");
        Client::new()
    })
}
