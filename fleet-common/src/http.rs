//! Thin `reqwest::Client` builder, grounded in
//! `ultrafast-models-sdk/src/providers/http_client.rs`'s
//! `HttpProviderClient::new` — every outbound call in this workspace goes
//! through a client built with an explicit total timeout (spec §5
//! "Every outbound HTTP call has a total timeout").

use std::time::Duration;

pub fn client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("reqwest client config is always valid")
}

/// A client with both a connect timeout and a total timeout, used by the
/// Supervisor's readiness poller which needs a short connect budget but a
/// much longer overall one.
pub fn client_with_connect_timeout(connect: Duration, total: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(connect)
        .timeout(total)
        .build()
        .expect("reqwest client config is always valid")
}
