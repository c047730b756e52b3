use std::net::SocketAddr;

use url::Url;

use crate::ServiceConfig;

#[derive(Debug, Clone)]
pub struct Config {
    // Listen address
    pub listen_addr: SocketAddr,
    // log level for http tracing
    pub log_level: tracing::Level,
    // Where browsers go after a successful submission
    pub redirect: Option<Url>,
    // In-memory upload budget per request, in bytes
    pub max_memory: usize,
    // Maximum request body size, in bytes
    pub max_body: usize,
}

impl Config {
    pub fn new(service_config: &ServiceConfig) -> Self {
        match &service_config.redirect {
            Some(redirect) => tracing::info!(address = %redirect, "redirecting to"),
            None => tracing::warn!("no redirect is set, answering submissions with 204"),
        }
        Self {
            listen_addr: service_config.listen_addr,
            log_level: service_config.log_level,
            redirect: service_config.redirect.clone(),
            max_memory: service_config.max_memory,
            max_body: service_config.max_body,
        }
    }
}
