/// Connection parameters for one of the platform's REST surfaces (CIMI
/// inventory or the lifecycle manager) — host, port, protocol and a list
/// of headers applied to every request.
#[derive(Debug, Clone)]
pub struct PlatformClientConfig {
    pub host: String,
    pub port: u16,
    pub protocol: String,
    pub headers: Vec<(String, String)>,
    /// Whether TLS certificate verification is disabled for this
    /// surface. The platform is assumed co-located on a mutually-trusted
    /// network; kept configurable rather than hard-coded.
    pub insecure_tls: bool,
}

impl PlatformClientConfig {
    pub fn url(&self, endpoint: &str) -> String {
        format!(
            "{}://{}:{}/{}",
            self.protocol,
            self.host,
            self.port,
            endpoint.trim_start_matches('/')
        )
    }
}

/// The bypass header this client installs so the sensor manager can
/// reach CIMI without going through full authn.
pub const CIMI_AUTHENTICATION_HEADER_KEY: &str = "Slipstream-Authn-Info";
pub const CIMI_AUTHENTICATION_BYPASS_VALUE: &str = "internal ADMIN";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_protocol_host_port_and_endpoint() {
        let cfg = PlatformClientConfig {
            host: "cimi.example".into(),
            port: 8443,
            protocol: "https".into(),
            headers: vec![],
            insecure_tls: true,
        };
        assert_eq!(cfg.url("/api/user"), "https://cimi.example:8443/api/user");
        assert_eq!(cfg.url("api/user"), "https://cimi.example:8443/api/user");
    }
}
