pub mod client;
pub mod compose;
pub mod config;
pub mod error;
mod models;

pub use client::{find_by, identifier_href, CimiService, CimiServiceInstance, CimiSlaTemplate, CimiUser};
pub use client::{HttpPlatformClient, PlatformClient};
pub use compose::render_compose;
pub use config::{PlatformClientConfig, CIMI_AUTHENTICATION_BYPASS_VALUE, CIMI_AUTHENTICATION_HEADER_KEY};
pub use error::PlatformError;
