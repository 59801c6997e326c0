//! Domain Fixtures

use serde::Deserialize;

use crate::stores::RecognizedDomain;

/// Wrapper for recognized domains in YAML
#[derive(Debug, Deserialize)]
pub struct DomainsFixture {
    /// Domains in the order they appear in the file
    pub domains: Vec<DomainFixture>,
}

/// Recognized domain fixture from YAML
#[derive(Debug, Deserialize)]
pub struct DomainFixture {
    /// Domain or URL; normalized when resolving items
    pub domain: String,

    /// Whether the domain takes part in store resolution
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Display name for the storefront
    #[serde(default)]
    pub name: String,
}

impl From<DomainFixture> for RecognizedDomain {
    fn from(fixture: DomainFixture) -> Self {
        Self {
            domain: fixture.domain,
            enabled: fixture.enabled,
            name: fixture.name,
        }
    }
}

/// Domains are enabled unless the fixture says otherwise.
fn default_enabled() -> bool {
    true
}
