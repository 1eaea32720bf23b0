use std::collections::HashMap;
use std::net::IpAddr;

use stagedoor_common::{GeoConfig, Location, StagedoorError};
use tracing::*;

use super::GeoResolver;

/// A config-driven exact-IP lookup table with an optional fallback
/// location. Stands in for the marketplace's external geo-IP vendor.
pub struct StaticGeoResolver {
    entries: HashMap<IpAddr, Location>,
    fallback: Option<Location>,
}

impl StaticGeoResolver {
    pub fn new(config: &GeoConfig) -> Self {
        let mut entries = HashMap::new();
        for entry in &config.entries {
            match entry.ip.parse::<IpAddr>() {
                Ok(ip) => {
                    entries.insert(ip, entry.location.clone());
                }
                Err(error) => {
                    warn!(ip = %entry.ip, ?error, "Ignoring unparseable geo mapping entry");
                }
            }
        }
        Self {
            entries,
            fallback: config.fallback.clone(),
        }
    }
}

impl GeoResolver for StaticGeoResolver {
    async fn resolve(&mut self, ip: IpAddr) -> Result<Option<Location>, StagedoorError> {
        Ok(self
            .entries
            .get(&ip)
            .cloned()
            .or_else(|| self.fallback.clone()))
    }
}

#[cfg(test)]
mod tests {
    use stagedoor_common::GeoMappingEntry;

    use super::*;

    #[tokio::test]
    async fn test_static_resolution_with_fallback() {
        let config = GeoConfig {
            entries: vec![GeoMappingEntry {
                ip: "203.0.113.7".into(),
                location: Location {
                    country_code: Some("US".into()),
                    state_code: Some("NY".into()),
                    ..Default::default()
                },
            }],
            fallback: Some(Location {
                country_code: Some("DE".into()),
                ..Default::default()
            }),
        };
        let mut resolver = StaticGeoResolver::new(&config);

        let location = resolver
            .resolve("203.0.113.7".parse().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(location.state_code.as_deref(), Some("NY"));

        let location = resolver
            .resolve("198.51.100.1".parse().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(location.country_code.as_deref(), Some("DE"));
    }

    #[tokio::test]
    async fn test_unknown_ip_without_fallback() {
        let mut resolver = StaticGeoResolver::new(&GeoConfig::default());
        let location = resolver
            .resolve("198.51.100.1".parse().unwrap())
            .await
            .unwrap();
        assert!(location.is_none());
    }
}
