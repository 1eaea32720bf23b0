mod static_table;

use std::net::IpAddr;

use enum_dispatch::enum_dispatch;
use stagedoor_common::{Location, StagedoorError};

pub use static_table::StaticGeoResolver;

#[enum_dispatch]
pub enum GeoResolverEnum {
    Static(StaticGeoResolver),
}

/// Maps a request IP to a structured location. The decision engine only
/// depends on the resolved `Location`; how it was produced is someone
/// else's problem.
#[enum_dispatch(GeoResolverEnum)]
#[allow(async_fn_in_trait)]
pub trait GeoResolver {
    async fn resolve(&mut self, ip: IpAddr) -> Result<Option<Location>, StagedoorError>;
}
