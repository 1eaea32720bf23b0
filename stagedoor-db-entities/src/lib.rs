#![allow(non_snake_case)]

pub mod BlockEntry;
pub mod GeoRule;
pub mod Profile;
pub mod TeaserConfig;
pub mod TeaserSession;
