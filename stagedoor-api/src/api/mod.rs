use poem_openapi::OpenApi;

pub mod access;
pub mod block_entries;
pub mod geo_rules;
pub mod profiles;
pub mod teaser_config;
pub mod teaser_sessions;

pub fn get() -> impl OpenApi {
    (
        access::Api,
        profiles::ListApi,
        profiles::DetailApi,
        geo_rules::Api,
        teaser_config::Api,
        block_entries::Api,
        teaser_sessions::Api,
    )
}
