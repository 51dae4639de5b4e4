pub mod api_types;
pub mod cache;
pub mod cached_client;
pub mod client;
pub mod types;

#[cfg(test)]
pub(crate) mod test_server;

pub use cached_client::CachedEvolutionClient;
