//! Metadata enrichment: provider access, domain entities and caching.
//!
//! # Module layout
//!
//! - [`types`] -- domain entities handed to consumers.
//! - [`provider`] -- wire types and the [`MediaProvider`] trait.
//! - [`tmdb`] -- HTTP implementation of the provider trait.
//! - [`cache`] -- typed two-variant cache in front of the provider.
//! - [`expiration`] -- release-date driven TTL policy.
//! - [`client`] -- the cache-through [`MediaClient`].

pub mod cache;
pub mod client;
pub mod expiration;
pub mod provider;
pub mod tmdb;
pub mod types;

pub use cache::{MediaCache, MemoryCache, RedisCache};
pub use client::MediaClient;
pub use provider::MediaProvider;
pub use tmdb::TmdbProvider;
