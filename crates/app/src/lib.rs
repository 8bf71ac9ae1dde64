//! Tessera storefront persistence and back-office services.

pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod observability;

#[cfg(test)]
mod test;

pub mod uuids;
