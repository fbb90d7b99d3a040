// Library exports for testing and benchmarking

pub mod auth;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod monitoring;
pub mod resource;
pub mod resources;
pub mod web;

#[cfg(test)]
pub mod test_utils;
