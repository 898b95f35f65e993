pub mod assignments;
pub mod behavior;
pub mod config;
pub mod controllers;
pub mod error;
pub mod filters;
pub mod materials;
pub mod output;
pub mod remediation;
pub mod server;
pub mod standards;
pub mod store;
