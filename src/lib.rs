pub mod arrivals;
pub mod auth;
pub mod config;
pub mod error;
pub mod localtime;
pub mod ports;
pub mod routes;
pub mod staffing;
pub mod store;
pub mod telemetry;
