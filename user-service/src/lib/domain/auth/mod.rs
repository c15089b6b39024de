pub mod errors;
pub mod gates;
pub mod models;
pub mod ports;
pub mod service;
