pub mod config;
pub mod db;
pub mod errors;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod render;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
pub mod store;
