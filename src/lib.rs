pub mod auth_utils;
pub mod config;
pub mod db;
pub mod error_handler;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod password;
pub mod render;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod state;
