pub mod app;
pub mod auth;
pub mod components;
pub mod config;
pub mod data;
pub mod db;
pub mod error;
pub mod images;
pub mod profiles;
pub mod recipes;
pub mod state;
pub mod storage;
