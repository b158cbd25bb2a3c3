pub mod api_types;
pub mod app;
pub mod cart;
pub mod catalog;
pub mod input;
pub mod models;
pub mod storage;
