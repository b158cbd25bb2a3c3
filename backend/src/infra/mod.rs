pub mod catalog_file;
pub mod config;
pub mod database;
pub mod file_slot;
pub mod terminal;
pub mod web;
