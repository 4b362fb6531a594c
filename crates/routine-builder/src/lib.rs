// Library root: re-exports all modules so integration tests and the binary
// can access the crate's public API.

pub mod app;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod db;
pub mod protocol;
pub mod selection;
pub mod tui;
pub mod view;
