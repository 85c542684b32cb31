pub mod clear;
pub mod config;
pub mod consent;
pub mod latest;
pub mod movie;
pub mod prompts;
pub mod render;
pub mod search;
pub mod session;
pub mod toplist;
pub mod ui;
