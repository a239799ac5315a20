//! HTTP request handlers

pub mod audio;
pub mod conversation;
pub mod health;
pub mod options;
pub mod page;
pub mod session;
pub mod speech;
