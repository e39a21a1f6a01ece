//! Upload clients and batch orchestration for the cloud gallery uploader.
//! This crate is consumed by the web frontend.

pub mod auth;
pub mod batch;
pub mod classify;
pub mod config;
pub mod drive;
pub mod error;
pub mod models;
mod upload;
pub mod youtube;

pub use crate::auth::CredentialProvider;
pub use crate::batch::Uploader;
pub use crate::config::Config;
pub use crate::error::{Error, Result};
