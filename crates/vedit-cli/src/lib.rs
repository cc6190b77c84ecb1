//! vedit CLI - visual editing for JSX projects.
//!
//! Ties the analysis and annotation crates to a command line and to the HTTP
//! mutation server that writes visual edits back into source files.
//!
//! # Architecture
//!
//! - [`cli`] - Argument definitions
//! - [`commands`] - `serve`, `annotate` and `inspect`
//! - [`config`] - Layered configuration with CLI overrides
//! - [`edit`] - Edit requests, file location, patch planning and persistence
//! - [`server`] - axum routes, API key check and CORS
//! - [`error`], [`logger`], [`ui`] - Ambient plumbing
//!
//! # Example
//!
//! ```no_run
//! use vedit_cli::edit::EditService;
//! use vedit_config::VeditConfig;
//!
//! let service = EditService::new(&VeditConfig::default());
//! let response = service.apply(vec![serde_json::json!({
//!     "type": "className",
//!     "fileName": "Hero",
//!     "lineNumber": 4,
//!     "component": "h1",
//!     "className": "text-4xl",
//! })]);
//! println!("{} applied", response.edits.len());
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod edit;
pub mod error;
pub mod logger;
pub mod server;
pub mod ui;

pub use error::{CliError, Result};
