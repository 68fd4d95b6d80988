//! # skyquery
//!
//! Clients for the NASA Exoplanet Archive and ESASky, plus a record/replay
//! harness that lets their tests run against checked-in response fixtures.
//!
//! ## Architecture
//!
//! - [`transport`]: the injectable [`Transport`](transport::Transport) seam and
//!   the live `reqwest` implementation
//! - [`replay`]: canonical request keys, the fixture index and store, and the
//!   replaying transport
//! - [`exoplanet`]: NASA Exoplanet Archive client (legacy API and TAP)
//! - [`esasky`]: ESASky catalog client
//! - [`table`]: IPAC and TAP JSON result parsing
//! - [`coords`]: sky positions and angular radii
//! - [`config`]: TOML and environment configuration
//! - [`error`]: the crate error type
//!
//! ## Example
//!
//! ```ignore
//! use skyquery::config::ClientConfig;
//! use skyquery::exoplanet::{NasaExoplanetArchive, QueryCriteria};
//! use skyquery::transport::HttpTransport;
//!
//! let config = ClientConfig::from_env()?;
//! let archive = NasaExoplanetArchive::new(HttpTransport::new(&config)?, &config);
//! let koi = archive
//!     .query_criteria("koi", &QueryCriteria::new().where_clause("kepid=10601284"))
//!     .await?;
//! ```

// QueryError carries an ErrorContext on every variant
#![allow(clippy::result_large_err)]

pub mod config;
pub mod coords;
pub mod error;
pub mod esasky;
pub mod exoplanet;
pub mod replay;
pub mod table;
pub mod transport;

pub use config::ClientConfig;
pub use error::{QueryError, QueryResult};
