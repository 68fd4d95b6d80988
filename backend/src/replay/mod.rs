//! Record/replay harness for archive responses.
//!
//! Tests hand a [`ReplayTransport`] to a client in place of the live
//! [`HttpTransport`](crate::transport::HttpTransport). Each request is reduced
//! to a [`canonical_key`], looked up in the [`FixtureIndex`] of a
//! [`FixtureStore`], and answered from the matching fixture file.
//!
//! # Regenerating fixtures
//!
//! Unrecorded requests fail with
//! [`QueryError::MissingFixture`](crate::error::QueryError::MissingFixture).
//! With `NASA_EXOPLANET_ARCHIVE_GENERATE_RESPONSES` set, they are instead
//! sent to the live service once and recorded:
//!
//! ```ignore
//! use skyquery::replay::{FixtureStore, ReplayTransport};
//! use skyquery::transport::HttpTransport;
//!
//! let store = FixtureStore::new("tests/data");
//! let live = HttpTransport::new(&config)?;
//! let replay = ReplayTransport::new(&store, &config.exoplanet.url_api).with_live(live);
//! let archive = NasaExoplanetArchive::new(replay, &config);
//! ```

pub mod index;
pub mod interceptor;
pub mod key;
pub mod store;

pub use index::FixtureIndex;
pub use interceptor::{FixtureGroup, GenerateMode, ReplayTransport};
pub use key::canonical_key;
pub use store::FixtureStore;
