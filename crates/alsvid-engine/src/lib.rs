//! Alsvid request engine.
//!
//! Wraps the combine, estimation and mitigation engines behind one request
//! surface:
//!
//! - [`ops`]: synchronous handlers that map every engine error into an
//!   [`EngineError`] tagged with the failing [`Operation`]
//! - [`Engine`]: the same handlers run on a bounded [`WorkerPool`] sized from
//!   the container CPU quota
//! - [`EngineConfig`]: YAML file, environment and `.env` configuration
//! - [`init_tracing`]: console or JSON logs to stderr or a file
//!
//! # Example
//!
//! ```rust
//! use alsvid_engine::{Engine, EngineConfig};
//! use alsvid_ir::Counts;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = Engine::with_workers(EngineConfig::default(), 2)?;
//! let counts: Counts = [("101", 10)].into_iter().collect();
//! let divided = engine.divide(counts, vec![1, 2]).await?;
//! assert_eq!(divided[0].get("01"), Some(10));
//! assert_eq!(divided[1].get("1"), Some(10));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod cpu;
pub mod engine;
pub mod error;
pub mod ops;
pub mod pool;
pub mod request;
pub mod tracing_config;

pub use config::{ConfigError, EngineConfig};
pub use engine::Engine;
pub use error::{EngineError, EngineResult, ErrorBody, ErrorKind, Operation};
pub use pool::WorkerPool;
pub use tracing_config::{TracingConfig, TracingFormat, init_tracing};
