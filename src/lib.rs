// MIT License - Copyright (c) 2026 hekit authors
//
//! # hekit
//!
//! Deployment kit for homomorphic-encryption workloads: the data-connection
//! capability contract that deployment data layers implement, a search tool
//! for HE algebras, and a staged component-install pipeline driven by TOML
//! recipes. No external dependencies beyond serde/toml, thiserror, tracing
//! and bitflags.
//!
//! ## Quick Start
//!
//! Any data-access backend plugs in by implementing [`DataConnection`] and
//! is then driven through the abstract handle:
//!
//! ```
//! use hekit::{DataConnection, DataConnectionHandle, Result};
//!
//! struct MemoryConnection {
//!     online: bool,
//!     buffer: Vec<u8>,
//! }
//!
//! impl DataConnection for MemoryConnection {
//!     fn connect(&mut self) -> Result<()> {
//!         self.online = true;
//!         Ok(())
//!     }
//!     fn disconnect(&mut self) -> Result<()> {
//!         self.online = false;
//!         Ok(())
//!     }
//!     fn read(&mut self) -> Result<()> {
//!         self.buffer.extend_from_slice(b"payload");
//!         Ok(())
//!     }
//!     fn write(&mut self) -> Result<()> {
//!         self.buffer.clear();
//!         Ok(())
//!     }
//!     fn process(&mut self) -> Result<()> {
//!         self.buffer.reverse();
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let mut conn: DataConnectionHandle = Box::new(MemoryConnection {
//!     online: false,
//!     buffer: Vec::new(),
//! });
//! conn.connect()?;
//! conn.read()?;
//! conn.process()?;
//! conn.write()?;
//! conn.disconnect()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod healg;
pub mod install;
pub mod primes;
pub mod range;

// Re-exports for convenience
pub use config::{default_config_path, load_config, Config};
pub use connection::{ConnectionOp, DataConnection, DataConnectionHandle};
pub use error::{KitError, Result};
pub use healg::{find_algebras, Algebra};
pub use install::{
    components_from_recipe, install_components, parse_recipe_args, Component, RecipeComponent,
    Stage, StageFlags,
};
pub use primes::{gen_primes, prime_factors, prime_factors_with_table, PrimeTable};
pub use range::{parse_range, parse_range_filtered, str_to_range};
