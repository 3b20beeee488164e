//! # Folio Repository
//!
//! Data access for the Folio backend. Services depend on the traits in
//! [`traits`]; the [`postgres`] module holds their SQLx implementations,
//! each a shaku component injected with the shared [`DatabasePool`].
//!
//! ```text
//! Service
//!   ↓  Arc<dyn BookRepository>
//! PgBookRepository
//!   ↓  Arc<dyn DatabasePoolInterface>
//! PostgreSQL
//! ```

pub mod pool;
pub mod postgres;
pub mod traits;

pub use pool::*;
pub use postgres::*;
pub use traits::*;
