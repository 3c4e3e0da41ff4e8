pub mod analyzer;
pub mod config;
pub mod filter;
pub mod hir;
pub mod lir;
pub mod mir;
pub mod parser;
#[cfg(feature = "sea-orm")]
pub mod sea_orm;
pub mod server;
pub mod store;

pub mod prelude {
    pub use crate::analyzer::{analyze, AnalyzedRecord, PropertySet};
    pub use crate::filter::{evaluate, FilterParams};
    pub use crate::lir::*;
    pub use crate::store::{MemoryStore, Store, StoreError};
}

pub use ::chumsky;
