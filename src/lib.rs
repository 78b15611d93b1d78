//! LumaDB Column Store
//!
//! A minimal column-oriented storage engine: typed columns with plain,
//! dictionary and run-length representations, relational operators that
//! run on all of them, and checksummed on-disk snapshots.
//!
//! # Key Features
//!
//! - **One contract, three layouts**: every column implements [`Column`];
//!   compression is invisible to callers
//! - **Operators over compressed data**: sort, selection, parallel
//!   selection, hash / sort-merge / nested-loop joins and arithmetic
//! - **Snapshots**: bincode-encoded, CRC32-verified column files
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                 Box<dyn Column> / SharedColumn            │
//! ├───────────────────────────────────────────────────────────┤
//! │   TypedColumn<T, S>: type checks, batches, operators      │
//! │   ┌────────────┐  ┌────────────┐  ┌────────────────────┐  │
//! │   │   ops      │  │   join     │  │   persist          │  │
//! │   └────────────┘  └────────────┘  └────────────────────┘  │
//! ├───────────────────────────────────────────────────────────┤
//! │   RowAccess<T>                                            │
//! │   ┌────────────┐  ┌────────────┐  ┌────────────────────┐  │
//! │   │   Plain    │  │ Dictionary │  │    Run-length      │  │
//! │   └────────────┘  └────────────┘  └────────────────────┘  │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use luma_colstore::{
//!     create_compressed_column, AttributeType, Column, CompressionCodec, Value, ValueComparator,
//! };
//!
//! let mut col = create_compressed_column(AttributeType::Int, "ints", CompressionCodec::Dictionary);
//! for v in [5, 3, 5, 3, 5] {
//!     col.insert(&Value::Int(v)).unwrap();
//! }
//! assert_eq!(col.selection(&Value::Int(5), ValueComparator::Equal).unwrap(), vec![0, 2, 4]);
//! ```

pub mod columnar;
pub mod config;
pub mod error;
pub mod logging;
pub mod types;

// Re-exports
pub use columnar::{
    create_column, create_column_with_config, create_compressed_column, share, Column, DictionaryColumn,
    PlainColumn, RleColumn, SharedColumn, TypedColumn,
};
pub use config::{ColumnConfig, Verbosity};
pub use error::{ColumnError, Result};
pub use types::*;
