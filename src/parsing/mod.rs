//! Decoding of binary InterOp files.
//!
//! Every file starts with a one-byte format version followed by a
//! kind-specific header, then a run of records until end of input:
//!
//! | Header | Bytes |
//! |--------|-------|
//! | Record size | `[version u8][record_size u8]` |
//! | Bin table | `[version u8][bin_count u8][bin_count x {value, lower, upper} u16]` |
//! | Version only | `[version u8]` |
//!
//! All integers are little-endian. The supported `(kind, version)` pairs live
//! in [`layout`]; [`reader`] streams records against them.
//!
//! ## Example
//!
//! ```rust,no_run
//! use interop_metrics::core::q::QMetric;
//! use interop_metrics::parsing::reader::read_metric_file;
//! use std::path::Path;
//!
//! let q = read_metric_file::<QMetric>(Path::new("InterOp/QMetricsOut.bin")).unwrap();
//! println!("{} records, compressed: {}", q.len(), q.is_compressed());
//! ```

pub mod cursor;
pub mod layout;
pub mod reader;
