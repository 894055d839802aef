//! Infer TypeScript declarations from sample JSON.
//!
//! ```
//! use json_tsi::{get_types, Options};
//! use serde_json::json;
//!
//! let ts = get_types(&json!({"val": [{"str": "x"}, {}]}), &Options::default()).unwrap();
//! assert_eq!(ts, "interface RootObject {\n  val: Val[];\n}\n\ninterface Val {\n  str?: string;\n}");
//! ```
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod inference;
pub mod jq_exec;
pub mod naming;
pub mod schema;
pub mod stringify;
pub mod walker;

pub use config::Options;
pub use error::Error;
pub use generator::{Generator, Primitive};
pub use inference::{get_types, get_types_from_samples, infer_samples, infer_value, Inferred};
pub use walker::walk;
