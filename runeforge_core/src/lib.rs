#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod catalog;
pub mod compat;
pub mod debounce;
mod error;
pub mod item;
pub mod overrides;
pub mod pipeline;
pub mod preview;
pub mod relay;

pub use catalog::{
    EnchantCatalog, EnchantCatalogEntry, EnchantSource, ImpactEvaluator, MemoCache, RuneCatalog,
    RuneSource,
};
pub use compat::check_compatibility;
pub use debounce::Debouncer;
pub use error::{Error, Result};
pub use item::{ItemDescription, ItemMeta, Line, LineKind};
pub use overrides::{
    ConfigUpdate, EnchantAction, EnchantResult, OverrideConfig, TransformOutcome, transform,
};
pub use pipeline::{ItemPipeline, ItemReport, SharedConfig};
pub use relay::{Envelope, ItemRequest, Message, Relay};
