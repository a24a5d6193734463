//! hubwire-codegen - Proxy source generation for hub contracts
//!
//! This crate is the generation pipeline behind hubwire: it scans Rust
//! source for unit structs annotated with `#[hub_invoker(HubContract)]` and
//! `#[hub_listener(ClientContract)]`, extracts the contracts' operations,
//! and renders one strongly-typed proxy per declaration: a fire-and-forget
//! `send` role, an acknowledgment-awaiting `invoke` role, and an event
//! `on` role, all wrapping a shared `hubwire_client::HubConnection`.
//!
//! Data flows one direction and the pipeline holds no cross-pass state:
//!
//! ```text
//! source files
//!     ↓
//!  [CompilationUnit]  parse
//!     ↓
//!  [extract]          contract traits → OperationSet
//!     ↓
//!  [builder]          declaration + contracts → ProxyModel
//!     ↓
//!  [render]           ProxyModel → source text
//!     ↓
//!  [driver]           artifacts keyed {StructName}.g.rs + diagnostics
//! ```
//!
//! # Usage
//!
//! From a build script or tool:
//!
//! ```rust,no_run
//! use hubwire_codegen::{CompilationUnit, Generator, RenderOptions, write_artifacts};
//! use std::path::Path;
//!
//! let unit = CompilationUnit::from_dir(Path::new("src")).unwrap();
//! let outcome = Generator::new(RenderOptions::default()).run(&unit);
//! write_artifacts(&outcome.artifacts, Path::new("generated")).unwrap();
//! ```
//!
//! Re-running over unchanged input is cheap: [`Generator::run_incremental`]
//! compares freshly built [`ProxyModel`]s against a [`GenerationCache`] by
//! structural equality and skips rendering for unchanged models.

pub mod builder;
pub mod driver;
pub mod error;
pub mod extract;
pub mod imports;
pub mod model;
pub mod render;

pub use builder::ProxyDeclaration;
pub use driver::{
    CompilationUnit, Diagnostic, GenerationCache, GenerationOutcome, Generator, Severity,
    write_artifacts,
};
pub use error::{CodegenError, CodegenResult};
pub use model::{
    Accessibility, GeneratedArtifact, ImportSet, Operation, OperationSet, Parameter, ProxyModel,
    TypeRef,
};
pub use render::{RenderOptions, render};
