//! Source analysis for JSX visual editing.
//!
//! Resolves first-party module graphs and classifies every markup-embedded
//! expression by provenance: local or imported static values, component
//! props traced to their call sites, component state, computed values and
//! external names. Also answers whether a component renders dynamic markup
//! and whether a usage is portal-like.
//!
//! ```no_run
//! use vedit_analysis::{Analyzer, AnalyzerConfig};
//!
//! let mut analyzer = Analyzer::new(AnalyzerConfig::new("/path/to/frontend"));
//! let path = std::path::Path::new("/path/to/frontend/src/App.jsx");
//! if let Some(model) = analyzer.module(path) {
//!     for element in &model.elements {
//!         if let Some(expr) = element.expression_children().next() {
//!             let record = analyzer.classify_expression(&model, expr, &element.site);
//!             println!("{} line {}: {}", model.path.display(), element.line, record.kind());
//!         }
//!     }
//! }
//! ```

pub mod analyzer;
pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod provenance;
pub mod resolver;

pub use analyzer::{Analyzer, ExportInfo, PropKey, PropSource, is_portalish_name, is_slot_parent};
pub use cache::ModuleCache;
pub use config::{AnalyzerConfig, DEFAULT_MAX_DEPTH, MAX_FILE_SIZE, MaxDepth, ResolveResult};
pub use error::{AnalysisError, Result};
pub use model::{ModuleModel, lower_source};
pub use provenance::{ArrayContext, Provenance, SourceType, ValueType};
pub use resolver::ModuleResolver;
