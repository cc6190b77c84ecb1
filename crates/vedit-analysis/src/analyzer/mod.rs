//! The Source Analyzer.
//!
//! An [`Analyzer`] owns every cache of one analysis session: resolved
//! specifiers, parsed modules, prop sources recorded at call sites, and the
//! per-export classification, dynamic and portal flags. Recursive operations
//! thread explicit visited sets and a depth bound; running out of either
//! yields "untraceable" rather than an error.

mod classify;
mod dynamic;
mod portal;
mod trace;

pub use classify::STATE_HOOKS;
pub use portal::{OVERLAY_ROOTS, is_portalish_name, is_slot_parent};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;
use walkdir::WalkDir;

use crate::cache::ModuleCache;
use crate::config::{AnalyzerConfig, ResolveResult};
use crate::error::Result;
use crate::model::ModuleModel;
use crate::provenance::{ArrayContext, Provenance, ValueType};
use crate::resolver::ModuleResolver;

/// `(component file, component name, prop name)`
pub type PropKey = (PathBuf, String, String);

/// What a call site passed for one prop of an imported component.
#[derive(Debug, Clone, PartialEq)]
pub struct PropSource {
    pub source: Provenance,
    pub array_context: Option<ArrayContext>,
    pub from_file: PathBuf,
}

/// Initializer shape of an exported variable.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportInfo {
    /// File that actually declares the value (after following re-exports).
    pub file: PathBuf,
    /// Declarator name in that file.
    pub local_name: String,
    pub line: Option<u32>,
    pub value_type: Option<ValueType>,
    pub is_editable: bool,
}

type ExportKey = (PathBuf, String);

pub struct Analyzer {
    config: AnalyzerConfig,
    resolver: ModuleResolver,
    modules: ModuleCache,
    prop_sources: FxHashMap<PropKey, PropSource>,
    exports: FxHashMap<ExportKey, Option<ExportInfo>>,
    dynamic: FxHashMap<ExportKey, bool>,
    portals: FxHashMap<ExportKey, bool>,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            resolver: ModuleResolver::new(config.clone()),
            config,
            modules: ModuleCache::new(),
            prop_sources: FxHashMap::default(),
            exports: FxHashMap::default(),
            dynamic: FxHashMap::default(),
            portals: FxHashMap::default(),
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Resolve `specifier` from `from`, returning the file only for
    /// first-party modules that exist.
    pub fn resolve_module(&mut self, specifier: &str, from: &Path) -> Option<PathBuf> {
        self.resolver.resolve(specifier, from).into_local()
    }

    pub fn resolve(&mut self, specifier: &str, from: &Path) -> ResolveResult {
        self.resolver.resolve(specifier, from)
    }

    /// Cached model for a file on disk, loading it on first use.
    pub fn module(&mut self, path: &Path) -> Option<Arc<ModuleModel>> {
        self.modules.get_or_load(path)
    }

    /// Lower `source` as the current contents of `path` and cache it.
    pub fn analyze_source(&mut self, path: &Path, source: &str) -> Result<Arc<ModuleModel>> {
        self.modules.insert_source(path, source)
    }

    /// Drop everything derived from `path`.
    ///
    /// The parsed model goes, along with prop sources recorded from or for
    /// the file. Per-export flags are cleared wholesale since they may depend
    /// on the file transitively.
    pub fn invalidate(&mut self, path: &Path) {
        self.modules.invalidate(path);
        self.prop_sources
            .retain(|(component, _, _), source| component != path && source.from_file != path);
        self.exports.clear();
        self.dynamic.clear();
        self.portals.clear();
    }

    /// Recorded prop source for `(component file, component, prop)`.
    pub fn prop_source(&self, file: &Path, component: &str, prop: &str) -> Option<&PropSource> {
        self.prop_sources
            .get(&(file.to_path_buf(), component.to_string(), prop.to_string()))
    }

    /// Eagerly load every source file under the source root and record the
    /// prop sources of each component usage.
    ///
    /// Returns the number of modules indexed.
    pub fn index_project(&mut self) -> usize {
        let root = self.config.src_root.clone();
        let ignore = self.config.ignore_dirs.clone();
        let files: Vec<PathBuf> = WalkDir::new(&root)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !ignore.iter().any(|dir| entry.file_name() == dir.as_str())
            })
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| self.config.has_source_extension(path))
            .collect();

        let mut indexed = 0;
        for path in files {
            let Some(model) = self.modules.get_or_load(&path) else {
                continue;
            };
            indexed += 1;
            for (id, element) in model.elements.iter().enumerate() {
                if element.is_component() {
                    self.record_prop_sources(&model, id);
                }
            }
        }
        debug!(root = %root.display(), indexed, props = self.prop_sources.len(), "Indexed project");
        indexed
    }
}

/// Active prop traces, used to cut cycles and bound recursion.
#[derive(Debug, Default)]
pub(crate) struct TraceState {
    active: Vec<PropKey>,
}

impl TraceState {
    /// Maximum number of nested prop hops.
    const MAX_HOPS: usize = 16;

    /// Start tracing `key`; `false` when it is already being traced or the
    /// chain is too long.
    fn enter(&mut self, key: &PropKey) -> bool {
        if self.active.len() >= Self::MAX_HOPS || self.active.contains(key) {
            return false;
        }
        self.active.push(key.clone());
        true
    }

    fn exit(&mut self) {
        self.active.pop();
    }
}
