//! The in-memory model populated by the parser: the symbol table, the
//! target store, the build root, and the "current scope" slot that macro
//! expansion consults while a target block is open.

use indexmap::IndexMap;

use crate::error::{Error, Result, SemanticErrorKind};

/// User-defined `name -> value` bindings produced by `define ... as ...`.
///
/// Redefinition of an existing name is accepted (the DSL does not forbid
/// it) but never shadows the first binding: lookup always returns the
/// value recorded at first declaration. See DESIGN.md for why this
/// resolves the `add_define` open question from the distilled spec as
/// "first wins".
#[derive(Debug, Default)]
pub struct SymbolTable {
    defines: IndexMap<String, String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a definition. If `name` is already bound, the existing value
    /// is kept and this call is a no-op.
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.defines.entry(name.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.defines.get(name).map(String::as_str)
    }
}

/// One declared target: its dependency list and its command list, in
/// declaration order.
#[derive(Debug, Default, Clone)]
pub struct TargetEntry {
    pub name: String,
    pub deps: Vec<String>,
    pub commands: Vec<String>,
}

/// `name -> TargetEntry`, insertion-order preserved. Declaration order is
/// semantically significant: the first declared target is consulted when
/// picking defaults and target indices mirror declaration order.
#[derive(Debug, Default)]
pub struct TargetStore {
    targets: IndexMap<String, TargetEntry>,
}

impl TargetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new target. Fails if the name is already taken.
    pub fn add_target(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.targets.contains_key(&name) {
            return Err(Error::Semantic(SemanticErrorKind::DuplicateTarget(name)));
        }
        self.targets.insert(
            name.clone(),
            TargetEntry {
                name,
                deps: Vec::new(),
                commands: Vec::new(),
            },
        );
        Ok(())
    }

    pub fn append_dep(&mut self, target: &str, dep: impl Into<String>) {
        if let Some(entry) = self.targets.get_mut(target) {
            entry.deps.push(dep.into());
        }
    }

    pub fn append_command(&mut self, target: &str, command: impl Into<String>) {
        if let Some(entry) = self.targets.get_mut(target) {
            entry.commands.push(command.into());
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&TargetEntry> {
        self.targets.get(name)
    }

    pub fn deps(&self, name: &str) -> &[String] {
        self.targets
            .get(name)
            .map(|t| t.deps.as_slice())
            .unwrap_or(&[])
    }

    pub fn commands(&self, name: &str) -> &[String] {
        self.targets
            .get(name)
            .map(|t| t.commands.as_slice())
            .unwrap_or(&[])
    }
}

/// The single top-level target name, settable exactly once.
#[derive(Debug, Default)]
pub struct BuildRoot {
    name: Option<String>,
}

impl BuildRoot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if let Some(existing) = &self.name {
            return Err(Error::Semantic(SemanticErrorKind::DuplicateBuildTarget(
                existing.clone(),
            )));
        }
        self.name = Some(name);
        Ok(())
    }

    pub fn get(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// The whole model a parse run populates: symbol table, target store,
/// build root, and the scope macro expansion currently resolves against.
///
/// Bundled into one value (per the Design Notes' recommendation to avoid
/// process-wide globals), passed by mutable reference through parsing and
/// then consumed by the build engine.
#[derive(Debug, Default)]
pub struct Model {
    pub symbols: SymbolTable,
    pub targets: TargetStore,
    pub build_root: BuildRoot,
    /// Name of the target currently being parsed, if any.
    current_scope: Option<String>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_scope(&mut self, name: impl Into<String>) {
        self.current_scope = Some(name.into());
    }

    pub fn exit_scope(&mut self) {
        self.current_scope = None;
    }

    pub fn current_scope(&self) -> Option<&str> {
        self.current_scope.as_deref()
    }

    /// `target_name` with any trailing `.ext` removed (text up to the
    /// first `.`).
    pub fn target_basename(name: &str) -> &str {
        name.split('.').next().unwrap_or(name)
    }

    /// The extension: text after the first `.`, or empty if none.
    pub fn target_extension(name: &str) -> &str {
        match name.split_once('.') {
            Some((_, ext)) => ext,
            None => "",
        }
    }
}
