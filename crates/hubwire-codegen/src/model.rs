//! Intermediate representation for proxy generation.
//!
//! This module defines the data model the pipeline flows through: contract
//! operations extracted from trait declarations, the import set the generated
//! code needs, and the [`ProxyModel`] a renderer turns into source text.
//!
//! Every type here is immutable once built and holds no references into the
//! syntax tree it was extracted from. Structural equality (`PartialEq`/`Eq`/
//! `Hash`) covers every field, element-wise and order-sensitive for operation
//! sequences. It is the cache key for incremental regeneration, so any field
//! that affects rendered output participates in it.

use std::collections::BTreeSet;

/// A type as it appears in a generated signature.
///
/// `display` is the type with path prefixes stripped, recursively through
/// generic arguments (`chat::types::Message` becomes `Message`,
/// `Vec<chat::Message>` becomes `Vec<Message>`). `imports` lists the
/// fully-qualified paths the display form requires, in discovery order;
/// deduplication happens later in [`ImportSet`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    /// Simplified display form, e.g. `Vec<Message>`.
    pub display: String,

    /// Fully-qualified paths referenced by the display form.
    pub imports: Vec<String>,
}

impl TypeRef {
    /// A type with no import requirements.
    pub fn plain(display: impl Into<String>) -> Self {
        Self { display: display.into(), imports: Vec::new() }
    }

    /// The no-value sentinel (`()`).
    pub fn unit() -> Self {
        Self::plain("()")
    }

    /// Whether this is the no-value sentinel.
    pub fn is_unit(&self) -> bool {
        self.display == "()"
    }
}

/// One parameter of a contract operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    /// Parameter name as declared.
    pub name: String,

    /// Parameter type.
    pub ty: TypeRef,
}

/// One operation on a contract trait.
///
/// The name doubles as the wire identifier: it is used verbatim for send,
/// invoke, and listener registration, so server and client agree by sharing
/// the contract, not through a generated alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operation {
    /// Method name, non-empty.
    pub name: String,

    /// Parameters in declaration order, receiver excluded.
    pub params: Vec<Parameter>,

    /// Declared return type; `()` when the method declares none.
    pub ret: TypeRef,
}

/// Ordered operations extracted from one contract trait.
///
/// Order equals source declaration order; the extractor neither sorts nor
/// deduplicates. Empty sets are valid and render to operation-less roles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationSet {
    /// Name of the contract trait the set came from.
    pub contract: String,

    /// Operations in declaration order.
    pub operations: Vec<Operation>,
}

impl OperationSet {
    /// An empty set for the named contract.
    pub fn empty(contract: impl Into<String>) -> Self {
        Self { contract: contract.into(), operations: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }
}

/// Deduplicated set of use-paths required by generated signatures.
///
/// Backed by a `BTreeSet` so iteration (and therefore the rendered import
/// block) is sorted and independent of insertion order. Reproducible output
/// across runs depends on this, not cosmetics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ImportSet {
    paths: BTreeSet<String>,
}

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one fully-qualified path. Duplicates are absorbed.
    pub fn insert(&mut self, path: impl Into<String>) {
        self.paths.insert(path.into());
    }

    /// Union with another set.
    pub fn extend(&mut self, other: &ImportSet) {
        self.paths.extend(other.paths.iter().cloned());
    }

    /// Paths in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }
}

impl FromIterator<String> for ImportSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self { paths: iter.into_iter().collect() }
    }
}

/// Visibility of the generated proxy, read off the annotated declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessibility {
    /// `pub`
    Public,
    /// `pub(crate)`
    Crate,
}

impl Accessibility {
    /// The visibility qualifier as rendered, including a trailing space.
    pub fn render(self) -> &'static str {
        match self {
            Accessibility::Public => "pub ",
            Accessibility::Crate => "pub(crate) ",
        }
    }
}

/// The unit of generation: everything the renderer needs for one proxy.
///
/// Built once per annotated declaration per pass, rendered, then discarded.
/// Two models built from structurally identical sources compare equal even
/// when they came from distinct parses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProxyModel {
    /// Name of the generated proxy struct.
    pub struct_name: String,

    /// Module path of the declaration, `None` at crate root
    /// (e.g. `Some("room::admin")` for a doubly nested declaration).
    pub module_path: Option<String>,

    /// Visibility of the proxy and its role types.
    pub accessibility: Accessibility,

    /// Imports required by both operation sets combined.
    pub imports: ImportSet,

    /// Operations from the hub contract (server-invokable).
    pub server_ops: OperationSet,

    /// Operations from the client contract (server-to-client notifications).
    pub client_ops: OperationSet,
}

impl ProxyModel {
    /// Deterministic artifact file name for this model.
    pub fn file_name(&self) -> String {
        format!("{}.g.rs", self.struct_name)
    }
}

/// A rendered source unit ready for publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    /// File name, stable across runs for unchanged input.
    pub file_name: String,

    /// Complete generated source text.
    pub source_text: String,
}
