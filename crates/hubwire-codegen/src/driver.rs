//! Generation driver.
//!
//! Orchestrates one pass: scan a compilation unit for annotated proxy
//! declarations, build one [`ProxyModel`] per qualifying declaration, render
//! it, and publish one artifact per model under a deterministic file name.
//!
//! Failures are local to one declaration. A malformed declaration produces a
//! [`Diagnostic`] in the outcome and never aborts generation for the others
//! in the same pass.

use std::collections::HashMap;
use std::path::Path;

use syn::{Fields, Item, Visibility};
use tracing::{debug, info, warn};

use crate::builder::{self, ProxyDeclaration};
use crate::error::{CodegenError, CodegenResult};
use crate::model::{Accessibility, GeneratedArtifact, ProxyModel};
use crate::render::{RenderOptions, render};

/// Marker attribute naming the hub (server-invokable) contract.
const INVOKER_MARKER: &str = "hub_invoker";
/// Marker attribute naming the client-notification contract.
const LISTENER_MARKER: &str = "hub_listener";
/// Optional send-capability marker; tolerated metadata, no output shape.
const SENDER_MARKER: &str = "hub_sender";

/// Severity of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A per-declaration problem surfaced by the driver.
///
/// The source design skipped invalid declarations silently; reporting them
/// is the deliberate departure here, so callers can distinguish "nothing to
/// generate" from "declaration rejected".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// The declaration (or file) the problem belongs to.
    pub declaration: String,
    pub message: String,
}

impl Diagnostic {
    fn error(declaration: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            declaration: declaration.into(),
            message: message.into(),
        }
    }
}

/// A parsed source file within a compilation unit.
#[derive(Debug, Clone)]
struct SourceFile {
    name: String,
    file: syn::File,
}

/// The input to one generation pass: every parsed source file.
#[derive(Debug, Clone, Default)]
pub struct CompilationUnit {
    files: Vec<SourceFile>,
    /// Files that failed to parse; reported with the pass outcome.
    parse_diagnostics: Vec<Diagnostic>,
}

impl CompilationUnit {
    /// Build a unit from in-memory `(name, source)` pairs.
    pub fn from_sources<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let mut unit = Self::default();
        for (name, source) in sources {
            unit.add_source(name.into(), &source.into());
        }
        unit
    }

    /// Build a unit from every `.rs` file under `root`, recursively.
    ///
    /// Files are visited in sorted path order so the pass is deterministic.
    /// Unreadable directories are hard errors; unparseable files become
    /// diagnostics and do not stop the other files from processing.
    pub fn from_dir(root: &Path) -> CodegenResult<Self> {
        let mut paths = Vec::new();
        collect_rust_files(root, &mut paths)?;
        paths.sort();

        let mut unit = Self::default();
        for path in paths {
            let source = std::fs::read_to_string(&path).map_err(|source| CodegenError::Io {
                path: path.display().to_string(),
                source,
            })?;
            unit.add_source(path.display().to_string(), &source);
        }
        Ok(unit)
    }

    fn add_source(&mut self, name: String, source: &str) {
        match syn::parse_file(source) {
            Ok(file) => self.files.push(SourceFile { name, file }),
            Err(err) => {
                self.parse_diagnostics
                    .push(Diagnostic::error(name, format!("failed to parse: {err}")));
            }
        }
    }

    /// Number of successfully parsed files.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

fn collect_rust_files(dir: &Path, out: &mut Vec<std::path::PathBuf>) -> CodegenResult<()> {
    let entries = std::fs::read_dir(dir).map_err(|source| CodegenError::Io {
        path: dir.display().to_string(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| CodegenError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_rust_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            out.push(path);
        }
    }
    Ok(())
}

/// Result of one generation pass.
#[derive(Debug, Clone, Default)]
pub struct GenerationOutcome {
    /// One artifact per qualifying declaration, in scan order.
    pub artifacts: Vec<GeneratedArtifact>,

    /// Problems encountered; none of them aborted the pass.
    pub diagnostics: Vec<Diagnostic>,
}

impl GenerationOutcome {
    /// Whether any error-severity diagnostic was produced.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

/// Cache of the models published by a previous pass, keyed by artifact file
/// name. Structural model equality is the re-render gate.
#[derive(Debug, Clone, Default)]
pub struct GenerationCache {
    models: HashMap<String, ProxyModel>,
}

impl GenerationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// The orchestration entry point.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    options: RenderOptions,
}

impl Generator {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Run one full pass: every qualifying declaration is rendered.
    pub fn run(&self, unit: &CompilationUnit) -> GenerationOutcome {
        let (models, diagnostics) = self.collect_models(unit);

        let mut artifacts = Vec::new();
        for model in &models {
            artifacts.push(GeneratedArtifact {
                file_name: model.file_name(),
                source_text: render(model, &self.options),
            });
        }

        for diagnostic in &diagnostics {
            warn!(
                declaration = %diagnostic.declaration,
                "{}", diagnostic.message
            );
        }
        info!(
            artifacts = artifacts.len(),
            diagnostics = diagnostics.len(),
            "generation pass complete"
        );

        GenerationOutcome { artifacts, diagnostics }
    }

    /// Run a pass against a cache from the previous one: declarations whose
    /// model is structurally unchanged publish no artifact.
    pub fn run_incremental(
        &self,
        unit: &CompilationUnit,
        cache: &mut GenerationCache,
    ) -> GenerationOutcome {
        let (models, diagnostics) = self.collect_models(unit);

        let mut artifacts = Vec::new();
        for model in models {
            let file_name = model.file_name();
            if cache.models.get(&file_name) == Some(&model) {
                debug!(artifact = %file_name, "model unchanged, skipping render");
                continue;
            }
            artifacts.push(GeneratedArtifact {
                file_name: file_name.clone(),
                source_text: render(&model, &self.options),
            });
            cache.models.insert(file_name, model);
        }

        GenerationOutcome { artifacts, diagnostics }
    }

    /// Scan the unit and build one model per qualifying declaration.
    fn collect_models(&self, unit: &CompilationUnit) -> (Vec<ProxyModel>, Vec<Diagnostic>) {
        let mut diagnostics = unit.parse_diagnostics.clone();

        let mut traits: HashMap<String, Vec<syn::ItemTrait>> = HashMap::new();
        let mut candidates = Vec::new();
        for file in &unit.files {
            debug!(file = %file.name, "scanning");
            scan_items(&file.file.items, &mut Vec::new(), &mut traits, &mut candidates);
        }

        let mut models = Vec::new();
        let mut published = std::collections::HashSet::new();
        for candidate in candidates {
            match self.evaluate(&candidate, &traits) {
                Ok(model) => {
                    if !published.insert(model.file_name()) {
                        diagnostics.push(Diagnostic::error(
                            candidate.struct_name.clone(),
                            format!(
                                "artifact name {} already published by another declaration",
                                model.file_name()
                            ),
                        ));
                        continue;
                    }
                    models.push(model);
                }
                Err(diagnostic) => diagnostics.push(diagnostic),
            }
        }

        (models, diagnostics)
    }

    /// Apply the validity predicate and build the model for one candidate.
    fn evaluate(
        &self,
        candidate: &Candidate,
        traits: &HashMap<String, Vec<syn::ItemTrait>>,
    ) -> Result<ProxyModel, Diagnostic> {
        let name = &candidate.struct_name;

        let (hub_contract, client_contract) =
            match (&candidate.invoker_arg, &candidate.listener_arg) {
                (Some(hub), Some(client)) => (hub.clone(), client.clone()),
                (None, _) => {
                    return Err(Diagnostic::error(
                        name.clone(),
                        "declaration carries hubwire markers but is missing #[hub_invoker(...)]",
                    ));
                }
                (_, None) => {
                    return Err(Diagnostic::error(
                        name.clone(),
                        "declaration carries hubwire markers but is missing #[hub_listener(...)]",
                    ));
                }
            };

        if !candidate.is_unit {
            return Err(Diagnostic::error(
                name.clone(),
                "proxy declarations must be unit structs; the generated file supplies the body",
            ));
        }

        let hub = resolve_contract(&hub_contract, traits).map_err(|e| diag_for(name, &e))?;
        let client =
            resolve_contract(&client_contract, traits).map_err(|e| diag_for(name, &e))?;

        let declaration = ProxyDeclaration {
            struct_name: name.clone(),
            module_path: candidate.module_path.clone(),
            accessibility: candidate.accessibility,
            hub_contract,
            client_contract,
        };

        builder::build(&declaration, &hub, &client).map_err(|err| diag_for(name, &err))
    }
}

fn diag_for(declaration: &str, err: &CodegenError) -> Diagnostic {
    Diagnostic::error(declaration, err.to_string())
}

fn resolve_contract(
    name: &str,
    traits: &HashMap<String, Vec<syn::ItemTrait>>,
) -> CodegenResult<syn::ItemTrait> {
    match traits.get(name).map(Vec::as_slice) {
        None | Some([]) => Err(CodegenError::ContractNotFound { name: name.to_string() }),
        Some([item]) => Ok(item.clone()),
        Some(_) => Err(CodegenError::AmbiguousContract { name: name.to_string() }),
    }
}

/// A struct declaration carrying at least one hubwire marker.
#[derive(Debug, Clone)]
struct Candidate {
    struct_name: String,
    module_path: Option<String>,
    accessibility: Accessibility,
    is_unit: bool,
    invoker_arg: Option<String>,
    listener_arg: Option<String>,
}

fn scan_items(
    items: &[Item],
    module_stack: &mut Vec<String>,
    traits: &mut HashMap<String, Vec<syn::ItemTrait>>,
    candidates: &mut Vec<Candidate>,
) {
    for item in items {
        match item {
            Item::Trait(item_trait) => {
                traits
                    .entry(item_trait.ident.to_string())
                    .or_default()
                    .push(item_trait.clone());
            }
            Item::Struct(item_struct) => {
                if let Some(candidate) = candidate_from_struct(item_struct, module_stack) {
                    candidates.push(candidate);
                }
            }
            Item::Mod(item_mod) => {
                if let Some((_, nested)) = &item_mod.content {
                    module_stack.push(item_mod.ident.to_string());
                    scan_items(nested, module_stack, traits, candidates);
                    module_stack.pop();
                }
            }
            _ => {}
        }
    }
}

fn candidate_from_struct(
    item: &syn::ItemStruct,
    module_stack: &[String],
) -> Option<Candidate> {
    let mut invoker_arg = None;
    let mut listener_arg = None;
    let mut has_marker = false;

    for attr in &item.attrs {
        let Some(segment) = attr.path().segments.last() else { continue };
        let marker = segment.ident.to_string();
        match marker.as_str() {
            INVOKER_MARKER | LISTENER_MARKER | SENDER_MARKER => {
                has_marker = true;
                // A malformed argument still marks the struct as a
                // candidate so the problem surfaces as a diagnostic
                // instead of quietly failing discovery.
                let arg = attr
                    .parse_args::<syn::Path>()
                    .ok()
                    .and_then(|path| path.segments.last().map(|s| s.ident.to_string()));
                match marker.as_str() {
                    INVOKER_MARKER => invoker_arg = arg,
                    LISTENER_MARKER => listener_arg = arg,
                    _ => {}
                }
            }
            _ => {}
        }
    }

    if !has_marker {
        return None;
    }

    let accessibility = match &item.vis {
        Visibility::Public(_) => Accessibility::Public,
        _ => Accessibility::Crate,
    };

    Some(Candidate {
        struct_name: item.ident.to_string(),
        module_path: if module_stack.is_empty() {
            None
        } else {
            Some(module_stack.join("::"))
        },
        accessibility,
        is_unit: matches!(item.fields, Fields::Unit),
        invoker_arg,
        listener_arg,
    })
}

/// Write artifacts into `dir`, creating it if needed.
pub fn write_artifacts(artifacts: &[GeneratedArtifact], dir: &Path) -> CodegenResult<()> {
    std::fs::create_dir_all(dir).map_err(|source| CodegenError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    for artifact in artifacts {
        let path = dir.join(&artifact.file_name);
        std::fs::write(&path, &artifact.source_text).map_err(|source| CodegenError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "artifact written");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    #![allow(clippy::unwrap_used)]

    use super::*;
    use test_case::test_case;

    const CONTRACTS: &str = r"
        pub trait ChatHub {
            async fn send_message(&self, message: String);
        }

        pub trait ChatClient {
            async fn receive_message(&self, message: String);
        }
    ";

    fn unit_with(declaration: &str) -> CompilationUnit {
        CompilationUnit::from_sources(vec![
            ("contracts.rs".to_string(), CONTRACTS.to_string()),
            ("proxies.rs".to_string(), declaration.to_string()),
        ])
    }

    fn chat_proxy_unit() -> CompilationUnit {
        unit_with(
            r"
            #[hub_invoker(ChatHub)]
            #[hub_listener(ChatClient)]
            pub struct ChatProxy;
            ",
        )
    }

    #[test]
    fn run___qualifying_declaration___publishes_one_artifact() {
        let outcome = Generator::default().run(&chat_proxy_unit());

        assert_eq!(outcome.artifacts.len(), 1);
        assert_eq!(outcome.artifacts[0].file_name, "ChatProxy.g.rs");
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn run___two_runs___are_byte_identical() {
        let generator = Generator::default();

        let first = generator.run(&chat_proxy_unit());
        let second = generator.run(&chat_proxy_unit());

        assert_eq!(
            first.artifacts[0].source_text,
            second.artifacts[0].source_text
        );
    }

    #[test]
    fn run___missing_listener_marker___reports_diagnostic() {
        let outcome = Generator::default().run(&unit_with(
            r"
            #[hub_invoker(ChatHub)]
            pub struct ChatProxy;
            ",
        ));

        assert!(outcome.artifacts.is_empty());
        assert!(outcome.has_errors());
        assert!(outcome.diagnostics[0].message.contains("hub_listener"));
    }

    #[test]
    fn run___sender_marker_alone___reports_missing_required_markers() {
        let outcome = Generator::default().run(&unit_with(
            r"
            #[hub_sender(ChatHub)]
            pub struct ChatProxy;
            ",
        ));

        assert!(outcome.artifacts.is_empty());
        assert!(outcome.has_errors());
    }

    #[test]
    fn run___sender_marker_alongside_required_markers___is_tolerated() {
        let outcome = Generator::default().run(&unit_with(
            r"
            #[hub_sender(ChatHub)]
            #[hub_invoker(ChatHub)]
            #[hub_listener(ChatClient)]
            pub struct ChatProxy;
            ",
        ));

        assert_eq!(outcome.artifacts.len(), 1);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn run___qualified_marker_paths___are_recognized() {
        let outcome = Generator::default().run(&unit_with(
            r"
            #[hubwire::hub_invoker(ChatHub)]
            #[hubwire::hub_listener(ChatClient)]
            pub struct ChatProxy;
            ",
        ));

        assert_eq!(outcome.artifacts.len(), 1);
    }

    #[test]
    fn run___non_unit_struct___reports_diagnostic() {
        let outcome = Generator::default().run(&unit_with(
            r"
            #[hub_invoker(ChatHub)]
            #[hub_listener(ChatClient)]
            pub struct ChatProxy {
                extra: u32,
            }
            ",
        ));

        assert!(outcome.artifacts.is_empty());
        assert!(outcome.diagnostics[0].message.contains("unit structs"));
    }

    #[test]
    fn run___unknown_contract___reports_diagnostic() {
        let outcome = Generator::default().run(&unit_with(
            r"
            #[hub_invoker(MissingHub)]
            #[hub_listener(ChatClient)]
            pub struct ChatProxy;
            ",
        ));

        assert!(outcome.artifacts.is_empty());
        assert!(outcome.diagnostics[0].message.contains("contract not found"));
    }

    #[test]
    fn run___ambiguous_contract___reports_diagnostic() {
        let unit = CompilationUnit::from_sources(vec![
            ("a.rs", "pub trait ChatHub { async fn ping(&self); }"),
            ("b.rs", "pub trait ChatHub { async fn pong(&self); }"),
            ("c.rs", "pub trait ChatClient {}"),
            (
                "proxies.rs",
                "#[hub_invoker(ChatHub)]\n#[hub_listener(ChatClient)]\npub struct ChatProxy;",
            ),
        ]);

        let outcome = Generator::default().run(&unit);

        assert!(outcome.artifacts.is_empty());
        assert!(outcome.diagnostics[0].message.contains("ambiguous"));
    }

    #[test]
    fn run___one_malformed_declaration___does_not_abort_others() {
        let unit = CompilationUnit::from_sources(vec![
            ("contracts.rs", CONTRACTS),
            (
                "proxies.rs",
                r"
                #[hub_invoker(MissingHub)]
                #[hub_listener(ChatClient)]
                pub struct BrokenProxy;

                #[hub_invoker(ChatHub)]
                #[hub_listener(ChatClient)]
                pub struct ChatProxy;
                ",
            ),
        ]);

        let outcome = Generator::default().run(&unit);

        assert_eq!(outcome.artifacts.len(), 1);
        assert_eq!(outcome.artifacts[0].file_name, "ChatProxy.g.rs");
        assert!(outcome.has_errors());
    }

    #[test]
    fn run___unparseable_file___reports_diagnostic_and_continues() {
        let unit = CompilationUnit::from_sources(vec![
            ("contracts.rs", CONTRACTS),
            ("broken.rs", "pub struct {{{"),
            (
                "proxies.rs",
                "#[hub_invoker(ChatHub)]\n#[hub_listener(ChatClient)]\npub struct ChatProxy;",
            ),
        ]);

        let outcome = Generator::default().run(&unit);

        assert_eq!(outcome.artifacts.len(), 1);
        assert!(outcome.has_errors());
        assert!(outcome.diagnostics[0].declaration.contains("broken.rs"));
    }

    #[test]
    fn run___module_nested_declaration___records_module_path() {
        let unit = CompilationUnit::from_sources(vec![
            ("contracts.rs", CONTRACTS),
            (
                "proxies.rs",
                r"
                mod chat {
                    #[hub_invoker(ChatHub)]
                    #[hub_listener(ChatClient)]
                    pub struct ChatProxy;
                }
                ",
            ),
        ]);

        let outcome = Generator::default().run(&unit);

        assert!(outcome.artifacts[0].source_text.contains("pub mod chat {"));
    }

    #[test]
    fn run___duplicate_artifact_names___second_is_rejected() {
        let unit = CompilationUnit::from_sources(vec![
            ("contracts.rs", CONTRACTS),
            (
                "proxies.rs",
                r"
                mod a {
                    #[hub_invoker(ChatHub)]
                    #[hub_listener(ChatClient)]
                    pub struct ChatProxy;
                }
                mod b {
                    #[hub_invoker(ChatHub)]
                    #[hub_listener(ChatClient)]
                    pub struct ChatProxy;
                }
                ",
            ),
        ]);

        let outcome = Generator::default().run(&unit);

        assert_eq!(outcome.artifacts.len(), 1);
        assert!(outcome.has_errors());
    }

    #[test_case("pub struct ChatProxy;", "pub struct ChatProxy {" ; "public declaration stays public")]
    #[test_case("struct ChatProxy;", "pub(crate) struct ChatProxy {" ; "private declaration becomes crate visible")]
    #[test_case("pub(crate) struct ChatProxy;", "pub(crate) struct ChatProxy {" ; "crate declaration stays crate visible")]
    fn run___accessibility___follows_declaration(decl: &str, expected: &str) {
        let outcome = Generator::default().run(&unit_with(&format!(
            "#[hub_invoker(ChatHub)]\n#[hub_listener(ChatClient)]\n{decl}"
        )));

        assert!(outcome.artifacts[0].source_text.contains(expected));
    }

    #[test]
    fn run_incremental___unchanged_unit___publishes_nothing() {
        let generator = Generator::default();
        let mut cache = GenerationCache::new();

        let first = generator.run_incremental(&chat_proxy_unit(), &mut cache);
        let second = generator.run_incremental(&chat_proxy_unit(), &mut cache);

        assert_eq!(first.artifacts.len(), 1);
        assert!(second.artifacts.is_empty());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn run_incremental___changed_contract___republishes() {
        let generator = Generator::default();
        let mut cache = GenerationCache::new();

        generator.run_incremental(&chat_proxy_unit(), &mut cache);

        let changed = CompilationUnit::from_sources(vec![
            (
                "contracts.rs",
                r"
                pub trait ChatHub {
                    async fn send_message(&self, message: String, urgent: bool);
                }
                pub trait ChatClient {
                    async fn receive_message(&self, message: String);
                }
                ",
            ),
            (
                "proxies.rs",
                "#[hub_invoker(ChatHub)]\n#[hub_listener(ChatClient)]\npub struct ChatProxy;",
            ),
        ]);
        let outcome = generator.run_incremental(&changed, &mut cache);

        assert_eq!(outcome.artifacts.len(), 1);
        assert!(outcome.artifacts[0].source_text.contains("urgent: bool"));
    }

    #[test]
    fn run_incremental___reordered_irrelevant_items___still_skips() {
        let generator = Generator::default();
        let mut cache = GenerationCache::new();

        generator.run_incremental(&chat_proxy_unit(), &mut cache);

        // Same declarations, different surrounding file content.
        let reshuffled = CompilationUnit::from_sources(vec![
            ("zzz.rs", "pub fn unrelated() {}"),
            ("contracts.rs", CONTRACTS),
            (
                "proxies.rs",
                "#[hub_invoker(ChatHub)]\n#[hub_listener(ChatClient)]\npub struct ChatProxy;",
            ),
        ]);
        let outcome = generator.run_incremental(&reshuffled, &mut cache);

        assert!(outcome.artifacts.is_empty());
    }

    #[test]
    fn write_artifacts___persists_each_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = Generator::default().run(&chat_proxy_unit());

        write_artifacts(&outcome.artifacts, dir.path()).unwrap();

        let written = std::fs::read_to_string(dir.path().join("ChatProxy.g.rs")).unwrap();
        assert_eq!(written, outcome.artifacts[0].source_text);
    }

    #[test]
    fn from_dir___collects_nested_rust_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("contracts.rs"), CONTRACTS).unwrap();
        std::fs::write(
            dir.path().join("nested/proxies.rs"),
            "#[hub_invoker(ChatHub)]\n#[hub_listener(ChatClient)]\npub struct ChatProxy;",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not rust").unwrap();

        let unit = CompilationUnit::from_dir(dir.path()).unwrap();

        assert_eq!(unit.file_count(), 2);
        let outcome = Generator::default().run(&unit);
        assert_eq!(outcome.artifacts.len(), 1);
    }
}
