//! Source rendering for proxy models.
//!
//! Turns a [`ProxyModel`] into the text of one generated file: the proxy
//! struct with its `send`/`invoke`/`on` roles, optionally preceded by
//! capability traits the roles implement. Rendering is deterministic:
//! identical models produce byte-identical output, which is what lets the
//! driver skip unchanged models by structural equality alone.
//!
//! The wire identifier for every call and registration is the contract
//! method name verbatim. Server and client agree by sharing the contract,
//! so no alias is ever generated.

use crate::model::{Operation, ProxyModel};

/// Renderer configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit per-proxy capability traits (`{Name}Send`, `{Name}Invoke`,
    /// `{Name}Listen`) and implement the role types against them instead of
    /// giving the roles inherent methods. Trades direct access for
    /// substitutability in tests.
    pub emit_capability_interfaces: bool,
}

/// Which connection primitive a server-facing role calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    /// Fire-and-forget delivery.
    Send,
    /// Awaits server acknowledgment before resolving.
    Invoke,
}

impl CallKind {
    fn primitive(self) -> &'static str {
        match self {
            CallKind::Send => "send",
            CallKind::Invoke => "invoke",
        }
    }
}

/// How a method is being emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MethodForm {
    /// Inherent method on a role struct (`pub`, with body).
    Inherent,
    /// Declaration inside a capability trait (no `pub`, no body).
    TraitDecl,
    /// Implementation inside a trait impl block (no `pub`, with body).
    TraitImpl,
}

/// Render a proxy model to source text.
pub fn render(model: &ProxyModel, options: &RenderOptions) -> String {
    let mut w = SourceWriter::new();

    w.line("// @generated by hubwire. Do not edit.");
    w.blank();

    let modules: Vec<&str> = match &model.module_path {
        Some(path) => path.split("::").collect(),
        None => Vec::new(),
    };
    for module in &modules {
        w.open(&format!("pub mod {module}"));
    }

    render_imports(&mut w, model);
    w.blank();
    render_proxy_struct(&mut w, model);

    if options.emit_capability_interfaces {
        w.blank();
        render_capability_traits(&mut w, model);
    }

    w.blank();
    render_role(&mut w, model, Role::Sender, options);
    w.blank();
    render_role(&mut w, model, Role::Invoker, options);
    w.blank();
    render_role(&mut w, model, Role::Listener, options);

    for _ in &modules {
        w.close();
    }

    w.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Sender,
    Invoker,
    Listener,
}

impl Role {
    fn struct_suffix(self) -> &'static str {
        match self {
            Role::Sender => "Sender",
            Role::Invoker => "Invoker",
            Role::Listener => "Listener",
        }
    }

    fn trait_suffix(self) -> &'static str {
        match self {
            Role::Sender => "Send",
            Role::Invoker => "Invoke",
            Role::Listener => "Listen",
        }
    }
}

/// The connection-library names the generated text actually uses, in the
/// order rustfmt would keep them. Unused names are omitted so the artifact
/// compiles warning-free under strict lints.
fn required_names(model: &ProxyModel) -> Vec<&'static str> {
    let has_server_ops = !model.server_ops.is_empty();
    let has_client_ops = !model.client_ops.is_empty();
    let server_params = model
        .server_ops
        .operations
        .iter()
        .any(|op| !op.params.is_empty());
    let client_params = model
        .client_ops
        .operations
        .iter()
        .any(|op| !op.params.is_empty());

    let mut names = Vec::new();
    if has_server_ops {
        names.push("CancelToken");
    }
    names.push("HubConnection");
    if has_server_ops {
        names.push("HubError");
    }
    if has_client_ops {
        names.push("Subscription");
    }
    if has_server_ops || has_client_ops {
        names.push("WireArgs");
    }
    if has_client_ops {
        names.push("arity_mismatch");
    }
    if client_params {
        names.push("from_arg");
        names.push("invalid_payload");
    }
    if server_params {
        names.push("to_arg");
    }
    names
}

fn render_imports(w: &mut SourceWriter, model: &ProxyModel) {
    for path in model.imports.iter() {
        w.line(&format!("use {path};"));
    }
    w.line(&format!(
        "use hubwire_client::{{{}}};",
        required_names(model).join(", ")
    ));
}

fn render_proxy_struct(w: &mut SourceWriter, model: &ProxyModel) {
    let vis = model.accessibility.render();
    let name = &model.struct_name;

    w.open(&format!("{vis}struct {name}"));
    w.line(&format!("pub send: {name}Sender,"));
    w.line(&format!("pub invoke: {name}Invoker,"));
    w.line(&format!("pub on: {name}Listener,"));
    w.close();
    w.blank();

    w.open(&format!("impl {name}"));
    w.open("pub fn new(connection: std::sync::Arc<HubConnection>) -> Self");
    w.open("Self");
    w.line(&format!("send: {name}Sender {{ conn: connection.clone() }},"));
    w.line(&format!("invoke: {name}Invoker {{ conn: connection.clone() }},"));
    w.line(&format!("on: {name}Listener {{ conn: connection }},"));
    w.close();
    w.close();
    w.close();
}

fn render_capability_traits(w: &mut SourceWriter, model: &ProxyModel) {
    let vis = model.accessibility.render();
    let name = &model.struct_name;

    w.line("#[allow(async_fn_in_trait)]");
    w.open(&format!("{vis}trait {name}Send"));
    for op in &model.server_ops.operations {
        render_call_method(w, op, CallKind::Send, MethodForm::TraitDecl);
    }
    w.close();
    w.blank();

    w.line("#[allow(async_fn_in_trait)]");
    w.open(&format!("{vis}trait {name}Invoke"));
    for op in &model.server_ops.operations {
        render_call_method(w, op, CallKind::Invoke, MethodForm::TraitDecl);
    }
    w.close();
    w.blank();

    w.open(&format!("{vis}trait {name}Listen"));
    for op in &model.client_ops.operations {
        render_listener_method(w, op, MethodForm::TraitDecl);
    }
    w.close();
}

fn render_role(w: &mut SourceWriter, model: &ProxyModel, role: Role, options: &RenderOptions) {
    let vis = model.accessibility.render();
    let name = &model.struct_name;
    let struct_name = format!("{name}{}", role.struct_suffix());

    w.open(&format!("{vis}struct {struct_name}"));
    w.line("conn: std::sync::Arc<HubConnection>,");
    w.close();

    let (header, form) = if options.emit_capability_interfaces {
        (
            format!("impl {name}{} for {struct_name}", role.trait_suffix()),
            MethodForm::TraitImpl,
        )
    } else {
        (format!("impl {struct_name}"), MethodForm::Inherent)
    };

    let has_operations = match role {
        Role::Sender | Role::Invoker => !model.server_ops.is_empty(),
        Role::Listener => !model.client_ops.is_empty(),
    };
    // An operation-less role still gets its impl block in the trait variant
    // so the capability trait is satisfied; the inherent variant drops the
    // empty block entirely.
    if !has_operations && form == MethodForm::Inherent {
        return;
    }

    w.blank();
    w.open(&header);
    match role {
        Role::Sender => {
            for op in &model.server_ops.operations {
                render_call_method(w, op, CallKind::Send, form);
            }
        }
        Role::Invoker => {
            for op in &model.server_ops.operations {
                render_call_method(w, op, CallKind::Invoke, form);
            }
        }
        Role::Listener => {
            for op in &model.client_ops.operations {
                render_listener_method(w, op, form);
            }
        }
    }
    w.close();
}

/// Render one Sender/Invoker method. Both roles share this template; the
/// only difference is which connection primitive the body calls.
fn render_call_method(w: &mut SourceWriter, op: &Operation, kind: CallKind, form: MethodForm) {
    let vis = if form == MethodForm::Inherent { "pub " } else { "" };
    let mut params = String::new();
    for p in &op.params {
        params.push_str(&format!("{}: {}, ", p.name, p.ty.display));
    }

    let signature = format!(
        "{vis}async fn {}(&self, {params}cancel: CancelToken) -> Result<(), HubError>",
        op.name
    );

    if form == MethodForm::TraitDecl {
        w.line(&format!("{signature};"));
        return;
    }

    w.open(&signature);
    if op.params.is_empty() {
        w.line("let args: WireArgs = Vec::new();");
    } else {
        let values: Vec<String> = op
            .params
            .iter()
            .map(|p| format!("to_arg(&{})?", p.name))
            .collect();
        w.line(&format!("let args: WireArgs = vec![{}];", values.join(", ")));
    }
    w.line(&format!(
        "self.conn.{}(\"{}\", args, cancel).await",
        kind.primitive(),
        op.name
    ));
    w.close();
}

/// Render one Listener registration method: adapts a typed handler to the
/// raw connection callback (arity check, positional deserialization) and
/// registers it under the verbatim operation name.
fn render_listener_method(w: &mut SourceWriter, op: &Operation, form: MethodForm) {
    let vis = if form == MethodForm::Inherent { "pub " } else { "" };
    let handler_args: Vec<&str> = op.params.iter().map(|p| p.ty.display.as_str()).collect();

    w.line(&format!(
        "{vis}fn {}<H, Fut>(&self, handler: H) -> Subscription",
        op.name
    ));
    w.line("where");
    w.indented(&format!(
        "H: Fn({}) -> Fut + Send + Sync + 'static,",
        handler_args.join(", ")
    ));
    let last_bound = "Fut: std::future::Future<Output = ()> + Send + 'static";
    if form == MethodForm::TraitDecl {
        w.indented(&format!("{last_bound};"));
        return;
    }
    w.indented(&format!("{last_bound},"));

    w.open("");
    let args_pat = if op.params.is_empty() { "args" } else { "mut args" };
    w.open(&format!(
        "self.conn.on(\"{}\", std::sync::Arc::new(move |{args_pat}: WireArgs|",
        op.name
    ));
    if op.params.is_empty() {
        w.open("if !args.is_empty()");
        w.line(&format!(
            "return arity_mismatch(\"{}\", 0, args.len());",
            op.name
        ));
        w.close();
    } else {
        w.open(&format!("if args.len() != {}", op.params.len()));
        w.line(&format!(
            "return arity_mismatch(\"{}\", {}, args.len());",
            op.name,
            op.params.len()
        ));
        w.close();
        for p in &op.params {
            w.open(&format!(
                "let {}: {} = match from_arg(args.remove(0))",
                p.name, p.ty.display
            ));
            w.line("Ok(value) => value,");
            w.line(&format!(
                "Err(err) => return invalid_payload(\"{}\", &err),",
                op.name
            ));
            w.close_as("};");
        }
    }
    let call_args: Vec<&str> = op.params.iter().map(|p| p.name.as_str()).collect();
    w.line(&format!("Box::pin(handler({}))", call_args.join(", ")));
    w.close_as("}))");
    w.close();
}

/// Indentation-aware text builder.
///
/// Keeps formatting concerns (indent width, brace placement) out of the
/// semantic rendering code so they can be tested on their own.
struct SourceWriter {
    out: String,
    indent: usize,
}

impl SourceWriter {
    const INDENT: &'static str = "    ";

    fn new() -> Self {
        Self { out: String::new(), indent: 0 }
    }

    /// Write one indented line. An empty string writes a blank line.
    fn line(&mut self, text: &str) {
        if text.is_empty() {
            self.out.push('\n');
            return;
        }
        for _ in 0..self.indent {
            self.out.push_str(Self::INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Write one line at one extra indent level, without opening a block.
    fn indented(&mut self, text: &str) {
        self.indent += 1;
        self.line(text);
        self.indent -= 1;
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Open a block: `header {` (or a bare `{` for an empty header).
    fn open(&mut self, header: &str) {
        if header.is_empty() {
            self.line("{");
        } else {
            self.line(&format!("{header} {{"));
        }
        self.indent += 1;
    }

    /// Close the current block with `}`.
    fn close(&mut self) {
        self.indent -= 1;
        self.line("}");
    }

    /// Close the current block with custom text, e.g. `};` or `}))`.
    fn close_as(&mut self, text: &str) {
        self.indent -= 1;
        self.line(text);
    }

    fn finish(self) -> String {
        self.out
    }
}
