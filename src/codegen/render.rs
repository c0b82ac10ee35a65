//! Rendering of one contract module

use std::collections::BTreeSet;

use crate::domain::abi::{
    AbiType, ContractDescription, EventSpec, FunctionSpec, Mutability, ParamSpec,
    MAX_TUPLE_ARITY,
};
use crate::domain::GenerationError;

use super::naming::{
    item_name, overload_names, param_names, to_pascal_case, ACCESSOR_METHODS, SCOPE_NAMES,
};
use super::types::{event_field_type, rust_type, tuple_type, StructDef, StructRegistry};

/// Signatures longer than this are split one parameter per line
const MAX_LINE: usize = 100;

pub(crate) const HEADER: &str = "//! Autogenerated by abibind. Do not edit manually.";

/// Line-oriented source buffer
#[derive(Default)]
struct Source {
    out: String,
}

impl Source {
    fn line(&mut self, text: impl AsRef<str>) {
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    /// `{indent}{head}(params) {tail}` on one line, or one param per line
    fn signature(&mut self, indent: &str, head: &str, params: &[String], tail: &str) {
        let joined = params.join(", ");
        let single = format!("{indent}{head}({joined}){tail}");
        if single.len() <= MAX_LINE {
            self.line(single);
            return;
        }
        self.line(format!("{indent}{head}("));
        for param in params {
            self.line(format!("{indent}    {param},"));
        }
        self.line(format!("{indent}){tail}"));
    }
}

struct FunctionBinding<'a> {
    spec: &'a FunctionSpec,
    method: String,
    params: Vec<String>,
}

struct EventBinding<'a> {
    spec: &'a EventSpec,
    struct_name: String,
    method: String,
    fields: Vec<String>,
}

/// Everything needed to render one contract, with names resolved
pub(crate) struct ContractModule<'a> {
    desc: &'a ContractDescription,
    runtime_crate: &'a str,
    accessor: String,
    factory: String,
    structs: Vec<StructDef>,
    functions: Vec<FunctionBinding<'a>>,
    events: Vec<EventBinding<'a>>,
    ctor_params: Vec<String>,
}

impl<'a> ContractModule<'a> {
    /// Resolve names and types, rejecting anything that cannot be bound
    pub(crate) fn plan(
        desc: &'a ContractDescription,
        runtime_crate: &'a str,
    ) -> Result<Self, GenerationError> {
        let collision = |name: &str| GenerationError::NameCollision {
            contract: desc.name.clone(),
            name: name.to_string(),
        };

        let accessor = to_pascal_case(&desc.name);
        let factory = format!("{accessor}Factory");

        let mut registry = StructRegistry::default();
        let mut all_types: Vec<&AbiType> = Vec::new();
        for function in &desc.functions {
            all_types.extend(function.inputs.iter().map(|p| &p.ty));
            all_types.extend(function.outputs.iter().map(|p| &p.ty));
        }
        for event in &desc.events {
            all_types.extend(event.inputs.iter().map(|p| &p.ty));
        }
        if let Some(ctor) = &desc.constructor {
            all_types.extend(ctor.inputs.iter().map(|p| &p.ty));
        }
        for ty in all_types {
            registry
                .collect(ty)
                .map_err(|conflict| collision(&conflict.0))?;
        }
        let structs: Vec<StructDef> = registry.iter().cloned().collect();

        for function in &desc.functions {
            if function.outputs.len() > MAX_TUPLE_ARITY {
                return Err(GenerationError::UnsupportedType {
                    contract: desc.name.clone(),
                    location: format!("function `{}` outputs", function.signature),
                    reason: format!(
                        "{} return values (max {MAX_TUPLE_ARITY})",
                        function.outputs.len()
                    ),
                });
            }
        }

        let method_names = overload_names(desc.functions.iter().map(|f| f.name.as_str()));
        let functions: Vec<FunctionBinding> = desc
            .functions
            .iter()
            .zip(method_names)
            .map(|(spec, method)| {
                let method = if ACCESSOR_METHODS.contains(&method.as_str()) {
                    format!("{method}_call")
                } else {
                    method
                };
                FunctionBinding {
                    spec,
                    method,
                    params: param_names(spec.inputs.iter().map(|p| p.name.as_str()), &[]),
                }
            })
            .collect();

        let event_names = overload_names(desc.events.iter().map(|e| e.name.as_str()));
        let events: Vec<EventBinding> = desc
            .events
            .iter()
            .zip(event_names)
            .map(|(spec, base)| {
                let suffix = base
                    .strip_prefix(item_name(&spec.name).as_str())
                    .unwrap_or_default()
                    .trim_start_matches('_')
                    .to_string();
                EventBinding {
                    spec,
                    struct_name: format!("{}{}Event", to_pascal_case(&spec.name), suffix),
                    method: format!("{base}_filter"),
                    fields: param_names(spec.inputs.iter().map(|p| p.name.as_str()), &[]),
                }
            })
            .collect();

        let ctor_params = desc
            .constructor
            .as_ref()
            .map(|ctor| param_names(ctor.inputs.iter().map(|p| p.name.as_str()), &["overrides"]))
            .unwrap_or_default();

        let mut methods = BTreeSet::new();
        for method in functions
            .iter()
            .map(|f| &f.method)
            .chain(events.iter().map(|e| &e.method))
        {
            if !methods.insert(method.clone()) {
                return Err(collision(method));
            }
        }

        let mut types = BTreeSet::new();
        for name in [&accessor, &factory]
            .into_iter()
            .chain(structs.iter().map(|s| &s.name))
            .chain(events.iter().map(|e| &e.struct_name))
        {
            if SCOPE_NAMES.contains(&name.as_str()) || !types.insert(name.clone()) {
                return Err(collision(name));
            }
        }

        Ok(Self {
            desc,
            runtime_crate,
            accessor,
            factory,
            structs,
            functions,
            events,
            ctor_params,
        })
    }

    pub(crate) fn accessor(&self) -> &str {
        &self.accessor
    }

    pub(crate) fn factory(&self) -> &str {
        &self.factory
    }

    pub(crate) fn render(&self) -> String {
        let mut src = Source::default();
        self.render_preamble(&mut src);
        for def in &self.structs {
            render_struct(&mut src, def);
        }
        for event in &self.events {
            render_event(&mut src, event);
        }
        self.render_accessor(&mut src);
        self.render_factory(&mut src);
        src.out
    }

    fn render_preamble(&self, src: &mut Source) {
        src.line(HEADER);
        src.line("//!");
        src.line(format!("//! Bindings for the `{}` contract.", self.desc.name));
        src.line(
            "#![allow(clippy::all, dead_code, unused_imports, unused_mut, unused_variables)]",
        );
        src.blank();
        src.line("use std::sync::{Arc, OnceLock};");
        src.blank();
        src.line(format!("use {}::runtime::prelude::*;", self.runtime_crate));
        src.blank();

        let hashes = raw_string_hashes(&self.desc.abi_json);
        src.line("/// Contract ABI as JSON");
        src.line(format!(
            "pub const ABI_JSON: &str = r{hashes}\"{}\"{hashes};",
            self.desc.abi_json
        ));
        src.blank();

        let bytecode = self
            .desc
            .bytecode
            .as_ref()
            .map(|b| b.to_hex())
            .unwrap_or_else(|| "0x".to_string());
        if self.desc.is_deployable() {
            src.line("/// Deployment bytecode");
        } else {
            src.line("/// Deployment bytecode (empty: this contract cannot be deployed)");
        }
        src.line(format!("pub const BYTECODE: &str = \"{bytecode}\";"));
        src.blank();
        src.line("static CONTRACT_ABI: OnceLock<Arc<ContractAbi>> = OnceLock::new();");
        src.blank();
        src.line("/// Parsed ABI and bytecode, shared by every accessor and factory");
        src.line("pub fn contract_abi() -> Result<Arc<ContractAbi>, BindingError> {");
        src.line("    ContractAbi::cached(&CONTRACT_ABI, ABI_JSON, BYTECODE)");
        src.line("}");
    }

    fn render_accessor(&self, src: &mut Source) {
        let name = &self.accessor;
        src.blank();
        src.line(format!("/// Typed accessor for a deployed `{}`", self.desc.name));
        src.line("#[derive(Debug, Clone)]");
        src.line(format!("pub struct {name} {{"));
        src.line("    inner: ContractInstance,");
        src.line("}");
        src.blank();
        src.line(format!("impl {name} {{"));
        src.line("    /// Bind to `address`; only its syntax is checked");
        src.line("    pub fn attach(address: &str, client: Option<Arc<dyn ChainClient>>) -> Result<Self, BindingError> {");
        src.line("        Ok(Self::from_instance(ContractInstance::attach(address, contract_abi()?, client)?))");
        src.line("    }");
        src.blank();
        src.line("    pub fn from_instance(inner: ContractInstance) -> Self {");
        src.line("        Self { inner }");
        src.line("    }");
        src.blank();
        src.line("    pub fn address(&self) -> Address {");
        src.line("        self.inner.address()");
        src.line("    }");
        src.blank();
        src.line("    pub fn instance(&self) -> &ContractInstance {");
        src.line("        &self.inner");
        src.line("    }");
        src.blank();
        src.line("    /// Same address, different signer or provider");
        src.line("    pub fn connect(&self, client: Arc<dyn ChainClient>) -> Self {");
        src.line("        Self::from_instance(self.inner.connect(client))");
        src.line("    }");

        for function in &self.functions {
            src.blank();
            render_function(src, function);
        }
        for event in &self.events {
            src.blank();
            render_filter(src, event);
        }
        src.line("}");
    }

    fn render_factory(&self, src: &mut Source) {
        let accessor = &self.accessor;
        let factory = &self.factory;

        src.blank();
        src.line(format!(
            "/// Deploys `{}` or binds to existing deployments",
            self.desc.name
        ));
        src.line("#[derive(Debug, Clone)]");
        src.line(format!("pub struct {factory} {{"));
        src.line("    inner: ContractFactory,");
        src.line("}");
        src.blank();
        src.line(format!("impl {factory} {{"));
        src.line("    pub fn new(client: Option<Arc<dyn ChainClient>>) -> Result<Self, BindingError> {");
        src.line("        Ok(Self {");
        src.line("            inner: ContractFactory::new(contract_abi()?, client),");
        src.line("        })");
        src.line("    }");
        src.blank();
        src.line("    pub fn inner(&self) -> &ContractFactory {");
        src.line("        &self.inner");
        src.line("    }");
        src.blank();
        src.line("    /// Bind to an existing deployment; no network interaction");
        src.line(format!(
            "    pub fn attach(&self, address: &str) -> Result<{accessor}, BindingError> {{"
        ));
        src.line(format!(
            "        Ok({accessor}::from_instance(self.inner.attach(address)?))"
        ));
        src.line("    }");
        src.blank();
        src.line("    /// Same factory, different signer or provider");
        src.line("    pub fn connect(&self, client: Arc<dyn ChainClient>) -> Self {");
        src.line("        Self {");
        src.line("            inner: self.inner.connect(client),");
        src.line("        }");
        src.line("    }");
        src.blank();
        src.line("    /// Bind to an existing deployment with the given client");
        src.line(format!(
            "    pub fn connect_at(address: &str, client: Arc<dyn ChainClient>) -> Result<{accessor}, BindingError> {{"
        ));
        src.line("        let instance = ContractFactory::connect_at(contract_abi()?, address, client)?;");
        src.line(format!("        Ok({accessor}::from_instance(instance))"));
        src.line("    }");

        if self.desc.is_deployable() {
            self.render_deploy(src);
        }
        src.line("}");
    }

    fn render_deploy(&self, src: &mut Source) {
        let accessor = &self.accessor;
        let inputs: &[ParamSpec] = self
            .desc
            .constructor
            .as_ref()
            .map(|c| c.inputs.as_slice())
            .unwrap_or_default();
        let params = typed_params(&self.ctor_params, inputs);
        let args = self.ctor_params.join(", ");
        let values = sol_values(&self.ctor_params);
        let args_then = if args.is_empty() {
            String::new()
        } else {
            format!("{args}, ")
        };

        let mut with_self = vec!["&self".to_string()];
        with_self.extend(params.iter().cloned());

        src.blank();
        src.line("    /// Deploy a new instance and wait for it to be mined");
        src.signature(
            "    ",
            "pub async fn deploy",
            &with_self,
            &format!(" -> Result<{accessor}, BindingError> {{"),
        );
        src.line(format!(
            "        self.deploy_with({args_then}Overrides::default()).await"
        ));
        src.line("    }");

        let mut with_overrides = with_self.clone();
        with_overrides.push("overrides: Overrides".to_string());
        src.blank();
        src.line("    /// Like `deploy`, with explicit value, gas limit or nonce");
        src.signature(
            "    ",
            "pub async fn deploy_with",
            &with_overrides,
            &format!(" -> Result<{accessor}, BindingError> {{"),
        );
        src.line(format!(
            "        let instance = self.inner.deploy({values}, overrides).await?;"
        ));
        src.line(format!("        Ok({accessor}::from_instance(instance))"));
        src.line("    }");

        src.blank();
        src.line("    /// Creation transaction for a new instance; nothing is submitted");
        src.signature(
            "    ",
            "pub fn deploy_transaction",
            &with_self,
            " -> Result<TransactionRequest, BindingError> {",
        );
        src.line(format!(
            "        self.inner.deploy_transaction({values}, &Overrides::default())"
        ));
        src.line("    }");
    }
}

fn render_function(src: &mut Source, function: &FunctionBinding) {
    let spec = function.spec;
    let marker = match spec.mutability {
        Mutability::Pure | Mutability::View => "View",
        Mutability::NonPayable => "NonPayable",
        Mutability::Payable => "Payable",
    };
    let (ret, decoder) = match spec.outputs.as_slice() {
        [] => ("()".to_string(), "decode_unit".to_string()),
        [single] => {
            let ty = rust_type(&single.ty);
            (ty.clone(), format!("decode_single::<{ty}>"))
        }
        many => {
            let ty = tuple_type(many.iter().map(|p| rust_type(&p.ty)).collect());
            (ty.clone(), format!("decode_tuple::<{ty}>"))
        }
    };

    let mut params = vec!["&self".to_string()];
    params.extend(typed_params(&function.params, &spec.inputs));

    src.line(format!(
        "    /// `{}` ({}, selector `{}`)",
        spec.signature,
        spec.mutability.as_str(),
        spec.selector_hex()
    ));
    src.signature(
        "    ",
        &format!("pub fn {}", function.method),
        &params,
        &format!(" -> ContractCall<{ret}, {marker}> {{"),
    );
    src.line("        self.inner.method(");
    src.line(format!("            \"{}\",", spec.signature));
    src.line(format!("            {},", sol_values(&function.params)));
    src.line(format!("            {decoder},"));
    src.line("        )");
    src.line("    }");
}

fn render_filter(src: &mut Source, event: &EventBinding) {
    let mut params = vec!["&self".to_string()];
    let mut topics = Vec::new();
    for (field, input) in event.fields.iter().zip(&event.spec.inputs) {
        if input.indexed {
            params.push(format!(
                "{field}: Option<{}>",
                event_field_type(&input.ty, true)
            ));
            topics.push(field.clone());
        }
    }

    src.line(format!(
        "    /// Filter for `{}`; `None` matches any value",
        event.spec.signature
    ));
    src.signature(
        "    ",
        &format!("pub fn {}", event.method),
        &params,
        &format!(" -> EventFilter<{}> {{", event.struct_name),
    );
    if topics.is_empty() {
        src.line("        self.inner.event_filter(Vec::new())");
    } else {
        src.line("        self.inner.event_filter(vec![");
        for topic in &topics {
            src.line(format!("            {topic}.map(value_topic),"));
        }
        src.line("        ])");
    }
    src.line("    }");
}

fn render_struct(src: &mut Source, def: &StructDef) {
    let names = param_names(def.fields.iter().map(|f| f.name.as_str()), &[]);

    src.blank();
    src.line("#[derive(Debug, Clone, PartialEq, Eq)]");
    src.line(format!("pub struct {} {{", def.name));
    for (name, field) in names.iter().zip(&def.fields) {
        src.line(format!("    pub {name}: {},", rust_type(&field.ty)));
    }
    src.line("}");
    src.blank();
    src.line(format!("impl IntoSolValue for {} {{", def.name));
    src.line("    fn into_sol_value(self) -> DynSolValue {");
    src.line("        DynSolValue::Tuple(vec![");
    for name in &names {
        src.line(format!("            self.{name}.into_sol_value(),"));
    }
    src.line("        ])");
    src.line("    }");
    src.line("}");
    src.blank();
    src.line(format!("impl FromSolValue for {} {{", def.name));
    src.line("    fn from_sol_value(value: DynSolValue) -> Result<Self, BindingError> {");
    src.line(format!(
        "        let mut values = expect_tuple(value, {})?.into_iter();",
        names.len()
    ));
    src.line("        Ok(Self {");
    for name in &names {
        src.line(format!("            {name}: next_value(&mut values)?,"));
    }
    src.line("        })");
    src.line("    }");
    src.line("}");
}

fn render_event(src: &mut Source, event: &EventBinding) {
    let spec = event.spec;

    src.blank();
    src.line(format!("/// `{}` event", spec.signature));
    src.line("#[derive(Debug, Clone, PartialEq, Eq)]");
    src.line(format!("pub struct {} {{", event.struct_name));
    for (name, input) in event.fields.iter().zip(&spec.inputs) {
        src.line(format!(
            "    pub {name}: {},",
            event_field_type(&input.ty, input.indexed)
        ));
    }
    src.line("}");
    src.blank();
    src.line(format!("impl ContractEvent for {} {{", event.struct_name));
    src.line(format!(
        "    const SIGNATURE: &'static str = \"{}\";",
        spec.signature
    ));
    src.blank();
    src.line("    fn decode_parts(indexed: Vec<DynSolValue>, body: Vec<DynSolValue>) -> Result<Self, BindingError> {");
    src.line("        let mut indexed = indexed.into_iter();");
    src.line("        let mut body = body.into_iter();");
    src.line("        Ok(Self {");
    for (name, input) in event.fields.iter().zip(&spec.inputs) {
        let source = if input.indexed { "indexed" } else { "body" };
        src.line(format!("            {name}: next_value(&mut {source})?,"));
    }
    src.line("        })");
    src.line("    }");
    src.line("}");
}

fn typed_params(names: &[String], inputs: &[ParamSpec]) -> Vec<String> {
    names
        .iter()
        .zip(inputs)
        .map(|(name, input)| format!("{name}: {}", rust_type(&input.ty)))
        .collect()
}

fn sol_values(names: &[String]) -> String {
    if names.is_empty() {
        return "Vec::new()".to_string();
    }
    let values: Vec<String> = names
        .iter()
        .map(|name| format!("{name}.into_sol_value()"))
        .collect();
    format!("vec![{}]", values.join(", "))
}

/// Fewest `#`s that make a raw string literal safe for `content`
fn raw_string_hashes(content: &str) -> String {
    let mut longest = 0;
    let mut run: Option<usize> = None;
    for c in content.chars() {
        run = match (c, run) {
            ('"', _) => Some(0),
            ('#', Some(n)) => Some(n + 1),
            _ => None,
        };
        if let Some(n) = run {
            longest = longest.max(n);
        }
    }
    "#".repeat(longest + 1)
}
