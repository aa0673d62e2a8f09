//! Binding manifest schemas (§6 `bindings.json`). Three recognized shapes:
//! simple global, full hierarchical, and signature-extractor-generated.
//! Deserialized with `serde`/`serde_json`; [`load_manifest`] probes the
//! raw JSON object's top-level keys to pick a schema (the three are
//! mutually exclusive on their required fields) and registers the result
//! into a [`BindingRegistry`].

use crate::binding::registry::{BindingRegistry, CallTarget, ExtensionCandidate, Overload};
use crate::binding::universe::ParameterMode;
use crate::compiler_messages::diagnostics::{Diagnostic, DiagCode, DiagnosticsCollector, ErrorLocation};
use crate::string_interning::StringTable;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SimpleBinding {
    pub assembly: String,
    #[serde(rename = "type")]
    pub clr_type: String,
    pub member: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SimpleManifest {
    pub bindings: HashMap<String, SimpleBinding>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FullMember {
    pub alias: String,
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FullTypeEntry {
    pub alias: String,
    pub kind: String,
    #[serde(default)]
    pub members: Vec<FullMember>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FullNamespaceEntry {
    pub alias: String,
    pub types: Vec<FullTypeEntry>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FullManifest {
    pub namespaces: Vec<FullNamespaceEntry>,
}

/// `Name|(ParamType,ParamType,…):ReturnType|static=bool`. Byref parameters
/// carry a trailing `&`. ASCII, deterministic, stable across invocations.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SignatureExtractorMethod {
    #[serde(rename = "clrName")]
    pub clr_name: String,
    #[serde(rename = "normalizedSignature")]
    pub normalized_signature: String,
    #[serde(rename = "parameterCount")]
    pub parameter_count: u32,
    #[serde(rename = "parameterModifiers")]
    pub parameter_modifiers: Vec<String>,
    #[serde(rename = "isExtensionMethod")]
    pub is_extension_method: bool,
    #[serde(rename = "declaringClrType")]
    pub declaring_clr_type: String,
    #[serde(rename = "declaringAssemblyName")]
    pub declaring_assembly_name: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SignatureExtractorType {
    #[serde(rename = "clrName")]
    pub clr_name: String,
    pub kind: String,
    #[serde(default)]
    pub properties: Vec<String>,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub methods: Vec<SignatureExtractorMethod>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SignatureExtractorManifest {
    pub namespace: String,
    pub types: Vec<SignatureExtractorType>,
    #[serde(default)]
    pub exports: Option<HashMap<String, String>>,
}

/// A normalized signature's parsed pieces, per the grammar in §6.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSignature {
    pub name: String,
    pub parameter_types: Vec<String>,
    pub byref_flags: Vec<bool>,
    pub return_type: String,
    pub is_static: bool,
}

/// Parses `Name|(ParamType,ParamType,…):ReturnType|static=bool`. Returns
/// `None` on any grammar violation; a malformed entry is the caller's
/// `TSN9001` diagnostic to raise, not this function's to report.
pub fn parse_normalized_signature(signature: &str) -> Option<ParsedSignature> {
    let mut segments = signature.split('|');
    let name = segments.next()?.to_string();
    let params_and_return = segments.next()?;
    let static_segment = segments.next()?;
    if segments.next().is_some() {
        return None;
    }

    let open = params_and_return.find('(')?;
    let close = params_and_return.find(')')?;
    if close < open {
        return None;
    }
    let params_str = &params_and_return[open + 1..close];
    let remainder = &params_and_return[close + 1..];
    let return_type = remainder.strip_prefix(':')?.to_string();

    let (parameter_types, byref_flags) = if params_str.is_empty() {
        (Vec::new(), Vec::new())
    } else {
        let mut types = Vec::new();
        let mut flags = Vec::new();
        for part in params_str.split(',') {
            if let Some(stripped) = part.strip_suffix('&') {
                types.push(stripped.to_string());
                flags.push(true);
            } else {
                types.push(part.to_string());
                flags.push(false);
            }
        }
        (types, flags)
    };

    let is_static = static_segment.strip_prefix("static=")?.parse().ok()?;

    Some(ParsedSignature {
        name,
        parameter_types,
        byref_flags,
        return_type,
        is_static,
    })
}

/// Flat global bindings (`{"bindings": {...}}`) have no receiver type in
/// source; they are registered under the empty-string type alias so a
/// bare identifier call (no member access) still resolves as
/// `(GLOBAL_TYPE_ALIAS, alias)`.
const GLOBAL_TYPE_ALIAS: &str = "";

/// Parses `manifest_text` against the three recognized schemas and
/// registers every binding it contains into `registry`. A `source_path`
/// already present in `loaded` is skipped with a `TSN9002` diagnostic
/// instead of being re-parsed; any other failure raises `TSN9001`
/// (malformed) or `TSN9003` (none of the schemas match).
pub fn load_manifest(
    source_path: &str,
    manifest_text: &str,
    registry: &mut BindingRegistry,
    table: &mut StringTable,
    loaded: &mut HashSet<String>,
    collector: &mut DiagnosticsCollector,
) -> Result<(), ()> {
    if !loaded.insert(source_path.to_string()) {
        return collector.push(Diagnostic::new(
            DiagCode::DuplicateManifestLoad,
            format!("binding manifest '{source_path}' was already loaded"),
            ErrorLocation::new(PathBuf::from(source_path), 0, 0),
        ));
    }

    let value: serde_json::Value = match serde_json::from_str(manifest_text) {
        Ok(value) => value,
        Err(err) => {
            return collector.push(Diagnostic::new(
                DiagCode::MalformedManifest,
                format!("'{source_path}' is not valid JSON: {err}"),
                ErrorLocation::new(PathBuf::from(source_path), 0, 0),
            ));
        }
    };

    let Some(object) = value.as_object() else {
        return collector.push(Diagnostic::new(
            DiagCode::UnsupportedManifestSchema,
            format!("'{source_path}' is not a JSON object"),
            ErrorLocation::new(PathBuf::from(source_path), 0, 0),
        ));
    };

    if object.contains_key("bindings") {
        return match serde_json::from_value::<SimpleManifest>(value) {
            Ok(manifest) => {
                register_simple_manifest(&manifest, registry, table);
                Ok(())
            }
            Err(err) => collector.push(Diagnostic::new(
                DiagCode::MalformedManifest,
                format!("'{source_path}' does not match the simple binding schema: {err}"),
                ErrorLocation::new(PathBuf::from(source_path), 0, 0),
            )),
        };
    }

    if object.contains_key("namespaces") {
        return match serde_json::from_value::<FullManifest>(value) {
            Ok(manifest) => {
                register_full_manifest(&manifest, registry, table);
                Ok(())
            }
            Err(err) => collector.push(Diagnostic::new(
                DiagCode::MalformedManifest,
                format!("'{source_path}' does not match the full binding schema: {err}"),
                ErrorLocation::new(PathBuf::from(source_path), 0, 0),
            )),
        };
    }

    if object.contains_key("namespace") && object.contains_key("types") {
        return match serde_json::from_value::<SignatureExtractorManifest>(value) {
            Ok(manifest) => {
                register_signature_extractor_manifest(&manifest, registry, table, source_path, collector)
            }
            Err(err) => collector.push(Diagnostic::new(
                DiagCode::MalformedManifest,
                format!("'{source_path}' does not match the signature-extractor schema: {err}"),
                ErrorLocation::new(PathBuf::from(source_path), 0, 0),
            )),
        };
    }

    collector.push(Diagnostic::new(
        DiagCode::UnsupportedManifestSchema,
        format!("'{source_path}' matches none of the recognized binding manifest schemas"),
        ErrorLocation::new(PathBuf::from(source_path), 0, 0),
    ))
}

fn register_simple_manifest(manifest: &SimpleManifest, registry: &mut BindingRegistry, table: &mut StringTable) {
    let type_alias = table.intern(GLOBAL_TYPE_ALIAS);
    let mut aliases: Vec<&String> = manifest.bindings.keys().collect();
    aliases.sort();
    for alias in aliases {
        let binding = &manifest.bindings[alias];
        let member_alias = table.intern(alias);
        registry.register_overload(
            type_alias,
            member_alias,
            Overload {
                target: CallTarget {
                    assembly: table.intern(&binding.assembly),
                    clr_type: table.intern(&binding.clr_type),
                    member: table.intern(&binding.member),
                },
                parameter_modifiers: Vec::new(),
                is_optional: Vec::new(),
            },
        );
    }
}

/// `FullManifest` carries no separate assembly/CLR-name fields; a type's
/// alias doubles as its CLR simple name, qualified by its namespace's
/// alias (`"{namespace.alias}.{type.alias}"`).
fn register_full_manifest(manifest: &FullManifest, registry: &mut BindingRegistry, table: &mut StringTable) {
    let assembly = table.intern(GLOBAL_TYPE_ALIAS);
    for namespace in &manifest.namespaces {
        for ty in &namespace.types {
            let type_alias = table.intern(&ty.alias);
            let clr_type = table.intern(&format!("{}.{}", namespace.alias, ty.alias));
            for member in &ty.members {
                let member_alias = table.intern(&member.alias);
                registry.register_overload(
                    type_alias,
                    member_alias,
                    Overload {
                        target: CallTarget { assembly, clr_type, member: member_alias },
                        parameter_modifiers: Vec::new(),
                        is_optional: Vec::new(),
                    },
                );
            }
        }
    }
}

/// Registers every method of a signature-extractor manifest. An instance
/// method is keyed by its declaring type's alias; an extension method's
/// receiver is the first parameter type of its parsed normalized
/// signature, per the CLR `this T receiver` convention. A signature this
/// crate's grammar can't parse is reported and skipped, so one malformed
/// entry doesn't drop the rest of the manifest.
fn register_signature_extractor_manifest(
    manifest: &SignatureExtractorManifest,
    registry: &mut BindingRegistry,
    table: &mut StringTable,
    source_path: &str,
    collector: &mut DiagnosticsCollector,
) -> Result<(), ()> {
    let namespace_key = table.intern(&manifest.namespace);
    for ty in &manifest.types {
        let declaring_type_alias = table.intern(&ty.clr_name);
        for method in &ty.methods {
            let Some(parsed) = parse_normalized_signature(&method.normalized_signature) else {
                collector.push(Diagnostic::new(
                    DiagCode::MalformedManifest,
                    format!(
                        "'{source_path}': malformed normalized signature '{}' on {}",
                        method.normalized_signature, method.clr_name
                    ),
                    ErrorLocation::new(PathBuf::from(source_path), 0, 0),
                ))?;
                continue;
            };

            let assembly = table.intern(&method.declaring_assembly_name);
            let clr_type = table.intern(&method.declaring_clr_type);
            let member = table.intern(&method.clr_name);
            let modifiers: Vec<ParameterMode> = parsed
                .byref_flags
                .iter()
                .map(|&byref| if byref { ParameterMode::Ref } else { ParameterMode::Value })
                .collect();

            if method.is_extension_method {
                let Some(receiver_type) = parsed.parameter_types.first() else {
                    collector.push(Diagnostic::new(
                        DiagCode::MalformedManifest,
                        format!(
                            "'{source_path}': extension method '{}' on {} has no receiver parameter",
                            parsed.name, method.clr_name
                        ),
                        ErrorLocation::new(PathBuf::from(source_path), 0, 0),
                    ))?;
                    continue;
                };
                let receiver_type_name = table.intern(receiver_type);
                let method_name = table.intern(&parsed.name);
                registry.register_extension(
                    namespace_key,
                    receiver_type_name,
                    method_name,
                    ExtensionCandidate { target: CallTarget { assembly, clr_type, member }, parameter_modifiers: modifiers },
                );
            } else {
                let member_alias = table.intern(&parsed.name);
                registry.register_overload(
                    declaring_type_alias,
                    member_alias,
                    Overload {
                        target: CallTarget { assembly, clr_type, member },
                        parameter_modifiers: modifiers,
                        is_optional: vec![false; parsed.parameter_types.len()],
                    },
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_static_method_with_byref_parameter() {
        let parsed = parse_normalized_signature("TryParse|(string,int&):bool|static=true").unwrap();
        assert_eq!(parsed.name, "TryParse");
        assert_eq!(parsed.parameter_types, vec!["string", "int"]);
        assert_eq!(parsed.byref_flags, vec![false, true]);
        assert_eq!(parsed.return_type, "bool");
        assert!(parsed.is_static);
    }

    #[test]
    fn parses_zero_arity_method() {
        let parsed = parse_normalized_signature("ToString|():string|static=false").unwrap();
        assert!(parsed.parameter_types.is_empty());
        assert!(!parsed.is_static);
    }

    #[test]
    fn malformed_signature_returns_none() {
        assert!(parse_normalized_signature("NotAValidSignature").is_none());
    }

    #[test]
    fn simple_manifest_deserializes() {
        let json = r#"{"bindings": {"print": {"assembly": "corelib", "type": "System.Console", "member": "WriteLine"}}}"#;
        let manifest: SimpleManifest = serde_json::from_str(json).unwrap();
        let binding = &manifest.bindings["print"];
        assert_eq!(binding.clr_type, "System.Console");
    }

    #[test]
    fn simple_manifest_loads_into_registry_under_global_alias() {
        let json = r#"{"bindings": {"print": {"assembly": "corelib", "type": "System.Console", "member": "WriteLine"}}}"#;
        let mut table = StringTable::new();
        let mut registry = BindingRegistry::new();
        let mut loaded = HashSet::new();
        let mut collector = DiagnosticsCollector::new();
        load_manifest("bindings.json", json, &mut registry, &mut table, &mut loaded, &mut collector).unwrap();
        assert!(collector.is_empty());

        let global = table.intern(GLOBAL_TYPE_ALIAS);
        let print = table.intern("print");
        let overloads = registry.overloads(global, print);
        assert_eq!(overloads.len(), 1);
        assert_eq!(table.resolve(overloads[0].target.clr_type), "System.Console");
        assert_eq!(table.resolve(overloads[0].target.member), "WriteLine");
    }

    #[test]
    fn full_manifest_qualifies_clr_type_from_namespace_and_type_alias() {
        let json = r#"{
            "namespaces": [
                { "alias": "System", "types": [
                    { "alias": "Console", "kind": "class", "members": [
                        { "alias": "WriteLine", "kind": "method" }
                    ] }
                ] }
            ]
        }"#;
        let mut table = StringTable::new();
        let mut registry = BindingRegistry::new();
        let mut loaded = HashSet::new();
        let mut collector = DiagnosticsCollector::new();
        load_manifest("full.json", json, &mut registry, &mut table, &mut loaded, &mut collector).unwrap();
        assert!(collector.is_empty());

        let console = table.intern("Console");
        let write_line = table.intern("WriteLine");
        let overloads = registry.overloads(console, write_line);
        assert_eq!(overloads.len(), 1);
        assert_eq!(table.resolve(overloads[0].target.clr_type), "System.Console");
    }

    #[test]
    fn signature_extractor_instance_method_registers_under_declaring_type() {
        let json = r#"{
            "namespace": "System",
            "types": [
                { "clrName": "System.String", "kind": "class", "methods": [
                    { "clrName": "Trim", "normalizedSignature": "Trim|():string|static=false",
                      "parameterCount": 0, "parameterModifiers": [], "isExtensionMethod": false,
                      "declaringClrType": "System.String", "declaringAssemblyName": "corelib" }
                ] }
            ]
        }"#;
        let mut table = StringTable::new();
        let mut registry = BindingRegistry::new();
        let mut loaded = HashSet::new();
        let mut collector = DiagnosticsCollector::new();
        load_manifest("sig.json", json, &mut registry, &mut table, &mut loaded, &mut collector).unwrap();
        assert!(collector.is_empty());

        let string_type = table.intern("System.String");
        let trim = table.intern("Trim");
        let overloads = registry.overloads(string_type, trim);
        assert_eq!(overloads.len(), 1);
        assert!(overloads[0].parameter_modifiers.is_empty());
    }

    #[test]
    fn signature_extractor_extension_method_indexes_by_first_parameter() {
        let json = r#"{
            "namespace": "System.Linq",
            "types": [
                { "clrName": "System.Linq.Enumerable", "kind": "class", "methods": [
                    { "clrName": "Select", "normalizedSignature": "Select|(IEnumerable,Func):IEnumerable|static=true",
                      "parameterCount": 2, "parameterModifiers": [], "isExtensionMethod": true,
                      "declaringClrType": "System.Linq.Enumerable", "declaringAssemblyName": "corelib" }
                ] }
            ]
        }"#;
        let mut table = StringTable::new();
        let mut registry = BindingRegistry::new();
        let mut loaded = HashSet::new();
        let mut collector = DiagnosticsCollector::new();
        load_manifest("sig_ext.json", json, &mut registry, &mut table, &mut loaded, &mut collector).unwrap();
        assert!(collector.is_empty());

        let universe = crate::binding::universe::UnifiedTypeCatalog::new();
        let ns = table.intern("System.Linq");
        let receiver = table.intern("IEnumerable");
        let select = table.intern("Select");
        let resolution = registry.resolve_extension_method(&universe, ns, receiver, select, 1);
        assert!(matches!(resolution, crate::binding::registry::ExtensionResolution::Resolved(_)));
    }

    #[test]
    fn malformed_json_is_reported_and_does_not_panic() {
        let mut table = StringTable::new();
        let mut registry = BindingRegistry::new();
        let mut loaded = HashSet::new();
        let mut collector = DiagnosticsCollector::new();
        load_manifest("broken.json", "{not json", &mut registry, &mut table, &mut loaded, &mut collector).unwrap();
        assert_eq!(collector.len(), 1);
        assert_eq!(collector.all()[0].code, DiagCode::MalformedManifest);
    }

    #[test]
    fn unrecognized_schema_is_reported() {
        let mut table = StringTable::new();
        let mut registry = BindingRegistry::new();
        let mut loaded = HashSet::new();
        let mut collector = DiagnosticsCollector::new();
        load_manifest("unknown.json", r#"{"foo": "bar"}"#, &mut registry, &mut table, &mut loaded, &mut collector).unwrap();
        assert_eq!(collector.len(), 1);
        assert_eq!(collector.all()[0].code, DiagCode::UnsupportedManifestSchema);
    }

    #[test]
    fn reloading_the_same_path_is_flagged_and_skipped() {
        let json = r#"{"bindings": {"print": {"assembly": "corelib", "type": "System.Console", "member": "WriteLine"}}}"#;
        let mut table = StringTable::new();
        let mut registry = BindingRegistry::new();
        let mut loaded = HashSet::new();
        let mut collector = DiagnosticsCollector::new();
        load_manifest("bindings.json", json, &mut registry, &mut table, &mut loaded, &mut collector).unwrap();
        load_manifest("bindings.json", json, &mut registry, &mut table, &mut loaded, &mut collector).unwrap();
        assert_eq!(collector.len(), 1);
        assert_eq!(collector.all()[0].code, DiagCode::DuplicateManifestLoad);
    }
}
