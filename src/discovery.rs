//! Module dependency graph builder (component C6, §4.1). Breadth-first
//! discovery of local modules starting from an entry file, deterministic
//! sort by relative path, and tolerant handling of circular imports.

use crate::binding::manifest::load_manifest;
use crate::binding::registry::BindingRegistry;
use crate::compiler_messages::diagnostics::{Diagnostic, DiagCode, DiagnosticsCollector, ErrorLocation};
use crate::config::CompilerOptions;
use crate::external::{FileReader, ModuleResolver, SourceFile, SyntaxFrontEnd};
use crate::interned_path::InternedPath;
use crate::string_interning::StringTable;
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

pub struct DiscoveredModule<F> {
    pub canonical_path: PathBuf,
    pub relative_path: InternedPath,
    pub file: F,
}

/// Runs BFS discovery from `entry`, returning every reachable module file
/// (unsorted — callers typically sort by `relative_path` once IR modules
/// are built, per invariant I-6) plus any diagnostics raised along the
/// way. A missing file or unresolved import records an error and
/// discovery continues, so one missing file does not hide others (§4.1
/// step 5).
pub fn discover_modules<FE, R, IO>(
    entry: &Path,
    options: &CompilerOptions,
    front_end: &mut FE,
    resolver: &R,
    io: &IO,
    table: &mut StringTable,
) -> (Vec<DiscoveredModule<FE::File>>, DiagnosticsCollector)
where
    FE: SyntaxFrontEnd,
    R: ModuleResolver,
    IO: FileReader,
{
    let mut collector = DiagnosticsCollector::new();
    let mut discovered = Vec::new();
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut queue: VecDeque<PathBuf> = VecDeque::new();
    queue.push_back(entry.to_path_buf());

    while let Some(candidate) = queue.pop_front() {
        let Some(canonical) = resolver.canonicalize(&candidate) else {
            let _ = collector.push(Diagnostic::new(
                DiagCode::UnreadableFile,
                format!("cannot locate '{}'", candidate.display()),
                ErrorLocation::new(candidate.clone(), 0, 0),
            ));
            continue;
        };

        warn_on_case_mismatch(&candidate, &canonical, &mut collector);

        if !visited.insert(canonical.clone()) {
            continue;
        }

        let contents = match io.read_to_string(&canonical) {
            Ok(contents) => contents,
            Err(_) => {
                let _ = collector.push(Diagnostic::new(
                    DiagCode::UnreadableFile,
                    format!("could not read '{}'", canonical.display()),
                    ErrorLocation::new(canonical.clone(), 0, 0),
                ));
                continue;
            }
        };

        let file = match front_end.parse_file(&canonical, &contents) {
            Ok(file) => file,
            Err(parse_diagnostics) => {
                collector.extend(parse_diagnostics);
                continue;
            }
        };

        for specifier in file.referenced_specifiers() {
            let specifier_str = table.resolve(specifier).to_string();
            if !is_local_specifier(&specifier_str) {
                continue;
            }
            match resolver.resolve(&specifier_str, &canonical) {
                Some(resolved) if is_under_source_root(&resolved, &options.source_root) => {
                    queue.push_back(resolved);
                }
                Some(_) => {
                    // Resolved, but outside the source root: not a compile
                    // unit this graph owns. Silently excluded per §4.1
                    // step 4 ("enqueue only paths under the source root").
                }
                None => {
                    let _ = collector.push(Diagnostic::new(
                        DiagCode::UnresolvedImport,
                        format!("cannot resolve '{specifier_str}'"),
                        ErrorLocation::new(canonical.clone(), 0, 0),
                    ));
                }
            }
        }

        let relative_path = canonical
            .strip_prefix(&options.source_root)
            .unwrap_or(&canonical)
            .to_string_lossy()
            .replace('\\', "/");
        discovered.push(DiscoveredModule {
            canonical_path: canonical,
            relative_path: InternedPath::from_str(&relative_path, table),
            file,
        });
    }

    (discovered, collector)
}

/// Loads every `bindings.json`-shaped manifest named in
/// `options.binding_manifest_paths` into `registry`, in list order. Each
/// path is loaded at most once per call; an unreadable file raises
/// `TSN1004` the same way a missing source module does and does not stop
/// the remaining manifests from loading.
pub fn load_binding_manifests<IO: FileReader>(
    options: &CompilerOptions,
    io: &IO,
    table: &mut StringTable,
) -> (BindingRegistry, DiagnosticsCollector) {
    let mut registry = BindingRegistry::new();
    let mut collector = DiagnosticsCollector::new();
    let mut loaded = HashSet::new();

    for path in &options.binding_manifest_paths {
        let path_str = path.to_string_lossy().to_string();
        let contents = match io.read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => {
                if collector
                    .push(Diagnostic::new(
                        DiagCode::UnreadableFile,
                        format!("could not read binding manifest '{path_str}'"),
                        ErrorLocation::new(path.clone(), 0, 0),
                    ))
                    .is_err()
                {
                    return (registry, collector);
                }
                continue;
            }
        };

        if load_manifest(&path_str, &contents, &mut registry, table, &mut loaded, &mut collector).is_err() {
            return (registry, collector);
        }
    }

    (registry, collector)
}

fn is_local_specifier(specifier: &str) -> bool {
    specifier.starts_with('.') || specifier.starts_with('/')
}

fn is_under_source_root(path: &Path, source_root: &Path) -> bool {
    path.starts_with(source_root)
}

/// Warns (`TSN1003`) when the path as written differs in case from its
/// canonical on-disk form, which only matters on case-insensitive
/// filesystems but is always safe to flag.
fn warn_on_case_mismatch(requested: &Path, canonical: &Path, collector: &mut DiagnosticsCollector) {
    let requested_str = requested.to_string_lossy();
    let canonical_str = canonical.to_string_lossy();
    if requested_str.eq_ignore_ascii_case(&canonical_str) && requested_str != canonical_str {
        let _ = collector.push(Diagnostic::new(
            DiagCode::CaseInsensitiveMismatch,
            format!(
                "path case mismatch: requested '{requested_str}', canonical '{canonical_str}'"
            ),
            ErrorLocation::new(requested.to_path_buf(), 0, 0),
        ));
    }
}
