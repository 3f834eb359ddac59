//! Textual edits over Java sources.
//!
//! These operate on declaration sites only: field, parameter, and return
//! types. Instantiations (`new Foo()`), casts, and generic type arguments are
//! left alone, matching the narrow scope of the corresponding refactorings.

use regex::Regex;
use std::sync::LazyLock;

static PACKAGE_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^package\s+[\w.]+\s*;").expect("static regex"));

/// One extracted method signature, ready to render into an interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub return_type: String,
    pub name: String,
    pub params: String,
}

/// Rewrites (or inserts) the package declaration.
pub fn set_package(source: &str, package: &str) -> String {
    let declaration = format!("package {package};");

    if PACKAGE_DECL.is_match(source) {
        if package.is_empty() {
            PACKAGE_DECL.replace(source, "").into_owned()
        } else {
            PACKAGE_DECL.replace(source, declaration.as_str()).into_owned()
        }
    } else if package.is_empty() {
        source.to_string()
    } else {
        format!("{declaration}\n\n{source}")
    }
}

/// Pulls the signatures of the requested methods out of a class source.
/// Returns the found signatures in request order plus the names that were not
/// found.
pub fn collect_method_signatures(
    source: &str,
    methods: &[String],
) -> (Vec<MethodSignature>, Vec<String>) {
    let mut found = Vec::new();
    let mut missing = Vec::new();

    for method in methods {
        let pattern = format!(
            r"(?m)^\s*public\s+([\w.<>\[\],?\s]+?)\s+{}\s*\(([^)]*)\)",
            regex::escape(method)
        );
        let signature = Regex::new(&pattern)
            .ok()
            .and_then(|re| re.captures(source).map(|c| (c[1].to_string(), c[2].to_string())))
            .map(|(raw_type, params)| MethodSignature {
                return_type: strip_modifiers(&raw_type),
                name: method.clone(),
                params: normalize_params(&params),
            });

        match signature {
            // Static methods cannot move onto an interface contract.
            Some(sig) if !sig.return_type.is_empty() => found.push(sig),
            _ => missing.push(method.clone()),
        }
    }

    (found, missing)
}

fn strip_modifiers(raw_type: &str) -> String {
    let mut words: Vec<&str> = raw_type.split_whitespace().collect();
    while matches!(
        words.first(),
        Some(&"static") | Some(&"final") | Some(&"synchronized") | Some(&"abstract")
    ) {
        if words.first() == Some(&"static") {
            return String::new();
        }
        words.remove(0);
    }
    words.join(" ")
}

fn normalize_params(params: &str) -> String {
    params.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Renders the interface source the extracted methods describe.
pub fn render_interface(package: &str, simple_name: &str, methods: &[MethodSignature]) -> String {
    let mut out = String::new();
    if !package.is_empty() {
        out.push_str(&format!("package {package};\n\n"));
    }
    out.push_str(&format!("public interface {simple_name} {{\n"));
    for method in methods {
        out.push_str(&format!(
            "\n    {} {}({});\n",
            method.return_type, method.name, method.params
        ));
    }
    out.push_str("}\n");
    out
}

/// Adds the interface to the class's `implements` clause, importing it when
/// it lives in another package. Returns `None` when no class declaration for
/// `class_simple` exists in the source.
pub fn add_implements(
    source: &str,
    class_simple: &str,
    interface_qualified: &str,
    needs_import: bool,
) -> Option<String> {
    let interface_simple = interface_qualified
        .rsplit('.')
        .next()
        .unwrap_or(interface_qualified);

    let pattern = format!(
        r"(?m)^(?P<head>\s*(?:public\s+)?(?:final\s+|abstract\s+)*class\s+{}\b[^{{\n]*?)(?P<brace>\s*\{{)",
        regex::escape(class_simple)
    );
    let re = Regex::new(&pattern).ok()?;
    let captures = re.captures(source)?;

    let head = captures.name("head")?.as_str();
    let addition = if head.contains(" implements ") {
        format!(", {interface_simple}")
    } else {
        format!(" implements {interface_simple}")
    };

    let full = captures.get(0)?;
    let brace = captures.name("brace")?.as_str();
    let mut rewritten = String::with_capacity(source.len() + addition.len());
    rewritten.push_str(&source[..full.start()]);
    rewritten.push_str(head);
    rewritten.push_str(&addition);
    rewritten.push_str(brace);
    rewritten.push_str(&source[full.end()..]);

    if needs_import && !has_import(&rewritten, interface_qualified) {
        Some(insert_import(&rewritten, interface_qualified))
    } else {
        Some(rewritten)
    }
}

/// Retypes declaration-site references (fields, parameters, return types)
/// from `old_qualified` to `new_qualified`, then fixes imports: the new type
/// is imported if needed, and the old import is removed only when no
/// reference to the old type remains anywhere else in the file.
pub fn replace_declared_type(
    source: &str,
    old_qualified: &str,
    new_qualified: &str,
    needs_import: bool,
) -> (String, usize) {
    let old_simple = old_qualified.rsplit('.').next().unwrap_or(old_qualified);
    let new_simple = new_qualified.rsplit('.').next().unwrap_or(new_qualified);

    // A declaration site is the type name followed by an identifier.
    let Ok(declaration) = Regex::new(&format!(
        r"\b{}\b(?=\s+[A-Za-z_])",
        regex::escape(old_simple)
    )) else {
        return (source.to_string(), 0);
    };

    let mut count = 0;
    let mut lines: Vec<String> = Vec::new();
    for line in source.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("import ") || trimmed.starts_with("package ") {
            lines.push(line.to_string());
            continue;
        }
        let replaced = declaration.replace_all(line, new_simple);
        if replaced != line {
            count += declaration.find_iter(line).count();
        }
        lines.push(replaced.into_owned());
    }
    let mut rewritten = lines.join("\n");
    if source.ends_with('\n') {
        rewritten.push('\n');
    }

    if count > 0 && needs_import && !has_import(&rewritten, new_qualified) {
        rewritten = insert_import(&rewritten, new_qualified);
    }

    let old_import = format!("import {old_qualified};");
    if rewritten.contains(&old_import) && !references_outside_import(&rewritten, old_simple) {
        rewritten = remove_import_line(&rewritten, &old_import);
    }

    (rewritten, count)
}

fn has_import(source: &str, qualified: &str) -> bool {
    source.contains(&format!("import {qualified};"))
}

fn insert_import(source: &str, qualified: &str) -> String {
    let import = format!("import {qualified};");

    if let Some(m) = PACKAGE_DECL.find(source) {
        let mut out = String::with_capacity(source.len() + import.len() + 4);
        out.push_str(&source[..m.end()]);
        out.push_str("\n\n");
        out.push_str(&import);
        out.push('\n');
        out.push_str(source[m.end()..].trim_start_matches('\n'));
        out
    } else {
        format!("{import}\n\n{source}")
    }
}

/// True when the simple name still occurs on any line other than its import.
fn references_outside_import(source: &str, simple_name: &str) -> bool {
    let Ok(word) = Regex::new(&format!(r"\b{}\b", regex::escape(simple_name))) else {
        return true;
    };
    source
        .lines()
        .filter(|line| !line.trim_start().starts_with("import "))
        .any(|line| word.is_match(line))
}

fn remove_import_line(source: &str, import: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut removed = false;
    for line in source.lines() {
        if !removed && line.trim() == import {
            removed = true;
            continue;
        }
        lines.push(line);
    }
    let mut out = lines.join("\n");
    if source.ends_with('\n') {
        out.push('\n');
    }
    out
}
