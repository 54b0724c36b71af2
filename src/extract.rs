//! Declaration extraction: one directory of Go files in, one [`PackageDoc`] out.

use std::path::{Path, PathBuf};

use gomoddoc_parser::ast::{
    CommentGroupId, Element, Expr, ExprId, GenDecl, GenDeclKind, LiteralValue, Spec,
    TopLevelDecl, Type, TypeId, TypeSpec, ValueSpec,
};
use gomoddoc_parser::render::{for_each_name, render_signature};
use gomoddoc_parser::{parse_file, render_type, ParsedFile};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{Function, NamedValue, PackageDoc, TypeDoc, TypeKind, Value};

/// The parsed files of one package directory, in file-name order.
#[derive(Debug)]
pub struct ParsedPackage {
    pub name: String,
    pub dir: PathBuf,
    pub files: Vec<(String, ParsedFile)>,
}

/// Names of every `.go` file in `dir`, tests included, sorted.
pub fn source_files(dir: &Path) -> Result<Vec<String>> {
    go_files(dir, |_| true)
}

/// The `.go` files in `dir` that make up its package: [`source_files`]
/// without the `_test.go` files.
pub fn package_files(dir: &Path) -> Result<Vec<String>> {
    go_files(dir, |name| !name.ends_with("_test.go"))
}

fn go_files(dir: &Path, keep: impl Fn(&str) -> bool) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let is_file = entry.file_type().map_err(|e| Error::io(entry.path(), e))?.is_file();
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_file && name.ends_with(".go") && keep(&name) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Parses the package files of `dir`.
///
/// Returns `Ok(None)` when there are none. The first syntax error
/// aborts with [`Error::Parse`]. Files declaring a different package than the
/// first one are skipped.
pub fn parse_dir(dir: &Path) -> Result<Option<ParsedPackage>> {
    let names = package_files(dir)?;
    if names.is_empty() {
        return Ok(None);
    }

    let mut files: Vec<(String, ParsedFile)> = Vec::with_capacity(names.len());
    for name in names {
        let path = dir.join(&name);
        let src = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let parsed = parse_file(&src).map_err(|f| Error::Parse {
            diags: f.describe(&src),
            path: path.clone(),
        })?;

        if let Some((_, first)) = files.first() {
            if first.package_name() != parsed.package_name() {
                warn!(
                    file = %path.display(),
                    expected = first.package_name(),
                    found = parsed.package_name(),
                    "skipping file from a different package"
                );
                continue;
            }
        }
        files.push((name, parsed));
    }

    let name = files
        .first()
        .map(|(_, f)| f.package_name().to_owned())
        .unwrap_or_default();
    debug!(dir = %dir.display(), package = %name, files = files.len(), "parsed package");

    Ok(Some(ParsedPackage {
        name,
        dir: dir.to_path_buf(),
        files,
    }))
}

/// Builds the documentation of one package. Never fails: shapes that have
/// no textual form come out as empty strings.
pub fn extract(pkg: &ParsedPackage) -> PackageDoc {
    let mut doc = PackageDoc::default();
    let mut overview = Vec::new();

    for (_, file) in &pkg.files {
        let text = file.comment_text(file.file.doc);
        if !text.is_empty() {
            overview.push(text);
        }

        for decl in file.decls() {
            match *decl {
                TopLevelDecl::Gen(g) => extract_gen_decl(file, &g, &mut doc),
                TopLevelDecl::Func(id) => {
                    let func = &file.arena.funcs[id];
                    if func.is_method() {
                        continue;
                    }
                    let sig = &file.arena.signatures[func.signature];
                    let mut arguments = Vec::new();
                    for_each_name(file, sig.params, |n, t| {
                        arguments.push(NamedValue::new(n, render_type(file, t)));
                    });
                    let mut results = Vec::new();
                    for_each_name(file, sig.results, |n, t| {
                        results.push(NamedValue::new(n, render_type(file, t)));
                    });
                    debug!(
                        func = file.name(func.name.sym),
                        sig = %render_signature(file, func.signature),
                        "function"
                    );
                    doc.functions.push(Function {
                        name: file.name(func.name.sym).to_owned(),
                        doc: file.comment_text(func.doc),
                        arguments,
                        results,
                    });
                }
            }
        }
    }

    doc.overview = overview.join("\n");
    doc.types.sort_by(|a, b| a.name.cmp(&b.name));
    doc.functions.sort_by(|a, b| a.name.cmp(&b.name));
    doc
}

fn extract_gen_decl(file: &ParsedFile, decl: &GenDecl, doc: &mut PackageDoc) {
    let specs = file.arena.specs_list(decl.specs);
    // A lone spec is documented by the declaration's comment.
    let fallback = if specs.len() == 1 { decl.doc } else { None };

    for spec in specs {
        match (decl.kind, spec) {
            (GenDeclKind::Const, Spec::Value(v)) => {
                doc.constants.extend(values(file, v, fallback));
            }
            (GenDeclKind::Var, Spec::Value(v)) => {
                doc.variables.extend(values(file, v, fallback));
            }
            (GenDeclKind::Type, Spec::Type(t)) => doc.types.push(type_doc(file, t, fallback)),
            _ => {}
        }
    }
}

/// One [`Value`] per bound name; the i-th name takes the i-th initializer.
fn values(
    file: &ParsedFile,
    spec: &ValueSpec,
    fallback: Option<CommentGroupId>,
) -> Vec<Value> {
    let doc = file.comment_text(spec.doc.or(fallback));
    let typ = spec.typ.map(|t| render_type(file, t)).unwrap_or_default();
    let inits = file.arena.exprs_list(spec.values);

    file.arena
        .ident_names(spec.names)
        .iter()
        .enumerate()
        .map(|(i, name)| Value {
            name: file.name(name.sym).to_owned(),
            value: inits
                .get(i)
                .map(|&e| value_text(file, e))
                .unwrap_or_default(),
            typ: typ.clone(),
            doc: doc.clone(),
        })
        .collect()
}

fn type_doc(
    file: &ParsedFile,
    spec: &TypeSpec,
    fallback: Option<CommentGroupId>,
) -> TypeDoc {
    let mut fields = Vec::new();
    let kind = match file.arena.types[spec.typ] {
        Type::Struct { fields: list } => {
            for_each_name(file, list, |n, t| {
                fields.push(NamedValue::new(n, render_type(file, t)));
            });
            TypeKind::Struct
        }
        Type::Interface { .. } => TypeKind::Interface,
        _ => TypeKind::Other(underlying_name(file, spec.typ).unwrap_or_default()),
    };

    TypeDoc {
        name: file.name(spec.name.sym).to_owned(),
        doc: file.comment_text(spec.doc.or(fallback)),
        kind,
        fields,
        methods: Vec::new(),
    }
}

/// The identifier a type is defined from, looking through parentheses.
fn underlying_name(file: &ParsedFile, typ: TypeId) -> Option<String> {
    match file.arena.types[typ] {
        Type::Name(sym) => Some(file.name(sym).to_owned()),
        Type::Paren { typ } => underlying_name(file, typ),
        _ => None,
    }
}

/// Initializer text: basic literals verbatim, composite literals as the
/// space-joined text of their elements, anything else empty.
fn value_text(file: &ParsedFile, expr: ExprId) -> String {
    match file.arena.exprs[expr] {
        Expr::BasicLit(lit) => file.text(lit.raw).to_owned(),
        Expr::CompositeLit { lit, .. } => literal_text(file, lit),
        _ => String::new(),
    }
}

fn literal_text(file: &ParsedFile, lit: LiteralValue) -> String {
    let parts: Vec<String> = file
        .arena
        .keyed_elems_list(lit.elements)
        .iter()
        .map(|elem| match elem.value {
            Element::Expr(e) => value_text(file, e),
            Element::Literal(inner) => literal_text(file, inner),
        })
        .filter(|s| !s.is_empty())
        .collect();
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(sources: &[&str]) -> ParsedPackage {
        let files: Vec<(String, ParsedFile)> = sources
            .iter()
            .enumerate()
            .map(|(i, src)| {
                let parsed =
                    parse_file(src).unwrap_or_else(|f| panic!("{:?}", f.describe(src)));
                (format!("f{i}.go"), parsed)
            })
            .collect();
        ParsedPackage {
            name: files[0].1.package_name().to_owned(),
            dir: PathBuf::from("."),
            files,
        }
    }

    #[test]
    fn function_with_named_params_and_unnamed_result() {
        let doc = extract(&package(&[
            "package p\n\n// Check validates x.\nfunc Check(x int, y string) error { return nil }\n",
        ]));
        assert_eq!(
            doc.functions,
            vec![Function {
                name: "Check".into(),
                doc: "Check validates x.\n".into(),
                arguments: vec![NamedValue::new("x", "int"), NamedValue::new("y", "string")],
                results: vec![NamedValue::new("", "error")],
            }]
        );
    }

    #[test]
    fn grouped_values_flatten_per_name() {
        let doc = extract(&package(&[r#"package p

// Limits.
const (
	// Low is low.
	Low, High int = 1, 9
	// Name has no type.
	Name = "n"
)

var Bare int

var Primes = []int{2, 3, 5}
var Grid = [][]int{{1, 2}, {3}}
var Keyed = map[string]int{"a": 1}
var Neg = -1
"#]));

        let consts: Vec<(&str, &str, &str, &str)> = doc
            .constants
            .iter()
            .map(|v| (v.name.as_str(), v.value.as_str(), v.typ.as_str(), v.doc.as_str()))
            .collect();
        assert_eq!(
            consts,
            vec![
                ("Low", "1", "int", "Low is low.\n"),
                ("High", "9", "int", "Low is low.\n"),
                ("Name", "\"n\"", "", "Name has no type.\n"),
            ]
        );

        let vars: Vec<(&str, &str)> = doc
            .variables
            .iter()
            .map(|v| (v.name.as_str(), v.value.as_str()))
            .collect();
        assert_eq!(
            vars,
            vec![
                ("Bare", ""),
                ("Primes", "2 3 5"),
                ("Grid", "1 2 3"),
                ("Keyed", "1"),
                ("Neg", ""),
            ]
        );
    }

    #[test]
    fn type_kinds_and_fields() {
        let doc = extract(&package(&[r#"package p

// Pair holds two values.
type Pair struct {
	A int
	B string
}

type (
	// Reader reads.
	Reader interface {
		Read(p []byte) (n int, err error)
	}
	ID    int64
	Bytes []byte
	Alias = (string)
	Box   struct {
		Pair
		x, y *float64
	}
)
"#]));

        let kinds: Vec<(&str, &str)> = doc
            .types
            .iter()
            .map(|t| (t.name.as_str(), t.kind.as_str()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("Alias", "string"),
                ("Box", "struct"),
                ("Bytes", ""),
                ("ID", "int64"),
                ("Pair", "struct"),
                ("Reader", "interface"),
            ]
        );

        let pair = &doc.types[4];
        assert_eq!(pair.doc, "Pair holds two values.\n");
        assert_eq!(
            pair.fields,
            vec![NamedValue::new("A", "int"), NamedValue::new("B", "string")]
        );

        let reader = &doc.types[5];
        assert_eq!(reader.doc, "Reader reads.\n");
        assert!(reader.fields.is_empty());
        assert!(reader.methods.is_empty());

        assert_eq!(
            doc.types[1].fields,
            vec![
                NamedValue::new("", "Pair"),
                NamedValue::new("x", "*float64"),
                NamedValue::new("y", "*float64"),
            ]
        );
    }

    #[test]
    fn methods_are_not_functions_and_order_is_by_name() {
        let doc = extract(&package(&[
            "package p\n\nfunc Zed() {}\nfunc (p *P) M() {}\nfunc Alpha(fn func(int) (bool, error)) {}\n",
        ]));
        let names: Vec<&str> = doc.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Zed"]);
        assert_eq!(
            doc.functions[0].arguments,
            vec![NamedValue::new("fn", "func(int) (bool, error)")]
        );
    }

    #[test]
    fn overview_joins_package_docs_in_file_order() {
        let doc = extract(&package(&[
            "// Package p does things.\npackage p\n",
            "package p\n",
            "// More about p.\npackage p\n",
        ]));
        assert_eq!(doc.overview, "Package p does things.\n\nMore about p.\n");
    }
}
