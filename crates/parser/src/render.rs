//! Canonical text for type expressions.
//!
//! Rendering is total: shapes without a textual form here (generic
//! instantiations, constraint unions) produce nothing, so a containing type
//! still renders around them.

use crate::ast::{ArrayLen, ChanDir, FieldId, ListRef, ParsedFile, SignatureId, Type, TypeId};
use std::fmt::Write;

/// Renders a type expression, e.g. `map[string][]*pkg.T`.
pub fn render_type(file: &ParsedFile, typ: TypeId) -> String {
    let mut out = String::new();
    write_type(file, typ, &mut out);
    out
}

/// Renders a function signature without the `func` keyword: `(a int) error`.
pub fn render_signature(file: &ParsedFile, sig: SignatureId) -> String {
    let mut out = String::new();
    write_signature(file, sig, &mut out);
    out
}

fn write_type(file: &ParsedFile, typ: TypeId, out: &mut String) {
    let arena = &file.arena;
    match arena.types[typ] {
        Type::Name(sym) => out.push_str(file.name(sym)),
        Type::Selector { base, member } => {
            write_type(file, base, out);
            out.push('.');
            out.push_str(file.name(member));
        }
        Type::Pointer { elem } => {
            out.push('*');
            write_type(file, elem, out);
        }
        Type::Slice { elem } => {
            out.push_str("[]");
            write_type(file, elem, out);
        }
        Type::Array { len, elem } => {
            out.push('[');
            match len {
                ArrayLen::Expr(e) => out.push_str(file.text(arena.exprs.span(e))),
                ArrayLen::Ellipsis => out.push_str("..."),
            }
            out.push(']');
            write_type(file, elem, out);
        }
        Type::Map { key, val } => {
            out.push_str("map[");
            write_type(file, key, out);
            out.push(']');
            write_type(file, val, out);
        }
        Type::Chan { dir, elem } => {
            out.push_str(match dir {
                ChanDir::Send => "chan<- ",
                ChanDir::Recv => "<-chan ",
                ChanDir::Both => "chan ",
            });
            write_type(file, elem, out);
        }
        Type::Func { sig } => {
            out.push_str("func");
            write_signature(file, sig, out);
        }
        Type::Interface { .. } => out.push_str("interface{}"),
        Type::Struct { .. } => out.push_str("struct{...}"),
        Type::Ellipsis { elem } => {
            out.push_str("...");
            write_type(file, elem, out);
        }
        Type::Paren { typ } => write_type(file, typ, out),
        Type::Instance { .. } | Type::Union { .. } => {}
    }
}

fn write_signature(file: &ParsedFile, sig: SignatureId, out: &mut String) {
    let sig = file.arena.signatures[sig];

    out.push('(');
    let mut first = true;
    for_each_name(file, sig.params, |name, typ| {
        if !first {
            out.push_str(", ");
        }
        first = false;
        if !name.is_empty() {
            let _ = write!(out, "{name} ");
        }
        write_type(file, typ, out);
    });
    out.push(')');

    let mut results = Vec::new();
    for_each_name(file, sig.results, |_, typ| results.push(render_type(file, typ)));
    match results.as_slice() {
        [] => {}
        [one] => {
            out.push(' ');
            out.push_str(one);
        }
        many => {
            let _ = write!(out, " ({})", many.join(", "));
        }
    }
}

/// Visits a field list one name at a time; unnamed fields are visited once
/// with an empty name.
pub fn for_each_name<'f>(
    file: &'f ParsedFile,
    fields: ListRef<FieldId>,
    mut f: impl FnMut(&'f str, TypeId),
) {
    let arena = &file.arena;
    for &field in arena.fields_list(fields) {
        let field = &arena.fields[field];
        let names = arena.ident_names(field.names);
        if names.is_empty() {
            f("", field.typ);
        }
        for name in names {
            f(file.name(name.sym), field.typ);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstArena, Field, IdentName, Interner, Signature, SourceFile, Span};

    /// Builds types by hand so the renderer is exercised without the parser.
    struct Builder {
        arena: AstArena,
        interner: Interner,
    }

    impl Builder {
        fn new() -> Self {
            Self {
                arena: AstArena::new(),
                interner: Interner::new(),
            }
        }

        fn ty(&mut self, t: Type) -> TypeId {
            self.arena.types.alloc(t, Span::default())
        }

        fn name(&mut self, s: &str) -> TypeId {
            let sym = self.interner.intern(s);
            self.ty(Type::Name(sym))
        }

        fn field(&mut self, names: &[&str], typ: TypeId) -> FieldId {
            let names: Vec<IdentName> = names
                .iter()
                .map(|n| IdentName {
                    sym: self.interner.intern(n),
                    pos: Span::default(),
                })
                .collect();
            let names = self.arena.list_ident_names(names);
            let field = Field {
                names,
                typ,
                tag: None,
                embedded: false,
            };
            self.arena.fields.alloc(field, Span::default())
        }

        fn func(&mut self, params: Vec<FieldId>, results: Vec<FieldId>) -> TypeId {
            let params = self.arena.list_fields(params);
            let results = self.arena.list_fields(results);
            let sig = self
                .arena
                .signatures
                .alloc(Signature { params, results }, Span::default());
            self.ty(Type::Func { sig })
        }

        fn finish(mut self) -> ParsedFile {
            let sym = self.interner.intern("p");
            ParsedFile {
                source: String::new(),
                arena: self.arena,
                interner: self.interner,
                file: SourceFile {
                    package_pos: Span::default(),
                    name: IdentName {
                        sym,
                        pos: Span::default(),
                    },
                    doc: None,
                    decls: ListRef::EMPTY,
                },
            }
        }
    }

    #[test]
    fn pointer_to_slice() {
        let mut b = Builder::new();
        let t = b.name("T");
        let s = b.ty(Type::Slice { elem: t });
        let p = b.ty(Type::Pointer { elem: s });
        let file = b.finish();
        assert_eq!(render_type(&file, p), "*[]T");
        assert_eq!(render_type(&file, p), render_type(&file, p));
    }

    #[test]
    fn maps_channels_and_selectors() {
        let mut b = Builder::new();
        let key = b.name("string");
        let base = b.name("io");
        let member = b.interner.intern("Reader");
        let sel = b.ty(Type::Selector { base, member });
        let map = b.ty(Type::Map { key, val: sel });
        let int = b.name("int");
        let send = b.ty(Type::Chan {
            dir: ChanDir::Send,
            elem: int,
        });
        let recv = b.ty(Type::Chan {
            dir: ChanDir::Recv,
            elem: int,
        });
        let both = b.ty(Type::Chan {
            dir: ChanDir::Both,
            elem: int,
        });
        let file = b.finish();
        assert_eq!(render_type(&file, map), "map[string]io.Reader");
        assert_eq!(render_type(&file, send), "chan<- int");
        assert_eq!(render_type(&file, recv), "<-chan int");
        assert_eq!(render_type(&file, both), "chan int");
    }

    #[test]
    fn func_results_zero_one_many() {
        let mut b = Builder::new();
        let none = b.func(vec![], vec![]);
        let err = b.name("error");
        let one_field = b.field(&[], err);
        let one = b.func(vec![], vec![one_field]);
        let int = b.name("int");
        let r0 = b.field(&[], int);
        let r1 = b.field(&[], err);
        let two = b.func(vec![], vec![r0, r1]);
        let file = b.finish();
        assert_eq!(render_type(&file, none), "func()");
        assert_eq!(render_type(&file, one), "func() error");
        assert_eq!(render_type(&file, two), "func() (int, error)");
    }

    #[test]
    fn named_params_and_variadic() {
        let mut b = Builder::new();
        let int = b.name("int");
        let xy = b.field(&["x", "y"], int);
        let string = b.name("string");
        let rest_ty = b.ty(Type::Ellipsis { elem: string });
        let rest = b.field(&["rest"], rest_ty);
        let f = b.func(vec![xy, rest], vec![]);
        let file = b.finish();
        assert_eq!(render_type(&file, f), "func(x int, y int, rest ...string)");
    }

    #[test]
    fn opaque_and_unsupported_shapes() {
        let mut b = Builder::new();
        let st = b.ty(Type::Struct {
            fields: ListRef::EMPTY,
        });
        let it = b.ty(Type::Interface {
            elems: ListRef::EMPTY,
        });
        let base = b.name("List");
        let args = b.arena.list_types([base]);
        let inst = b.ty(Type::Instance { base, args });
        let ptr = b.ty(Type::Pointer { elem: inst });
        let paren = b.ty(Type::Paren { typ: st });
        let file = b.finish();
        assert_eq!(render_type(&file, st), "struct{...}");
        assert_eq!(render_type(&file, it), "interface{}");
        assert_eq!(render_type(&file, inst), "");
        assert_eq!(render_type(&file, ptr), "*");
        assert_eq!(render_type(&file, paren), "struct{...}");
    }

    #[test]
    fn arrays_use_their_length_text() {
        let file = crate::parse_file("package p\n\nvar a [2 * N]byte\nvar b = [...]int{1}\n")
            .unwrap_or_else(|e| panic!("{:?}", e.diags));
        let arrays: Vec<String> = (0..file.arena.types.len())
            .map(|i| TypeId::from_raw(i as u32))
            .filter(|&t| matches!(file.arena.types[t], Type::Array { .. }))
            .map(|t| render_type(&file, t))
            .collect();
        assert_eq!(arrays, vec!["[2 * N]byte", "[...]int"]);
    }
}
