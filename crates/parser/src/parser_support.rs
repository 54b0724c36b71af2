use crate::ast::{self, IdentName, Span};

/// One comma-separated entry of a parameter list before grouping.
///
/// `(a, b int)` arrives as `[a]` (no type) followed by `[b] int`; grouping
/// happens in [`resolve_param_list`] once the whole list has been read.
#[derive(Clone, Debug)]
pub struct ParamDecl {
    pub names: Vec<IdentName>,
    pub typ: Option<ast::TypeId>,
    pub span: Span,
}

/// Groups parameter entries into fields.
///
/// Pending bare identifiers attach to the next entry that has both a name and
/// a type. Bare identifiers that never find one were types all along
/// (`func(int, string)`), and become unnamed fields of a named type.
pub fn resolve_param_list(
    arena: &mut ast::AstArena,
    params: Vec<ParamDecl>,
) -> ast::ListRef<ast::FieldId> {
    let mut out = Vec::with_capacity(params.len());
    let mut pending: Vec<(IdentName, Span)> = Vec::new();

    for param in params {
        match param.typ {
            None => pending.extend(param.names.into_iter().map(|n| (n, param.span))),
            Some(typ) if !param.names.is_empty() => {
                let start = pending.first().map_or(param.span, |(_, s)| *s);
                let mut names: Vec<IdentName> = pending.drain(..).map(|(n, _)| n).collect();
                names.extend(param.names);
                let names = arena.list_ident_names(names);
                let field = ast::Field {
                    names,
                    typ,
                    tag: None,
                    embedded: false,
                };
                out.push(arena.fields.alloc(field, start.to(param.span)));
            }
            Some(typ) => {
                flush_as_types(arena, &mut pending, &mut out);
                let field = ast::Field {
                    names: ast::ListRef::EMPTY,
                    typ,
                    tag: None,
                    embedded: false,
                };
                out.push(arena.fields.alloc(field, param.span));
            }
        }
    }

    flush_as_types(arena, &mut pending, &mut out);
    arena.list_fields(out)
}

fn flush_as_types(
    arena: &mut ast::AstArena,
    pending: &mut Vec<(IdentName, Span)>,
    out: &mut Vec<ast::FieldId>,
) {
    for (name, span) in pending.drain(..) {
        let typ = arena.types.alloc(ast::Type::Name(name.sym), name.pos);
        let field = ast::Field {
            names: ast::ListRef::EMPTY,
            typ,
            tag: None,
            embedded: false,
        };
        out.push(arena.fields.alloc(field, span));
    }
}

/// Byte offset → 1-based line lookups over one source text.
#[derive(Debug)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(src: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(memchr::memchr_iter(b'\n', src.as_bytes()).map(|i| i + 1));
        Self { starts }
    }

    #[inline]
    pub fn line(&self, offset: usize) -> usize {
        self.starts.partition_point(|&s| s <= offset)
    }
}
