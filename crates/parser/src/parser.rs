//! Recursive-descent parser for Go declarations.
//!
//! Parses everything a package exposes at top level. Function bodies are
//! matched brace-for-brace and kept as spans. Comments are grouped while
//! tokens are buffered, and each token remembers the comment group that
//! ends on the line directly above it, which is how doc comments attach.

use crate::ast::{
    ArrayLen, AstArena, BasicLit, BasicLitKind, BinaryOp, ChanDir, Comment, CommentGroup,
    CommentGroupId, CommentKind, Element, Expr, ExprId, Field, FieldId, FuncDecl, FuncDeclId,
    GenDecl, GenDeclKind, IdentName, ImportName, ImportSpec, InterfaceElem, Interner,
    KeyedElement, ListRef, LiteralValue, ParsedFile, Signature, SignatureId, SourceFile, Span,
    Spec, TopLevelDecl, Type, TypeId, TypeSpec, TypeTerm, UnaryOp, ValueSpec,
};
use crate::error::{Diag, ParseFailure};
use crate::lexer::{Lexer, Spanned, Tok};
use crate::parser_support::{resolve_param_list, LineIndex, ParamDecl};

type PResult<T> = Result<T, Diag>;

/// Deepest nesting of types, expressions and literal values accepted.
pub const MAX_NESTING: usize = 200;

/// Parses one Go source file.
///
/// Lexical errors anywhere in the file, including inside function bodies,
/// fail the parse. Syntax errors stop at the first one found.
pub fn parse_file(src: &str) -> Result<ParsedFile, ParseFailure> {
    let (mut parser, lex_diags) = Parser::new(src);
    if !lex_diags.is_empty() {
        return Err(ParseFailure { diags: lex_diags });
    }

    let file = parser
        .source_file()
        .map_err(|d| ParseFailure { diags: vec![d] })?;

    Ok(ParsedFile {
        source: src.to_owned(),
        arena: parser.arena,
        interner: parser.interner,
        file,
    })
}

struct Parser<'src> {
    toks: Vec<Spanned<'src>>,
    /// Lead comment group of the token at the same index.
    docs: Vec<Option<CommentGroupId>>,
    pos: usize,
    prev_end: usize,
    depth: usize,
    arena: AstArena,
    interner: Interner,
}

// =============================================================================
// Token buffer and comment grouping
// =============================================================================

impl<'src> Parser<'src> {
    fn new(src: &'src str) -> (Self, Vec<Diag>) {
        let lines = LineIndex::new(src);
        let mut lexer = Lexer::new(src);
        let mut arena = AstArena::new();
        let mut toks = Vec::with_capacity(src.len() / 4);
        let mut docs = Vec::with_capacity(src.len() / 4);
        let mut comments: Vec<(usize, usize)> = Vec::new();
        let mut prev_line = None;

        for (start, tok, end) in lexer.by_ref() {
            if tok.is_comment() {
                comments.push((start, end));
                continue;
            }
            let line = lines.line(start);
            docs.push(lead_group(&mut arena, src, &lines, &comments, prev_line, line));
            comments.clear();
            toks.push((start, tok, end));
            prev_line = Some(lines.line(if end > start { end - 1 } else { start }));
        }

        toks.push((src.len(), Tok::Eof, src.len()));
        docs.push(None);

        let parser = Self {
            toks,
            docs,
            pos: 0,
            prev_end: 0,
            depth: 0,
            arena,
            interner: Interner::new(),
        };
        (parser, lexer.take_diags())
    }
}

/// Splits the comments between two tokens into groups and allocates the last
/// one if it is a lead comment for the token on `tok_line`.
///
/// Comments starting on the previous token's line form their own group and
/// are never lead comments.
fn lead_group(
    arena: &mut AstArena,
    src: &str,
    lines: &LineIndex,
    comments: &[(usize, usize)],
    prev_line: Option<usize>,
    tok_line: usize,
) -> Option<CommentGroupId> {
    let mut group_start = 0;
    let mut group_end_line = 0;
    let mut trailing = false;

    for (i, &(start, end)) in comments.iter().enumerate() {
        let start_line = lines.line(start);
        let new_group =
            i == 0 || start_line > group_end_line + 1 || (trailing && Some(start_line) != prev_line);
        if new_group {
            group_start = i;
            trailing = Some(start_line) == prev_line;
        }
        group_end_line = lines.line(end.saturating_sub(1).max(start));
    }

    if comments.is_empty() || trailing || group_end_line + 1 != tok_line {
        return None;
    }

    let group = &comments[group_start..];
    let ids: Vec<_> = group
        .iter()
        .map(|&(start, end)| {
            let kind = if src[start..].starts_with("/*") {
                CommentKind::Block
            } else {
                CommentKind::Line
            };
            arena.comments.alloc(Comment { kind }, Span::new(start, end))
        })
        .collect();
    let span = Span::new(group[0].0, group[group.len() - 1].1);
    let comments = arena.list_comment_ids(ids);
    Some(arena.comment_groups.alloc(CommentGroup { comments }, span))
}

/// Tokens that can begin a type.
fn starts_type(tok: Tok<'_>) -> bool {
    matches!(
        tok,
        Tok::Ident(_)
            | Tok::Star
            | Tok::LBrack
            | Tok::LParen
            | Tok::KwFunc
            | Tok::KwMap
            | Tok::KwChan
            | Tok::KwStruct
            | Tok::KwInterface
            | Tok::Arrow
    )
}

fn binary_op(tok: Tok<'_>) -> Option<BinaryOp> {
    Some(match tok {
        Tok::Plus => BinaryOp::Add,
        Tok::Minus => BinaryOp::Sub,
        Tok::Star => BinaryOp::Mul,
        Tok::Slash => BinaryOp::Div,
        Tok::Percent => BinaryOp::Mod,
        Tok::Amp => BinaryOp::And,
        Tok::Pipe => BinaryOp::Or,
        Tok::Caret => BinaryOp::Xor,
        Tok::Shl => BinaryOp::Shl,
        Tok::Shr => BinaryOp::Shr,
        Tok::AndNot => BinaryOp::AndNot,
        Tok::LAnd => BinaryOp::LAnd,
        Tok::LOr => BinaryOp::LOr,
        Tok::EqEq => BinaryOp::Eq,
        Tok::NotEq => BinaryOp::Ne,
        Tok::Lt => BinaryOp::Lt,
        Tok::Le => BinaryOp::Le,
        Tok::Gt => BinaryOp::Gt,
        Tok::Ge => BinaryOp::Ge,
        _ => return None,
    })
}

// =============================================================================
// Cursor helpers
// =============================================================================

impl<'src> Parser<'src> {
    #[inline]
    fn peek(&self) -> Tok<'src> {
        self.toks[self.pos].1
    }

    #[inline]
    fn peek_at(&self, n: usize) -> Tok<'src> {
        self.toks.get(self.pos + n).map_or(Tok::Eof, |t| t.1)
    }

    #[inline]
    fn start(&self) -> usize {
        self.toks[self.pos].0
    }

    #[inline]
    fn span(&self) -> Span {
        let (start, _, end) = self.toks[self.pos];
        Span::new(start, end)
    }

    #[inline]
    fn doc(&self) -> Option<CommentGroupId> {
        self.docs[self.pos]
    }

    /// Consumes the current token. Stays put on end of input.
    fn bump(&mut self) -> Spanned<'src> {
        let tok = self.toks[self.pos];
        if tok.1 != Tok::Eof {
            self.pos += 1;
        }
        self.prev_end = tok.2;
        tok
    }

    fn eat(&mut self, tok: Tok<'_>) -> bool {
        if self.peek() == tok {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: Tok<'_>) -> PResult<Span> {
        if self.peek() == tok {
            let (start, _, end) = self.bump();
            Ok(Span::new(start, end))
        } else {
            Err(Diag::parse(
                self.span(),
                format!("expected {tok}, found {}", self.peek()),
            ))
        }
    }

    fn error<T>(&self, expected: &str) -> PResult<T> {
        Err(Diag::parse(
            self.span(),
            format!("expected {expected}, found {}", self.peek()),
        ))
    }

    /// Runs `f` one nesting level deeper, failing past [`MAX_NESTING`].
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(Diag::parse(self.span(), "exceeded max nesting depth"));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Span from `start` to the end of the last consumed token.
    #[inline]
    fn since(&self, start: usize) -> Span {
        Span::new(start, self.prev_end.max(start))
    }

    fn ident(&mut self) -> PResult<IdentName> {
        match self.peek() {
            Tok::Ident(name) => {
                let (start, _, end) = self.bump();
                Ok(IdentName {
                    sym: self.interner.intern(name),
                    pos: Span::new(start, end),
                })
            }
            _ => self.error("identifier"),
        }
    }

    fn ident_list(&mut self) -> PResult<Vec<IdentName>> {
        let mut names = vec![self.ident()?];
        while self.eat(Tok::Comma) {
            names.push(self.ident()?);
        }
        Ok(names)
    }

    /// With the cursor on `Ident [`, decides whether the bracket opens an
    /// array or slice type (`buf [4]byte`) rather than a generic
    /// instantiation (`List[T]`). Looks at the token after the matching `]`.
    fn bracket_starts_type(&self) -> bool {
        let mut depth = 0usize;
        for (i, &(_, tok, _)) in self.toks.iter().enumerate().skip(self.pos + 1) {
            match tok {
                Tok::LBrack | Tok::LParen | Tok::LBrace => depth += 1,
                Tok::RBrack | Tok::RParen | Tok::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return self.toks.get(i + 1).is_some_and(|t| starts_type(t.1));
                    }
                }
                Tok::Eof => return false,
                _ => {}
            }
        }
        false
    }

    /// With the cursor on `[` after a type name, tells type parameters from
    /// an array length.
    fn starts_type_params(&self) -> bool {
        matches!(self.peek_at(1), Tok::Ident(_))
            && matches!(
                self.peek_at(2),
                Tok::Ident(_)
                    | Tok::Comma
                    | Tok::Tilde
                    | Tok::LBrack
                    | Tok::KwInterface
                    | Tok::KwFunc
                    | Tok::KwMap
                    | Tok::KwChan
                    | Tok::KwStruct
            )
    }

    /// Matches a `{ ... }` block without looking inside.
    fn skip_block(&mut self) -> PResult<Span> {
        let (start, _, _) = self.bump();
        let mut depth = 1usize;
        loop {
            let (_, tok, end) = self.bump();
            match tok {
                Tok::LBrace => depth += 1,
                Tok::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(Span::new(start, end));
                    }
                }
                Tok::Eof => {
                    return Err(Diag::parse(
                        Span::empty_at(end),
                        "unexpected end of file in function body",
                    ))
                }
                _ => {}
            }
        }
    }
}

// =============================================================================
// Declarations
// =============================================================================

impl<'src> Parser<'src> {
    fn source_file(&mut self) -> PResult<SourceFile> {
        let doc = self.doc();
        let package_pos = self.expect(Tok::KwPackage)?;
        let name = self.ident()?;
        self.end_decl()?;

        let mut decls = Vec::new();
        while self.peek() != Tok::Eof {
            if self.eat(Tok::Semi) {
                continue;
            }
            decls.push(self.top_level_decl()?);
            self.end_decl()?;
        }

        Ok(SourceFile {
            package_pos,
            name,
            doc,
            decls: self.arena.list_top_decls(decls),
        })
    }

    fn end_decl(&mut self) -> PResult<()> {
        if self.eat(Tok::Semi) || self.peek() == Tok::Eof {
            Ok(())
        } else {
            self.error("`;` or newline")
        }
    }

    fn top_level_decl(&mut self) -> PResult<TopLevelDecl> {
        match self.peek() {
            Tok::KwImport => self.gen_decl(GenDeclKind::Import),
            Tok::KwConst => self.gen_decl(GenDeclKind::Const),
            Tok::KwType => self.gen_decl(GenDeclKind::Type),
            Tok::KwVar => self.gen_decl(GenDeclKind::Var),
            Tok::KwFunc => Ok(TopLevelDecl::Func(self.func_decl()?)),
            _ => self.error("declaration"),
        }
    }

    fn gen_decl(&mut self, kind: GenDeclKind) -> PResult<TopLevelDecl> {
        let doc = self.doc();
        let (start, _, end) = self.bump();
        let kw_pos = Span::new(start, end);

        let mut specs = Vec::new();
        let l_paren = if self.peek() == Tok::LParen {
            let l_paren = self.expect(Tok::LParen)?;
            while !matches!(self.peek(), Tok::RParen | Tok::Eof) {
                let spec_doc = self.doc();
                specs.push(self.spec(kind, spec_doc)?);
                if !self.eat(Tok::Semi) && self.peek() != Tok::RParen {
                    return self.error("`;` or `)`");
                }
            }
            self.expect(Tok::RParen)?;
            Some(l_paren)
        } else {
            specs.push(self.spec(kind, None)?);
            None
        };

        Ok(TopLevelDecl::Gen(GenDecl {
            doc,
            kw_pos,
            kind,
            l_paren,
            specs: self.arena.list_specs(specs),
        }))
    }

    fn spec(&mut self, kind: GenDeclKind, doc: Option<CommentGroupId>) -> PResult<Spec> {
        match kind {
            GenDeclKind::Import => self.import_spec().map(Spec::Import),
            GenDeclKind::Const | GenDeclKind::Var => self.value_spec(doc).map(Spec::Value),
            GenDeclKind::Type => self.type_spec(doc).map(Spec::Type),
        }
    }

    fn import_spec(&mut self) -> PResult<ImportSpec> {
        let name = match self.peek() {
            Tok::Dot => Some(ImportName::Dot(self.expect(Tok::Dot)?)),
            Tok::Ident(_) => Some(ImportName::Name(self.ident()?)),
            _ => None,
        };
        match self.peek() {
            Tok::StringLit(_) | Tok::RawStringLit(_) => {
                let path = self.span();
                self.bump();
                Ok(ImportSpec { name, path })
            }
            _ => self.error("import path"),
        }
    }

    fn value_spec(&mut self, doc: Option<CommentGroupId>) -> PResult<ValueSpec> {
        let names = self.ident_list()?;
        let typ = if matches!(
            self.peek(),
            Tok::Assign | Tok::Semi | Tok::RParen | Tok::Eof
        ) {
            None
        } else {
            Some(self.parse_type()?)
        };
        let values = if self.eat(Tok::Assign) {
            self.expr_list()?
        } else {
            Vec::new()
        };

        Ok(ValueSpec {
            doc,
            names: self.arena.list_ident_names(names),
            typ,
            values: self.arena.list_exprs(values),
        })
    }

    fn type_spec(&mut self, doc: Option<CommentGroupId>) -> PResult<TypeSpec> {
        let name = self.ident()?;
        let type_params = if self.peek() == Tok::LBrack && self.starts_type_params() {
            self.bump();
            self.param_list(Tok::RBrack, true)?
        } else {
            ListRef::EMPTY
        };
        let alias = self.eat(Tok::Assign);
        let typ = self.parse_type()?;

        Ok(TypeSpec {
            doc,
            name,
            type_params,
            alias,
            typ,
        })
    }

    fn func_decl(&mut self) -> PResult<FuncDeclId> {
        let doc = self.doc();
        let start = self.start();
        let func_pos = self.expect(Tok::KwFunc)?;

        let recv = if self.eat(Tok::LParen) {
            let fields = self.param_list(Tok::RParen, false)?;
            self.arena.fields_list(fields).first().copied()
        } else {
            None
        };

        let name = self.ident()?;
        let type_params = if self.eat(Tok::LBrack) {
            self.param_list(Tok::RBrack, true)?
        } else {
            ListRef::EMPTY
        };
        let signature = self.signature()?;
        let body = if self.peek() == Tok::LBrace {
            Some(self.skip_block()?)
        } else {
            None
        };

        let decl = FuncDecl {
            doc,
            func_pos,
            recv,
            name,
            type_params,
            signature,
            body,
        };
        Ok(self.arena.funcs.alloc(decl, self.since(start)))
    }

    fn signature(&mut self) -> PResult<SignatureId> {
        let start = self.start();
        self.expect(Tok::LParen)?;
        let params = self.param_list(Tok::RParen, false)?;

        let results = if self.eat(Tok::LParen) {
            self.param_list(Tok::RParen, false)?
        } else if starts_type(self.peek()) {
            let typ = self.parse_type()?;
            let field = Field {
                names: ListRef::EMPTY,
                typ,
                tag: None,
                embedded: false,
            };
            let field = self.arena.fields.alloc(field, self.arena.types.span(typ));
            self.arena.list_fields([field])
        } else {
            ListRef::EMPTY
        };

        let sig = Signature { params, results };
        Ok(self.arena.signatures.alloc(sig, self.since(start)))
    }

    /// Parameter, result or type parameter list; the opening delimiter has
    /// already been consumed and `close` is consumed here.
    fn param_list(&mut self, close: Tok<'src>, constraints: bool) -> PResult<ListRef<FieldId>> {
        let mut params = Vec::new();
        while self.peek() != close {
            let start = self.start();
            let (names, typ) = self.param_decl(close, constraints)?;
            params.push(ParamDecl {
                names,
                typ,
                span: self.since(start),
            });
            if !self.eat(Tok::Comma) {
                break;
            }
        }
        self.expect(close)?;
        Ok(resolve_param_list(&mut self.arena, params))
    }

    fn param_decl(
        &mut self,
        close: Tok<'src>,
        constraints: bool,
    ) -> PResult<(Vec<IdentName>, Option<TypeId>)> {
        match (self.peek(), self.peek_at(1)) {
            (Tok::Ident(_), next) if next == close || next == Tok::Comma => {
                Ok((vec![self.ident()?], None))
            }
            (Tok::Ident(_), Tok::Dot) => Ok((Vec::new(), Some(self.param_type(constraints)?))),
            (Tok::Ident(_), Tok::Ellipsis) => {
                let name = self.ident()?;
                Ok((vec![name], Some(self.variadic()?)))
            }
            (Tok::Ident(_), Tok::LBrack) if !self.bracket_starts_type() => {
                Ok((Vec::new(), Some(self.param_type(constraints)?)))
            }
            (Tok::Ident(_), _) => {
                let name = self.ident()?;
                Ok((vec![name], Some(self.param_type(constraints)?)))
            }
            (Tok::Ellipsis, _) => Ok((Vec::new(), Some(self.variadic()?))),
            _ => Ok((Vec::new(), Some(self.param_type(constraints)?))),
        }
    }

    fn param_type(&mut self, constraints: bool) -> PResult<TypeId> {
        if constraints {
            self.constraint()
        } else {
            self.parse_type()
        }
    }

    fn variadic(&mut self) -> PResult<TypeId> {
        let start = self.start();
        self.expect(Tok::Ellipsis)?;
        let elem = self.parse_type()?;
        Ok(self
            .arena
            .types
            .alloc(Type::Ellipsis { elem }, self.since(start)))
    }

    fn constraint(&mut self) -> PResult<TypeId> {
        let start = self.start();
        let mut terms = vec![self.type_term()?];
        while self.eat(Tok::Pipe) {
            terms.push(self.type_term()?);
        }
        if let &[TypeTerm { tilde: false, typ }] = terms.as_slice() {
            return Ok(typ);
        }
        let terms = self.arena.list_type_terms(terms);
        Ok(self.arena.types.alloc(Type::Union { terms }, self.since(start)))
    }

    fn type_term(&mut self) -> PResult<TypeTerm> {
        let tilde = self.eat(Tok::Tilde);
        Ok(TypeTerm {
            tilde,
            typ: self.parse_type()?,
        })
    }
}

// =============================================================================
// Types
// =============================================================================

impl<'src> Parser<'src> {
    fn parse_type(&mut self) -> PResult<TypeId> {
        self.nested(Self::type_lit)
    }

    fn type_lit(&mut self) -> PResult<TypeId> {
        let start = self.start();
        let typ = match self.peek() {
            Tok::Ident(_) => return self.type_name(),
            Tok::Star => {
                self.bump();
                Type::Pointer {
                    elem: self.parse_type()?,
                }
            }
            Tok::LBrack => {
                self.bump();
                if self.eat(Tok::RBrack) {
                    Type::Slice {
                        elem: self.parse_type()?,
                    }
                } else {
                    let len = if self.peek() == Tok::Ellipsis && self.peek_at(1) == Tok::RBrack {
                        self.bump();
                        ArrayLen::Ellipsis
                    } else {
                        ArrayLen::Expr(self.expr()?)
                    };
                    self.expect(Tok::RBrack)?;
                    Type::Array {
                        len,
                        elem: self.parse_type()?,
                    }
                }
            }
            Tok::KwMap => {
                self.bump();
                self.expect(Tok::LBrack)?;
                let key = self.parse_type()?;
                self.expect(Tok::RBrack)?;
                Type::Map {
                    key,
                    val: self.parse_type()?,
                }
            }
            Tok::KwChan => {
                self.bump();
                let dir = if self.eat(Tok::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Type::Chan {
                    dir,
                    elem: self.parse_type()?,
                }
            }
            Tok::Arrow => {
                self.bump();
                self.expect(Tok::KwChan)?;
                Type::Chan {
                    dir: ChanDir::Recv,
                    elem: self.parse_type()?,
                }
            }
            Tok::KwFunc => {
                self.bump();
                Type::Func {
                    sig: self.signature()?,
                }
            }
            Tok::KwStruct => self.struct_type()?,
            Tok::KwInterface => self.interface_type()?,
            Tok::LParen => {
                self.bump();
                let typ = self.parse_type()?;
                self.expect(Tok::RParen)?;
                Type::Paren { typ }
            }
            _ => return self.error("type"),
        };
        Ok(self.arena.types.alloc(typ, self.since(start)))
    }

    /// `T`, `pkg.T`, optionally instantiated: `T[A, B]`.
    fn type_name(&mut self) -> PResult<TypeId> {
        let start = self.start();
        let first = self.ident()?;
        let mut typ = self.arena.types.alloc(Type::Name(first.sym), first.pos);

        if self.eat(Tok::Dot) {
            let member = self.ident()?.sym;
            typ = self
                .arena
                .types
                .alloc(Type::Selector { base: typ, member }, self.since(start));
        }

        if self.peek() == Tok::LBrack && self.peek_at(1) != Tok::RBrack {
            self.bump();
            let mut args = vec![self.parse_type()?];
            while self.eat(Tok::Comma) {
                if self.peek() == Tok::RBrack {
                    break;
                }
                args.push(self.parse_type()?);
            }
            self.expect(Tok::RBrack)?;
            let args = self.arena.list_types(args);
            typ = self
                .arena
                .types
                .alloc(Type::Instance { base: typ, args }, self.since(start));
        }

        Ok(typ)
    }

    fn struct_type(&mut self) -> PResult<Type> {
        self.expect(Tok::KwStruct)?;
        self.expect(Tok::LBrace)?;

        let mut fields = Vec::new();
        while !matches!(self.peek(), Tok::RBrace | Tok::Eof) {
            fields.push(self.field_decl()?);
            if !self.eat(Tok::Semi) && self.peek() != Tok::RBrace {
                return self.error("`;` or `}`");
            }
        }
        self.expect(Tok::RBrace)?;

        Ok(Type::Struct {
            fields: self.arena.list_fields(fields),
        })
    }

    fn field_decl(&mut self) -> PResult<FieldId> {
        let start = self.start();
        let embedded = match (self.peek(), self.peek_at(1)) {
            (Tok::Star, _) => true,
            (
                Tok::Ident(_),
                Tok::Dot | Tok::Semi | Tok::RBrace | Tok::StringLit(_) | Tok::RawStringLit(_),
            ) => true,
            (Tok::Ident(_), Tok::LBrack) => !self.bracket_starts_type(),
            (Tok::Ident(_), _) => false,
            _ => return self.error("field name or embedded type"),
        };

        let (names, typ) = if embedded {
            (ListRef::EMPTY, self.parse_type()?)
        } else {
            let names = self.ident_list()?;
            let names = self.arena.list_ident_names(names);
            (names, self.parse_type()?)
        };

        let tag = match self.peek() {
            Tok::StringLit(_) | Tok::RawStringLit(_) => {
                let tag = self.span();
                self.bump();
                Some(tag)
            }
            _ => None,
        };

        let field = Field {
            names,
            typ,
            tag,
            embedded,
        };
        Ok(self.arena.fields.alloc(field, self.since(start)))
    }

    fn interface_type(&mut self) -> PResult<Type> {
        self.expect(Tok::KwInterface)?;
        self.expect(Tok::LBrace)?;

        let mut elems = Vec::new();
        while !matches!(self.peek(), Tok::RBrace | Tok::Eof) {
            let elem = if matches!(self.peek(), Tok::Ident(_)) && self.peek_at(1) == Tok::LParen {
                let name = self.ident()?;
                InterfaceElem::Method {
                    name,
                    sig: self.signature()?,
                }
            } else {
                let mut terms = vec![self.type_term()?];
                while self.eat(Tok::Pipe) {
                    terms.push(self.type_term()?);
                }
                InterfaceElem::Embed {
                    terms: self.arena.list_type_terms(terms),
                }
            };
            elems.push(elem);
            if !self.eat(Tok::Semi) && self.peek() != Tok::RBrace {
                return self.error("`;` or `}`");
            }
        }
        self.expect(Tok::RBrace)?;

        Ok(Type::Interface {
            elems: self.arena.list_interface_elems(elems),
        })
    }
}

// =============================================================================
// Expressions
// =============================================================================

impl<'src> Parser<'src> {
    fn expr_list(&mut self) -> PResult<Vec<ExprId>> {
        let mut exprs = vec![self.expr()?];
        while self.eat(Tok::Comma) {
            exprs.push(self.expr()?);
        }
        Ok(exprs)
    }

    fn expr(&mut self) -> PResult<ExprId> {
        self.binary_expr(1)
    }

    fn binary_expr(&mut self, min_prec: u8) -> PResult<ExprId> {
        let start = self.start();
        let mut left = self.unary_expr()?;
        while let Some(op) = binary_op(self.peek()) {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.bump();
            let right = self.binary_expr(prec + 1)?;
            left = self
                .arena
                .exprs
                .alloc(Expr::Binary { left, op, right }, self.since(start));
        }
        Ok(left)
    }

    fn unary_expr(&mut self) -> PResult<ExprId> {
        self.nested(Self::unary_operand)
    }

    fn unary_operand(&mut self) -> PResult<ExprId> {
        let start = self.start();
        let op = match self.peek() {
            Tok::Plus => UnaryOp::Add,
            Tok::Minus => UnaryOp::Sub,
            Tok::Bang => UnaryOp::Not,
            Tok::Caret => UnaryOp::Xor,
            Tok::Star => UnaryOp::Deref,
            Tok::Amp => UnaryOp::Addr,
            Tok::Tilde => UnaryOp::Tilde,
            Tok::Arrow if self.peek_at(1) == Tok::KwChan => {
                let typ = self.parse_type()?;
                return Ok(self.arena.exprs.alloc(Expr::Type(typ), self.since(start)));
            }
            Tok::Arrow => UnaryOp::Recv,
            _ => return self.primary_expr(),
        };
        self.bump();
        let expr = self.unary_expr()?;
        Ok(self
            .arena
            .exprs
            .alloc(Expr::Unary { op, expr }, self.since(start)))
    }

    fn primary_expr(&mut self) -> PResult<ExprId> {
        let start = self.start();
        let mut x = self.operand()?;
        loop {
            let expr = match self.peek() {
                Tok::Dot => {
                    self.bump();
                    match self.peek() {
                        Tok::Ident(_) => Expr::Selector {
                            expr: x,
                            sel: self.ident()?.sym,
                        },
                        Tok::LParen => {
                            self.bump();
                            let typ = if self.eat(Tok::KwType) {
                                None
                            } else {
                                Some(self.parse_type()?)
                            };
                            self.expect(Tok::RParen)?;
                            Expr::TypeAssert { expr: x, typ }
                        }
                        _ => return self.error("selector or type assertion"),
                    }
                }
                Tok::LBrack => {
                    self.bump();
                    self.index_or_slice(x)?
                }
                Tok::LParen => {
                    self.bump();
                    self.call(x)?
                }
                Tok::LBrace if self.is_literal_type(x) => Expr::CompositeLit {
                    typ: Some(x),
                    lit: self.literal_value()?,
                },
                _ => return Ok(x),
            };
            x = self.arena.exprs.alloc(expr, self.since(start));
        }
    }

    /// Expressions that may name the type of a composite literal.
    fn is_literal_type(&self, x: ExprId) -> bool {
        match self.arena.exprs[x] {
            Expr::Ident(_) | Expr::Type(_) => true,
            Expr::Selector { expr, .. } => matches!(self.arena.exprs[expr], Expr::Ident(_)),
            Expr::Index { expr, .. } => self.is_literal_type(expr),
            _ => false,
        }
    }

    fn operand(&mut self) -> PResult<ExprId> {
        let start = self.start();
        let expr = match self.peek() {
            Tok::Ident(name) => {
                self.bump();
                Expr::Ident(self.interner.intern(name))
            }
            Tok::IntLit(_) => self.basic_lit(BasicLitKind::Int),
            Tok::FloatLit(_) => self.basic_lit(BasicLitKind::Float),
            Tok::ImagLit(_) => self.basic_lit(BasicLitKind::Imag),
            Tok::RuneLit(_) => self.basic_lit(BasicLitKind::Rune),
            Tok::StringLit(_) | Tok::RawStringLit(_) => self.basic_lit(BasicLitKind::String),
            Tok::LParen => {
                self.bump();
                let inner = self.expr()?;
                self.expect(Tok::RParen)?;
                Expr::Paren(inner)
            }
            Tok::KwFunc => {
                self.bump();
                let sig = self.signature()?;
                if self.peek() == Tok::LBrace {
                    Expr::FuncLit {
                        sig,
                        body: self.skip_block()?,
                    }
                } else {
                    let typ = self.arena.types.alloc(Type::Func { sig }, self.since(start));
                    Expr::Type(typ)
                }
            }
            Tok::LBrack | Tok::KwMap | Tok::KwChan | Tok::KwStruct | Tok::KwInterface => {
                Expr::Type(self.parse_type()?)
            }
            _ => return self.error("expression"),
        };
        Ok(self.arena.exprs.alloc(expr, self.since(start)))
    }

    fn basic_lit(&mut self, kind: BasicLitKind) -> Expr {
        let (start, _, end) = self.bump();
        Expr::BasicLit(BasicLit {
            kind,
            raw: Span::new(start, end),
        })
    }

    /// After `x[`: an index list, generic instantiation or slice expression.
    fn index_or_slice(&mut self, expr: ExprId) -> PResult<Expr> {
        let mut parts: [Option<ExprId>; 3] = [None; 3];

        if self.peek() != Tok::Colon {
            let first = self.expr()?;
            if self.peek() != Tok::Colon {
                let mut indices = vec![first];
                while self.eat(Tok::Comma) {
                    if self.peek() == Tok::RBrack {
                        break;
                    }
                    indices.push(self.expr()?);
                }
                self.expect(Tok::RBrack)?;
                return Ok(Expr::Index {
                    expr,
                    indices: self.arena.list_exprs(indices),
                });
            }
            parts[0] = Some(first);
        }

        let mut colons = 0;
        while self.eat(Tok::Colon) {
            colons += 1;
            if colons > 2 {
                return self.error("`]`");
            }
            if !matches!(self.peek(), Tok::Colon | Tok::RBrack) {
                parts[colons] = Some(self.expr()?);
            }
        }
        self.expect(Tok::RBrack)?;

        let [lo, hi, max] = parts;
        Ok(Expr::Slice { expr, lo, hi, max })
    }

    fn call(&mut self, func: ExprId) -> PResult<Expr> {
        let mut args = Vec::new();
        let mut ellipsis = false;
        while self.peek() != Tok::RParen {
            args.push(self.expr()?);
            if self.eat(Tok::Ellipsis) {
                ellipsis = true;
            }
            if !self.eat(Tok::Comma) {
                break;
            }
        }
        self.expect(Tok::RParen)?;
        Ok(Expr::Call {
            func,
            args: self.arena.list_exprs(args),
            ellipsis,
        })
    }

    fn literal_value(&mut self) -> PResult<LiteralValue> {
        self.nested(Self::literal_elements)
    }

    fn literal_elements(&mut self) -> PResult<LiteralValue> {
        self.expect(Tok::LBrace)?;
        let mut elements = Vec::new();
        while !matches!(self.peek(), Tok::RBrace | Tok::Eof) {
            let first = self.element()?;
            let elem = if self.eat(Tok::Colon) {
                KeyedElement {
                    key: Some(first),
                    value: self.element()?,
                }
            } else {
                KeyedElement {
                    key: None,
                    value: first,
                }
            };
            elements.push(elem);
            if !self.eat(Tok::Comma) {
                break;
            }
        }
        self.expect(Tok::RBrace)?;
        Ok(LiteralValue {
            elements: self.arena.list_keyed_elems(elements),
        })
    }

    fn element(&mut self) -> PResult<Element> {
        if self.peek() == Tok::LBrace {
            Ok(Element::Literal(self.literal_value()?))
        } else {
            Ok(Element::Expr(self.expr()?))
        }
    }
}
