//! # Go declaration-level syntax tree
//!
//! Arena-allocated AST covering what a Go source file exposes at package
//! level: the package clause, imports, constants, variables, types and
//! functions. Function bodies are recorded by span only.
//!
//! ## Architecture
//!
//! - **Nodes**: allocated in typed arenas (`SpannedArena<T>`) and referenced by `Id<T>`
//! - **Lists**: stored in centralized buffers, referenced by `ListRef<T>`
//! - **Spans**: kept in side tables next to each arena
//! - **Symbols**: identifiers are interned once per file
//!
//! The tree models syntax only. Nothing here resolves names or checks types.

use core::marker::PhantomData;
use core::ops::{Index, IndexMut};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::hash::{BuildHasher, BuildHasherDefault, Hasher, RandomState};

pub use crate::error::Span;

// =============================================================================
// Core Foundation Types
// =============================================================================

/// Type-safe identifier for arena-allocated nodes.
#[derive(Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Id<T> {
    raw: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Copy for Id<T> {}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Id<T> {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub const fn to_usize(&self) -> usize {
        self.raw as usize
    }
}

/// Typed reference into a centralized list buffer.
#[derive(Debug, PartialEq, Eq)]
pub struct ListRef<T> {
    start: u32,
    len: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Copy for ListRef<T> {}

impl<T> Clone for ListRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Default for ListRef<T> {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl<T> ListRef<T> {
    pub const EMPTY: Self = Self {
        start: 0,
        len: 0,
        _marker: PhantomData,
    };

    #[inline]
    pub const fn new(start: u32, len: u32) -> Self {
        Self {
            start,
            len,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.len
    }

    #[inline]
    const fn range(&self) -> core::ops::Range<usize> {
        self.start as usize..(self.start + self.len) as usize
    }
}

// =============================================================================
// Symbol Interning
// =============================================================================

/// Interned string symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Symbol(u32);

pub type Ident = Symbol;

/// Identifier occurrence (interned symbol + source position).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentName {
    pub sym: Ident,
    pub pos: Span,
}

#[derive(Default)]
struct U64IdentityHasher(u64);

impl Hasher for U64IdentityHasher {
    fn write(&mut self, _b: &[u8]) {
        unreachable!("U64IdentityHasher only supports write_u64")
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.0 = i;
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }
}

type U64IdentityBuild = BuildHasherDefault<U64IdentityHasher>;

/// String interner. Symbols are stored once and looked up via hash buckets.
#[derive(Debug, Default)]
pub struct Interner {
    strings: Vec<Box<str>>,
    buckets: HashMap<u64, SmallVec<[Symbol; 1]>, U64IdentityBuild>,
    state: RandomState,
}

impl Interner {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn intern(&mut self, s: &str) -> Symbol {
        let h = self.state.hash_one(s);
        let entry = self.buckets.entry(h).or_default();

        for &sym in entry.iter() {
            if self.strings[sym.0 as usize].as_ref() == s {
                return sym;
            }
        }

        let sym = Symbol(self.strings.len() as u32);
        self.strings.push(s.into());
        entry.push(sym);
        sym
    }

    /// Resolves a symbol back to its string. Unknown symbols resolve to `""`.
    #[inline]
    pub fn resolve(&self, sym: Symbol) -> &str {
        self.strings
            .get(sym.0 as usize)
            .map(AsRef::as_ref)
            .unwrap_or("")
    }
}

// =============================================================================
// Arena Allocation
// =============================================================================

/// Arena for nodes with associated spans, stored in parallel vectors.
#[derive(Debug)]
pub struct SpannedArena<T> {
    data: Vec<T>,
    spans: Vec<Span>,
}

impl<T> Default for SpannedArena<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            spans: Vec::new(),
        }
    }
}

impl<T> SpannedArena<T> {
    #[inline]
    pub fn alloc(&mut self, node: T, span: Span) -> Id<T> {
        let id = Id::from_raw(self.data.len() as u32);
        self.data.push(node);
        self.spans.push(span);
        id
    }

    #[inline]
    pub fn span(&self, id: Id<T>) -> Span {
        self.spans[id.to_usize()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> Index<Id<T>> for SpannedArena<T> {
    type Output = T;
    fn index(&self, id: Id<T>) -> &T {
        &self.data[id.to_usize()]
    }
}

impl<T> IndexMut<Id<T>> for SpannedArena<T> {
    fn index_mut(&mut self, id: Id<T>) -> &mut T {
        &mut self.data[id.to_usize()]
    }
}

pub type ExprId = Id<Expr>;
pub type TypeId = Id<Type>;
pub type FieldId = Id<Field>;
pub type SignatureId = Id<Signature>;
pub type FuncDeclId = Id<FuncDecl>;
pub type CommentId = Id<Comment>;
pub type CommentGroupId = Id<CommentGroup>;

// =============================================================================
// Centralized List Storage
// =============================================================================

#[derive(Debug, Default)]
pub struct ExtraData {
    pub ident_names: Vec<IdentName>,
    pub exprs: Vec<ExprId>,
    pub types: Vec<TypeId>,
    pub fields: Vec<FieldId>,
    pub specs: Vec<Spec>,
    pub keyed_elems: Vec<KeyedElement>,
    pub top_decls: Vec<TopLevelDecl>,
    pub interface_elems: Vec<InterfaceElem>,
    pub type_terms: Vec<TypeTerm>,
    pub comment_ids: Vec<CommentId>,
}

/// Central arena holding all AST nodes and list buffers of one file.
#[derive(Debug, Default)]
pub struct AstArena {
    pub exprs: SpannedArena<Expr>,
    pub types: SpannedArena<Type>,
    pub fields: SpannedArena<Field>,
    pub signatures: SpannedArena<Signature>,
    pub funcs: SpannedArena<FuncDecl>,
    pub comments: SpannedArena<Comment>,
    pub comment_groups: SpannedArena<CommentGroup>,
    pub extras: ExtraData,
}

macro_rules! list_accessors {
    ($($t:ty => $buf:ident, $push:ident, $get:ident);* $(;)?) => {
        impl AstArena {
            $(
                pub fn $push(&mut self, items: impl IntoIterator<Item = $t>) -> ListRef<$t> {
                    Self::push_list(&mut self.extras.$buf, items)
                }

                pub fn $get(&self, r: ListRef<$t>) -> &[$t] {
                    &self.extras.$buf[r.range()]
                }
            )*
        }
    };
}

list_accessors! {
    IdentName => ident_names, list_ident_names, ident_names;
    ExprId => exprs, list_exprs, exprs_list;
    TypeId => types, list_types, types_list;
    FieldId => fields, list_fields, fields_list;
    Spec => specs, list_specs, specs_list;
    KeyedElement => keyed_elems, list_keyed_elems, keyed_elems_list;
    TopLevelDecl => top_decls, list_top_decls, top_decls;
    InterfaceElem => interface_elems, list_interface_elems, interface_elems;
    TypeTerm => type_terms, list_type_terms, type_terms;
    CommentId => comment_ids, list_comment_ids, comment_ids;
}

impl AstArena {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn push_list<T>(buf: &mut Vec<T>, items: impl IntoIterator<Item = T>) -> ListRef<T> {
        let start = buf.len();
        buf.extend(items);
        let len = buf.len() - start;
        debug_assert!(start <= u32::MAX as usize);
        debug_assert!(len <= u32::MAX as usize);
        ListRef::new(start as u32, len as u32)
    }
}

// =============================================================================
// Comments
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Line,
    Block,
}

/// Comment token (text is recovered from source via span).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comment {
    pub kind: CommentKind,
}

/// Group of adjacent comments with no blank line between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentGroup {
    pub comments: ListRef<CommentId>,
}

// =============================================================================
// Source File (Root Node)
// =============================================================================

/// ```text
/// SourceFile = PackageClause ";" { ImportDecl ";" } { TopLevelDecl ";" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFile {
    pub package_pos: Span,
    pub name: IdentName,
    /// Package doc comment (the group directly above `package`).
    pub doc: Option<CommentGroupId>,
    /// Import declarations and top-level declarations, in source order.
    pub decls: ListRef<TopLevelDecl>,
}

// =============================================================================
// Declarations
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopLevelDecl {
    Gen(GenDecl),
    Func(FuncDeclId),
}

/// `import`, `const`, `type` or `var` declaration, grouped or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenDecl {
    pub doc: Option<CommentGroupId>,
    pub kw_pos: Span,
    pub kind: GenDeclKind,
    /// Opening parenthesis for grouped declarations.
    pub l_paren: Option<Span>,
    pub specs: ListRef<Spec>,
}

impl GenDecl {
    #[inline]
    pub const fn is_grouped(&self) -> bool {
        self.l_paren.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GenDeclKind {
    Import,
    Const,
    Type,
    Var,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spec {
    Import(ImportSpec),
    Value(ValueSpec),
    Type(TypeSpec),
}

/// `ImportSpec = [ "." | PackageName ] ImportPath`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSpec {
    pub name: Option<ImportName>,
    pub path: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportName {
    Dot(Span),
    Name(IdentName),
}

/// ```text
/// ConstSpec = IdentifierList [ [ Type ] "=" ExpressionList ]
/// VarSpec   = IdentifierList ( Type [ "=" ExpressionList ] | "=" ExpressionList )
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueSpec {
    /// Own doc comment; only set inside a parenthesized group.
    pub doc: Option<CommentGroupId>,
    pub names: ListRef<IdentName>,
    pub typ: Option<TypeId>,
    pub values: ListRef<ExprId>,
}

/// `TypeSpec = AliasDecl | TypeDef`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSpec {
    /// Own doc comment; only set inside a parenthesized group.
    pub doc: Option<CommentGroupId>,
    pub name: IdentName,
    /// Type parameters; names plus constraint, one field per declaration.
    pub type_params: ListRef<FieldId>,
    /// True for `type A = B`.
    pub alias: bool,
    pub typ: TypeId,
}

/// ```text
/// FunctionDecl = "func" FunctionName [ TypeParameters ] Signature [ FunctionBody ]
/// MethodDecl   = "func" Receiver MethodName Signature [ FunctionBody ]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuncDecl {
    pub doc: Option<CommentGroupId>,
    pub func_pos: Span,
    /// Receiver (present only for methods).
    pub recv: Option<FieldId>,
    pub name: IdentName,
    pub type_params: ListRef<FieldId>,
    pub signature: SignatureId,
    /// Span of the `{ ... }` body; `None` for external functions.
    pub body: Option<Span>,
}

impl FuncDecl {
    #[inline]
    pub const fn is_method(&self) -> bool {
        self.recv.is_some()
    }
}

// =============================================================================
// Signatures and Fields
// =============================================================================

/// `Signature = Parameters [ Result ]`
///
/// A bare result type is stored as a single unnamed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub params: ListRef<FieldId>,
    pub results: ListRef<FieldId>,
}

/// Field in a parameter list, result list, struct or type parameter list.
///
/// A variadic parameter carries a `Type::Ellipsis` as its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Field names; empty for unnamed parameters and embedded fields.
    pub names: ListRef<IdentName>,
    pub typ: TypeId,
    /// Struct tag (struct fields only).
    pub tag: Option<Span>,
    pub embedded: bool,
}

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    /// `T`
    Name(Ident),
    /// `pkg.T`
    Selector { base: TypeId, member: Ident },
    /// Generic instantiation `T[A, B]`.
    Instance { base: TypeId, args: ListRef<TypeId> },
    /// `*T`
    Pointer { elem: TypeId },
    /// `[N]T` or `[...]T`
    Array { len: ArrayLen, elem: TypeId },
    /// `[]T`
    Slice { elem: TypeId },
    /// `map[K]V`
    Map { key: TypeId, val: TypeId },
    /// `chan T`, `<-chan T`, `chan<- T`
    Chan { dir: ChanDir, elem: TypeId },
    Struct { fields: ListRef<FieldId> },
    Interface { elems: ListRef<InterfaceElem> },
    Func { sig: SignatureId },
    /// `...T`, only valid as the last parameter type.
    Ellipsis { elem: TypeId },
    /// `(T)`
    Paren { typ: TypeId },
    /// Constraint union `~int | string`.
    Union { terms: ListRef<TypeTerm> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayLen {
    Expr(ExprId),
    Ellipsis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeTerm {
    pub tilde: bool,
    pub typ: TypeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceElem {
    Method { name: IdentName, sig: SignatureId },
    /// Embedded type or union of terms.
    Embed { terms: ListRef<TypeTerm> },
}

// =============================================================================
// Expressions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expr {
    Ident(Ident),
    BasicLit(BasicLit),
    /// `T{...}`; the type is absent for elided literals inside another literal.
    CompositeLit { typ: Option<ExprId>, lit: LiteralValue },
    FuncLit { sig: SignatureId, body: Span },
    /// A type in operand position: `[]byte(s)`, `struct{}{}`.
    Type(TypeId),
    Paren(ExprId),
    Selector { expr: ExprId, sel: Ident },
    /// Indexing or generic instantiation; `a[i]`, `F[int, string]`.
    Index { expr: ExprId, indices: ListRef<ExprId> },
    Slice {
        expr: ExprId,
        lo: Option<ExprId>,
        hi: Option<ExprId>,
        max: Option<ExprId>,
    },
    /// `x.(T)`; `typ` is `None` for `x.(type)`.
    TypeAssert { expr: ExprId, typ: Option<TypeId> },
    Call {
        func: ExprId,
        args: ListRef<ExprId>,
        ellipsis: bool,
    },
    Unary { op: UnaryOp, expr: ExprId },
    Binary {
        left: ExprId,
        op: BinaryOp,
        right: ExprId,
    },
}

/// `LiteralValue = "{" [ ElementList [ "," ] ] "}"`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteralValue {
    pub elements: ListRef<KeyedElement>,
}

/// `KeyedElement = [ Key ":" ] Element`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyedElement {
    pub key: Option<Element>,
    pub value: Element,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Expr(ExprId),
    Literal(LiteralValue),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicLit {
    pub kind: BasicLitKind,
    pub raw: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BasicLitKind {
    Int,
    Float,
    Imag,
    Rune,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Add,   // +
    Sub,   // -
    Not,   // !
    Xor,   // ^
    Deref, // *
    Addr,  // &
    Recv,  // <-
    Tilde, // ~
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,    // +
    Sub,    // -
    Mul,    // *
    Div,    // /
    Mod,    // %
    And,    // &
    Or,     // |
    Xor,    // ^
    Shl,    // <<
    Shr,    // >>
    AndNot, // &^
    LAnd,   // &&
    LOr,    // ||
    Eq,     // ==
    Ne,     // !=
    Lt,     // <
    Le,     // <=
    Gt,     // >
    Ge,     // >=
}

impl BinaryOp {
    /// Go operator precedence, 5 binds tightest.
    #[inline]
    pub const fn precedence(self) -> u8 {
        match self {
            BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Mod
            | BinaryOp::Shl
            | BinaryOp::Shr
            | BinaryOp::And
            | BinaryOp::AndNot => 5,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Or | BinaryOp::Xor => 4,
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => 3,
            BinaryOp::LAnd => 2,
            BinaryOp::LOr => 1,
        }
    }
}

// =============================================================================
// Parsed file
// =============================================================================

/// One parsed Go file: its source, syntax tree and symbol table.
#[derive(Debug)]
pub struct ParsedFile {
    pub source: String,
    pub arena: AstArena,
    pub interner: Interner,
    pub file: SourceFile,
}

impl ParsedFile {
    #[inline]
    pub fn name(&self, sym: Ident) -> &str {
        self.interner.resolve(sym)
    }

    #[inline]
    pub fn text(&self, span: Span) -> &str {
        span.text(&self.source)
    }

    /// Package name from the package clause.
    pub fn package_name(&self) -> &str {
        self.name(self.file.name.sym)
    }

    pub fn decls(&self) -> &[TopLevelDecl] {
        self.arena.top_decls(self.file.decls)
    }

    /// Text of a comment group with comment markers removed, following
    /// go/doc: directives are dropped, surrounding blank lines trimmed, runs
    /// of blank lines collapsed, and a final newline added when non-empty.
    pub fn comment_text(&self, group: Option<CommentGroupId>) -> String {
        let Some(group) = group else {
            return String::new();
        };

        let mut lines: Vec<&str> = Vec::new();
        let ids = self.arena.comment_ids(self.arena.comment_groups[group].comments);
        for &id in ids {
            let raw = self.text(self.arena.comments.span(id));
            match self.arena.comments[id].kind {
                CommentKind::Line => {
                    let body = raw.strip_prefix("//").unwrap_or(raw);
                    if is_directive(body) {
                        continue;
                    }
                    lines.push(body.strip_prefix(' ').unwrap_or(body));
                }
                CommentKind::Block => {
                    let body = raw
                        .strip_prefix("/*")
                        .and_then(|b| b.strip_suffix("*/"))
                        .unwrap_or(raw);
                    lines.extend(body.lines());
                }
            }
        }

        let mut out = String::new();
        let mut pending_blank = false;
        for line in lines.iter().map(|l| l.trim_end()) {
            if line.is_empty() {
                pending_blank = !out.is_empty();
                continue;
            }
            if pending_blank {
                out.push('\n');
                pending_blank = false;
            }
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// `//go:generate`, `//line`, `//export` and friends.
fn is_directive(body: &str) -> bool {
    if body.starts_with("line ") || body.starts_with("extern ") || body.starts_with("export ") {
        return true;
    }
    let Some((head, tail)) = body.split_once(':') else {
        return false;
    };
    !head.is_empty()
        && head
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        && tail
            .bytes()
            .next()
            .is_some_and(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interner_dedups() {
        let mut i = Interner::new();
        let a = i.intern("Reader");
        let b = i.intern("Writer");
        assert_eq!(a, i.intern("Reader"));
        assert_ne!(a, b);
        assert_eq!(i.resolve(b), "Writer");
    }

    #[test]
    fn list_refs_slice_their_buffer() {
        let mut arena = AstArena::new();
        let _ = arena.list_types([]);
        let t = arena.types.alloc(Type::Name(Symbol(0)), Span::default());
        let r = arena.list_types([t, t]);
        assert_eq!(arena.types_list(r).len(), 2);
        assert!(arena.types_list(ListRef::EMPTY).is_empty());
    }

    #[test]
    fn directives_are_recognized() {
        assert!(is_directive("go:generate stringer"));
        assert!(is_directive("line foo.go:10"));
        assert!(!is_directive(" Package foo: does things"));
        assert!(!is_directive("TODO: later"));
    }
}
