//! Reader for `go.mod` manifests.
//!
//! Only what the documentation needs is kept: the module path, the `go`
//! version and the `require` list. Other directives are recognized and
//! skipped so that a valid manifest never fails to load.

use std::path::{Path, PathBuf};

use logos::Logos;

use crate::error::{Error, Result};
use crate::model::Dependency;

pub const MANIFEST_FILE: &str = "go.mod";

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f]+")]
#[rustfmt::skip]
enum ModTok {
    #[token("\n")] Newline,
    #[regex(r"//[^\n]*", allow_greedy = true, priority = 10)] Comment,
    #[token("(")] LParen,
    #[token(")")] RParen,
    #[token("=>", priority = 10)] Arrow,
    #[regex(r#""([^"\\\n]|\\.)*""#)] Quoted,
    #[regex(r"`[^`]*`")] Raw,
    #[regex(r#"[^\s()"`]+"#, allow_greedy = true, priority = 1)] Word,
}

/// The parts of a `go.mod` file that end up in the documentation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoMod {
    pub module: Option<String>,
    pub go: Option<String>,
    pub requires: Vec<Dependency>,
}

/// Directives that are valid but carry nothing we document.
const IGNORED_VERBS: &[&str] = &[
    "toolchain",
    "godebug",
    "replace",
    "exclude",
    "retract",
    "tool",
    "ignore",
];

impl GoMod {
    /// Reads and parses the manifest at `path`.
    pub fn read(path: &Path) -> Result<Self> {
        let src = std::fs::read_to_string(path).map_err(|source| Error::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &src)
    }

    pub fn parse(path: &Path, src: &str) -> Result<Self> {
        ManifestParser {
            path,
            out: GoMod::default(),
        }
        .run(src)
    }

    /// The declared module path, or [`Error::ModuleNotDeclared`].
    pub fn module_path(&self, manifest: &Path) -> Result<&str> {
        self.module
            .as_deref()
            .ok_or_else(|| Error::ModuleNotDeclared {
                path: manifest.to_path_buf(),
            })
    }
}

/// One logical line: its words and an optional trailing `//` comment.
#[derive(Debug, Default)]
struct Line<'s> {
    number: usize,
    toks: Vec<(ModTok, &'s str)>,
    comment: Option<&'s str>,
}

struct ManifestParser<'p> {
    path: &'p Path,
    out: GoMod,
}

impl ManifestParser<'_> {
    fn run(mut self, src: &str) -> Result<GoMod> {
        // Verb and opening line of the block we are in, if any.
        let mut block: Option<(String, usize)> = None;

        for line in self.lines(src)? {
            let Some(&(first, text)) = line.toks.first() else {
                continue;
            };

            if let Some((verb, _)) = &block {
                if first == ModTok::RParen {
                    if line.toks.len() > 1 {
                        return Err(self.syntax(line.number, "unexpected token after )"));
                    }
                    block = None;
                    continue;
                }
                let verb = verb.clone();
                let args = self.args(&line, &line.toks)?;
                self.directive(&verb, &args, &line)?;
                continue;
            }

            match first {
                ModTok::Word => {}
                ModTok::RParen => return Err(self.syntax(line.number, "unexpected )")),
                _ => return Err(self.syntax(line.number, "expected directive")),
            }

            if line.toks.last().map(|t| t.0) == Some(ModTok::LParen) {
                if line.toks.len() != 2 {
                    return Err(self.syntax(line.number, "unexpected ( in directive"));
                }
                block = Some((text.to_owned(), line.number));
                continue;
            }

            let args = self.args(&line, &line.toks[1..])?;
            self.directive(text, &args, &line)?;
        }

        if let Some((verb, opened)) = block {
            return Err(self.syntax(opened, format!("unclosed {verb} block")));
        }
        Ok(self.out)
    }

    fn lines<'s>(&self, src: &'s str) -> Result<Vec<Line<'s>>> {
        let mut lines = Vec::new();
        let mut cur = Line {
            number: 1,
            ..Line::default()
        };

        let mut lex = ModTok::lexer(src);
        while let Some(tok) = lex.next() {
            let tok = tok.map_err(|()| {
                self.syntax(cur.number, format!("invalid token {:?}", lex.slice()))
            })?;
            match tok {
                ModTok::Newline => {
                    let number = cur.number + 1;
                    lines.push(std::mem::replace(
                        &mut cur,
                        Line {
                            number,
                            ..Line::default()
                        },
                    ));
                }
                ModTok::Comment => cur.comment = Some(&lex.slice()[2..]),
                _ => cur.toks.push((tok, lex.slice())),
            }
        }
        lines.push(cur);
        Ok(lines)
    }

    fn args(&self, line: &Line<'_>, toks: &[(ModTok, &str)]) -> Result<Vec<String>> {
        toks.iter()
            .map(|&(tok, text)| match tok {
                ModTok::Word | ModTok::Arrow => Ok(text.to_owned()),
                ModTok::Raw => Ok(text[1..text.len() - 1].to_owned()),
                ModTok::Quoted => Ok(unquote(&text[1..text.len() - 1])),
                _ => Err(self.syntax(line.number, format!("unexpected {text}"))),
            })
            .collect()
    }

    fn directive(&mut self, verb: &str, args: &[String], line: &Line<'_>) -> Result<()> {
        match verb {
            "module" => {
                if self.out.module.is_some() {
                    return Err(self.syntax(line.number, "repeated module statement"));
                }
                let [path] = args else {
                    return Err(self.syntax(line.number, "usage: module module/path"));
                };
                self.out.module = Some(path.clone());
            }
            "go" => {
                let [version] = args else {
                    return Err(self.syntax(line.number, "usage: go 1.23"));
                };
                self.out.go = Some(version.clone());
            }
            "require" => {
                let [path, version] = args else {
                    return Err(self.syntax(line.number, "usage: require module/path v1.2.3"));
                };
                self.out.requires.push(Dependency {
                    path: path.clone(),
                    version: version.clone(),
                    indirect: line.comment.is_some_and(is_indirect),
                });
            }
            v if IGNORED_VERBS.contains(&v) => {}
            other => {
                return Err(self.syntax(line.number, format!("unknown directive: {other}")));
            }
        }
        Ok(())
    }

    fn syntax(&self, line: usize, message: impl Into<String>) -> Error {
        Error::ManifestSyntax {
            path: PathBuf::from(self.path),
            line,
            message: message.into(),
        }
    }
}

/// `// indirect` or `// indirect; <more>`.
fn is_indirect(comment: &str) -> bool {
    let c = comment.trim();
    c == "indirect" || c.starts_with("indirect;")
}

fn unquote(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Result<GoMod> {
        GoMod::parse(Path::new("go.mod"), src)
    }

    #[test]
    fn module_go_and_requires() {
        let m = parse(
            "module example.com/m\n\ngo 1.22\n\nrequire golang.org/x/text v0.14.0\n\n\
             require (\n\tgithub.com/a/b v1.0.0 // indirect\n\t\"github.com/c/d\" v0.2.0\n)\n",
        )
        .unwrap();
        assert_eq!(m.module.as_deref(), Some("example.com/m"));
        assert_eq!(m.go.as_deref(), Some("1.22"));
        assert_eq!(
            m.requires,
            vec![
                Dependency {
                    path: "golang.org/x/text".into(),
                    version: "v0.14.0".into(),
                    indirect: false,
                },
                Dependency {
                    path: "github.com/a/b".into(),
                    version: "v1.0.0".into(),
                    indirect: true,
                },
                Dependency {
                    path: "github.com/c/d".into(),
                    version: "v0.2.0".into(),
                    indirect: false,
                },
            ]
        );
    }

    #[test]
    fn other_directives_are_skipped() {
        let m = parse(
            "// comment\nmodule m\ntoolchain go1.22.1\nreplace a => ../a\n\
             exclude (\n  b v1.0.0\n)\nretract [v1.0.0, v1.0.5]\n",
        )
        .unwrap();
        assert_eq!(m.module.as_deref(), Some("m"));
        assert!(m.requires.is_empty());
    }

    #[test]
    fn indirect_marker_variants() {
        assert!(is_indirect(" indirect"));
        assert!(is_indirect(" indirect; for tests"));
        assert!(!is_indirect(" indirectly"));
        assert!(!is_indirect(" used by x"));
    }

    #[test]
    fn syntax_errors_name_the_line() {
        let err = parse("module m\nfrobnicate x\n").unwrap_err();
        assert_eq!(err.to_string(), "go.mod:2: unknown directive: frobnicate");

        let err = parse("module m\nrequire (\n a v1\n").unwrap_err();
        assert_eq!(err.to_string(), "go.mod:2: unclosed require block");

        let err = parse(")\n").unwrap_err();
        assert!(matches!(err, Error::ManifestSyntax { line: 1, .. }));

        let err = parse("module a\nmodule b\n").unwrap_err();
        assert!(err.to_string().contains("repeated module"));
    }

    #[test]
    fn missing_module_is_not_found() {
        let m = parse("go 1.21\n").unwrap();
        let err = m.module_path(Path::new("go.mod")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
    }

    #[test]
    fn quoted_module_path() {
        let m = parse("module \"example.com/q\"\n").unwrap();
        assert_eq!(m.module.as_deref(), Some("example.com/q"));
    }
}
