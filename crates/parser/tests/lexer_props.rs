use gomoddoc_parser::ast::{Spec, TopLevelDecl};
use gomoddoc_parser::lexer::{Lexer, Tok};
use gomoddoc_parser::{parse_file, render_type};
use proptest::prelude::*;

/// Type expressions already in canonical form.
fn canonical_type() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        Just("int".to_owned()),
        Just("string".to_owned()),
        Just("error".to_owned()),
        Just("io.Reader".to_owned()),
    ];
    leaf.prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|t| format!("*{t}")),
            inner.clone().prop_map(|t| format!("[]{t}")),
            inner.clone().prop_map(|t| format!("map[string]{t}")),
            // `chan <-chan T` reads as `chan<- chan T`.
            inner
                .clone()
                .prop_filter("send ambiguity", |t| !t.starts_with("<-"))
                .prop_map(|t| format!("chan {t}")),
            inner.clone().prop_map(|t| format!("<-chan {t}")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("func({a}) {b}")),
            (inner.clone(), inner).prop_map(|(a, b)| format!("func(x {a}) (int, {b})")),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]
    #[test]
    fn lexer_never_panics_and_progresses(s in ".*") {
        let lx = Lexer::new(&s);

        // Max progress we have seen in the stream (end positions).
        let mut max_end = 0usize;

        // End position of the last *real* (non-injected) token.
        let mut last_real_end = 0usize;

        let max_steps = s.len().saturating_mul(4) + 64;

        for (steps, (start, tok, end)) in lx.enumerate() {
            // 1) spans must be in-bounds
            prop_assert!(start <= end, "start>end: ({start},{end}) tok={tok:?} input={s:?}");
            prop_assert!(end <= s.len(), "end out of bounds: ({start},{end}) len={} tok={tok:?} input={s:?}", s.len());

            let injected_semi = matches!(tok, Tok::Semi) && start == end;

            // 2) Real tokens must be monotonic (cannot overlap backwards)
            if !injected_semi {
                prop_assert!(
                    start >= last_real_end,
                    "real token moved backwards: start={start} < last_real_end={last_real_end} tok={tok:?} span=({start},{end}) input={s:?}"
                );
                last_real_end = end;
                // Real tokens shouldn't regress the global end.
                prop_assert!(
                    end >= max_end,
                    "real token end regressed: end={end} < max_end={max_end} tok={tok:?} input={s:?}"
                );
            } else {
                // 3) Injected semis must not appear before the already-consumed frontier.
                prop_assert!(
                    start >= max_end,
                    "injected semi before progress: pos={start} < max_end={max_end} input={s:?}"
                );
            }

            // 4) Update global progress
            max_end = max_end.max(end);

            // 5) Anti-hang guard
            prop_assert!(
                steps <= max_steps,
                "too many steps (possible hang): steps={steps} max_steps={max_steps} len={} input={s:?}",
                s.len()
            );
        }
    }

    #[test]
    fn parser_never_panics(s in "(package p\n)?[ -~\n]{0,200}") {
        let _ = parse_file(&s);
    }

    #[test]
    fn func_decls_always_parse(name in "[A-Z][a-zA-Z0-9]{0,12}", params in 0usize..4) {
        let args: Vec<String> = (0..params).map(|i| format!("a{i} int")).collect();
        let src = format!("package p\n\n// {name} doc.\nfunc {name}({}) error {{ return nil }}\n", args.join(", "));
        let file = parse_file(&src);
        prop_assert!(file.is_ok(), "{src}");
    }

    #[test]
    fn rendering_reproduces_canonical_types(typ in canonical_type()) {
        let src = format!("package p\n\nvar v {typ}\n");
        let file = parse_file(&src).map_err(|f| TestCaseError::fail(format!("{:?}", f.describe(&src))))?;
        let Some(TopLevelDecl::Gen(decl)) = file.decls().first().copied() else {
            return Err(TestCaseError::fail("no declaration"));
        };
        let Some(Spec::Value(spec)) = file.arena.specs_list(decl.specs).first().copied() else {
            return Err(TestCaseError::fail("no value spec"));
        };
        let t = spec.typ.ok_or_else(|| TestCaseError::fail("no type"))?;
        let first = render_type(&file, t);
        prop_assert_eq!(&first, &typ);
        prop_assert_eq!(first, render_type(&file, t));
    }
}
