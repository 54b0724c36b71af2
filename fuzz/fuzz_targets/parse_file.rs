#![no_main]

use gomoddoc_parser::{parse_file, render_type};
use gomoddoc_parser::ast::TypeId;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);

    match parse_file(&s) {
        Ok(file) => {
            let _ = file.comment_text(file.file.doc);
            for i in 0..file.arena.types.len() {
                let _ = render_type(&file, TypeId::from_raw(i as u32));
            }
        }
        Err(failure) => {
            assert!(!failure.diags.is_empty());
            let _ = failure.describe(&s);
        }
    }
});
