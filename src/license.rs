//! License detection for the module root.

use std::path::Path;

use tracing::{debug, warn};

/// Returned when no license file exists or its text is not recognized.
pub const NO_LICENSE: &str = "None";

/// Candidate file names, in priority order.
pub const LICENSE_FILE_NAMES: &[&str] = &[
    "COPYING",
    "COPYING.md",
    "COPYING.markdown",
    "COPYING.txt",
    "LICENCE",
    "LICENCE.md",
    "LICENCE.markdown",
    "LICENCE.txt",
    "LICENCE-2.0.txt",
    "MIT-LICENCE",
    "LICENSE",
    "LICENSE.md",
    "LICENSE.markdown",
    "LICENSE.txt",
    "LICENSE-2.0.txt",
    "MIT-LICENSE",
];

/// Maps license text to an identifier.
pub trait LicenseMatcher {
    fn identify(&self, text: &str) -> Option<String>;
}

/// Matches license texts by characteristic phrases.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureMatcher;

struct Signature {
    id: &'static str,
    /// All must occur in the normalized text.
    phrases: &'static [&'static str],
}

/// Order matters: a text that quotes another license must hit its own
/// signature first.
#[rustfmt::skip]
const SIGNATURES: &[Signature] = &[
    Signature { id: "AGPL-3.0", phrases: &["gnu affero general public license version 3 19 november 2007"] },
    Signature { id: "LGPL-3.0", phrases: &["gnu lesser general public license version 3 29 june 2007"] },
    Signature { id: "LGPL-2.1", phrases: &["gnu lesser general public license version 2 1 february 1999"] },
    Signature { id: "GPL-3.0", phrases: &["gnu general public license version 3 29 june 2007"] },
    Signature { id: "GPL-2.0", phrases: &["gnu general public license version 2 june 1991"] },
    Signature { id: "MPL-2.0", phrases: &["mozilla public license version 2 0"] },
    Signature { id: "Apache-2.0", phrases: &["apache license", "version 2 0", "terms and conditions for use reproduction and distribution"] },
    Signature {
        id: "BSD-3-Clause",
        phrases: &[
            "redistribution and use in source and binary forms with or without modification are permitted",
            "neither the name of",
        ],
    },
    Signature {
        id: "BSD-2-Clause",
        phrases: &[
            "redistribution and use in source and binary forms with or without modification are permitted",
            "this list of conditions and the following disclaimer",
        ],
    },
    Signature {
        id: "MIT",
        phrases: &[
            "permission is hereby granted free of charge to any person obtaining a copy",
            "the above copyright notice and this permission notice shall be included",
        ],
    },
    Signature {
        id: "ISC",
        phrases: &["permission to use copy modify and or distribute this software for any purpose with or without fee is hereby granted"],
    },
    Signature { id: "Unlicense", phrases: &["this is free and unencumbered software released into the public domain"] },
    Signature { id: "BSL-1.0", phrases: &["boost software license version 1 0"] },
    Signature { id: "CC0-1.0", phrases: &["cc0 1 0 universal"] },
];

impl LicenseMatcher for SignatureMatcher {
    fn identify(&self, text: &str) -> Option<String> {
        let text = normalize(text);
        SIGNATURES
            .iter()
            .find(|sig| sig.phrases.iter().all(|p| text.contains(p)))
            .map(|sig| sig.id.to_owned())
    }
}

/// Lowercase, punctuation to spaces, whitespace runs collapsed.
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut space = true;
    for c in text.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
            space = false;
        } else if !space {
            out.push(' ');
            space = true;
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Detects the license of the module at `root` with the built-in signatures.
pub fn detect(root: &Path) -> String {
    detect_with(root, &SignatureMatcher)
}

/// Only the first readable candidate is inspected. If its text matches
/// nothing the result is [`NO_LICENSE`], whatever later candidates contain.
pub fn detect_with(root: &Path, matcher: &dyn LicenseMatcher) -> String {
    for name in LICENSE_FILE_NAMES {
        let path = root.join(name);
        if !path.is_file() {
            continue;
        }
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(err) => {
                warn!(file = %path.display(), error = %err, "cannot read license file");
                continue;
            }
        };
        let found = matcher.identify(&String::from_utf8_lossy(&bytes));
        debug!(file = %path.display(), license = ?found, "license file");
        return found.unwrap_or_else(|| NO_LICENSE.to_owned());
    }
    NO_LICENSE.to_owned()
}
