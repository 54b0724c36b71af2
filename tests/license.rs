mod common;

use common::{GoModule, MIT_TEXT};
use gomoddoc::license::{detect, detect_with, LicenseMatcher, NO_LICENSE};

#[test]
fn mit_in_license_txt() {
    let m = GoModule::empty();
    m.file("LICENSE.txt", MIT_TEXT);
    assert_eq!(detect(m.path()), "MIT");
}

#[test]
fn no_candidate_is_none() {
    let m = GoModule::empty();
    m.file("NOTICE", MIT_TEXT);
    assert_eq!(detect(m.path()), NO_LICENSE);
}

#[test]
fn only_the_first_existing_candidate_is_inspected() {
    let m = GoModule::empty();
    m.file("COPYING", "Proprietary. All rights reserved.\n")
        .file("LICENSE", MIT_TEXT);
    assert_eq!(detect(m.path()), "None");
}

#[test]
fn priority_order_picks_copying_first() {
    let m = GoModule::empty();
    m.file(
        "COPYING",
        "Apache License\nVersion 2.0, January 2004\n\nTERMS AND CONDITIONS FOR USE, REPRODUCTION, AND DISTRIBUTION\n",
    )
    .file("LICENSE", MIT_TEXT);
    assert_eq!(detect(m.path()), "Apache-2.0");
}

struct Always(&'static str);

impl LicenseMatcher for Always {
    fn identify(&self, _: &str) -> Option<String> {
        Some(self.0.to_owned())
    }
}

#[test]
fn custom_matcher_is_used() {
    let m = GoModule::empty();
    m.file("MIT-LICENSE", "anything");
    assert_eq!(detect_with(m.path(), &Always("X-1.0")), "X-1.0");

    let empty = GoModule::empty();
    assert_eq!(detect_with(empty.path(), &Always("X-1.0")), NO_LICENSE);
}
