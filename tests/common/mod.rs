#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const MIT_TEXT: &str = "MIT License

Copyright (c) 2024 The Authors

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the \"Software\"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
";

/// A throwaway Go module on disk.
pub struct GoModule {
    _tmp: TempDir,
    pub root: PathBuf,
}

impl GoModule {
    /// An empty directory; add files with [`GoModule::file`].
    pub fn empty() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().join("mod");
        fs::create_dir_all(&root).expect("create module root");
        Self { _tmp: tmp, root }
    }

    /// A module with a go.mod and a documented root package.
    pub fn new(name: &str) -> Self {
        let m = Self::empty();
        m.file(
            "go.mod",
            &format!(
                "module {name}\n\ngo 1.22\n\nrequire (\n\tgolang.org/x/text v0.14.0\n\tgithub.com/a/b v1.0.0 // indirect\n)\n"
            ),
        );
        m.file(
            "doc.go",
            "// Package root is the module root.\npackage root\n\n// Version of the API.\nconst Version = \"1\"\n",
        );
        m
    }

    pub fn file(&self, rel: &str, contents: &str) -> &Self {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, contents).expect("write fixture file");
        self
    }

    pub fn dir(&self, rel: &str) -> &Self {
        fs::create_dir_all(self.root.join(rel)).expect("create fixture dir");
        self
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("gomoddoc");
        cmd.env("RUST_LOG", "off");
        cmd
    }
}
