//! Shared harness: runs scripts against a recording host.

#![allow(dead_code)]

use mango_script::{ScriptError, ScriptHost, run_source};

#[derive(Default)]
pub struct Recorder {
    pub output: String,
    pub commands: Vec<String>,
}

impl ScriptHost for Recorder {
    fn print(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn exec(&mut self, command: &str) {
        self.commands.push(command.to_string());
    }
}

/// Runs a script and returns everything it printed.
pub fn run(source: &str) -> String {
    let mut host = Recorder::default();
    run_source(source, &mut host).unwrap();
    host.output
}

/// Runs a script expected to fail, returning the error and any output
/// printed before the failure.
pub fn run_err(source: &str) -> (ScriptError, String) {
    let mut host = Recorder::default();
    let err = run_source(source, &mut host).unwrap_err();
    (err, host.output)
}
