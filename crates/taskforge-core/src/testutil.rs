//! Canned command runner for unit tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::Path;

use crate::git::{CommandRunner, ProcessOutput};

/// Replays prepared outputs keyed on the command line. Responses can be
/// registered for `"program arg1 arg2"` or, when the working directory
/// matters, `"program arg1 arg2 @ /some/dir"`. Unmatched invocations fail
/// with exit code 1, so a test only succeeds on the calls it expected.
pub struct FakeRunner {
    responses: HashMap<String, ProcessOutput>,
    calls: RefCell<Vec<String>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn ok(self, cmdline: &str, stdout: &str) -> Self {
        self.respond(
            cmdline,
            ProcessOutput {
                stdout: stdout.to_string(),
                stderr: String::new(),
                exit_code: 0,
            },
        )
    }

    pub fn fail(self, cmdline: &str, stderr: &str) -> Self {
        self.respond(
            cmdline,
            ProcessOutput {
                stdout: String::new(),
                stderr: stderr.to_string(),
                exit_code: 1,
            },
        )
    }

    pub fn respond(mut self, cmdline: &str, output: ProcessOutput) -> Self {
        self.responses.insert(cmdline.to_string(), output);
        self
    }

    /// Command lines seen so far, in order, with the directory suffix.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, program: &str, args: &[&str], dir: &Path) -> io::Result<ProcessOutput> {
        let cmdline = format!("{} {}", program, args.join(" "));
        let keyed = format!("{cmdline} @ {}", dir.display());
        self.calls.borrow_mut().push(keyed.clone());
        let output = self
            .responses
            .get(&keyed)
            .or_else(|| self.responses.get(&cmdline))
            .cloned()
            .unwrap_or(ProcessOutput {
                stdout: String::new(),
                stderr: format!("fake runner: no response for `{cmdline}`"),
                exit_code: 1,
            });
        Ok(output)
    }
}
