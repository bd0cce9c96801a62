use crate::meta::LineReport;
use crate::shell::Shell;

/// Canned smoke-test lines, run through the same entry point as typed input.
pub const LINES: [&str; 7] = [
    "ls",
    "ls -al",
    "ls & whoami ;",
    "ls > junk.txt",
    "cat < junk.txt",
    "ls | wc",
    "ascii",
];

/// Returns the report of the last line that executed anything.
pub fn run(shell: &mut Shell) -> Option<LineReport> {
    println!("*** Running basic tests ***");
    let mut last = None;
    for (i, line) in LINES.iter().enumerate() {
        println!("* {}. Testing {} *", i + 1, line);
        if let Some(report) = shell.process_line(line) {
            last = Some(report);
        }
    }
    last
}
