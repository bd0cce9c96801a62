//! Line parsing: segments (`;` / `&`), pipeline stages (`|`), and argv with
//! `<` / `>` redirections. There is no quoting or escaping; every
//! delimiter character is significant wherever it appears.

use log::warn;

use crate::config::Limits;

/// One `;`/`&`-delimited unit of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    /// Terminated by `&`.
    pub background: bool,
}

/// A single program invocation within a pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stage {
    pub argv: Vec<String>,
    pub input: Option<String>,
    pub output: Option<String>,
}

impl Stage {
    pub fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or("")
    }
}

fn is_blank(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n')
}

/// Split a line on `;` and `&`, in order. Blank segments are dropped.
pub fn split_segments(line: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = String::new();

    for ch in line.chars() {
        match ch {
            ';' | '&' => {
                push_segment(&mut segments, &current, ch == '&');
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    push_segment(&mut segments, &current, false);

    segments
}

fn push_segment(segments: &mut Vec<Segment>, raw: &str, background: bool) {
    let text = raw.trim_matches(is_blank);
    if !text.is_empty() {
        segments.push(Segment {
            text: text.to_string(),
            background,
        });
    }
}

/// Split a segment on `|` and tokenize each stage. Stages without a program
/// are skipped; stages past `limits.max_stages` are dropped.
pub fn split_pipeline(segment: &str, limits: &Limits) -> Vec<Stage> {
    let mut stages = Vec::new();
    for part in segment.split('|') {
        let Some(stage) = tokenize_stage(part, limits) else {
            continue;
        };
        if stages.len() == limits.max_stages {
            warn!(
                "pipeline truncated to {} stages: {:?}",
                limits.max_stages, segment
            );
            break;
        }
        stages.push(stage);
    }
    stages
}

/// Tokenize one stage on whitespace, pulling out `< path` and `> path`.
/// Returns `None` when no program name remains.
pub fn tokenize_stage(text: &str, limits: &Limits) -> Option<Stage> {
    let mut stage = Stage::default();
    let mut tokens = text.split(is_blank).filter(|t| !t.is_empty());
    let mut truncated = false;

    while let Some(tok) = tokens.next() {
        match tok {
            // A dangling operator has nothing to consume and is ignored.
            "<" => stage.input = tokens.next().map(String::from).or(stage.input),
            ">" => stage.output = tokens.next().map(String::from).or(stage.output),
            _ if stage.argv.len() < limits.max_args => stage.argv.push(tok.to_string()),
            _ => truncated = true,
        }
    }

    if truncated {
        warn!("argument list truncated to {} entries", limits.max_args);
    }

    if stage.argv.is_empty() {
        None
    } else {
        Some(stage)
    }
}
