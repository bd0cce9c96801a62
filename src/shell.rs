use std::io::{self, BufRead, Write};
use std::time::Instant;

use chrono::Utc;
use log::debug;

use crate::config::{Config, Limits};
use crate::executor::{self, Outcome};
use crate::history::{History, Recall};
use crate::jobs::BackgroundJobs;
use crate::meta::{LineReport, SegmentReport};
use crate::parse;

/// One shell session: history, background jobs, and limits.
pub struct Shell {
    config: Config,
    limits: Limits,
    history: History,
    jobs: BackgroundJobs,
}

impl Shell {
    pub fn new(config: Config) -> Self {
        Self {
            limits: config.limits(),
            config,
            history: History::new(),
            jobs: BackgroundJobs::new(),
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn jobs(&self) -> &BackgroundJobs {
        &self.jobs
    }

    /// Run one line of input. Returns `None` when nothing was executed:
    /// a blank line, or `!!` with empty history.
    pub fn process_line(&mut self, raw: &str) -> Option<LineReport> {
        if self.config.reap_background {
            self.jobs.reap();
        }

        let line = match self.history.recall(raw) {
            Recall::Empty => return None,
            Recall::NoHistory => {
                println!("No commands in history.");
                return None;
            }
            Recall::Repeat(line) => {
                if self.config.echo_history {
                    println!("{}", line);
                }
                line
            }
            Recall::Fresh(line) => line,
        };

        let started_at = Utc::now();
        let start = Instant::now();
        let segments = parse::split_segments(&line)
            .into_iter()
            .filter_map(|segment| self.run_segment(&segment))
            .collect();

        Some(LineReport {
            line,
            started_at,
            elapsed_ms: start.elapsed().as_millis() as u64,
            segments,
        })
    }

    fn run_segment(&mut self, segment: &parse::Segment) -> Option<SegmentReport> {
        let stages = parse::split_pipeline(&segment.text, &self.limits);
        if stages.is_empty() {
            return None;
        }
        let command = segment.text.clone();

        Some(match executor::run_pipeline(&stages, segment.background) {
            Ok(Outcome::Finished(pipestatus)) => {
                debug!("{:?} -> {:?}", command, pipestatus);
                SegmentReport::Foreground {
                    command,
                    pipestatus,
                }
            }
            Ok(Outcome::Detached(pids)) => {
                let pid = pids.last().map(|p| p.as_raw()).unwrap_or(-1);
                if self.config.reap_background {
                    self.jobs.track(&pids, &command);
                }
                SegmentReport::Background { command, pid }
            }
            Err(e) => {
                eprintln!("osh: {}", e);
                SegmentReport::Failed {
                    command,
                    error: e.to_string(),
                }
            }
        })
    }

    /// Prompt, read, run until `exit` or end of input. Returns the report of
    /// the last line that executed anything.
    pub fn interactive<R: BufRead>(&mut self, mut input: R) -> io::Result<Option<LineReport>> {
        let mut last = None;
        let mut line = String::new();
        loop {
            print!("{}", self.config.prompt);
            io::stdout().flush()?;

            line.clear();
            let n = input.read_line(&mut line)?;
            debug!("read: {:?} (length = {})", line.trim_end_matches('\n'), n);
            let trimmed = line.trim();
            if n == 0 || trimmed == "exit" {
                break;
            }
            if trimmed.is_empty() {
                continue;
            }
            if let Some(report) = self.process_line(&line) {
                last = Some(report);
            }
        }
        if self.config.reap_background {
            self.jobs.reap();
        }
        Ok(last)
    }
}
