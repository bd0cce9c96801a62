//! Bookkeeping for background pipelines, so finished children can be
//! collected instead of lingering as zombies.

use log::{info, warn};
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use crate::executor::exit_code;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub pid: Pid,
    pub command: String,
}

/// A background child that has been collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaped {
    pub pid: Pid,
    pub command: String,
    pub status: i32,
}

#[derive(Debug, Default)]
pub struct BackgroundJobs {
    jobs: Vec<Job>,
}

impl BackgroundJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track every child of a background pipeline.
    pub fn track(&mut self, pids: &[Pid], command: &str) {
        self.jobs.extend(pids.iter().map(|&pid| Job {
            pid,
            command: command.to_string(),
        }));
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Collect children that have exited, without blocking.
    pub fn reap(&mut self) -> Vec<Reaped> {
        let mut reaped = Vec::new();
        self.jobs.retain(|job| match waitpid(job.pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => true,
            Ok(status) => match exit_code(status) {
                Some(code) => {
                    info!("[bg] {} done ({}): {}", job.pid, code, job.command);
                    reaped.push(Reaped {
                        pid: job.pid,
                        command: job.command.clone(),
                        status: code,
                    });
                    false
                }
                None => true,
            },
            Err(Errno::EINTR) => true,
            Err(e) => {
                // ECHILD: somebody else already collected it.
                warn!("[bg] {} dropped: {}", job.pid, e);
                false
            }
        });
        reaped
    }
}
