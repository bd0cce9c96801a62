use std::ffi::{CStr, CString};
use std::io::{self, Write};
use std::os::fd::{IntoRawFd, OwnedFd, RawFd};

use log::{debug, warn};
use nix::errno::Errno;
use nix::fcntl::{fcntl, open, FcntlArg, FdFlag, OFlag};
use nix::sys::stat::Mode;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{close, dup2, execvp, fork, ForkResult, Pid};

use crate::error::ShellError;
use crate::parse::Stage;

/// Exit status of a child whose exec failed.
pub const EXEC_FAILED: i32 = 127;
/// Exit status of a child that could not open a redirection file.
pub const REDIRECT_FAILED: i32 = 1;

/// How a pipeline ended up once every stage was forked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Foreground: one status per stage, in stage order.
    Finished(Vec<i32>),
    /// Background: children still running, in stage order.
    Detached(Vec<Pid>),
}

/// A stage with every string converted before fork, so the child does
/// nothing but syscalls between fork and exec.
struct Prepared {
    program: String,
    argv: Vec<CString>,
    input: Option<(String, CString)>,
    output: Option<(String, CString)>,
}

impl Prepared {
    fn new(stage: &Stage) -> Result<Self, ShellError> {
        if stage.argv.is_empty() {
            return Err(ShellError::EmptyStage);
        }
        let argv = stage
            .argv
            .iter()
            .map(|a| cstring(a))
            .collect::<Result<Vec<_>, _>>()?;
        let path = |p: &Option<String>| -> Result<Option<(String, CString)>, ShellError> {
            p.as_ref()
                .map(|p| cstring(p).map(|c| (p.clone(), c)))
                .transpose()
        };
        Ok(Self {
            program: stage.program().to_string(),
            argv,
            input: path(&stage.input)?,
            output: path(&stage.output)?,
        })
    }
}

fn cstring(s: &str) -> Result<CString, ShellError> {
    CString::new(s).map_err(|_| ShellError::InteriorNul(s.to_string()))
}

/// Fork and wire every stage, then wait (foreground) or announce the last
/// pid (background).
pub fn run_pipeline(stages: &[Stage], background: bool) -> Result<Outcome, ShellError> {
    let pids = spawn_pipeline(stages)?;
    if background {
        if let Some(last) = pids.last() {
            println!("[bg] {}", last);
        }
        return Ok(Outcome::Detached(pids));
    }
    Ok(Outcome::Finished(wait_all(&pids)))
}

/// Fork one child per stage, stage i's stdout feeding stage i+1's stdin.
///
/// Every pipe end is an `OwnedFd`: the parent's copies are dropped as soon as
/// the child that needs them exists, so a reader sees EOF once its writer
/// exits. Pipe or fork failure abandons the remaining stages; children
/// already started are left to finish on their own.
pub fn spawn_pipeline(stages: &[Stage]) -> Result<Vec<Pid>, ShellError> {
    let prepared = stages
        .iter()
        .map(Prepared::new)
        .collect::<Result<Vec<_>, _>>()?;
    let last = prepared.len().saturating_sub(1);
    let mut pids = Vec::with_capacity(prepared.len());
    // Read end of the pipe written by the previous stage.
    let mut prev_read: Option<OwnedFd> = None;

    // Anything still buffered would otherwise be written again by children.
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();

    for (i, stage) in prepared.iter().enumerate() {
        let next = if i < last {
            match cloexec_pipe() {
                Ok(ends) => Some(ends),
                Err(e) => {
                    abandon(&pids);
                    return Err(ShellError::Pipe(e));
                }
            }
        } else {
            None
        };

        match unsafe { fork() } {
            Ok(ForkResult::Child) => exec_child(stage, prev_read, next),
            Ok(ForkResult::Parent { child }) => {
                debug!("forked {} for {:?} (stage {})", child, stage.program, i);
                pids.push(child);
                // Superseded: the child holds its own copy.
                drop(prev_read.take());
                prev_read = next.map(|(read, write)| {
                    drop(write);
                    read
                });
            }
            Err(e) => {
                abandon(&pids);
                return Err(ShellError::Fork(e));
            }
        }
    }

    Ok(pids)
}

/// Pipe whose ends are not inherited by unrelated children; `dup2` onto
/// stdin/stdout clears the flag on the copy the stage actually uses.
#[cfg(not(target_vendor = "apple"))]
fn cloexec_pipe() -> nix::Result<(OwnedFd, OwnedFd)> {
    nix::unistd::pipe2(OFlag::O_CLOEXEC)
}

#[cfg(target_vendor = "apple")]
fn cloexec_pipe() -> nix::Result<(OwnedFd, OwnedFd)> {
    use std::os::fd::AsRawFd;

    let (read, write) = nix::unistd::pipe()?;
    for fd in [&read, &write] {
        fcntl(fd.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
    }
    Ok((read, write))
}

fn abandon(pids: &[Pid]) {
    if !pids.is_empty() {
        warn!("pipeline aborted, {} started stage(s) left running", pids.len());
    }
}

/// Child side of fork: redirect, splice pipes, exec. Never returns.
fn exec_child(
    stage: &Prepared,
    prev_read: Option<OwnedFd>,
    next: Option<(OwnedFd, OwnedFd)>,
) -> ! {
    if let Some((shown, path)) = &stage.input {
        redirect(path, shown, OFlag::O_RDONLY, libc::STDIN_FILENO);
    }
    if let Some((shown, path)) = &stage.output {
        redirect(
            path,
            shown,
            OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
            libc::STDOUT_FILENO,
        );
    }
    if let Some(read) = prev_read {
        move_fd(read, libc::STDIN_FILENO);
    }
    if let Some((read, write)) = next {
        drop(read);
        move_fd(write, libc::STDOUT_FILENO);
    }

    let e = match execvp(&stage.argv[0], &stage.argv) {
        Ok(never) => match never {},
        Err(e) => e,
    };
    child_fail(
        &format!(
            "{}: command not found or exec failed: {}\n",
            stage.program,
            e.desc()
        ),
        EXEC_FAILED,
    )
}

fn redirect(path: &CStr, shown: &str, flags: OFlag, target: RawFd) {
    match open(path, flags, Mode::S_IRUSR | Mode::S_IWUSR) {
        Ok(fd) => {
            if let Err(e) = splice(fd, target) {
                child_fail(&format!("{}: dup2: {}\n", shown, e.desc()), REDIRECT_FAILED);
            }
        }
        Err(e) => child_fail(&format!("{}: {}\n", shown, e.desc()), REDIRECT_FAILED),
    }
}

/// Install `fd` as `target` and release the original.
fn move_fd(fd: OwnedFd, target: RawFd) {
    if let Err(e) = splice(fd.into_raw_fd(), target) {
        child_fail(&format!("osh: dup2: {}\n", e.desc()), REDIRECT_FAILED);
    }
}

/// Make `target` refer to what `fd` refers to, then close `fd`. When they
/// are already the same descriptor it is kept and made to survive exec.
fn splice(fd: RawFd, target: RawFd) -> nix::Result<()> {
    if fd == target {
        fcntl(fd, FcntlArg::F_SETFD(FdFlag::empty()))?;
        return Ok(());
    }
    let dup = dup2(fd, target);
    let _ = close(fd);
    dup.map(|_| ())
}

/// Report and exit without running any of the shell's own teardown.
fn child_fail(msg: &str, code: i32) -> ! {
    unsafe {
        libc::write(libc::STDERR_FILENO, msg.as_ptr().cast(), msg.len());
        libc::_exit(code)
    }
}

/// Shell-style status: exit code, or 128 + signal number.
pub fn exit_code(status: WaitStatus) -> Option<i32> {
    match status {
        WaitStatus::Exited(_, code) => Some(code),
        WaitStatus::Signaled(_, sig, _) => Some(128 + sig as i32),
        _ => None,
    }
}

/// Block until `pid` terminates.
pub fn wait_for(pid: Pid) -> Result<i32, ShellError> {
    loop {
        match waitpid(pid, None) {
            Ok(status) => {
                if let Some(code) = exit_code(status) {
                    return Ok(code);
                }
            }
            Err(Errno::EINTR) => {}
            Err(e) => return Err(ShellError::Wait(e)),
        }
    }
}

/// Wait on every pid in order. A failed wait is reported and recorded as -1.
pub fn wait_all(pids: &[Pid]) -> Vec<i32> {
    pids.iter()
        .map(|&pid| {
            wait_for(pid).unwrap_or_else(|e| {
                eprintln!("osh: {}", e);
                -1
            })
        })
        .collect()
}
