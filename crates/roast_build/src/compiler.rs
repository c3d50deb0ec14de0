//! Running the external compiler on one source file.

use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, Command, ExitStatus, Stdio};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use roast_config::CompilerConfig;
use wait_timeout::ChildExt;

/// How long to keep reading stderr after the compiler exited. Descendants
/// that inherited the pipe can hold it open long after the compiler is gone.
const STDERR_GRACE: Duration = Duration::from_millis(500);

/// Result of compiling a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileResult {
    /// The compiler exited successfully and wrote its output.
    Success,
    /// The compiler failed. `diagnostic` is one line, tagged with the source path.
    Failure {
        /// The message to report.
        diagnostic: String,
    },
}

impl CompileResult {
    /// Returns `true` for [`CompileResult::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, CompileResult::Success)
    }
}

/// Compiles one source file into a target directory.
///
/// Implementations make a single attempt and never retry.
pub trait Compiler {
    /// Compiles `source`, writing `<target_dir>/<stem>.<output extension>`.
    fn compile(&self, source: &Path, target_dir: &Path) -> CompileResult;
}

/// Runs a compiler program as a child process, one file per invocation.
///
/// The command line is `<program> <args...> -o <target_dir> <source>`; with
/// the default `coffee -b -c` this asks for bare JavaScript written next to
/// the target directory. Without a timeout the call blocks until the child
/// exits, however long that takes. With a timeout the compiler runs in its
/// own process group on unix, and the whole group is killed when the
/// timeout expires.
#[derive(Debug, Clone)]
pub struct ExternalCompiler {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ExternalCompiler {
    /// Creates a compiler from explicit parts.
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// Creates a compiler from the `[compiler]` section of `roast.toml`.
    pub fn from_config(config: &CompilerConfig) -> Self {
        Self::new(&config.program, config.args.clone(), config.timeout())
    }

    fn command(&self, source: &Path, target_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("-o")
            .arg(target_dir)
            .arg(source)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            if self.timeout.is_some() {
                cmd.process_group(0);
            }
        }
        cmd
    }
}

impl Compiler for ExternalCompiler {
    fn compile(&self, source: &Path, target_dir: &Path) -> CompileResult {
        if let Err(e) = std::fs::create_dir_all(target_dir) {
            return CompileResult::Failure {
                diagnostic: format!(
                    "cannot create {}: {e} ({})",
                    target_dir.display(),
                    source.display()
                ),
            };
        }

        let child = match self.command(source, target_dir).spawn() {
            Ok(child) => child,
            Err(e) => {
                return CompileResult::Failure {
                    diagnostic: format!(
                        "failed to run {}: {e} ({})",
                        self.program.display(),
                        source.display()
                    ),
                }
            }
        };

        let exit = match self.timeout {
            Some(limit) => wait_with_timeout(child, limit),
            None => wait(child),
        };

        match exit {
            Ok(ChildExit::Exited { status, .. }) if status.success() => CompileResult::Success,
            Ok(ChildExit::Exited { stderr, .. }) => CompileResult::Failure {
                diagnostic: failure_message(&self.program, &stderr, source),
            },
            Ok(ChildExit::TimedOut) => CompileResult::Failure {
                diagnostic: format!(
                    "{} call for {} timed out after {}s",
                    self.program.display(),
                    source.display(),
                    self.timeout.map_or(0, |t| t.as_secs())
                ),
            },
            Err(e) => CompileResult::Failure {
                diagnostic: format!(
                    "lost track of {}: {e} ({})",
                    self.program.display(),
                    source.display()
                ),
            },
        }
    }
}

/// How a child process ended.
enum ChildExit {
    Exited { status: ExitStatus, stderr: String },
    TimedOut,
}

fn wait(child: Child) -> std::io::Result<ChildExit> {
    let output = child.wait_with_output()?;
    Ok(ChildExit::Exited {
        status: output.status,
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Waits for `child`, killing it and its descendants once `limit` has elapsed.
///
/// Standard error is drained on a separate thread so a chatty compiler
/// cannot block on a full pipe. The reader is never joined: whatever it has
/// collected when the child is gone (plus a short grace period) is used.
fn wait_with_timeout(mut child: Child, limit: Duration) -> std::io::Result<ChildExit> {
    let reader = child.stderr.take().map(spawn_stderr_reader);

    let Some(status) = child.wait_timeout(limit)? else {
        kill_process_group(&mut child);
        // Reap the zombie.
        let _ = child.wait();
        return Ok(ChildExit::TimedOut);
    };

    let stderr = match reader {
        Some(reader) => reader.collect(STDERR_GRACE),
        None => String::new(),
    };
    Ok(ChildExit::Exited { status, stderr })
}

/// Stderr collected by a background thread.
struct StderrReader {
    buf: Arc<Mutex<Vec<u8>>>,
    done: mpsc::Receiver<()>,
}

impl StderrReader {
    /// Waits up to `grace` for end of stream, then returns what was read.
    fn collect(self, grace: Duration) -> String {
        let _ = self.done.recv_timeout(grace);
        let buf = self.buf.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let text = String::from_utf8_lossy(&buf).into_owned();
        text
    }
}

fn spawn_stderr_reader(mut stderr: ChildStderr) -> StderrReader {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let (done_tx, done) = mpsc::channel();
    let sink = Arc::clone(&buf);
    thread::spawn(move || {
        let mut chunk = [0u8; 4096];
        loop {
            match stderr.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => sink
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(_) => break,
            }
        }
        let _ = done_tx.send(());
    });
    StderrReader { buf, done }
}

/// Kills the child's process group, then the child itself.
///
/// The child leads its own group (see [`ExternalCompiler::command`]), so this
/// also takes down anything a wrapper script started.
fn kill_process_group(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
            // SAFETY: killpg only sends a signal; a stale group id fails with ESRCH.
            unsafe {
                libc::killpg(pgid, libc::SIGKILL);
            }
        }
    }
    let _ = child.kill();
}

/// Builds the one-line report for a failed compile.
///
/// Only the first non-blank line of the compiler's error output is kept,
/// followed by the source path in parentheses.
pub fn failure_message(program: &Path, stderr: &str, source: &Path) -> String {
    match stderr.lines().map(str::trim_end).find(|l| !l.trim().is_empty()) {
        Some(first) => format!("{first} ({})", source.display()),
        None => format!(
            "{} compiler call for {} failed but no error message was generated",
            program.display(),
            source.display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_message_keeps_first_line() {
        let msg = failure_message(
            Path::new("coffee"),
            "/p/a.coffee:1:5: error: unexpected indentation\n  x = \n    ^\n",
            Path::new("/p/a.coffee"),
        );
        assert_eq!(msg, "/p/a.coffee:1:5: error: unexpected indentation (/p/a.coffee)");
    }

    #[test]
    fn failure_message_skips_leading_blank_lines() {
        let msg = failure_message(Path::new("coffee"), "\n\r\nSyntaxError: boom\n", Path::new("a.coffee"));
        assert_eq!(msg, "SyntaxError: boom (a.coffee)");
    }

    #[test]
    fn failure_message_without_output_is_generic() {
        let msg = failure_message(Path::new("coffee"), "", Path::new("a.coffee"));
        assert_eq!(
            msg,
            "coffee compiler call for a.coffee failed but no error message was generated"
        );
        let msg = failure_message(Path::new("coffee"), " \n\t\n", Path::new("a.coffee"));
        assert!(msg.ends_with("failed but no error message was generated"));
    }

    #[test]
    fn default_config_builds_coffee_command_line() {
        let compiler = ExternalCompiler::from_config(&CompilerConfig::default());
        let cmd = compiler.command(Path::new("/p/CoffeeSources/a.coffee"), Path::new("/p/Resources"));
        assert_eq!(cmd.get_program(), "coffee");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(
            args,
            vec!["-b", "-c", "-o", "/p/Resources", "/p/CoffeeSources/a.coffee"]
        );
    }

    #[test]
    fn missing_program_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let compiler = ExternalCompiler::new("roast-no-such-compiler", vec![], None);
        let result = compiler.compile(&dir.path().join("a.coffee"), &dir.path().join("out"));
        match result {
            CompileResult::Failure { diagnostic } => {
                assert!(diagnostic.starts_with("failed to run roast-no-such-compiler"));
                assert!(diagnostic.ends_with("a.coffee)"));
            }
            CompileResult::Success => panic!("expected failure"),
        }
    }

    #[test]
    fn creates_target_dir_before_running() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("Resources").join("deep").join("sub");
        let compiler = ExternalCompiler::new("roast-no-such-compiler", vec![], None);
        let _ = compiler.compile(&dir.path().join("a.coffee"), &target);
        assert!(target.is_dir());
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use std::time::Instant;

        /// `sh -c <script> sh -o <target> <source>`: `$2` is the target dir and
        /// `$3` the source file.
        fn sh(script: &str, timeout: Option<Duration>) -> ExternalCompiler {
            ExternalCompiler::new(
                "sh",
                vec!["-c".to_string(), script.to_string(), "sh".to_string()],
                timeout,
            )
        }

        #[test]
        fn zero_exit_is_success() {
            let dir = tempfile::tempdir().unwrap();
            let source = dir.path().join("a.coffee");
            std::fs::write(&source, "console.log 1").unwrap();
            let compiler = sh(r#"cp "$3" "$2/$(basename "$3" .coffee).js""#, None);

            let result = compiler.compile(&source, &dir.path().join("out"));
            assert!(result.is_success());
            assert!(dir.path().join("out").join("a.js").exists());
        }

        #[test]
        fn non_zero_exit_reports_first_stderr_line() {
            let dir = tempfile::tempdir().unwrap();
            let source = dir.path().join("a.coffee");
            let compiler = sh("printf 'bad token\\nsecond line\\n' >&2; exit 1", None);

            let result = compiler.compile(&source, dir.path());
            assert_eq!(
                result,
                CompileResult::Failure {
                    diagnostic: format!("bad token ({})", source.display())
                }
            );
        }

        #[test]
        fn non_zero_exit_without_stderr_is_generic() {
            let dir = tempfile::tempdir().unwrap();
            let compiler = sh("exit 3", None);
            match compiler.compile(&dir.path().join("a.coffee"), dir.path()) {
                CompileResult::Failure { diagnostic } => {
                    assert!(diagnostic.ends_with("failed but no error message was generated"))
                }
                CompileResult::Success => panic!("expected failure"),
            }
        }

        #[test]
        fn timeout_kills_hung_compiler() {
            let dir = tempfile::tempdir().unwrap();
            let compiler = sh("exec sleep 30", Some(Duration::from_secs(1)));
            let started = Instant::now();
            match compiler.compile(&dir.path().join("a.coffee"), dir.path()) {
                CompileResult::Failure { diagnostic } => {
                    assert!(diagnostic.contains("timed out after 1s"), "{diagnostic}")
                }
                CompileResult::Success => panic!("expected timeout"),
            }
            assert!(started.elapsed() < Duration::from_secs(20));
        }

        #[test]
        fn timeout_kills_compiler_descendants() {
            let dir = tempfile::tempdir().unwrap();
            // No `exec`: sh forks sleep, which inherits the stderr pipe.
            let compiler = sh("sleep 6; true", Some(Duration::from_secs(1)));
            let started = Instant::now();
            match compiler.compile(&dir.path().join("a.coffee"), dir.path()) {
                CompileResult::Failure { diagnostic } => {
                    assert!(diagnostic.contains("timed out after 1s"), "{diagnostic}")
                }
                CompileResult::Success => panic!("expected timeout"),
            }
            assert!(
                started.elapsed() < Duration::from_secs(4),
                "timeout of 1s took {:?}",
                started.elapsed()
            );
        }

        #[test]
        fn background_descendant_does_not_hold_up_a_finished_compile() {
            let dir = tempfile::tempdir().unwrap();
            let compiler = sh(
                "(sleep 6 &); echo 'syntax error' >&2; exit 1",
                Some(Duration::from_secs(10)),
            );
            let started = Instant::now();
            match compiler.compile(&dir.path().join("a.coffee"), dir.path()) {
                CompileResult::Failure { diagnostic } => {
                    assert!(diagnostic.starts_with("syntax error ("), "{diagnostic}")
                }
                CompileResult::Success => panic!("expected failure"),
            }
            assert!(started.elapsed() < Duration::from_secs(4));
        }

        #[test]
        fn timeout_kills_background_grandchildren() {
            let dir = tempfile::tempdir().unwrap();
            let marker = dir.path().join("survived");
            let script = format!("(sleep 2; touch '{}') & sleep 30", marker.display());
            let compiler = sh(&script, Some(Duration::from_secs(1)));
            let _ = compiler.compile(&dir.path().join("a.coffee"), dir.path());
            thread::sleep(Duration::from_secs(3));
            assert!(!marker.exists(), "grandchild outlived the timeout");
        }

        #[test]
        fn timeout_still_captures_stderr() {
            let dir = tempfile::tempdir().unwrap();
            let compiler = sh("echo 'late failure' >&2; exit 2", Some(Duration::from_secs(10)));
            match compiler.compile(&dir.path().join("a.coffee"), dir.path()) {
                CompileResult::Failure { diagnostic } => {
                    assert!(diagnostic.starts_with("late failure ("), "{diagnostic}")
                }
                CompileResult::Success => panic!("expected failure"),
            }
        }
    }
}
