use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Read `path` as it was at `rev` using `git show`.
///
/// Git runs from the file's directory so the lookup is relative to the
/// repository that contains it. The child is killed once `timeout` elapses.
pub fn show_file_at_revision(rev: &str, path: &Path, timeout: Duration) -> Result<String, String> {
    let file_name = path
        .file_name()
        .ok_or_else(|| format!("not a file path: {}", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let object = format!("{rev}:./{}", file_name.to_string_lossy());

    debug!("git -C {} show {object}", dir.display());
    let mut command = Command::new("git");
    command.arg("-C").arg(dir).args(["show", &object]);
    let label = format!("git show {object}");
    let output = run_bounded(&mut command, &label, timeout)?;
    String::from_utf8(output).map_err(|e| format!("{object} is not valid UTF-8: {e}"))
}

/// Run `command` to completion and return its stdout.
///
/// Fails if it exits unsuccessfully (with its stderr in the message) or is
/// still running after `timeout`, in which case it is killed first.
fn run_bounded(command: &mut Command, label: &str, timeout: Duration) -> Result<Vec<u8>, String> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("failed to run {label}: {e}"))?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let out_reader = thread::spawn(move || drain(stdout));
    let err_reader = thread::spawn(move || drain(stderr));

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                warn!("{label} exceeded {timeout:?}, killing");
                reap(&mut child);
                return Err(format!("{label} timed out after {timeout:?}"));
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                reap(&mut child);
                return Err(format!("failed to wait for {label}: {e}"));
            }
        }
    };

    let stdout = out_reader
        .join()
        .map_err(|_| format!("{label}: stdout reader panicked"))?
        .map_err(|e| format!("{label}: failed to read stdout: {e}"))?;
    let stderr = err_reader
        .join()
        .map_err(|_| format!("{label}: stderr reader panicked"))?
        .map_err(|e| format!("{label}: failed to read stderr: {e}"))?;

    if !status.success() {
        return Err(format!(
            "{label} failed: {}",
            String::from_utf8_lossy(&stderr).trim()
        ));
    }
    Ok(stdout)
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn drain(pipe: Option<impl Read>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf)?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .is_ok_and(|o| o.status.success())
    }

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(args)
            .env("GIT_AUTHOR_NAME", "test")
            .env("GIT_AUTHOR_EMAIL", "test@example.com")
            .env("GIT_COMMITTER_NAME", "test")
            .env("GIT_COMMITTER_EMAIL", "test@example.com")
            .status()
            .unwrap();
        assert!(status.success(), "git {args:?} failed");
    }

    #[test]
    fn reads_committed_content() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "-q"]);
        let file = dir.path().join("package-lock.json");
        std::fs::write(&file, "{\"packages\": {}}").unwrap();
        git(dir.path(), &["add", "package-lock.json"]);
        git(dir.path(), &["commit", "-q", "-m", "init"]);
        std::fs::write(&file, "changed").unwrap();

        let content = show_file_at_revision("HEAD", &file, Duration::from_secs(10)).unwrap();
        assert_eq!(content, "{\"packages\": {}}");
    }

    #[test]
    fn unknown_revision_fails() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "-q"]);
        let file = dir.path().join("package-lock.json");
        let err = show_file_at_revision("HEAD", &file, Duration::from_secs(10)).unwrap_err();
        assert!(err.contains("git show"));
    }

    #[test]
    fn overrunning_command_is_killed() {
        if !Path::new("/bin/sleep").exists() {
            return;
        }
        let mut command = Command::new("/bin/sleep");
        command.arg("30");
        let started = Instant::now();
        let err = run_bounded(&mut command, "sleep 30", Duration::from_millis(200)).unwrap_err();
        assert!(err.contains("timed out"), "unexpected error: {err}");
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn failing_command_reports_stderr() {
        if !Path::new("/bin/sh").exists() {
            return;
        }
        let mut command = Command::new("/bin/sh");
        command.args(["-c", "echo broken >&2; exit 3"]);
        let err = run_bounded(&mut command, "sh", Duration::from_secs(10)).unwrap_err();
        assert_eq!(err, "sh failed: broken");
    }

    #[test]
    fn drain_surfaces_read_errors() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("pipe closed early"))
            }
        }
        assert!(drain(Some(Broken)).is_err());
        assert!(drain(None::<Broken>).unwrap().is_empty());
    }

    #[test]
    fn rejects_path_without_file_name() {
        let err = show_file_at_revision("HEAD", Path::new("/"), Duration::from_secs(1)).unwrap_err();
        assert!(err.contains("not a file path"));
    }
}
