//! External command execution
//!
//! Runs a tool to completion while two reader tasks drain stdout and stderr
//! line by line into one channel. The call returns only after both streams
//! have closed and the child has exited, so no output is dropped.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::common::{joined_output, Error, Result};

/// A command line to run, with optional working directory and stdin
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
    dir: Option<PathBuf>,
    stdin: Option<Vec<u8>>,
}

/// Exit code and captured output of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// First stdout line, if any was printed
    pub fn first_line(&self) -> Option<&str> {
        self.stdout.first().map(String::as_str)
    }

    /// All stdout lines joined and trimmed
    pub fn stdout_text(&self) -> String {
        joined_output(&self.stdout)
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            dir: None,
            stdin: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Feed these bytes to the child's stdin, then close it
    pub fn stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Run to completion, echoing output lines live when `verbose` is set
    ///
    /// A non-zero exit code is returned, not treated as an error. Errors are
    /// reserved for spawn failures and children killed by a signal.
    pub async fn run(&self, verbose: bool) -> Result<CommandOutput> {
        tracing::debug!(command = %self, dir = ?self.dir, "running command");
        if verbose {
            println!("running command {} {:?}\n", self.program, self.args);
        }

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(if self.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|source| Error::ProcessSpawn {
            command: self.to_string(),
            source,
        })?;

        let writer = match (&self.stdin, child.stdin.take()) {
            (Some(input), Some(mut pipe)) => {
                let input = input.clone();
                Some(tokio::spawn(async move {
                    pipe.write_all(&input).await?;
                    pipe.shutdown().await
                }))
            }
            _ => None,
        };

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Internal("Failed to get command stdout".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::Internal("Failed to get command stderr".to_string()))?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let out_reader = tokio::spawn(forward_lines(stdout, Stream::Stdout, tx.clone()));
        let err_reader = tokio::spawn(forward_lines(stderr, Stream::Stderr, tx));

        // The channel closes once both readers have hit EOF
        let mut output = CommandOutput::default();
        while let Some((stream, line)) = rx.recv().await {
            match stream {
                Stream::Stdout => {
                    if verbose {
                        println!("{line}");
                    }
                    output.stdout.push(line);
                }
                Stream::Stderr => {
                    if verbose {
                        eprintln!("{line}");
                    }
                    output.stderr.push(line);
                }
            }
        }

        let (out_result, err_result) = tokio::join!(out_reader, err_reader);
        for result in [out_result, err_result] {
            result.map_err(|e| Error::Internal(format!("Output reader failed: {e}")))??;
        }

        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                // The child may exit without reading all of its input
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Ok(Err(e)) => return Err(Error::Io(e)),
                Err(e) => return Err(Error::Internal(format!("Stdin writer failed: {e}"))),
            }
        }

        let status = child.wait().await?;
        output.exit_code = status.code().ok_or_else(|| Error::ProcessTerminated {
            command: self.to_string(),
        })?;

        tracing::debug!(
            command = %self.program,
            exit_code = output.exit_code,
            stdout_lines = output.stdout.len(),
            "command finished"
        );
        Ok(output)
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

async fn forward_lines<R>(
    reader: R,
    stream: Stream,
    tx: mpsc::UnboundedSender<(Stream, String)>,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        if tx.send((stream, decode_line(&buf))).is_err() {
            break;
        }
    }
    Ok(())
}

/// Decode one raw line, replacing invalid UTF-8 and dropping the line ending
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
