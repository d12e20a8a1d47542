use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;
use tower_lsp::lsp_types::Url;

/// The only executable accepted as the compiler
pub const COMPILER_FILE_NAME: &str = "tkhack-dx.exe";

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("no compiler configured; set taikou5.compilerPath to tkhack-dx.exe")]
    NotConfigured,

    #[error("only tkhack-dx.exe can be used as the compiler, got {}", .0.display())]
    WrongExecutable(PathBuf),

    #[error("compiler not found at {}", .0.display())]
    Missing(PathBuf),

    #[error("no document to compile; open an event file first")]
    NoDocument,

    #[error("{0} is not a local file")]
    NotAFile(Url),

    #[error("failed to run compiler: {0}")]
    Spawn(#[from] io::Error),
}

/// Result of one compiler run
#[derive(Debug)]
pub struct CompileOutput {
    pub success: bool,
    pub code: Option<i32>,
}

/// Document named by the first `taikou5.compile` argument, if any.
pub fn target_argument(arguments: &[Value]) -> Result<Option<Url>, serde_json::Error> {
    arguments
        .first()
        .map(|arg| serde_json::from_value::<Url>(arg.clone()))
        .transpose()
}

/// Check that `path` names the compiler executable.
///
/// Both separators are accepted since the configured path is usually a
/// Windows path.
pub fn validate_compiler_path(path: &Path) -> Result<(), CompileError> {
    let raw = path.to_string_lossy();
    let file_name = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    if file_name.eq_ignore_ascii_case(COMPILER_FILE_NAME) {
        Ok(())
    } else {
        Err(CompileError::WrongExecutable(path.to_path_buf()))
    }
}

/// Arguments that compile one event source file to EVM.
pub fn compile_args(input: &Path) -> Vec<String> {
    vec![
        "--for=5dx".to_string(),
        "--language=sc".to_string(),
        "--command=compile".to_string(),
        format!("--input={}", input.display()),
    ]
}

/// Validate the configuration and compile the document at `uri`.
///
/// Each line the compiler prints on stdout or stderr is sent on `lines` as
/// soon as it is read.
pub async fn compile_document(
    compiler: Option<&Path>,
    uri: Option<&Url>,
    lines: UnboundedSender<String>,
) -> Result<CompileOutput, CompileError> {
    let compiler = compiler.ok_or(CompileError::NotConfigured)?;
    validate_compiler_path(compiler)?;
    if !compiler.exists() {
        return Err(CompileError::Missing(compiler.to_path_buf()));
    }

    let uri = uri.ok_or(CompileError::NoDocument)?;
    let input = uri
        .to_file_path()
        .map_err(|_| CompileError::NotAFile(uri.clone()))?;

    run_compiler(compiler, &input, lines).await
}

async fn run_compiler(
    compiler: &Path,
    input: &Path,
    lines: UnboundedSender<String>,
) -> Result<CompileOutput, CompileError> {
    tracing::info!(compiler = %compiler.display(), input = %input.display(), "running compiler");

    let mut child = Command::new(compiler)
        .args(compile_args(input))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let stdout = forward_lines(child.stdout.take(), lines.clone());
    let stderr = forward_lines(child.stderr.take(), lines);
    let (status, (), ()) = tokio::join!(child.wait(), stdout, stderr);
    let status = status?;

    Ok(CompileOutput {
        success: status.success(),
        code: status.code(),
    })
}

/// Send each line of `reader` until EOF. Output that is not UTF-8 is decoded lossily.
async fn forward_lines<R: AsyncRead + Unpin>(reader: Option<R>, lines: UnboundedSender<String>) {
    let Some(reader) = reader else {
        return;
    };
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\r', '\n']);
                // Receiver gone means nobody is listening any more
                let _ = lines.send(line.to_string());
            }
            Err(e) => {
                tracing::warn!("failed to read compiler output: {}", e);
                break;
            }
        }
    }
}
