//! Running gifsicle to assemble single frame GIFs into an animation.

use std::path::{Path, PathBuf};
use std::process::Command;

use once_cell::sync::Lazy;

use crate::{ExportError, Result};

/// Places gifsicle is looked for, in order.
static CANDIDATES: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    let mut candidates = vec![];
    if let Some(dir) = std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(dir.join("tools").join("gifsicle"));
    }
    if let Ok(dir) = std::env::current_dir() {
        candidates.push(dir.join("tools").join("gifsicle"));
    }
    candidates.extend(
        ["/usr/local/bin/gifsicle", "/opt/homebrew/bin/gifsicle", "/usr/bin/gifsicle"]
            .into_iter()
            .map(PathBuf::from),
    );
    candidates
});

/// A located gifsicle binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gifsicle {
    path: PathBuf,
}

impl Gifsicle {
    /// Use the binary at `path` as is.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use `explicit` if given, otherwise the first candidate that exists.
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Ok(Self::new(path));
        }

        CANDIDATES
            .iter()
            .find(|candidate| candidate.is_file())
            .map(|path| {
                log::debug!("using gifsicle at {}", path.display());
                Self::new(path.clone())
            })
            .ok_or_else(|| ExportError::OptimizerNotFound(CANDIDATES.clone()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Build the invocation merging `frames` (each with its delay in
    /// hundredths of a second) into a looping animation at `output`.
    pub fn command(&self, frames: &[(PathBuf, u32)], output: &Path) -> Command {
        let mut command = Command::new(&self.path);
        // Ignore warnings, force a 256 color palette and loop forever.
        command.args(["-w", "--colors", "256", "--loop"]);
        for (frame, delay) in frames {
            command.arg("--delay").arg(delay.to_string()).arg(frame);
        }
        command.arg("--output").arg(output);
        command
    }

    /// Run gifsicle and wait for it. A non-zero exit status is an error
    /// carrying everything the tool printed.
    pub fn run(&self, frames: &[(PathBuf, u32)], output: &Path) -> Result<()> {
        let result = self.command(frames, output).output()?;

        if !result.status.success() {
            let mut printed = String::from_utf8_lossy(&result.stdout).into_owned();
            printed.push_str(&String::from_utf8_lossy(&result.stderr));
            return Err(ExportError::Optimizer { code: result.status.code(), output: printed });
        }

        Ok(())
    }
}
