//! Writing generated files, with privilege escalation and dry-run support
use crate::shell::Shell;
use anyhow::{Context, Result};
use log::{debug, info};
use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use tempfile::Builder;

const RULER: &str = "================================================================================";

/// Writes files on behalf of the reconciler
pub struct FileWriter<'a> {
    shell: &'a Shell,
    scratch_dir: PathBuf,
}

impl<'a> FileWriter<'a> {
    /// Create a new writer using the given scratch directory for temporary files
    pub fn new(shell: &'a Shell, scratch_dir: &Path) -> Self {
        Self {
            shell,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Returns true if the path lives inside the scratch directory
    pub fn is_scratch(&self, path: &Path) -> bool {
        path.starts_with(&self.scratch_dir)
    }

    /// Write `content` to `path`.
    ///
    /// Dry-run mode writes only scratch files and prints the content of every
    /// other file instead. If `elevated` is set, a denied direct write is
    /// retried by moving a temporary file into place via `sudo mv`.
    pub fn write(&self, path: &Path, content: &str, elevated: bool) -> Result<()> {
        let scratch = self.is_scratch(path);

        if self.shell.mode().is_dry() {
            if !scratch {
                println!("{}", RULER);
                println!("WOULD WRITE FILE: {}", path.display());
                if elevated {
                    println!("(requires sudo)");
                }
                println!("{}\n{}\n{}\n", RULER, content, RULER);
                return Ok(());
            }
            println!("{}", RULER);
            println!("WRITING TEMP FILE: {}", path.display());
            println!("(this file is actually written for inspection)");
            println!("{}", RULER);
        }

        match fs::write(path, content) {
            Ok(()) => debug!("Wrote file '{}'", path.display()),
            Err(e) if e.kind() == ErrorKind::PermissionDenied && elevated => {
                debug!(
                    "Permission denied writing '{}', retrying with sudo",
                    path.display()
                );
                self.write_elevated(path, content)?;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Unable to write file '{}'", path.display()));
            }
        }

        if self.shell.mode().is_dry() {
            println!("{}\n{}\n", content, RULER);
        }
        Ok(())
    }

    fn write_elevated(&self, path: &Path, content: &str) -> Result<()> {
        let mut file = Builder::new()
            .prefix("extra-aliases-")
            .tempfile_in(&self.scratch_dir)
            .context("Unable to create temporary file")?;
        file.write_all(content.as_bytes())?;
        // Dropping the temp path removes the file if the move fails
        let temp = file.into_temp_path();
        self.shell
            .run_checked(&format!("sudo mv {} {}", temp.display(), path.display()))?;
        temp.keep()?;
        info!("Wrote '{}' via sudo", path.display());
        Ok(())
    }
}
