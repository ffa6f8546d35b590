//! Print triggers: CUPS `lp`, print-to-file, and an in-memory recorder

use crate::platform::PrintTrigger;
use crate::rendering::CompositionResult;
use crate::{Error, Result};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Mutex;

/// Pipes the sheet PNG to the CUPS `lp` command.
#[derive(Debug, Clone)]
pub struct LpPrinter {
    /// Destination printer; `None` uses the system default
    pub destination: Option<String>,
    /// Media name passed as `-o media=...`
    pub media: String,
    pub program: String,
}

impl LpPrinter {
    pub fn new(destination: Option<String>) -> Self {
        Self {
            destination,
            media: "A4".to_string(),
            program: "lp".to_string(),
        }
    }

    fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(dest) = &self.destination {
            args.push("-d".to_string());
            args.push(dest.clone());
        }
        args.push("-o".to_string());
        args.push(format!("media={}", self.media));
        args.push("-o".to_string());
        args.push("fit-to-page".to_string());
        args
    }
}

impl Default for LpPrinter {
    fn default() -> Self {
        Self::new(None)
    }
}

impl PrintTrigger for LpPrinter {
    fn print(&self, sheet: &CompositionResult) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::PrintError(format!("Direct print not available ({}): {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(&sheet.png_data) {
                drop(stdin);
                // reap the child before reporting the failed write
                let _ = child.kill();
                let status = child.wait();
                log::warn!("{} exited with {:?} after a failed write", self.program, status);
                return Err(Error::PrintError(format!("Failed to send sheet to {}: {}", self.program, e)));
            }
        }

        let out = child
            .wait_with_output()
            .map_err(|e| Error::PrintError(format!("{} did not finish: {}", self.program, e)))?;
        let text = format!(
            "{}{}",
            String::from_utf8_lossy(&out.stdout),
            String::from_utf8_lossy(&out.stderr)
        );
        if !out.status.success() {
            return Err(Error::PrintError(text.trim().to_string()));
        }
        log::info!("sent revision {} to printer: {}", sheet.revision, text.trim());
        Ok(())
    }
}

/// Writes the sheet PNG to a file.
#[derive(Debug, Clone)]
pub struct FilePrinter {
    pub path: PathBuf,
}

impl FilePrinter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PrintTrigger for FilePrinter {
    fn print(&self, sheet: &CompositionResult) -> Result<()> {
        std::fs::write(&self.path, &sheet.png_data)
            .map_err(|e| Error::PrintError(format!("Failed to write {}: {}", self.path.display(), e)))?;
        log::info!("wrote revision {} to {}", sheet.revision, self.path.display());
        Ok(())
    }
}

/// Keeps the revisions it was asked to print, for tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingPrinter {
    printed: Mutex<Vec<u64>>,
}

impl RecordingPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn printed(&self) -> Vec<u64> {
        self.printed.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl PrintTrigger for RecordingPrinter {
    fn print(&self, sheet: &CompositionResult) -> Result<()> {
        let mut v = self
            .printed
            .lock()
            .map_err(|_| Error::PrintError("recorder poisoned".into()))?;
        v.push(sheet.revision);
        Ok(())
    }
}

/// Printer availability as reported by `lpstat -p -d`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PrinterInfo {
    pub available: bool,
    pub default: Option<String>,
    pub raw: Option<String>,
}

/// Probe CUPS for printers. Failures are reported in `raw`, never as errors.
pub fn printer_info() -> PrinterInfo {
    match Command::new("lpstat").args(["-p", "-d"]).output() {
        Ok(out) if out.status.success() => {
            let raw = String::from_utf8_lossy(&out.stdout).into_owned();
            PrinterInfo {
                available: true,
                default: parse_default_destination(&raw),
                raw: Some(raw),
            }
        }
        Ok(out) => PrinterInfo {
            available: false,
            default: None,
            raw: Some(String::from_utf8_lossy(&out.stderr).into_owned()),
        },
        Err(e) => {
            log::debug!("lpstat unavailable: {}", e);
            PrinterInfo::default()
        }
    }
}

fn parse_default_destination(lpstat: &str) -> Option<String> {
    lpstat.lines().find_map(|line| {
        line.split_once("system default destination:")
            .map(|(_, dest)| dest.trim().to_string())
            .filter(|d| !d.is_empty())
    })
}
