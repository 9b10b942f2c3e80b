//! Invocation of the artifact's bundled data exporter.

use std::path::Path;

use crate::config::GeneratorConfig;
use crate::error::{Error, GeneratorFailedDetails, Result};
use crate::utils::command;

/// Produces a raw `data` + `reports` tree from a release artifact.
pub trait Exporter {
    fn export(&self, artifact: &Path, output: &Path) -> Result<()>;
}

/// Runs the server jar's data generator through the JVM.
pub struct JavaExporter {
    program: String,
    main_class: String,
}

impl JavaExporter {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            program: config.program.clone(),
            main_class: config.main_class.clone(),
        }
    }

    pub fn args(&self, artifact_file: &str, output: &Path) -> Vec<String> {
        vec![
            format!("-DbundlerMainClass={}", self.main_class),
            "-jar".to_string(),
            artifact_file.to_string(),
            "--reports".to_string(),
            "--server".to_string(),
            "--output".to_string(),
            output.to_string_lossy().into_owned(),
        ]
    }
}

impl Exporter for JavaExporter {
    fn export(&self, artifact: &Path, output: &Path) -> Result<()> {
        let (dir, file) = match (artifact.parent(), artifact.file_name()) {
            (Some(dir), Some(file)) => (dir, file.to_string_lossy().into_owned()),
            _ => {
                return Err(Error::validation_invalid_argument(
                    "artifact",
                    format!("Not a file path: {}", artifact.display()),
                    None,
                ))
            }
        };
        // An empty parent means the artifact is relative to the working directory.
        let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };

        let args = self.args(&file, output);
        let display = command::display_command(&self.program, &args);
        log_status!("generate", "{}", display);

        let captured = command::run_captured(&self.program, &args, dir, "data export")?;
        if captured.is_clean() {
            return Ok(());
        }

        let reason = if captured.success {
            "wrote diagnostics to stderr".to_string()
        } else {
            format!("exited with {}", captured.exit_code.map_or("signal".to_string(), |c| c.to_string()))
        };
        Err(Error::generator_failed(
            format!("Data export of {} {}: {}", file, reason, command::error_text(&captured)),
            GeneratorFailedDetails {
                command: display,
                exit_code: captured.exit_code,
                stdout: captured.stdout,
                stderr: captured.stderr,
            },
        ))
    }
}
