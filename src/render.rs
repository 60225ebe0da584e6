use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::anyhow;

use crate::config::RendererConfig;

/// Runs an external Graphviz program over DOT text.
#[derive(Debug, Clone)]
pub struct Renderer {
    command: String,
    format: String,
    keep_dot: bool,
}

impl Renderer {
    pub fn new(config: &RendererConfig) -> Self {
        Self {
            command: config.command.clone(),
            format: config.format.clone(),
            keep_dot: config.keep_dot,
        }
    }

    /// Where the intermediate DOT file for `output` goes.
    pub fn dot_path(output: &Path) -> PathBuf {
        output.with_extension("dot")
    }

    /// Renders `dot` into `output`, e.g. `dot -Tpng -o uml.png uml.dot`.
    pub fn render(&self, dot: &str, output: &Path) -> anyhow::Result<()> {
        let dot_path = Self::dot_path(output);
        if dot_path == output {
            return Err(anyhow!(
                "Output {} would be overwritten by the intermediate DOT file",
                output.display()
            ));
        }
        std::fs::write(&dot_path, dot)
            .map_err(|err| anyhow!("Failed to write {}: {}", dot_path.display(), err))?;
        log::debug!("Wrote DOT description to {}", dot_path.display());

        let result = self.run(&dot_path, output);

        if !self.keep_dot {
            if let Err(err) = std::fs::remove_file(&dot_path) {
                log::warn!("Could not remove {}: {}", dot_path.display(), err);
            }
        }
        result
    }

    fn run(&self, dot_path: &Path, output: &Path) -> anyhow::Result<()> {
        log::info!(
            "Running {} -T{} -o {} {}",
            self.command,
            self.format,
            output.display(),
            dot_path.display()
        );
        let status = Command::new(&self.command)
            .arg(format!("-T{}", self.format))
            .arg("-o")
            .arg(output)
            .arg(dot_path)
            .stderr(Stdio::inherit())
            .status()
            .map_err(|err| {
                anyhow!(
                    "Failed to run renderer `{}` (is Graphviz installed?): {}",
                    self.command,
                    err
                )
            })?;

        if !status.success() {
            return Err(anyhow!(
                "Renderer `{}` failed with {}",
                self.command,
                status
            ));
        }
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn renderer(command: &str, keep_dot: bool) -> Renderer {
        Renderer::new(&RendererConfig {
            command: command.to_owned(),
            format: "png".to_owned(),
            keep_dot,
        })
    }

    fn output_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sqluml-{}-{}.png", name, std::process::id()))
    }

    #[test]
    fn test_missing_renderer_is_an_error() {
        let output = output_path("missing");
        let result = renderer("sqluml-no-such-renderer", false).render("digraph {}", &output);
        assert!(result.is_err());
        assert!(!Renderer::dot_path(&output).exists());
    }

    #[test]
    fn test_failing_renderer_is_an_error() {
        let output = output_path("failing");
        let result = renderer("false", false).render("digraph {}", &output);
        assert!(result.is_err());
    }

    #[test]
    fn test_keep_dot() {
        let output = output_path("keep");
        renderer("true", true)
            .render("digraph {}\n", &output)
            .unwrap();
        let dot_path = Renderer::dot_path(&output);
        assert_eq!(std::fs::read_to_string(&dot_path).unwrap(), "digraph {}\n");
        std::fs::remove_file(dot_path).unwrap();
    }

    #[test]
    fn test_dot_output_is_rejected() {
        let output = output_path("dot").with_extension("dot");
        assert!(renderer("true", false).render("digraph {}", &output).is_err());
    }
}
