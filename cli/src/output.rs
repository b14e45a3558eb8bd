//! Output utilities for CLI tools.

use std::{fs::File, io::Write};

use serde::Serialize;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// YAML format (default).
    #[default]
    Yaml,
    /// JSON format.
    Json,
}

/// Output configuration.
pub struct Output {
    pub format: OutputFormat,
    pub file: Option<String>,
}

impl Output {
    /// Creates a new output configuration.
    pub fn new(format: OutputFormat, file: Option<String>) -> Self {
        Self { format, file }
    }

    /// Picks JSON when `json` is set, YAML otherwise.
    pub fn from_flags(json: bool, file: Option<&str>) -> Self {
        let format = if json {
            OutputFormat::Json
        } else {
            OutputFormat::Yaml
        };
        Self::new(format, file.map(str::to_string))
    }

    /// Renders the value in the configured format.
    pub fn render<T: Serialize>(&self, value: &T) -> anyhow::Result<String> {
        let output = match self.format {
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
            OutputFormat::Json => serde_json::to_string_pretty(value)? + "\n",
        };
        Ok(output)
    }

    /// Outputs the result to the file, or stdout when none is set.
    pub fn write<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        let output = self.render(value)?;

        match &self.file {
            Some(path) => {
                let mut file = File::create(path)?;
                file.write_all(output.as_bytes())?;
            }
            None => {
                print!("{}", output);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        user_id: Option<String>,
        score: f32,
        matched: bool,
    }

    fn sample() -> Sample {
        Sample {
            user_id: Some("alice".into()),
            score: 0.5,
            matched: true,
        }
    }

    #[test]
    fn test_render_yaml() {
        let out = Output::from_flags(false, None);
        assert_eq!(out.format, OutputFormat::Yaml);
        assert_eq!(
            out.render(&sample()).unwrap(),
            "user_id: alice\nscore: 0.5\nmatched: true\n"
        );
    }

    #[test]
    fn test_render_json() {
        let out = Output::from_flags(true, None);
        let text = out.render(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["user_id"], "alice");
        assert_eq!(value["matched"], true);
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let out = Output::from_flags(true, path.to_str());
        out.write(&sample()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"score\": 0.5"));
    }
}
