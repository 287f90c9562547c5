//! Configuration handling for annotated-csv

use std::path::PathBuf;

/// Output encoding for decoded tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    LineProtocol,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "line-protocol" | "lineprotocol" | "lp" => Ok(OutputFormat::LineProtocol),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Configuration for a single decode/encode run
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Input file; `None` reads standard input
    pub input: Option<PathBuf>,
    /// Output file; `None` writes standard output
    pub output: Option<PathBuf>,
    /// Output encoding
    pub output_format: OutputFormat,
    /// Emit single-line JSON instead of indented JSON
    pub compact: bool,
}

impl Config {
    /// Create a config reading from the given input
    pub fn new(input: Option<PathBuf>) -> Self {
        Self {
            input,
            ..Default::default()
        }
    }

    /// Set the output destination
    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    /// Set output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Enable compact JSON output
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!(
            "line-protocol".parse::<OutputFormat>(),
            Ok(OutputFormat::LineProtocol)
        );
        assert_eq!("lp".parse::<OutputFormat>(), Ok(OutputFormat::LineProtocol));
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_builder() {
        let config = Config::new(None)
            .with_output_format(OutputFormat::LineProtocol)
            .with_compact(true);
        assert!(config.input.is_none());
        assert_eq!(config.output_format, OutputFormat::LineProtocol);
        assert!(config.compact);
    }
}
