//! `[output]` section configuration.
//!
//! ```toml
//! [output]
//! contract = "binding"        # binding | file | return
//! binding = "result"          # Global read when contract = "binding"
//! file = "/tmp/output.pdf"    # Virtual file read when contract = "file"
//! path = "output.pdf"         # Where run/watch write the document
//! download_name = "vellum-output.pdf"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::bridge::OutputContract;
use crate::config::{ConfigDiagnostics, FieldPath};

/// How user code hands over its document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractKind {
    #[default]
    Binding,
    File,
    Return,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub contract: ContractKind,
    pub binding: String,
    pub file: String,
    /// Host path for the document, relative to the project root.
    pub path: PathBuf,
    /// Filename offered by the preview's download link.
    pub download_name: String,
}

impl OutputConfig {
    pub const BINDING: FieldPath = FieldPath::new("output.binding");
    pub const FILE: FieldPath = FieldPath::new("output.file");
    pub const DOWNLOAD_NAME: FieldPath = FieldPath::new("output.download_name");

    pub fn contract(&self) -> OutputContract {
        match self.contract {
            ContractKind::Binding => OutputContract::Binding(self.binding.clone()),
            ContractKind::File => OutputContract::File(self.file.clone()),
            ContractKind::Return => OutputContract::Return,
        }
    }

    /// Only the channel selected by `contract` is checked.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.contract == ContractKind::Binding && !is_identifier(&self.binding) {
            diag.error_with_hint(
                Self::BINDING,
                format!("`{}` is not a valid variable name", self.binding),
                "use letters, digits and underscores, not starting with a digit",
            );
        }
        if self.contract == ContractKind::File && !self.file.starts_with('/') {
            diag.error(Self::FILE, "virtual file path must be absolute");
        }
        if self.download_name.trim().is_empty() || self.download_name.contains(['/', '"']) {
            diag.error(Self::DOWNLOAD_NAME, "download name must be a plain file name");
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            contract: ContractKind::Binding,
            binding: "result".into(),
            file: "/tmp/output.pdf".into(),
            path: PathBuf::from("output.pdf"),
            download_name: "vellum-output.pdf".into(),
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("result"));
        assert!(is_identifier("_doc2"));
        assert!(!is_identifier("2doc"));
        assert!(!is_identifier("my-doc"));
        assert!(!is_identifier(""));
    }

    fn errors(config: &OutputConfig) -> Vec<String> {
        let mut diag = ConfigDiagnostics::new();
        config.validate(&mut diag);
        diag.errors().iter().map(|e| e.field.as_str().to_string()).collect()
    }

    #[test]
    fn test_validates_active_channel_only() {
        let mut config = OutputConfig {
            binding: "2bad".into(),
            file: "relative.pdf".into(),
            ..OutputConfig::default()
        };
        assert_eq!(errors(&config), ["output.binding"]);

        config.contract = ContractKind::File;
        assert_eq!(errors(&config), ["output.file"]);

        config.contract = ContractKind::Return;
        assert!(errors(&config).is_empty());
    }

    #[test]
    fn test_contract_mapping() {
        let mut config = OutputConfig::default();
        assert_eq!(config.contract(), OutputContract::Binding("result".into()));
        config.contract = ContractKind::File;
        assert_eq!(config.contract(), OutputContract::File("/tmp/output.pdf".into()));
        config.contract = ContractKind::Return;
        assert_eq!(config.contract(), OutputContract::Return);
    }
}
