//! What this installation can do, computed once at startup.

use crate::registry::ProviderRegistry;
use crate::types::Capability;
use serde::{Deserialize, Serialize};
use std::env;
use std::ffi::OsStr;
use std::path::Path;

const OCR_TOOLS: &[&str] = &["tesseract"];
const EXTRACTION_TOOLS: &[&str] = &["pandoc", "pdftotext"];

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub ocr_available: bool,
    pub advanced_extraction_available: bool,
    pub ai_summarization: bool,
    pub web_search: bool,
    pub image_search: bool,
    pub historical_data: bool,
    /// AI, search and historical data are all backed by a provider.
    pub fully_operational: bool,
}

impl Capabilities {
    pub fn detect(registry: &ProviderRegistry) -> Self {
        let path = env::var_os("PATH");
        Self::from_parts(registry, |tool| on_path(path.as_deref(), tool))
    }

    /// Same as `detect` with a caller-supplied executable probe.
    pub fn from_parts<F>(registry: &ProviderRegistry, has_tool: F) -> Self
    where
        F: Fn(&str) -> bool,
    {
        let ai_summarization = registry.has(Capability::Summarize);
        let web_search = registry.has(Capability::Search);
        let historical_data = registry.has(Capability::HistoricalData);
        Self {
            ocr_available: OCR_TOOLS.iter().any(|t| has_tool(t)),
            advanced_extraction_available: EXTRACTION_TOOLS.iter().any(|t| has_tool(t)),
            ai_summarization,
            web_search,
            image_search: registry.has(Capability::ImageSearch),
            historical_data,
            fully_operational: ai_summarization && web_search && historical_data,
        }
    }
}

fn on_path(paths: Option<&OsStr>, command: &str) -> bool {
    if command.contains('/') {
        return Path::new(command).is_file();
    }
    let Some(paths) = paths else {
        return false;
    };
    env::split_paths(paths).any(|dir| {
        let candidate = dir.join(command);
        candidate.is_file() || (cfg!(windows) && candidate.with_extension("exe").is_file())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use std::collections::HashMap;

    #[test]
    fn test_demo_only_registry() {
        let registry =
            ProviderRegistry::build_from_credentials(&HashMap::new(), &Settings::default()).unwrap();
        let caps = Capabilities::from_parts(&registry, |tool| tool == "pdftotext");
        assert!(!caps.ocr_available);
        assert!(caps.advanced_extraction_available);
        assert!(!caps.ai_summarization);
        // World Bank defaults on and Demo Data is always present
        assert!(caps.historical_data);
        assert!(!caps.fully_operational);
    }

    #[test]
    fn test_fully_operational() {
        let credentials: HashMap<String, String> = [
            ("OPENAI_API_KEY", "sk-test-1234567890"),
            ("TAVILY_API_KEY", "tvly-abcdef123456"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let registry =
            ProviderRegistry::build_from_credentials(&credentials, &Settings::default()).unwrap();
        let caps = Capabilities::from_parts(&registry, |_| false);
        assert!(caps.fully_operational);
        assert!(!caps.image_search);
    }

    #[test]
    fn test_on_path_missing() {
        assert!(!on_path(None, "tesseract"));
    }
}
