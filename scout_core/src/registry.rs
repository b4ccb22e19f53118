//! Ordered provider lists per capability.
//!
//! The registry is built once from whichever credentials are present and
//! well formed. Credentials are checked for shape only; nothing here talks
//! to the network.

use crate::config::{credentials_from_env, Settings};
use crate::error::ProviderError;
use crate::providers::anthropic::AnthropicClient;
use crate::providers::chat_completions::ChatCompletionsClient;
use crate::providers::cohere::CohereClient;
use crate::providers::exa::ExaClient;
use crate::providers::gemini::GeminiClient;
use crate::providers::historical::{DemoDataClient, FredClient, WorldBankClient};
use crate::providers::huggingface::HuggingFaceClient;
use crate::providers::images::{PixabayClient, UnsplashClient};
use crate::providers::ollama::OllamaClient;
use crate::providers::searchapi::SearchApiClient;
use crate::providers::serpapi::SerpApiClient;
use crate::providers::tavily::TavilyClient;
use crate::providers::you::YouClient;
use crate::providers::http_client;
use crate::types::{Capability, ProviderDescriptor};
use crate::ProviderClient;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Priority of the local historical series generator; always tried last.
pub const DEMO_DATA_PRIORITY: u32 = 99;

/// Shape check applied to a credential before its provider is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialRule {
    /// Starts with the given prefix
    Prefix(&'static str),
    /// Longer than the given number of characters
    MinLen(usize),
    /// Present and not a `..._here` template value
    NotPlaceholder,
    /// Equals `true`, ignoring case
    FlagTrue,
    /// Like `FlagTrue`, but an absent value counts as `true`
    FlagTrueDefault,
}

impl CredentialRule {
    pub fn accepts(&self, value: Option<&str>) -> bool {
        let value = value.map(str::trim);
        match (self, value) {
            (CredentialRule::FlagTrueDefault, None) => true,
            (CredentialRule::FlagTrueDefault | CredentialRule::FlagTrue, Some(v)) => {
                v.eq_ignore_ascii_case("true")
            }
            (_, None) => false,
            (_, Some(v)) if v.is_empty() || is_placeholder(v) => false,
            (CredentialRule::Prefix(prefix), Some(v)) => v.starts_with(prefix) && v.len() > prefix.len(),
            (CredentialRule::MinLen(len), Some(v)) => v.chars().count() > *len,
            (CredentialRule::NotPlaceholder, Some(_)) => true,
        }
    }
}

fn is_placeholder(value: &str) -> bool {
    value.to_ascii_lowercase().ends_with("_here")
}

/// One entry of the known-provider table.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub capability: Capability,
    pub name: &'static str,
    pub priority: u32,
    pub env_var: &'static str,
    pub rule: CredentialRule,
}

const fn entry(
    capability: Capability,
    name: &'static str,
    priority: u32,
    env_var: &'static str,
    rule: CredentialRule,
) -> CatalogEntry {
    CatalogEntry {
        capability,
        name,
        priority,
        env_var,
        rule,
    }
}

use CredentialRule::{FlagTrue, FlagTrueDefault, MinLen, NotPlaceholder, Prefix};

/// Every provider the registry knows how to build, in priority order.
pub const CATALOG: &[CatalogEntry] = &[
    entry(Capability::Summarize, "OpenAI", 0, "OPENAI_API_KEY", Prefix("sk-")),
    entry(Capability::Summarize, "Gemini", 1, "GEMINI_API_KEY", Prefix("AIza")),
    entry(Capability::Summarize, "Anthropic", 2, "ANTHROPIC_API_KEY", Prefix("sk-ant-")),
    entry(Capability::Summarize, "Perplexity", 3, "PERPLEXITY_API_KEY", Prefix("pplx-")),
    entry(Capability::Summarize, "HuggingFace", 4, "HUGGINGFACE_API_KEY", Prefix("hf_")),
    entry(Capability::Summarize, "Cohere", 5, "COHERE_API_KEY", Prefix("co-")),
    entry(Capability::Summarize, "Together", 6, "TOGETHER_API_KEY", Prefix("together_")),
    entry(Capability::Summarize, "Ollama", 7, "OLLAMA_ENABLED", FlagTrue),
    entry(Capability::Search, "Exa", 0, "EXA_API_KEY", MinLen(20)),
    entry(Capability::Search, "Tavily", 1, "TAVILY_API_KEY", Prefix("tvly-")),
    entry(Capability::Search, "SerpAPI", 2, "SERPAPI_API_KEY", MinLen(20)),
    entry(Capability::Search, "SearchApi", 3, "SEARCHAPI_KEY", MinLen(10)),
    entry(Capability::Search, "You.com", 4, "YOU_API_KEY", NotPlaceholder),
    entry(Capability::ImageSearch, "Unsplash", 0, "UNSPLASH_ACCESS_KEY", NotPlaceholder),
    entry(Capability::ImageSearch, "Pixabay", 1, "PIXABAY_API_KEY", NotPlaceholder),
    entry(Capability::ImageSearch, "SerpAPI Images", 2, "SERPAPI_API_KEY", MinLen(20)),
    entry(Capability::HistoricalData, "FRED", 0, "FRED_API_KEY", NotPlaceholder),
    entry(Capability::HistoricalData, "World Bank", 1, "WORLD_BANK_API_ENABLED", FlagTrueDefault),
];

/// Construct the client for a catalog entry.
fn instantiate(
    entry: &CatalogEntry,
    key: &str,
    http: &Client,
    settings: &Settings,
) -> Option<Arc<dyn ProviderClient>> {
    let http = http.clone();
    let ai = settings.summarize_timeout();
    let search = settings.search_timeout();
    let client: Arc<dyn ProviderClient> = match entry.name {
        "OpenAI" => Arc::new(ChatCompletionsClient::openai(http, key, ai)),
        "Gemini" => Arc::new(GeminiClient::new(http, key, ai)),
        "Anthropic" => Arc::new(AnthropicClient::new(http, key, ai)),
        "Perplexity" => Arc::new(ChatCompletionsClient::perplexity(http, key, ai)),
        "HuggingFace" => Arc::new(HuggingFaceClient::new(http, key, ai)),
        "Cohere" => Arc::new(CohereClient::new(http, key, ai)),
        "Together" => Arc::new(ChatCompletionsClient::together(http, key, ai)),
        "Ollama" => Arc::new(OllamaClient::new(
            http,
            settings.ollama_base_url.clone(),
            settings.ollama_timeout(),
        )),
        "Exa" => Arc::new(ExaClient::new(http, key, search)),
        "Tavily" => Arc::new(TavilyClient::new(http, key, search)),
        "SerpAPI" => Arc::new(SerpApiClient::web(http, key, search)),
        "SearchApi" => Arc::new(SearchApiClient::new(http, key, search)),
        "You.com" => Arc::new(YouClient::new(http, key, search)),
        "Unsplash" => Arc::new(UnsplashClient::new(http, key, search)),
        "Pixabay" => Arc::new(PixabayClient::new(http, key, search)),
        "SerpAPI Images" => Arc::new(SerpApiClient::images(http, key, search)),
        "FRED" => Arc::new(FredClient::new(http, key, search)),
        "World Bank" => Arc::new(WorldBankClient::new(http, search)),
        _ => return None,
    };
    Some(client)
}

/// A descriptor together with the client that serves it.
#[derive(Clone)]
pub struct RegisteredProvider {
    pub descriptor: ProviderDescriptor,
    pub client: Arc<dyn ProviderClient>,
}

impl std::fmt::Debug for RegisteredProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredProvider")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Providers grouped by capability, tried in ascending priority.
#[derive(Debug, Default, Clone)]
pub struct ProviderRegistry {
    providers: Vec<RegisteredProvider>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client under a descriptor.
    ///
    /// Two providers of one capability may not share a priority.
    pub fn register(
        &mut self,
        descriptor: ProviderDescriptor,
        client: Arc<dyn ProviderClient>,
    ) -> Result<(), ProviderError> {
        if let Some(existing) = self.providers.iter().find(|p| {
            p.descriptor.capability == descriptor.capability
                && p.descriptor.priority == descriptor.priority
        }) {
            return Err(ProviderError::Config(format!(
                "{} priority {} is already taken by {}",
                descriptor.capability, descriptor.priority, existing.descriptor.name
            )));
        }
        self.providers.push(RegisteredProvider { descriptor, client });
        Ok(())
    }

    /// Register a client at the next free priority for `capability`.
    pub fn push(&mut self, capability: Capability, client: Arc<dyn ProviderClient>) -> &mut Self {
        let priority = self
            .providers
            .iter()
            .filter(|p| p.descriptor.capability == capability)
            .map(|p| p.descriptor.priority + 1)
            .max()
            .unwrap_or(0);
        let descriptor = ProviderDescriptor::new(capability, client.name(), priority);
        self.providers.push(RegisteredProvider { descriptor, client });
        self
    }

    /// Build from a credential map, skipping providers whose credential is
    /// absent or malformed. The local historical generator is always added.
    pub fn build_from_credentials(
        credentials: &HashMap<String, String>,
        settings: &Settings,
    ) -> Result<Self, ProviderError> {
        let http = http_client()?;
        let mut registry = Self::new();

        for entry in CATALOG {
            let value = credentials.get(entry.env_var).map(String::as_str);
            if !entry.rule.accepts(value) {
                debug!(
                    target: "scout.registry",
                    provider = entry.name,
                    env = entry.env_var,
                    "credential missing or malformed, skipping"
                );
                continue;
            }
            let Some(client) = instantiate(entry, value.unwrap_or_default(), &http, settings)
            else {
                continue;
            };
            let descriptor = ProviderDescriptor::new(entry.capability, entry.name, entry.priority);
            registry.register(descriptor, client)?;
        }

        registry.register(
            ProviderDescriptor::new(
                Capability::HistoricalData,
                crate::historical::DEMO_SOURCE,
                DEMO_DATA_PRIORITY,
            )
            .without_credential(),
            Arc::new(DemoDataClient),
        )?;

        info!(
            target: "scout.registry",
            summarize = registry.count(Capability::Summarize),
            search = registry.count(Capability::Search),
            image_search = registry.count(Capability::ImageSearch),
            historical = registry.count(Capability::HistoricalData),
            "provider registry built"
        );
        Ok(registry)
    }

    /// Build from the process environment.
    pub fn from_env(settings: &Settings) -> Result<Self, ProviderError> {
        Self::build_from_credentials(&credentials_from_env(), settings)
    }

    /// Descriptors for a capability, lowest priority first. May be empty.
    pub fn get_providers(&self, capability: Capability) -> Vec<ProviderDescriptor> {
        self.entries(capability)
            .into_iter()
            .map(|p| p.descriptor.clone())
            .collect()
    }

    /// Registered providers for a capability, lowest priority first.
    pub fn entries(&self, capability: Capability) -> Vec<&RegisteredProvider> {
        let mut entries: Vec<_> = self
            .providers
            .iter()
            .filter(|p| p.descriptor.capability == capability)
            .collect();
        entries.sort_by_key(|p| p.descriptor.priority);
        entries
    }

    pub fn get_provider(&self, name: &str) -> Option<&RegisteredProvider> {
        self.providers.iter().find(|p| p.descriptor.name == name)
    }

    /// All descriptors ordered by capability, then priority.
    pub fn list_providers(&self) -> Vec<ProviderDescriptor> {
        Capability::ALL
            .iter()
            .flat_map(|cap| self.get_providers(*cap))
            .collect()
    }

    pub fn count(&self, capability: Capability) -> usize {
        self.providers
            .iter()
            .filter(|p| p.descriptor.capability == capability)
            .count()
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.count(capability) > 0
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
