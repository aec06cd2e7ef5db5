//! Release title and notes providers
//!
//! A configured title or notes value is one of:
//! - a template string, interpolated against the release context
//! - an `npm:<id>` reference to a provider registered under `<id>`
//! - a callback set programmatically
//!
//! Providers are looked up in an explicit [`TextProviderRegistry`] rather than
//! loaded dynamically, so the set of pluggable generators is always known.

mod command;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::context::ReleaseContext;
use crate::error::{GiteaError, Result};
use crate::template::interpolate;

pub use command::{CommandTextProvider, ProviderConfig, ProviderRequest, ProviderResponse};

/// Prefix marking a provider reference in title/notes configuration
pub const PROVIDER_PREFIX: &str = "npm:";

/// Callback producing text from the release context
pub type TextCallback = Arc<dyn Fn(&ReleaseContext) -> String + Send + Sync>;

/// Which piece of release text is being produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextField {
    /// Release title
    #[serde(rename = "releaseTitle")]
    Title,
    /// Release body
    #[serde(rename = "releaseNotes")]
    Notes,
}

impl TextField {
    /// Name of the callable a provider must expose for this field
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "releaseTitle",
            Self::Notes => "releaseNotes",
        }
    }

    /// Raw context value used when nothing is configured
    pub fn fallback(&self, context: &ReleaseContext) -> String {
        match self {
            Self::Title => context.version.clone(),
            Self::Notes => context.changelog.clone(),
        }
    }
}

impl std::fmt::Display for TextField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configured source of a title or notes value
#[derive(Clone)]
pub enum TextSource {
    /// Template string with `${field}` placeholders
    Template(String),
    /// Reference to a registered provider
    Provider(String),
    /// Programmatic callback
    Callback(TextCallback),
}

impl TextSource {
    /// Create a callback source
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&ReleaseContext) -> String + Send + Sync + 'static,
    {
        Self::Callback(Arc::new(f))
    }
}

impl From<String> for TextSource {
    fn from(value: String) -> Self {
        match value.strip_prefix(PROVIDER_PREFIX) {
            Some(id) => Self::Provider(id.to_string()),
            None => Self::Template(value),
        }
    }
}

impl From<&str> for TextSource {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl std::fmt::Debug for TextSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Template(t) => f.debug_tuple("Template").field(t).finish(),
            Self::Provider(id) => f.debug_tuple("Provider").field(id).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

impl std::fmt::Display for TextSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Template(t) => write!(f, "{}", t),
            Self::Provider(id) => write!(f, "{}{}", PROVIDER_PREFIX, id),
            Self::Callback(_) => write!(f, "<callback>"),
        }
    }
}

impl Serialize for TextSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TextSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

/// Generator of release text, registered under an identifier
pub trait TextProvider: Send + Sync {
    /// Whether this provider exposes a generator for `field`
    fn provides(&self, field: TextField) -> bool;

    /// Produce the text for `field`
    fn render(&self, field: TextField, context: &ReleaseContext) -> Result<String>;
}

/// Provider built from closures
#[derive(Clone, Default)]
pub struct FnTextProvider {
    title: Option<TextCallback>,
    notes: Option<TextCallback>,
}

impl FnTextProvider {
    /// Create a provider exposing nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose a title generator
    pub fn with_title<F>(mut self, f: F) -> Self
    where
        F: Fn(&ReleaseContext) -> String + Send + Sync + 'static,
    {
        self.title = Some(Arc::new(f));
        self
    }

    /// Expose a notes generator
    pub fn with_notes<F>(mut self, f: F) -> Self
    where
        F: Fn(&ReleaseContext) -> String + Send + Sync + 'static,
    {
        self.notes = Some(Arc::new(f));
        self
    }

    fn callback(&self, field: TextField) -> Option<&TextCallback> {
        match field {
            TextField::Title => self.title.as_ref(),
            TextField::Notes => self.notes.as_ref(),
        }
    }
}

impl TextProvider for FnTextProvider {
    fn provides(&self, field: TextField) -> bool {
        self.callback(field).is_some()
    }

    fn render(&self, field: TextField, context: &ReleaseContext) -> Result<String> {
        self.callback(field)
            .map(|f| f(context))
            .ok_or_else(|| GiteaError::other(format!("provider does not expose {}", field)))
    }
}

/// Registry of title/notes providers
#[derive(Default, Clone)]
pub struct TextProviderRegistry {
    providers: HashMap<String, Arc<dyn TextProvider>>,
}

impl TextProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under `id`
    pub fn register<P: TextProvider + 'static>(&mut self, id: impl Into<String>, provider: P) {
        self.providers.insert(id.into(), Arc::new(provider));
    }

    /// Register a shared provider under `id`
    pub fn register_arc(&mut self, id: impl Into<String>, provider: Arc<dyn TextProvider>) {
        self.providers.insert(id.into(), provider);
    }

    /// Register command providers from configuration
    pub fn load_from_configs(&mut self, configs: &HashMap<String, ProviderConfig>) {
        for (id, config) in configs {
            debug!(provider = %id, command = %config.command, "registering command provider");
            self.register(id.clone(), CommandTextProvider::from_config(id, config));
        }
    }

    /// Get a provider by identifier
    pub fn get(&self, id: &str) -> Option<Arc<dyn TextProvider>> {
        self.providers.get(id).cloned()
    }

    /// Identifiers of all registered providers
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for TextProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}

/// Resolve one release text field against the context.
pub fn resolve_text(
    field: TextField,
    source: Option<&TextSource>,
    context: &ReleaseContext,
    registry: &TextProviderRegistry,
) -> Result<String> {
    match source {
        Some(TextSource::Provider(id)) => {
            let provider = registry
                .get(id)
                .filter(|p| p.provides(field))
                .ok_or_else(|| GiteaError::ModuleNotFound(id.clone()))?;
            debug!(provider = %id, field = %field, "rendering text from provider");
            provider.render(field, context)
        }
        Some(TextSource::Template(template)) => Ok(interpolate(template, context)),
        Some(TextSource::Callback(f)) => Ok(f(context)),
        None => Ok(field.fallback(context)),
    }
}

/// Resolve the release title
pub fn resolve_title(
    source: Option<&TextSource>,
    context: &ReleaseContext,
    registry: &TextProviderRegistry,
) -> Result<String> {
    resolve_text(TextField::Title, source, context, registry)
}

/// Resolve the release notes
pub fn resolve_notes(
    source: Option<&TextSource>,
    context: &ReleaseContext,
    registry: &TextProviderRegistry,
) -> Result<String> {
    resolve_text(TextField::Notes, source, context, registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ReleaseContext {
        ReleaseContext {
            version: "1.2.3".to_string(),
            changelog: "- fixed things".to_string(),
            name: "pkg".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_text_source_from_string() {
        assert!(matches!(TextSource::from("v${version}"), TextSource::Template(_)));
        match TextSource::from("npm:my-notes") {
            TextSource::Provider(id) => assert_eq!(id, "my-notes"),
            other => panic!("unexpected source: {:?}", other),
        }
    }

    #[test]
    fn test_text_source_deserialize() {
        let source: TextSource = serde_json::from_str("\"npm:notes\"").unwrap();
        assert_eq!(source.to_string(), "npm:notes");
    }

    #[test]
    fn test_resolve_template() {
        let registry = TextProviderRegistry::new();
        let source = TextSource::from("v${version}");
        let out = resolve_text(TextField::Title, Some(&source), &context(), &registry).unwrap();
        assert_eq!(out, "v1.2.3");
    }

    #[test]
    fn test_resolve_callback() {
        let registry = TextProviderRegistry::new();
        let source = TextSource::callback(|ctx| format!("{} release", ctx.name));
        let out = resolve_text(TextField::Title, Some(&source), &context(), &registry).unwrap();
        assert_eq!(out, "pkg release");
    }

    #[test]
    fn test_resolve_fallback() {
        let registry = TextProviderRegistry::new();
        let ctx = context();
        assert_eq!(
            resolve_text(TextField::Title, None, &ctx, &registry).unwrap(),
            "1.2.3"
        );
        assert_eq!(
            resolve_text(TextField::Notes, None, &ctx, &registry).unwrap(),
            "- fixed things"
        );
    }

    #[test]
    fn test_resolve_provider() {
        let mut registry = TextProviderRegistry::new();
        registry.register(
            "fancy",
            FnTextProvider::new().with_notes(|ctx| format!("## {}", ctx.version)),
        );

        let source = TextSource::from("npm:fancy");
        let out = resolve_text(TextField::Notes, Some(&source), &context(), &registry).unwrap();
        assert_eq!(out, "## 1.2.3");
    }

    #[test]
    fn test_resolve_provider_missing_callable() {
        let mut registry = TextProviderRegistry::new();
        registry.register("fancy", FnTextProvider::new().with_notes(|_| String::new()));

        let source = TextSource::from("npm:fancy");
        let err = resolve_text(TextField::Title, Some(&source), &context(), &registry).unwrap_err();
        assert!(matches!(err, GiteaError::ModuleNotFound(ref id) if id == "fancy"));
    }

    #[test]
    fn test_resolve_provider_unregistered() {
        let registry = TextProviderRegistry::new();
        let source = TextSource::from("npm:missing-module");
        let err = resolve_text(TextField::Notes, Some(&source), &context(), &registry).unwrap_err();
        assert_eq!(err.to_string(), "missing-module not found");
    }
}
