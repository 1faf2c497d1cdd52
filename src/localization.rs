//! # Localization Module
//!
//! Fluent messages for everything the front end prints. Locale files are
//! embedded at compile time; unsupported languages fall back to English.

use anyhow::{anyhow, Result};
use fluent_bundle::{FluentArgs, FluentBundle, FluentResource, FluentValue};
use std::collections::HashMap;
use unic_langid::LanguageIdentifier;

/// Language used when the requested one is not available
pub const FALLBACK_LANGUAGE: &str = "en";

const LOCALES: [(&str, &str); 2] = [
    ("en", include_str!("../locales/en/main.ftl")),
    ("es", include_str!("../locales/es/main.ftl")),
];

/// Localization manager holding one bundle per supported language
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
}

impl LocalizationManager {
    /// Create a new localization manager with every embedded locale
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();
        for (code, source) in LOCALES {
            bundles.insert(code.to_string(), Self::create_bundle(code, source)?);
        }
        Ok(Self { bundles })
    }

    fn create_bundle(code: &str, source: &str) -> Result<FluentBundle<FluentResource>> {
        let locale: LanguageIdentifier = code.parse()?;
        let mut bundle = FluentBundle::new(vec![locale]);
        // Terminal output: no Unicode isolation marks around placeables
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow!("invalid {code} locale file: {errors:?}"))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow!("duplicate messages in {code} locale file: {errors:?}"))?;
        Ok(bundle)
    }

    /// Whether a bundle exists for `language`
    pub fn supports(&self, language: &str) -> bool {
        self.bundles.contains_key(language)
    }

    /// Reduce a locale tag such as `es_ES.UTF-8` to a supported language code
    pub fn resolve_language(&self, requested: Option<&str>) -> String {
        requested
            .map(|tag| {
                tag.split(['_', '-', '.'])
                    .next()
                    .unwrap_or_default()
                    .to_lowercase()
            })
            .filter(|code| self.supports(code))
            .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string())
    }

    /// Get a message in a specific language, falling back to English
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let bundle = match self
            .bundles
            .get(language)
            .or_else(|| self.bundles.get(FALLBACK_LANGUAGE))
        {
            Some(bundle) => bundle,
            None => return format!("Missing translation: {key}"),
        };

        let pattern = match bundle.get_message(key).and_then(|msg| msg.value()) {
            Some(pattern) => pattern,
            None => return format!("Missing translation: {key}"),
        };

        let fluent_args = args.map(|args| {
            let mut fluent_args = FluentArgs::new();
            for (name, value) in args {
                fluent_args.set(*name, FluentValue::from(*value));
            }
            fluent_args
        });

        let mut errors = vec![];
        bundle
            .format_pattern(pattern, fluent_args.as_ref(), &mut errors)
            .into_owned()
    }

    /// Get a message with simple string arguments
    pub fn message(&self, key: &str, language: &str, args: &[(&str, &str)]) -> String {
        if args.is_empty() {
            return self.get_message_in_language(key, language, None);
        }
        let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
        self.get_message_in_language(key, language, Some(&args_map))
    }
}
