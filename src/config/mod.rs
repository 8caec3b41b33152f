//! Configuration module
//!
//! The configuration is a plain value owned by [`crate::Folio`] and handed to
//! every consumer; nothing caches it globally.

mod site;

pub use site::{
    AboutPageConfig, BuildConfig, HighlightConfig, HomePageConfig, ListingPageConfig,
    NavigationConfig, PagesConfig, ServerConfig, SiteConfig, SiteSection, DEFAULT_CONFIG_FILE,
    USER_CONFIG_FILE,
};

/// Run `f` against a freshly built default configuration.
///
/// Each call gets its own value, so tests can mutate it freely without
/// leaking settings into each other.
pub fn with_fresh_config<T>(f: impl FnOnce(SiteConfig) -> T) -> T {
    f(SiteConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_config_is_isolated() {
        with_fresh_config(|mut config| {
            config.site.name = "Changed".to_string();
            assert_eq!(config.site.name, "Changed");
        });
        with_fresh_config(|config| assert_eq!(config.site.name, "Your Name"));
    }
}
