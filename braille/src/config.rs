use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::ConfigError;
use crate::marker::MarkerScheme;
use crate::raster::Geometry;
use crate::segment::Language;
use crate::translate::memory::english_contraction_words;
use crate::translate::TablePair;

/// Settings for a [`crate::pipeline::Translator`].
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatorConfig {
    pub tables: BTreeMap<Language, TablePair>,
    /// Words indexed for longest-match reverse lookup.
    pub contractions: BTreeMap<Language, Vec<String>>,
    pub default_language: Language,
    /// Grade-2 output shorter than `chars * ratio` cells is implausible.
    pub plausibility_ratio: f64,
    /// Bound on a single service call. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Also translate with grade 1 to tell which pieces were contracted.
    pub analyze: bool,
    pub markers: MarkerScheme,
    pub geometry: Geometry,
    /// Cells per raster row.
    pub wrap: usize,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        let tables = BTreeMap::from([
            (Language::Hangul, TablePair::new("ko-g1.ctb", "ko-g2.ctb")),
            (Language::Latin, TablePair::new("en-us-g1.ctb", "en-us-g2.ctb")),
            (Language::Other, TablePair::new("en-us-g1.ctb", "en-us-g2.ctb")),
        ]);
        let contractions = BTreeMap::from([(Language::Latin, english_contraction_words())]);
        Self {
            tables,
            contractions,
            default_language: Language::Latin,
            plausibility_ratio: 0.5,
            timeout: Some(Duration::from_secs(10)),
            analyze: false,
            markers: MarkerScheme::default(),
            geometry: Geometry::default(),
            wrap: 25,
        }
    }
}

impl TranslatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.plausibility_ratio.is_finite() || self.plausibility_ratio < 0.0 {
            return Err(ConfigError::Parse(format!(
                "plausibility_ratio must be a non-negative number, got {}",
                self.plausibility_ratio
            )));
        }
        if self.wrap == 0 {
            return Err(ConfigError::Parse("wrap must be at least 1".into()));
        }
        if let Some(missing) = Language::ALL.iter().find(|l| !self.tables.contains_key(l)) {
            return Err(ConfigError::MissingTables(missing.to_string()));
        }
        self.markers.validate()?;
        self.geometry.validate()?;
        Ok(())
    }

    /// Indexed words paired with their language.
    pub fn contraction_words(&self) -> impl Iterator<Item = (Language, &str)> {
        self.contractions
            .iter()
            .flat_map(|(&lang, words)| words.iter().map(move |w| (lang, w.as_str())))
    }
}

#[cfg(feature = "serde")]
mod file {
    use super::*;
    use serde::Deserialize;

    /// TOML layout. Missing keys keep their defaults; tables and
    /// contraction lists are merged per language.
    #[derive(Debug, Default, Deserialize)]
    #[serde(default, deny_unknown_fields)]
    struct ConfigFile {
        default_language: Option<Language>,
        plausibility_ratio: Option<f64>,
        /// Milliseconds; 0 disables the timeout.
        timeout_ms: Option<u64>,
        analyze: Option<bool>,
        wrap: Option<usize>,
        markers: Option<MarkerScheme>,
        geometry: Option<Geometry>,
        tables: BTreeMap<Language, TablePair>,
        contractions: BTreeMap<Language, Vec<String>>,
    }

    impl TranslatorConfig {
        /// Parse a TOML configuration on top of the defaults.
        pub fn from_toml_str(toml_str: &str) -> Result<TranslatorConfig, ConfigError> {
            let file: ConfigFile =
                toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;
            let mut config = TranslatorConfig::default();
            if let Some(lang) = file.default_language {
                config.default_language = lang;
            }
            if let Some(ratio) = file.plausibility_ratio {
                config.plausibility_ratio = ratio;
            }
            if let Some(ms) = file.timeout_ms {
                config.timeout = (ms > 0).then(|| Duration::from_millis(ms));
            }
            if let Some(analyze) = file.analyze {
                config.analyze = analyze;
            }
            if let Some(wrap) = file.wrap {
                config.wrap = wrap;
            }
            if let Some(markers) = file.markers {
                config.markers = markers;
            }
            if let Some(geometry) = file.geometry {
                config.geometry = geometry;
            }
            config.tables.extend(file.tables);
            config.contractions.extend(file.contractions);
            config.validate()?;
            Ok(config)
        }

        pub fn load(path: impl AsRef<std::path::Path>) -> Result<TranslatorConfig, ConfigError> {
            let path = path.as_ref();
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
            Self::from_toml_str(&text)
        }
    }
}
