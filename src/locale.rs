use serde::{Deserialize, Serialize};

/// Regional variants and the language whose wiki serves them.
const VARIANT_PARENTS: &[(&str, &str)] = &[
    ("zh-hans", "zh"), ("zh-hant", "zh"), ("zh-cn", "zh"), ("zh-hk", "zh"),
    ("zh-mo", "zh"), ("zh-my", "zh"), ("zh-sg", "zh"), ("zh-tw", "zh"),
    ("sr-ec", "sr"), ("sr-el", "sr"),
    ("kk-cyrl", "kk"), ("kk-latn", "kk"), ("kk-arab", "kk"),
    ("kk-kz", "kk"), ("kk-tr", "kk"), ("kk-cn", "kk"),
    ("ku-latn", "ku"), ("ku-arab", "ku"),
    ("tg-cyrl", "tg"), ("tg-latn", "tg"),
    ("uz-latn", "uz"), ("uz-cyrl", "uz"),
    ("gan-hans", "gan"), ("gan-hant", "gan"),
    ("wuu-hans", "wuu"), ("wuu-hant", "wuu"),
    ("ike-cans", "iu"), ("ike-latn", "iu"),
    ("crh-latn", "crh"), ("crh-cyrl", "crh"),
    ("shi-latn", "shi"), ("shi-tfng", "shi"),
    ("sh-latn", "sh"), ("sh-cyrl", "sh"),
];

/// Parent language for a variant code, if the code is a known variant.
pub fn parent_language_of(code: &str) -> Option<&'static str> {
    let code = code.trim().to_ascii_lowercase();
    VARIANT_PARENTS.iter().find(|(v, _)| *v == code).map(|(_, p)| *p)
}

/// One wiki in one language (or language variant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiSite {
    language_code: String,
    /// Explicit fallback language; overrides the built-in variant table when set.
    #[serde(default)]
    parent_language: Option<String>,
}

impl WikiSite {
    pub fn new(language_code: impl Into<String>) -> Self {
        Self { language_code: language_code.into().trim().to_ascii_lowercase(), parent_language: None }
    }

    pub fn with_parent_language(mut self, parent: impl Into<String>) -> Self {
        let p = parent.into();
        self.parent_language = Some(p).filter(|p| !p.trim().is_empty());
        self
    }

    pub fn language_code(&self) -> &str { &self.language_code }

    /// The declared fallback language. `None` means no variant correction applies.
    pub fn parent_language(&self) -> Option<&str> {
        self.parent_language.as_deref().or_else(|| parent_language_of(&self.language_code))
    }

    pub fn has_parent_language(&self) -> bool { self.parent_language().is_some() }

    /// Host label: variants are served from their parent's wiki.
    pub fn subdomain(&self) -> &str {
        self.parent_language().unwrap_or(&self.language_code)
    }

    /// Site identifier used by the structured-data service, e.g. `zhwiki`.
    pub fn db_name(&self) -> String {
        format!("{}wiki", self.subdomain().replace('-', "_"))
    }
}

impl Default for WikiSite {
    fn default() -> Self { Self::new("en") }
}
