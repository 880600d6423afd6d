use serde::{Deserialize, Serialize};

/// Shortest allowed probe timeout.
pub const MIN_SCAN_TIMEOUT_MS: u64 = 5_000;
/// Longest allowed probe timeout.
pub const MAX_SCAN_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_SCAN_TIMEOUT_MS: u64 = 15_000;

/// User-facing auditor settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditSettings {
    pub scan_timeout_ms: u64,
    pub theme_mode: ThemeMode,
    pub language: Language,
    pub normalize_mode: NormalizeMode,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            scan_timeout_ms: DEFAULT_SCAN_TIMEOUT_MS,
            theme_mode: ThemeMode::System,
            language: Language::EnUs,
            normalize_mode: NormalizeMode::Loose,
        }
    }
}

/// Theme mode selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Dark,
    Light,
    System,
}

/// Interface language. Also decides the recycle container's title.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Language {
    #[serde(rename = "zh_CN")]
    ZhCn,
    #[serde(rename = "en_US")]
    EnUs,
}

impl Language {
    /// Picks a language from a UI locale tag such as `zh-TW` or `en-GB`.
    pub fn from_ui_language(tag: &str) -> Self {
        if tag.to_lowercase().starts_with("zh") {
            Language::ZhCn
        } else {
            Language::EnUs
        }
    }

    /// Title of the folder that holds soft-deleted bookmarks.
    pub fn recycle_bin_title(self) -> &'static str {
        match self {
            Language::ZhCn => "书签回收站",
            Language::EnUs => "Bookmark Recycle Bin",
        }
    }
}

/// URL canonicalization strategy used for duplicate detection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NormalizeMode {
    /// Re-serialized absolute URL.
    Strict,
    /// Host without `www.`, path without trailing slash, query kept.
    Loose,
}
