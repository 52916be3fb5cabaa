use serde::{Deserialize, Serialize};

/// Output/source language. Closed set: every (niche, language) combination
/// has a prompt template and a default tag set, so an unsupported value is
/// a config-load error rather than a runtime fallback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ru,
    Uk,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
            Language::Uk => "uk",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ru => "Russian",
            Language::Uk => "Ukrainian",
        }
    }

    pub fn from_code(code: &str) -> Option<Language> {
        match code {
            "en" => Some(Language::En),
            "ru" => Some(Language::Ru),
            "uk" => Some(Language::Uk),
            _ => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Content vertical. Selects prompt voice, default tags and the publication
/// target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Niche {
    SelfHelp,
    Tech,
    Finance,
}

impl Niche {
    pub fn name(&self) -> &'static str {
        match self {
            Niche::SelfHelp => "self-help",
            Niche::Tech => "tech",
            Niche::Finance => "finance",
        }
    }

    /// Editorial voice injected into the body prompt.
    pub fn voice(&self) -> &'static str {
        match self {
            Niche::SelfHelp => "a warm, practical personal-growth writer",
            Niche::Tech => "a precise technology writer for a developer audience",
            Niche::Finance => "a level-headed personal-finance columnist",
        }
    }

    /// Fallback tag set used when the model returns something unusable.
    /// Always exactly five entries.
    pub fn default_tags(&self) -> [&'static str; 5] {
        match self {
            Niche::SelfHelp => [
                "Self Improvement",
                "Personal Growth",
                "Productivity",
                "Motivation",
                "Life Lessons",
            ],
            Niche::Tech => [
                "Technology",
                "Programming",
                "Software Engineering",
                "Tech",
                "Software Development",
            ],
            Niche::Finance => [
                "Personal Finance",
                "Money",
                "Investing",
                "Financial Freedom",
                "Saving Money",
            ],
        }
    }
}

impl std::fmt::Display for Niche {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Duration-derived bucket. Controls how much transcript is forwarded to
/// the model, how long the requested article is, and how many
/// illustrations the document gets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier {
    Brief,
    Standard,
    Deep,
    Marathon,
}

pub struct TierProfile {
    /// Transcript character budget forwarded to the body call.
    pub transcript_budget: usize,
    /// max_tokens for the body call.
    pub max_tokens: u32,
    /// Illustrations interleaved into the document.
    pub illustrations: usize,
    /// Length hint spliced into the body prompt.
    pub target_length: &'static str,
}

impl Tier {
    pub fn for_duration(duration_secs: u32) -> Tier {
        match duration_secs {
            0..300 => Tier::Brief,
            300..1200 => Tier::Standard,
            1200..3600 => Tier::Deep,
            _ => Tier::Marathon,
        }
    }

    pub fn profile(&self) -> TierProfile {
        match self {
            Tier::Brief => TierProfile {
                transcript_budget: 6_000,
                max_tokens: 900,
                illustrations: 1,
                target_length: "600-800 words",
            },
            Tier::Standard => TierProfile {
                transcript_budget: 12_000,
                max_tokens: 1_600,
                illustrations: 2,
                target_length: "1000-1400 words",
            },
            Tier::Deep => TierProfile {
                transcript_budget: 24_000,
                max_tokens: 2_400,
                illustrations: 3,
                target_length: "1600-2200 words",
            },
            Tier::Marathon => TierProfile {
                transcript_budget: 36_000,
                max_tokens: 3_200,
                illustrations: 4,
                target_length: "2400-3000 words",
            },
        }
    }
}

/// System prompt for the article body call.
pub fn body_system_prompt(niche: Niche, lang: Language) -> String {
    format!(
        "You are {voice}. You turn video transcriptions into well-structured \
         long-form Markdown articles. Write ALL output in {lang}. Use short \
         paragraphs separated by blank lines and descriptive subheadings. \
         Never mention that the text came from a video transcript.",
        voice = niche.voice(),
        lang = lang.name()
    )
}

/// System prompt for the title call.
pub fn title_system_prompt(lang: Language) -> String {
    format!(
        "You are an editor. Given an article, you answer with a single \
         compelling headline in {lang}, under 80 characters, with no quotes \
         and no surrounding punctuation.",
        lang = lang.name()
    )
}

/// System prompt for the tag call.
pub fn tags_system_prompt(lang: Language) -> String {
    format!(
        "You are a helpful assistant that labels articles. You answer with \
         exactly five tags in {lang} as a JSON array of strings and nothing \
         else.",
        lang = lang.name()
    )
}
