//! Prompt composition: theme catalog, creativity buckets, and the final
//! instruction string sent alongside the drawing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const BASE_INSTRUCTION: &str = "Completely transform this image. Please remove any black or empty areas from the original image and fill them with new content. ";

// ── Themes ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    CartoonNetwork,
    Disney,
    BrawlStars,
    WarnerBros,
    Simpsons,
    Bluey,
}

impl Theme {
    pub const ALL: [Theme; 6] = [
        Theme::CartoonNetwork,
        Theme::Disney,
        Theme::BrawlStars,
        Theme::WarnerBros,
        Theme::Simpsons,
        Theme::Bluey,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Theme::CartoonNetwork => "Cartoon Network",
            Theme::Disney => "Disney",
            Theme::BrawlStars => "Brawl Stars",
            Theme::WarnerBros => "Warner Bros",
            Theme::Simpsons => "Simpsons",
            Theme::Bluey => "Bluey",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown theme: {0}")]
pub struct UnknownTheme(pub String);

/// Accepts "Cartoon Network", "cartoon-network", "cartoon_network", "CARTOONNETWORK".
impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Theme::ALL
            .into_iter()
            .find(|t| normalize(t.display_name()) == wanted)
            .ok_or_else(|| UnknownTheme(s.to_string()))
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

// ── Creativity ─────────────────────────────────────────

/// Slider value, always within 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CreativityLevel(u8);

impl CreativityLevel {
    pub const MAX: u8 = 100;

    /// Values above 100 are clamped.
    pub fn new(level: u8) -> Self {
        Self(level.min(Self::MAX))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn bucket(&self) -> CreativityBucket {
        CreativityBucket::from_level(self.0)
    }
}

impl Default for CreativityLevel {
    fn default() -> Self {
        Self(50)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreativityBucket {
    /// Enhance only, stay faithful to the drawing.
    Subtle,
    /// Creative/realistic blend keeping the core elements.
    Balanced,
    /// Full reimagining with low resemblance.
    Reimagine,
}

impl CreativityBucket {
    pub fn from_level(level: u8) -> Self {
        match level {
            0..=20 => CreativityBucket::Subtle,
            21..=80 => CreativityBucket::Balanced,
            _ => CreativityBucket::Reimagine,
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            CreativityBucket::Subtle => "Apply subtle, high-quality enhancements. Improve the colors and details while staying very true to the original drawing's style and content.",
            CreativityBucket::Balanced => "Transform this image with a blend of creativity and realism, maintaining the core elements of the original drawing.",
            CreativityBucket::Reimagine => "Completely reimagine this image in a highly creative and stylized way, with low resemblance to the original.",
        }
    }
}

// ── Composition ────────────────────────────────────────

/// base → theme (optional) → creativity bucket → custom direction (optional).
pub fn compose_prompt(theme: Option<Theme>, level: CreativityLevel, custom: &str) -> String {
    let mut prompt = String::from(BASE_INSTRUCTION);

    if let Some(theme) = theme {
        prompt.push_str(&format!(
            "Redraw the entire image in the style of '{}'. ",
            theme.display_name()
        ));
    }

    prompt.push_str(level.bucket().instruction());

    if !custom.trim().is_empty() {
        prompt.push_str(" Additionally, follow this creative direction: ");
        prompt.push_str(custom);
    }

    prompt
}
