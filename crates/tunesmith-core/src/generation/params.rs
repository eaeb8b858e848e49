//! Generation inputs selected on the form.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Musical genre of a generation request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Genre {
    #[default]
    NoGenre,
    Pop,
    Rock,
    HipHop,
    Lofi,
    Electronic,
    Jazz,
    Classical,
    Ambient,
}

impl Genre {
    /// Canned prompts offered once a genre is picked.
    ///
    /// `NoGenre` has none, which is what hides the preset strip on the form.
    pub fn prompt_presets(&self) -> &'static [&'static str] {
        match self {
            Self::NoGenre => &[],
            Self::Pop => &[
                "catchy summer anthem with bright synths",
                "upbeat chorus with hand claps",
                "dreamy pop ballad",
            ],
            Self::Rock => &[
                "driving guitar riff with heavy drums",
                "anthemic stadium rock chorus",
                "gritty garage rock jam",
            ],
            Self::HipHop => &[
                "boom bap beat with vinyl crackle",
                "trap beat with rolling hi-hats",
                "smooth jazzy hip hop groove",
            ],
            Self::Lofi => &[
                "lofi beats to study to",
                "rainy night lofi with soft piano",
                "warm tape-saturated chill loop",
            ],
            Self::Electronic => &[
                "pulsing techno at 128 bpm",
                "euphoric trance build-up",
                "glitchy downtempo textures",
            ],
            Self::Jazz => &[
                "late night piano trio",
                "swinging big band intro",
                "cool jazz with muted trumpet",
            ],
            Self::Classical => &[
                "gentle string quartet",
                "dramatic orchestral opening",
                "solo piano nocturne",
            ],
            Self::Ambient => &[
                "slowly evolving pads",
                "ocean waves and distant drones",
                "spacious cinematic atmosphere",
            ],
        }
    }
}

/// Mood of a generation request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Mood {
    #[default]
    NoMood,
    Relaxed,
    Happy,
    Sad,
    Energetic,
    Dark,
    Romantic,
}

/// Length of the generated track.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Duration {
    #[default]
    TenSeconds,
    ThirtySeconds,
    OneMinute,
}

impl Duration {
    pub fn seconds(&self) -> u32 {
        match self {
            Self::TenSeconds => 10,
            Self::ThirtySeconds => 30,
            Self::OneMinute => 60,
        }
    }
}

/// Immutable snapshot of the user-selected generation inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestParameters {
    pub prompt: String,
    pub genre: Genre,
    pub mood: Mood,
    pub duration: Duration,
}

impl RequestParameters {
    pub fn new(prompt: impl Into<String>, genre: Genre, mood: Mood, duration: Duration) -> Self {
        Self {
            prompt: prompt.into(),
            genre,
            mood,
            duration,
        }
    }

    /// Returns the prompt with surrounding whitespace removed, or `None` when
    /// nothing is left.
    pub fn trimmed_prompt(&self) -> Option<&str> {
        let trimmed = self.prompt.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Returns a copy whose prompt is trimmed, or `None` when the prompt is
    /// blank. Only normalized parameters are handed to a backend.
    pub fn normalized(&self) -> Option<Self> {
        self.trimmed_prompt().map(|prompt| Self {
            prompt: prompt.to_string(),
            ..self.clone()
        })
    }
}
