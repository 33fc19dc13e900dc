/*!
 * Target length of the generated podcast.
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ConfigError;

/// Leading sentence shared by every summarization request
const PROMPT_PREFIX: &str = "Summarize this research paper in a";

/// Trailing instructions shared by every summarization request
const PROMPT_SUFFIX: &str = "spoken by a single narrator. It should be suitable for text-to-speech. Only include the spoken content by the narrator";

/// Podcast length chosen by the user; fixed for the whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PodcastDuration {
    Short,
    #[default]
    Medium,
    Long,
}

impl PodcastDuration {
    /// Every selectable duration, in display order
    pub const ALL: [PodcastDuration; 3] = [Self::Short, Self::Medium, Self::Long];

    /// Length and style fragment inserted into the prompt
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Short => "short, podcast-friendly format in less than 400 words",
            Self::Medium => "medium-length, engaging podcast format in less than 600 words",
            Self::Long => "detailed, podcast-friendly narrative in around 1000 words",
        }
    }

    /// Word count the instruction aims for
    pub fn word_ceiling(&self) -> usize {
        match self {
            Self::Short => 400,
            Self::Medium => 600,
            Self::Long => 1000,
        }
    }

    /// Full instruction sent ahead of every chunk
    pub fn prompt(&self) -> String {
        format!("{} {} {}", PROMPT_PREFIX, self.instruction(), PROMPT_SUFFIX)
    }

    /// Capitalized name as shown on the page
    pub fn label(&self) -> &'static str {
        match self {
            Self::Short => "Short",
            Self::Medium => "Medium",
            Self::Long => "Long",
        }
    }
}

impl fmt::Display for PodcastDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// Unknown values are rejected rather than mapped to a default length.
impl FromStr for PodcastDuration {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            _ => Err(ConfigError::Unknown { kind: "podcast duration", value: s.to_string() }),
        }
    }
}
