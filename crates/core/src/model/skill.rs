use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Upper bound for any single skill's progress value.
pub const MAX_SKILL_PROGRESS: u32 = 100;

/// One of the five fixed learning dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillName {
    Grammar,
    Vocabulary,
    Listening,
    Speaking,
    Reading,
}

impl SkillName {
    /// All skills in canonical display order.
    pub const ALL: [SkillName; 5] = [
        SkillName::Grammar,
        SkillName::Vocabulary,
        SkillName::Listening,
        SkillName::Speaking,
        SkillName::Reading,
    ];

    /// Keywords checked against quiz titles, in match priority order.
    const TITLE_KEYWORDS: [SkillName; 4] = [
        SkillName::Vocabulary,
        SkillName::Listening,
        SkillName::Speaking,
        SkillName::Reading,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SkillName::Grammar => "grammar",
            SkillName::Vocabulary => "vocabulary",
            SkillName::Listening => "listening",
            SkillName::Speaking => "speaking",
            SkillName::Reading => "reading",
        }
    }

    /// Attribute a quiz to a skill from its title.
    ///
    /// The first skill name found as a case-insensitive substring wins, checked
    /// in the order vocabulary, listening, speaking, reading. Anything else is
    /// grammar.
    #[must_use]
    pub fn classify_title(title: &str) -> Self {
        let lowered = title.to_lowercase();
        Self::TITLE_KEYWORDS
            .into_iter()
            .find(|skill| lowered.contains(skill.as_str()))
            .unwrap_or(SkillName::Grammar)
    }
}

impl fmt::Display for SkillName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillName {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|skill| skill.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ModelError::UnknownSkill(s.to_owned()))
    }
}

/// Per-skill progress values, each in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SkillProgress {
    #[serde(default)]
    pub grammar: u32,
    #[serde(default)]
    pub vocabulary: u32,
    #[serde(default)]
    pub listening: u32,
    #[serde(default)]
    pub speaking: u32,
    #[serde(default)]
    pub reading: u32,
}

impl SkillProgress {
    #[must_use]
    pub fn get(&self, skill: SkillName) -> u32 {
        match skill {
            SkillName::Grammar => self.grammar,
            SkillName::Vocabulary => self.vocabulary,
            SkillName::Listening => self.listening,
            SkillName::Speaking => self.speaking,
            SkillName::Reading => self.reading,
        }
    }

    fn slot_mut(&mut self, skill: SkillName) -> &mut u32 {
        match skill {
            SkillName::Grammar => &mut self.grammar,
            SkillName::Vocabulary => &mut self.vocabulary,
            SkillName::Listening => &mut self.listening,
            SkillName::Speaking => &mut self.speaking,
            SkillName::Reading => &mut self.reading,
        }
    }

    /// Raise one skill, capping at `MAX_SKILL_PROGRESS`. Returns the new value.
    pub fn raise(&mut self, skill: SkillName, amount: u32) -> u32 {
        let slot = self.slot_mut(skill);
        *slot = slot.saturating_add(amount).min(MAX_SKILL_PROGRESS);
        *slot
    }

    /// Iterate `(skill, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (SkillName, u32)> + '_ {
        SkillName::ALL.into_iter().map(|skill| (skill, self.get(skill)))
    }
}
