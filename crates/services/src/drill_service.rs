use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use proctor_core::Clock;
use proctor_core::time::ClockEvent;
use proctor_core::typing::{InputOutcome, TypingDrill};

use crate::error::DrillServiceError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrillSettings {
    pub difficulty: Difficulty,
    pub language: Language,
    pub minutes: u32,
}

impl Default for DrillSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Easy,
            language: Language::English,
            minutes: 1,
        }
    }
}

const MIN_MINUTES: u32 = 1;
const MAX_MINUTES: u32 = 5;

const EASY_EN: &[&str] = &[
    "the sun rose over quiet hills",
    "a steady hand makes clean work",
    "small habits shape long days",
    "read the line before you type it",
    "slow keys still reach the end",
    "each word is a short step forward",
];

const MEDIUM_EN: &[&str] = &[
    "Good posture keeps the wrists relaxed during long sessions.",
    "Accuracy comes first, and speed follows with regular practice.",
    "A calm rhythm across the keyboard reduces careless mistakes.",
    "Short daily drills build more skill than rare marathon runs.",
    "Keep your eyes on the text rather than on your fingers.",
];

const HARD_EN: &[&str] = &[
    "Rhythm beats raw speed: 40 clean words > 60 sloppy ones!",
    "Shortcuts (Ctrl+S, Alt+Tab) are fast; typos are not.",
    "Measure, adjust & repeat; the numbers improve week by week.",
    "Semicolons; colons: dashes - and quotes \"test\" your reach.",
    "Review errors at 09:30, rest at 10:00, then try again.",
];

const EASY_HI: &[&str] = &[
    "धीरे चलो पर रुको मत।",
    "रोज़ थोड़ा अभ्यास करो।",
    "साफ़ लिखना ज़रूरी है।",
    "हर शब्द ध्यान से पढ़ो।",
];

const MEDIUM_HI: &[&str] = &[
    "सही बैठने से हाथों को आराम मिलता है।",
    "पहले शुद्धता पर ध्यान दो, गति अपने आप आएगी।",
    "छोटे अभ्यास रोज़ करने से कौशल बढ़ता है।",
    "स्क्रीन पर नज़र रखो, उंगलियों पर नहीं।",
];

const HARD_HI: &[&str] = &[
    "धैर्य, निरंतरता और अभ्यास: यही टाइपिंग की कुंजी है!",
    "गलतियों से सीखो; हर दिन 15 मिनट का अभ्यास काफ़ी है।",
    "विराम-चिह्न (, ; : !) सही जगह पर लगाना भी कला है।",
];

fn pool(difficulty: Difficulty, language: Language) -> &'static [&'static str] {
    match (language, difficulty) {
        (Language::English, Difficulty::Easy) => EASY_EN,
        (Language::English, Difficulty::Medium) => MEDIUM_EN,
        (Language::English, Difficulty::Hard) => HARD_EN,
        (Language::Hindi, Difficulty::Easy) => EASY_HI,
        (Language::Hindi, Difficulty::Medium) => MEDIUM_HI,
        (Language::Hindi, Difficulty::Hard) => HARD_HI,
    }
}

/// Build a passage of three or four sentences sampled from the matching pool.
pub fn generate_passage<R: Rng + ?Sized>(
    rng: &mut R,
    difficulty: Difficulty,
    language: Language,
) -> String {
    let sentences = pool(difficulty, language);
    let count = rng.random_range(3..=4);
    (0..count)
        .filter_map(|_| sentences.choose(rng).copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Creates and drives typing drills against a service clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypingDrillService {
    clock: Clock,
}

impl TypingDrillService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Start a fresh drill. Restarting simply calls this again.
    ///
    /// # Errors
    ///
    /// Returns `DrillServiceError::InvalidDuration` outside 1-5 minutes.
    pub fn new_drill(&self, settings: DrillSettings) -> Result<TypingDrill, DrillServiceError> {
        self.new_drill_with(&mut rand::rng(), settings)
    }

    /// # Errors
    ///
    /// Returns `DrillServiceError::InvalidDuration` outside 1-5 minutes.
    pub fn new_drill_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        settings: DrillSettings,
    ) -> Result<TypingDrill, DrillServiceError> {
        if !(MIN_MINUTES..=MAX_MINUTES).contains(&settings.minutes) {
            return Err(DrillServiceError::InvalidDuration(settings.minutes));
        }
        let passage = generate_passage(rng, settings.difficulty, settings.language);
        Ok(TypingDrill::new(passage, settings.minutes * 60)?)
    }

    /// # Errors
    ///
    /// Returns `DrillServiceError::Drill` once the drill has finished.
    pub fn type_text(
        &self,
        drill: &mut TypingDrill,
        text: &str,
    ) -> Result<InputOutcome, DrillServiceError> {
        Ok(drill.input_changed(text, self.clock.now())?)
    }

    pub fn tick(&self, drill: &mut TypingDrill) -> Option<ClockEvent> {
        drill.tick(self.clock.now())
    }
}
