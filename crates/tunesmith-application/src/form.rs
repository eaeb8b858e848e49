use tunesmith_core::generation::{Duration, Genre, Mood, RequestParameters};

/// Editable state of the generation form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationForm {
    prompt: String,
    genre: Genre,
    mood: Mood,
    duration: Duration,
}

impl GenerationForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn genre(&self) -> Genre {
        self.genre
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn set_genre(&mut self, genre: Genre) {
        self.genre = genre;
    }

    pub fn set_mood(&mut self, mood: Mood) {
        self.mood = mood;
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    /// Whether the submit control is enabled.
    ///
    /// Only a completely empty field disables it; a whitespace prompt is
    /// submittable and rejected by the lifecycle with the empty-prompt error.
    pub fn can_submit(&self) -> bool {
        !self.prompt.is_empty()
    }

    /// Presets for the selected genre.
    pub fn prompt_presets(&self) -> &'static [&'static str] {
        self.genre.prompt_presets()
    }

    /// Copies preset `index` into the prompt. Returns `false` if there is no
    /// such preset.
    pub fn apply_preset(&mut self, index: usize) -> bool {
        match self.prompt_presets().get(index) {
            Some(preset) => {
                self.prompt = (*preset).to_string();
                true
            }
            None => false,
        }
    }

    pub fn parameters(&self) -> RequestParameters {
        RequestParameters::new(self.prompt.clone(), self.genre, self.mood, self.duration)
    }
}
