use tunesmith_application::GenerationForm;
use tunesmith_core::generation::Genre;

pub fn run(genre: Genre) {
    let mut form = GenerationForm::new();
    form.set_genre(genre);

    let presets = form.prompt_presets();
    if presets.is_empty() {
        println!("No presets for '{}'. Pick a genre to get suggestions.", genre);
        return;
    }
    for (index, preset) in presets.iter().enumerate() {
        println!("{index}: {preset}");
    }
}
