//! The `cognitex init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("cognitex.toml").exists() {
        println!("cognitex.toml already exists, skipping.");
    } else {
        std::fs::write("cognitex.toml", SAMPLE_CONFIG)?;
        println!("Created cognitex.toml");
    }

    std::fs::create_dir_all("decks")?;
    let example_path = Path::new("decks/example.toml");
    if example_path.exists() {
        println!("decks/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_DECK)?;
        println!("Created decks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit cognitex.toml with your API keys (or use --provider mock)");
    println!("  2. Run: cognitex play --deck decks/example.toml");
    println!("  3. Run: cognitex quest --subject \"photosynthesis\"");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# cognitex configuration

default_provider = "openai"
default_model = "gpt-4.1-mini"
default_temperature = 0.7
max_tokens = 2048
# en or vi
locale = "en"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

[providers.ollama]
type = "ollama"
base_url = "http://localhost:11434"

[providers.mock]
type = "mock"

# Replace a flow's prompt text, keyed by flow id:
# [templates]
# provideMoodBasedInsights = "The student feels {{{mood}}}. ..."
"#;

const EXAMPLE_DECK: &str = r#"[deck]
name = "Photosynthesis Basics"
subject = "photosynthesis"

[[flashcards]]
question = "What gas do plants absorb for photosynthesis?"
answer = "Carbon dioxide"

[[flashcards]]
question = "What gas is released by photosynthesis?"
answer = "Oxygen"

[[flashcards]]
question = "Which pigment captures light energy?"
answer = "Chlorophyll"

[[flashcards]]
question = "In which organelle does photosynthesis happen?"
answer = "Chloroplast"

[[flashcards]]
question = "What sugar does photosynthesis produce?"
answer = "Glucose"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use cognitex_core::deck::{parse_deck_str, validate_deck};
    use cognitex_providers::CognitexConfig;

    #[test]
    fn sample_config_parses() {
        let config: CognitexConfig = toml::from_str(SAMPLE_CONFIG).unwrap();
        assert_eq!(config.providers.len(), 4);
        assert_eq!(config.default_provider, "openai");
    }

    #[test]
    fn example_deck_is_valid() {
        let deck = parse_deck_str(EXAMPLE_DECK, Path::new("decks/example.toml")).unwrap();
        assert_eq!(deck.flashcards.len(), 5);
        assert!(validate_deck(&deck).is_empty());
    }
}
