use crate::config::Config;
use crate::types::{Mode, Tone, ToneSelection};
use clap::Args;
use strum::IntoEnumIterator;

#[derive(Args, Clone, Default, Debug)]
pub struct CommonParams {
    /// Override the configured mode
    #[arg(short, long, help = "Mode to use (fast, deep, search)", value_parser = mode_parser)]
    pub mode: Option<Mode>,

    /// Override the configured tone
    #[arg(
        short,
        long,
        help = "Tone to aim for (mixed, flirty, romantic, funny, casual, unhinged, professional)",
        value_parser = tone_parser
    )]
    pub tone: Option<ToneSelection>,
}

impl CommonParams {
    /// Writes the overrides into `config`; returns whether anything changed
    pub fn apply_to_config(&self, config: &mut Config) -> bool {
        config.update(self.mode, self.tone)
    }

    /// Mode for this invocation, falling back to the configured default
    pub fn effective_mode(&self, config: &Config) -> Mode {
        self.mode.unwrap_or(config.default_mode)
    }

    /// Tone for this invocation, falling back to the configured default
    pub fn effective_tone(&self, config: &Config) -> ToneSelection {
        self.tone.unwrap_or(config.default_tone)
    }
}

/// Validates a mode name
pub fn mode_parser(s: &str) -> Result<Mode, String> {
    s.parse::<Mode>().map_err(|_| {
        let valid: Vec<String> = Mode::iter().map(|m| m.to_string()).collect();
        format!("Invalid mode '{}'. Available modes: {}", s, valid.join(", "))
    })
}

/// Validates a tone name, accepting `mixed` for no preference
pub fn tone_parser(s: &str) -> Result<ToneSelection, String> {
    s.parse::<ToneSelection>().map_err(|_| {
        let valid: Vec<String> = std::iter::once(ToneSelection::Mixed.to_string().to_lowercase())
            .chain(Tone::iter().map(|t| t.to_string().to_lowercase()))
            .collect();
        format!("Invalid tone '{}'. Available tones: {}", s, valid.join(", "))
    })
}
