//! Inbound message generator.
//!
//! Draws a source uniformly from Boss/Family/Agile and then a text uniformly
//! from that source's catalog. The draw goes through a [`Picker`] so a run can
//! be replayed from a seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

use crate::domain::models::{GeneratorConfig, Message, MessageSource};
use crate::domain::ports::Picker;

/// Text of the one-shot system message posted at start.
pub const WELCOME_TEXT: &str = "Welcome to the Court Room!";

/// [`Picker`] backed by a seedable RNG.
pub struct SeededPicker {
    rng: StdRng,
}

impl SeededPicker {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded if a seed is given, otherwise from OS entropy.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::from_seed)
    }
}

impl Picker for SeededPicker {
    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// [`Picker`] that replays a fixed list of choices, cycling when exhausted.
///
/// Out-of-range choices wrap around.
pub struct SequencePicker {
    choices: Vec<usize>,
    cursor: usize,
}

impl SequencePicker {
    pub fn new(choices: impl Into<Vec<usize>>) -> Self {
        Self {
            choices: choices.into(),
            cursor: 0,
        }
    }
}

impl Picker for SequencePicker {
    fn pick(&mut self, len: usize) -> usize {
        if self.choices.is_empty() {
            return 0;
        }
        let choice = self.choices[self.cursor % self.choices.len()];
        self.cursor += 1;
        choice % len
    }
}

/// Manufactures inbound messages on a fixed cadence.
pub struct Generator {
    picker: Box<dyn Picker>,
    interval: Duration,
    welcome_ttl: Duration,
}

impl Generator {
    pub fn new(config: &GeneratorConfig, picker: Box<dyn Picker>) -> Self {
        Self {
            picker,
            interval: config.interval(),
            welcome_ttl: config.welcome_ttl(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn welcome_ttl(&self) -> Duration {
        self.welcome_ttl
    }

    /// The one-shot system greeting.
    pub fn welcome(&self) -> Message {
        Message::new(MessageSource::System, WELCOME_TEXT)
    }

    /// Draw the next inbound message.
    pub fn next_message(&mut self) -> Message {
        let sources = MessageSource::GENERATED;
        let source = sources[self.picker.pick(sources.len())];
        let catalog = source.catalog();
        let text = catalog[self.picker.pick(catalog.len())];
        Message::new(source, text)
    }
}
