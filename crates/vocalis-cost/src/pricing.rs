// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model pricing tables and cost calculation.
//!
//! gpt-4o-mini: input=$0.15/MTok, output=$0.60/MTok
//! whisper-1:   $0.006 per audio minute, estimated at 150 spoken words per minute
//! tts-1:       $15.00 per million characters

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use vocalis_core::{TokenUsage, VocalisError};

/// Models whose usage is metered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum ModelKind {
    /// Chat completion.
    #[strum(serialize = "gpt-4o-mini")]
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    /// Speech transcription.
    #[strum(serialize = "whisper-1")]
    #[serde(rename = "whisper-1")]
    Whisper1,
    /// Speech synthesis.
    #[strum(serialize = "tts-1")]
    #[serde(rename = "tts-1")]
    Tts1,
}

impl ModelKind {
    /// Parse a model identifier, rejecting anything without a price.
    pub fn parse(model: &str) -> Result<Self, VocalisError> {
        ModelKind::from_str(model)
            .map_err(|_| VocalisError::Validation(format!("unknown model `{model}`")))
    }

    pub fn pricing(self) -> Pricing {
        match self {
            ModelKind::Gpt4oMini => Pricing::PerToken {
                input_per_mtok: 0.15,
                output_per_mtok: 0.60,
            },
            ModelKind::Whisper1 => Pricing::PerAudioMinute {
                per_minute: 0.006,
                words_per_minute: 150.0,
            },
            ModelKind::Tts1 => Pricing::PerCharacter {
                per_mchar: 15.0,
            },
        }
    }
}

/// How a model is billed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pricing {
    /// Both directions priced per million tokens.
    PerToken {
        input_per_mtok: f64,
        output_per_mtok: f64,
    },
    /// `input_tokens` is a word count, converted to minutes of audio.
    PerAudioMinute {
        per_minute: f64,
        words_per_minute: f64,
    },
    /// `output_tokens` is a count of synthesized characters.
    PerCharacter { per_mchar: f64 },
}

/// Cost in USD of one call to `model` with the given usage.
pub fn calculate_cost(model: ModelKind, usage: &TokenUsage) -> f64 {
    match model.pricing() {
        Pricing::PerToken {
            input_per_mtok,
            output_per_mtok,
        } => {
            (usage.input_tokens as f64 / 1_000_000.0) * input_per_mtok
                + (usage.output_tokens as f64 / 1_000_000.0) * output_per_mtok
        }
        Pricing::PerAudioMinute {
            per_minute,
            words_per_minute,
        } => (usage.input_tokens as f64 / words_per_minute) * per_minute,
        Pricing::PerCharacter { per_mchar } => {
            (usage.output_tokens as f64 / 1_000_000.0) * per_mchar
        }
    }
}
