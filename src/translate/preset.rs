//! Named translation presets and the context-override merge rule.
//!
//! Presets are plain constants. A request picks a base preset (`default`,
//! `fast`, `high_quality`) and optionally a context (`formal`, `casual`) whose
//! sampling fields and prompt replace those of the base.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Decoding parameters plus the instruction prefix sent with every chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationPreset {
    pub max_length: usize,
    pub num_beams: usize,
    pub early_stopping: bool,
    pub temperature: f32,
    pub top_k: Option<usize>,
    pub top_p: Option<f32>,
    pub repetition_penalty: f32,
    pub length_penalty: f32,
    pub no_repeat_ngram_size: usize,
    pub context_prompt: &'static str,
}

impl TranslationPreset {
    const BASE: TranslationPreset = TranslationPreset {
        max_length: 512,
        num_beams: 4,
        early_stopping: true,
        temperature: 1.0,
        top_k: None,
        top_p: None,
        repetition_penalty: 1.0,
        length_penalty: 1.0,
        no_repeat_ngram_size: 3,
        context_prompt: "",
    };

    /// Balanced settings, keeps the source tone.
    pub const DEFAULT: TranslationPreset = TranslationPreset {
        context_prompt: "Translate this text maintaining its original tone:",
        ..Self::BASE
    };

    /// Greedy decoding for low latency.
    pub const FAST: TranslationPreset = TranslationPreset {
        num_beams: 1,
        early_stopping: false,
        context_prompt: "Translate this text quickly:",
        ..Self::BASE
    };

    /// Wide beam and stronger penalties, slower.
    pub const HIGH_QUALITY: TranslationPreset = TranslationPreset {
        num_beams: 8,
        temperature: 0.7,
        top_k: Some(50),
        top_p: Some(0.95),
        repetition_penalty: 1.2,
        length_penalty: 1.2,
        context_prompt: "Translate this text with high accuracy and natural flow:",
        ..Self::BASE
    };

    pub const FORMAL: TranslationPreset = TranslationPreset {
        num_beams: 6,
        temperature: 0.8,
        top_k: Some(40),
        top_p: Some(0.9),
        repetition_penalty: 1.1,
        context_prompt: "Translate this text into formal and professional English:",
        ..Self::BASE
    };

    pub const CASUAL: TranslationPreset = TranslationPreset {
        temperature: 1.2,
        top_k: Some(50),
        top_p: Some(0.95),
        repetition_penalty: 1.0,
        context_prompt: "Translate this text into casual, conversational English:",
        ..Self::BASE
    };

    /// Prefix `chunk` with the instruction prompt, if the preset has one.
    pub fn build_prompt(&self, chunk: &str) -> String {
        if self.context_prompt.is_empty() {
            chunk.to_string()
        } else {
            format!("{}\n{}", self.context_prompt, chunk)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresetError {
    #[error("Invalid config. Must be one of: {names}", names = PresetName::ALL_NAMES.join(", "))]
    UnknownPreset(String),
    #[error("Invalid context. Must be one of: {names}", names = ContextName::ALL_NAMES.join(", "))]
    UnknownContext(String),
}

/// Base presets a request may select with `config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PresetName {
    #[default]
    Default,
    Fast,
    HighQuality,
}

impl PresetName {
    pub const ALL: [PresetName; 3] = [PresetName::Default, PresetName::Fast, PresetName::HighQuality];
    pub const ALL_NAMES: [&'static str; 3] = ["default", "fast", "high_quality"];

    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::Default => "default",
            PresetName::Fast => "fast",
            PresetName::HighQuality => "high_quality",
        }
    }

    pub fn preset(&self) -> &'static TranslationPreset {
        match self {
            PresetName::Default => &TranslationPreset::DEFAULT,
            PresetName::Fast => &TranslationPreset::FAST,
            PresetName::HighQuality => &TranslationPreset::HIGH_QUALITY,
        }
    }
}

impl FromStr for PresetName {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(PresetName::Default),
            "fast" => Ok(PresetName::Fast),
            "high_quality" => Ok(PresetName::HighQuality),
            other => Err(PresetError::UnknownPreset(other.to_string())),
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tone override applied on top of the base preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContextName {
    #[default]
    Auto,
    Formal,
    Casual,
}

impl ContextName {
    pub const ALL_NAMES: [&'static str; 3] = ["auto", "formal", "casual"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContextName::Auto => "auto",
            ContextName::Formal => "formal",
            ContextName::Casual => "casual",
        }
    }

    /// The override carried by this context; `auto` carries none.
    pub fn context_override(&self) -> Option<ContextOverride> {
        match self {
            ContextName::Auto => None,
            ContextName::Formal => Some(ContextOverride::from_preset(&TranslationPreset::FORMAL)),
            ContextName::Casual => Some(ContextOverride::from_preset(&TranslationPreset::CASUAL)),
        }
    }
}

impl FromStr for ContextName {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ContextName::Auto),
            "formal" => Ok(ContextName::Formal),
            "casual" => Ok(ContextName::Casual),
            other => Err(PresetError::UnknownContext(other.to_string())),
        }
    }
}

impl fmt::Display for ContextName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fields a context is allowed to replace. Everything else stays with the base.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextOverride {
    pub temperature: f32,
    pub top_k: Option<usize>,
    pub top_p: Option<f32>,
    pub repetition_penalty: f32,
    pub context_prompt: &'static str,
}

impl ContextOverride {
    pub fn from_preset(preset: &TranslationPreset) -> Self {
        Self {
            temperature: preset.temperature,
            top_k: preset.top_k,
            top_p: preset.top_p,
            repetition_penalty: preset.repetition_penalty,
            context_prompt: preset.context_prompt,
        }
    }

    /// Field-level replacement; no blending.
    pub fn apply(&self, base: &TranslationPreset) -> TranslationPreset {
        TranslationPreset {
            temperature: self.temperature,
            top_k: self.top_k,
            top_p: self.top_p,
            repetition_penalty: self.repetition_penalty,
            context_prompt: self.context_prompt,
            ..base.clone()
        }
    }
}

/// Merge a context into a base preset.
pub fn merge(base: &TranslationPreset, context: ContextName) -> TranslationPreset {
    match context.context_override() {
        Some(ctx) => ctx.apply(base),
        None => base.clone(),
    }
}
