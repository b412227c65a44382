//! Stable Diffusion generation parameter parsing
//!
//! The WebUI embeds a semi-structured text blob under the `parameters`
//! keyword of its PNG outputs, e.g.:
//!
//! ```text
//! a cat sitting on a fence
//! Negative prompt: lowres, bad anatomy
//! Steps: 28, Sampler: Euler a, CFG scale: 7.5, Seed: 3417284307, Size: 512x768, Model hash: 84d80299, Model: deliberate_v2
//! ```
//!
//! There is no real grammar: fields are recognized by a fixed, ordered set
//! of anchor substrings, and a field's value is the span between its anchor
//! and the next expected anchor. The "Negative prompt:", "Face restoration:"
//! and hires sections are optional and shift which anchor terminates the
//! preceding field. A record is all-or-nothing: if a required anchor is
//! absent the whole blob is rejected as malformed.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Anchor substrings, in payload order.
///
/// The prompt-section anchors carry a leading newline because prompts are
/// free text and may legitimately contain "Steps:" mid-line; the remaining
/// anchors live on the comma-separated settings line and are unambiguous.
mod anchor {
    pub const NEGATIVE_PROMPT: &str = "\nNegative prompt:";
    pub const STEPS: &str = "\nSteps:";
    pub const SAMPLER: &str = "Sampler:";
    pub const CFG_SCALE: &str = "CFG scale:";
    pub const SEED: &str = "Seed:";
    pub const FACE_RESTORATION: &str = "Face restoration:";
    pub const SIZE: &str = "Size:";
    pub const MODEL_HASH: &str = "Model hash:";
    pub const MODEL: &str = "Model:";
    pub const DENOISING_STRENGTH: &str = "Denoising strength:";
    pub const HIRES_UPSCALE: &str = "Hires upscale:";
    pub const HIRES_STEPS: &str = "Hires steps:";
    pub const HIRES_UPSCALER: &str = "Hires upscaler:";
}

/// Why a metadata blob could not be turned into an [`ImageRecord`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The image carries no `parameters` payload at all
    #[error("no generation parameters found")]
    MissingMetadata,

    /// A payload exists but does not follow the expected anchor ordering
    #[error("broken generation parameters: {0}")]
    MalformedMetadata(String),
}

impl ParseError {
    fn missing_anchor(anchor: &str) -> Self {
        ParseError::MalformedMetadata(format!("missing '{}' marker", anchor.trim_start()))
    }

    fn bad_number(anchor: &str, value: &str) -> Self {
        ParseError::MalformedMetadata(format!(
            "'{}' value '{}' is not a number",
            anchor.trim_start(),
            value
        ))
    }
}

/// Structured result of a successful parse.
///
/// Optional fields mirror the optional sections of the payload and are
/// omitted from the persisted JSON when absent. The hires fields are
/// populated together or not at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub prompt: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,

    pub steps: u32,
    pub sampler: String,
    pub cfg_scale: f64,
    pub seed: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_restoration: Option<String>,

    pub size: String,
    pub model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denoising_strength: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hires_upscale: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hires_steps: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hires_upscaler: Option<String>,
}

impl ImageRecord {
    /// All present field values in string form, for substring matching.
    pub fn field_values(&self) -> Vec<String> {
        let mut values = vec![self.prompt.clone()];
        if let Some(neg) = &self.negative_prompt {
            values.push(neg.clone());
        }
        values.push(self.steps.to_string());
        values.push(self.sampler.clone());
        values.push(self.cfg_scale.to_string());
        values.push(self.seed.to_string());
        if let Some(face) = &self.face_restoration {
            values.push(face.clone());
        }
        values.push(self.size.clone());
        values.push(self.model.clone());
        if let Some(denoise) = self.denoising_strength {
            values.push(denoise.to_string());
        }
        if let Some(upscale) = self.hires_upscale {
            values.push(upscale.to_string());
        }
        if let Some(steps) = self.hires_steps {
            values.push(steps.to_string());
        }
        if let Some(upscaler) = &self.hires_upscaler {
            values.push(upscaler.clone());
        }
        values
    }

    /// Whether the hires-fix section was present in the source payload
    pub fn has_hires(&self) -> bool {
        self.hires_upscaler.is_some()
    }
}

/// Persisted error marker for a file that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexError {
    pub error: String,
}

impl IndexError {
    /// Marker for a file the reader could not open or decode
    pub fn unreadable(detail: impl std::fmt::Display) -> Self {
        IndexError {
            error: format!("unreadable file: {}", detail),
        }
    }
}

impl From<ParseError> for IndexError {
    fn from(err: ParseError) -> Self {
        IndexError {
            error: err.to_string(),
        }
    }
}

/// Outcome stored in the index for one file: a parsed record or an error
/// marker. Serializes untagged so the persisted document holds either the
/// record's fields or `{ "error": "<message>" }` directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParseOutcome {
    Record(ImageRecord),
    Error(IndexError),
}

impl ParseOutcome {
    pub fn record(&self) -> Option<&ImageRecord> {
        match self {
            ParseOutcome::Record(record) => Some(record),
            ParseOutcome::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&IndexError> {
        match self {
            ParseOutcome::Record(_) => None,
            ParseOutcome::Error(err) => Some(err),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ParseOutcome::Error(_))
    }
}

/// Anchor-delimited view over one raw payload
struct Payload<'a> {
    text: &'a str,
}

impl<'a> Payload<'a> {
    fn contains(&self, anchor: &str) -> bool {
        self.text.contains(anchor)
    }

    /// Text before the first occurrence of `until` (the prompt section)
    fn leading(&self, until: &'static str) -> Result<&'a str, ParseError> {
        let end = self
            .text
            .find(until)
            .ok_or_else(|| ParseError::missing_anchor(until))?;
        Ok(clean(&self.text[..end]))
    }

    /// Value between `anchor` and the earliest of the `until` anchors.
    ///
    /// Earlier entries in `until` are optional terminators; the last one is
    /// required, so its name goes into the error when none is found.
    fn field(&self, anchor: &'static str, until: &[&'static str]) -> Result<&'a str, ParseError> {
        let rest = self.after(anchor)?;
        let end = until
            .iter()
            .filter_map(|a| rest.find(a))
            .min()
            .ok_or_else(|| ParseError::missing_anchor(until[until.len() - 1]))?;
        Ok(clean(&rest[..end]))
    }

    /// Value from `anchor` to the end of the payload
    fn field_to_end(&self, anchor: &'static str) -> Result<&'a str, ParseError> {
        self.after(anchor).map(clean)
    }

    fn after(&self, anchor: &'static str) -> Result<&'a str, ParseError> {
        let start = self
            .text
            .find(anchor)
            .ok_or_else(|| ParseError::missing_anchor(anchor))?;
        Ok(&self.text[start + anchor.len()..])
    }
}

/// Strip the separator residue around an extracted span: surrounding
/// whitespace plus the single comma that precedes the next anchor. Only
/// one comma is separator; any further trailing commas belong to the value.
fn clean(span: &str) -> &str {
    let span = span.trim();
    match span.strip_suffix(',') {
        Some(stripped) => stripped.trim_end(),
        None => span,
    }
}

fn parse_number<T: FromStr>(anchor: &'static str, value: &str) -> Result<T, ParseError> {
    value
        .parse()
        .map_err(|_| ParseError::bad_number(anchor, value))
}

/// Parse one raw `parameters` blob into a structured record.
///
/// Pure function: no I/O, no panics. Every failure is a typed
/// [`ParseError`]; callers decide how to record it.
pub fn parse_parameters(raw: &str) -> Result<ImageRecord, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::MissingMetadata);
    }

    let payload = Payload { text: raw };

    let (prompt, negative_prompt) = if payload.contains(anchor::NEGATIVE_PROMPT) {
        let prompt = payload.leading(anchor::NEGATIVE_PROMPT)?;
        let negative = payload.field(anchor::NEGATIVE_PROMPT, &[anchor::STEPS])?;
        (prompt, Some(negative.to_string()))
    } else {
        (payload.leading(anchor::STEPS)?, None)
    };

    let steps = parse_number(
        anchor::STEPS,
        payload.field(anchor::STEPS, &[anchor::SAMPLER])?,
    )?;
    let sampler = payload
        .field(anchor::SAMPLER, &[anchor::CFG_SCALE])?
        .to_string();
    let cfg_scale = parse_number(
        anchor::CFG_SCALE,
        payload.field(anchor::CFG_SCALE, &[anchor::SEED])?,
    )?;

    let (seed_text, face_restoration) = if payload.contains(anchor::FACE_RESTORATION) {
        let seed = payload.field(anchor::SEED, &[anchor::FACE_RESTORATION])?;
        let face = payload.field(anchor::FACE_RESTORATION, &[anchor::SIZE])?;
        (seed, Some(face.to_string()))
    } else {
        (payload.field(anchor::SEED, &[anchor::SIZE])?, None)
    };
    let seed = parse_number(anchor::SEED, seed_text)?;

    // "Model hash:" is skipped, never captured; size ends there when the
    // hash is present and directly at "Model:" otherwise.
    let size = payload
        .field(anchor::SIZE, &[anchor::MODEL_HASH, anchor::MODEL])?
        .to_string();

    if payload.contains(anchor::HIRES_UPSCALER) {
        let model = payload
            .field(anchor::MODEL, &[anchor::DENOISING_STRENGTH])?
            .to_string();
        let denoising_strength = parse_number(
            anchor::DENOISING_STRENGTH,
            payload.field(anchor::DENOISING_STRENGTH, &[anchor::HIRES_UPSCALE])?,
        )?;
        let hires_upscale = parse_number(
            anchor::HIRES_UPSCALE,
            payload.field(anchor::HIRES_UPSCALE, &[anchor::HIRES_STEPS])?,
        )?;
        let hires_steps = parse_number(
            anchor::HIRES_STEPS,
            payload.field(anchor::HIRES_STEPS, &[anchor::HIRES_UPSCALER])?,
        )?;
        let hires_upscaler = payload.field_to_end(anchor::HIRES_UPSCALER)?.to_string();

        Ok(ImageRecord {
            prompt: prompt.to_string(),
            negative_prompt,
            steps,
            sampler,
            cfg_scale,
            seed,
            face_restoration,
            size,
            model,
            denoising_strength: Some(denoising_strength),
            hires_upscale: Some(hires_upscale),
            hires_steps: Some(hires_steps),
            hires_upscaler: Some(hires_upscaler),
        })
    } else {
        let model = payload.field_to_end(anchor::MODEL)?.to_string();

        Ok(ImageRecord {
            prompt: prompt.to_string(),
            negative_prompt,
            steps,
            sampler,
            cfg_scale,
            seed,
            face_restoration,
            size,
            model,
            denoising_strength: None,
            hires_upscale: None,
            hires_steps: None,
            hires_upscaler: None,
        })
    }
}
