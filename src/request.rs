use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;

use crate::catalog::{self, RANDOM_STYLE_ID};
use crate::models::{GenerationMode, HairstyleOption, Language};
use crate::upload::EncodedImage;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum Rejected {
    #[error("no hairstyle selected")]
    NoStyleSelected,
    #[error("unknown hairstyle '{0}'")]
    UnknownStyle(String),
    #[error("custom description is blank")]
    BlankPrompt,
    #[error("no reference image loaded")]
    NoReferenceImage,
}

/// Everything the user has picked so far, across all three modes. Switching
/// mode keeps the other modes' inputs.
#[derive(Debug, Clone, Default)]
pub struct StyleSelection {
    pub mode: GenerationMode,
    pub selected_style_id: Option<String>,
    /// Random option shown to the user since they last pressed "random".
    pub random_style: Option<HairstyleOption>,
    pub custom_prompt: String,
    pub reference_image: Option<EncodedImage>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Preset { prompt: String },
    FreeText { prompt: String },
    Reference { image: EncodedImage },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub payload: Payload,
    pub style_id: String,
    pub label: String,
    pub description: String,
}

impl GenerationRequest {
    /// Style text for the provider; empty for reference transfers.
    pub fn prompt(&self) -> &str {
        match &self.payload {
            Payload::Preset { prompt } | Payload::FreeText { prompt } => prompt,
            Payload::Reference { .. } => "",
        }
    }

    pub fn reference(&self) -> Option<&EncodedImage> {
        match &self.payload {
            Payload::Reference { image } => Some(image),
            _ => None,
        }
    }
}

/// The disabled check: fails exactly when [`build`] would.
pub fn validate(selection: &StyleSelection) -> Result<(), Rejected> {
    match selection.mode {
        GenerationMode::Preset => match selection.selected_style_id.as_deref() {
            None => Err(Rejected::NoStyleSelected),
            Some(RANDOM_STYLE_ID) => Ok(()),
            Some(id) if catalog::find_option(id).is_some() => Ok(()),
            Some(id) => Err(Rejected::UnknownStyle(id.to_string())),
        },
        GenerationMode::Custom if selection.custom_prompt.trim().is_empty() => Err(Rejected::BlankPrompt),
        GenerationMode::Custom => Ok(()),
        GenerationMode::Reference if selection.reference_image.is_none() => Err(Rejected::NoReferenceImage),
        GenerationMode::Reference => Ok(()),
    }
}

pub fn build<R: Rng + ?Sized>(
    selection: &StyleSelection,
    language: Language,
    issued_at: DateTime<Utc>,
    rng: &mut R,
) -> Result<GenerationRequest, Rejected> {
    validate(selection)?;
    let millis = issued_at.timestamp_millis();

    let request = match selection.mode {
        GenerationMode::Preset => {
            let option = match selection.selected_style_id.as_deref() {
                Some(RANDOM_STYLE_ID) => selection
                    .random_style
                    .clone()
                    .unwrap_or_else(|| catalog::random_style(rng)),
                Some(id) => catalog::find_option(id)
                    .cloned()
                    .ok_or_else(|| Rejected::UnknownStyle(id.to_string()))?,
                None => return Err(Rejected::NoStyleSelected),
            };
            GenerationRequest {
                label: option.label.get(language).to_string(),
                description: option.description.get(language).to_string(),
                style_id: option.id,
                payload: Payload::Preset { prompt: option.prompt },
            }
        }
        GenerationMode::Custom => GenerationRequest {
            payload: Payload::FreeText { prompt: selection.custom_prompt.clone() },
            style_id: format!("custom-{}", millis),
            label: catalog::custom_label(language).to_string(),
            description: selection.custom_prompt.clone(),
        },
        GenerationMode::Reference => {
            let image = selection.reference_image.clone().ok_or(Rejected::NoReferenceImage)?;
            GenerationRequest {
                payload: Payload::Reference { image },
                style_id: format!("ref-{}", millis),
                label: catalog::reference_label(language).to_string(),
                description: catalog::REFERENCE_DESCRIPTION.to_string(),
            }
        }
    };
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn at() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(1_700_000_000_123).unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn reference() -> EncodedImage {
        EncodedImage { mime_type: "image/png", data: "REF".into() }
    }

    #[test]
    fn rejects_iff_required_field_missing() {
        let cases: Vec<(StyleSelection, bool)> = vec![
            (StyleSelection { mode: GenerationMode::Preset, ..Default::default() }, false),
            (StyleSelection { mode: GenerationMode::Preset, selected_style_id: Some("short-bob".into()), ..Default::default() }, true),
            (StyleSelection { mode: GenerationMode::Preset, selected_style_id: Some(RANDOM_STYLE_ID.into()), ..Default::default() }, true),
            (StyleSelection { mode: GenerationMode::Preset, selected_style_id: Some("no-such-style".into()), ..Default::default() }, false),
            (StyleSelection { mode: GenerationMode::Custom, custom_prompt: "".into(), ..Default::default() }, false),
            (StyleSelection { mode: GenerationMode::Custom, custom_prompt: " \t\n".into(), ..Default::default() }, false),
            (StyleSelection { mode: GenerationMode::Custom, custom_prompt: "mohawk".into(), ..Default::default() }, true),
            (StyleSelection { mode: GenerationMode::Reference, ..Default::default() }, false),
            (StyleSelection { mode: GenerationMode::Reference, reference_image: Some(reference()), ..Default::default() }, true),
            // inputs belonging to other modes do not count
            (StyleSelection { mode: GenerationMode::Reference, custom_prompt: "mohawk".into(), selected_style_id: Some("short-bob".into()), ..Default::default() }, false),
        ];

        for (selection, well_formed) in cases {
            let built = build(&selection, Language::En, at(), &mut rng());
            assert_eq!(built.is_ok(), well_formed, "{:?}", selection);
            assert_eq!(validate(&selection).is_ok(), well_formed, "{:?}", selection);
        }
    }

    #[test]
    fn preset_uses_localized_catalog_fields() {
        let selection = StyleSelection { selected_style_id: Some("short-bob".into()), ..Default::default() };
        let req = build(&selection, Language::Zh, at(), &mut rng()).unwrap();
        let bob = catalog::find_option("short-bob").unwrap();
        assert_eq!(req.style_id, "short-bob");
        assert_eq!(req.label, bob.label.zh);
        assert_eq!(req.description, bob.description.zh);
        assert_eq!(req.prompt(), bob.prompt);
        assert_eq!(req.reference(), None);
    }

    #[test]
    fn random_sentinel_prefers_pinned_option() {
        let pinned = catalog::random_style(&mut StdRng::seed_from_u64(1));
        let selection = StyleSelection {
            selected_style_id: Some(RANDOM_STYLE_ID.into()),
            random_style: Some(pinned.clone()),
            ..Default::default()
        };
        let req = build(&selection, Language::En, at(), &mut rng()).unwrap();
        assert_eq!(req.style_id, RANDOM_STYLE_ID);
        assert_eq!(req.prompt(), pinned.prompt);
        assert_eq!(req.label, pinned.label.en);
    }

    #[test]
    fn random_sentinel_without_pin_synthesizes() {
        let selection = StyleSelection { selected_style_id: Some(RANDOM_STYLE_ID.into()), ..Default::default() };
        let req = build(&selection, Language::En, at(), &mut rng()).unwrap();
        assert_eq!(req.style_id, RANDOM_STYLE_ID);
        assert!(req.prompt().ends_with(" hairstyle"));
    }

    #[test]
    fn custom_text_is_prompt_and_description() {
        let selection = StyleSelection {
            mode: GenerationMode::Custom,
            custom_prompt: "a long curly red ponytail".into(),
            ..Default::default()
        };
        let req = build(&selection, Language::En, at(), &mut rng()).unwrap();
        assert_eq!(req.payload, Payload::FreeText { prompt: "a long curly red ponytail".into() });
        assert_eq!(req.description, "a long curly red ponytail");
        assert_eq!(req.label, "Custom");
        assert_eq!(req.style_id, "custom-1700000000123");
    }

    #[test]
    fn reference_has_empty_prompt_and_fixed_note() {
        let selection = StyleSelection {
            mode: GenerationMode::Reference,
            reference_image: Some(reference()),
            custom_prompt: "ignored".into(),
            ..Default::default()
        };
        let req = build(&selection, Language::Zh, at(), &mut rng()).unwrap();
        assert_eq!(req.prompt(), "");
        assert_eq!(req.reference(), Some(&reference()));
        assert_eq!(req.label, "参考图");
        assert_eq!(req.description, catalog::REFERENCE_DESCRIPTION);
        assert_eq!(req.style_id, "ref-1700000000123");
    }
}
