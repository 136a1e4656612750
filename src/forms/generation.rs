//! Multipart form submitted to `POST /api/generate`.

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};

use crate::domain::types::{PROMPT_MAX_LEN, Prompt, Style, TypeConstraintError};
use crate::forms::FormError;

#[derive(MultipartForm)]
pub struct GenerateForm {
    pub prompt: Option<Text<String>>,
    pub style: Option<Text<String>>,
    /// Optional reference image.
    #[multipart(limit = "10MB")]
    pub image: Option<TempFile>,
}

/// Validated generation request.
pub struct GeneratePayload {
    pub prompt: Prompt,
    pub style: Style,
    pub image: Option<TempFile>,
}

fn style_error() -> FormError {
    let expected = Style::ALL.map(Style::as_str).join(", ");
    FormError::Validation(format!("Invalid style. Expected one of: {expected}"))
}

impl GeneratePayload {
    pub fn new(
        prompt: Option<String>,
        style: Option<String>,
        image: Option<TempFile>,
    ) -> Result<Self, FormError> {
        let prompt = Prompt::new(prompt.unwrap_or_default()).map_err(|err| match err {
            TypeConstraintError::InvalidLength { .. } => FormError::Validation(format!(
                "Prompt must be at most {PROMPT_MAX_LEN} characters"
            )),
            _ => FormError::Validation("Prompt is required".to_string()),
        })?;

        let style = style
            .as_deref()
            .ok_or_else(style_error)?
            .parse::<Style>()
            .map_err(|_| style_error())?;

        // Browsers submit an empty part when no file was chosen.
        let image = image.filter(|file| {
            file.size > 0 || file.file_name.as_deref().is_some_and(|name| !name.is_empty())
        });

        Ok(Self {
            prompt,
            style,
            image,
        })
    }
}

impl TryFrom<GenerateForm> for GeneratePayload {
    type Error = FormError;

    fn try_from(form: GenerateForm) -> Result<Self, Self::Error> {
        Self::new(
            form.prompt.map(Text::into_inner),
            form.style.map(Text::into_inner),
            form.image,
        )
    }
}
