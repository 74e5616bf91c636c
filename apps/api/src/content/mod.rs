// Content-source proxy: turns a `{mode, base64, prompt}` request into a task for
// the text collaborator (image extraction or body drafting) and returns its text.

pub mod handlers;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::LlmError;

pub const MODE_OCR: &str = "ocr";
pub const MODE_GEN_BODY: &str = "genBody";

/// JSON body of `POST /api/v1/content`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentRequest {
    pub mode: Option<String>,
    pub base64: Option<String>,
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentResponse {
    pub content: String,
}

/// A validated unit of work for the collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentTask {
    /// Extract the first-ranked vendor's details from an image as JSON.
    Ocr {
        /// Data URL (`data:image/...;base64,...`) forwarded as-is.
        image_data_url: String,
        prompt: Option<String>,
    },
    /// Draft notice body text from a free-form prompt.
    GenerateBody { prompt: String },
}

impl ContentTask {
    /// Empty strings count as missing.
    pub fn from_request(req: ContentRequest) -> Result<Self, AppError> {
        let present = |v: Option<String>| v.filter(|s| !s.is_empty());

        let mode = present(req.mode).ok_or_else(|| AppError::Validation("mode is required".into()))?;
        match mode.as_str() {
            MODE_OCR => {
                let image_data_url = present(req.base64)
                    .ok_or_else(|| AppError::Validation("base64 is required for ocr".into()))?;
                Ok(ContentTask::Ocr {
                    image_data_url,
                    prompt: present(req.prompt),
                })
            }
            MODE_GEN_BODY => {
                let prompt = present(req.prompt)
                    .ok_or_else(|| AppError::Validation("prompt is required for genBody".into()))?;
                Ok(ContentTask::GenerateBody { prompt })
            }
            _ => Err(AppError::Validation("unsupported mode".into())),
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            ContentTask::Ocr { .. } => MODE_OCR,
            ContentTask::GenerateBody { .. } => MODE_GEN_BODY,
        }
    }
}

/// Anything that can answer a content task with text.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Checked before the request is validated; a source that can never answer
    /// fails every request the same way.
    fn ready(&self) -> Result<(), LlmError> {
        Ok(())
    }

    async fn produce(&self, task: ContentTask) -> Result<String, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(mode: Option<&str>, base64: Option<&str>, prompt: Option<&str>) -> ContentRequest {
        ContentRequest {
            mode: mode.map(String::from),
            base64: base64.map(String::from),
            prompt: prompt.map(String::from),
        }
    }

    fn validation_message(r: ContentRequest) -> String {
        match ContentTask::from_request(r) {
            Err(AppError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_mode() {
        assert_eq!(validation_message(req(None, None, None)), "mode is required");
        assert_eq!(validation_message(req(Some(""), None, None)), "mode is required");
    }

    #[test]
    fn test_ocr_requires_image() {
        assert_eq!(
            validation_message(req(Some("ocr"), None, Some("p"))),
            "base64 is required for ocr"
        );
        let task = ContentTask::from_request(req(Some("ocr"), Some("data:x"), None)).unwrap();
        assert_eq!(
            task,
            ContentTask::Ocr {
                image_data_url: "data:x".into(),
                prompt: None
            }
        );
    }

    #[test]
    fn test_gen_body_requires_prompt() {
        assert_eq!(
            validation_message(req(Some("genBody"), Some("data:x"), None)),
            "prompt is required for genBody"
        );
        let task = ContentTask::from_request(req(Some("genBody"), None, Some("공지"))).unwrap();
        assert_eq!(task.mode(), "genBody");
    }

    #[test]
    fn test_unknown_mode() {
        assert_eq!(validation_message(req(Some("summarize"), None, None)), "unsupported mode");
    }
}
