//! LLM interaction: provider resolution, image transcription, text polish.
//!
//! This module is intentionally thin: all prompt engineering lives in
//! [`crate::prompts`] so it can be changed without touching the call and
//! error-handling logic here. Calls are single-attempt: a failing call
//! surfaces at the call site, and the vision engines decide per page/slide
//! whether to degrade or abort.

use crate::config::LlmOptions;
use crate::error::Doc2MdError;
use crate::postprocess;
use crate::prompts;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::debug;

const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Build one named provider backed by the given model.
fn create_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, Doc2MdError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        Doc2MdError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Pick an LLM provider, most-specific source first.
///
/// The fallback chain lets library users and CLI users each set exactly as
/// much as they need:
///
/// 1. **Named provider** (`options.provider`) — the caller named a provider
///    (e.g. `"openai"`) and optional model; the factory reads the
///    corresponding API key (`OPENAI_API_KEY`, etc.) from the environment.
///
/// 2. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`) —
///    both set means the execution environment (Makefile, shell script, CI)
///    chose for us. Checked before full auto-detection so the model choice
///    is honoured even when multiple API keys are present.
///
/// 3. **Full auto-detection** (`ProviderFactory::from_env`) — with an
///    OpenAI-first preference when `OPENAI_API_KEY` is present, so users
///    holding several keys get a deterministic default.
pub(crate) async fn resolve_provider(
    options: &LlmOptions,
) -> Result<Arc<dyn LLMProvider>, Doc2MdError> {
    if let Some(ref name) = options.provider {
        let model = options.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = options.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| Doc2MdError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider detected in the environment.\n\
                Set OPENAI_API_KEY or ANTHROPIC_API_KEY, or name a provider explicitly.\n\
                Detail: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

/// Build `CompletionOptions` from the LLM options.
fn build_options(options: &LlmOptions) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(options.temperature),
        max_tokens: Some(options.max_tokens),
        ..Default::default()
    }
}

/// Send one image to the vision model and return its raw Markdown response.
///
/// ## Message layout
///
/// 1. **System message** — the transcription rules for the unit (page or
///    slide) being converted.
/// 2. **User message** — the PNG as a base64 attachment plus a short text
///    (the slide label, or empty for PDF pages; vision APIs require a user
///    turn, but the image carries the content).
pub(crate) async fn transcribe_image(
    provider: &Arc<dyn LLMProvider>,
    system_prompt: &str,
    user_text: &str,
    image: ImageData,
    options: &LlmOptions,
) -> Result<String, Doc2MdError> {
    let messages = vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user_with_images(user_text, vec![image]),
    ];

    let completion = build_options(options);
    let response = provider
        .chat(&messages, Some(&completion))
        .await
        .map_err(|e| Doc2MdError::LlmApiError {
            message: format!("{}", e),
        })?;

    debug!(
        input_tokens = response.prompt_tokens,
        output_tokens = response.completion_tokens,
        "Vision call complete"
    );

    Ok(response.content)
}

/// Polish assembled Markdown with the configured text model.
///
/// Returns the polished text, or an error when no provider is configured
/// or the call fails; the caller decides whether to fall back to the
/// unpolished input. Empty input is returned unchanged without a call.
pub async fn polish(markdown: &str, options: &LlmOptions) -> Result<String, Doc2MdError> {
    if markdown.trim().is_empty() {
        return Ok(markdown.to_string());
    }

    let provider = resolve_provider(options).await?;

    let messages = vec![
        ChatMessage::system(prompts::POLISH_PROMPT),
        ChatMessage::user(markdown),
    ];

    let completion = build_options(options);
    let response = provider
        .chat(&messages, Some(&completion))
        .await
        .map_err(|e| Doc2MdError::LlmApiError {
            message: format!("{}", e),
        })?;

    debug!(
        input_tokens = response.prompt_tokens,
        output_tokens = response.completion_tokens,
        "Polish call complete"
    );

    Ok(postprocess::clean_vlm_markdown(&response.content))
}
