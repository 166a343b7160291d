//! Script builder - Turns extracted newsletter text into a spoken script
//!
//! Two strategies are selected by configuration: remote generation through an
//! [`InferencePort`], and a local template heuristic. Remote failures fall back
//! to the local heuristic, and a framed echo of the raw content backs both, so
//! [`ScriptBuilder::build`] never fails and never returns an empty script.

use std::{fmt, sync::Arc};

use chrono::NaiveDate;
use domain::{ExtractedContent, NewsletterProfile, PodcastScript, ScriptOrigin, count_words};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{
    ports::{Article, InferencePort},
    services::elaboration::ElaborationTable,
};

/// Which strategy to try first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStrategy {
    /// Hosted language model, local heuristic on failure
    #[default]
    Remote,
    /// Local heuristic only
    Local,
}

/// Default system prompt for remote generation
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a professional podcast script writer. \
Turn newsletter content into an engaging, conversational script meant to be read aloud. \
Write plain spoken prose: no headings, bullet points, markdown, URLs or stage directions.";

/// Builder settings
#[derive(Debug, Clone)]
pub struct ScriptBuilderConfig {
    /// Strategy to try first
    pub strategy: ScriptStrategy,
    /// System prompt for remote generation
    pub system_prompt: String,
    /// Characters of newsletter content included in the remote prompt
    pub prompt_content_chars: usize,
    /// Word target communicated to the remote model
    pub target_words: usize,
    /// Upper bound on words taken from the newsletter by the local heuristic
    pub max_body_words: usize,
    /// Words taken from each linked article by the local heuristic
    pub article_words: usize,
    /// Remote scripts or local bodies with fewer words count as insufficient
    pub min_content_words: usize,
    /// Characters echoed by the last-resort fallback
    pub fallback_chars: usize,
}

impl Default for ScriptBuilderConfig {
    fn default() -> Self {
        Self {
            strategy: ScriptStrategy::Remote,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            prompt_content_chars: 3000,
            target_words: 450,
            max_body_words: 600,
            article_words: 150,
            min_content_words: 20,
            fallback_chars: 1200,
        }
    }
}

/// Everything the builder needs about one newsletter issue
#[derive(Debug, Clone, Copy)]
pub struct ScriptRequest<'a> {
    /// Profile the issue belongs to
    pub profile: &'a NewsletterProfile,
    /// Decoded subject line
    pub subject: &'a str,
    /// Sender address
    pub sender: &'a str,
    /// Date used in intro/outro templates
    pub date: NaiveDate,
    /// Extracted newsletter text
    pub content: &'a ExtractedContent,
    /// Linked articles, best first
    pub articles: &'a [Article],
}

/// Produces podcast scripts
pub struct ScriptBuilder {
    inference: Option<Arc<dyn InferencePort>>,
    elaborations: ElaborationTable,
    config: ScriptBuilderConfig,
}

impl fmt::Debug for ScriptBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptBuilder")
            .field("has_inference", &self.inference.is_some())
            .field("elaborations", &self.elaborations.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ScriptBuilder {
    /// Create a builder that only uses the local heuristic
    pub fn new(config: ScriptBuilderConfig) -> Self {
        Self {
            inference: None,
            elaborations: ElaborationTable::default(),
            config,
        }
    }

    /// Attach a remote generation backend
    #[must_use]
    pub fn with_inference(mut self, inference: Arc<dyn InferencePort>) -> Self {
        self.inference = Some(inference);
        self
    }

    /// Use an elaboration table in the local heuristic
    #[must_use]
    pub fn with_elaborations(mut self, elaborations: ElaborationTable) -> Self {
        self.elaborations = elaborations;
        self
    }

    /// Builder configuration
    pub const fn config(&self) -> &ScriptBuilderConfig {
        &self.config
    }

    /// Build a script; never fails, never empty
    #[instrument(skip(self, request), fields(profile = %request.profile.name))]
    pub async fn build(&self, request: ScriptRequest<'_>) -> PodcastScript {
        if self.config.strategy == ScriptStrategy::Remote {
            if let Some(script) = self.try_remote(&request).await {
                return script;
            }
        }

        if let Some(text) = self.build_local(&request) {
            debug!("Built script with local heuristic");
            return PodcastScript::new(text, ScriptOrigin::Local);
        }

        warn!("⚠️ Local heuristic produced too little text, echoing raw content");
        PodcastScript::new(self.build_fallback(&request), ScriptOrigin::Fallback)
    }

    async fn try_remote(&self, request: &ScriptRequest<'_>) -> Option<PodcastScript> {
        let Some(inference) = self.inference.as_ref().filter(|i| i.is_configured()) else {
            debug!("Remote generation not configured, using local heuristic");
            return None;
        };
        if request.content.is_empty() && request.articles.is_empty() {
            debug!("Nothing to send for remote generation");
            return None;
        }

        let prompt = self.remote_prompt(request);
        match inference
            .generate_with_system(&self.config.system_prompt, &prompt)
            .await
        {
            Ok(result) => {
                let text = result.content.trim();
                if count_words(text) < self.config.min_content_words {
                    warn!(
                        model = %result.model,
                        words = count_words(text),
                        "⚠️ Remote script too short, using local heuristic"
                    );
                    return None;
                }
                info!(
                    model = %result.model,
                    latency_ms = result.latency_ms,
                    "🤖 Generated script remotely"
                );
                Some(PodcastScript::new(text, ScriptOrigin::Remote {
                    model: result.model,
                }))
            },
            Err(e) => {
                warn!(error = %e, "⚠️ Remote generation failed, using local heuristic");
                None
            },
        }
    }

    fn remote_prompt(&self, request: &ScriptRequest<'_>) -> String {
        let style = &request.profile.style;
        let content: String = request
            .content
            .text()
            .chars()
            .take(self.config.prompt_content_chars)
            .collect();

        let mut prompt = format!(
            "Create a podcast script for the newsletter \"{}\".\n\n\
             Subject: {}\nFrom: {}\n\n\
             Open with: {}\nClose with: {}\n\
             Keep it to roughly {} words.\n\n\
             Newsletter content:\n{}\n",
            display_name(&request.profile.name),
            request.subject,
            request.sender,
            render(&style.intro_text, request),
            render(&style.outro_text, request),
            self.config.target_words,
            content,
        );

        if !request.articles.is_empty() {
            prompt.push_str("\nFull stories behind the headlines:\n");
            for article in request.articles {
                prompt.push_str(&format!(
                    "- {} ({}): {}\n",
                    article.title,
                    article.domain,
                    take_words(&article.content, self.config.article_words)
                ));
            }
        }
        prompt
    }

    /// Local heuristic: first paragraphs above the length threshold (or first
    /// sentences when every paragraph is short), elaborated from the keyword
    /// table, between the profile's intro and outro
    fn build_local(&self, request: &ScriptRequest<'_>) -> Option<String> {
        let style = &request.profile.style;
        let text = request.content.text();

        let mut segments: Vec<String> = text
            .split("\n\n")
            .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|p| p.chars().count() >= style.min_paragraph_chars)
            .take(style.max_paragraphs)
            .collect();

        if segments.is_empty() {
            let flattened = text.split_whitespace().collect::<Vec<_>>().join(" ");
            let sentences: Vec<&str> = flattened
                .split(". ")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .take(style.max_paragraphs)
                .collect();
            if !sentences.is_empty() {
                let joined = sentences.join(". ");
                segments.push(if joined.ends_with('.') {
                    joined
                } else {
                    format!("{joined}.")
                });
            }
        }

        let mut budget = self.config.max_body_words;
        let mut body = Vec::with_capacity(segments.len());
        for segment in segments {
            if budget == 0 {
                break;
            }
            let words = count_words(&segment);
            let segment = if words > budget {
                format!("{}...", take_words(&segment, budget))
            } else {
                segment
            };
            budget = budget.saturating_sub(words);
            match self.elaborations.elaborate(&segment) {
                Some(extra) => body.push(format!("{segment} {extra}")),
                None => body.push(segment),
            }
        }

        for (i, article) in request.articles.iter().enumerate() {
            if i == 0 {
                body.push("Here are the full stories behind today's headlines.".to_string());
            }
            body.push(format!(
                "Story {}: {}. From {}. {}",
                i + 1,
                article.title.trim_end_matches('.'),
                article.domain,
                take_words(&article.content, self.config.article_words)
            ));
        }

        let body_words: usize = body.iter().map(|p| count_words(p)).sum();
        if body_words < self.config.min_content_words {
            return None;
        }

        let mut script = render(&style.intro_text, request);
        for paragraph in body {
            script.push_str("\n\n");
            script.push_str(&paragraph);
        }
        script.push_str("\n\n");
        script.push_str(&render(&style.outro_text, request));
        Some(script)
    }

    fn build_fallback(&self, request: &ScriptRequest<'_>) -> String {
        let name = display_name(&request.profile.name);
        let prefix: String = request
            .content
            .text()
            .chars()
            .take(self.config.fallback_chars)
            .collect();
        let prefix = prefix.split_whitespace().collect::<Vec<_>>().join(" ");

        if prefix.is_empty() {
            format!(
                "Here is your {name} update. Today's issue, titled \"{}\", \
                 did not contain text we could read aloud. Please check the original email.",
                request.subject
            )
        } else {
            format!("Here is today's {name} newsletter. {prefix} That's all for now.")
        }
    }
}

/// Substitute `{name}`, `{date}`, `{subject}` and `{sender}`
fn render(template: &str, request: &ScriptRequest<'_>) -> String {
    template
        .replace("{name}", &display_name(&request.profile.name))
        .replace("{date}", &request.date.format("%B %-d, %Y").to_string())
        .replace("{subject}", request.subject)
        .replace("{sender}", request.sender)
}

/// `mando_minutes` reads as `mando minutes`
fn display_name(name: &str) -> String {
    name.replace(['_', '-'], " ")
}

fn take_words(text: &str, limit: usize) -> String {
    text.split_whitespace().take(limit).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use domain::{ContentSource, StyleProfile};

    use super::*;
    use crate::{
        error::ApplicationError,
        ports::{InferenceResult, MockInferencePort},
        services::elaboration::ElaborationRule,
    };

    fn profile() -> NewsletterProfile {
        NewsletterProfile::new("mando_minutes")
            .with_sender("news@mandominutes.com")
            .with_subject("Mando Minutes")
    }

    fn paragraph(seed: &str, words: usize) -> String {
        (0..words)
            .map(|i| format!("{seed}{i}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Ten paragraphs of fifty words each
    fn five_hundred_words() -> ExtractedContent {
        let text = (0..10)
            .map(|p| paragraph(&format!("p{p}w"), 50))
            .collect::<Vec<_>>()
            .join("\n\n");
        ExtractedContent::new(text, ContentSource::PlainText)
    }

    fn request<'a>(
        profile: &'a NewsletterProfile,
        content: &'a ExtractedContent,
        articles: &'a [Article],
    ) -> ScriptRequest<'a> {
        ScriptRequest {
            profile,
            subject: "Mando Minutes: 7 July",
            sender: "news@mandominutes.com",
            date: NaiveDate::from_ymd_opt(2025, 7, 7).unwrap(),
            content,
            articles,
        }
    }

    fn local_builder() -> ScriptBuilder {
        ScriptBuilder::new(ScriptBuilderConfig {
            strategy: ScriptStrategy::Local,
            ..ScriptBuilderConfig::default()
        })
    }

    #[tokio::test]
    async fn local_heuristic_keeps_four_paragraphs() {
        let profile = profile();
        let content = five_hundred_words();
        let script = local_builder().build(request(&profile, &content, &[])).await;

        assert_eq!(script.origin(), &ScriptOrigin::Local);
        assert!(script.text().contains("p3w0"));
        assert!(!script.text().contains("p4w0"));
        assert!(script.text().starts_with("Good morning! Welcome to your mando minutes podcast for July 7, 2025."));
        assert!(script.word_count() >= 200 && script.word_count() <= 240);
    }

    #[tokio::test]
    async fn duration_is_derived_from_final_text() {
        let profile = profile();
        let content = five_hundred_words();
        let script = local_builder().build(request(&profile, &content, &[])).await;

        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let expected = ((script.word_count() as f64) / 150.0).round() as u32;
        assert_eq!(script.duration_minutes(), expected.max(1));
    }

    #[tokio::test]
    async fn short_paragraphs_fall_back_to_sentences() {
        let profile = profile();
        let content = ExtractedContent::new(
            "Bitcoin climbed three percent overnight.\n\n\
             Ether held flat near recent levels.\n\n\
             Solana slipped two percent on the day.\n\n\
             Funding rates stayed neutral across venues.\n\n\
             Extra sentence here.",
            ContentSource::PlainText,
        );
        let script = local_builder().build(request(&profile, &content, &[])).await;
        assert_eq!(script.origin(), &ScriptOrigin::Local);
        assert!(script.text().contains(
            "Bitcoin climbed three percent overnight. Ether held flat near recent levels. \
             Solana slipped two percent on the day. Funding rates stayed neutral across venues."
        ));
        assert!(!script.text().contains("Extra sentence"));
    }

    #[tokio::test]
    async fn elaborations_are_appended() {
        let profile = profile();
        let content = ExtractedContent::new(
            paragraph("x", 20) + " whale moved BTC to exchanges after years of dormancy and more",
            ContentSource::PlainText,
        );
        let table = ElaborationTable::new(&[ElaborationRule {
            all: vec!["whale".into(), "btc".into()],
            any: vec![],
            template: "Large transfers often precede volatility.".into(),
        }])
        .unwrap();
        let script = local_builder()
            .with_elaborations(table)
            .build(request(&profile, &content, &[]))
            .await;
        assert!(script.text().contains("dormancy and more Large transfers often precede volatility."));
    }

    #[tokio::test]
    async fn articles_become_story_segments() {
        let profile = profile();
        let content = five_hundred_words();
        let articles = vec![Article {
            url: "https://www.coindesk.com/a".into(),
            title: "ETF flows surge.".into(),
            domain: "coindesk.com".into(),
            content: paragraph("a", 300),
            word_count: 300,
        }];
        let script = local_builder().build(request(&profile, &content, &articles)).await;
        assert!(script.text().contains("Story 1: ETF flows surge. From coindesk.com. a0 a1"));
        assert!(!script.text().contains("a150"));
    }

    #[tokio::test]
    async fn placeholder_key_silently_uses_local() {
        let mut inference = MockInferencePort::new();
        inference.expect_is_configured().return_const(false);
        inference.expect_generate_with_system().never();

        let builder = ScriptBuilder::new(ScriptBuilderConfig::default())
            .with_inference(Arc::new(inference));
        let profile = profile();
        let content = five_hundred_words();
        let script = builder.build(request(&profile, &content, &[])).await;
        assert_eq!(script.origin(), &ScriptOrigin::Local);
    }

    #[tokio::test]
    async fn remote_script_is_used_when_available() {
        let mut inference = MockInferencePort::new();
        inference.expect_is_configured().return_const(true);
        inference
            .expect_generate_with_system()
            .withf(|system, prompt| {
                system.contains("podcast script writer")
                    && prompt.contains("Subject: Mando Minutes: 7 July")
                    && prompt.contains("p0w0")
            })
            .returning(|_, _| {
                Ok(InferenceResult {
                    content: paragraph("spoken", 300),
                    model: "gpt-4o-mini".into(),
                    tokens_used: Some(420),
                    latency_ms: 900,
                })
            });

        let builder = ScriptBuilder::new(ScriptBuilderConfig::default())
            .with_inference(Arc::new(inference));
        let profile = profile();
        let content = five_hundred_words();
        let script = builder.build(request(&profile, &content, &[])).await;

        assert_eq!(script.origin(), &ScriptOrigin::Remote {
            model: "gpt-4o-mini".into()
        });
        assert_eq!(script.word_count(), 300);
        assert_eq!(script.duration_minutes(), 2);
    }

    #[tokio::test]
    async fn remote_failure_falls_back_to_local() {
        let mut inference = MockInferencePort::new();
        inference.expect_is_configured().return_const(true);
        inference
            .expect_generate_with_system()
            .returning(|_, _| Err(ApplicationError::RateLimited));

        let builder = ScriptBuilder::new(ScriptBuilderConfig::default())
            .with_inference(Arc::new(inference));
        let profile = profile();
        let content = five_hundred_words();
        let script = builder.build(request(&profile, &content, &[])).await;
        assert_eq!(script.origin(), &ScriptOrigin::Local);
    }

    #[tokio::test]
    async fn empty_remote_answer_falls_back_to_local() {
        let mut inference = MockInferencePort::new();
        inference.expect_is_configured().return_const(true);
        inference.expect_generate_with_system().returning(|_, _| {
            Ok(InferenceResult {
                content: "  ".into(),
                model: "gpt-4o-mini".into(),
                tokens_used: None,
                latency_ms: 10,
            })
        });

        let builder = ScriptBuilder::new(ScriptBuilderConfig::default())
            .with_inference(Arc::new(inference));
        let profile = profile();
        let content = five_hundred_words();
        let script = builder.build(request(&profile, &content, &[])).await;
        assert_eq!(script.origin(), &ScriptOrigin::Local);
    }

    #[tokio::test]
    async fn empty_content_still_yields_a_script() {
        let profile = profile();
        let content = ExtractedContent::unreadable();
        let script = local_builder().build(request(&profile, &content, &[])).await;

        assert_eq!(script.origin(), &ScriptOrigin::Fallback);
        assert!(script.text().contains("Mando Minutes: 7 July"));
        assert!(script.word_count() > 0);
        assert_eq!(script.duration_minutes(), 1);
    }

    #[tokio::test]
    async fn short_content_is_echoed_with_framing() {
        let profile = profile();
        let content = ExtractedContent::new("GM. Markets quiet.", ContentSource::PlainText);
        let script = local_builder().build(request(&profile, &content, &[])).await;

        assert_eq!(script.origin(), &ScriptOrigin::Fallback);
        assert_eq!(
            script.text(),
            "Here is today's mando minutes newsletter. GM. Markets quiet. That's all for now."
        );
    }

    #[tokio::test]
    async fn custom_style_templates_are_rendered() {
        let profile = profile().with_style(StyleProfile {
            intro_text: "This is {name}, issue {subject}.".into(),
            outro_text: "Sent by {sender}.".into(),
            ..StyleProfile::default()
        });
        let content = five_hundred_words();
        let script = local_builder().build(request(&profile, &content, &[])).await;
        assert!(script.text().starts_with("This is mando minutes, issue Mando Minutes: 7 July."));
        assert!(script.text().ends_with("Sent by news@mandominutes.com."));
    }

    #[test]
    fn debug_does_not_expose_backend() {
        let debug = format!("{:?}", local_builder());
        assert!(debug.contains("ScriptBuilder"));
        assert!(debug.contains("has_inference: false"));
    }
}
