//! Crew orchestration: runs the tasks of a [`Crew`] in order.
//!
//! The engine never touches process-wide output. Whoever calls
//! [`Orchestrator::kickoff`] hands in the writer that progress text goes
//! to, and gets the final markdown back.

use std::io::Write;

use async_trait::async_trait;

use crate::crew::Crew;
use crate::error::EngineError;
use crate::llm::CompletionModel;
use crate::markdown;
use crate::output;
use crate::topic::Topic;

/// The markdown document a successful run produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalArtifact {
    markdown: String,
}

impl FinalArtifact {
    pub fn new(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
        }
    }

    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    /// Formatted preview of the post.
    pub fn preview_html(&self) -> String {
        markdown::render_preview(&self.markdown)
    }

    /// The raw markdown, as an escaped code block.
    pub fn raw_html(&self) -> String {
        markdown::raw_view(&self.markdown)
    }

    pub fn into_markdown(self) -> String {
        self.markdown
    }
}

/// Executes a crew for one topic.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Run every task of `crew` in order, writing progress text to `out`.
    async fn kickoff(
        &self,
        crew: &Crew,
        topic: &Topic,
        out: &mut (dyn Write + Send),
    ) -> Result<FinalArtifact, EngineError>;

    /// Name shown on the health endpoint.
    fn name(&self) -> &str;
}

/// Sequential engine: one completion per task, each task seeing the
/// previous task's answer as context. The last answer is the post.
pub struct LlmCrew<M> {
    model: M,
}

impl<M: CompletionModel> LlmCrew<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

#[async_trait]
impl<M: CompletionModel> Orchestrator for LlmCrew<M> {
    async fn kickoff(
        &self,
        crew: &Crew,
        topic: &Topic,
        out: &mut (dyn Write + Send),
    ) -> Result<FinalArtifact, EngineError> {
        output::crew_started(out, topic, crew.tasks().len())?;
        tracing::info!(
            %topic,
            model = self.model.model(),
            agents = crew.agents().len(),
            tasks = crew.tasks().len(),
            "Crew kickoff"
        );

        let mut context: Option<String> = None;
        for task in crew.tasks() {
            output::agent_started(out, task, topic)?;
            output::status(out, &task.agent, "🧠", "Thinking...")?;
            tracing::info!(task = task.name, agent = task.agent.role, "Task started");

            let system = task.agent.system_prompt(topic);
            let prompt = task.prompt(topic, context.as_deref());
            let answer = match self.model.complete(&system, &prompt).await {
                Ok(answer) => answer,
                Err(source) => {
                    output::error(out, &task.agent, &format!("{source:#}"))?;
                    tracing::error!(task = task.name, error = %source, "Task failed");
                    return Err(EngineError::Task {
                        task: task.name,
                        source,
                    });
                }
            };

            output::final_answer(out, &task.agent, &answer)?;
            tracing::info!(task = task.name, chars = answer.len(), "Task finished");
            context = Some(answer);
        }

        let markdown = context.unwrap_or_default();
        if markdown.trim().is_empty() {
            return Err(EngineError::EmptyArtifact);
        }
        output::crew_finished(out)?;
        Ok(FinalArtifact::new(markdown))
    }

    fn name(&self) -> &str {
        self.model.model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::sanitize;
    use std::sync::Mutex;

    /// Answers from a script and records every prompt it was given.
    struct Scripted {
        answers: Mutex<Vec<anyhow::Result<String>>>,
        prompts: Mutex<Vec<(String, String)>>,
    }

    impl Scripted {
        fn new(answers: Vec<anyhow::Result<String>>) -> Self {
            Self {
                answers: Mutex::new(answers.into_iter().rev().collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionModel for Scripted {
        async fn complete(&self, system: &str, prompt: &str) -> anyhow::Result<String> {
            self.prompts
                .lock()
                .unwrap()
                .push((system.to_string(), prompt.to_string()));
            self.answers
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(anyhow::anyhow!("script exhausted")))
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    fn topic() -> Topic {
        Topic::parse("Ownership").unwrap()
    }

    #[tokio::test]
    async fn runs_tasks_in_order_with_chained_context() {
        let engine = LlmCrew::new(Scripted::new(vec![
            Ok("PLAN: intro, borrowing".into()),
            Ok("# Draft\nfirst pass".into()),
            Ok("# Ownership\nPolished.".into()),
        ]));
        let mut out = Vec::new();
        let artifact = engine.kickoff(&Crew::blog(), &topic(), &mut out).await.unwrap();
        assert_eq!(artifact.markdown(), "# Ownership\nPolished.");

        let prompts = engine.model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].0.starts_with("You are Content Planner."));
        assert!(prompts[0].1.contains("blog content plan for Ownership"));
        assert!(!prompts[0].1.contains("context you're working with"));
        assert!(prompts[1].0.starts_with("You are Content Writer."));
        assert!(prompts[1].1.ends_with("PLAN: intro, borrowing"));
        assert!(prompts[2].0.starts_with("You are Editor."));
        assert!(prompts[2].1.ends_with("# Draft\nfirst pass"));

        let log = sanitize(&String::from_utf8(out).unwrap());
        assert!(log.contains("# Agent: Content Planner"));
        assert!(log.contains("## Final Answer:\n# Ownership\nPolished."));
        assert!(log.ends_with("✅ Crew finished"));
        assert!(!log.contains('\x1b'));
    }

    #[tokio::test]
    async fn failure_stops_the_run() {
        let engine = LlmCrew::new(Scripted::new(vec![
            Ok("plan".into()),
            Err(anyhow::anyhow!("rate limited")),
        ]));
        let mut out = Vec::new();
        let err = engine.kickoff(&Crew::blog(), &topic(), &mut out).await.unwrap_err();
        match err {
            EngineError::Task { task, source } => {
                assert_eq!(task, "write");
                assert_eq!(source.to_string(), "rate limited");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(engine.model.prompts.lock().unwrap().len(), 2);
        let log = sanitize(&String::from_utf8(out).unwrap());
        assert!(log.ends_with("[Content Writer] ❌ rate limited"));
    }

    #[tokio::test]
    async fn blank_final_answer_is_an_error() {
        let engine = LlmCrew::new(Scripted::new(vec![
            Ok("plan".into()),
            Ok("draft".into()),
            Ok("  \n".into()),
        ]));
        let mut out = Vec::new();
        let err = engine.kickoff(&Crew::blog(), &topic(), &mut out).await.unwrap_err();
        assert!(matches!(err, EngineError::EmptyArtifact));
    }

    #[test]
    fn artifact_views() {
        let artifact = FinalArtifact::new("# Testing\nBody.");
        assert_eq!(artifact.preview_html(), "<h1>Testing</h1>\n<p>Body.</p>\n");
        assert!(artifact.raw_html().contains("# Testing\nBody."));
        assert_eq!(artifact.into_markdown(), "# Testing\nBody.");
    }
}
