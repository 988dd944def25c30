//! Verbose progress output for a crew run.
//!
//! Written the way a terminal tool would print it, colour codes included.
//! Each helper formats its whole message first and writes it in a single
//! call, so a sink sees one chunk per event.

use std::io::{self, Write};

use crate::crew::{AgentDescriptor, TaskDescriptor};
use crate::topic::Topic;

const RESET: &str = "\x1b[0m";
const BOLD_MAGENTA: &str = "\x1b[1;35m";
const MAGENTA: &str = "\x1b[95m";
const BOLD_GREEN: &str = "\x1b[1;92m";
const GREEN: &str = "\x1b[92m";
const RED: &str = "\x1b[91m";

fn emit(out: &mut dyn Write, text: &str) -> io::Result<()> {
    out.write_all(text.as_bytes())?;
    out.flush()
}

/// Crew is starting on a topic.
pub fn crew_started(out: &mut dyn Write, topic: &Topic, tasks: usize) -> io::Result<()> {
    emit(
        out,
        &format!("{BOLD_MAGENTA}🚀 Crew started{RESET} on \"{topic}\" ({tasks} tasks)\n\n\n"),
    )
}

/// An agent picks up its task.
pub fn agent_started(out: &mut dyn Write, task: &TaskDescriptor, topic: &Topic) -> io::Result<()> {
    emit(
        out,
        &format!(
            "\n\n{BOLD_MAGENTA}# Agent:{RESET} {BOLD_GREEN}{role}{RESET}\n\
             {MAGENTA}## Task:{RESET} {GREEN}{description}{RESET}\n\n\n",
            role = task.agent.role,
            description = task.description_for(topic),
        ),
    )
}

/// An agent is done; `answer` is its full output.
pub fn final_answer(out: &mut dyn Write, agent: &AgentDescriptor, answer: &str) -> io::Result<()> {
    emit(
        out,
        &format!(
            "\n\n{BOLD_MAGENTA}# Agent:{RESET} {BOLD_GREEN}{role}{RESET}\n\
             {MAGENTA}## Final Answer:{RESET}\n{GREEN}{answer}{RESET}\n\n\n\n",
            role = agent.role,
        ),
    )
}

/// Post a status update (brief, one-line).
pub fn status(out: &mut dyn Write, agent: &AgentDescriptor, emoji: &str, text: &str) -> io::Result<()> {
    emit(out, &format!("[{}] {emoji} {text}\n", agent.role))
}

/// Post an error.
pub fn error(out: &mut dyn Write, agent: &AgentDescriptor, text: &str) -> io::Result<()> {
    emit(out, &format!("{RED}[{}] ❌ {text}{RESET}\n", agent.role))
}

/// All tasks finished.
pub fn crew_finished(out: &mut dyn Write) -> io::Result<()> {
    emit(out, &format!("{BOLD_MAGENTA}✅ Crew finished{RESET}\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crew::{PLAN, WRITER};
    use crate::sanitize::sanitize;

    /// Records each write call separately.
    #[derive(Default)]
    struct Chunks(Vec<String>);

    impl Write for Chunks {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.push(String::from_utf8_lossy(buf).into_owned());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn agent_started_is_one_chunk() {
        let mut out = Chunks::default();
        let topic = Topic::parse("Testing").unwrap();
        agent_started(&mut out, &PLAN, &topic).unwrap();
        assert_eq!(out.0.len(), 1);
        assert_eq!(
            sanitize(&out.0[0]),
            "# Agent: Content Planner\n## Task: Create a comprehensive blog content plan for Testing."
        );
    }

    #[test]
    fn final_answer_sanitizes_to_plain_text() {
        let mut out = Chunks::default();
        final_answer(&mut out, &WRITER, "# Title\n\n\n\nBody").unwrap();
        assert_eq!(
            sanitize(&out.0[0]),
            "# Agent: Content Writer\n## Final Answer:\n# Title\n\nBody"
        );
    }

    #[test]
    fn status_and_error_lines() {
        let mut out = Chunks::default();
        status(&mut out, &WRITER, "✏️", "Drafting").unwrap();
        error(&mut out, &WRITER, "model unavailable").unwrap();
        assert_eq!(out.0[0], "[Content Writer] ✏️ Drafting\n");
        assert_eq!(sanitize(&out.0[1]), "[Content Writer] ❌ model unavailable");
    }
}
