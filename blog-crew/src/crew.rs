//! The blog crew: three agents and the three chained tasks they perform.
//!
//! Agents and tasks are plain values. `{topic}` placeholders in goals and
//! task descriptions are filled in when a run starts.

use crate::topic::Topic;

const TOPIC_PLACEHOLDER: &str = "{topic}";

/// Who an agent is and what it is trying to achieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentDescriptor {
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
    pub allow_delegation: bool,
}

/// One unit of work, owned by a single agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskDescriptor {
    /// Short identifier used in logs and errors.
    pub name: &'static str,
    pub description: &'static str,
    pub expected_output: &'static str,
    pub agent: AgentDescriptor,
}

pub const PLANNER: AgentDescriptor = AgentDescriptor {
    role: "Content Planner",
    goal: "Create detailed and factually accurate plans for {topic}.",
    backstory: "Expert at planning engaging, structured, and SEO-optimized blogs.",
    allow_delegation: false,
};

pub const WRITER: AgentDescriptor = AgentDescriptor {
    role: "Content Writer",
    goal: "Write a detailed, accessible, and engaging blog post about {topic}.",
    backstory: "Expert in crafting clear and impactful blog posts.",
    allow_delegation: false,
};

pub const EDITOR: AgentDescriptor = AgentDescriptor {
    role: "Editor",
    goal: "Edit the blog to ensure clarity, coherence, and correctness.",
    backstory: "Experienced blog editor who ensures a polished final product.",
    allow_delegation: false,
};

pub const PLAN: TaskDescriptor = TaskDescriptor {
    name: "plan",
    description: "Create a comprehensive blog content plan for {topic}.",
    expected_output: "Content plan with outline, audience analysis, SEO keywords, and resources.",
    agent: PLANNER,
};

pub const WRITE: TaskDescriptor = TaskDescriptor {
    name: "write",
    description: "Use the content plan to write a detailed blog post about {topic}.",
    expected_output: "A complete blog post in markdown format, with 2–3 paragraphs per section.",
    agent: WRITER,
};

pub const EDIT: TaskDescriptor = TaskDescriptor {
    name: "edit",
    description: "Edit the blog for grammar, flow, and alignment with the content plan.",
    expected_output: "A final, polished markdown blog post ready for publishing.",
    agent: EDITOR,
};

/// Replace every `{topic}` placeholder in `template`.
pub fn interpolate(template: &str, topic: &Topic) -> String {
    template.replace(TOPIC_PLACEHOLDER, topic.as_str())
}

impl AgentDescriptor {
    /// System prompt that puts the model in this agent's role.
    pub fn system_prompt(&self, topic: &Topic) -> String {
        let mut prompt = format!(
            "You are {role}. {backstory}\nYour personal goal is: {goal}",
            role = self.role,
            backstory = self.backstory,
            goal = interpolate(self.goal, topic),
        );
        if !self.allow_delegation {
            prompt.push_str("\nWork on your own; you cannot hand work off to other agents.");
        }
        prompt
    }
}

impl TaskDescriptor {
    pub fn description_for(&self, topic: &Topic) -> String {
        interpolate(self.description, topic)
    }

    /// User prompt for this task. `context` is the previous task's output.
    pub fn prompt(&self, topic: &Topic, context: Option<&str>) -> String {
        let mut prompt = format!(
            "Current Task: {}\n\n\
             This is the expected criteria for your final answer: {}\n\
             You MUST return the actual complete content as the final answer, not a summary.",
            self.description_for(topic),
            interpolate(self.expected_output, topic),
        );
        if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
            prompt.push_str("\n\nThis is the context you're working with:\n");
            prompt.push_str(context);
        }
        prompt
    }
}

/// An ordered pipeline of tasks and the agents that run them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crew {
    agents: Vec<AgentDescriptor>,
    tasks: Vec<TaskDescriptor>,
}

impl Crew {
    /// Plan → Write → Edit.
    pub fn blog() -> Self {
        Self {
            agents: vec![PLANNER, WRITER, EDITOR],
            tasks: vec![PLAN, WRITE, EDIT],
        }
    }

    pub fn agents(&self) -> &[AgentDescriptor] {
        &self.agents
    }

    /// Tasks in execution order; each consumes the previous one's output.
    pub fn tasks(&self) -> &[TaskDescriptor] {
        &self.tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic() -> Topic {
        Topic::parse("Rust Lifetimes").unwrap()
    }

    #[test]
    fn blog_crew_is_plan_write_edit() {
        let crew = Crew::blog();
        let names: Vec<_> = crew.tasks().iter().map(|t| t.name).collect();
        assert_eq!(names, ["plan", "write", "edit"]);
        let roles: Vec<_> = crew.tasks().iter().map(|t| t.agent.role).collect();
        assert_eq!(roles, ["Content Planner", "Content Writer", "Editor"]);
        assert_eq!(crew.agents(), [PLANNER, WRITER, EDITOR]);
        assert!(crew.agents().iter().all(|a| !a.allow_delegation));
    }

    #[test]
    fn crew_is_identical_every_time() {
        assert_eq!(Crew::blog(), Crew::blog());
    }

    #[test]
    fn interpolates_topic() {
        assert_eq!(
            interpolate(PLANNER.goal, &topic()),
            "Create detailed and factually accurate plans for Rust Lifetimes."
        );
        assert_eq!(interpolate(EDITOR.goal, &topic()), EDITOR.goal);
        assert_eq!(interpolate("{topic} / {topic}", &topic()), "Rust Lifetimes / Rust Lifetimes");
    }

    #[test]
    fn system_prompt_carries_role_goal_backstory() {
        let prompt = WRITER.system_prompt(&topic());
        assert!(prompt.starts_with("You are Content Writer. Expert in crafting"));
        assert!(prompt.contains("blog post about Rust Lifetimes."));
        assert!(!prompt.contains("{topic}"));
        assert!(prompt.ends_with("cannot hand work off to other agents."));
    }

    #[test]
    fn task_prompt_includes_context_only_when_present() {
        let first = PLAN.prompt(&topic(), None);
        assert!(first.contains("Current Task: Create a comprehensive blog content plan for Rust Lifetimes."));
        assert!(first.contains("SEO keywords"));
        assert!(!first.contains("context you're working with"));

        let blank = WRITE.prompt(&topic(), Some("   "));
        assert!(!blank.contains("context you're working with"));

        let chained = WRITE.prompt(&topic(), Some("1. Intro\n2. Borrowing"));
        assert!(chained.ends_with("This is the context you're working with:\n1. Intro\n2. Borrowing"));
    }
}
