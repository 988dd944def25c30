//! blog-crew: three AI agents write a blog post while you watch.
//!
//! A planner, a writer and an editor run one after another on a topic
//! submitted from a web page. Their progress output is cleaned of terminal
//! escape codes and streamed into a live log panel; the finished post is
//! shown rendered and as raw markdown.

pub mod config;
pub mod crew;
pub mod engine;
pub mod error;
pub mod llm;
pub mod markdown;
pub mod output;
pub mod runner;
pub mod sanitize;
pub mod sink;
pub mod topic;
pub mod web;
