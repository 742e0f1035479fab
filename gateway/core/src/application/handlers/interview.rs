// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Requirements-interview operations. The only purely local handlers in
//! the catalog: interview state lives in the owning dispatcher, so each
//! transport session gets an isolated namespace and nothing is forwarded
//! to the accelerator service.

use std::collections::HashMap;

use parking_lot::Mutex;
use uuid::Uuid;

use super::field;
use crate::domain::schema::ToolArguments;
use crate::domain::tool::ToolError;

const INFRASTRUCTURE_QUESTIONS: &[&str] = &[
    "What workload will this infrastructure serve?",
    "What is the expected traffic profile (steady, bursty, batch)?",
    "Which regions must the deployment cover?",
    "Are there compliance constraints on data residency?",
];

const SECURITY_QUESTIONS: &[&str] = &[
    "What assets does this system protect?",
    "Who are the expected principals and how do they authenticate?",
    "What is the blast radius of a credential leak?",
    "Which findings severity blocks a release?",
];

const GOVERNANCE_QUESTIONS: &[&str] = &[
    "What class of actions should require human escalation?",
    "Which environments are governed (local, staging, production)?",
    "What budget threshold gates autonomous spending?",
    "Where should decision outcomes be recorded?",
];

fn questions_for(topic: &str) -> &'static [&'static str] {
    match topic {
        "security" => SECURITY_QUESTIONS,
        "governance" => GOVERNANCE_QUESTIONS,
        _ => INFRASTRUCTURE_QUESTIONS,
    }
}

#[derive(Debug, Clone)]
struct Interview {
    topic: String,
    questions: &'static [&'static str],
    answers: Vec<String>,
}

impl Interview {
    fn is_complete(&self) -> bool {
        self.answers.len() >= self.questions.len()
    }
}

/// Session-scoped store of in-flight interviews.
#[derive(Debug, Default)]
pub struct InterviewStore {
    sessions: Mutex<HashMap<String, Interview>>,
}

impl InterviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn missing(id: &str) -> ToolError {
        ToolError::invalid(format!("No active interview with id '{}'", id))
    }
}

pub fn start(store: &InterviewStore, args: &ToolArguments) -> Result<String, ToolError> {
    let topic = args.str("topic")?.to_string();
    let questions = questions_for(&topic);
    let id = Uuid::new_v4().to_string();

    store.sessions.lock().insert(
        id.clone(),
        Interview {
            topic: topic.clone(),
            questions,
            answers: Vec::new(),
        },
    );

    let mut out = String::from("# Interview Started\n\n");
    field(&mut out, "Interview ID", &id);
    field(&mut out, "Topic", &topic);
    field(&mut out, "Questions", questions.len());
    out.push_str(&format!("\n**Question 1 of {}:** {}\n", questions.len(), questions[0]));
    Ok(out)
}

pub fn answer(store: &InterviewStore, args: &ToolArguments) -> Result<String, ToolError> {
    let id = args.str("interview_id")?;
    let answer = args.str("answer")?.to_string();

    let mut sessions = store.sessions.lock();
    let interview = sessions
        .get_mut(id)
        .ok_or_else(|| InterviewStore::missing(id))?;

    if interview.is_complete() {
        return Err(ToolError::invalid(format!(
            "Interview '{}' already has all answers; call s2t_finish_interview",
            id
        )));
    }

    interview.answers.push(answer);
    let answered = interview.answers.len();
    let total = interview.questions.len();

    let mut out = String::from("# Answer Recorded\n\n");
    field(&mut out, "Progress", format!("{}/{}", answered, total));
    if answered < total {
        out.push_str(&format!(
            "\n**Question {} of {}:** {}\n",
            answered + 1,
            total,
            interview.questions[answered],
        ));
    } else {
        out.push_str("\nAll questions answered. Call s2t_finish_interview for the summary.\n");
    }
    Ok(out)
}

pub fn status(store: &InterviewStore, args: &ToolArguments) -> Result<String, ToolError> {
    let id = args.str("interview_id")?;

    let sessions = store.sessions.lock();
    let interview = sessions.get(id).ok_or_else(|| InterviewStore::missing(id))?;

    let mut out = String::from("# Interview Status\n\n");
    field(&mut out, "Interview ID", id);
    field(&mut out, "Topic", &interview.topic);
    field(
        &mut out,
        "Progress",
        format!("{}/{}", interview.answers.len(), interview.questions.len()),
    );
    field(&mut out, "Complete", interview.is_complete());
    Ok(out)
}

pub fn finish(store: &InterviewStore, args: &ToolArguments) -> Result<String, ToolError> {
    let id = args.str("interview_id")?;

    let interview = store
        .sessions
        .lock()
        .remove(id)
        .ok_or_else(|| InterviewStore::missing(id))?;

    let mut out = String::from("# Interview Summary\n\n");
    field(&mut out, "Topic", &interview.topic);
    field(
        &mut out,
        "Answered",
        format!("{}/{}", interview.answers.len(), interview.questions.len()),
    );
    out.push('\n');

    for (index, question) in interview.questions.iter().enumerate() {
        out.push_str(&format!("**Q{}:** {}\n", index + 1, question));
        match interview.answers.get(index) {
            Some(answer) => out.push_str(&format!("**A{}:** {}\n\n", index + 1, answer)),
            None => out.push_str(&format!("**A{}:** (unanswered)\n\n", index + 1)),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{FieldSpec, InputSchema};
    use serde_json::json;

    fn args(value: serde_json::Value) -> ToolArguments {
        // Mirror the dispatcher: validate through a permissive schema.
        let map = value.as_object().cloned().unwrap_or_default();
        ToolArguments::new(map)
    }

    fn extract_id(text: &str) -> String {
        text.lines()
            .find(|l| l.starts_with("**Interview ID:**"))
            .unwrap()
            .trim_start_matches("**Interview ID:** ")
            .to_string()
    }

    #[test]
    fn test_full_interview_flow() {
        let store = InterviewStore::new();
        let started = start(&store, &args(json!({ "topic": "security" }))).unwrap();
        assert!(started.contains("Question 1 of 4"));
        let id = extract_id(&started);

        for n in 1..=4 {
            let reply = answer(
                &store,
                &args(json!({ "interview_id": id, "answer": format!("answer {}", n) })),
            )
            .unwrap();
            if n < 4 {
                assert!(reply.contains(&format!("Question {} of 4", n + 1)));
            } else {
                assert!(reply.contains("All questions answered"));
            }
        }

        let summary = finish(&store, &args(json!({ "interview_id": id }))).unwrap();
        assert!(summary.contains("**Q1:**"));
        assert!(summary.contains("answer 4"));

        // The session is discarded after finish.
        let err = status(&store, &args(json!({ "interview_id": id }))).unwrap_err();
        assert!(err.to_string().contains("No active interview"));
    }

    #[test]
    fn test_answer_after_completion_is_rejected() {
        let store = InterviewStore::new();
        let started = start(&store, &args(json!({ "topic": "governance" }))).unwrap();
        let id = extract_id(&started);
        for n in 0..4 {
            answer(
                &store,
                &args(json!({ "interview_id": id, "answer": format!("a{}", n) })),
            )
            .unwrap();
        }
        let err = answer(
            &store,
            &args(json!({ "interview_id": id, "answer": "extra" })),
        )
        .unwrap_err();
        assert!(err.to_string().contains("s2t_finish_interview"));
    }

    #[test]
    fn test_unknown_interview_id() {
        let store = InterviewStore::new();
        let err = status(&store, &args(json!({ "interview_id": "nope" }))).unwrap_err();
        assert_eq!(err.to_string(), "No active interview with id 'nope'");
    }

    #[test]
    fn test_topic_schema_matches_question_sets() {
        // Guard that every declared topic has a script.
        let schema = InputSchema::new(vec![FieldSpec::enumeration(
            "topic",
            "Interview topic",
            &["infrastructure", "security", "governance"],
        )]);
        for topic in ["infrastructure", "security", "governance"] {
            assert!(schema.validate(&json!({ "topic": topic })).is_ok());
            assert_eq!(questions_for(topic).len(), 4);
        }
    }
}
