//! Collaborator backed by an LLM agent CLI.
//!
//! Shells out to `gemini` or `claude` in non-interactive mode, one process
//! per call. Each call is bounded by a timeout; a child that overruns is
//! killed and the call fails with `CollaboratorError::Timeout`.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, trace};

use super::collaborator::{Relevance, RelevanceCollaborator, StudentSummary};
use crate::error::CollaboratorError;
use crate::types::Course;

/// Expansion replies are cut to this many terms.
pub const MAX_EXPANSIONS: usize = 5;

/// Upper bound of the relevance scale the prompt asks for.
const MAX_SCORE: i64 = 50;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Which agent CLI to invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Agent {
    #[default]
    Gemini,
    Claude,
}

impl FromStr for Agent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Agent::Gemini),
            "claude" => Ok(Agent::Claude),
            _ => Err(format!("Unknown agent: {}. Use 'gemini' or 'claude'", s)),
        }
    }
}

impl std::fmt::Display for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Agent::Gemini => write!(f, "gemini"),
            Agent::Claude => write!(f, "claude"),
        }
    }
}

impl Agent {
    fn command(&self, prompt: &str, model: Option<&str>) -> Command {
        match self {
            Agent::Gemini => {
                let mut cmd = Command::new("gemini");
                cmd.args(["-o", "text", "-y"]);
                if let Some(m) = model {
                    cmd.args(["-m", m]);
                }
                cmd.arg(prompt);
                cmd
            }
            Agent::Claude => {
                let mut cmd = Command::new("claude");
                if let Some(m) = model {
                    cmd.args(["--model", m]);
                }
                cmd.args(["--print", "-p", prompt]);
                cmd
            }
        }
    }
}

/// Relevance collaborator that asks an agent CLI.
#[derive(Debug, Clone)]
pub struct AgentCollaborator {
    agent: Agent,
    model: Option<String>,
    timeout: Duration,
}

impl AgentCollaborator {
    pub fn new(agent: Agent) -> Self {
        Self {
            agent,
            model: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn agent(&self) -> Agent {
        self.agent
    }

    fn call(&self, prompt: &str) -> Result<String, CollaboratorError> {
        let agent = self.agent.to_string();
        let mut cmd = self.agent.command(prompt, self.model.as_deref());
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let started = Instant::now();
        let child = cmd.spawn().map_err(|source| CollaboratorError::Spawn {
            agent: agent.clone(),
            source,
        })?;
        let output = wait_with_timeout(child, self.timeout, &agent)?;
        debug!(agent = %agent, elapsed_ms = started.elapsed().as_millis() as u64, "agent call finished");

        if !output.success {
            return Err(CollaboratorError::Exit {
                agent,
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            });
        }

        let reply = output.stdout.trim().to_string();
        trace!(reply = %reply, "agent reply");
        if reply.is_empty() {
            return Err(CollaboratorError::EmptyResponse);
        }
        Ok(reply)
    }
}

impl RelevanceCollaborator for AgentCollaborator {
    fn expand(&self, term: &str) -> Result<Vec<String>, CollaboratorError> {
        let reply = self.call(&expansion_prompt(term))?;
        Ok(parse_expansion(&reply))
    }

    fn evaluate(
        &self,
        student: &StudentSummary,
        course: &Course,
    ) -> Result<Relevance, CollaboratorError> {
        let reply = self.call(&evaluation_prompt(student, course))?;
        parse_judgment(&reply)
    }
}

#[derive(Debug)]
struct ChildOutput {
    success: bool,
    status: String,
    stdout: String,
    stderr: String,
}

/// Wait for `child`, killing it once `timeout` has passed.
///
/// Pipes are drained on their own threads so a chatty child cannot block on
/// a full pipe while we poll.
fn wait_with_timeout(
    mut child: Child,
    timeout: Duration,
    agent: &str,
) -> Result<ChildOutput, CollaboratorError> {
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                // Already-exited races are fine; nothing else to do on failure.
                let _ = child.kill();
                let _ = child.wait();
                return Err(CollaboratorError::Timeout {
                    agent: agent.to_string(),
                    timeout,
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(source) => {
                return Err(CollaboratorError::Io {
                    agent: agent.to_string(),
                    source,
                })
            }
        }
    };

    let collect = |handle: Option<thread::JoinHandle<std::io::Result<String>>>| {
        match handle.map(|h| h.join()) {
            Some(Ok(Ok(text))) => Ok(text),
            Some(Ok(Err(source))) => Err(CollaboratorError::Io {
                agent: agent.to_string(),
                source,
            }),
            Some(Err(_)) => Err(CollaboratorError::Malformed(
                "output reader panicked".to_string(),
            )),
            None => Ok(String::new()),
        }
    };

    Ok(ChildOutput {
        success: status.success(),
        status: status.to_string(),
        stdout: collect(stdout)?,
        stderr: collect(stderr)?,
    })
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<std::io::Result<String>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    })
}

fn expansion_prompt(term: &str) -> String {
    format!(
        "List {MAX_EXPANSIONS} academic or professional terms closely related to the keyword \"{term}\".\n\
         Answer in the same language as the keyword.\n\
         Reply with the terms only, separated by commas, with no numbering and no explanation."
    )
}

fn evaluation_prompt(student: &StudentSummary, course: &Course) -> String {
    let keywords: Vec<&str> = course.keywords.keys().collect();
    format!(
        r#"You are an academic advisor. Judge how suitable a course is for a student.

Student keywords: {student_keywords}
Student interest: {interest}

Course name: {name}
Course description: {description}
Course keywords: {course_keywords}

Rate the suitability from 0 (unrelated) to {MAX_SCORE} (ideal) and give a one-sentence reason,
written in the same language as the course name.

Respond with ONLY a JSON object:
{{"score": <integer 0-{MAX_SCORE}>, "reason": "<one sentence>"}}"#,
        student_keywords = student.keywords,
        interest = student.interest,
        name = course.name,
        description = course.description,
        course_keywords = keywords.join(", "),
    )
}

/// Split a comma-separated expansion reply into at most `MAX_EXPANSIONS` terms.
pub fn parse_expansion(reply: &str) -> Vec<String> {
    reply
        .split([',', '\n'])
        .map(|t| t.trim().trim_matches(|c: char| c == '"' || c == '\'' || c == '.'))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .take(MAX_EXPANSIONS)
        .map(str::to_string)
        .collect()
}

/// Read `{"score", "reason"}` out of a judgment reply.
pub fn parse_judgment(reply: &str) -> Result<Relevance, CollaboratorError> {
    let json = extract_json_object(reply)
        .ok_or_else(|| CollaboratorError::Malformed("no JSON object in reply".to_string()))?;

    let score = json
        .get("score")
        .and_then(score_value)
        .ok_or_else(|| CollaboratorError::Malformed("missing or non-numeric score".to_string()))?;

    let reason = json
        .get("reason")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or("no reason given")
        .to_string();

    Ok(Relevance::new(score, reason))
}

/// Integer, truncated float, or numeric string, clamped into [0, MAX_SCORE].
fn score_value(value: &Value) -> Option<u32> {
    let raw = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64))?,
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(i) => i,
                Err(_) => {
                    let f = s.parse::<f64>().ok().filter(|f| f.is_finite())?;
                    f.trunc() as i64
                }
            }
        }
        _ => return None,
    };
    Some(raw.clamp(0, MAX_SCORE) as u32)
}

/// First JSON object in `text`: the whole reply if it parses, otherwise the
/// first balanced `{...}` span that does. Agents like to wrap JSON in prose
/// or code fences.
fn extract_json_object(text: &str) -> Option<Value> {
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(text.trim()) {
        return Some(value);
    }

    let bytes = text.as_bytes();
    let mut start = 0;
    while let Some(offset) = text[start..].find('{') {
        let open = start + offset;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        for (i, &b) in bytes.iter().enumerate().skip(open) {
            if in_string {
                match b {
                    _ if escaped => escaped = false,
                    b'\\' => escaped = true,
                    b'"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match b {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        if let Ok(value @ Value::Object(_)) =
                            serde_json::from_str::<Value>(&text[open..=i])
                        {
                            return Some(value);
                        }
                        break;
                    }
                }
                _ => {}
            }
        }
        start = open + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_from_str() {
        assert_eq!("Gemini".parse::<Agent>().unwrap(), Agent::Gemini);
        assert_eq!("claude".parse::<Agent>().unwrap(), Agent::Claude);
        assert!("codex".parse::<Agent>().is_err());
        assert_eq!(Agent::Claude.to_string(), "claude");
    }

    #[test]
    fn test_parse_expansion_caps_and_trims() {
        let reply = " branding, consumer behavior ,, pricing, \"retail\", advertising, market research, sales";
        assert_eq!(
            parse_expansion(reply),
            vec!["branding", "consumer behavior", "pricing", "retail", "advertising"]
        );
        assert!(parse_expansion("   ").is_empty());
    }

    #[test]
    fn test_parse_judgment_plain() {
        let judged = parse_judgment(r#"{"score": 42, "reason": "Builds on marketing."}"#).unwrap();
        assert_eq!(judged, Relevance::new(42, "Builds on marketing."));
    }

    #[test]
    fn test_parse_judgment_wrapped_in_prose() {
        let reply = "Sure! Here is my answer:\n```json\n{\"score\": \"37\", \"reason\": \"Close {fit}.\"}\n```";
        let judged = parse_judgment(reply).unwrap();
        assert_eq!(judged.score, 37);
        assert_eq!(judged.reason, "Close {fit}.");
    }

    #[test]
    fn test_parse_judgment_coerces_and_clamps() {
        assert_eq!(parse_judgment(r#"{"score": 41.9, "reason": "x"}"#).unwrap().score, 41);
        assert_eq!(parse_judgment(r#"{"score": 120, "reason": "x"}"#).unwrap().score, 50);
        assert_eq!(parse_judgment(r#"{"score": -3, "reason": "x"}"#).unwrap().score, 0);
        assert_eq!(parse_judgment(r#"{"score": "12.5"}"#).unwrap().score, 12);
    }

    #[test]
    fn test_parse_judgment_defaults_reason() {
        let judged = parse_judgment(r#"{"score": 10}"#).unwrap();
        assert_eq!(judged.reason, "no reason given");
    }

    #[test]
    fn test_parse_judgment_rejects_garbage() {
        assert!(matches!(
            parse_judgment("I cannot rate this course."),
            Err(CollaboratorError::Malformed(_))
        ));
        assert!(matches!(
            parse_judgment(r#"{"reason": "no score"}"#),
            Err(CollaboratorError::Malformed(_))
        ));
        assert!(matches!(
            parse_judgment(r#"{"score": "high"}"#),
            Err(CollaboratorError::Malformed(_))
        ));
    }

    #[test]
    fn test_extract_skips_unparseable_braces() {
        let value = extract_json_object("{not json} then {\"score\": 5}").unwrap();
        assert_eq!(value["score"], 5);
    }

    #[test]
    fn test_evaluation_prompt_mentions_inputs() {
        let course = Course::new(
            "Brand Strategy",
            [("branding", 2.0), ("marketing", 1.0)].into_iter().collect(),
        )
        .with_description("How brands are built.");
        let summary = StudentSummary::new("marketing, statistics", None);
        let prompt = evaluation_prompt(&summary, &course);
        assert!(prompt.contains("Brand Strategy"));
        assert!(prompt.contains("branding, marketing"));
        assert!(prompt.contains("Student interest: none"));
    }

    #[cfg(unix)]
    #[test]
    fn test_wait_with_timeout_kills_slow_child() {
        let child = Command::new("sleep")
            .arg("5")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        let started = Instant::now();
        let err = wait_with_timeout(child, Duration::from_millis(100), "sleep").unwrap_err();
        assert!(matches!(err, CollaboratorError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_wait_with_timeout_collects_output() {
        let child = Command::new("echo")
            .arg("hello")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        let output = wait_with_timeout(child, Duration::from_secs(5), "echo").unwrap();
        assert!(output.success);
        assert_eq!(output.stdout.trim(), "hello");
    }
}
