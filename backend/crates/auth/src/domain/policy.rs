//! Policy Engine
//!
//! Immutable RBAC table of `(role, path pattern, method)` permits, loaded
//! once at startup and shared behind an `Arc`.
//!
//! Source format:
//!
//! ```json
//! { "rules": [ { "role": "user", "path": "/auth/me", "method": "GET" } ] }
//! ```
//!
//! Path patterns are matched segment by segment:
//! - a literal segment matches itself
//! - `:name` or `*` matches exactly one segment
//! - a trailing `*` matches the rest of the path, including nothing
//!
//! `method` is an HTTP method (any case) or `*`.

use std::collections::HashMap;

use axum::http::Method;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Policy document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rule {index}: role cannot be empty")]
    EmptyRole { index: usize },

    #[error("Rule {index}: path must start with '/': {path}")]
    InvalidPath { index: usize, path: String },

    #[error("Rule {index}: unsupported method: {method}")]
    InvalidMethod { index: usize, method: String },
}

/// One permit as written in the policy source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PolicyRule {
    pub role: String,
    pub path: String,
    pub method: String,
}

impl PolicyRule {
    pub fn new(role: impl Into<String>, path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            path: path.into(),
            method: method.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PolicyDocument {
    rules: Vec<PolicyRule>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `:name` or a non-trailing `*`
    Single,
    /// trailing `*`
    Rest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum MethodMatch {
    Any,
    Exact(Method),
}

#[derive(Debug, Clone)]
struct CompiledRule {
    segments: Vec<Segment>,
    method: MethodMatch,
}

impl CompiledRule {
    fn compile(index: usize, rule: &PolicyRule) -> Result<Self, PolicyError> {
        let path = rule.path.trim();
        if !path.starts_with('/') {
            return Err(PolicyError::InvalidPath {
                index,
                path: rule.path.clone(),
            });
        }

        let parts = split_path(path);
        let last = parts.len().saturating_sub(1);
        let segments = parts
            .iter()
            .enumerate()
            .map(|(i, part)| match *part {
                "*" if i == last => Segment::Rest,
                "*" => Segment::Single,
                p if p.starts_with(':') => Segment::Single,
                p => Segment::Literal(p.to_string()),
            })
            .collect();

        Ok(Self {
            segments,
            method: parse_method(index, &rule.method)?,
        })
    }

    fn matches(&self, path: &[&str], method: &Method) -> bool {
        let method_ok = match &self.method {
            MethodMatch::Any => true,
            MethodMatch::Exact(m) => m == method,
        };
        method_ok && match_segments(&self.segments, path)
    }
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match (pattern.split_first(), path.split_first()) {
        (None, None) => true,
        (Some((Segment::Rest, _)), _) => true,
        (Some((Segment::Single, rest)), Some((_, path_rest))) => match_segments(rest, path_rest),
        (Some((Segment::Literal(lit), rest)), Some((seg, path_rest))) => {
            lit.as_str() == *seg && match_segments(rest, path_rest)
        }
        _ => false,
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn parse_method(index: usize, raw: &str) -> Result<MethodMatch, PolicyError> {
    const SUPPORTED: [Method; 7] = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::HEAD,
        Method::OPTIONS,
    ];

    let raw = raw.trim();
    if raw == "*" {
        return Ok(MethodMatch::Any);
    }
    let upper = raw.to_ascii_uppercase();
    SUPPORTED
        .into_iter()
        .find(|m| m.as_str() == upper)
        .map(MethodMatch::Exact)
        .ok_or_else(|| PolicyError::InvalidMethod {
            index,
            method: raw.to_string(),
        })
}

/// Read-only permit table.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    by_role: HashMap<String, Vec<CompiledRule>>,
    rule_count: usize,
}

impl PolicyEngine {
    /// Build from rules, validating every one.
    pub fn from_rules(rules: impl IntoIterator<Item = PolicyRule>) -> Result<Self, PolicyError> {
        let mut by_role: HashMap<String, Vec<CompiledRule>> = HashMap::new();
        let mut rule_count = 0;

        for (index, rule) in rules.into_iter().enumerate() {
            let role = rule.role.trim();
            if role.is_empty() {
                return Err(PolicyError::EmptyRole { index });
            }
            let compiled = CompiledRule::compile(index, &rule)?;
            by_role.entry(role.to_string()).or_default().push(compiled);
            rule_count += 1;
        }

        Ok(Self {
            by_role,
            rule_count,
        })
    }

    /// Parse the JSON policy document.
    pub fn from_json(source: &str) -> Result<Self, PolicyError> {
        let document: PolicyDocument = serde_json::from_str(source)?;
        Self::from_rules(document.rules)
    }

    /// Whether `role` may call `method path`. Unknown roles are denied.
    pub fn enforce(&self, role: &str, path: &str, method: &Method) -> bool {
        let Some(rules) = self.by_role.get(role) else {
            return false;
        };
        let path = split_path(path);
        rules.iter().any(|rule| rule.matches(&path, method))
    }

    /// Number of rules loaded.
    pub fn len(&self) -> usize {
        self.rule_count
    }

    pub fn is_empty(&self) -> bool {
        self.rule_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(rules: &[(&str, &str, &str)]) -> PolicyEngine {
        PolicyEngine::from_rules(
            rules
                .iter()
                .map(|(role, path, method)| PolicyRule::new(*role, *path, *method)),
        )
        .unwrap()
    }

    #[test]
    fn test_exact_match() {
        let policy = engine(&[("anonymous", "/auth/sign-in", "POST")]);
        assert!(policy.enforce("anonymous", "/auth/sign-in", &Method::POST));
        assert!(policy.enforce("anonymous", "/auth/sign-in/", &Method::POST));
        assert!(!policy.enforce("anonymous", "/auth/sign-in", &Method::GET));
        assert!(!policy.enforce("anonymous", "/auth/sign-up", &Method::POST));
        assert!(!policy.enforce("user", "/auth/sign-in", &Method::POST));
    }

    #[test]
    fn test_method_case_and_wildcard() {
        let policy = engine(&[("user", "/auth/me", "get"), ("admin", "/admin/*", "*")]);
        assert!(policy.enforce("user", "/auth/me", &Method::GET));
        assert!(policy.enforce("admin", "/admin/users", &Method::DELETE));
        assert!(policy.enforce("admin", "/admin/users/42", &Method::PATCH));
    }

    #[test]
    fn test_single_segment_patterns() {
        let policy = engine(&[
            ("user", "/articles/:id", "GET"),
            ("user", "/articles/*/comments", "GET"),
        ]);
        assert!(policy.enforce("user", "/articles/42", &Method::GET));
        assert!(!policy.enforce("user", "/articles", &Method::GET));
        assert!(!policy.enforce("user", "/articles/42/likes", &Method::GET));
        assert!(policy.enforce("user", "/articles/42/comments", &Method::GET));
    }

    #[test]
    fn test_trailing_wildcard_matches_rest() {
        let policy = engine(&[("admin", "/admin/*", "GET")]);
        assert!(policy.enforce("admin", "/admin", &Method::GET));
        assert!(policy.enforce("admin", "/admin/a/b/c", &Method::GET));
        assert!(!policy.enforce("admin", "/administrator", &Method::GET));
    }

    #[test]
    fn test_root_path() {
        let policy = engine(&[("anonymous", "/", "GET")]);
        assert!(policy.enforce("anonymous", "/", &Method::GET));
        assert!(!policy.enforce("anonymous", "/health", &Method::GET));
    }

    #[test]
    fn test_from_json() {
        let policy = PolicyEngine::from_json(
            r#"{"rules": [
                {"role": "anonymous", "path": "/auth/sign-up", "method": "POST"},
                {"role": "inactive", "path": "/auth/activate", "method": "POST"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(policy.len(), 2);
        assert!(policy.enforce("inactive", "/auth/activate", &Method::POST));
    }

    #[test]
    fn test_load_errors() {
        assert!(matches!(
            PolicyEngine::from_json("not json"),
            Err(PolicyError::Parse(_))
        ));
        assert!(matches!(
            PolicyEngine::from_rules([PolicyRule::new(" ", "/x", "GET")]),
            Err(PolicyError::EmptyRole { index: 0 })
        ));
        assert!(matches!(
            PolicyEngine::from_rules([
                PolicyRule::new("user", "/ok", "GET"),
                PolicyRule::new("user", "relative", "GET"),
            ]),
            Err(PolicyError::InvalidPath { index: 1, .. })
        ));
        assert!(matches!(
            PolicyEngine::from_rules([PolicyRule::new("user", "/x", "FETCH")]),
            Err(PolicyError::InvalidMethod { .. })
        ));
    }

    #[test]
    fn test_empty_policy_denies_everything() {
        let policy = PolicyEngine::from_json(r#"{"rules": []}"#).unwrap();
        assert!(policy.is_empty());
        assert!(!policy.enforce("anonymous", "/", &Method::GET));
    }
}
