//! Declarative access rules: which endpoints need which caller.
//!
//! Rules are checked in order and the first match wins, so more specific
//! rules go first. Requests no rule matches fall through to the fallback.

use crate::RoleName;

/// What a caller must present to reach an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Anyone, with or without credentials.
    Public,
    /// Any authenticated principal.
    Authenticated,
    /// An authenticated principal holding the role.
    Role(RoleName),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param,
}

/// A `/`-separated path template where `{name}` matches exactly one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(raw: &str) -> Self {
        let segments = split_segments(raw)
            .map(|s| {
                if s.starts_with('{') && s.ends_with('}') {
                    Segment::Param
                } else {
                    Segment::Literal(s.to_string())
                }
            })
            .collect();

        Self { segments }
    }

    pub fn matches(&self, path: &str) -> bool {
        let mut given = split_segments(path);
        for expected in &self.segments {
            let Some(actual) = given.next() else {
                return false;
            };
            match expected {
                Segment::Literal(lit) if lit != actual => return false,
                Segment::Param if actual.is_empty() => return false,
                _ => {}
            }
        }
        given.next().is_none()
    }
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    trimmed.split('/').filter(move |_| !trimmed.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRule {
    /// `None` matches every method.
    pub method: Option<String>,
    pub pattern: PathPattern,
    pub requirement: Requirement,
}

impl AccessRule {
    fn applies_to(&self, method: &str, path: &str) -> bool {
        let method_ok = self.method.as_deref().is_none_or(|m| {
            m.eq_ignore_ascii_case(method)
                // HEAD is served by the GET handler, so it shares GET's rule.
                || (m.eq_ignore_ascii_case("GET") && method.eq_ignore_ascii_case("HEAD"))
        });
        method_ok && self.pattern.matches(path)
    }
}

/// Ordered rule set evaluated per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
    fallback: Requirement,
}

impl AccessPolicy {
    pub fn new(fallback: Requirement) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    /// Append a rule (lower priority than every rule added before it).
    pub fn rule(mut self, method: Option<&str>, pattern: &str, requirement: Requirement) -> Self {
        self.rules.push(AccessRule {
            method: method.map(str::to_string),
            pattern: PathPattern::parse(pattern),
            requirement,
        });
        self
    }

    pub fn permit(self, method: &str, pattern: &str) -> Self {
        self.rule(Some(method), pattern, Requirement::Public)
    }

    pub fn require_role(self, method: &str, pattern: &str, role: RoleName) -> Self {
        self.rule(Some(method), pattern, Requirement::Role(role))
    }

    /// The service's rule set: registration and greeting are open, promotion
    /// needs `ADMIN`, everything else needs a principal.
    pub fn standard() -> Self {
        Self::new(Requirement::Authenticated)
            .permit("POST", "/api/addUser")
            .permit("GET", "/api/hello")
            .permit("GET", "/health")
            .require_role("POST", "/api/admin/{id}", RoleName::ADMIN)
    }

    pub fn requirement_for(&self, method: &str, path: &str) -> &Requirement {
        self.rules
            .iter()
            .find(|r| r.applies_to(method, path))
            .map(|r| &r.requirement)
            .unwrap_or(&self.fallback)
    }
}
