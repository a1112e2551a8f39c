//! Route access policy.
//!
//! An ordered table of `(method, path pattern) -> requirement`, evaluated top to
//! bottom; the first matching rule wins. A narrower rule must therefore be declared
//! before a broader one covering the same prefix. Requests matching no rule require
//! authentication.
//!
//! Pattern syntax (segments separated by `/`):
//! - literal segment: exact match
//! - `*`: exactly one segment
//! - `**`: zero or more segments

use axum::http::Method;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Public,
    Authenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RejectUnauthenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Any,
    AnyDepth,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|s| match s {
                "**" => Segment::AnyDepth,
                "*" => Segment::Any,
                lit => Segment::Literal(lit.to_string()),
            })
            .collect();

        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, path: &str) -> bool {
        let path: Vec<&str> = split_path(path).collect();
        match_segments(&self.segments, &path)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::AnyDepth, rest)) => {
            (0..=path.len()).any(|skip| match_segments(rest, &path[skip..]))
        }
        Some((Segment::Any, rest)) => !path.is_empty() && match_segments(rest, &path[1..]),
        Some((Segment::Literal(lit), rest)) => {
            path.first().is_some_and(|p| *p == lit.as_str()) && match_segments(rest, &path[1..])
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccessRule {
    /// `None` matches every method.
    pub method: Option<Method>,
    pub pattern: PathPattern,
    pub requirement: Requirement,
}

impl AccessRule {
    fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.as_ref().is_none_or(|m| m == method) && self.pattern.matches(path)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
}

impl AccessPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn permit(self, method: Option<Method>, pattern: &str) -> Self {
        self.rule(method, pattern, Requirement::Public)
    }

    pub fn authenticate(self, method: Option<Method>, pattern: &str) -> Self {
        self.rule(method, pattern, Requirement::Authenticated)
    }

    pub fn rule(mut self, method: Option<Method>, pattern: &str, requirement: Requirement) -> Self {
        self.rules.push(AccessRule {
            method,
            pattern: PathPattern::parse(pattern),
            requirement,
        });
        self
    }

    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }

    /// Requirement of the first matching rule, `Authenticated` when none match.
    pub fn requirement_for(&self, method: &Method, path: &str) -> Requirement {
        self.rules
            .iter()
            .find(|r| r.matches(method, path))
            .map(|r| r.requirement)
            .unwrap_or(Requirement::Authenticated)
    }

    pub fn match_and_enforce(&self, method: &Method, path: &str, has_identity: bool) -> Decision {
        match self.requirement_for(method, path) {
            Requirement::Authenticated if !has_identity => Decision::RejectUnauthenticated,
            _ => Decision::Allow,
        }
    }
}

/// The blog's route table. Order matters: drafts must precede the public posts rule.
pub fn blog_policy(prefix: &str) -> AccessPolicy {
    let p = |path: &str| format!("{prefix}{path}");

    AccessPolicy::new()
        .permit(Some(Method::POST), &p("/auth/login"))
        .permit(Some(Method::POST), &p("/auth/register"))
        .permit(Some(Method::GET), &p("/health"))
        .authenticate(Some(Method::GET), &p("/posts/drafts"))
        .permit(Some(Method::GET), &p("/posts/**"))
        .permit(Some(Method::GET), &p("/categories/**"))
        .permit(Some(Method::GET), &p("/tags/**"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_matching() {
        let p = PathPattern::parse("/posts/**");
        assert!(p.matches("/posts"));
        assert!(p.matches("/posts/"));
        assert!(p.matches("/posts/123"));
        assert!(p.matches("/posts/123/comments"));
        assert!(!p.matches("/postsx"));
        assert!(!p.matches("/tags/1"));

        let p = PathPattern::parse("/posts/*/comments");
        assert!(p.matches("/posts/1/comments"));
        assert!(!p.matches("/posts/comments"));
        assert!(!p.matches("/posts/1/2/comments"));

        let p = PathPattern::parse("/a/**/z");
        assert!(p.matches("/a/z"));
        assert!(p.matches("/a/b/c/z"));
        assert!(!p.matches("/a/b/c"));

        let p = PathPattern::parse("/posts/drafts");
        assert!(p.matches("//posts/drafts/"));
        assert!(!p.matches("/posts/drafts/1"));
    }

    #[test]
    fn earlier_narrow_rule_wins_over_later_broad_rule() {
        let policy = AccessPolicy::new()
            .authenticate(Some(Method::GET), "/posts/drafts")
            .permit(Some(Method::GET), "/posts/**");

        assert_eq!(
            policy.match_and_enforce(&Method::GET, "/posts/drafts", false),
            Decision::RejectUnauthenticated
        );
        assert_eq!(
            policy.match_and_enforce(&Method::GET, "/posts/123", false),
            Decision::Allow
        );
        assert_eq!(
            policy.match_and_enforce(&Method::GET, "/posts/drafts", true),
            Decision::Allow
        );
    }

    #[test]
    fn broad_rule_declared_first_shadows_narrow_rule() {
        let policy = AccessPolicy::new()
            .permit(Some(Method::GET), "/posts/**")
            .authenticate(Some(Method::GET), "/posts/drafts");

        assert_eq!(
            policy.requirement_for(&Method::GET, "/posts/drafts"),
            Requirement::Public
        );
    }

    #[test]
    fn unmatched_requests_require_authentication() {
        let policy = AccessPolicy::new().permit(Some(Method::GET), "/posts/**");

        assert_eq!(
            policy.match_and_enforce(&Method::POST, "/posts", false),
            Decision::RejectUnauthenticated
        );
        assert_eq!(
            policy.match_and_enforce(&Method::GET, "/unknown", false),
            Decision::RejectUnauthenticated
        );
        assert_eq!(
            policy.match_and_enforce(&Method::GET, "/unknown", true),
            Decision::Allow
        );
    }

    #[test]
    fn wildcard_method_matches_everything() {
        let policy = AccessPolicy::new().permit(None, "/public/**");

        for m in [Method::GET, Method::POST, Method::DELETE] {
            assert_eq!(
                policy.match_and_enforce(&m, "/public/x", false),
                Decision::Allow
            );
        }
    }

    #[test]
    fn blog_policy_table() {
        let policy = blog_policy("/api/v1");
        let anon = |m: Method, path: &str| policy.match_and_enforce(&m, path, false);

        assert_eq!(anon(Method::POST, "/api/v1/auth/login"), Decision::Allow);
        assert_eq!(anon(Method::POST, "/api/v1/auth/register"), Decision::Allow);
        assert_eq!(anon(Method::GET, "/api/v1/health"), Decision::Allow);
        assert_eq!(anon(Method::GET, "/api/v1/posts"), Decision::Allow);
        assert_eq!(anon(Method::GET, "/api/v1/categories"), Decision::Allow);
        assert_eq!(anon(Method::GET, "/api/v1/tags/abc"), Decision::Allow);

        assert_eq!(
            anon(Method::GET, "/api/v1/posts/drafts"),
            Decision::RejectUnauthenticated
        );
        assert_eq!(
            anon(Method::POST, "/api/v1/posts"),
            Decision::RejectUnauthenticated
        );
        assert_eq!(
            anon(Method::GET, "/api/v1/auth/me"),
            Decision::RejectUnauthenticated
        );
        assert_eq!(
            anon(Method::DELETE, "/api/v1/tags/abc"),
            Decision::RejectUnauthenticated
        );
    }
}
