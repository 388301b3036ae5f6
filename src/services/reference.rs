use regex::Regex;

use crate::models::{ModInfo, ReferenceDescriptor};

/// Predicate deciding whether a mod is the one a reference descriptor names.
///
/// Matching is semantic equality against the descriptor, not identity; the
/// exact rules are host business (hash databases, repository lookups), so
/// the orchestrator takes the matcher as an injected collaborator.
/// [`FuzzyMatcher`] is the bundled default.
pub trait ReferenceMatcher: Send + Sync {
    fn matches(&self, candidate: &ModInfo, reference: &ReferenceDescriptor) -> bool;
}

/// Default matcher: exact id when the reference carries one, otherwise a
/// glob-style name pattern plus an optional version requirement.
#[derive(Debug, Default)]
pub struct FuzzyMatcher;

impl ReferenceMatcher for FuzzyMatcher {
    fn matches(&self, candidate: &ModInfo, reference: &ReferenceDescriptor) -> bool {
        if let Some(id) = &reference.id {
            return *id == candidate.id;
        }

        let Some(expression) = &reference.file_expression else {
            // A descriptor with neither id nor pattern names nothing.
            return false;
        };

        if !glob_matches(expression, &candidate.name) {
            return false;
        }

        match &reference.version_match {
            None => true,
            Some(requirement) => version_matches(requirement, &candidate.version),
        }
    }
}

/// Match `name` against a glob pattern where `*` spans any run of characters.
fn glob_matches(pattern: &str, name: &str) -> bool {
    let literals: Vec<String> = pattern.split('*').map(|part| regex::escape(part)).collect();
    let regex = format!("^{}$", literals.join(".*"));

    match Regex::new(&regex) {
        Ok(compiled) => compiled.is_match(name),
        Err(err) => {
            tracing::warn!("unusable reference pattern {:?}: {}", pattern, err);
            false
        }
    }
}

/// Match a version against a requirement: `*` accepts anything, a trailing
/// `.*` accepts the prefix, anything else must match exactly.
fn version_matches(requirement: &str, version: &str) -> bool {
    if requirement == "*" {
        return true;
    }
    if let Some(prefix) = requirement.strip_suffix(".*") {
        return version == prefix || version.starts_with(&format!("{prefix}."));
    }
    requirement == version
}
