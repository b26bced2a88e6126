//! # Domain Models
//!
//! These structs represent the core entities of Ideaboard.
//! Ideas use UUID v7 for time-ordered identification; users are keyed by email.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::requests::{IdeaEdit, NewIdea};

/// Number of distinct reporter IPs after which an idea is flagged as bad.
pub const ISSUE_REPORT_THRESHOLD: usize = 3;

/// Permission role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Visitor,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::SuperAdmin, Role::Admin, Role::Visitor];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Visitor => "visitor",
        }
    }

    /// Roles a holder of `self` may create, edit or delete.
    pub fn administers(self) -> &'static [Role] {
        match self {
            Role::SuperAdmin => &[Role::SuperAdmin, Role::Admin, Role::Visitor],
            Role::Admin => &[Role::Visitor],
            Role::Visitor => &[],
        }
    }

    pub fn can_administer(self, target: Role) -> bool {
        self.administers().contains(&target)
    }

    /// Admins and super admins may author ideas and edit anyone's.
    pub fn is_editor(self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| {
                DomainError::PermissionDenied(format!("role `{s}` does not exist in the system"))
            })
    }
}

/// An idea posted by an editor and voted on by other users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    pub id: String,
    pub author_email: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: String,
    /// Media URIs, parallel to `media_types`.
    #[serde(default)]
    pub media: Vec<String>,
    #[serde(default)]
    pub media_types: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub issues: Vec<String>,
    /// One entry per distinct IP that ever reported an issue.
    #[serde(default)]
    pub issues_ips: Vec<String>,
    pub bad_flag: bool,
    pub enabled: bool,
    pub votes: i64,
    #[serde(default)]
    pub voters_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Idea {
    pub fn new(input: NewIdea, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            author_email: input.author_email,
            summary: input.summary,
            content: input.content,
            media: input.media,
            media_types: input.media_types,
            tags: input.tags,
            issues: input.issues,
            issues_ips: Vec::new(),
            bad_flag: false,
            enabled: false,
            votes: 0,
            voters_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_authored_by(&self, email: &str) -> bool {
        self.author_email == email
    }

    pub fn has_voted(&self, voter: &str) -> bool {
        self.voters_ids.iter().any(|v| v == voter)
    }

    /// Overwrites every editable field and records the reporter IP, if any.
    pub fn apply_edit(&mut self, edit: IdeaEdit, now: DateTime<Utc>) {
        self.summary = edit.summary;
        self.content = edit.content;
        self.media = edit.media;
        self.media_types = edit.media_types;
        self.tags = edit.tags;
        self.issues = edit.issues;
        self.bad_flag = edit.bad_flag;
        self.enabled = edit.enabled;

        if let Some(ip) = edit.ip.as_deref().filter(|ip| !ip.is_empty()) {
            self.record_issue_ip(ip);
        }
        if self.issues_ips.len() >= ISSUE_REPORT_THRESHOLD {
            self.bad_flag = true;
        }
        self.updated_at = now;
    }

    /// Returns `false` when the IP was already on record.
    pub fn record_issue_ip(&mut self, ip: &str) -> bool {
        if self.issues_ips.iter().any(|known| known == ip) {
            return false;
        }
        self.issues_ips.push(ip.to_string());
        true
    }

    /// Adds `voter` to the voters and re-derives the vote counter.
    pub fn register_vote(&mut self, voter: &str, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.is_authored_by(voter) {
            return Err(DomainError::SelfVote);
        }
        if self.has_voted(voter) {
            return Err(DomainError::DuplicateVote);
        }
        self.voters_ids.push(voter.to_string());
        self.votes = self.voters_ids.len() as i64;
        self.updated_at = now;
        Ok(())
    }
}

/// A registered user. The email address doubles as the primary key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub role: Role,
    pub name: String,
    pub country: String,
    pub score: i64,
    pub is_auth: bool,
    #[serde(default)]
    pub auth_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        email: impl Into<String>,
        role: Role,
        name: impl Into<String>,
        country: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: email.into(),
            role,
            name: name.into(),
            country: country.into(),
            score: 0,
            is_auth: false,
            auth_code: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// An empty stored code never matches; signup has not happened yet.
    pub fn auth_code_matches(&self, code: &str) -> bool {
        !self.auth_code.is_empty() && self.auth_code == code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idea_by(author: &str) -> Idea {
        Idea::new(
            NewIdea {
                author_email: author.into(),
                summary: "Solar benches".into(),
                ..NewIdea::default()
            },
            Utc::now(),
        )
    }

    fn edit_from(ip: Option<&str>, bad_flag: bool) -> IdeaEdit {
        IdeaEdit {
            requester_user_email: "a@x.com".into(),
            ip: ip.map(str::to_string),
            bad_flag,
            enabled: true,
            ..IdeaEdit::default()
        }
    }

    #[test]
    fn role_lattice() {
        assert!(Role::Admin.can_administer(Role::Visitor));
        assert!(!Role::Admin.can_administer(Role::Admin));
        assert!(!Role::Visitor.can_administer(Role::Admin));
        assert!(Role::SuperAdmin.can_administer(Role::Admin));
        assert!(Role::SuperAdmin.can_administer(Role::SuperAdmin));
        assert!(Role::Visitor.administers().is_empty());
    }

    #[test]
    fn role_parses_known_names_only() {
        assert_eq!("super_admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert_eq!("visitor".parse::<Role>().unwrap(), Role::Visitor);
        assert!(matches!(
            "root".parse::<Role>(),
            Err(DomainError::PermissionDenied(_))
        ));
    }

    #[test]
    fn role_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Role::SuperAdmin).unwrap(), "\"super_admin\"");
    }

    #[test]
    fn new_idea_starts_disabled_and_unvoted() {
        let idea = idea_by("a@x.com");
        assert!(!idea.enabled);
        assert_eq!(idea.votes, 0);
        assert_eq!(idea.created_at, idea.updated_at);
        assert!(Uuid::parse_str(&idea.id).is_ok());
    }

    #[test]
    fn third_distinct_ip_forces_bad_flag() {
        let mut idea = idea_by("a@x.com");
        for (n, ip) in ["10.0.0.1", "10.0.0.2", "10.0.0.3"].into_iter().enumerate() {
            idea.apply_edit(edit_from(Some(ip), false), Utc::now());
            assert_eq!(idea.bad_flag, n + 1 >= ISSUE_REPORT_THRESHOLD);
        }
        // Caller cannot clear the flag once the threshold is reached.
        idea.apply_edit(edit_from(Some("10.0.0.1"), false), Utc::now());
        assert!(idea.bad_flag);
        assert_eq!(idea.issues_ips.len(), 3);
    }

    #[test]
    fn repeated_ip_is_recorded_once() {
        let mut idea = idea_by("a@x.com");
        idea.apply_edit(edit_from(Some("10.0.0.1"), false), Utc::now());
        idea.apply_edit(edit_from(Some("10.0.0.1"), false), Utc::now());
        assert_eq!(idea.issues_ips, vec!["10.0.0.1".to_string()]);
        assert!(!idea.bad_flag);
    }

    #[test]
    fn ip_match_is_case_sensitive() {
        let mut idea = idea_by("a@x.com");
        assert!(idea.record_issue_ip("fe80::A"));
        assert!(idea.record_issue_ip("fe80::a"));
        assert!(!idea.record_issue_ip("fe80::a"));
    }

    #[test]
    fn edit_without_ip_keeps_reports() {
        let mut idea = idea_by("a@x.com");
        idea.apply_edit(edit_from(None, true), Utc::now());
        assert!(idea.issues_ips.is_empty());
        assert!(idea.bad_flag);
        idea.apply_edit(edit_from(Some(""), false), Utc::now());
        assert!(idea.issues_ips.is_empty());
        assert!(!idea.bad_flag);
    }

    #[test]
    fn vote_rules() {
        let mut idea = idea_by("a@x.com");
        assert!(matches!(
            idea.register_vote("a@x.com", Utc::now()),
            Err(DomainError::SelfVote)
        ));
        idea.register_vote("b@x.com", Utc::now()).unwrap();
        assert_eq!(idea.votes, 1);
        assert!(matches!(
            idea.register_vote("b@x.com", Utc::now()),
            Err(DomainError::DuplicateVote)
        ));
        idea.register_vote("c@x.com", Utc::now()).unwrap();
        assert_eq!(idea.votes, 2);
        assert_eq!(idea.voters_ids, vec!["b@x.com", "c@x.com"]);
    }

    #[test]
    fn empty_auth_code_never_matches() {
        let mut user = User::new("b@x.com", Role::Visitor, "B", "NZ", Utc::now());
        assert!(!user.auth_code_matches(""));
        user.auth_code = "123".into();
        assert!(user.auth_code_matches("123"));
        assert!(!user.auth_code_matches("1234"));
    }
}
