use std::fmt;

/// The kind of an owner, judged by the shape of its name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerKind {
    /// `@org/team`, or `org/team` without the `@`.
    Team,
    /// `@username`.
    User,
    /// `user@example.com`.
    Email,
    Unknown,
}

impl OwnerKind {
    pub fn classify(name: &str) -> OwnerKind {
        let name = name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return OwnerKind::Unknown;
        }

        if let Some(handle) = name.strip_prefix('@') {
            if handle.is_empty() || handle.contains('@') {
                return OwnerKind::Unknown;
            }
            return match handle.split_once('/') {
                Some((org, team)) if is_org_team(org, team) => OwnerKind::Team,
                Some(_) => OwnerKind::Unknown,
                None => OwnerKind::User,
            };
        }

        if let Some((local, domain)) = name.split_once('@') {
            return if !local.is_empty() && !domain.is_empty() && !domain.contains('@') {
                OwnerKind::Email
            } else {
                OwnerKind::Unknown
            };
        }

        match name.split_once('/') {
            Some((org, team)) if is_org_team(org, team) => OwnerKind::Team,
            _ => OwnerKind::Unknown,
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OwnerKind::Team => "team",
            OwnerKind::User => "user",
            OwnerKind::Email => "email",
            OwnerKind::Unknown => "unknown",
        };
        f.pad(name)
    }
}

fn is_org_team(org: &str, team: &str) -> bool {
    !org.is_empty() && !team.is_empty() && !team.contains('/')
}

/// An owner name together with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Owner {
    name: String,
    kind: OwnerKind,
}

impl Owner {
    pub fn new(name: String, kind: OwnerKind) -> Self {
        Self { name, kind }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> OwnerKind {
        self.kind
    }

    /// The GitHub page for this owner. Teams written without an organization
    /// are looked up in `default_org`. Emails and unknown owners have no page.
    pub fn profile_url(&self, default_org: Option<&str>) -> Option<String> {
        let handle = self.name.trim_start_matches('@');
        match self.kind {
            OwnerKind::User => Some(format!("https://github.com/{}", handle)),
            OwnerKind::Team => {
                let (org, team) = handle.split_once('/')?;
                Some(format!("https://github.com/orgs/{}/teams/{}", org, team))
            }
            OwnerKind::Unknown => {
                let org = default_org?;
                let looks_like_team = !handle.is_empty()
                    && !self.name.starts_with('@')
                    && handle.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_');
                looks_like_team.then(|| format!("https://github.com/orgs/{}/teams/{}", org, handle))
            }
            OwnerKind::Email => None,
        }
    }
}

impl From<&str> for Owner {
    fn from(name: &str) -> Self {
        Owner::new(name.to_owned(), OwnerKind::classify(name))
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.name)
    }
}
