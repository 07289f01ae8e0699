use std::path::Path;

use anyhow::Context;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use super::password::{decoy_check, verify_password};

#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsersFile {
    #[serde(default)]
    users: Vec<UserRecord>,
}

// what the profile area shows; never carries the hash
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
}

impl From<&UserRecord> for Profile {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id.clone(),
            email: record.email.clone(),
            name: record.name.clone(),
            company: record.company.clone(),
            phone: record.phone.clone(),
            bio: record.bio.clone(),
        }
    }
}

// In-memory account store, keyed by id with a lowercase email index
#[derive(Default)]
pub struct UserDirectory {
    by_id: DashMap<String, UserRecord>,
    email_index: DashMap<String, String>,
}

impl UserDirectory {
    pub fn new(records: impl IntoIterator<Item = UserRecord>) -> Self {
        let directory = Self::default();
        for record in records {
            directory.insert(record);
        }
        directory
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading users file {}", path.display()))?;
        let file: UsersFile = toml::from_str(&contents)
            .with_context(|| format!("parsing users file {}", path.display()))?;
        Ok(Self::new(file.users))
    }

    pub fn insert(&self, record: UserRecord) {
        self.email_index
            .insert(record.email.to_lowercase(), record.id.clone());
        self.by_id.insert(record.id.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    // argon2 is slow on purpose: call from spawn_blocking
    pub fn authenticate(&self, email: &str, password: &str) -> anyhow::Result<Option<Profile>> {
        let Some(id) = self
            .email_index
            .get(&email.trim().to_lowercase())
            .map(|id| id.clone())
        else {
            // unknown emails cost the same as wrong passwords
            decoy_check(password);
            return Ok(None);
        };
        let Some(record) = self.by_id.get(&id).map(|r| r.clone()) else {
            decoy_check(password);
            return Ok(None);
        };

        if verify_password(&record.password_hash, password)? {
            Ok(Some(Profile::from(&record)))
        } else {
            Ok(None)
        }
    }

    pub fn profile(&self, id: &str) -> Option<Profile> {
        self.by_id.get(id).map(|record| Profile::from(record.value()))
    }

    pub fn update_profile(&self, id: &str, apply: impl FnOnce(&mut UserRecord)) -> Option<Profile> {
        let mut record = self.by_id.get_mut(id)?;
        apply(record.value_mut());
        Some(Profile::from(record.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;

    fn jane() -> UserRecord {
        UserRecord {
            id: "u1".into(),
            email: "Jane@Example.com".into(),
            name: "Jane".into(),
            password_hash: hash_password("s3cret-pass").unwrap(),
            company: None,
            phone: None,
            bio: None,
        }
    }

    #[test]
    fn authenticates_case_insensitive_email() {
        let users = UserDirectory::new([jane()]);
        let profile = users.authenticate("jane@example.com", "s3cret-pass").unwrap();
        assert_eq!(profile.unwrap().id, "u1");
    }

    #[test]
    fn email_is_not_a_password() {
        let users = UserDirectory::new([jane()]);
        assert!(users.authenticate("jane@example.com", "jane@example.com").unwrap().is_none());
        assert!(users.authenticate("nobody@example.com", "x").unwrap().is_none());
    }

    #[test]
    fn unknown_email_costs_a_hash_check() {
        let users = UserDirectory::new([jane()]);

        let started = std::time::Instant::now();
        assert!(users.authenticate("jane@example.com", "wrong").unwrap().is_none());
        let known = started.elapsed();

        let started = std::time::Instant::now();
        assert!(users.authenticate("ghost@example.com", "wrong").unwrap().is_none());
        let unknown = started.elapsed();

        assert!(unknown * 4 >= known, "unknown {unknown:?} vs known {known:?}");
    }

    #[test]
    fn parses_users_file() {
        let file: UsersFile = toml::from_str(
            r#"
            [[users]]
            id = "u1"
            email = "a@b.co"
            name = "A"
            password_hash = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA"
            company = "Acme"
            "#,
        )
        .unwrap();
        assert_eq!(file.users.len(), 1);
        assert_eq!(file.users[0].company.as_deref(), Some("Acme"));
    }
}
