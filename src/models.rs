use serde::{Deserialize, Serialize};

use crate::auth::Profile;
use crate::error::FieldViolation;
use crate::validation::{Validate, Violations};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        Violations::new()
            .email("email", &self.email)
            .required("password", &self.password)
            .max_len("password", &self.password, 256)
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
    pub user: Profile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    pub logged_out: bool,
}

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl Validate for ContactRequest {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut violations = Violations::new();
        violations
            .required("name", &self.name)
            .max_len("name", &self.name, 100)
            .email("email", &self.email)
            .min_len("message", self.message.trim(), 10)
            .max_len("message", &self.message, 5_000);
        if let Some(company) = &self.company {
            violations.max_len("company", company, 100);
        }
        violations.finish()
    }
}

#[derive(Debug, Serialize)]
pub struct ContactReceipt {
    pub received: bool,
}

// partial update: absent fields stay as they are
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
}

impl Validate for ProfileUpdate {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut violations = Violations::new();
        if self.name.is_none() && self.company.is_none() && self.phone.is_none() && self.bio.is_none()
        {
            return Err(vec![FieldViolation::new("body", "no fields to update")]);
        }
        if let Some(name) = &self.name {
            violations.required("name", name).max_len("name", name, 100);
        }
        if let Some(company) = &self.company {
            violations.max_len("company", company, 100);
        }
        if let Some(phone) = &self.phone {
            violations.max_len("phone", phone, 32);
            if !phone
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
            {
                violations.push("phone", "contains invalid characters");
            }
        }
        if let Some(bio) = &self.bio {
            violations.max_len("bio", bio, 1_000);
        }
        violations.finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const MAX_LIMIT: u32 = 50;

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceOffering {
    pub slug: &'static str,
    pub name: &'static str,
    pub summary: &'static str,
}
