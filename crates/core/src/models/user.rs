//! User model

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Study habits a student advertises to potential matches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyPreferences {
    #[serde(default)]
    pub times: Vec<String>,
    #[serde(default)]
    pub location: Vec<String>,
    #[serde(default)]
    pub style: String,
}

/// A stored user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub avatar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub enrolled_courses: Vec<String>,
    #[serde(default)]
    pub study_preferences: StudyPreferences,
}

impl User {
    /// Build a fresh account with no enrollments and empty preferences.
    pub fn new(email: String, name: String, password_hash: String) -> Self {
        let avatar = initials(&name);
        Self {
            id: Utc::now().timestamp_millis(),
            email,
            password_hash,
            name,
            avatar,
            major: None,
            year: None,
            bio: None,
            enrolled_courses: Vec::new(),
            study_preferences: StudyPreferences::default(),
        }
    }

    /// The public view of this account
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            avatar: self.avatar.clone(),
            major: self.major.clone(),
            year: self.year.clone(),
            bio: self.bio.clone(),
            enrolled_courses: self.enrolled_courses.clone(),
            study_preferences: self.study_preferences.clone(),
        }
    }

    /// Shallow merge: only fields present in `updates` change.
    pub fn apply(&mut self, updates: ProfileUpdate) {
        if let Some(name) = updates.name {
            self.name = name;
        }
        if let Some(avatar) = updates.avatar {
            self.avatar = avatar;
        }
        if let Some(major) = updates.major {
            self.major = Some(major);
        }
        if let Some(year) = updates.year {
            self.year = Some(year);
        }
        if let Some(bio) = updates.bio {
            self.bio = Some(bio);
        }
        if let Some(courses) = updates.enrolled_courses {
            self.enrolled_courses = courses;
        }
        if let Some(prefs) = updates.study_preferences {
            self.study_preferences = prefs;
        }
    }
}

/// A user as seen by the rest of the application (no credentials)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub avatar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub enrolled_courses: Vec<String>,
    #[serde(default)]
    pub study_preferences: StudyPreferences,
}

/// Signup form contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl SignupRequest {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            name: name.into(),
            major: None,
            year: None,
            bio: None,
        }
    }
}

/// Partial profile edit; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrolled_courses: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_preferences: Option<StudyPreferences>,
}

/// Uppercase first letter of each whitespace-separated token.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|token| token.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}
