use serde::{Deserialize, Deserializer, Serialize};

/// Default graduation year when onboarding leaves it blank or unparseable.
pub const DEFAULT_YEAR: i32 = 2024;

/// Signed-in user as returned by `login` / `fetch_profile` (profile fields flattened).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "flag")]
    pub onboarded: bool,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub college: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "skill_list")]
    pub skills: Vec<String>,
    #[serde(default)]
    pub photo: Option<String>,
}

impl User {
    /// Merges saved profile fields into the local record and marks it onboarded.
    pub fn apply_profile(&mut self, profile: &Profile) {
        self.name = profile.name.clone();
        self.phone = Some(profile.phone.clone());
        self.college = Some(profile.college.clone());
        self.year = Some(profile.year);
        self.skills = split_skills(&profile.skills);
        if profile.photo.is_some() {
            self.photo = profile.photo.clone();
        }
        self.onboarded = true;
    }
}

/// Profile fields as sent to `/profile/save`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub name: String,
    pub phone: String,
    pub college: String,
    pub year: i32,
    /// Comma-separated, as typed by the user.
    pub skills: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl Profile {
    /// Parses a free-form year field, falling back to `DEFAULT_YEAR`.
    pub fn parse_year(raw: &str) -> i32 {
        raw.trim().parse().unwrap_or(DEFAULT_YEAR)
    }
}

/// Backend analysis of an uploaded resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    pub session_id: String,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// A past result as stored by `/results/save`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub scores: serde_json::Value,
    #[serde(default)]
    pub feedback: Vec<String>,
}

pub fn split_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// The backend stores `onboarded` as 0/1; accept either that or a bool.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }
    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(n)) => n != 0,
        None => false,
    })
}

/// Skills arrive as a list after upload but as a comma string after profile save.
fn skill_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Skills {
        List(Vec<String>),
        Text(String),
    }
    Ok(match Option::<Skills>::deserialize(deserializer)? {
        Some(Skills::List(list)) => list,
        Some(Skills::Text(text)) => split_skills(&text),
        None => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_accepts_integer_onboarded_and_text_skills() {
        let json = r#"{"user_id":"u1","email":"a@b.c","name":"Ada","onboarded":1,"skills":"Rust, SQL ,"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.onboarded);
        assert_eq!(user.skills, vec!["Rust", "SQL"]);
    }

    #[test]
    fn test_user_accepts_list_skills_and_missing_fields() {
        let json = r#"{"user_id":"u2","skills":["Python"],"onboarded":false}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(!user.onboarded);
        assert_eq!(user.skills, vec!["Python"]);
        assert!(user.phone.is_none());
    }

    #[test]
    fn test_parse_year_fallback() {
        assert_eq!(Profile::parse_year("2026"), 2026);
        assert_eq!(Profile::parse_year("soon"), DEFAULT_YEAR);
        assert_eq!(Profile::parse_year(""), DEFAULT_YEAR);
    }

    #[test]
    fn test_apply_profile_marks_onboarded() {
        let mut user = User {
            user_id: "u1".into(),
            ..Default::default()
        };
        user.apply_profile(&Profile {
            user_id: "u1".into(),
            name: "Grace".into(),
            phone: "".into(),
            college: "MIT".into(),
            year: 2025,
            skills: "COBOL, Compilers".into(),
            photo: None,
        });
        assert!(user.onboarded);
        assert_eq!(user.name, "Grace");
        assert_eq!(user.skills.len(), 2);
    }
}
