//! Bundled sample students
//!
//! Inserted into the user repository on first start so a fresh install has
//! accounts to log in with. Sample passwords are hashed when seeding.

use crate::error::Result;
use crate::models::{initials, StudyPreferences, User};
use crate::password::PasswordScheme;
use crate::storage::{StoredUserRepository, UserRepository};

/// Password shared by every sample account
pub const SAMPLE_PASSWORD: &str = "password123";

struct SampleStudent {
    id: i64,
    email: &'static str,
    name: &'static str,
    major: &'static str,
    year: &'static str,
    courses: &'static [&'static str],
    times: &'static [&'static str],
    locations: &'static [&'static str],
    style: &'static str,
}

const SAMPLE_STUDENTS: &[SampleStudent] = &[
    SampleStudent {
        id: 1,
        email: "john.doe@vanderbilt.edu",
        name: "John Doe",
        major: "Computer Science",
        year: "Junior",
        courses: &["CS2201", "MATH2410", "CS3251"],
        times: &["Evening"],
        locations: &["Library"],
        style: "Group Discussion",
    },
    SampleStudent {
        id: 2,
        email: "jane.smith@vanderbilt.edu",
        name: "Jane Smith",
        major: "Mathematics",
        year: "Sophomore",
        courses: &["MATH2410", "CS2201"],
        times: &["Morning", "Afternoon"],
        locations: &["Online", "Library"],
        style: "Problem Solving",
    },
    SampleStudent {
        id: 3,
        email: "alex.chen@vanderbilt.edu",
        name: "Alex Chen",
        major: "Electrical Engineering",
        year: "Senior",
        courses: &["CS3251", "EECE2112"],
        times: &["Afternoon"],
        locations: &["Engineering Building"],
        style: "Quiet Study",
    },
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn build(student: &SampleStudent, scheme: &dyn PasswordScheme) -> Result<User> {
    Ok(User {
        id: student.id,
        email: student.email.to_string(),
        password_hash: scheme.hash(SAMPLE_PASSWORD)?,
        name: student.name.to_string(),
        avatar: initials(student.name),
        major: Some(student.major.to_string()),
        year: Some(student.year.to_string()),
        bio: None,
        enrolled_courses: strings(student.courses),
        study_preferences: StudyPreferences {
            times: strings(student.times),
            location: strings(student.locations),
            style: student.style.to_string(),
        },
    })
}

/// Sample users with freshly hashed passwords
pub fn sample_users(scheme: &dyn PasswordScheme) -> Result<Vec<User>> {
    SAMPLE_STUDENTS.iter().map(|s| build(s, scheme)).collect()
}

/// Add the sample students missing from `users`, hashing only those.
pub fn seed_sample_users(
    users: &StoredUserRepository,
    scheme: &dyn PasswordScheme,
) -> Result<usize> {
    let mut missing = Vec::new();
    for student in SAMPLE_STUDENTS {
        if users.find_by_email(student.email)?.is_none() {
            missing.push(build(student, scheme)?);
        }
    }
    if missing.is_empty() {
        return Ok(0);
    }
    users.seed(missing)
}
