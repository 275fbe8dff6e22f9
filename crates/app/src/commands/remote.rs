//! Commands that talk to the backend API

use classmatch_api::Filters;

use crate::error::Result;
use crate::state::AppState;

pub async fn courses(state: &AppState, filters: Filters) -> Result<String> {
    let courses = state.api.courses(&filters).await?;
    if courses.is_empty() {
        return Ok("No courses found".to_string());
    }
    Ok(courses
        .iter()
        .map(|c| match &c.instructor {
            Some(instructor) => format!("{:<10} {} ({})", c.code, c.name, instructor),
            None => format!("{:<10} {}", c.code, c.name),
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

pub async fn matches(state: &AppState, filters: Filters) -> Result<String> {
    let matches = state.api.matches(&filters).await?;
    if matches.is_empty() {
        return Ok("No matches yet".to_string());
    }
    Ok(matches
        .iter()
        .map(|m| {
            format!(
                "[{}] {} <{}> shares {}",
                m.user.avatar,
                m.user.name,
                m.user.email,
                m.shared_courses.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

pub async fn groups(state: &AppState, filters: Filters) -> Result<String> {
    let groups = state.api.groups(&filters).await?;
    if groups.is_empty() {
        return Ok("No study groups found".to_string());
    }
    Ok(groups
        .iter()
        .map(|g| format!("#{:<4} {} [{}]", g.id, g.name, g.course_id))
        .collect::<Vec<_>>()
        .join("\n"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use classmatch_core::{Argon2Config, Config, MemoryStore};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn state_for(server: &MockServer) -> AppState {
        let config = Config {
            api_base_url: server.uri(),
            seed_sample_users: false,
            argon2: Argon2Config {
                memory_kib: 8,
                iterations: 1,
                parallelism: 1,
            },
            ..Config::default()
        };
        AppState::with_store(config, Arc::new(MemoryStore::new()), std::env::temp_dir()).unwrap()
    }

    #[tokio::test]
    async fn test_courses_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/courses"))
            .and(query_param("term", "Fall"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "CS2201", "code": "CS 2201", "name": "Program Design", "instructor": "Dr. Roth"},
                {"id": "MATH2410", "code": "MATH 2410", "name": "Linear Algebra"}
            ])))
            .mount(&server)
            .await;

        let state = state_for(&server);
        let mut filters = Filters::new();
        filters.insert("term".into(), "Fall".into());

        let out = courses(&state, filters).await.unwrap();
        assert_eq!(
            out,
            "CS 2201    Program Design (Dr. Roth)\nMATH 2410  Linear Algebra"
        );
    }

    #[tokio::test]
    async fn test_backend_error_surfaces_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/groups"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"message": "Token expired"})),
            )
            .mount(&server)
            .await;

        let state = state_for(&server);
        let err = groups(&state, Filters::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "Token expired");
    }
}
