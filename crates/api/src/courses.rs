//! Course and matching endpoints

use serde_json::Value;
use urlencoding::encode;

use crate::client::{ApiClient, Filters};
use crate::error::Result;
use crate::protocol::{Course, StudentMatch};

impl ApiClient {
    /// `GET /courses` with optional filters
    pub async fn courses(&self, filters: &Filters) -> Result<Vec<Course>> {
        self.get_filtered("/courses", filters).await
    }

    /// `GET /courses/:id`
    pub async fn course(&self, course_id: &str) -> Result<Course> {
        self.get(&format!("/courses/{}", encode(course_id))).await
    }

    /// `POST /courses/:id/enroll`
    pub async fn enroll(&self, course_id: &str) -> Result<Value> {
        self.post_empty(&format!("/courses/{}/enroll", encode(course_id)))
            .await
    }

    /// `DELETE /courses/:id/unenroll`
    pub async fn unenroll(&self, course_id: &str) -> Result<Value> {
        self.delete(&format!("/courses/{}/unenroll", encode(course_id)))
            .await
    }

    /// `GET /users/courses`
    pub async fn my_courses(&self) -> Result<Vec<Course>> {
        self.get("/users/courses").await
    }

    /// `GET /matches`: students sharing courses with the current user
    pub async fn matches(&self, filters: &Filters) -> Result<Vec<StudentMatch>> {
        self.get_filtered("/matches", filters).await
    }
}
