//! Study group endpoints

use serde_json::Value;

use crate::client::{ApiClient, Filters};
use crate::error::Result;
use crate::protocol::{GroupUpdate, NewStudyGroup, StudyGroup};

impl ApiClient {
    /// `GET /groups` with optional filters
    pub async fn groups(&self, filters: &Filters) -> Result<Vec<StudyGroup>> {
        self.get_filtered("/groups", filters).await
    }

    /// `GET /groups/:id`
    pub async fn group(&self, group_id: i64) -> Result<StudyGroup> {
        self.get(&format!("/groups/{}", group_id)).await
    }

    /// `POST /groups`
    pub async fn create_group(&self, group: &NewStudyGroup) -> Result<StudyGroup> {
        self.post("/groups", group).await
    }

    /// `PATCH /groups/:id` (owner only)
    pub async fn update_group(&self, group_id: i64, updates: &GroupUpdate) -> Result<StudyGroup> {
        self.patch(&format!("/groups/{}", group_id), updates).await
    }

    /// `DELETE /groups/:id` (owner only)
    pub async fn delete_group(&self, group_id: i64) -> Result<Value> {
        self.delete(&format!("/groups/{}", group_id)).await
    }

    /// `POST /groups/:id/join`
    pub async fn join_group(&self, group_id: i64) -> Result<Value> {
        self.post_empty(&format!("/groups/{}/join", group_id)).await
    }

    /// `DELETE /groups/:id/leave`
    pub async fn leave_group(&self, group_id: i64) -> Result<Value> {
        self.delete(&format!("/groups/{}/leave", group_id)).await
    }

    /// `GET /users/groups`
    pub async fn my_groups(&self) -> Result<Vec<StudyGroup>> {
        self.get("/users/groups").await
    }
}
