//! Direct messaging endpoints

use crate::client::ApiClient;
use crate::error::Result;
use crate::protocol::{ChatMessage, Conversation, SendMessage};

impl ApiClient {
    /// `POST /messages`
    pub async fn send_message(&self, recipient_id: i64, message: &str) -> Result<ChatMessage> {
        self.post(
            "/messages",
            &SendMessage {
                recipient_id,
                message,
            },
        )
        .await
    }

    /// `GET /messages/:conversationId`
    pub async fn messages(&self, conversation_id: i64) -> Result<Vec<ChatMessage>> {
        self.get(&format!("/messages/{}", conversation_id)).await
    }

    /// `GET /messages/conversations`
    pub async fn conversations(&self) -> Result<Vec<Conversation>> {
        self.get("/messages/conversations").await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::test_support::client_for;

    #[tokio::test]
    async fn test_send_message_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(body_json(json!({"recipientId": 2, "message": "Study tonight?"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 10,
                "senderId": 1,
                "recipientId": 2,
                "message": "Study tonight?",
                "createdAt": "2025-03-01T18:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (_, client) = client_for(&server);
        let sent = client.send_message(2, "Study tonight?").await.unwrap();
        assert_eq!(sent.id, 10);
        assert!(!sent.read);
    }

    #[tokio::test]
    async fn test_conversations_route_is_not_a_conversation_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/messages/conversations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 3, "participantId": 2, "unreadCount": 1}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let (_, client) = client_for(&server);
        let conversations = client.conversations().await.unwrap();
        assert_eq!(conversations[0].unread_count, 1);
        assert!(conversations[0].last_message.is_none());
    }
}
