//! Realtime market action listing

use super::client::{decode_json, AuthToken, TurboClient};
use super::models::{ActionRecord, ActionSummary, Market};
use crate::error::{TurboError, TurboResult};

/// Page size the server uses when no cursor is given. Larger listings are
/// truncated at this point.
pub const LIST_PAGE_LIMIT: usize = 500;

impl TurboClient {
    /// Find the UUID of the market whose display name is `market_name`
    pub async fn find_market(&self, token: &AuthToken, market_name: &str) -> TurboResult<String> {
        let resp = self.v3_get(token, "/api/v3/markets").send().await?;
        let markets: Vec<Market> = decode_json(resp, TurboError::Resolution, "Markets").await?;

        markets
            .into_iter()
            .find(|m| m.display_name.as_deref() == Some(market_name))
            .map(|m| m.uuid)
            .ok_or_else(|| TurboError::Resolution(format!("Market '{}' not found", market_name)))
    }

    /// List the actions of `market_name` whose target class is `class_name`
    pub async fn list_actions(&self, market_name: &str, class_name: &str) -> TurboResult<Vec<ActionSummary>> {
        let token = self.login().await?;
        let market_uuid = self.find_market(&token, market_name).await?;

        let resp = self
            .v3_get(&token, &format!("/api/v3/markets/{}/actions", market_uuid))
            .send()
            .await?;
        let actions: Vec<ActionRecord> = decode_json(resp, TurboError::Listing, "Market actions").await?;

        if actions.len() >= LIST_PAGE_LIMIT {
            tracing::warn!(
                "[Turbo] Market {} returned {} actions; listing may be truncated",
                market_name,
                actions.len()
            );
        }

        let summaries = filter_actions(actions, class_name);
        tracing::info!(
            "[Turbo] {} {} actions in market {}",
            summaries.len(),
            class_name,
            market_name
        );
        Ok(summaries)
    }
}

/// Keep actions targeting `class_name`
pub fn filter_actions(actions: Vec<ActionRecord>, class_name: &str) -> Vec<ActionSummary> {
    actions
        .into_iter()
        .filter_map(|action| {
            let target = action.target?;
            if target.class_name.as_deref() != Some(class_name) {
                return None;
            }
            Some(ActionSummary {
                target_uuid: target.uuid.unwrap_or_default(),
                target_name: target.display_name.unwrap_or_default(),
                action: action.details.unwrap_or_default(),
                action_uuid: action.uuid.unwrap_or_default(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turbo::client::tests::test_client;

    const ACTIONS_BODY: &str = r#"[
        {"uuid":"a1","details":"Scale vm-web-01","target":{"className":"VirtualMachine","uuid":"vm-1","displayName":"vm-web-01"}},
        {"uuid":"a2","details":"Move db-01","target":{"className":"Database","uuid":"db-1","displayName":"db-01"}},
        {"uuid":"a3","details":"Resize vm-app-02","target":{"className":"VirtualMachine","uuid":"vm-2","displayName":"vm-app-02"}},
        {"uuid":"a4","details":"Suspend host","target":{"className":"PhysicalMachine","uuid":"pm-1","displayName":"esx-01"}}
    ]"#;

    async fn mock_login(server: &mut mockito::ServerGuard) -> mockito::Mock {
        server
            .mock("POST", "/api/v3/login")
            .with_status(200)
            .with_body(r#"{"authToken":"tok-123"}"#)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_list_actions_filters_by_class() {
        let mut server = mockito::Server::new_async().await;
        mock_login(&mut server).await;
        server
            .mock("GET", "/api/v3/markets")
            .match_header("authorization", "tok-123")
            .with_status(200)
            .with_body(r#"[{"displayName":"Plan 1","uuid":"plan-1"},{"displayName":"Market","uuid":"777"}]"#)
            .create_async()
            .await;
        let actions = server
            .mock("GET", "/api/v3/markets/777/actions")
            .match_header("authorization", "tok-123")
            .with_status(200)
            .with_body(ACTIONS_BODY)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let summaries = client.list_actions("Market", "VirtualMachine").await.unwrap();

        assert_eq!(summaries.len(), 2);
        assert_eq!(
            summaries[0],
            ActionSummary {
                target_uuid: "vm-1".to_string(),
                target_name: "vm-web-01".to_string(),
                action: "Scale vm-web-01".to_string(),
                action_uuid: "a1".to_string(),
            }
        );
        assert_eq!(summaries[1].action_uuid, "a3");
        actions.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_actions_login_failure_stops() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v3/login")
            .with_status(401)
            .create_async()
            .await;
        let markets = server
            .mock("GET", mockito::Matcher::Regex("^/api/v3/markets".to_string()))
            .expect(0)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.list_actions("Market", "VirtualMachine").await.unwrap_err();

        assert!(matches!(err, TurboError::Auth(_)));
        markets.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_actions_unknown_market() {
        let mut server = mockito::Server::new_async().await;
        mock_login(&mut server).await;
        server
            .mock("GET", "/api/v3/markets")
            .with_status(200)
            .with_body(r#"[{"displayName":"Plan 1","uuid":"plan-1"}]"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.list_actions("Market", "VirtualMachine").await.unwrap_err();

        assert!(matches!(err, TurboError::Resolution(_)));
    }

    #[tokio::test]
    async fn test_list_actions_listing_failure() {
        let mut server = mockito::Server::new_async().await;
        mock_login(&mut server).await;
        server
            .mock("GET", "/api/v3/markets")
            .with_status(200)
            .with_body(r#"[{"displayName":"Market","uuid":"777"}]"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/v3/markets/777/actions")
            .with_status(500)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.list_actions("Market", "VirtualMachine").await.unwrap_err();

        assert!(matches!(err, TurboError::Listing(_)));
    }

    #[test]
    fn test_filter_skips_actions_without_target() {
        let actions: Vec<ActionRecord> =
            serde_json::from_str(r#"[{"uuid":"a1","details":"orphan"}]"#).unwrap();
        assert!(filter_actions(actions, "VirtualMachine").is_empty());
    }
}
