//! Cloud account target lookup and credential rotation

use serde_json::Value;

use super::client::{decode_json, TurboClient};
use super::models::{AwsKeys, SearchMatch, TargetUpdate};
use crate::error::{TurboError, TurboResult};

const BUSINESS_ACCOUNT_TYPE: &str = "BusinessAccount";

impl TurboClient {
    /// Find the target UUID behind a cloud account ID.
    ///
    /// Takes the first search match and its first target; anything else in
    /// the response is ignored.
    pub async fn resolve_account_target(&self, account_id: &str) -> TurboResult<String> {
        let resp = self
            .classic_get("/vmturbo/rest/search")
            .query(&[("q", account_id), ("types", BUSINESS_ACCOUNT_TYPE)])
            .send()
            .await?;

        let matches: Vec<SearchMatch> = decode_json(resp, TurboError::Resolution, "Search").await?;

        let uuid = matches
            .into_iter()
            .next()
            .and_then(|m| m.targets)
            .and_then(|targets| targets.into_iter().next())
            .and_then(|t| t.uuid)
            .filter(|uuid| !uuid.is_empty())
            .ok_or_else(|| {
                TurboError::Resolution(format!("No {} target found for {}", BUSINESS_ACCOUNT_TYPE, account_id))
            })?;

        tracing::info!("[Turbo] Account {} resolved to target {}", account_id, uuid);
        Ok(uuid)
    }

    /// Send a target update and hand back the decoded response body
    pub async fn update_target(&self, update: &TargetUpdate) -> TurboResult<Value> {
        let resp = self
            .classic_put(&format!("/vmturbo/rest/targets/{}", update.uuid))
            .json(update)
            .send()
            .await?;

        let body: Value = decode_json(resp, TurboError::Update, "Target update").await?;

        tracing::info!("[Turbo] Target {} updated", update.uuid);
        Ok(body)
    }

    /// Rotate the access/secret key pair of the AWS target for `account_id`
    pub async fn apply_credentials(&self, account_id: &str, keys: &AwsKeys) -> TurboResult<Value> {
        let uuid = self.resolve_account_target(account_id).await?;
        let update = TargetUpdate::aws_keys(&uuid, keys);
        self.update_target(&update).await
    }
}
