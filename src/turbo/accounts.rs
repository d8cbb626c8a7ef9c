//! Per cloud account action report
//!
//! Walks every discovered business unit that has a related target and pages
//! through its current actions using the `X-Next-Cursor` header. A page that
//! keeps failing is narrowed down to single items so one bad action only
//! costs one row, and that row's cursor is reported back.

use reqwest::StatusCode;

use super::client::{decode_json, AuthToken, TurboClient};
use super::models::{
    AccountActionRow, AccountActions, AccountEntry, ActionRecord, BusinessUnit, CloudAccount,
    SavingsKind, Stat,
};
use crate::error::{TurboError, TurboResult};

const NEXT_CURSOR_HEADER: &str = "x-next-cursor";

/// Page size and give-up point for the account listing
#[derive(Debug, Clone, Copy)]
pub struct AccountPaging {
    pub page_size: u32,
    /// Skips in a row, with no successful page between them, before the
    /// account is abandoned with an error
    pub max_consecutive_skips: u32,
}

impl Default for AccountPaging {
    fn default() -> Self {
        Self {
            page_size: 20,
            max_consecutive_skips: 5,
        }
    }
}

impl TurboClient {
    /// Collect current actions for every discovered cloud account
    pub async fn account_actions(&self, paging: AccountPaging) -> TurboResult<Vec<AccountActions>> {
        let token = self.login().await?;
        let accounts = self.discovered_accounts(&token).await?;

        tracing::info!("[Turbo] {} cloud accounts with related targets", accounts.len());

        let mut report = Vec::with_capacity(accounts.len());
        for account in accounts {
            report.push(self.collect_account_actions(&token, account, paging).await?);
        }
        Ok(report)
    }

    async fn discovered_accounts(&self, token: &AuthToken) -> TurboResult<Vec<CloudAccount>> {
        let resp = self
            .v3_get(token, "/api/v3/businessunits")
            .query(&[("type", "DISCOVERED")])
            .send()
            .await?;
        let units: Vec<BusinessUnit> = decode_json(resp, TurboError::Listing, "Business units").await?;

        Ok(units
            .into_iter()
            .filter(|bu| bu.has_related_target)
            .map(|bu| {
                let name = bu
                    .targets
                    .first()
                    .and_then(|t| t.display_name.clone())
                    .or(bu.display_name)
                    .unwrap_or_default();
                CloudAccount {
                    name,
                    cloud_type: bu.cloud_type.unwrap_or_default(),
                    account_id: bu.uuid,
                }
            })
            .collect())
    }

    async fn collect_account_actions(
        &self,
        token: &AuthToken,
        account: CloudAccount,
        paging: AccountPaging,
    ) -> TurboResult<AccountActions> {
        let page_size = paging.page_size.max(1);
        let mut limit = page_size;
        let mut cursor = "0".to_string();
        let mut entries = Vec::new();
        let mut consecutive_skips = 0;

        loop {
            let page = self
                .fetch_account_page(token, &account.account_id, limit, &cursor)
                .await;
            match page {
                Ok((records, next)) => {
                    entries.extend(records.iter().map(|r| AccountEntry::Action(account_row(r))));
                    limit = page_size;
                    consecutive_skips = 0;
                    match next {
                        Some(next) if !next.is_empty() && next != cursor => cursor = next,
                        _ => break,
                    }
                }
                // Stepping cannot help with these
                Err(e @ (TurboError::Transport(_) | TurboError::Auth(_) | TurboError::Resolution(_))) => {
                    return Err(e)
                }
                Err(e) if limit > 1 => {
                    tracing::warn!(
                        "[Turbo] Account {} page at cursor {} failed ({}), stepping one item at a time",
                        account.account_id,
                        cursor,
                        e
                    );
                    limit = 1;
                }
                Err(e) => {
                    consecutive_skips += 1;
                    if consecutive_skips > paging.max_consecutive_skips {
                        return Err(TurboError::Listing(format!(
                            "Account {}: giving up at cursor {} after {} consecutive skipped items: {}",
                            account.account_id, cursor, paging.max_consecutive_skips, e
                        )));
                    }
                    tracing::warn!(
                        "[Turbo] Account {} skipping action at cursor {}: {}",
                        account.account_id,
                        cursor,
                        e
                    );
                    let next = step_cursor(&cursor)?;
                    entries.push(AccountEntry::Skipped {
                        cursor: std::mem::replace(&mut cursor, next),
                    });
                    limit = page_size;
                }
            }
        }

        let result = AccountActions { account, entries };
        tracing::debug!(
            "[Turbo] Account {}: {} actions, {} skipped",
            result.account.account_id,
            result.actions().count(),
            result.skipped().count()
        );
        Ok(result)
    }

    async fn fetch_account_page(
        &self,
        token: &AuthToken,
        account_id: &str,
        limit: u32,
        cursor: &str,
    ) -> TurboResult<(Vec<ActionRecord>, Option<String>)> {
        let limit = limit.to_string();
        let resp = self
            .v3_get(token, &format!("/api/v3/businessunits/{}/actions", account_id))
            .query(&[
                ("limit", limit.as_str()),
                ("cursor", cursor),
                ("ascending", "false"),
            ])
            .send()
            .await?;

        match resp.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(TurboError::Auth(format!(
                    "Account actions for {} returned {}",
                    account_id,
                    resp.status()
                )))
            }
            StatusCode::NOT_FOUND => {
                return Err(TurboError::Resolution(format!(
                    "Business unit {} not found",
                    account_id
                )))
            }
            _ => {}
        }

        let next = resp
            .headers()
            .get(NEXT_CURSOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string());

        let records: Vec<ActionRecord> = decode_json(resp, TurboError::Listing, "Account actions").await?;
        Ok((records, next))
    }
}

fn step_cursor(cursor: &str) -> TurboResult<String> {
    cursor
        .parse::<u64>()
        .map(|c| (c + 1).to_string())
        .map_err(|_| TurboError::Listing(format!("Cannot step past non-numeric cursor '{}'", cursor)))
}

fn account_row(action: &ActionRecord) -> AccountActionRow {
    let (kind, amount) = match savings_amount(&action.stats) {
        Some(amount) if amount < 0.0 => (Some(SavingsKind::Investment), Some(amount)),
        Some(amount) => (Some(SavingsKind::Savings), Some(amount)),
        None => (None, None),
    };
    let target = action.target.as_ref();

    AccountActionRow {
        kind,
        amount,
        target_name: target.and_then(|t| t.display_name.clone()).unwrap_or_default(),
        target_uuid: target.and_then(|t| t.uuid.clone()).unwrap_or_default(),
        details: action.details.clone().unwrap_or_default(),
        reason: action
            .risk
            .as_ref()
            .and_then(|r| r.description.clone())
            .unwrap_or_default(),
    }
}

/// `costPrice` stat filtered by `savingsType`, if the action carries one
pub fn savings_amount(stats: &[Stat]) -> Option<f64> {
    stats
        .iter()
        .filter(|s| s.name.as_deref() == Some("costPrice"))
        .filter(|s| {
            s.filters
                .first()
                .and_then(|f| f.filter_type.as_deref())
                == Some("savingsType")
        })
        .filter_map(Stat::numeric_value)
        .last()
}
