//! Memory provider
//!
//! Behaves like the real provider for the parts this crate relies on: paging, token checks and
//! tag-addressed mutations. Every call is recorded and failures can be injected.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::ApiResponse;
use super::DestinationAddress;
use super::Error;
use super::Page;
use super::Provider;
use super::Result;
use super::ResultInfo;
use super::Rule;
use super::TokenStatus;
use super::Zone;

/// Error code used for an unknown or invalid token
pub const AUTHENTICATION_ERROR: i64 = 10000;

/// Kind of failure to inject
#[derive(Clone, Copy, Debug)]
pub enum Fault {
    /// A regular failure response
    Business,

    /// The request never completes
    Timeout,
}

/// Everything the provider knows
#[derive(Debug, Default)]
struct State {
    zones: Vec<Zone>,
    destinations: HashMap<String, Vec<DestinationAddress>>,
    rules: HashMap<String, Vec<Rule>>,
    calls: Vec<String>,
    faults: HashMap<String, Fault>,
    next_tag: u64,
}

/// An in-memory provider
#[derive(Clone, Debug)]
pub struct Memory {
    /// Token this value is bound to
    token: Arc<str>,

    /// The only token the provider accepts
    valid_token: Arc<str>,

    /// Items per page for all lists
    per_page: u32,

    /// Shared state of all clones
    state: Arc<Mutex<State>>,
}

impl Memory {
    /// Create an empty provider accepting a single token
    pub fn new(valid_token: &str) -> Self {
        Self {
            token: Arc::from(valid_token),
            valid_token: Arc::from(valid_token),
            per_page: 20,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Use another page size for all lists
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Add a zone
    pub async fn add_zone(&self, id: &str, name: &str) {
        self.state.lock().await.zones.push(Zone {
            id: id.into(),
            name: name.into(),
            status: Some("active".into()),
        });
    }

    /// Add a destination address to an account
    pub async fn add_destination(&self, account_id: &str, email: &str, verified: bool) {
        let mut state = self.state.lock().await;

        let id = format!("destination-{}", state.next_tag);
        state.next_tag += 1;

        state
            .destinations
            .entry(account_id.into())
            .or_default()
            .push(DestinationAddress {
                id,
                email: email.into(),
                verified: verified.then(Utc::now),
            });
    }

    /// Add a rule to a zone, a tag is assigned when missing
    pub async fn add_rule(&self, zone_id: &str, mut rule: Rule) -> Rule {
        let mut state = self.state.lock().await;

        if rule.tag.is_none() {
            rule.tag = Some(format!("{:032x}", state.next_tag));
            state.next_tag += 1;
        }

        state
            .rules
            .entry(zone_id.into())
            .or_default()
            .push(rule.clone());

        rule
    }

    /// All rules of a zone, without going through the provider interface
    pub async fn rules(&self, zone_id: &str) -> Vec<Rule> {
        self.state
            .lock()
            .await
            .rules
            .get(zone_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Make every call of an operation fail, like `list_zones` or `list_rules:2` for one page
    pub async fn fail(&self, operation: &str, fault: Fault) {
        self.state
            .lock()
            .await
            .faults
            .insert(operation.into(), fault);
    }

    /// All calls made so far, like `list_zones:1`
    pub async fn calls(&self) -> Vec<String> {
        self.state.lock().await.calls.clone()
    }

    /// Record a call and find out how it should end
    async fn enter(&self, operation: &str, page: Option<u32>) -> Result<Option<ApiResponse<()>>> {
        let mut state = self.state.lock().await;

        let call = match page {
            Some(page) => format!("{operation}:{page}"),
            None => operation.to_string(),
        };
        state.calls.push(call.clone());

        let fault = state
            .faults
            .get(&call)
            .or_else(|| state.faults.get(operation))
            .copied();

        match fault {
            Some(Fault::Timeout) => Err(Error::Timeout(format!("{call} timed out"))),
            Some(Fault::Business) => Ok(Some(ApiResponse::failure(
                1000,
                format!("{call} failed"),
            ))),
            None if self.token != self.valid_token => Ok(Some(ApiResponse::failure(
                AUTHENTICATION_ERROR,
                "Authentication error",
            ))),
            None => Ok(None),
        }
    }

    fn page_of<T: Clone>(&self, items: &[T], page: u32) -> ApiResponse<Page<T>> {
        let per_page = self.per_page.max(1);
        let start = usize::try_from((page.max(1) - 1) * per_page).unwrap_or(usize::MAX);
        let end = start.saturating_add(per_page as usize).min(items.len());

        let page_items = items.get(start..end).unwrap_or_default().to_vec();
        let total_count = u32::try_from(items.len()).unwrap_or(u32::MAX);

        ApiResponse::Success {
            result: page_items.clone(),
            result_info: Some(ResultInfo {
                page,
                per_page,
                count: u32::try_from(page_items.len()).unwrap_or(u32::MAX),
                total_count,
            }),
        }
        .into_page(page)
    }
}

/// Forward an early response of [`Memory::enter`] as a response of another type
fn reject<T>(response: ApiResponse<()>) -> ApiResponse<T> {
    match response {
        ApiResponse::Failure { errors } => ApiResponse::Failure { errors },
        ApiResponse::Success { .. } => ApiResponse::failure(0, "Unexpected success"),
    }
}

fn same_literal(left: &Rule, right: &Rule) -> bool {
    left.matchers.iter().any(|matcher| {
        matcher
            .value
            .as_deref()
            .is_some_and(|value| right.matches_address(value))
    })
}

#[async_trait]
impl Provider for Memory {
    fn with_token(&self, token: &str) -> Self {
        Self {
            token: Arc::from(token),
            valid_token: Arc::clone(&self.valid_token),
            per_page: self.per_page,
            state: Arc::clone(&self.state),
        }
    }

    async fn list_zones(&self, page: u32) -> Result<ApiResponse<Page<Zone>>> {
        if let Some(response) = self.enter("list_zones", Some(page)).await? {
            return Ok(reject(response));
        }

        let state = self.state.lock().await;

        Ok(self.page_of(&state.zones, page))
    }

    async fn list_destinations(
        &self,
        account_id: &str,
        page: u32,
    ) -> Result<ApiResponse<Page<DestinationAddress>>> {
        if let Some(response) = self.enter("list_destinations", Some(page)).await? {
            return Ok(reject(response));
        }

        let state = self.state.lock().await;
        let destinations = state
            .destinations
            .get(account_id)
            .map(Vec::as_slice)
            .unwrap_or_default();

        Ok(self.page_of(destinations, page))
    }

    async fn list_rules(&self, zone_id: &str, page: u32) -> Result<ApiResponse<Page<Rule>>> {
        if let Some(response) = self.enter("list_rules", Some(page)).await? {
            return Ok(reject(response));
        }

        let state = self.state.lock().await;
        let rules = state
            .rules
            .get(zone_id)
            .map(Vec::as_slice)
            .unwrap_or_default();

        Ok(self.page_of(rules, page))
    }

    async fn create_rule(&self, zone_id: &str, rule: &Rule) -> Result<ApiResponse<Rule>> {
        if let Some(response) = self.enter("create_rule", None).await? {
            return Ok(reject(response));
        }

        if !self.state.lock().await.zones.iter().any(|zone| zone.id == zone_id) {
            return Ok(ApiResponse::failure(1001, "Unknown zone"));
        }

        let duplicate = self
            .rules(zone_id)
            .await
            .iter()
            .any(|existing| same_literal(existing, rule));

        if duplicate {
            return Ok(ApiResponse::failure(
                2020,
                "Rule with the same matcher already exists",
            ));
        }

        let created = self
            .add_rule(
                zone_id,
                Rule {
                    tag: None,
                    ..rule.clone()
                },
            )
            .await;

        Ok(ApiResponse::success(created))
    }

    async fn update_rule(&self, zone_id: &str, rule: &Rule) -> Result<ApiResponse<Rule>> {
        let tag = rule.tag.as_deref().ok_or(Error::MissingTag)?;

        if let Some(response) = self.enter("update_rule", None).await? {
            return Ok(reject(response));
        }

        let mut state = self.state.lock().await;
        let existing = state
            .rules
            .get_mut(zone_id)
            .and_then(|rules| {
                rules
                    .iter_mut()
                    .find(|candidate| candidate.tag.as_deref() == Some(tag))
            });

        if let Some(existing) = existing {
            *existing = rule.clone();

            Ok(ApiResponse::success(rule.clone()))
        } else {
            Ok(ApiResponse::failure(1005, "Rule not found"))
        }
    }

    async fn delete_rule(&self, zone_id: &str, rule: &Rule) -> Result<ApiResponse<Rule>> {
        let tag = rule.tag.as_deref().ok_or(Error::MissingTag)?;

        if let Some(response) = self.enter("delete_rule", None).await? {
            return Ok(reject(response));
        }

        let mut state = self.state.lock().await;
        let Some(rules) = state.rules.get_mut(zone_id) else {
            return Ok(ApiResponse::failure(1005, "Rule not found"));
        };

        if let Some(position) = rules
            .iter()
            .position(|candidate| candidate.tag.as_deref() == Some(tag))
        {
            Ok(ApiResponse::success(rules.remove(position)))
        } else {
            Ok(ApiResponse::failure(1005, "Rule not found"))
        }
    }

    async fn verify_credential(&self, token: &str) -> Result<ApiResponse<TokenStatus>> {
        self.state
            .lock()
            .await
            .calls
            .push("verify_credential".into());

        if token == &*self.valid_token {
            Ok(ApiResponse::success(TokenStatus {
                id: "memory".into(),
                status: "active".into(),
            }))
        } else {
            Ok(ApiResponse::failure(1000, "Invalid API Token"))
        }
    }
}
