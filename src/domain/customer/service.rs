use super::dto::DEFAULT_PAGE_SIZE;
use super::error::CustomerServiceError;
use super::{BenefitFilters, Benefits, Consumer, ConsumerList, CustomerPage};
use crate::infrastructure::http::{ApiClient, ApiRequest};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Locally held customer list with its pagination cursor
#[derive(Debug, Clone)]
pub struct CustomerListState {
    pub customers: Vec<Value>,
    /// Next page to request when loading more
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
    pub has_more: bool,
}

impl Default for CustomerListState {
    fn default() -> Self {
        Self {
            customers: Vec::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total: 0,
            has_more: true,
        }
    }
}

pub struct CustomerService {
    client: Arc<ApiClient>,
    state: Mutex<CustomerListState>,
    loading: AtomicBool,
    cleared: Mutex<watch::Receiver<u64>>,
}

/// Clears the in-flight flag on every exit path
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl CustomerService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        let cleared = client.session().subscribe_cleared();
        Self {
            client,
            state: Mutex::new(CustomerListState::default()),
            loading: AtomicBool::new(false),
            cleared: Mutex::new(cleared),
        }
    }

    /// Drop the local list if the session was cleared since the last look.
    /// Returns the sign-out epoch seen.
    fn sync_with_session(&self) -> u64 {
        let mut cleared = self.cleared.lock();
        if cleared.has_changed().unwrap_or(false) {
            let epoch = *cleared.borrow_and_update();
            tracing::debug!(epoch, "Session cleared, dropping customer list");
            self.reset();
            return epoch;
        }
        let epoch = *cleared.borrow();
        epoch
    }

    pub fn list_state(&self) -> CustomerListState {
        self.sync_with_session();
        self.state.lock().clone()
    }

    /// Drop a customer from the local list only
    pub fn remove_local_customer(&self, id: &Value) -> bool {
        self.sync_with_session();
        let mut state = self.state.lock();
        match state.customers.iter().position(|c| c.get("id") == Some(id)) {
            Some(index) => {
                state.customers.remove(index);
                state.total = (state.total - 1).max(0);
                true
            }
            None => false,
        }
    }

    pub fn reset(&self) {
        *self.state.lock() = CustomerListState::default();
    }
}

#[async_trait]
pub trait CustomerServiceApi: Send + Sync {
    /// Load the first page, or the next one when `load_more` is set.
    /// `filters` are sent as extra query parameters.
    async fn fetch_customers(
        &self,
        filters: Map<String, Value>,
        load_more: bool,
    ) -> Result<CustomerPage, CustomerServiceError>;

    async fn add_customer(&self, customer: Value) -> Result<Value, CustomerServiceError>;

    async fn update_customer(&self, id: &Value, customer: Value) -> Result<Value, CustomerServiceError>;

    async fn consumers(&self, params: Map<String, Value>) -> Result<ConsumerList, CustomerServiceError>;

    async fn benefits(&self, filters: BenefitFilters) -> Result<Benefits, CustomerServiceError>;
}

#[async_trait]
impl CustomerServiceApi for CustomerService {
    async fn fetch_customers(
        &self,
        filters: Map<String, Value>,
        load_more: bool,
    ) -> Result<CustomerPage, CustomerServiceError> {
        let _in_flight = InFlight::acquire(&self.loading).ok_or(CustomerServiceError::Busy)?;
        let epoch = self.sync_with_session();

        let (page, page_size) = {
            let state = self.state.lock();
            (if load_more { state.page } else { 1 }, state.page_size)
        };

        let request = ApiRequest::get("/customers")
            .param("page", page)
            .param("pageSize", page_size)
            .params(&filters)?;

        let result: Result<CustomerPage, CustomerServiceError> = async {
            let payload = self.client.send(request).await?;
            if payload.is_null() {
                return Ok(CustomerPage::default());
            }
            serde_json::from_value(payload)
                .map_err(|e| CustomerServiceError::Payload(format!("customers: {}", e)))
        }
        .await;

        if self.sync_with_session() != epoch {
            // Signed out while the page was in flight
            return result;
        }

        let mut state = self.state.lock();
        match result {
            Ok(customer_page) => {
                if load_more {
                    state.customers.extend(customer_page.list.iter().cloned());
                    state.page += 1;
                } else {
                    state.customers = customer_page.list.clone();
                    state.page = 2;
                }
                state.total = customer_page.total;
                state.has_more = customer_page.has_more;
                Ok(customer_page)
            }
            Err(e) => {
                if !load_more {
                    state.customers.clear();
                }
                Err(e)
            }
        }
    }

    async fn add_customer(&self, customer: Value) -> Result<Value, CustomerServiceError> {
        let request = ApiRequest::post("/customers")
            .with_loading(true)
            .json(&customer)?;
        let epoch = self.sync_with_session();
        let created = self.client.send(request).await?;
        if self.sync_with_session() != epoch {
            return Ok(created);
        }

        let mut state = self.state.lock();
        state.customers.insert(0, created.clone());
        state.total += 1;
        Ok(created)
    }

    async fn update_customer(&self, id: &Value, customer: Value) -> Result<Value, CustomerServiceError> {
        let id_segment = match id {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return Err(CustomerServiceError::Invalid("customer id must be a string or number".to_string())),
        };
        let request = ApiRequest::put(format!("/customers/{}", urlencoding::encode(&id_segment)))
            .with_loading(true)
            .json(&customer)?;
        let epoch = self.sync_with_session();
        let updated = self.client.send(request).await?;
        if self.sync_with_session() != epoch {
            return Ok(updated);
        }

        let mut state = self.state.lock();
        if let Some(slot) = state.customers.iter_mut().find(|c| c.get("id") == Some(id)) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    async fn consumers(&self, params: Map<String, Value>) -> Result<ConsumerList, CustomerServiceError> {
        let request = ApiRequest::get("/consumers").params(&params)?;
        let payload = self.client.send(request).await?;
        let list = extract_consumers(payload)?;
        tracing::debug!(count = list.consumers.len(), total = list.total, "Consumers loaded");
        Ok(list)
    }

    async fn benefits(&self, filters: BenefitFilters) -> Result<Benefits, CustomerServiceError> {
        let request = ApiRequest::get("/benefits").params(&filters)?;
        let payload = self.client.send(request).await?;
        Ok(extract_benefits(payload)?.unwrap_or_default())
    }
}

fn parse_consumers(items: Value) -> Result<Vec<Consumer>, CustomerServiceError> {
    serde_json::from_value(items).map_err(|e| CustomerServiceError::Payload(format!("consumers: {}", e)))
}

/// Accepts `{users, total}`, `{data: {users, total}}`, `{data: [...]}` and
/// a bare array. Anything else yields an empty list.
pub fn extract_consumers(payload: Value) -> Result<ConsumerList, CustomerServiceError> {
    let total_of = |v: &Value| v.get("total").and_then(Value::as_i64).unwrap_or(0);

    if let Some(users) = payload.get("users").filter(|u| !u.is_null()) {
        return Ok(ConsumerList {
            consumers: parse_consumers(users.clone())?,
            total: total_of(&payload),
        });
    }

    if let Some(data) = payload.get("data") {
        if let Some(users) = data.get("users").filter(|u| !u.is_null()) {
            return Ok(ConsumerList {
                consumers: parse_consumers(users.clone())?,
                total: total_of(data),
            });
        }
        if data.is_array() {
            let consumers = parse_consumers(data.clone())?;
            let total = consumers.len() as i64;
            return Ok(ConsumerList { consumers, total });
        }
    }

    if payload.is_array() {
        let consumers = parse_consumers(payload)?;
        let total = consumers.len() as i64;
        return Ok(ConsumerList { consumers, total });
    }

    tracing::warn!("Unrecognised consumers payload, treating as empty");
    Ok(ConsumerList::default())
}

/// Benefits nested under `data` or at the root; `None` when neither
pub fn extract_benefits(payload: Value) -> Result<Option<Benefits>, CustomerServiceError> {
    let source = match payload.get("data") {
        Some(data) if data.is_object() => data.clone(),
        _ if payload.get("coupons").is_some() || payload.get("privileges").is_some() => payload,
        _ => return Ok(None),
    };

    serde_json::from_value(source)
        .map(Some)
        .map_err(|e| CustomerServiceError::Payload(format!("benefits: {}", e)))
}

/// Card number, when given, is matched alone; otherwise the keyword is
/// matched against phone and card number. Case-insensitive and trimmed.
pub fn filter_consumers(consumers: &[Consumer], keyword: &str, card_number: &str) -> Vec<Consumer> {
    let keyword = keyword.trim().to_lowercase();
    let card_number = card_number.trim().to_lowercase();

    if keyword.is_empty() && card_number.is_empty() {
        return consumers.to_vec();
    }

    consumers
        .iter()
        .filter(|consumer| {
            let phone = consumer.phone.as_deref().unwrap_or_default().to_lowercase();
            let card = consumer.card_number.as_deref().unwrap_or_default().to_lowercase();
            if !card_number.is_empty() {
                card.contains(&card_number)
            } else {
                phone.contains(&keyword) || card.contains(&keyword)
            }
        })
        .cloned()
        .collect()
}
