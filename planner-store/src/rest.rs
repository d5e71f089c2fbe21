//! HTTP client for the hosted household database.
//!
//! Speaks the PostgREST dialect: one resource per table under `/rest/v1/`,
//! filters as `column=eq.value` query pairs, and the project key sent both
//! as `apikey` and as a bearer token.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::model::{
    CompletedTask, Meal, MealUpdate, NewCompletion, NewMeal, NewPushSubscription, NewTask,
    NewWish, PushSubscription, Task, TaskDraft, User, UserUpdate, Wish, WishDraft,
};
use crate::store::{
    validate_meal, validate_meal_update, validate_subscription, validate_task, validate_wish,
    DataStore,
};
use crate::week::WeekKey;

const REST_PREFIX: &str = "/rest/v1";

const RETURN_ROW: &str = "return=representation";
const UPSERT_ROW: &str = "resolution=merge-duplicates,return=representation";

/// Configuration for retry with exponential backoff.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Initial delay between retries in milliseconds.
    pub initial_delay_ms: u64,
    /// Maximum delay between retries in milliseconds.
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 200,
            max_delay_ms: 2_000,
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with custom values.
    #[must_use]
    pub const fn new(
        max_attempts: u32,
        initial_delay_ms: u64,
        max_delay_ms: u64,
        multiplier: f64,
    ) -> Self {
        Self {
            max_attempts,
            initial_delay_ms,
            max_delay_ms,
            multiplier,
        }
    }

    /// Calculate the delay before retry `attempt` (0-indexed).
    ///
    /// Uses exponential backoff: `delay = initial * multiplier^attempt`,
    /// capped at `max_delay_ms`.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap
    )]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_delay = self.initial_delay_ms as f64 * self.multiplier.powi(attempt as i32);
        let delay_ms = base_delay.min(self.max_delay_ms as f64).max(0.0) as u64;
        Duration::from_millis(delay_ms)
    }
}

/// Connection settings for [`RestStore`].
#[derive(Clone)]
pub struct StoreConfig {
    /// Project URL, with or without the `/rest/v1` suffix.
    pub base_url: String,
    /// Project API key.
    pub api_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retry policy for transient failures.
    pub retry: RetryConfig,
}

impl StoreConfig {
    /// Settings with the default timeout and retry policy.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(10),
            retry: RetryConfig::default(),
        }
    }

    /// Replace the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

/// [`DataStore`] backed by the hosted REST API.
#[derive(Clone)]
pub struct RestStore {
    inner: Arc<InnerClient>,
}

struct InnerClient {
    http: Client,
    base: Url,
    api_key: String,
    retry: RetryConfig,
}

impl fmt::Debug for RestStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestStore")
            .field("base", &self.inner.base.as_str())
            .finish_non_exhaustive()
    }
}

impl RestStore {
    /// Create a client for the project at `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidUrl`] if the URL is malformed.
    /// Returns [`StoreError::Http`] if the HTTP client fails to build.
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        let mut base =
            Url::parse(&config.base_url).map_err(|e| StoreError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(config.base_url));
        }

        let path = base.path().trim_end_matches('/').to_string();
        if !path.ends_with(REST_PREFIX) {
            base.set_path(&format!("{path}{REST_PREFIX}"));
        }
        base.set_query(None);

        let http = Client::builder()
            .user_agent(concat!("household-planner/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(InnerClient {
                http,
                base,
                api_key: config.api_key,
                retry: config.retry,
            }),
        })
    }

    /// REST root all table URLs hang off.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base
    }

    fn table_url(&self, table: &str, query: &[(&str, String)]) -> Url {
        let mut url = self.inner.base.clone();
        let path = format!("{}/{table}", url.path().trim_end_matches('/'));
        url.set_path(&path);
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        url
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
        prefer: Option<&'static str>,
    ) -> StoreResult<Response> {
        let config = &self.inner.retry;
        let attempts = config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            let mut request = self
                .inner
                .http
                .request(method.clone(), url.clone())
                .header("apikey", &self.inner.api_key)
                .bearer_auth(&self.inner.api_key);
            if let Some(prefer) = prefer {
                request = request.header("Prefer", prefer);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            let error = match request.send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("{} {} -> {}", method, url.path(), response.status());
                    return Ok(response);
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    let body = response.text().await.unwrap_or_default();
                    StoreError::Status { status, body }
                }
                Err(e) => StoreError::Http(e),
            };

            attempt += 1;
            if !error.is_retryable() || attempt >= attempts {
                return Err(error);
            }
            let delay = config.delay_for_attempt(attempt - 1);
            warn!(
                "Store {} {} failed (attempt {}/{}), retrying in {}ms: {}",
                method,
                url.path(),
                attempt,
                attempts,
                delay.as_millis(),
                error
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn select<T>(&self, table: &str, query: &[(&str, String)]) -> StoreResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let url = self.table_url(table, query);
        let response = self.send(Method::GET, url, None, None).await?;
        read_rows(response).await
    }

    async fn insert<B>(&self, table: &str, body: &B) -> StoreResult<Response>
    where
        B: Serialize + Sync,
    {
        let value = serde_json::to_value(body)?;
        let url = self.table_url(table, &[]);
        self.send(Method::POST, url, Some(&value), Some(RETURN_ROW))
            .await
    }

    /// POST `body` and decode the single row the server echoes back.
    async fn insert_row<B, T>(
        &self,
        table: &str,
        query: &[(&str, String)],
        body: &B,
        prefer: &'static str,
    ) -> StoreResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let value = serde_json::to_value(body)?;
        let url = self.table_url(table, query);
        let response = self.send(Method::POST, url, Some(&value), Some(prefer)).await?;
        let rows = read_rows(response).await?;
        first_row(rows).ok_or_else(|| {
            StoreError::UnexpectedResponse(format!("insert into {table} returned no row"))
        })
    }

    async fn update(&self, table: &str, query: &[(&str, String)], body: &Value) -> StoreResult<()> {
        let url = self.table_url(table, query);
        self.send(Method::PATCH, url, Some(body), Some("return=minimal"))
            .await?;
        Ok(())
    }

    /// PATCH the row with `id` and return it as stored.
    async fn update_row<B, T>(&self, table: &'static str, id: Uuid, body: &B) -> StoreResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let value = serde_json::to_value(body)?;
        let url = self.table_url(table, &[("id", eq(id))]);
        let response = self
            .send(Method::PATCH, url, Some(&value), Some(RETURN_ROW))
            .await?;
        let rows = read_rows(response).await?;
        first_row(rows).ok_or(StoreError::NotFound { table, id })
    }

    async fn remove(&self, table: &str, query: &[(&str, String)]) -> StoreResult<()> {
        let url = self.table_url(table, query);
        self.send(Method::DELETE, url, None, None).await?;
        Ok(())
    }
}

async fn read_rows<T: DeserializeOwned>(response: Response) -> StoreResult<Vec<T>> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn first_row<T>(rows: Vec<T>) -> Option<T> {
    rows.into_iter().next()
}

fn eq(value: impl fmt::Display) -> String {
    format!("eq.{value}")
}

fn week_filter(week: WeekKey) -> [(&'static str, String); 2] {
    [
        ("week_number", eq(week.week_number)),
        ("year", eq(week.year)),
    ]
}

#[async_trait]
impl DataStore for RestStore {
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.select(
            "users",
            &[
                ("select", "id,name,avatar_url".to_string()),
                ("order", "name.asc".to_string()),
            ],
        )
        .await
    }

    async fn users_with_pin(&self, pin: &str) -> StoreResult<Vec<User>> {
        self.select(
            "users",
            &[
                ("select", "*".to_string()),
                ("pin", eq(pin)),
                ("limit", "2".to_string()),
            ],
        )
        .await
    }

    async fn update_user(&self, id: Uuid, update: UserUpdate) -> StoreResult<User> {
        self.update_row("users", id, &update).await
    }

    async fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        self.select(
            "tasks",
            &[
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    async fn add_task(&self, task: NewTask) -> StoreResult<Task> {
        validate_task(&task.draft)?;
        let task = NewTask {
            draft: task.draft.normalized(),
            ..task
        };
        self.insert_row("tasks", &[], &task, RETURN_ROW).await
    }

    async fn update_task(&self, id: Uuid, draft: TaskDraft) -> StoreResult<Task> {
        validate_task(&draft)?;
        self.update_row("tasks", id, &draft.normalized()).await
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<()> {
        self.remove("tasks", &[("id", eq(id))]).await
    }

    async fn list_completions(&self, week: WeekKey) -> StoreResult<Vec<CompletedTask>> {
        let [week_number, year] = week_filter(week);
        self.select(
            "completed_tasks",
            &[("select", "*".to_string()), week_number, year],
        )
        .await
    }

    async fn complete_task(&self, completion: NewCompletion) -> StoreResult<()> {
        self.insert("completed_tasks", &completion).await?;
        Ok(())
    }

    async fn uncomplete_task(&self, task_id: Uuid, week: WeekKey) -> StoreResult<()> {
        let [week_number, year] = week_filter(week);
        self.remove(
            "completed_tasks",
            &[("task_id", eq(task_id)), week_number, year],
        )
        .await
    }

    async fn list_meals(&self, week: WeekKey) -> StoreResult<Vec<Meal>> {
        let [week_number, year] = week_filter(week);
        self.select(
            "meals",
            &[
                ("select", "*".to_string()),
                week_number,
                year,
                ("order", "day_of_week.asc".to_string()),
            ],
        )
        .await
    }

    async fn add_meal(&self, meal: NewMeal) -> StoreResult<Meal> {
        validate_meal(&meal)?;
        let meal = NewMeal {
            meal_name: meal.meal_name.trim().to_string(),
            ..meal
        };
        self.insert_row("meals", &[], &meal, RETURN_ROW).await
    }

    async fn update_meal(&self, id: Uuid, update: MealUpdate) -> StoreResult<Meal> {
        validate_meal_update(&update)?;
        let update = MealUpdate {
            meal_name: update.meal_name.trim().to_string(),
            ..update
        };
        self.update_row("meals", id, &update).await
    }

    async fn delete_meal(&self, id: Uuid) -> StoreResult<()> {
        self.remove("meals", &[("id", eq(id))]).await
    }

    async fn list_wishes(&self) -> StoreResult<Vec<Wish>> {
        self.select(
            "wishes",
            &[
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    async fn add_wish(&self, wish: NewWish) -> StoreResult<Wish> {
        validate_wish(&wish.draft)?;
        let wish = NewWish {
            draft: wish.draft.normalized(),
            ..wish
        };
        self.insert_row("wishes", &[], &wish, RETURN_ROW).await
    }

    async fn update_wish(&self, id: Uuid, draft: WishDraft) -> StoreResult<Wish> {
        validate_wish(&draft)?;
        self.update_row("wishes", id, &draft.normalized()).await
    }

    async fn set_wish_completed(
        &self,
        id: Uuid,
        completed: bool,
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let body = json!({
            "is_completed": completed,
            "completed_at": completed.then_some(at),
        });
        self.update("wishes", &[("id", eq(id))], &body).await
    }

    async fn delete_wish(&self, id: Uuid) -> StoreResult<()> {
        self.remove("wishes", &[("id", eq(id))]).await
    }

    async fn save_push_subscription(
        &self,
        subscription: NewPushSubscription,
    ) -> StoreResult<PushSubscription> {
        validate_subscription(&subscription)?;
        self.insert_row(
            "push_subscriptions",
            &[("on_conflict", "endpoint".to_string())],
            &subscription,
            UPSERT_ROW,
        )
        .await
    }

    async fn delete_push_subscription(&self, endpoint: &str) -> StoreResult<()> {
        self.remove("push_subscriptions", &[("endpoint", eq(endpoint))])
            .await
    }
}
