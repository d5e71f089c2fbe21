//! The [`DataStore`] seam and its in-memory implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::model::{
    CompletedTask, Meal, MealUpdate, NewCompletion, NewMeal, NewPushSubscription, NewTask,
    NewWish, PushSubscription, Task, TaskDraft, User, UserUpdate, Wish, WishDraft,
};
use crate::week::WeekKey;

/// Result of a PIN login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Exactly one member has this PIN.
    LoggedIn(User),
    /// No member has this PIN.
    NoMatch,
    /// More than one member shares the PIN, so it identifies nobody.
    Ambiguous,
}

/// Persistent household records.
///
/// Implemented by [`RestStore`](crate::RestStore) against the hosted
/// database and by [`InMemoryStore`] for tests and offline tooling.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// All household members.
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Members with this PIN; at most two are returned.
    async fn users_with_pin(&self, pin: &str) -> StoreResult<Vec<User>>;

    /// Log in with a PIN.
    ///
    /// # Errors
    ///
    /// Returns the store error if the lookup fails.
    async fn login(&self, pin: &str) -> StoreResult<LoginOutcome> {
        let mut users = self.users_with_pin(pin).await?;
        Ok(match users.len() {
            0 => LoginOutcome::NoMatch,
            1 => LoginOutcome::LoggedIn(users.remove(0)),
            _ => LoginOutcome::Ambiguous,
        })
    }

    /// Change a member's profile and return the stored record.
    async fn update_user(&self, id: Uuid, update: UserUpdate) -> StoreResult<User>;

    /// All tasks, newest first.
    async fn list_tasks(&self) -> StoreResult<Vec<Task>>;

    /// Create a task.
    async fn add_task(&self, task: NewTask) -> StoreResult<Task>;

    /// Replace a task's editable fields.
    async fn update_task(&self, id: Uuid, draft: TaskDraft) -> StoreResult<Task>;

    /// Delete a task.
    async fn delete_task(&self, id: Uuid) -> StoreResult<()>;

    /// Completions recorded for `week`.
    async fn list_completions(&self, week: WeekKey) -> StoreResult<Vec<CompletedTask>>;

    /// Mark a task done for `week`.
    async fn complete_task(&self, completion: NewCompletion) -> StoreResult<()>;

    /// Undo a task's completion for `week`.
    async fn uncomplete_task(&self, task_id: Uuid, week: WeekKey) -> StoreResult<()>;

    /// Meals planned in `week`, ordered by weekday.
    async fn list_meals(&self, week: WeekKey) -> StoreResult<Vec<Meal>>;

    /// Plan a meal.
    async fn add_meal(&self, meal: NewMeal) -> StoreResult<Meal>;

    /// Rename, retype or move a planned meal within its week.
    async fn update_meal(&self, id: Uuid, update: MealUpdate) -> StoreResult<Meal>;

    /// Remove a planned meal.
    async fn delete_meal(&self, id: Uuid) -> StoreResult<()>;

    /// All wishes, newest first.
    async fn list_wishes(&self) -> StoreResult<Vec<Wish>>;

    /// Add a wish.
    async fn add_wish(&self, wish: NewWish) -> StoreResult<Wish>;

    /// Replace a wish's editable fields.
    async fn update_wish(&self, id: Uuid, draft: WishDraft) -> StoreResult<Wish>;

    /// Mark a wish fulfilled at `at`, or reopen it.
    async fn set_wish_completed(
        &self,
        id: Uuid,
        completed: bool,
        at: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// Delete a wish.
    async fn delete_wish(&self, id: Uuid) -> StoreResult<()>;

    /// Register a device for push, replacing any subscription with the
    /// same endpoint.
    async fn save_push_subscription(
        &self,
        subscription: NewPushSubscription,
    ) -> StoreResult<PushSubscription>;

    /// Forget the subscription for `endpoint`.
    async fn delete_push_subscription(&self, endpoint: &str) -> StoreResult<()>;
}

fn invalid(reason: impl Into<String>) -> StoreError {
    StoreError::InvalidRecord(reason.into())
}

fn check_day(day_of_week: u8) -> StoreResult<()> {
    if day_of_week > 6 {
        return Err(invalid(format!("day_of_week {day_of_week} out of range")));
    }
    Ok(())
}

/// Reject meals the tables would not accept.
pub(crate) fn validate_meal(meal: &NewMeal) -> StoreResult<()> {
    validate_meal_fields(&meal.meal_name, meal.day_of_week)
}

/// Reject meal updates the tables would not accept.
pub(crate) fn validate_meal_update(update: &MealUpdate) -> StoreResult<()> {
    validate_meal_fields(&update.meal_name, update.day_of_week)
}

fn validate_meal_fields(meal_name: &str, day_of_week: u8) -> StoreResult<()> {
    check_day(day_of_week)?;
    if meal_name.trim().is_empty() {
        return Err(invalid("meal name is empty"));
    }
    Ok(())
}

/// Reject tasks without a title or with an invalid weekday.
pub(crate) fn validate_task(draft: &TaskDraft) -> StoreResult<()> {
    check_day(draft.day_of_week)?;
    if draft.title.trim().is_empty() {
        return Err(invalid("task title is empty"));
    }
    Ok(())
}

/// Reject wishes the wish form would not submit.
pub(crate) fn validate_wish(draft: &WishDraft) -> StoreResult<()> {
    if draft.title.trim().is_empty() {
        return Err(invalid("wish title is empty"));
    }
    if draft.category.trim().is_empty() {
        return Err(invalid("wish category is empty"));
    }
    match draft.price_indication {
        None | Some(1..=3) => Ok(()),
        Some(level) => Err(invalid(format!("price_indication {level} out of range"))),
    }
}

/// Reject subscriptions missing an endpoint or keys.
pub(crate) fn validate_subscription(subscription: &NewPushSubscription) -> StoreResult<()> {
    if subscription.endpoint.is_empty() {
        return Err(invalid("push endpoint is empty"));
    }
    if subscription.p256dh.is_empty() || subscription.auth.is_empty() {
        return Err(invalid("push subscription keys are missing"));
    }
    Ok(())
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    tasks: Vec<Task>,
    completions: Vec<CompletedTask>,
    meals: Vec<Meal>,
    wishes: Vec<Wish>,
    push_subscriptions: Vec<PushSubscription>,
}

/// Thread-safe in-memory store.
///
/// Clones share the same tables. [`set_offline`](Self::set_offline) makes
/// every call fail with [`StoreError::Unavailable`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    offline: Arc<AtomicBool>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate losing the connection.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Add a member.
    pub fn insert_user(&self, user: User) {
        self.write().users.push(user);
    }

    /// Add a task.
    pub fn insert_task(&self, task: Task) {
        self.write().tasks.push(task);
    }

    /// Add a wish.
    pub fn insert_wish(&self, wish: Wish) {
        self.write().wishes.push(wish);
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store is offline".into()));
        }
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DataStore for InMemoryStore {
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.check_online()?;
        Ok(self.read().users.clone())
    }

    async fn users_with_pin(&self, pin: &str) -> StoreResult<Vec<User>> {
        self.check_online()?;
        Ok(self
            .read()
            .users
            .iter()
            .filter(|u| u.pin == pin)
            .take(2)
            .cloned()
            .collect())
    }

    async fn update_user(&self, id: Uuid, update: UserUpdate) -> StoreResult<User> {
        self.check_online()?;
        let mut tables = self.write();
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound { table: "users", id })?;
        update.apply_to(user);
        Ok(user.clone())
    }

    async fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        self.check_online()?;
        let mut tasks = self.read().tasks.clone();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn add_task(&self, task: NewTask) -> StoreResult<Task> {
        self.check_online()?;
        validate_task(&task.draft)?;
        let draft = task.draft.normalized();
        let task = Task {
            id: Uuid::new_v4(),
            title: draft.title,
            description: draft.description,
            day_of_week: draft.day_of_week,
            assigned_to: draft.assigned_to,
            is_both: draft.is_both,
            is_recurring: draft.is_recurring,
            created_by: Some(task.created_by),
            created_at: Utc::now(),
        };
        self.write().tasks.push(task.clone());
        debug!("Added task {}", task.id);
        Ok(task)
    }

    async fn update_task(&self, id: Uuid, draft: TaskDraft) -> StoreResult<Task> {
        self.check_online()?;
        validate_task(&draft)?;
        let draft = draft.normalized();
        let mut tables = self.write();
        let task = tables
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound { table: "tasks", id })?;
        task.title = draft.title;
        task.description = draft.description;
        task.day_of_week = draft.day_of_week;
        task.assigned_to = draft.assigned_to;
        task.is_both = draft.is_both;
        task.is_recurring = draft.is_recurring;
        Ok(task.clone())
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<()> {
        self.check_online()?;
        self.write().tasks.retain(|t| t.id != id);
        debug!("Deleted task {}", id);
        Ok(())
    }

    async fn list_completions(&self, week: WeekKey) -> StoreResult<Vec<CompletedTask>> {
        self.check_online()?;
        Ok(self
            .read()
            .completions
            .iter()
            .filter(|c| c.week() == week)
            .cloned()
            .collect())
    }

    async fn complete_task(&self, completion: NewCompletion) -> StoreResult<()> {
        self.check_online()?;
        let mut tables = self.write();
        let exists = tables
            .completions
            .iter()
            .any(|c| c.task_id == completion.task_id && c.week() == completion.week);
        if !exists {
            tables.completions.push(CompletedTask {
                task_id: completion.task_id,
                user_id: Some(completion.user_id),
                week_number: completion.week.week_number,
                year: completion.week.year,
            });
        }
        Ok(())
    }

    async fn uncomplete_task(&self, task_id: Uuid, week: WeekKey) -> StoreResult<()> {
        self.check_online()?;
        self.write()
            .completions
            .retain(|c| !(c.task_id == task_id && c.week() == week));
        Ok(())
    }

    async fn list_meals(&self, week: WeekKey) -> StoreResult<Vec<Meal>> {
        self.check_online()?;
        let mut meals: Vec<Meal> = self
            .read()
            .meals
            .iter()
            .filter(|m| m.week() == week)
            .cloned()
            .collect();
        meals.sort_by_key(|m| m.day_of_week);
        Ok(meals)
    }

    async fn add_meal(&self, meal: NewMeal) -> StoreResult<Meal> {
        self.check_online()?;
        validate_meal(&meal)?;
        let meal = Meal {
            id: Uuid::new_v4(),
            day_of_week: meal.day_of_week,
            meal_name: meal.meal_name.trim().to_string(),
            meal_type: meal.meal_type,
            week_number: meal.week.week_number,
            year: meal.week.year,
        };
        self.write().meals.push(meal.clone());
        Ok(meal)
    }

    async fn update_meal(&self, id: Uuid, update: MealUpdate) -> StoreResult<Meal> {
        self.check_online()?;
        validate_meal_update(&update)?;
        let mut tables = self.write();
        let meal = tables
            .meals
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(StoreError::NotFound { table: "meals", id })?;
        meal.meal_name = update.meal_name.trim().to_string();
        meal.meal_type = update.meal_type;
        meal.day_of_week = update.day_of_week;
        Ok(meal.clone())
    }

    async fn delete_meal(&self, id: Uuid) -> StoreResult<()> {
        self.check_online()?;
        self.write().meals.retain(|m| m.id != id);
        Ok(())
    }

    async fn list_wishes(&self) -> StoreResult<Vec<Wish>> {
        self.check_online()?;
        let mut wishes = self.read().wishes.clone();
        wishes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(wishes)
    }

    async fn add_wish(&self, wish: NewWish) -> StoreResult<Wish> {
        self.check_online()?;
        validate_wish(&wish.draft)?;
        let draft = wish.draft.normalized();
        let wish = Wish {
            id: Uuid::new_v4(),
            title: draft.title,
            note: draft.note,
            url: draft.url,
            category: Some(draft.category),
            price_indication: draft.price_indication,
            added_by: Some(wish.added_by),
            is_completed: false,
            completed_at: None,
            created_at: Utc::now(),
        };
        self.write().wishes.push(wish.clone());
        Ok(wish)
    }

    async fn update_wish(&self, id: Uuid, draft: WishDraft) -> StoreResult<Wish> {
        self.check_online()?;
        validate_wish(&draft)?;
        let draft = draft.normalized();
        let mut tables = self.write();
        let wish = tables
            .wishes
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or(StoreError::NotFound { table: "wishes", id })?;
        wish.title = draft.title;
        wish.note = draft.note;
        wish.url = draft.url;
        wish.category = Some(draft.category);
        wish.price_indication = draft.price_indication;
        Ok(wish.clone())
    }

    async fn set_wish_completed(
        &self,
        id: Uuid,
        completed: bool,
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.check_online()?;
        let mut tables = self.write();
        let wish = tables
            .wishes
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or(StoreError::NotFound { table: "wishes", id })?;
        wish.is_completed = completed;
        wish.completed_at = completed.then_some(at);
        Ok(())
    }

    async fn delete_wish(&self, id: Uuid) -> StoreResult<()> {
        self.check_online()?;
        self.write().wishes.retain(|w| w.id != id);
        debug!("Deleted wish {}", id);
        Ok(())
    }

    async fn save_push_subscription(
        &self,
        subscription: NewPushSubscription,
    ) -> StoreResult<PushSubscription> {
        self.check_online()?;
        validate_subscription(&subscription)?;
        let mut tables = self.write();
        let existing = tables
            .push_subscriptions
            .iter()
            .position(|s| s.endpoint == subscription.endpoint);
        let saved = match existing {
            Some(index) => {
                let row = &mut tables.push_subscriptions[index];
                row.user_id = subscription.user_id;
                row.p256dh = subscription.p256dh;
                row.auth = subscription.auth;
                row.clone()
            }
            None => {
                let row = PushSubscription {
                    id: Uuid::new_v4(),
                    user_id: subscription.user_id,
                    endpoint: subscription.endpoint,
                    p256dh: subscription.p256dh,
                    auth: subscription.auth,
                };
                tables.push_subscriptions.push(row.clone());
                row
            }
        };
        Ok(saved)
    }

    async fn delete_push_subscription(&self, endpoint: &str) -> StoreResult<()> {
        self.check_online()?;
        self.write()
            .push_subscriptions
            .retain(|s| s.endpoint != endpoint);
        Ok(())
    }
}
