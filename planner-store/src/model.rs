//! Planner records as stored in the household database.
//!
//! Field names follow the table columns so records round-trip through the
//! REST API without a mapping layer.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use swipe_core::{ItemId, ItemKind};
use uuid::Uuid;

use crate::week::WeekKey;

/// Category label for wishes without one.
pub const DEFAULT_CATEGORY: &str = "Algemeen";

/// Assignee label for tasks shared by both household members.
pub const SHARED_LABEL: &str = "Samen";

/// Assignee label for unassigned tasks.
pub const UNASSIGNED_LABEL: &str = "Niemand";

/// A household member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Login PIN.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pin: String,
    /// Optional avatar image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// A household chore scheduled on a weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task ID.
    pub id: Uuid,
    /// Short title.
    pub title: String,
    /// Optional longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Weekday index, Monday = 0 through Sunday = 6.
    pub day_of_week: u8,
    /// Assigned household member.
    #[serde(default)]
    pub assigned_to: Option<Uuid>,
    /// Shared by both members.
    #[serde(default)]
    pub is_both: bool,
    /// Shown every week rather than only in the week it was created.
    #[serde(default)]
    pub is_recurring: bool,
    /// Member who created the task.
    #[serde(default)]
    pub created_by: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Swipe item identity for this task.
    #[must_use]
    pub fn item_id(&self) -> ItemId {
        ItemId::from_uuid(self.id)
    }

    /// Whether the task belongs to `user_id`, either directly or as a shared task.
    #[must_use]
    pub fn is_for(&self, user_id: Uuid) -> bool {
        self.is_both || self.assigned_to == Some(user_id)
    }

    /// Human-readable assignee.
    #[must_use]
    pub fn assignee_label(&self, users: &[User]) -> String {
        if self.is_both {
            return SHARED_LABEL.to_string();
        }
        self.assigned_to
            .and_then(|id| users.iter().find(|u| u.id == id))
            .map_or_else(|| UNASSIGNED_LABEL.to_string(), |u| u.name.clone())
    }
}

/// Editable fields of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    /// Short title.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Weekday index, Monday = 0 through Sunday = 6.
    pub day_of_week: u8,
    /// Assigned household member; ignored when shared.
    pub assigned_to: Option<Uuid>,
    /// Shared by both members.
    pub is_both: bool,
    /// Shown every week rather than only in the week it was created.
    pub is_recurring: bool,
}

impl TaskDraft {
    /// Trim text fields, drop an empty description, and clear the
    /// assignee of a shared task.
    #[must_use]
    pub fn normalized(self) -> Self {
        let assigned_to = if self.is_both { None } else { self.assigned_to };
        Self {
            title: self.title.trim().to_string(),
            description: non_empty(self.description),
            assigned_to,
            ..self
        }
    }
}

/// Insert payload for a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    /// Task fields.
    #[serde(flatten)]
    pub draft: TaskDraft,
    /// Member creating the task.
    pub created_by: Uuid,
}

/// A task marked done for one specific week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedTask {
    /// Completed task.
    pub task_id: Uuid,
    /// Member who completed it.
    #[serde(default)]
    pub user_id: Option<Uuid>,
    /// ISO week number.
    pub week_number: u32,
    /// Year of the week's Monday.
    pub year: i32,
}

impl CompletedTask {
    /// Week this completion belongs to.
    #[must_use]
    pub const fn week(&self) -> WeekKey {
        WeekKey {
            week_number: self.week_number,
            year: self.year,
        }
    }
}

/// Meal slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    /// Midday meal.
    Lunch,
    /// Evening meal.
    #[default]
    Dinner,
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lunch => write!(f, "lunch"),
            Self::Dinner => write!(f, "dinner"),
        }
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            other => Err(format!("unknown meal type: {other}")),
        }
    }
}

/// A planned meal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    /// Unique meal ID.
    pub id: Uuid,
    /// Weekday index, Monday = 0.
    pub day_of_week: u8,
    /// Dish name.
    pub meal_name: String,
    /// Lunch or dinner.
    #[serde(default)]
    pub meal_type: MealType,
    /// ISO week number.
    pub week_number: u32,
    /// Year of the week's Monday.
    pub year: i32,
}

impl Meal {
    /// Week this meal is planned in.
    #[must_use]
    pub const fn week(&self) -> WeekKey {
        WeekKey {
            week_number: self.week_number,
            year: self.year,
        }
    }
}

/// Insert payload for a meal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMeal {
    /// Weekday index, Monday = 0.
    pub day_of_week: u8,
    /// Dish name.
    pub meal_name: String,
    /// Lunch or dinner.
    pub meal_type: MealType,
    /// Target week.
    #[serde(flatten)]
    pub week: WeekKey,
}

/// Editable fields of a planned meal. The week is fixed at insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealUpdate {
    /// Dish name.
    pub meal_name: String,
    /// Lunch or dinner.
    pub meal_type: MealType,
    /// Weekday index, Monday = 0.
    pub day_of_week: u8,
}

/// Insert payload for a weekly completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCompletion {
    /// Completed task.
    pub task_id: Uuid,
    /// Member who completed it.
    pub user_id: Uuid,
    /// Target week.
    #[serde(flatten)]
    pub week: WeekKey,
}

/// A wishlist entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wish {
    /// Unique wish ID.
    pub id: Uuid,
    /// Short title.
    pub title: String,
    /// Optional note.
    #[serde(default)]
    pub note: Option<String>,
    /// Optional link to the item in a shop.
    #[serde(default)]
    pub url: Option<String>,
    /// Free-form category.
    #[serde(default)]
    pub category: Option<String>,
    /// Price level 1 to 3.
    #[serde(default)]
    pub price_indication: Option<u8>,
    /// Member who added the wish.
    #[serde(default)]
    pub added_by: Option<Uuid>,
    /// Fulfilled.
    #[serde(default)]
    pub is_completed: bool,
    /// When the wish was fulfilled.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Wish {
    /// Swipe item identity for this wish.
    #[must_use]
    pub fn item_id(&self) -> ItemId {
        ItemId::from_uuid(self.id)
    }

    /// Category, falling back to [`DEFAULT_CATEGORY`].
    #[must_use]
    pub fn category_label(&self) -> &str {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY)
    }

    /// Price level as euro signs, if a valid level is set.
    #[must_use]
    pub fn price_label(&self) -> Option<String> {
        match self.price_indication {
            Some(level @ 1..=3) => Some("€".repeat(usize::from(level))),
            _ => None,
        }
    }
}

/// Editable fields of a wish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishDraft {
    /// Short title.
    pub title: String,
    /// Optional note.
    pub note: Option<String>,
    /// Optional shop link.
    pub url: Option<String>,
    /// Category, required by the wish form.
    pub category: String,
    /// Price level 1 to 3.
    pub price_indication: Option<u8>,
}

impl WishDraft {
    /// Trim text fields and drop empty optional ones.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            note: non_empty(self.note),
            url: non_empty(self.url),
            category: self.category.trim().to_string(),
            price_indication: self.price_indication,
        }
    }
}

/// Insert payload for a wish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWish {
    /// Wish fields.
    #[serde(flatten)]
    pub draft: WishDraft,
    /// Member adding the wish.
    pub added_by: Uuid,
}

/// Group open wishes by category label, keeping the incoming order inside
/// each group.
#[must_use]
pub fn group_active_by_category(wishes: &[Wish]) -> BTreeMap<String, Vec<&Wish>> {
    let mut groups: BTreeMap<String, Vec<&Wish>> = BTreeMap::new();
    for wish in wishes.iter().filter(|w| !w.is_completed) {
        groups
            .entry(wish.category_label().to_string())
            .or_default()
            .push(wish);
    }
    groups
}

/// A Web Push subscription registered by a member's device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    /// Unique subscription ID.
    pub id: Uuid,
    /// Subscribed member.
    pub user_id: Uuid,
    /// Push service endpoint.
    pub endpoint: String,
    /// Client public key.
    pub p256dh: String,
    /// Client auth secret.
    pub auth: String,
}

/// Upsert payload for a push subscription; the endpoint is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPushSubscription {
    /// Subscribed member.
    pub user_id: Uuid,
    /// Push service endpoint.
    pub endpoint: String,
    /// Client public key.
    pub p256dh: String,
    /// Client auth secret.
    pub auth: String,
}

/// Partial update of a member's profile. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    /// New display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New avatar; `Some(None)` removes it.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub avatar_url: Option<Option<String>>,
}

impl UserUpdate {
    /// Replace or remove the avatar.
    #[must_use]
    pub fn avatar(avatar_url: Option<String>) -> Self {
        Self {
            avatar_url: Some(avatar_url),
            ..Self::default()
        }
    }

    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.avatar_url.is_none()
    }

    /// Apply the update to `user`.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name.clone_from(name);
        }
        if let Some(avatar_url) = &self.avatar_url {
            user.avatar_url.clone_from(avatar_url);
        }
    }
}

/// A field that is present in the payload, even as `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Records that can be rendered as swipeable items.
pub trait Swipeable {
    /// Swipe item identity.
    fn item_id(&self) -> ItemId;
    /// Item kind, which decides the delete table.
    fn kind(&self) -> ItemKind;
}

impl Swipeable for Task {
    fn item_id(&self) -> ItemId {
        Task::item_id(self)
    }

    fn kind(&self) -> ItemKind {
        ItemKind::Task
    }
}

impl Swipeable for Wish {
    fn item_id(&self) -> ItemId {
        Wish::item_id(self)
    }

    fn kind(&self) -> ItemKind {
        ItemKind::Wish
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(name: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            pin: String::new(),
            avatar_url: None,
        }
    }

    fn task(assigned_to: Option<Uuid>, is_both: bool) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "Stofzuigen".into(),
            description: None,
            day_of_week: 2,
            assigned_to,
            is_both,
            is_recurring: false,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    fn wish(category: Option<&str>, price: Option<u8>, completed: bool) -> Wish {
        Wish {
            id: Uuid::new_v4(),
            title: "Lamp".into(),
            note: None,
            url: None,
            category: category.map(str::to_string),
            price_indication: price,
            added_by: None,
            is_completed: completed,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn assignee_label_prefers_shared() {
        let ann = user("Ann");
        let users = vec![ann.clone()];
        assert_eq!(task(Some(ann.id), true).assignee_label(&users), "Samen");
        assert_eq!(task(Some(ann.id), false).assignee_label(&users), "Ann");
        assert_eq!(task(None, false).assignee_label(&users), "Niemand");
        assert_eq!(
            task(Some(Uuid::new_v4()), false).assignee_label(&users),
            "Niemand"
        );
    }

    #[test]
    fn shared_task_is_for_everyone() {
        let id = Uuid::new_v4();
        assert!(task(None, true).is_for(id));
        assert!(task(Some(id), false).is_for(id));
        assert!(!task(Some(Uuid::new_v4()), false).is_for(id));
    }

    #[test]
    fn price_label_repeats_euro_sign() {
        assert_eq!(wish(None, Some(1), false).price_label().as_deref(), Some("€"));
        assert_eq!(
            wish(None, Some(3), false).price_label().as_deref(),
            Some("€€€")
        );
        assert_eq!(wish(None, Some(4), false).price_label(), None);
        assert_eq!(wish(None, None, false).price_label(), None);
    }

    #[test]
    fn grouping_skips_completed_and_defaults_category() {
        let wishes = vec![
            wish(Some("Keuken"), None, false),
            wish(None, None, false),
            wish(Some("  "), None, false),
            wish(Some("Keuken"), None, true),
        ];
        let groups = group_active_by_category(&wishes);
        assert_eq!(groups["Keuken"].len(), 1);
        assert_eq!(groups[DEFAULT_CATEGORY].len(), 2);
    }

    #[test]
    fn meal_parses_table_row() {
        let row = json!({
            "id": Uuid::nil(),
            "day_of_week": 4,
            "meal_name": "Pasta",
            "meal_type": "lunch",
            "week_number": 12,
            "year": 2026
        });
        let meal: Meal = serde_json::from_value(row).expect("meal");
        assert_eq!(meal.meal_type, MealType::Lunch);
        assert_eq!(meal.week().week_number, 12);
    }

    #[test]
    fn new_meal_flattens_week() {
        let meal = NewMeal {
            day_of_week: 0,
            meal_name: "Soep".into(),
            meal_type: MealType::Dinner,
            week: WeekKey {
                week_number: 3,
                year: 2026,
            },
        };
        let value = serde_json::to_value(&meal).expect("json");
        assert_eq!(value["week_number"], 3);
        assert_eq!(value["year"], 2026);
        assert_eq!(value["meal_type"], "dinner");
    }

    #[test]
    fn meal_type_parses() {
        assert_eq!("lunch".parse::<MealType>(), Ok(MealType::Lunch));
        assert!("brunch".parse::<MealType>().is_err());
    }

    #[test]
    fn task_draft_normalizes_shared_assignment() {
        let draft = TaskDraft {
            title: "  Afwassen ".into(),
            description: Some("   ".into()),
            day_of_week: 3,
            assigned_to: Some(Uuid::new_v4()),
            is_both: true,
            is_recurring: true,
        }
        .normalized();
        assert_eq!(draft.title, "Afwassen");
        assert_eq!(draft.description, None);
        assert_eq!(draft.assigned_to, None);
    }

    #[test]
    fn new_task_flattens_draft() {
        let creator = Uuid::new_v4();
        let task = NewTask {
            draft: TaskDraft {
                title: "Ramen".into(),
                description: None,
                day_of_week: 5,
                assigned_to: None,
                is_both: true,
                is_recurring: false,
            },
            created_by: creator,
        };
        let value = serde_json::to_value(&task).expect("json");
        assert_eq!(value["title"], "Ramen");
        assert_eq!(value["created_by"], creator.to_string());
        assert!(value.get("draft").is_none());
    }

    #[test]
    fn wish_draft_drops_blank_fields() {
        let draft = WishDraft {
            title: " Fiets ".into(),
            note: Some(String::new()),
            url: Some(" https://shop.test/fiets ".into()),
            category: " Buiten ".into(),
            price_indication: Some(3),
        }
        .normalized();
        assert_eq!(draft.title, "Fiets");
        assert_eq!(draft.note, None);
        assert_eq!(draft.url.as_deref(), Some("https://shop.test/fiets"));
        assert_eq!(draft.category, "Buiten");
    }

    #[test]
    fn user_update_distinguishes_removal_from_absence() {
        assert_eq!(
            serde_json::to_value(UserUpdate::avatar(None)).expect("json"),
            json!({ "avatar_url": null })
        );
        assert_eq!(
            serde_json::to_value(UserUpdate::default()).expect("json"),
            json!({})
        );

        let parsed: UserUpdate =
            serde_json::from_value(json!({ "avatar_url": null })).expect("parse");
        assert_eq!(parsed, UserUpdate::avatar(None));
        let parsed: UserUpdate = serde_json::from_value(json!({})).expect("parse");
        assert!(parsed.is_empty());

        let mut ann = user("Ann");
        ann.avatar_url = Some("data:image/png;base64,AAAA".into());
        UserUpdate::avatar(None).apply_to(&mut ann);
        assert_eq!(ann.avatar_url, None);
        assert_eq!(ann.name, "Ann");
    }

    #[test]
    fn wish_parses_note_and_url() {
        let row = json!({
            "id": Uuid::nil(),
            "title": "Boek",
            "note": "tweedehands is prima",
            "url": "https://shop.test/boek",
            "category": "Lezen",
            "price_indication": 1,
            "created_at": "2026-10-01T12:00:00Z"
        });
        let wish: Wish = serde_json::from_value(row).expect("wish");
        assert_eq!(wish.note.as_deref(), Some("tweedehands is prima"));
        assert_eq!(wish.url.as_deref(), Some("https://shop.test/boek"));
        assert!(!wish.is_completed);
    }

    #[test]
    fn swipeable_kinds() {
        let t = task(None, false);
        let w = wish(None, None, false);
        assert_eq!(Swipeable::kind(&t), ItemKind::Task);
        assert_eq!(Swipeable::kind(&w), ItemKind::Wish);
        assert_eq!(Swipeable::item_id(&t).as_uuid(), t.id);
    }
}
