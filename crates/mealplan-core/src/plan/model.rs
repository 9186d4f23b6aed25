//! The meal-plan aggregate: plan, week, day, entry and their value types.
//!
//! Structural invariants are held by construction:
//! - a [`Week`] always has all seven days, in weekday order;
//! - an [`Adherence`] record carries `replaced_with` exactly when its status
//!   is `replaced`;
//! - entry ids and adherence are only writable inside this crate.

use std::collections::HashSet;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Index};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use mealplan_db::models::GeneratedBy;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Day of the plan week.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All weekdays in plan order.
    pub const ALL: [Weekday; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Position within the plan week, Monday = 0.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = WeekdayParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| WeekdayParseError(s.to_owned()))
    }
}

/// Error returned when parsing an invalid [`Weekday`] string.
#[derive(Debug, Clone, Error)]
#[error("invalid weekday: {0:?} (expected monday through sunday)")]
pub struct WeekdayParseError(pub String);

// ---------------------------------------------------------------------------

/// Meal slot within a day.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [Self::Breakfast, Self::Lunch, Self::Dinner, Self::Snack];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = MealTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|slot| slot.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MealTypeParseError(s.to_owned()))
    }
}

/// Error returned when parsing an invalid [`MealType`] string.
#[derive(Debug, Clone, Error)]
#[error("invalid meal type: {0:?} (expected breakfast, lunch, dinner, or snack)")]
pub struct MealTypeParseError(pub String);

// ---------------------------------------------------------------------------

/// User-reported outcome of a planned meal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdherenceStatus {
    Planned,
    Eaten,
    Skipped,
    Replaced,
}

impl AdherenceStatus {
    /// `eaten`, `skipped` and `replaced` have no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Planned)
    }

    /// Whether the entry counts towards the completion rate.
    pub fn is_followed(self) -> bool {
        matches!(self, Self::Eaten | Self::Replaced)
    }
}

impl fmt::Display for AdherenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Planned => "planned",
            Self::Eaten => "eaten",
            Self::Skipped => "skipped",
            Self::Replaced => "replaced",
        };
        f.pad(s)
    }
}

// ---------------------------------------------------------------------------
// Value types
// ---------------------------------------------------------------------------

/// Macronutrient snapshot. Missing fields deserialize as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl Nutrition {
    pub const ZERO: Nutrition = Nutrition {
        calories: 0.0,
        protein: 0.0,
        carbs: 0.0,
        fats: 0.0,
    };

    pub fn new(calories: f64, protein: f64, carbs: f64, fats: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fats,
        }
    }

    /// Field-wise division. Dividing by zero yields [`Nutrition::ZERO`].
    pub fn divided_by(self, divisor: usize) -> Self {
        if divisor == 0 {
            return Self::ZERO;
        }
        let d = divisor as f64;
        Self {
            calories: self.calories / d,
            protein: self.protein / d,
            carbs: self.carbs / d,
            fats: self.fats / d,
        }
    }

    /// Name of the first field that is negative or not finite, if any.
    pub fn invalid_field(&self) -> Option<&'static str> {
        [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fats", self.fats),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite() || *value < 0.0)
        .map(|(name, _)| name)
    }
}

impl Add for Nutrition {
    type Output = Nutrition;

    fn add(self, rhs: Nutrition) -> Nutrition {
        Nutrition {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fats: self.fats + rhs.fats,
        }
    }
}

impl AddAssign for Nutrition {
    fn add_assign(&mut self, rhs: Nutrition) {
        *self = *self + rhs;
    }
}

impl Sum for Nutrition {
    fn sum<I: Iterator<Item = Nutrition>>(iter: I) -> Nutrition {
        iter.fold(Nutrition::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Nutrition> for Nutrition {
    fn sum<I: Iterator<Item = &'a Nutrition>>(iter: I) -> Nutrition {
        iter.copied().sum()
    }
}

/// Reference to a catalog meal with its nutrition denormalized at the time
/// it was added to the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealRef {
    /// Catalog identifier.
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nutrition: Nutrition,
}

impl MealRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, nutrition: Nutrition) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            nutrition,
        }
    }
}

// ---------------------------------------------------------------------------
// Adherence
// ---------------------------------------------------------------------------

/// Adherence record of one entry.
///
/// Only [`crate::adherence::AdherenceStateMachine`] moves it out of
/// `planned`; it never moves back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AdherenceRecord", into = "AdherenceRecord")]
pub struct Adherence {
    status: AdherenceStatus,
    replaced_with: Option<String>,
    updated_at: Option<DateTime<Utc>>,
}

impl Adherence {
    pub fn planned() -> Self {
        Self {
            status: AdherenceStatus::Planned,
            replaced_with: None,
            updated_at: None,
        }
    }

    pub fn status(&self) -> AdherenceStatus {
        self.status
    }

    /// What was eaten instead; present iff the status is `replaced`.
    pub fn replaced_with(&self) -> Option<&str> {
        self.replaced_with.as_deref()
    }

    /// When the status last changed; `None` while still planned.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Record a terminal outcome. The caller has already checked the
    /// transition; the stamp never goes backwards.
    pub(crate) fn settle(
        &mut self,
        status: AdherenceStatus,
        replaced_with: Option<String>,
        now: DateTime<Utc>,
    ) {
        let stamp = match self.updated_at {
            Some(prev) if prev > now => prev,
            _ => now,
        };
        self.status = status;
        self.replaced_with = replaced_with;
        self.updated_at = Some(stamp);
    }
}

impl Default for Adherence {
    fn default() -> Self {
        Self::planned()
    }
}

/// Serialized shape of [`Adherence`].
#[derive(Serialize, Deserialize)]
struct AdherenceRecord {
    status: AdherenceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    replaced_with: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

/// Error returned when a stored adherence record breaks its invariants.
#[derive(Debug, Clone, Error)]
pub enum AdherenceRecordError {
    #[error("adherence status replaced requires a non-blank replaced_with")]
    MissingReplacement,
    #[error("replaced_with is only allowed when status is replaced (status is {0})")]
    UnexpectedReplacement(AdherenceStatus),
}

impl TryFrom<AdherenceRecord> for Adherence {
    type Error = AdherenceRecordError;

    fn try_from(record: AdherenceRecord) -> Result<Self, Self::Error> {
        match (record.status, &record.replaced_with) {
            (AdherenceStatus::Replaced, Some(text)) if !text.trim().is_empty() => {}
            (AdherenceStatus::Replaced, _) => {
                return Err(AdherenceRecordError::MissingReplacement);
            }
            (status, Some(_)) => return Err(AdherenceRecordError::UnexpectedReplacement(status)),
            (_, None) => {}
        }
        Ok(Self {
            status: record.status,
            replaced_with: record.replaced_with,
            updated_at: record.updated_at,
        })
    }
}

impl From<Adherence> for AdherenceRecord {
    fn from(adherence: Adherence) -> Self {
        Self {
            status: adherence.status,
            replaced_with: adherence.replaced_with,
            updated_at: adherence.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Entries and days
// ---------------------------------------------------------------------------

/// A single planned meal occupying one slot on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntry {
    id: Uuid,
    meal_type: MealType,
    /// Catalog meal and its nutrition snapshot.
    pub meal: MealRef,
    #[serde(default)]
    adherence: Adherence,
}

impl MealEntry {
    /// A new `planned` entry with a fresh id.
    pub fn new(meal_type: MealType, meal: MealRef) -> Self {
        Self {
            id: Uuid::new_v4(),
            meal_type,
            meal,
            adherence: Adherence::planned(),
        }
    }

    /// Stable identifier, unique within the plan.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn meal_type(&self) -> MealType {
        self.meal_type
    }

    pub fn adherence(&self) -> &Adherence {
        &self.adherence
    }

    pub fn status(&self) -> AdherenceStatus {
        self.adherence.status
    }

    pub(crate) fn set_meal_type(&mut self, meal_type: MealType) {
        self.meal_type = meal_type;
    }

    pub(crate) fn adherence_mut(&mut self) -> &mut Adherence {
        &mut self.adherence
    }
}

/// One day of the plan and its entries in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    day: Weekday,
    #[serde(default)]
    meals: Vec<MealEntry>,
}

impl DayPlan {
    fn empty(day: Weekday) -> Self {
        Self {
            day,
            meals: Vec::new(),
        }
    }

    pub fn day(&self) -> Weekday {
        self.day
    }

    pub fn meals(&self) -> &[MealEntry] {
        &self.meals
    }

    pub fn is_empty(&self) -> bool {
        self.meals.is_empty()
    }

    /// Entries in one slot, in insertion order.
    pub fn slot(&self, meal_type: MealType) -> impl Iterator<Item = &MealEntry> {
        self.meals.iter().filter(move |e| e.meal_type == meal_type)
    }

    pub(crate) fn meals_mut(&mut self) -> &mut Vec<MealEntry> {
        &mut self.meals
    }
}

/// The seven days of a plan.
///
/// Serialized as a list of day objects. Days missing from a stored list are
/// filled in empty; a day listed twice, or an entry id used twice, is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DayPlan>", into = "Vec<DayPlan>")]
pub struct Week([DayPlan; 7]);

/// Error returned when a stored day list cannot form a [`Week`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeekShapeError {
    #[error("day {0} appears more than once")]
    DuplicateDay(Weekday),
    #[error("entry {entry} appears more than once (again on {day})")]
    DuplicateEntry { entry: Uuid, day: Weekday },
}

impl Week {
    pub fn new() -> Self {
        Self(std::array::from_fn(|i| DayPlan::empty(Weekday::ALL[i])))
    }

    pub fn day(&self, day: Weekday) -> &DayPlan {
        &self.0[day.index()]
    }

    pub(crate) fn day_mut(&mut self, day: Weekday) -> &mut DayPlan {
        &mut self.0[day.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &DayPlan> {
        self.0.iter()
    }

    /// Every entry of the week, Monday first.
    pub fn entries(&self) -> impl Iterator<Item = &MealEntry> {
        self.0.iter().flat_map(|d| d.meals.iter())
    }

    pub fn entry(&self, id: Uuid) -> Option<&MealEntry> {
        self.entries().find(|e| e.id == id)
    }

    pub(crate) fn entry_mut(&mut self, id: Uuid) -> Option<&mut MealEntry> {
        self.0
            .iter_mut()
            .flat_map(|d| d.meals.iter_mut())
            .find(|e| e.id == id)
    }

    /// The day holding the given entry.
    pub fn day_of(&self, id: Uuid) -> Option<Weekday> {
        self.0
            .iter()
            .find(|d| d.meals.iter().any(|e| e.id == id))
            .map(|d| d.day)
    }
}

impl Default for Week {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<Weekday> for Week {
    type Output = DayPlan;

    fn index(&self, day: Weekday) -> &DayPlan {
        self.day(day)
    }
}

impl TryFrom<Vec<DayPlan>> for Week {
    type Error = WeekShapeError;

    fn try_from(days: Vec<DayPlan>) -> Result<Self, Self::Error> {
        let mut week = Week::new();
        let mut seen = [false; 7];
        let mut entry_ids = HashSet::new();
        for day in days {
            let idx = day.day.index();
            if seen[idx] {
                return Err(WeekShapeError::DuplicateDay(day.day));
            }
            seen[idx] = true;
            if let Some(entry) = day.meals.iter().find(|e| !entry_ids.insert(e.id)) {
                return Err(WeekShapeError::DuplicateEntry {
                    entry: entry.id,
                    day: day.day,
                });
            }
            week.0[idx] = day;
        }
        Ok(week)
    }
}

impl From<Week> for Vec<DayPlan> {
    fn from(week: Week) -> Self {
        week.0.into()
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// A meal plan spanning one calendar week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    /// First day of the plan week; normally a Monday.
    pub week_start_date: Option<NaiveDate>,
    pub(crate) days: Week,
    /// Cached weekly totals, rewritten on every save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition_summary: Option<Nutrition>,
    #[serde(default)]
    pub generated_by: GeneratedBy,
    pub is_active: bool,
    /// Incremented on every write; guards against lost updates.
    pub revision: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MealPlan {
    /// An empty, active plan at revision 0.
    pub fn new(
        owner_id: Uuid,
        title: impl Into<String>,
        week_start_date: Option<NaiveDate>,
        generated_by: GeneratedBy,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: title.into(),
            week_start_date,
            days: Week::new(),
            nutrition_summary: None,
            generated_by,
            is_active: true,
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn days(&self) -> &Week {
        &self.days
    }

    pub fn entries(&self) -> impl Iterator<Item = &MealEntry> {
        self.days.entries()
    }

    pub fn entry(&self, id: Uuid) -> Option<&MealEntry> {
        self.days.entry(id)
    }
}

// ---------------------------------------------------------------------------
// Entry addressing
// ---------------------------------------------------------------------------

/// How a caller names the entry an adherence update applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRef {
    /// Stable entry id.
    Id(Uuid),
    /// The only entry in a slot. Fails when the slot holds several.
    Slot { day: Weekday, meal_type: MealType },
}

impl fmt::Display for EntryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Slot { day, meal_type } => write!(f, "{day}:{meal_type}"),
        }
    }
}

/// Error returned when parsing an [`EntryRef`].
#[derive(Debug, Clone, Error)]
#[error("invalid entry reference {0:?} (expected an entry id or day:meal_type)")]
pub struct EntryRefParseError(pub String);

impl FromStr for EntryRef {
    type Err = EntryRefParseError;

    /// Accepts a UUID or `day:meal_type`, e.g. `monday:lunch`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(id) = Uuid::parse_str(s) {
            return Ok(Self::Id(id));
        }
        let err = || EntryRefParseError(s.to_owned());
        let (day, meal_type) = s.split_once(':').ok_or_else(err)?;
        Ok(Self::Slot {
            day: day.parse().map_err(|_| err())?,
            meal_type: meal_type.parse().map_err(|_| err())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oats() -> MealRef {
        MealRef::new("oats", "Oatmeal", Nutrition::new(300.0, 10.0, 40.0, 8.0))
    }

    #[test]
    fn weekday_round_trips_through_str() {
        for day in Weekday::ALL {
            assert_eq!(day.as_str().parse::<Weekday>().unwrap(), day);
        }
        assert!("funday".parse::<Weekday>().is_err());
    }

    #[test]
    fn meal_type_rejects_unknown_slot() {
        let err = "brunch".parse::<MealType>().unwrap_err();
        assert!(err.to_string().contains("brunch"));
    }

    #[test]
    fn new_week_has_seven_empty_days_in_order() {
        let week = Week::new();
        let days: Vec<Weekday> = week.iter().map(DayPlan::day).collect();
        assert_eq!(days, Weekday::ALL.to_vec());
        assert!(week.iter().all(DayPlan::is_empty));
    }

    #[test]
    fn week_deserialization_fills_missing_days() {
        let json = serde_json::json!([
            { "day": "wednesday", "meals": [] }
        ]);
        let week: Week = serde_json::from_value(json).unwrap();
        assert_eq!(week.iter().count(), 7);
        assert_eq!(week[Weekday::Wednesday].day(), Weekday::Wednesday);
        assert_eq!(week[Weekday::Sunday].day(), Weekday::Sunday);
    }

    #[test]
    fn week_deserialization_rejects_duplicate_days() {
        let json = serde_json::json!([
            { "day": "friday" },
            { "day": "friday" }
        ]);
        let err = serde_json::from_value::<Week>(json).unwrap_err();
        assert!(err.to_string().contains("friday"), "got: {err}");
    }

    #[test]
    fn week_rejects_entry_id_used_on_two_days() {
        let entry = MealEntry::new(MealType::Lunch, oats());
        let mut monday = DayPlan::empty(Weekday::Monday);
        monday.meals.push(entry.clone());
        let mut thursday = DayPlan::empty(Weekday::Thursday);
        thursday.meals.push(entry.clone());

        let err = Week::try_from(vec![monday, thursday]).unwrap_err();
        assert_eq!(
            err,
            WeekShapeError::DuplicateEntry {
                entry: entry.id(),
                day: Weekday::Thursday,
            }
        );

        let value = serde_json::json!([
            { "day": "monday", "meals": [entry.clone(), entry] }
        ]);
        let err = serde_json::from_value::<Week>(value).unwrap_err();
        assert!(err.to_string().contains("appears more than once"), "got: {err}");
    }

    #[test]
    fn names_parse_regardless_of_case() {
        assert_eq!("Monday".parse::<Weekday>().unwrap(), Weekday::Monday);
        assert_eq!(" SUNDAY ".parse::<Weekday>().unwrap(), Weekday::Sunday);
        assert_eq!("Lunch".parse::<MealType>().unwrap(), MealType::Lunch);
        assert_eq!(
            "FRIDAY : Snack".parse::<EntryRef>().unwrap(),
            EntryRef::Slot {
                day: Weekday::Friday,
                meal_type: MealType::Snack
            }
        );
    }

    #[test]
    fn new_entry_is_planned_without_timestamp() {
        let entry = MealEntry::new(MealType::Breakfast, oats());
        assert_eq!(entry.status(), AdherenceStatus::Planned);
        assert_eq!(entry.adherence().replaced_with(), None);
        assert_eq!(entry.adherence().updated_at(), None);
    }

    #[test]
    fn adherence_record_requires_replacement_text() {
        let json = serde_json::json!({ "status": "replaced" });
        assert!(serde_json::from_value::<Adherence>(json).is_err());

        let json = serde_json::json!({ "status": "eaten", "replaced_with": "Toast" });
        assert!(serde_json::from_value::<Adherence>(json).is_err());

        let json = serde_json::json!({ "status": "replaced", "replaced_with": "Toast" });
        let adherence: Adherence = serde_json::from_value(json).unwrap();
        assert_eq!(adherence.replaced_with(), Some("Toast"));
    }

    #[test]
    fn settle_never_moves_timestamp_backwards() {
        let later = Utc::now();
        let earlier = later - chrono::Duration::minutes(5);
        let mut adherence = Adherence::planned();
        adherence.settle(AdherenceStatus::Eaten, None, later);
        adherence.settle(AdherenceStatus::Eaten, None, earlier);
        assert_eq!(adherence.updated_at(), Some(later));
    }

    #[test]
    fn nutrition_sum_and_division() {
        let total: Nutrition = [
            Nutrition::new(300.0, 10.0, 40.0, 8.0),
            Nutrition::new(500.0, 25.0, 60.0, 15.0),
        ]
        .iter()
        .sum();
        assert_eq!(total, Nutrition::new(800.0, 35.0, 100.0, 23.0));
        assert_eq!(total.divided_by(2), Nutrition::new(400.0, 17.5, 50.0, 11.5));
        assert_eq!(total.divided_by(0), Nutrition::ZERO);
    }

    #[test]
    fn nutrition_flags_negative_and_nan_fields() {
        assert_eq!(Nutrition::new(1.0, 1.0, 1.0, 1.0).invalid_field(), None);
        assert_eq!(
            Nutrition::new(1.0, -2.0, 1.0, 1.0).invalid_field(),
            Some("protein")
        );
        assert_eq!(
            Nutrition::new(f64::NAN, 0.0, 0.0, 0.0).invalid_field(),
            Some("calories")
        );
    }

    #[test]
    fn entry_ref_parses_ids_and_slots() {
        let id = Uuid::new_v4();
        assert_eq!(id.to_string().parse::<EntryRef>().unwrap(), EntryRef::Id(id));
        assert_eq!(
            "Monday:lunch".parse::<EntryRef>().unwrap(),
            EntryRef::Slot {
                day: Weekday::Monday,
                meal_type: MealType::Lunch
            }
        );
        assert!("monday".parse::<EntryRef>().is_err());
        assert!("monday:brunch".parse::<EntryRef>().is_err());
    }

    #[test]
    fn plan_serializes_days_as_list() {
        let plan = MealPlan::new(
            Uuid::new_v4(),
            "Test",
            NaiveDate::from_ymd_opt(2024, 1, 15),
            GeneratedBy::Manual,
            Utc::now(),
        );
        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["days"].as_array().map(Vec::len), Some(7));
        let back: MealPlan = serde_json::from_value(value).unwrap();
        assert_eq!(back, plan);
    }
}
