//! Data model for the schedule resolution pipeline: raw upstream
//! records, reference entities, the group hierarchy and the formatted
//! per-day output.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One scheduled class occurrence as returned by the upstream API,
/// before any normalization. Timestamps arrive as RFC 3339 strings and
/// are parsed lazily so a single malformed entry never fails a whole
/// response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub sub_group_id: Option<i64>,
    #[serde(default)]
    pub faculty_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub teacher_id: Option<i64>,
    #[serde(default)]
    pub room_id: Option<i64>,
    #[serde(default)]
    pub class_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub atlas_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub building_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

/// Raw `/groups` record.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupRecord {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub faculty_id: Option<i64>,
    #[serde(default)]
    pub education_form: Option<String>,
    #[serde(default)]
    pub education_level: Option<String>,
    #[serde(default)]
    pub course: Option<i64>,
    #[serde(default)]
    pub sub_group_ids: Vec<i64>,
}

/// Raw `/faculties` record.
#[derive(Debug, Clone, Deserialize)]
pub struct FacultyRecord {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

/// Raw `/sub_groups` record.
#[derive(Debug, Clone, Deserialize)]
pub struct SubGroupRecord {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubGroup {
    pub id: i64,
    pub name: String,
}

/// Terminal group entry of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupLeaf {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_groups: Option<Vec<SubGroup>>,
}

/// One node of the faculty → form → level → course → group hierarchy.
///
/// The tree is published as plain nested JSON, so the variants are
/// distinguished structurally: a leaf object carries an `id`, a branch
/// is a map of child names, and `Legacy` accepts the bare
/// numeric-string leaves found in group files written by early
/// versions of the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupNode {
    Leaf(GroupLeaf),
    Legacy(String),
    Branch(BTreeMap<String, GroupNode>),
}

/// Faculty-level root of the hierarchy. Immutable once published;
/// rebuilds replace the whole snapshot.
pub type GroupTree = BTreeMap<String, GroupNode>;

impl GroupNode {
    /// Collects every group id reachable from this node.
    pub fn collect_ids(&self, out: &mut Vec<i64>) {
        match self {
            GroupNode::Leaf(leaf) => out.push(leaf.id),
            GroupNode::Legacy(raw) => {
                if let Ok(id) = raw.trim().parse::<i64>() {
                    out.push(id);
                }
            }
            GroupNode::Branch(children) => {
                for child in children.values() {
                    child.collect_ids(out);
                }
            }
        }
    }
}

/// Flattens a whole tree into its leaf group ids.
pub fn collect_group_ids(tree: &GroupTree) -> Vec<i64> {
    let mut ids = Vec::new();
    for node in tree.values() {
        node.collect_ids(&mut ids);
    }
    ids
}

/// Parameters of one schedule lookup. Constructed per request and
/// consumed entirely within a single `resolve` call.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleQuery {
    pub group_id: i64,
    /// `0`/`None` means no subgroup filter. Values `1` and `2` are the
    /// legacy positional selectors; anything else is an explicit
    /// upstream subgroup id.
    pub sub_group: Option<i64>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Restrict the lookup to exam slots.
    pub exam_only: bool,
}

impl ScheduleQuery {
    pub fn single_day(group_id: i64, sub_group: Option<i64>, date: NaiveDate) -> Self {
        Self {
            group_id,
            sub_group,
            start_date: date,
            end_date: None,
            exam_only: false,
        }
    }

    pub fn range(
        group_id: i64,
        sub_group: Option<i64>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            group_id,
            sub_group,
            start_date,
            end_date: Some(end_date),
            exam_only: false,
        }
    }
}

/// One formatted class block, ready for message rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassBlock {
    /// `HH:MM — HH:MM` in the entry's timezone.
    pub time: String,
    /// Cleaned free-text annotation, empty when suppressed as noise.
    pub modifier: String,
    pub title: String,
    /// Abbreviated class kind, e.g. `лек.`.
    pub kind: String,
    /// Rank-prefixed teacher display name, empty when unresolved.
    pub teacher: String,
    pub teacher_url: String,
    /// `room, building` when both are known.
    pub room: String,
    pub class_url: String,
}

/// All classes of one calendar day, labelled in the institution's
/// locale, e.g. `04.03.2024, понедельник`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub label: String,
    pub classes: Vec<ClassBlock>,
}

/// Outcome of a schedule resolution.
///
/// `days: None` means the upstream could not be reached or answered
/// with garbage; `Some(vec![])` means the source affirmatively reported
/// no classes. The two must never be conflated.
#[derive(Debug, Clone)]
pub struct ScheduleLookup {
    pub days: Option<Vec<DaySchedule>>,
    /// Deep link to the online schedule for the queried group.
    pub view_url: String,
}

impl ScheduleLookup {
    pub fn unavailable(view_url: String) -> Self {
        Self {
            days: None,
            view_url,
        }
    }

    pub fn empty(view_url: String) -> Self {
        Self {
            days: Some(Vec::new()),
            view_url,
        }
    }
}
