//! Group hierarchy: building the faculty → form → level → course →
//! group tree from the upstream reference endpoints, publishing it to
//! the cache (or a JSON file when no cache store is configured) and
//! validating group ids against it.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::schedule::cache::{CacheStore, GROUPS_CACHE_KEY, GROUPS_CACHE_TTL};
use crate::schedule::types::{
    collect_group_ids, FacultyRecord, GroupLeaf, GroupNode, GroupRecord, GroupTree, SubGroup,
    SubGroupRecord,
};
use crate::schedule::upstream::ScheduleApi;

#[derive(Clone)]
pub struct GroupDirectory {
    api: ScheduleApi,
    store: CacheStore,
    /// Legacy persisted artifact: mirrors the tree to disk so lookups
    /// survive restarts when no cache store is configured.
    groups_file: PathBuf,
}

impl GroupDirectory {
    pub fn new(api: ScheduleApi, store: CacheStore, groups_file: PathBuf) -> Self {
        Self {
            api,
            store,
            groups_file,
        }
    }

    /// Returns the cached tree, rebuilding from upstream on a miss or
    /// when forced. A forced refresh that fails falls back to the
    /// cached snapshot rather than discarding a working tree.
    pub async fn get_tree(&self, force_refresh: bool) -> Option<GroupTree> {
        if !force_refresh {
            if let Some(tree) = self.cached_tree().await {
                return Some(tree);
            }
        }

        match self.rebuild().await {
            Some(tree) => {
                self.publish(&tree).await;
                Some(tree)
            }
            None => {
                if force_refresh {
                    self.cached_tree().await
                } else {
                    None
                }
            }
        }
    }

    /// Unconditionally rebuilds and republishes. A failed rebuild
    /// leaves the previously published tree untouched.
    pub async fn refresh(&self) -> bool {
        match self.rebuild().await {
            Some(tree) => {
                self.publish(&tree).await;
                info!("updated groups tree: {} faculties", tree.len());
                true
            }
            None => false,
        }
    }

    pub async fn is_valid_group(&self, group_id: i64) -> bool {
        match self.get_tree(false).await {
            Some(tree) => collect_group_ids(&tree).contains(&group_id),
            None => false,
        }
    }

    /// Leaf lookup for the selection flow: subgroups of a given group,
    /// if the tree knows any.
    pub async fn sub_groups_of(&self, group_id: i64) -> Option<Vec<SubGroup>> {
        let tree = self.get_tree(false).await?;
        find_leaf(&tree, group_id).and_then(|leaf| leaf.sub_groups.clone())
    }

    async fn cached_tree(&self) -> Option<GroupTree> {
        if self.store.available() {
            return self.store.get_json(GROUPS_CACHE_KEY).await;
        }
        self.read_file().await
    }

    async fn publish(&self, tree: &GroupTree) {
        if self.store.available() {
            self.store
                .set_json(GROUPS_CACHE_KEY, tree, GROUPS_CACHE_TTL)
                .await;
        } else {
            self.write_file(tree).await;
        }
    }

    async fn rebuild(&self) -> Option<GroupTree> {
        let groups = self.api.fetch_groups().await?;
        let faculties = self.api.fetch_faculties().await?;
        let sub_groups = self.api.fetch_sub_groups().await?;

        let tree = build_tree(&groups, &faculties, &sub_groups);
        if tree.is_empty() {
            return None;
        }
        Some(tree)
    }

    async fn read_file(&self) -> Option<GroupTree> {
        let raw = tokio::fs::read_to_string(&self.groups_file).await.ok()?;
        match serde_json::from_str(&raw) {
            Ok(tree) => Some(tree),
            Err(err) => {
                warn!(
                    "failed to parse groups file {}: {}",
                    self.groups_file.display(),
                    err
                );
                None
            }
        }
    }

    async fn write_file(&self, tree: &GroupTree) {
        let raw = match serde_json::to_string_pretty(tree) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("failed to serialize groups tree: {}", err);
                return;
            }
        };
        if let Err(err) = tokio::fs::write(&self.groups_file, raw).await {
            warn!(
                "failed to write groups file {}: {}",
                self.groups_file.display(),
                err
            );
        }
    }
}

/// Assembles the nested tree out of the three flat reference listings.
/// Unknown faculties, forms and levels land in named fallback buckets
/// instead of being dropped.
pub fn build_tree(
    groups: &[GroupRecord],
    faculties: &[FacultyRecord],
    sub_groups: &[SubGroupRecord],
) -> GroupTree {
    let faculty_names: HashMap<i64, &str> = faculties
        .iter()
        .filter_map(|f| f.name.as_deref().map(|name| (f.id, name)))
        .collect();
    let sub_group_names: HashMap<i64, &str> = sub_groups
        .iter()
        .filter_map(|s| s.name.as_deref().map(|name| (s.id, name)))
        .collect();

    let mut tree = GroupTree::new();

    for group in groups {
        let faculty = match group.faculty_id {
            Some(id) => faculty_names
                .get(&id)
                .map(|name| (*name).to_string())
                .unwrap_or_else(|| format!("Факультет {}", id)),
            None => "Факультет ?".to_string(),
        };
        let form = group
            .education_form
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "неизвестно".to_string());
        let level = group
            .education_level
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "неизвестно".to_string());
        let course = group.course.map(|c| c.to_string()).unwrap_or_default();
        let name = group
            .name
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("Группа {}", group.id));

        let resolved_sub_groups: Vec<SubGroup> = group
            .sub_group_ids
            .iter()
            .enumerate()
            .map(|(position, id)| SubGroup {
                id: *id,
                name: sub_group_names
                    .get(id)
                    .map(|n| (*n).to_string())
                    .unwrap_or_else(|| (position + 1).to_string()),
            })
            .collect();

        let leaf = GroupNode::Leaf(GroupLeaf {
            id: group.id,
            sub_groups: (!resolved_sub_groups.is_empty()).then_some(resolved_sub_groups),
        });

        let node = tree
            .entry(faculty)
            .or_insert_with(|| GroupNode::Branch(Default::default()));
        insert_path(node, &[form, level, course], name, leaf);
    }

    tree
}

fn insert_path(node: &mut GroupNode, path: &[String], name: String, leaf: GroupNode) {
    let GroupNode::Branch(children) = node else {
        return;
    };
    match path.split_first() {
        Some((head, rest)) => {
            let child = children
                .entry(head.clone())
                .or_insert_with(|| GroupNode::Branch(Default::default()));
            insert_path(child, rest, name, leaf);
        }
        None => {
            children.insert(name, leaf);
        }
    }
}

fn find_leaf(tree: &GroupTree, group_id: i64) -> Option<&GroupLeaf> {
    fn walk(node: &GroupNode, group_id: i64) -> Option<&GroupLeaf> {
        match node {
            GroupNode::Leaf(leaf) if leaf.id == group_id => Some(leaf),
            GroupNode::Branch(children) => {
                children.values().find_map(|child| walk(child, group_id))
            }
            _ => None,
        }
    }
    tree.values().find_map(|node| walk(node, group_id))
}
