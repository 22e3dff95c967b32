use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;

use super::operations::IrOperation;
use super::types::NormalizedName;
use crate::transform::name_normalizer::normalize_name;

/// Key of the group that collects operations without a usable base path.
pub const DEFAULT_GROUP: &str = "default";

static BASE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/*([^/]+)(/.*)?$").expect("valid regex"));

/// How operations are partitioned into generated API units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingStrategy {
    /// First path segment, letters only.
    BasePath,
    /// `x-client-group`, falling back to the base path.
    ClientGroup,
    /// One group per operation.
    OperationId,
    /// Everything in one group named after the application.
    Single,
}

/// A group of operations, rendered as one API interface or client.
#[derive(Debug, Clone, Serialize)]
pub struct OperationGroup {
    pub key: String,
    pub name: NormalizedName,
    /// Name of the generated unit, e.g. `PetsApi` or `PetstoreClient`.
    pub api_name: String,
    pub operation_ids: Vec<String>,
    #[serde(skip)]
    pub operation_indices: Vec<usize>,
}

impl OperationGroup {
    fn new(key: &str, api_name: String) -> Self {
        Self {
            key: key.to_string(),
            name: normalize_name(key),
            api_name,
            operation_ids: Vec::new(),
            operation_indices: Vec::new(),
        }
    }
}

/// The base path of a route: its first segment with every non-letter
/// removed, and whether anything follows that segment.
///
/// `/pets/{id}` → `("pets", true)`, `/v2` → `("v", false)`, `/` → `("default", false)`.
pub fn split_base_path(path: &str) -> (String, bool) {
    let Some(caps) = BASE_PATH.captures(path) else {
        return (DEFAULT_GROUP.to_string(), false);
    };
    let key: String = caps[1].chars().filter(|c| c.is_ascii_alphabetic()).collect();
    let key = if key.is_empty() {
        DEFAULT_GROUP.to_string()
    } else {
        key
    };
    let subresource = caps.get(2).is_some_and(|rest| !rest.as_str().is_empty());
    (key, subresource)
}

/// Accumulates operations into groups. Adding the same operation identifier
/// twice is a no-op, so callers may add once per tag.
#[derive(Debug)]
pub struct OperationGrouper {
    strategy: GroupingStrategy,
    app_name: String,
    groups: IndexMap<String, OperationGroup>,
}

impl OperationGrouper {
    /// `app_name` is the capitalized short application name, used by the
    /// `Single` strategy.
    pub fn new(strategy: GroupingStrategy, app_name: &str) -> Self {
        Self {
            strategy,
            app_name: app_name.to_string(),
            groups: IndexMap::new(),
        }
    }

    /// Place `op` (found at `index` in the operation list) into its group and
    /// record the group key, base name and subresource flag on it. Returns
    /// false when the operation was already grouped.
    pub fn add(&mut self, index: usize, op: &mut IrOperation) -> bool {
        let (base_path, subresource) = split_base_path(&op.path);
        let key = match self.strategy {
            GroupingStrategy::BasePath => base_path.clone(),
            GroupingStrategy::ClientGroup => op
                .client_group
                .clone()
                .unwrap_or_else(|| base_path.clone()),
            GroupingStrategy::OperationId => op.operation_id.clone(),
            GroupingStrategy::Single => DEFAULT_GROUP.to_string(),
        };

        let strategy = self.strategy;
        let app_name = &self.app_name;
        let group = self.groups.entry(key.clone()).or_insert_with(|| {
            let api_name = match strategy {
                GroupingStrategy::Single => format!("{app_name}Client"),
                _ => format!("{}Api", normalize_name(&key).pascal_case),
            };
            OperationGroup::new(&key, api_name)
        });

        if group.operation_ids.contains(&op.operation_id) {
            return false;
        }
        group.operation_ids.push(op.operation_id.clone());
        group.operation_indices.push(index);

        op.group_key = Some(key);
        op.base_name = Some(base_path);
        op.subresource = subresource;
        true
    }

    /// Groups in first-seen order.
    pub fn finish(self) -> IndexMap<String, OperationGroup> {
        self.groups
    }
}

/// Group every operation. Each operation is offered once per tag it
/// carries (at least once); repeated offers are ignored.
pub fn group_operations(
    operations: &mut [IrOperation],
    strategy: GroupingStrategy,
    app_name: &str,
) -> IndexMap<String, OperationGroup> {
    let mut grouper = OperationGrouper::new(strategy, app_name);
    for (i, op) in operations.iter_mut().enumerate() {
        let offers = op.tags.len().max(1);
        for _ in 0..offers {
            grouper.add(i, op);
        }
    }
    grouper.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::HttpMethod;

    fn op(id: &str, path: &str) -> IrOperation {
        IrOperation::new(id.to_string(), normalize_name(id), HttpMethod::Get, path)
    }

    #[test]
    fn test_split_base_path() {
        assert_eq!(split_base_path("/pets"), ("pets".to_string(), false));
        assert_eq!(split_base_path("/pets/{petId}"), ("pets".to_string(), true));
        assert_eq!(split_base_path("//store2/x"), ("store".to_string(), true));
        assert_eq!(split_base_path("/"), ("default".to_string(), false));
        assert_eq!(split_base_path(""), ("default".to_string(), false));
        assert_eq!(split_base_path("/123/x"), ("default".to_string(), true));
    }

    #[test]
    fn test_group_by_base_path() {
        let mut ops = vec![
            op("listPets", "/pets"),
            op("getPet", "/pets/{id}"),
            op("listOffices", "/offices"),
        ];
        let groups = group_operations(&mut ops, GroupingStrategy::BasePath, "App");
        assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["pets", "offices"]);
        assert_eq!(groups["pets"].api_name, "PetsApi");
        assert_eq!(groups["pets"].operation_indices, vec![0, 1]);
        assert!(!ops[0].subresource);
        assert!(ops[1].subresource);
        assert_eq!(ops[2].base_name.as_deref(), Some("offices"));
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut grouper = OperationGrouper::new(GroupingStrategy::BasePath, "App");
        let mut o = op("listPets", "/pets");
        assert!(grouper.add(0, &mut o));
        assert!(!grouper.add(0, &mut o));
        let groups = grouper.finish();
        assert_eq!(groups["pets"].operation_ids, vec!["listPets"]);
    }

    #[test]
    fn test_client_group_overrides_key() {
        let mut ops = vec![op("listPets", "/pets"), op("adopt", "/pets/{id}/adopt")];
        ops[1].client_group = Some("adoption".to_string());
        let groups = group_operations(&mut ops, GroupingStrategy::ClientGroup, "App");
        assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["pets", "adoption"]);
        assert_eq!(ops[1].group_key.as_deref(), Some("adoption"));
        assert_eq!(ops[1].base_name.as_deref(), Some("pets"));
    }

    #[test]
    fn test_operation_id_and_single() {
        let mut ops = vec![op("b", "/x"), op("a", "/x/y")];
        ops[0].tags = vec!["one".into(), "two".into()];
        let groups = group_operations(&mut ops, GroupingStrategy::OperationId, "App");
        assert_eq!(groups.len(), 2);
        assert!(groups.values().all(|g| g.operation_indices.len() == 1));

        let groups = group_operations(&mut ops, GroupingStrategy::Single, "Petstore");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups["default"].api_name, "PetstoreClient");
        assert_eq!(groups["default"].operation_indices, vec![0, 1]);
    }
}
