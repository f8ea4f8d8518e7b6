//! Text search across collections

use crate::core::entity::EntityRef;
use crate::core::identity::EntityKind;
use crate::core::storage::Storage;

/// Entities matching `query`, in the fixed kind order then insertion order
///
/// `kinds` restricts the searched collections; `None` searches all nine.
/// An empty query matches everything.
pub fn search<'a>(
    storage: &'a Storage,
    query: &str,
    kinds: Option<&[EntityKind]>,
    limit: Option<usize>,
) -> Vec<EntityRef<'a>> {
    let kinds = kinds.unwrap_or(EntityKind::all());

    let hits = EntityKind::all()
        .iter()
        .filter(|kind| kinds.contains(kind))
        .flat_map(|&kind| storage.entities(kind))
        .filter(|entity| entity.contains(query));

    match limit {
        Some(n) => hits.take(n).collect(),
        None => hits.collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Part, Resource, Step};

    fn storage() -> Storage {
        let mut storage = Storage::new();
        storage.add_resource(EntityKind::Tool, Resource::new("WRENCH-10", "Widget wrench"));
        storage.add_part(Part::new("WIDGET-1", "Widget"));

        let mut step = Step::new("STEP-1", "Assemble");
        step.add_inputpart("WIDGET-1", 1.0);
        storage.add_step(step);

        storage.add_step(Step::new("STEP-2", "Paint"));
        storage
    }

    #[test]
    fn test_search_all_kinds_in_order() {
        let storage = storage();
        let hits = search(&storage, "widget", None, None);
        let kinds: Vec<EntityKind> = hits.iter().map(|h| h.kind()).collect();
        assert_eq!(kinds, vec![EntityKind::Tool, EntityKind::Part, EntityKind::Step]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let storage = storage();
        assert_eq!(
            search(&storage, "widget", None, None).len(),
            search(&storage, "WIDGET", None, None).len()
        );
    }

    #[test]
    fn test_search_kind_filter_and_limit() {
        let storage = storage();
        let steps = search(&storage, "", Some(&[EntityKind::Step]), None);
        assert_eq!(steps.len(), 2);

        let limited = search(&storage, "", None, Some(1));
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].key(), "WRENCH-10");
    }

    #[test]
    fn test_search_no_match() {
        let storage = storage();
        assert!(search(&storage, "gearbox", None, None).is_empty());
    }
}
