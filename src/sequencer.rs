use crate::models::ImportJob;
use crate::resolver::EntityType;

/// Declared prerequisite edges: an entity is imported only after everything
/// it references. Adding an EntityType without an entry here fails the
/// coverage test below, so the ordering cannot silently go stale.
const PREREQUISITES: &[(EntityType, &[EntityType])] = &[
    (EntityType::ChartOfAccounts, &[]),
    (EntityType::BankAccounts, &[EntityType::ChartOfAccounts]),
    (EntityType::Properties, &[]),
    (EntityType::Projects, &[EntityType::Properties]),
    (EntityType::Vendors, &[]),
    (EntityType::Customers, &[]),
    (EntityType::Employees, &[]),
    (EntityType::Equipment, &[]),
    (EntityType::Invoices, &[EntityType::Customers, EntityType::Projects]),
    (EntityType::Bills, &[EntityType::Vendors, EntityType::Projects]),
    (EntityType::Tasks, &[EntityType::Projects]),
];

/// Topological order of the prerequisite graph, deterministic: among ready
/// nodes, declaration order wins. Entities stuck in a cycle (a programming
/// error in PREREQUISITES) end up appended in declaration order so callers
/// still get every declared entity; the acyclicity test catches the bug.
pub fn dependency_order() -> Vec<EntityType> {
    let mut order: Vec<EntityType> = Vec::with_capacity(PREREQUISITES.len());
    loop {
        let mut progressed = false;
        for (entity, prereqs) in PREREQUISITES {
            if order.contains(entity) {
                continue;
            }
            if prereqs.iter().all(|p| order.contains(p)) {
                order.push(*entity);
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }
    for (entity, _) in PREREQUISITES {
        if !order.contains(entity) {
            order.push(*entity);
        }
    }
    order
}

/// Position in the topological order; entities absent from the declared
/// graph sort after everything present.
fn position(order: &[EntityType], entity: EntityType) -> usize {
    order
        .iter()
        .position(|e| *e == entity)
        .unwrap_or(order.len())
}

/// Stable sort by dependency position: ties keep original sheet order.
pub fn sequence(mut jobs: Vec<ImportJob>) -> Vec<ImportJob> {
    let order = dependency_order();
    jobs.sort_by_key(|job| position(&order, job.entity));
    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ParsedSheet;

    fn job(entity: EntityType, sheet_name: &str) -> ImportJob {
        ImportJob {
            entity,
            sheet: ParsedSheet {
                name: sheet_name.to_string(),
                headers: vec!["name".to_string()],
                rows: Vec::new(),
            },
        }
    }

    #[test]
    fn test_graph_covers_all_entities() {
        for entity in EntityType::ALL {
            assert!(
                PREREQUISITES.iter().any(|(e, _)| e == entity),
                "{} missing from PREREQUISITES",
                entity.key()
            );
        }
        assert_eq!(PREREQUISITES.len(), EntityType::ALL.len());
    }

    #[test]
    fn test_graph_is_acyclic() {
        // A cycle would leave nodes that never become ready; the topological
        // pass then cannot place every prerequisite before its dependents.
        let order = dependency_order();
        assert_eq!(order.len(), PREREQUISITES.len());
        for (entity, prereqs) in PREREQUISITES {
            let pos = order.iter().position(|e| e == entity).unwrap();
            for p in *prereqs {
                let ppos = order.iter().position(|e| e == p).unwrap();
                assert!(ppos < pos, "{} must precede {}", p.key(), entity.key());
            }
        }
    }

    #[test]
    fn test_sequence_reorders_by_dependency() {
        let jobs = vec![
            job(EntityType::Invoices, "invoices"),
            job(EntityType::ChartOfAccounts, "accounts"),
            job(EntityType::Projects, "projects"),
        ];
        let ordered = sequence(jobs);
        let keys: Vec<&str> = ordered.iter().map(|j| j.entity.key()).collect();
        assert_eq!(keys, vec!["chart_of_accounts", "projects", "invoices"]);
    }

    #[test]
    fn test_sequence_is_stable_for_ties() {
        let jobs = vec![
            job(EntityType::Projects, "phase one"),
            job(EntityType::Projects, "phase two"),
            job(EntityType::ChartOfAccounts, "accounts"),
            job(EntityType::Projects, "phase three"),
        ];
        let ordered = sequence(jobs);
        assert_eq!(ordered[0].sheet.name, "accounts");
        assert_eq!(ordered[1].sheet.name, "phase one");
        assert_eq!(ordered[2].sheet.name, "phase two");
        assert_eq!(ordered[3].sheet.name, "phase three");
    }
}
