use anyhow::Result;

use crate::db::Database;
use crate::models::Employee;

const STORAGE_KEY: &str = "bookmarks";

/// Bookmarked employees, stored as full snapshots in insertion order.
pub struct BookmarkStore<'a> {
    db: &'a Database,
    entries: Vec<Employee>,
}

impl<'a> BookmarkStore<'a> {
    /// Loads the persisted set. Missing or unreadable data yields an empty set.
    pub fn hydrate(db: &'a Database) -> Self {
        let entries = match db.get_item(STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Employee>>(&raw) {
                Ok(entries) => dedupe(entries),
                Err(e) => {
                    log::warn!("Ignoring malformed bookmark data: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Could not read bookmarks: {:#}", e);
                Vec::new()
            }
        };
        Self { db, entries }
    }

    pub fn is_bookmarked(&self, id: i64) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Adds a copy of `employee` or removes the existing entry with its id.
    /// Returns whether the employee is bookmarked afterwards.
    /// The in-memory set only changes once the new set has been written.
    pub fn toggle(&mut self, employee: &Employee) -> Result<bool> {
        let mut next = self.entries.clone();
        let now_bookmarked = if let Some(pos) = next.iter().position(|e| e.id == employee.id) {
            next.remove(pos);
            false
        } else {
            next.push(employee.clone());
            true
        };
        self.persist(&next)?;
        self.entries = next;
        Ok(now_bookmarked)
    }

    /// Toggles by id. Removing uses the stored snapshot; `lookup` is only
    /// called when the employee is not bookmarked yet.
    pub fn toggle_id<F>(&mut self, id: i64, lookup: F) -> Result<(Employee, bool)>
    where
        F: FnOnce(i64) -> Result<Employee>,
    {
        let employee = match self.entries.iter().find(|e| e.id == id) {
            Some(existing) => existing.clone(),
            None => lookup(id)?,
        };
        let now_bookmarked = self.toggle(&employee)?;
        Ok((employee, now_bookmarked))
    }

    pub fn list(&self) -> &[Employee] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self, entries: &[Employee]) -> Result<()> {
        let serialized = serde_json::to_string(entries)?;
        self.db.set_item(STORAGE_KEY, &serialized)
    }
}

fn dedupe(entries: Vec<Employee>) -> Vec<Employee> {
    let mut seen = std::collections::HashSet::new();
    entries.into_iter().filter(|e| seen.insert(e.id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::employee;

    #[test]
    fn test_hydrate_empty_when_absent() {
        let db = Database::open_in_memory().unwrap();
        let store = BookmarkStore::hydrate(&db);
        assert!(store.is_empty());
    }

    #[test]
    fn test_hydrate_ignores_malformed_data() {
        let db = Database::open_in_memory().unwrap();
        db.set_item(STORAGE_KEY, "{not json").unwrap();
        assert!(BookmarkStore::hydrate(&db).is_empty());

        db.set_item(STORAGE_KEY, r#"{"id": 1}"#).unwrap();
        assert!(BookmarkStore::hydrate(&db).is_empty());
    }

    #[test]
    fn test_toggle_twice_restores_previous_state() {
        let db = Database::open_in_memory().unwrap();
        let mut store = BookmarkStore::hydrate(&db);
        let a = employee(1, "Ann", "Lee", "Sales");
        let b = employee(2, "Bo", "Kim", "Sales");
        store.toggle(&a).unwrap();
        let before: Vec<i64> = store.list().iter().map(|e| e.id).collect();

        assert!(store.toggle(&b).unwrap());
        assert!(!store.toggle(&b).unwrap());

        let after: Vec<i64> = store.list().iter().map(|e| e.id).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_toggle_sequence_leaves_remaining_member() {
        let db = Database::open_in_memory().unwrap();
        let mut store = BookmarkStore::hydrate(&db);
        let seven = employee(7, "Sev", "En", "Engineering");
        let three = employee(3, "Thr", "Ee", "Sales");
        store.toggle(&seven).unwrap();
        store.toggle(&three).unwrap();
        store.toggle(&seven).unwrap();

        let ids: Vec<i64> = store.list().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3]);
        assert!(store.is_bookmarked(3));
        assert!(!store.is_bookmarked(7));
    }

    #[test]
    fn test_bookmarks_survive_reload() {
        let db = Database::open_in_memory().unwrap();
        let mut original = employee(12, "Liam", "Wilson", "Marketing");
        original.age = Some(41);
        original.assigned_rating = Some(4);
        {
            let mut store = BookmarkStore::hydrate(&db);
            store.toggle(&original).unwrap();
        }
        let reloaded = BookmarkStore::hydrate(&db);
        assert_eq!(reloaded.list(), &[original]);
    }

    #[test]
    fn test_bookmark_is_a_snapshot() {
        let db = Database::open_in_memory().unwrap();
        let mut store = BookmarkStore::hydrate(&db);
        let mut record = employee(4, "Noah", "Ng", "Support");
        store.toggle(&record).unwrap();
        record.department = "Legal".to_string();
        assert_eq!(store.list()[0].department, "Support");
    }

    #[test]
    fn test_hydrate_drops_duplicate_ids() {
        let db = Database::open_in_memory().unwrap();
        let a = employee(5, "A", "A", "X");
        let json = serde_json::to_string(&vec![a.clone(), a]).unwrap();
        db.set_item(STORAGE_KEY, &json).unwrap();
        assert_eq!(BookmarkStore::hydrate(&db).len(), 1);
    }

    #[test]
    fn test_failed_write_leaves_set_unchanged() {
        let db = Database::open_in_memory().unwrap();
        let mut store = BookmarkStore::hydrate(&db);
        let seven = employee(7, "Sev", "En", "Engineering");
        let eight = employee(8, "Ei", "Ght", "Sales");
        store.toggle(&seven).unwrap();

        db.break_storage();
        assert!(store.toggle(&seven).is_err());
        assert!(store.is_bookmarked(7));
        assert!(store.toggle(&eight).is_err());
        assert!(!store.is_bookmarked(8));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_toggle_id_removes_without_lookup() {
        let db = Database::open_in_memory().unwrap();
        let mut store = BookmarkStore::hydrate(&db);
        store.toggle(&employee(7, "Sev", "En", "Engineering")).unwrap();

        let (removed, now_bookmarked) = store
            .toggle_id(7, |id| Err(anyhow::anyhow!("employee #{} unreachable", id)))
            .unwrap();
        assert_eq!(removed.first_name, "Sev");
        assert!(!now_bookmarked);
        assert!(BookmarkStore::hydrate(&db).is_empty());
    }

    #[test]
    fn test_toggle_id_looks_up_new_bookmarks() {
        let db = Database::open_in_memory().unwrap();
        let mut store = BookmarkStore::hydrate(&db);
        let (added, now_bookmarked) = store
            .toggle_id(3, |id| Ok(employee(id, "Thr", "Ee", "Sales")))
            .unwrap();
        assert_eq!(added.id, 3);
        assert!(now_bookmarked);

        let failed = store.toggle_id(4, |id| Err(anyhow::anyhow!("employee #{} unreachable", id)));
        assert!(failed.is_err());
        assert_eq!(store.len(), 1);
    }
}
