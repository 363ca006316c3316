use std::collections::BTreeSet;

use crate::models::Employee;

pub const DEFAULT_PAGE_SIZE: usize = 9;

/// Deterministic 1-5 rating derived from an employee id.
///
/// `floor(((id * 9301 + 49297) mod 233280) / 233280 * 5) + 1`, evaluated in
/// floating point the same way the web dashboard does it so both agree.
pub fn rating_for_id(id: i64) -> u8 {
    let seed = id.wrapping_mul(9301).wrapping_add(49297).rem_euclid(233280);
    let bucket = (seed as f64 / 233280.0 * 5.0).floor() as i64 + 1;
    bucket.clamp(1, 5) as u8
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub search: String,
    pub departments: BTreeSet<String>,
    pub ratings: BTreeSet<u8>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.departments.is_empty() && self.ratings.is_empty()
    }

    pub fn matches(&self, employee: &Employee) -> bool {
        self.matches_search(employee)
            && self.matches_department(employee)
            && self.matches_rating(employee)
    }

    fn matches_search(&self, employee: &Employee) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        employee.full_name().to_lowercase().contains(&needle)
            || employee.email.to_lowercase().contains(&needle)
            || employee.department.to_lowercase().contains(&needle)
    }

    fn matches_department(&self, employee: &Employee) -> bool {
        self.departments.is_empty() || self.departments.contains(&employee.department)
    }

    fn matches_rating(&self, employee: &Employee) -> bool {
        self.ratings.is_empty() || self.ratings.contains(&employee.rating())
    }
}

/// Filters the directory, keeping the relative order of matching employees.
pub fn apply<'a>(directory: &'a [Employee], criteria: &FilterCriteria) -> Vec<&'a Employee> {
    directory.iter().filter(|e| criteria.matches(e)).collect()
}

/// Distinct, non-empty departments in sorted order.
pub fn departments(directory: &[Employee]) -> Vec<String> {
    directory
        .iter()
        .map(|e| e.department.as_str())
        .filter(|d| !d.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pager {
    page_size: usize,
    current: usize,
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current: 1,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total_pages(&self, total_items: usize) -> usize {
        total_items.div_ceil(self.page_size)
    }

    pub fn reset(&mut self) {
        self.current = 1;
    }

    pub fn next(&mut self, total_items: usize) {
        if self.current < self.total_pages(total_items) {
            self.current += 1;
        }
    }

    pub fn prev(&mut self) {
        if self.current > 1 {
            self.current -= 1;
        }
    }

    /// Jumps to `page`, clamped into the valid range.
    pub fn go_to(&mut self, page: usize, total_items: usize) {
        self.current = page.clamp(1, self.total_pages(total_items).max(1));
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.current - 1) * self.page_size;
        if start >= items.len() {
            return &[];
        }
        let end = (start + self.page_size).min(items.len());
        &items[start..end]
    }
}

/// Filter criteria plus the page the user is on. Changing any criterion sends
/// the user back to the first page.
#[derive(Debug, Clone)]
pub struct DirectoryView {
    criteria: FilterCriteria,
    pager: Pager,
}

impl DirectoryView {
    pub fn new(page_size: usize) -> Self {
        Self {
            criteria: FilterCriteria::default(),
            pager: Pager::new(page_size),
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        if search != self.criteria.search {
            self.criteria.search = search;
            self.pager.reset();
        }
    }

    pub fn toggle_department(&mut self, department: &str) {
        if !self.criteria.departments.remove(department) {
            self.criteria.departments.insert(department.to_string());
        }
        self.pager.reset();
    }

    pub fn toggle_rating(&mut self, rating: u8) {
        if !self.criteria.ratings.remove(&rating) {
            self.criteria.ratings.insert(rating);
        }
        self.pager.reset();
    }

    pub fn clear(&mut self) {
        self.criteria = FilterCriteria::default();
        self.pager.reset();
    }

    pub fn next_page(&mut self, directory: &[Employee]) {
        let total = apply(directory, &self.criteria).len();
        self.pager.next(total);
    }

    pub fn prev_page(&mut self) {
        self.pager.prev();
    }

    pub fn go_to_page(&mut self, page: usize, directory: &[Employee]) {
        let total = apply(directory, &self.criteria).len();
        self.pager.go_to(page, total);
    }

    pub fn filtered<'a>(&self, directory: &'a [Employee]) -> Vec<&'a Employee> {
        apply(directory, &self.criteria)
    }

    pub fn current_page<'a>(&self, directory: &'a [Employee]) -> Vec<&'a Employee> {
        let filtered = self.filtered(directory);
        self.pager.slice(&filtered).to_vec()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn employee(id: i64, first: &str, last: &str, department: &str) -> Employee {
        Employee {
            id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: format!("{}.{}@corp.test", first.to_lowercase(), last.to_lowercase()),
            department: department.to_string(),
            age: None,
            title: None,
            phone: None,
            assigned_rating: None,
        }
    }

    fn sample_directory() -> Vec<Employee> {
        vec![
            employee(1, "Emily", "Johnson", "Engineering"),
            employee(2, "Michael", "Williams", "Sales"),
            employee(3, "Sophia", "Brown", "Engineering"),
            employee(4, "James", "Davis", "Sales"),
            employee(5, "Emma", "Miller", "Engineering"),
        ]
    }

    #[test]
    fn test_rating_for_id_known_values() {
        assert_eq!(rating_for_id(1), 2);
        assert_eq!(rating_for_id(2), 2);
        assert_eq!(rating_for_id(7), 3);
        assert_eq!(rating_for_id(10), 4);
        assert_eq!(rating_for_id(15), 5);
        assert_eq!(rating_for_id(20), 1);
    }

    #[test]
    fn test_rating_for_id_stays_in_range() {
        for id in -500..5000 {
            let rating = rating_for_id(id);
            assert!((1..=5).contains(&rating), "id {} gave {}", id, rating);
            assert_eq!(rating, rating_for_id(id));
        }
    }

    #[test]
    fn test_empty_criteria_returns_directory_unchanged() {
        let directory = sample_directory();
        let result = apply(&directory, &FilterCriteria::default());
        let ids: Vec<i64> = result.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_department_filter_keeps_relative_order() {
        let directory = sample_directory();
        let mut criteria = FilterCriteria::default();
        criteria.departments.insert("Sales".to_string());
        let ids: Vec<i64> = apply(&directory, &criteria).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[test]
    fn test_department_filter_is_case_sensitive() {
        let directory = sample_directory();
        let mut criteria = FilterCriteria::default();
        criteria.departments.insert("sales".to_string());
        assert!(apply(&directory, &criteria).is_empty());
    }

    #[test]
    fn test_search_matches_department_case_insensitively() {
        let directory = sample_directory();
        let criteria = FilterCriteria {
            search: "eng".to_string(),
            ..Default::default()
        };
        let ids: Vec<i64> = apply(&directory, &criteria).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3, 5]);
    }

    #[test]
    fn test_search_matches_full_name_and_email() {
        let directory = sample_directory();
        let by_name = FilterCriteria {
            search: "SOPHIA BR".to_string(),
            ..Default::default()
        };
        assert_eq!(apply(&directory, &by_name)[0].id, 3);

        let by_email = FilterCriteria {
            search: "davis@corp".to_string(),
            ..Default::default()
        };
        assert_eq!(apply(&directory, &by_email)[0].id, 4);
    }

    #[test]
    fn test_rating_filter_agrees_with_displayed_rating() {
        let directory = sample_directory();
        let mut criteria = FilterCriteria::default();
        criteria.ratings.insert(2);
        for employee in apply(&directory, &criteria) {
            assert_eq!(employee.rating(), 2);
        }
        let expected = directory.iter().filter(|e| e.rating() == 2).count();
        assert_eq!(apply(&directory, &criteria).len(), expected);
    }

    #[test]
    fn test_all_predicates_must_pass() {
        let directory = sample_directory();
        let mut criteria = FilterCriteria {
            search: "em".to_string(),
            ..Default::default()
        };
        criteria.departments.insert("Engineering".to_string());
        criteria.ratings.insert(rating_for_id(5));
        let result = apply(&directory, &criteria);
        assert!(result.iter().all(|e| e.department == "Engineering"));
        assert!(result.iter().any(|e| e.id == 5));
    }

    #[test]
    fn test_apply_output_is_subsequence() {
        let directory = sample_directory();
        let mut criteria = FilterCriteria::default();
        criteria.ratings.extend([1, 2, 3]);
        let result = apply(&directory, &criteria);
        let mut cursor = directory.iter();
        for employee in result {
            assert!(cursor.any(|e| e.id == employee.id));
        }
    }

    #[test]
    fn test_departments_are_distinct_and_sorted() {
        let mut directory = sample_directory();
        directory.push(employee(6, "No", "Dept", ""));
        assert_eq!(departments(&directory), vec!["Engineering", "Sales"]);
    }

    #[test]
    fn test_pager_saturates_at_bounds() {
        let mut pager = Pager::new(2);
        assert_eq!(pager.total_pages(5), 3);
        pager.prev();
        assert_eq!(pager.current(), 1);
        pager.next(5);
        pager.next(5);
        pager.next(5);
        assert_eq!(pager.current(), 3);
        let items = [1, 2, 3, 4, 5];
        assert_eq!(pager.slice(&items), &[5]);
    }

    #[test]
    fn test_view_resets_page_on_criteria_change() {
        let directory = sample_directory();
        let mut view = DirectoryView::new(2);
        view.next_page(&directory);
        assert_eq!(view.pager().current(), 2);

        view.toggle_department("Engineering");
        assert_eq!(view.pager().current(), 1);

        view.next_page(&directory);
        view.set_search("e");
        assert_eq!(view.pager().current(), 1);

        view.next_page(&directory);
        view.toggle_rating(3);
        assert_eq!(view.pager().current(), 1);
    }

    #[test]
    fn test_view_current_page_slices_filtered_results() {
        let directory = sample_directory();
        let mut view = DirectoryView::new(2);
        view.toggle_department("Engineering");
        view.next_page(&directory);
        let ids: Vec<i64> = view.current_page(&directory).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![5]);
    }
}
