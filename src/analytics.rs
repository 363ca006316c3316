use crate::models::Employee;

/// Bookmarks per week, as shown on the dashboard's distribution chart.
pub const WEEKLY_BOOKMARKS: [(&str, u32); 4] =
    [("Week 1", 3), ("Week 2", 7), ("Week 3", 5), ("Week 4", 9)];

/// Bookmark trend over the year so far.
pub const MONTHLY_BOOKMARKS: [(&str, u32); 8] = [
    ("Jan", 3),
    ("Feb", 7),
    ("Mar", 5),
    ("Apr", 9),
    ("May", 12),
    ("Jun", 8),
    ("Jul", 15),
    ("Aug", 18),
];

#[derive(Debug, Clone, PartialEq)]
pub struct DepartmentStat {
    pub department: String,
    pub headcount: usize,
    pub average_rating: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_employees: usize,
    pub average_rating: f64,
    pub total_bookmarks: u32,
    pub top_department: Option<String>,
    pub departments: Vec<DepartmentStat>,
}

pub fn summarize(employees: &[Employee]) -> Summary {
    let mut departments: Vec<(String, Vec<u8>)> = Vec::new();
    for employee in employees {
        match departments.iter_mut().find(|(d, _)| *d == employee.department) {
            Some((_, ratings)) => ratings.push(employee.rating()),
            None => departments.push((employee.department.clone(), vec![employee.rating()])),
        }
    }

    let departments: Vec<DepartmentStat> = departments
        .into_iter()
        .map(|(department, ratings)| DepartmentStat {
            headcount: ratings.len(),
            average_rating: round_to(mean(&ratings), 2),
            department,
        })
        .collect();

    // Ties keep the department seen first.
    let top_department = departments
        .iter()
        .fold(None::<&DepartmentStat>, |best, d| match best {
            Some(b) if b.average_rating >= d.average_rating => Some(b),
            _ => Some(d),
        })
        .map(|d| d.department.clone());

    let all: Vec<u8> = employees.iter().map(Employee::rating).collect();

    Summary {
        total_employees: employees.len(),
        average_rating: round_to(mean(&all), 1),
        total_bookmarks: MONTHLY_BOOKMARKS.iter().map(|(_, n)| n).sum(),
        top_department,
        departments,
    }
}

fn mean(values: &[u8]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| *v as f64).sum::<f64>() / values.len() as f64
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Renders `(label, value)` pairs as a horizontal text bar chart.
pub fn bar_chart<L: AsRef<str>>(rows: &[(L, f64)], width: usize) -> Vec<String> {
    let max = rows.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    let label_width = rows.iter().map(|(l, _)| l.as_ref().len()).max().unwrap_or(0);
    rows.iter()
        .map(|(label, value)| {
            let filled = if max > 0.0 {
                ((value / max) * width as f64).round() as usize
            } else {
                0
            };
            format!(
                "{:<lw$} | {:<w$} {}",
                label.as_ref(),
                "#".repeat(filled),
                format_value(*value),
                lw = label_width,
                w = width
            )
        })
        .collect()
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::employee;

    fn rated(id: i64, department: &str, rating: u8) -> Employee {
        let mut e = employee(id, "X", "Y", department);
        e.assigned_rating = Some(rating);
        e
    }

    #[test]
    fn test_summary_department_averages() {
        let employees = vec![
            rated(1, "Engineering", 5),
            rated(2, "Sales", 2),
            rated(3, "Engineering", 4),
            rated(4, "Sales", 3),
            rated(5, "Engineering", 4),
        ];
        let summary = summarize(&employees);
        assert_eq!(summary.total_employees, 5);
        assert_eq!(summary.average_rating, 3.6);
        assert_eq!(summary.departments[0].department, "Engineering");
        assert_eq!(summary.departments[0].headcount, 3);
        assert_eq!(summary.departments[0].average_rating, 4.33);
        assert_eq!(summary.departments[1].average_rating, 2.5);
        assert_eq!(summary.top_department.as_deref(), Some("Engineering"));
    }

    #[test]
    fn test_top_department_tie_keeps_first() {
        let employees = vec![rated(1, "Legal", 3), rated(2, "Support", 3)];
        assert_eq!(summarize(&employees).top_department.as_deref(), Some("Legal"));
    }

    #[test]
    fn test_summary_of_empty_directory() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_employees, 0);
        assert_eq!(summary.average_rating, 0.0);
        assert_eq!(summary.top_department, None);
        assert_eq!(summary.total_bookmarks, 77);
    }

    #[test]
    fn test_bar_chart_scales_to_max() {
        let lines = bar_chart(&[("A", 2.0), ("BB", 4.0)], 4);
        assert_eq!(lines[0], "A  | ##   2");
        assert_eq!(lines[1], "BB | #### 4");
    }
}
