use rand::Rng;
use rand::seq::SliceRandom;

use crate::models::Employee;

const QUARTERS: [&str; 4] = ["Q1 2024", "Q2 2024", "Q3 2024", "Q4 2024"];

const ACHIEVEMENTS: [&str; 6] = [
    "Exceeded sales targets by 15%",
    "Led successful product launch",
    "Improved team efficiency by 25%",
    "Completed certification program",
    "Mentored 3 junior employees",
    "Reduced project costs by 10%",
];

const PROJECTS: [(&str, &str, u8); 5] = [
    ("Digital Transformation Initiative", "In Progress", 75),
    ("Customer Experience Enhancement", "Completed", 100),
    ("Process Optimization Project", "In Progress", 45),
    ("Team Training Program", "Planning", 15),
    ("Quality Assurance Upgrade", "Completed", 100),
];

const FEEDBACK: [(&str, &str, u8); 4] = [
    ("Manager", "Excellent leadership skills and consistently delivers high-quality work.", 5),
    ("Peer", "Great team player and always willing to help colleagues.", 4),
    ("Direct Report", "Supportive manager who provides clear guidance and feedback.", 5),
    ("Client", "Professional and responsive to our needs. Pleasure to work with.", 4),
];

#[derive(Debug, Clone)]
pub struct QuarterReview {
    pub period: &'static str,
    pub rating: u8,
    pub achievement: &'static str,
}

#[derive(Debug, Clone)]
pub struct Project {
    pub name: &'static str,
    pub status: &'static str,
    pub completion: u8,
}

#[derive(Debug, Clone)]
pub struct FeedbackEntry {
    pub source: &'static str,
    pub content: &'static str,
    pub rating: u8,
}

/// Employee detail page data. Everything beyond `employee` is mock content.
#[derive(Debug, Clone)]
pub struct Profile {
    pub employee: Employee,
    pub bio: String,
    pub performance_rating: u8,
    pub history: Vec<QuarterReview>,
    pub projects: Vec<Project>,
    pub feedback: Vec<FeedbackEntry>,
}

pub fn build_profile<R: Rng>(employee: Employee, rng: &mut R) -> Profile {
    let bio = mock_bio(&employee.first_name, rng);

    let history = QUARTERS
        .iter()
        .map(|period| QuarterReview {
            period: *period,
            rating: rng.gen_range(1..=5),
            achievement: ACHIEVEMENTS.choose(rng).copied().unwrap_or(ACHIEVEMENTS[0]),
        })
        .collect();

    let project_count = rng.gen_range(2..=4);
    let projects = PROJECTS
        .iter()
        .take(project_count)
        .map(|&(name, status, completion)| Project {
            name,
            status,
            completion,
        })
        .collect();

    let feedback_count = rng.gen_range(2..=3);
    let feedback = FEEDBACK
        .iter()
        .take(feedback_count)
        .map(|&(source, content, rating)| FeedbackEntry {
            source,
            content,
            rating,
        })
        .collect();

    Profile {
        performance_rating: rng.gen_range(1..=5),
        employee,
        bio,
        history,
        projects,
        feedback,
    }
}

fn mock_bio<R: Rng>(first_name: &str, rng: &mut R) -> String {
    let templates = [
        "{} is a dedicated professional with over 5 years of experience in the industry. Known for exceptional problem-solving skills and team collaboration.",
        "{} brings innovative thinking and strong leadership qualities to every project. Passionate about continuous learning and professional development.",
        "{} is a results-driven individual with expertise in project management and strategic planning. Committed to delivering high-quality work consistently.",
        "{} excels in cross-functional collaboration and has a proven track record of exceeding performance targets. Values work-life balance and team success.",
    ];
    let template = templates[rng.gen_range(0..templates.len())];
    template.replacen("{}", first_name, 1)
}

pub fn performance_badge(rating: u8) -> &'static str {
    match rating {
        5 => "Outstanding",
        4 => "Exceeds Expectations",
        3 => "Meets Expectations",
        2 => "Needs Improvement",
        1 => "Below Expectations",
        _ => "Meets Expectations",
    }
}

pub fn stars(rating: u8) -> String {
    let filled = rating.min(5) as usize;
    format!("{}{}", "*".repeat(filled), ".".repeat(5 - filled))
}
