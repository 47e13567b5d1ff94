//! Static label maps and the curated course catalog.
//!
//! Study methods: 0 Collaborative, 1 Offline Content, 2 Interactive,
//! 3 Informational, 4 Resource-Based. Engagement levels: 0 Moderate,
//! 1 High, 2 Low. The catalog pairs each combination with four curated
//! course names.

pub fn study_method_label(id: i32) -> Option<&'static str> {
    match id {
        0 => Some("Collaborative"),
        1 => Some("Offline Content"),
        2 => Some("Interactive"),
        3 => Some("Informational"),
        4 => Some("Resource-Based"),
        _ => None,
    }
}

pub fn engagement_label(id: i32) -> Option<&'static str> {
    match id {
        0 => Some("Moderate Engagement"),
        1 => Some("High Engagement"),
        2 => Some("Low Engagement"),
        _ => None,
    }
}

pub fn study_method_label_or_unknown(id: i32) -> String {
    study_method_label(id)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Unknown ({id})"))
}

pub fn engagement_label_or_unknown(id: i32) -> String {
    engagement_label(id)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Unknown ({id})"))
}

/// Curated course list for a (study method, engagement level) pair.
pub fn courses_for(study_method: i32, engagement: i32) -> Option<&'static [&'static str]> {
    match (study_method, engagement) {
        (0, 0) => Some(&[
            "Interactive AI Basics: Weekly Quizzes and Forums",
            "Applied AI: Practical Exercises with Peer Feedback",
            "Introduction to Machine Learning: Online Workshops",
            "AI Ethics: Case Studies and Discussion Groups",
        ]),
        (0, 1) => Some(&[
            "Collaborative AI Projects: Team-Based Learning",
            "Advanced AI Techniques: Group Workshops and Peer Reviews",
            "Machine Learning Bootcamp: Intensive Group Projects",
            "AI in Practice: Team Challenges and Hackathons",
        ]),
        (0, 2) => Some(&[
            "Introduction to AI: Self-Paced Fundamentals",
            "AI Basics: Introductory Video Series",
            "Foundations of Machine Learning: Self-Study Edition",
            "AI for Everyone: Introductory Readings and Quizzes",
        ]),
        (1, 0) => Some(&[
            "AI Principles: Self-Study with Case Studies",
            "Machine Learning: Offline Course with Practice Problems",
            "Applied AI: Textbook and Supplementary Materials",
            "Data Science: Case Studies and Analytical Exercises",
        ]),
        (1, 1) => Some(&[
            "Advanced AI: Comprehensive Textbook with Projects",
            "Deep Learning: In-Depth Study with Capstone Projects",
            "AI and Machine learning: Project-Based Learning",
            "Data Science Mastery: Offline Content with Comprehensive Projects",
        ]),
        (1, 2) => Some(&[
            "AI Basics: Essential Readings and Key Concepts",
            "Machine Learning Fundamentals: Self-Study Workbook",
            "AI Concepts: Downloadable Lecture Series",
            "Introduction to Data Science: Offline Learning Modules",
        ]),
        (2, 0) => Some(&[
            "Machine Learning: Interactive Coding Exercises",
            "AI Applications: Interactive Case Studies",
            "Data Science: Interactive Projects and Peer Reviews",
            "AI Ethics: Discussion Forums and Interactive Scenarios",
        ]),
        (2, 1) => Some(&[
            "Advanced AI: Interactive Group Projects and Hackathons",
            "Deep Learning: Interactive Labs and Collaborative Projects",
            "Machine Learning Mastery: Interactive Workshops and Challenges",
            "AI Research: Collaborative Research Projects and Peer Feedback",
        ]),
        (2, 2) => Some(&[
            "AI Basics: Interactive Quizzes and Flashcards",
            "Introduction to Machine Learning: Interactive Visualizations",
            "AI Fundamentals: Interactive Notebooks",
            "AI Concepts: Gamified Learning Modules",
        ]),
        (3, 0) => Some(&[
            "Machine Learning: Structured Video Course",
            "AI Concepts: Comprehensive Video Series",
            "Data Science: Interactive Reading and Video Modules",
            "AI in Practice: Lecture Notes and Case Studies",
        ]),
        (3, 1) => Some(&[
            "Advanced AI: Detailed Lecture Series and Readings",
            "Deep Learning: Advanced Lecture Series with Supplemental Readings",
            "AI and Machine Learning: Research Papers and Advanced Lectures",
            "Data Science Masterclass: Comprehensive Reading and Video Content",
        ]),
        (3, 2) => Some(&[
            "AI Overview: Short Video Lectures",
            "Introduction to Machine Learning: Podcast Series",
            "AI Fundamentals: Infographics and Summaries",
            "Data Science: Essential Readings and Articles",
        ]),
        (4, 0) => Some(&[
            "Machine Learning: Comprehensive eBooks and Guides",
            "AI Applications: Case Study Compilations",
            "Data Science: In-Depth Articles and White Papers",
            "AI Concepts: Research Articles and Detailed Guides",
        ]),
        (4, 1) => Some(&[
            "Advanced AI: Research Papers and Technical Reports",
            "Deep Learning: Comprehensive Textbooks and Resource Repositories",
            "Machine Learning Mastery: Advanced Documentation and APIs",
            "AI Ethics: Government and Institutional Reports",
        ]),
        (4, 2) => Some(&[
            "AI Basics: Curated Reading Lists",
            "Introduction to Machine Learning: Beginner-Friendly Blogs",
            "Data Science Overview: Quick Reference Guides",
            "AI Fundamentals: Online Documentation",
        ]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_combination_has_four_courses() {
        for study in 0..5 {
            for engagement in 0..3 {
                let courses = courses_for(study, engagement)
                    .unwrap_or_else(|| panic!("no catalog cell for ({study}, {engagement})"));
                assert_eq!(courses.len(), 4, "cell ({study}, {engagement})");
            }
        }
    }

    #[test]
    fn labels_match_known_ids() {
        assert_eq!(study_method_label(0), Some("Collaborative"));
        assert_eq!(study_method_label(4), Some("Resource-Based"));
        assert_eq!(engagement_label(1), Some("High Engagement"));
        assert_eq!(engagement_label(2), Some("Low Engagement"));
    }

    #[test]
    fn out_of_range_ids_fall_back_to_unknown() {
        assert_eq!(study_method_label(5), None);
        assert_eq!(engagement_label(-1), None);
        assert_eq!(study_method_label_or_unknown(9), "Unknown (9)");
        assert_eq!(engagement_label_or_unknown(-1), "Unknown (-1)");
    }

    #[test]
    fn collaborative_high_cell_is_the_team_track() {
        let courses = courses_for(0, 1).unwrap();
        assert_eq!(courses[0], "Collaborative AI Projects: Team-Based Learning");
        assert_eq!(courses[3], "AI in Practice: Team Challenges and Hackathons");
    }
}
