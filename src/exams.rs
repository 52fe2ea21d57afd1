//! Catalog of exams the platform can generate content for.
//!
//! Submission validation parses the caller-supplied exam name against this
//! fixed set; anything else is rejected before a job is created.

use std::fmt;
use std::str::FromStr;

/// Smallest accepted questions-per-subject count.
pub const MIN_QUESTIONS_PER_SUBJECT: u32 = 10;
/// Largest accepted questions-per-subject count.
pub const MAX_QUESTIONS_PER_SUBJECT: u32 = 100;

/// A supported competitive exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exam {
    Jee,
    Gate,
    Upsc,
    Neet,
    Nmms,
}

impl Exam {
    pub const ALL: [Exam; 5] = [Exam::Jee, Exam::Gate, Exam::Upsc, Exam::Neet, Exam::Nmms];

    /// Canonical (uppercase) exam name as used in filenames and API payloads.
    pub fn name(self) -> &'static str {
        match self {
            Exam::Jee => "JEE",
            Exam::Gate => "GATE",
            Exam::Upsc => "UPSC",
            Exam::Neet => "NEET",
            Exam::Nmms => "NMMS",
        }
    }

    /// Subjects a generated question set covers for this exam.
    pub fn subjects(self) -> &'static [&'static str] {
        match self {
            Exam::Jee => &["Physics", "Chemistry", "Mathematics"],
            Exam::Gate => &["General Aptitude", "Engineering Mathematics", "Technical Ability"],
            Exam::Upsc => &["General Studies", "CSAT", "Current Affairs"],
            Exam::Neet => &["Physics", "Chemistry", "Biology"],
            Exam::Nmms => &["Mental Ability", "Scholastic Aptitude"],
        }
    }
}

impl fmt::Display for Exam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Exam {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "JEE" => Ok(Exam::Jee),
            "GATE" => Ok(Exam::Gate),
            "UPSC" => Ok(Exam::Upsc),
            "NEET" => Ok(Exam::Neet),
            "NMMS" => Ok(Exam::Nmms),
            _ => Err(()),
        }
    }
}

/// Comma-separated list of all supported exam names, for error messages.
pub fn supported_exams() -> String {
    Exam::ALL
        .iter()
        .map(|e| e.name())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_exams() {
        assert_eq!("JEE".parse::<Exam>(), Ok(Exam::Jee));
        assert_eq!("neet".parse::<Exam>(), Ok(Exam::Neet));
        assert_eq!(" Gate ".parse::<Exam>(), Ok(Exam::Gate));
    }

    #[test]
    fn test_parse_unknown_exam() {
        assert!("INVALID".parse::<Exam>().is_err());
        assert!("".parse::<Exam>().is_err());
    }

    #[test]
    fn test_every_exam_has_subjects() {
        for exam in Exam::ALL {
            assert!(!exam.subjects().is_empty(), "{exam} has no subjects");
        }
    }

    #[test]
    fn test_jee_covers_three_subjects() {
        assert_eq!(Exam::Jee.subjects().len(), 3);
    }

    #[test]
    fn test_supported_exams_lists_all() {
        let listed = supported_exams();
        for exam in Exam::ALL {
            assert!(listed.contains(exam.name()));
        }
    }
}
