//! Subject fields
//!
//! The fixed, positionally ordered set of academic domains. A field's index is
//! the component index in both `topic_weight` and `user_topic_weight`, and its
//! label is what recommendation endpoints return to clients.

use serde::{Deserialize, Serialize};

/// Number of subject fields (length of every weight vector)
pub const FIELD_COUNT: usize = 17;

/// Academic domain used as a weight-vector dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectField {
    Mathematics,
    Science,
    Physics,
    Sociology,
    Biology,
    Chemistry,
    Technology,
    BusinessEconomics,
    Arts,
    LiteratureLinguistics,
    Education,
    Law,
    Environment,
    Health,
    Geography,
    Communication,
    HistoryPhilosophy,
}

impl SubjectField {
    /// All fields in vector order
    pub const ALL: [SubjectField; FIELD_COUNT] = [
        SubjectField::Mathematics,
        SubjectField::Science,
        SubjectField::Physics,
        SubjectField::Sociology,
        SubjectField::Biology,
        SubjectField::Chemistry,
        SubjectField::Technology,
        SubjectField::BusinessEconomics,
        SubjectField::Arts,
        SubjectField::LiteratureLinguistics,
        SubjectField::Education,
        SubjectField::Law,
        SubjectField::Environment,
        SubjectField::Health,
        SubjectField::Geography,
        SubjectField::Communication,
        SubjectField::HistoryPhilosophy,
    ];

    /// Field for a vector component index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Component index of this field
    pub fn index(self) -> usize {
        self as usize
    }

    /// Client-facing label
    pub fn label(self) -> &'static str {
        match self {
            SubjectField::Mathematics => "Matematika",
            SubjectField::Science => "Sains",
            SubjectField::Physics => "Fisika",
            SubjectField::Sociology => "Sosiologi",
            SubjectField::Biology => "Biologi",
            SubjectField::Chemistry => "Kimia",
            SubjectField::Technology => "Teknologi",
            SubjectField::BusinessEconomics => "Bisnis dan Ekonomi",
            SubjectField::Arts => "Seni",
            SubjectField::LiteratureLinguistics => "Sastra dan Linguistik",
            SubjectField::Education => "Pendidikan",
            SubjectField::Law => "Hukum",
            SubjectField::Environment => "Lingkungan",
            SubjectField::Health => "Kesehatan",
            SubjectField::Geography => "Geografi",
            SubjectField::Communication => "Komunikasi",
            SubjectField::HistoryPhilosophy => "Sejarah dan Filsafat",
        }
    }
}

/// Map component indices to labels, skipping indices outside the table
pub fn labels_for(indices: &[usize]) -> Vec<String> {
    indices
        .iter()
        .filter_map(|&i| SubjectField::from_index(i))
        .map(|f| f.label().to_string())
        .collect()
}
