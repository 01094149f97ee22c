use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::RequestError;

/// Reportable symptoms. The id strings are stable and used on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymptomId {
    Fever,
    Headache,
    Cough,
    SoreThroat,
    Fatigue,
    BodyAche,
    Nausea,
    Dizziness,
    Diarrhea,
    StomachPain,
    ChestPain,
    BreathingDifficulty,
    Rash,
    JointPain,
    LossAppetite,
    Insomnia,
    Anxiety,
    Depression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symptom {
    pub id: SymptomId,
    pub name: &'static str,
}

/// Symptom catalog in display order.
pub const SYMPTOMS: &[Symptom] = &[
    Symptom { id: SymptomId::Fever, name: "Demam" },
    Symptom { id: SymptomId::Headache, name: "Sakit Kepala" },
    Symptom { id: SymptomId::Cough, name: "Batuk" },
    Symptom { id: SymptomId::SoreThroat, name: "Sakit Tenggorokan" },
    Symptom { id: SymptomId::Fatigue, name: "Kelelahan" },
    Symptom { id: SymptomId::BodyAche, name: "Nyeri Otot" },
    Symptom { id: SymptomId::Nausea, name: "Mual" },
    Symptom { id: SymptomId::Dizziness, name: "Pusing" },
    Symptom { id: SymptomId::Diarrhea, name: "Diare" },
    Symptom { id: SymptomId::StomachPain, name: "Sakit Perut" },
    Symptom { id: SymptomId::ChestPain, name: "Nyeri Dada" },
    Symptom { id: SymptomId::BreathingDifficulty, name: "Kesulitan Bernafas" },
    Symptom { id: SymptomId::Rash, name: "Ruam" },
    Symptom { id: SymptomId::JointPain, name: "Nyeri Sendi" },
    Symptom { id: SymptomId::LossAppetite, name: "Kehilangan Nafsu Makan" },
    Symptom { id: SymptomId::Insomnia, name: "Susah Tidur" },
    Symptom { id: SymptomId::Anxiety, name: "Kecemasan" },
    Symptom { id: SymptomId::Depression, name: "Depresi" },
];

impl SymptomId {
    pub fn as_str(self) -> &'static str {
        match self {
            SymptomId::Fever => "fever",
            SymptomId::Headache => "headache",
            SymptomId::Cough => "cough",
            SymptomId::SoreThroat => "sore_throat",
            SymptomId::Fatigue => "fatigue",
            SymptomId::BodyAche => "body_ache",
            SymptomId::Nausea => "nausea",
            SymptomId::Dizziness => "dizziness",
            SymptomId::Diarrhea => "diarrhea",
            SymptomId::StomachPain => "stomach_pain",
            SymptomId::ChestPain => "chest_pain",
            SymptomId::BreathingDifficulty => "breathing_difficulty",
            SymptomId::Rash => "rash",
            SymptomId::JointPain => "joint_pain",
            SymptomId::LossAppetite => "loss_appetite",
            SymptomId::Insomnia => "insomnia",
            SymptomId::Anxiety => "anxiety",
            SymptomId::Depression => "depression",
        }
    }

    /// Localized name shown to the user and embedded in the prompt.
    pub fn display_name(self) -> &'static str {
        SYMPTOMS
            .iter()
            .find(|s| s.id == self)
            .map(|s| s.name)
            .unwrap_or_else(|| self.as_str())
    }
}

impl fmt::Display for SymptomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts either the id ("sore_throat") or the display name ("Sakit Tenggorokan"),
/// case-insensitively.
impl FromStr for SymptomId {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        SYMPTOMS
            .iter()
            .find(|sym| {
                sym.id.as_str().eq_ignore_ascii_case(needle)
                    || sym.name.eq_ignore_ascii_case(needle)
            })
            .map(|sym| sym.id)
            .ok_or_else(|| RequestError::UnknownSymptom(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

pub const GENDERS: &[Gender] = &[Gender::Male, Gender::Female];

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Laki-laki",
            Gender::Female => "Perempuan",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        GENDERS
            .iter()
            .copied()
            .find(|g| {
                g.as_str().eq_ignore_ascii_case(needle) || g.label().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| RequestError::UnknownGender(s.to_string()))
    }
}
