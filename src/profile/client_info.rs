// Client profile record and the first-writer-wins merge

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One field of the client profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientField {
    Name,
    Disability,
    Age,
    MedicalConditions,
    JobInterests,
    SkillLevel,
}

impl ClientField {
    pub const ALL: [ClientField; 6] = [
        ClientField::Name,
        ClientField::Disability,
        ClientField::Age,
        ClientField::MedicalConditions,
        ClientField::JobInterests,
        ClientField::SkillLevel,
    ];

    /// Key used on the command line (`/client set <key> <value>`)
    pub fn key(&self) -> &'static str {
        match self {
            ClientField::Name => "name",
            ClientField::Disability => "disability",
            ClientField::Age => "age",
            ClientField::MedicalConditions => "medical",
            ClientField::JobInterests => "jobs",
            ClientField::SkillLevel => "skill",
        }
    }

    /// Human-readable form label
    pub fn label(&self) -> &'static str {
        match self {
            ClientField::Name => "Client Name",
            ClientField::Disability => "Type of Disability",
            ClientField::Age => "Age",
            ClientField::MedicalConditions => "Relevant Medical Conditions",
            ClientField::JobInterests => "Job Interests",
            ClientField::SkillLevel => "Skill Level",
        }
    }
}

impl fmt::Display for ClientField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ClientField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(ClientField::Name),
            "disability" => Ok(ClientField::Disability),
            "age" => Ok(ClientField::Age),
            "medical" | "medical_conditions" | "conditions" => Ok(ClientField::MedicalConditions),
            "jobs" | "job" | "job_interests" | "interests" => Ok(ClientField::JobInterests),
            "skill" | "skill_level" | "level" => Ok(ClientField::SkillLevel),
            other => Err(format!(
                "unknown client field '{}' (expected one of: name, disability, age, medical, jobs, skill)",
                other
            )),
        }
    }
}

/// Lightweight profile of the client a coach is working with.
///
/// Every field is optional. An empty string is treated the same as an unset
/// field everywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_conditions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_interests: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_level: Option<String>,
}

impl ClientInfo {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, field: ClientField) -> &Option<String> {
        match field {
            ClientField::Name => &self.name,
            ClientField::Disability => &self.disability,
            ClientField::Age => &self.age,
            ClientField::MedicalConditions => &self.medical_conditions,
            ClientField::JobInterests => &self.job_interests,
            ClientField::SkillLevel => &self.skill_level,
        }
    }

    fn slot_mut(&mut self, field: ClientField) -> &mut Option<String> {
        match field {
            ClientField::Name => &mut self.name,
            ClientField::Disability => &mut self.disability,
            ClientField::Age => &mut self.age,
            ClientField::MedicalConditions => &mut self.medical_conditions,
            ClientField::JobInterests => &mut self.job_interests,
            ClientField::SkillLevel => &mut self.skill_level,
        }
    }

    /// Value of a field, `None` when unset or empty
    pub fn get(&self, field: ClientField) -> Option<&str> {
        self.slot(field).as_deref().filter(|v| !v.is_empty())
    }

    pub fn has(&self, field: ClientField) -> bool {
        self.get(field).is_some()
    }

    /// Overwrite a field unconditionally. Used by explicit form edits only.
    ///
    /// A blank value clears the field.
    pub fn set(&mut self, field: ClientField, value: impl Into<String>) {
        let value = value.into();
        let value = value.trim();
        *self.slot_mut(field) = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };
    }

    /// Builder-style setter, mostly for tests and extraction
    pub fn with(mut self, field: ClientField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        ClientField::ALL.iter().all(|f| !self.has(*f))
    }
}

/// Result of merging an extracted record into the session profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub info: ClientInfo,
    /// Fields that were empty before and are populated now
    pub filled: Vec<ClientField>,
}

impl MergeOutcome {
    /// Whether the coach should be asked to review the profile: the
    /// disability, or both name and age, were just filled in.
    pub fn needs_review(&self) -> bool {
        let filled = |f: ClientField| self.filled.contains(&f);
        filled(ClientField::Disability) || (filled(ClientField::Name) && filled(ClientField::Age))
    }
}

/// Merge `extracted` into `current`, first writer wins per field.
///
/// Populated fields of `current` are never overwritten; only explicit form
/// edits can change them.
pub fn merge(current: &ClientInfo, extracted: &ClientInfo) -> MergeOutcome {
    let mut info = current.clone();
    let mut filled = Vec::new();

    for field in ClientField::ALL {
        if current.has(field) {
            continue;
        }
        if let Some(value) = extracted.get(field) {
            info.set(field, value);
            filled.push(field);
        }
    }

    MergeOutcome { info, filled }
}
