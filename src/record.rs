/// Placeholder for a text field that could not be extracted.
pub const NOT_AVAILABLE: &str = "N/A";
/// Placeholder for a missing location.
pub const UNKNOWN_LOCATION: &str = "unknown";

/// One job listing. Built only through [`JobFields::into_record`], read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    title: String,
    company: String,
    location: String,
    description: String,
    posting_date: String,
    deadline: String,
    job_type: Option<String>,
    qualifications: Vec<String>,
}

impl JobRecord {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// May be empty.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn posting_date(&self) -> &str {
        &self.posting_date
    }

    pub fn deadline(&self) -> &str {
        &self.deadline
    }

    pub fn job_type(&self) -> Option<&str> {
        self.job_type.as_deref()
    }

    pub fn qualifications(&self) -> &[String] {
        &self.qualifications
    }
}

/// Raw lookup results for one job block, before sentinel substitution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFields {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub posting_date: Option<String>,
    pub deadline: Option<String>,
    pub job_type: Option<String>,
    pub qualifications: Vec<String>,
}

impl JobFields {
    /// The one place missing fields are replaced by their sentinels.
    pub fn into_record(self) -> JobRecord {
        let or_na = |field: Option<String>| field.unwrap_or_else(|| NOT_AVAILABLE.to_string());
        JobRecord {
            title: or_na(self.title),
            company: or_na(self.company),
            location: self
                .location
                .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
            description: self.description.unwrap_or_default(),
            posting_date: or_na(self.posting_date),
            deadline: or_na(self.deadline),
            job_type: self.job_type,
            qualifications: self.qualifications,
        }
    }
}
