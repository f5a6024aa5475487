use crate::record::JobRecord;

/// Concatenates per-page records, keeping page order and the order within each page.
pub fn aggregate<I>(pages: I) -> Vec<JobRecord>
where
    I: IntoIterator<Item = Vec<JobRecord>>,
{
    pages.into_iter().flatten().collect()
}

/// Number of records whose description mentions each skill.
///
/// Keys compare case-insensitively and keep the spelling of their first
/// appearance in the vocabulary. Skills no record mentions are not stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillTally {
    // Vocabulary order.
    counts: Vec<(String, usize)>,
}

impl SkillTally {
    pub fn get(&self, skill: &str) -> Option<usize> {
        let skill = skill.to_lowercase();
        self.counts
            .iter()
            .find(|(name, _)| name.to_lowercase() == skill)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Largest single count, 0 when empty.
    pub fn max(&self) -> usize {
        self.counts.iter().map(|(_, count)| *count).max().unwrap_or(0)
    }
}

/// Counts, for every vocabulary term, the records whose description contains it
/// (case-insensitive substring). A record counts at most once per term.
pub fn tally_skills<S: AsRef<str>>(records: &[JobRecord], vocabulary: &[S]) -> SkillTally {
    let mut terms: Vec<(&str, String)> = Vec::with_capacity(vocabulary.len());
    for term in vocabulary {
        let term = term.as_ref();
        let lowered = term.to_lowercase();
        if !lowered.is_empty() && !terms.iter().any(|(_, seen)| *seen == lowered) {
            terms.push((term, lowered));
        }
    }

    let descriptions: Vec<String> = records
        .iter()
        .map(|record| record.description().to_lowercase())
        .collect();

    let counts = terms
        .into_iter()
        .filter_map(|(term, lowered)| {
            let count = descriptions
                .iter()
                .filter(|description| description.contains(&lowered))
                .count();
            (count > 0).then(|| (term.to_string(), count))
        })
        .collect();

    SkillTally { counts }
}
