use std::io::Write;
use std::path::Path;

use crate::record::JobRecord;
use crate::Result;

/// Column set of the CSV export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    /// Job Title, Company, Location, Description.
    #[default]
    Summary,
    /// Summary columns plus dates, job type and qualifications.
    Full,
}

impl Layout {
    fn header(self) -> &'static [&'static str] {
        match self {
            Layout::Summary => &["Job Title", "Company", "Location", "Description"],
            Layout::Full => &[
                "Job Title",
                "Company",
                "Location",
                "Description",
                "Posting Date",
                "Deadline",
                "Job Type",
                "Qualifications",
            ],
        }
    }

    fn row(self, job: &JobRecord) -> Vec<String> {
        let mut row = vec![
            job.title().to_string(),
            job.company().to_string(),
            job.location().to_string(),
            job.description().to_string(),
        ];
        if self == Layout::Full {
            row.extend([
                job.posting_date().to_string(),
                job.deadline().to_string(),
                job.job_type().unwrap_or_default().to_string(),
                job.qualifications().join("; "),
            ]);
        }
        row
    }
}

/// Writes a header row followed by one row per record.
pub fn write_csv<W: Write>(writer: W, records: &[JobRecord], layout: Layout) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(layout.header())?;
    for job in records {
        wtr.write_record(layout.row(job))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_csv(path: impl AsRef<Path>, records: &[JobRecord], layout: Layout) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(std::io::BufWriter::new(file), records, layout)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::record::JobFields;

    fn sample() -> Vec<JobRecord> {
        vec![
            JobFields {
                title: Some("Dev, Senior".into()),
                company: Some("Acme".into()),
                location: Some("Onsite".into()),
                description: Some("Says \"hi\"".into()),
                posting_date: Some("Mon".into()),
                deadline: Some("Fri".into()),
                job_type: None,
                qualifications: vec!["Rust".into(), "SQL".into()],
            }
            .into_record(),
            JobFields::default().into_record(),
        ]
    }

    fn to_string(records: &[JobRecord], layout: Layout) -> String {
        let mut buf = Vec::new();
        write_csv(&mut buf, records, layout).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn summary_layout() {
        assert_eq!(
            to_string(&sample(), Layout::Summary),
            "Job Title,Company,Location,Description\n\
             \"Dev, Senior\",Acme,Onsite,\"Says \"\"hi\"\"\"\n\
             N/A,N/A,unknown,\n"
        );
    }

    #[test]
    fn full_layout_adds_columns() {
        let out = to_string(&sample()[..1], Layout::Full);
        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some("Job Title,Company,Location,Description,Posting Date,Deadline,Job Type,Qualifications")
        );
        assert_eq!(
            lines.next(),
            Some("\"Dev, Senior\",Acme,Onsite,\"Says \"\"hi\"\"\",Mon,Fri,,Rust; SQL")
        );
    }

    #[test]
    fn empty_collection_writes_only_header() {
        assert_eq!(
            to_string(&[], Layout::Summary),
            "Job Title,Company,Location,Description\n"
        );
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = std::env::temp_dir().join("jobscrape_missing_dir_for_export");
        let _ = std::fs::remove_dir_all(&dir);
        assert!(save_csv(dir.join("jobs.csv"), &sample(), Layout::Summary).is_err());
    }
}
