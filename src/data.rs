/// One job request as shown in a table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub job_request: &'static str,
    pub submitted: &'static str,
    pub status: &'static str,
    pub submitter: &'static str,
    pub url: &'static str,
    pub assigned: &'static str,
    pub priority: &'static str,
    pub due_date: &'static str,
    pub est_value: &'static str,
}

impl Record {
    pub fn value(&self, column: ColumnId) -> &'static str {
        match column {
            ColumnId::JobRequest => self.job_request,
            ColumnId::Submitted => self.submitted,
            ColumnId::Status => self.status,
            ColumnId::Submitter => self.submitter,
            ColumnId::Url => self.url,
            ColumnId::Assigned => self.assigned,
            ColumnId::Priority => self.priority,
            ColumnId::DueDate => self.due_date,
            ColumnId::EstValue => self.est_value,
        }
    }

    /// Target of the rendered link cell.
    pub fn link(&self) -> String {
        format!("https://{}", self.url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnId {
    JobRequest,
    Submitted,
    Status,
    Submitter,
    Url,
    Assigned,
    Priority,
    DueDate,
    EstValue,
}

impl ColumnId {
    /// All columns in display order.
    pub const ALL: [ColumnId; 9] = [
        ColumnId::JobRequest,
        ColumnId::Submitted,
        ColumnId::Status,
        ColumnId::Submitter,
        ColumnId::Url,
        ColumnId::Assigned,
        ColumnId::Priority,
        ColumnId::DueDate,
        ColumnId::EstValue,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ColumnId::JobRequest => "jobRequest",
            ColumnId::Submitted => "submitted",
            ColumnId::Status => "status",
            ColumnId::Submitter => "submitter",
            ColumnId::Url => "url",
            ColumnId::Assigned => "assigned",
            ColumnId::Priority => "priority",
            ColumnId::DueDate => "dueDate",
            ColumnId::EstValue => "estValue",
        }
    }

    pub fn header(&self) -> &'static str {
        match self {
            ColumnId::JobRequest => "Job Request",
            ColumnId::Submitted => "Submitted",
            ColumnId::Status => "Status",
            ColumnId::Submitter => "Submitter",
            ColumnId::Url => "URL",
            ColumnId::Assigned => "Assigned",
            ColumnId::Priority => "Priority",
            ColumnId::DueDate => "Due Date",
            ColumnId::EstValue => "Est. Value",
        }
    }

    pub fn from_id(id: &str) -> Option<ColumnId> {
        ColumnId::ALL.into_iter().find(|c| c.id() == id)
    }
}

pub static RECORDS: [Record; 5] = [
    Record {
        job_request: "Launch social media campaign for product",
        submitted: "15-11-2024",
        status: "In-process",
        submitter: "Aisha Patel",
        url: "www.aishapatel.com",
        assigned: "Sophie Choudhury",
        priority: "Medium",
        due_date: "20-11-2024",
        est_value: "6,200,000 ₹",
    },
    Record {
        job_request: "Update press kit for company redesign",
        submitted: "28-10-2024",
        status: "Need to start",
        submitter: "Irfan Khan",
        url: "www.irfankhan.org",
        assigned: "Tejas Pandey",
        priority: "High",
        due_date: "30-10-2024",
        est_value: "3,500,000 ₹",
    },
    Record {
        job_request: "Finalize user testing feedback for app",
        submitted: "05-12-2024",
        status: "In-process",
        submitter: "Mark Johnson",
        url: "www.markjohnson.com",
        assigned: "Rachel Lee",
        priority: "Medium",
        due_date: "10-12-2024",
        est_value: "4,750,000 ₹",
    },
    Record {
        job_request: "Design new features for the website",
        submitted: "10-01-2025",
        status: "Complete",
        submitter: "Emily Green",
        url: "www.emilygreen.com",
        assigned: "Tom Wright",
        priority: "Low",
        due_date: "15-01-2025",
        est_value: "5,900,000 ₹",
    },
    Record {
        job_request: "Prepare financial report for Q4",
        submitted: "25-01-2025",
        status: "Blocked",
        submitter: "Jessica Brown",
        url: "www.jessicabrown.com",
        assigned: "Kevin Smith",
        priority: "Low",
        due_date: "30-01-2025",
        est_value: "2,800,000 ₹",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_ids_are_unique_and_resolvable() {
        for column in ColumnId::ALL {
            assert_eq!(ColumnId::from_id(column.id()), Some(column));
        }
        assert_eq!(ColumnId::from_id("notAColumn"), None);
    }

    #[test]
    fn link_prefixes_https() {
        assert_eq!(RECORDS[1].link(), "https://www.irfankhan.org");
    }

    #[test]
    fn value_reads_the_matching_field() {
        let r = &RECORDS[0];
        assert_eq!(r.value(ColumnId::Status), "In-process");
        assert_eq!(r.value(ColumnId::DueDate), "20-11-2024");
        assert_eq!(r.value(ColumnId::EstValue), "6,200,000 ₹");
    }
}
