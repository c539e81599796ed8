//! Fetching a fresh revision snapshot from the remote library.
//!
//! Builds an FLMCMD DBUTIL job from a caller-supplied template, submits it
//! through a [`JobControlSession`], and parses the tailored report lines out
//! of the captured job log.

use chrono::NaiveDateTime;
use tracing::{debug, info};

use zos_bridge_ftp::Credentials;
use zos_bridge_jes::{JobControlSession, MaxCc, SpoolTransport, SubmitConfig};

use crate::error::{Result, SclmError};
use crate::member::{MemberState, DATE_FORMAT};
use crate::snapshot::RevisionSnapshot;

/// Highest DBUTIL return code still treated as a usable report.
const REPORT_MAX_CC: &str = "4";

/// Default job card for the FLMCMD job.
const DEFAULT_JOB_HEADER: &str = "\
//ZBRIDGE  JOB (ACCOUNT),'ZBRIDGE',
// MSGCLASS=A,CLASS=A,NOTIFY=&SYSUID";

/// Default step invoking FLMCMD under IKJEFT01 with the ISPF environment it
/// needs.
const DEFAULT_JOB_STEP: &str = "\
//SCLMEX   EXEC PGM=IKJEFT01,REGION=4096K,TIME=1439,DYNAMNBR=200
//STEPLIB  DD DSN=ISP.SISPLPA,DISP=SHR
//         DD DSN=ISP.SISPLOAD,DISP=SHR
//ISPMLIB  DD DSN=ISP.SISPMENU,DISP=SHR
//ISPSLIB  DD DSN=ISP.SISPSENU,DISP=SHR
//         DD DSN=ISP.SISPSLIB,DISP=SHR
//ISPPLIB  DD DSN=ISP.SISPPENU,DISP=SHR
//ISPTLIB  DD UNIT=SYSALLDA,DISP=(NEW,PASS),SPACE=(CYL,(1,1,5)),
//            DCB=(LRECL=80,BLKSIZE=19040,DSORG=PO,RECFM=FB),
//            DSN=
//         DD DSN=ISP.SISPTENU,DISP=SHR
//ISPTABL  DD UNIT=SYSALLDA,DISP=(NEW,PASS),SPACE=(CYL,(1,1,5)),
//            DCB=(LRECL=80,BLKSIZE=19040,DSORG=PO,RECFM=FB),
//            DSN=
//ISPPROF  DD UNIT=SYSALLDA,DISP=(NEW,PASS),SPACE=(CYL,(1,1,5)),
//            DCB=(LRECL=80,BLKSIZE=19040,DSORG=PO,RECFM=FB),
//            DSN=
//ISPLOG   DD SYSOUT=*,
//            DCB=(LRECL=120,BLKSIZE=2400,DSORG=PS,RECFM=FB)
//ISPCTL1  DD DISP=NEW,UNIT=SYSALLDA,SPACE=(CYL,(1,1)),
//            DCB=(LRECL=80,BLKSIZE=800,RECFM=FB)
//SYSTERM  DD SYSOUT=*
//SYSPROC  DD DSN=ISP.SISPCLIB,DISP=SHR
//FLMMSGS  DD SYSOUT=(*)
//ZFLMDD   DD *
   ZFLMNLST=FLMNLENU    ZFLMTRMT=ISR3278    ZDATEF=YYYY/MM/DD
/*
//SYSPRINT DD SYSOUT=(*)
//SYSTSPRT DD SYSOUT=(*)";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Job card and FLMCMD step the DBUTIL job is assembled from. Defaults are
/// ordinary values on the struct; callers override by constructing their
/// own.
#[derive(Debug, Clone)]
pub struct JobTemplate {
    pub header: String,
    pub step: String,
}

impl Default for JobTemplate {
    fn default() -> Self {
        Self {
            header: DEFAULT_JOB_HEADER.to_string(),
            step: DEFAULT_JOB_STEP.to_string(),
        }
    }
}

/// Which slice of the library to snapshot: one project/alternate/group and
/// a set of member types.
#[derive(Debug, Clone)]
pub struct ProjectFilter {
    pub project: String,
    pub alternate: String,
    pub group: String,
    pub types: Vec<String>,
}

impl ProjectFilter {
    /// Build a filter from raw configuration text: embedded whitespace is
    /// squeezed out and `types` is a comma-separated list.
    pub fn new(project: &str, alternate: &str, group: &str, types: &str) -> Self {
        let clean = |raw: &str| raw.split_whitespace().collect::<String>();
        Self {
            project: clean(project),
            alternate: clean(alternate),
            group: clean(group),
            types: types
                .split(',')
                .map(clean)
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    fn covers(&self, member: &MemberState) -> bool {
        member.project == self.project
            && member.alternate == self.alternate
            && member.group == self.group
            && self.types.iter().any(|t| *t == member.member_type)
    }
}

// ---------------------------------------------------------------------------
// Job assembly and report parsing
// ---------------------------------------------------------------------------

/// Assemble the DBUTIL job: header, FLMCMD step, then one tailored DBUTIL
/// command per monitored type. The tailoring string makes the report emit
/// one line per member in the shape [`parse_report`] consumes.
pub fn build_job(template: &JobTemplate, filter: &ProjectFilter) -> String {
    let mut job = String::new();
    job.push_str(&template.header);
    job.push('\n');
    job.push_str(&template.step);
    job.push_str("\n//SYSTSIN  DD *\n");
    for member_type in &filter.types {
        job.push_str(&format!(
            " FLMCMD DBUTIL,{p},{a},{g},,,,,,,,,,,,,,,*,,,,,,,{t},*,,NORMAL,,*,\
             @@FLMDATE @@FLMTIME {p} {a} {g} {t} @@FLMMBR @@FLMMVR @@FLMCUS @@FLMCLV\n",
            p = filter.project,
            a = filter.alternate,
            g = filter.group,
            t = member_type,
        ));
    }
    job.push_str("/*\n//\n");
    job
}

/// Extract member states from the captured job log.
///
/// A report line is ten whitespace-separated columns:
/// `date time project alternate group type name version change_user
/// change_group`. Anything else in the log (JES banners, ISPF output,
/// messages) simply does not parse as such a line and is skipped.
pub fn parse_report(log: &[u8], filter: &ProjectFilter) -> Vec<MemberState> {
    let text = String::from_utf8_lossy(log);
    let mut members = Vec::new();
    for line in text.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 10 {
            continue;
        }
        let Ok(change_date) = NaiveDateTime::parse_from_str(
            &format!("{} {}", fields[0], fields[1]),
            DATE_FORMAT,
        ) else {
            continue;
        };
        let Ok(version) = fields[7].parse::<u32>() else {
            continue;
        };
        let member = MemberState {
            project: fields[2].to_string(),
            alternate: fields[3].to_string(),
            group: fields[4].to_string(),
            member_type: fields[5].to_string(),
            name: fields[6].to_string(),
            version,
            change_user: fields[8].to_string(),
            change_group: fields[9].to_string(),
            change_date,
            edit_type: None,
        };
        if filter.covers(&member) {
            members.push(member);
        }
    }
    debug!(members = members.len(), "parsed DBUTIL report");
    members
}

/// Run the DBUTIL job and build a snapshot from its report.
///
/// The session always waits: the snapshot lives in the captured log. A job
/// that fails, or completes above the report threshold, is a hard error —
/// a missing report must never masquerade as an empty library.
pub fn fetch_revision<T: SpoolTransport>(
    transport: T,
    creds: Credentials,
    mut config: SubmitConfig,
    template: &JobTemplate,
    filter: &ProjectFilter,
) -> Result<RevisionSnapshot> {
    config.wait = true;
    let job = build_job(template, filter);
    info!(
        project = %filter.project,
        group = %filter.group,
        "submitting DBUTIL job for revision snapshot"
    );

    let outcome = JobControlSession::new(transport, creds, config).submit(job.as_bytes());
    if !outcome.success || !MaxCc::new(REPORT_MAX_CC).allows(&outcome.completion) {
        let code = outcome.printable_code();
        return Err(SclmError::FetchFailed {
            job_id: outcome.job_id,
            code,
        });
    }

    RevisionSnapshot::new(parse_report(&outcome.log, filter))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
