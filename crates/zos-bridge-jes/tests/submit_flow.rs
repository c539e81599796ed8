//! End-to-end submission scenarios against the in-memory spool simulator.
//!
//! Each test lends the simulator to the session so the wire-level
//! interactions can be asserted after the outcome is in hand.

use std::time::Duration;

use zos_bridge_ftp::Credentials;
use zos_bridge_jes::{
    CompletionCode, FailureTag, JobControlSession, MaxCc, SpoolSim, SubmitConfig,
};

const JCL: &[u8] = b"//MYJOB JOB (ACCT),'SMOKE'\n//S1 EXEC PGM=IEFBR14\n";

fn creds() -> Credentials {
    Credentials::new("ibmuser", "secret")
}

fn fast_config() -> SubmitConfig {
    SubmitConfig {
        poll_interval: Duration::from_millis(2),
        ..SubmitConfig::default()
    }
}

#[test]
fn submit_wait_and_capture() {
    let mut sim = SpoolSim::new();
    sim.announce_job("JOB01234")
        .script_names(&["JOB01234"])
        .script_details(&["MYJOB    JOB01234 OUTPUT A RC=0000 3 spool files"])
        .script_retrieve(b"1 J E S 2  J O B  L O G\n");

    let outcome = JobControlSession::new(&mut sim, creds(), fast_config()).submit(JCL);

    assert!(outcome.success);
    assert_eq!(outcome.job_id, "JOB01234");
    assert_eq!(outcome.job_name, "MYJOB");
    assert_eq!(outcome.completion, CompletionCode::ReturnCode("0000".into()));
    assert!(outcome.log_captured);

    // The JCL went up exactly once and the session released the connection.
    assert_eq!(sim.stored.len(), 1);
    assert_eq!(sim.stored[0].1, JCL);
    assert_eq!(sim.retrieve_count, 1);
    assert!(sim.deleted.is_empty());
    assert!(sim.closed);
}

#[test]
fn no_wait_touches_the_spool_once() {
    let mut sim = SpoolSim::new();
    sim.announce_job("JOB01234");

    let outcome = JobControlSession::new(&mut sim, creds(), SubmitConfig::no_wait()).submit(JCL);

    assert!(outcome.success);
    assert!(!outcome.log_captured);
    assert_eq!(outcome.completion, CompletionCode::ReturnCode("0000".into()));
    // One login for the submission, nothing polled or retrieved.
    assert_eq!(sim.refresh_count, 1);
    assert_eq!(sim.retrieve_count, 0);
    assert!(sim.closed);
}

#[test]
fn job_progresses_through_active_to_output() {
    let mut sim = SpoolSim::new();
    sim.announce_job("JOB01234")
        .script_names(&["JOB01234"])
        .script_details(&["MYJOB    JOB01234 ACTIVE since 10.31.05"])
        .script_details(&["MYJOB    JOB01234 ACTIVE since 10.31.05"])
        .script_details(&["MYJOB    JOB01234 OUTPUT A RC=0008 3 spool files"])
        .script_retrieve(b"output");

    let outcome = JobControlSession::new(&mut sim, creds(), fast_config()).submit(JCL);

    assert!(outcome.success);
    assert_eq!(outcome.completion, CompletionCode::ReturnCode("0008".into()));
    // Each poll re-authenticates before the availability check and again
    // before the status probe; three polls plus submission and capture.
    assert!(sim.refresh_count >= 7);
}

#[test]
fn purge_after_fetch_deletes_the_spool_entry() {
    let mut sim = SpoolSim::new();
    sim.announce_job("JOB01234")
        .script_names(&["JOB01234"])
        .script_details(&["MYJOB    JOB01234 OUTPUT A RC=0000 "])
        .script_retrieve(b"log");
    let config = SubmitConfig {
        poll_interval: Duration::from_millis(2),
        delete_after_fetch: true,
        ..SubmitConfig::default()
    };

    let outcome = JobControlSession::new(&mut sim, creds(), config).submit(JCL);

    assert!(outcome.success);
    assert_eq!(sim.deleted, vec!["JOB01234".to_string()]);
}

#[test]
fn transport_is_released_on_failure_paths() {
    let mut sim = SpoolSim::new();
    sim.reply_to_store(&["250 Transfer completed successfully."]);

    let outcome = JobControlSession::new(&mut sim, creds(), fast_config()).submit(JCL);

    assert!(!outcome.success);
    assert_eq!(
        outcome.completion,
        CompletionCode::Tag(FailureTag::FailedToParseJobId)
    );
    assert!(sim.closed);
}

#[test]
fn acceptance_threshold_gates_the_captured_code() {
    let mut sim = SpoolSim::new();
    sim.announce_job("JOB01234")
        .script_names(&["JOB01234"])
        .script_details(&["MYJOB    JOB01234 OUTPUT A RC=0008 "])
        .script_retrieve(b"log");

    let outcome = JobControlSession::new(&mut sim, creds(), fast_config()).submit(JCL);

    assert!(outcome.success);
    assert!(MaxCc::new("8").allows(&outcome.completion));
    assert!(!MaxCc::new("4").allows(&outcome.completion));
    assert!(!MaxCc::default().allows(&outcome.completion));
}

#[test]
fn jcl_error_in_detailed_listing() {
    let mut sim = SpoolSim::new();
    sim.announce_job("JOB01234")
        .script_names(&["JOB01234"])
        .script_details(&["MYJOB    JOB01234 OUTPUT (JCL error) 3 spool files"])
        .script_retrieve(b"log");

    let outcome = JobControlSession::new(&mut sim, creds(), fast_config()).submit(JCL);

    assert!(outcome.success);
    assert_eq!(outcome.completion, CompletionCode::JclError);
    assert!(!MaxCc::new("9999").allows(&outcome.completion));
    assert_eq!(outcome.printable_code(), "JCL_ERROR");
}

#[test]
fn report_lines_match_the_operator_wording() {
    let mut sim = SpoolSim::new();
    sim.announce_job("JOB01234")
        .script_names(&["JOB01234"])
        .script_details(&["MYJOB    JOB01234 OUTPUT A RC=0004 "])
        .script_retrieve(b"log");

    let outcome = JobControlSession::new(&mut sim, creds(), fast_config()).submit(JCL);
    assert_eq!(
        outcome.report(),
        "Job [JOB01234] processing finished. Captured RC = [0004]"
    );
}
