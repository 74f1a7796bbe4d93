//! Reconciliation engine - best-effort, additive push of local state.

use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::api::{DdmApi, MemberOutcome, PushOutcome};

use super::scanner::{self, Inventory, ScanError};
use super::set_file;

/// What a sync item refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    /// One declaration JSON file.
    Declaration,
    /// One identifier within the named set.
    SetMember { set: String },
    /// A set file as a whole (skipped-empty or unreadable).
    SetFile,
}

/// Terminal outcome of one attempted item. There is no retry within a run;
/// a `Failed` item is retried by re-running the sync command, which is safe
/// because every remote operation is idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Succeeded,
    AlreadyPresent,
    SkippedEmpty,
    Failed { detail: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncItemResult {
    pub kind: ItemKind,
    pub key: String,
    pub outcome: ItemOutcome,
}

/// Aggregate result of one sync invocation. Counts are "attempted", not
/// "remote-confirmed-correct": the tool is a thin relay and the server is
/// the source of truth.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub declarations_attempted: usize,
    pub sets_processed: usize,
    pub sets_skipped: usize,
    pub members_attempted: usize,
    pub succeeded: usize,
    pub already_present: usize,
    pub failed: usize,
    pub items: Vec<SyncItemResult>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    fn record(&mut self, kind: ItemKind, key: String, outcome: ItemOutcome) {
        match &outcome {
            ItemOutcome::Succeeded => self.succeeded += 1,
            ItemOutcome::AlreadyPresent => self.already_present += 1,
            ItemOutcome::SkippedEmpty => self.sets_skipped += 1,
            ItemOutcome::Failed { .. } => self.failed += 1,
        }
        self.items.push(SyncItemResult { kind, key, outcome });
    }
}

/// Drives a sync run: scan fully first (failing fast on walk errors), then
/// push declarations and set memberships one blocking request at a time.
/// No single item's failure ever aborts the remaining items.
pub struct Engine<A> {
    api: A,
}

impl<A: DdmApi> Engine<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn sync(&self, root: &Path) -> Result<SyncReport, ScanError> {
        let inventory = scanner::scan(root)?;
        Ok(self.apply(&inventory))
    }

    fn apply(&self, inventory: &Inventory) -> SyncReport {
        let mut report = SyncReport::default();
        for path in &inventory.declarations {
            self.push_declaration(path, &mut report);
        }
        for path in &inventory.sets {
            self.apply_set(path, &mut report);
        }
        report
    }

    fn push_declaration(&self, path: &Path, report: &mut SyncReport) {
        report.declarations_attempted += 1;
        let key = path.display().to_string();

        let payload = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("could not read declaration {key}: {err}");
                report.record(
                    ItemKind::Declaration,
                    key,
                    ItemOutcome::Failed {
                        detail: format!("read failed: {err}"),
                    },
                );
                return;
            }
        };

        info!("pushing declaration from {key}");
        let outcome = match self.api.upsert_declaration(&payload) {
            Ok(PushOutcome::Accepted { .. }) => ItemOutcome::Succeeded,
            Ok(PushOutcome::Rejected { status, detail }) => {
                warn!("declaration {key} rejected: HTTP {status}: {detail}");
                ItemOutcome::Failed {
                    detail: format!("HTTP {status}: {detail}"),
                }
            }
            Err(err) => {
                warn!("declaration {key} not delivered: {err}");
                ItemOutcome::Failed {
                    detail: err.to_string(),
                }
            }
        };
        report.record(ItemKind::Declaration, key, outcome);
    }

    fn apply_set(&self, path: &Path, report: &mut SyncReport) {
        let set = match set_file::parse(path) {
            Ok(set) => set,
            Err(err) => {
                warn!("could not read set file {}: {err}", path.display());
                report.record(
                    ItemKind::SetFile,
                    path.display().to_string(),
                    ItemOutcome::Failed {
                        detail: format!("read failed: {err}"),
                    },
                );
                return;
            }
        };

        if set.members.is_empty() {
            info!("set {} has no members, skipping", set.name);
            report.record(ItemKind::SetFile, set.name, ItemOutcome::SkippedEmpty);
            return;
        }

        report.sets_processed += 1;
        for identifier in &set.members {
            report.members_attempted += 1;
            let outcome = match self.api.add_set_member(&set.name, identifier) {
                Ok(MemberOutcome::Applied) => ItemOutcome::Succeeded,
                Ok(MemberOutcome::Unchanged) => ItemOutcome::AlreadyPresent,
                Ok(MemberOutcome::Rejected { status, detail }) => {
                    warn!(
                        "could not add {identifier} to set {}: HTTP {status}: {detail}",
                        set.name
                    );
                    ItemOutcome::Failed {
                        detail: format!("HTTP {status}: {detail}"),
                    }
                }
                Err(err) => {
                    warn!("could not add {identifier} to set {}: {err}", set.name);
                    ItemOutcome::Failed {
                        detail: err.to_string(),
                    }
                }
            };
            report.record(
                ItemKind::SetMember {
                    set: set.name.clone(),
                },
                identifier.clone(),
                outcome,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, ApiResult};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::fs;
    use std::path::PathBuf;

    /// Records every remote call; answers are keyed by (set, identifier)
    /// for members and taken in order for declarations.
    #[derive(Default)]
    struct MockApi {
        calls: RefCell<Vec<String>>,
        declaration_replies: RefCell<Vec<PushOutcome>>,
        member_replies: HashMap<(String, String), MemberOutcome>,
        unreachable_members: Vec<(String, String)>,
    }

    impl MockApi {
        fn member_reply(mut self, set: &str, identifier: &str, reply: MemberOutcome) -> Self {
            self.member_replies
                .insert((set.to_string(), identifier.to_string()), reply);
            self
        }

        fn declaration_replies(self, replies: Vec<PushOutcome>) -> Self {
            let mut replies = replies;
            replies.reverse();
            *self.declaration_replies.borrow_mut() = replies;
            self
        }

        fn unreachable_member(mut self, set: &str, identifier: &str) -> Self {
            self.unreachable_members
                .push((set.to_string(), identifier.to_string()));
            self
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl DdmApi for MockApi {
        fn upsert_declaration(&self, _payload: &[u8]) -> ApiResult<PushOutcome> {
            self.calls.borrow_mut().push("declaration".to_string());
            Ok(self
                .declaration_replies
                .borrow_mut()
                .pop()
                .unwrap_or(PushOutcome::Accepted { status: 200 }))
        }

        fn add_set_member(&self, set: &str, identifier: &str) -> ApiResult<MemberOutcome> {
            self.calls
                .borrow_mut()
                .push(format!("member {set} {identifier}"));
            let key = (set.to_string(), identifier.to_string());
            if self.unreachable_members.contains(&key) {
                return Err(ApiError::Transport {
                    url: format!("https://ddm.test/set-declarations/{set}"),
                    detail: "connection refused".to_string(),
                });
            }
            Ok(self
                .member_replies
                .get(&key)
                .cloned()
                .unwrap_or(MemberOutcome::Applied))
        }
    }

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).expect("write fixture file");
        path
    }

    #[test]
    fn empty_directory_makes_no_remote_calls() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write(tmp.path(), "notes.md", "nothing to see");

        let api = MockApi::default();
        let report = Engine::new(&api).sync(tmp.path()).expect("sync");

        assert_eq!(api.call_count(), 0);
        assert_eq!(report.declarations_attempted, 0);
        assert_eq!(report.members_attempted, 0);
        assert!(report.is_clean());
    }

    #[test]
    fn missing_root_is_fatal() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let api = MockApi::default();
        let err = Engine::new(&api)
            .sync(&tmp.path().join("missing"))
            .expect_err("sync should fail");
        assert!(matches!(err, ScanError::NotFound(_)));
        assert_eq!(api.call_count(), 0);
    }

    #[test]
    fn empty_set_file_is_skipped_without_calls() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write(tmp.path(), "set.ghosts.txt", "# all\n# comments\n\n");

        let api = MockApi::default();
        let report = Engine::new(&api).sync(tmp.path()).expect("sync");

        assert_eq!(api.call_count(), 0);
        assert_eq!(report.sets_skipped, 1);
        assert_eq!(report.sets_processed, 0);
        assert_eq!(
            report.items,
            vec![SyncItemResult {
                kind: ItemKind::SetFile,
                key: "ghosts".to_string(),
                outcome: ItemOutcome::SkippedEmpty,
            }]
        );
    }

    #[test]
    fn member_failure_does_not_halt_the_set() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write(tmp.path(), "set.team.txt", "alice\nbob\ncarol\n");

        let api = MockApi::default()
            .member_reply("team", "alice", MemberOutcome::Unchanged)
            .member_reply(
                "team",
                "bob",
                MemberOutcome::Rejected {
                    status: 500,
                    detail: "server error".to_string(),
                },
            );
        let report = Engine::new(&api).sync(tmp.path()).expect("sync");

        assert_eq!(report.members_attempted, 3);
        assert_eq!(report.already_present, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.succeeded, 1);
        assert_eq!(api.call_count(), 3);
    }

    #[test]
    fn transport_failure_counts_like_http_failure_with_distinct_detail() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write(tmp.path(), "set.team.txt", "alice\nbob\n");

        let api = MockApi::default().unreachable_member("team", "alice");
        let report = Engine::new(&api).sync(tmp.path()).expect("sync");

        assert_eq!(report.failed, 1);
        assert_eq!(report.succeeded, 1);
        let failed = report
            .items
            .iter()
            .find(|item| matches!(item.outcome, ItemOutcome::Failed { .. }))
            .expect("one failed item");
        let ItemOutcome::Failed { detail } = &failed.outcome else {
            unreachable!();
        };
        assert!(detail.contains("connection refused"));
    }

    #[test]
    fn declaration_failure_does_not_block_later_files() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write(tmp.path(), "a.json", r#"{"Identifier":"com.example.a"}"#);
        write(tmp.path(), "b.json", r#"{"Identifier":"com.example.b"}"#);

        let api = MockApi::default().declaration_replies(vec![
            PushOutcome::Rejected {
                status: 400,
                detail: "bad declaration".to_string(),
            },
            PushOutcome::Accepted { status: 204 },
        ]);
        let report = Engine::new(&api).sync(tmp.path()).expect("sync");

        assert_eq!(report.declarations_attempted, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.succeeded, 1);
        assert_eq!(api.call_count(), 2);
    }

    #[test]
    fn unreadable_set_file_only_fails_that_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let good = write(tmp.path(), "set.real.txt", "dev1\n");
        let inventory = Inventory {
            declarations: Vec::new(),
            sets: vec![tmp.path().join("set.gone.txt"), good],
        };

        let api = MockApi::default();
        let report = Engine::new(&api).apply(&inventory);

        assert_eq!(report.failed, 1);
        assert_eq!(report.sets_processed, 1);
        assert_eq!(report.members_attempted, 1);
        assert_eq!(report.succeeded, 1);
    }

    #[test]
    fn end_to_end_mixed_directory() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write(tmp.path(), "a.json", r#"{"Identifier":"com.example.a"}"#);
        write(tmp.path(), "set.teamA.txt", "dev1\ndev2\n");
        write(tmp.path(), "notes.md", "ignored");

        let api = MockApi::default();
        let report = Engine::new(&api).sync(tmp.path()).expect("sync");

        assert_eq!(report.declarations_attempted, 1);
        assert_eq!(report.sets_processed, 1);
        assert_eq!(report.members_attempted, 2);
        assert_eq!(report.succeeded, 3);
        assert_eq!(report.failed, 0);
        let calls = api.calls.borrow();
        assert!(calls.contains(&"member teama dev1".to_string()));
        assert!(calls.contains(&"member teama dev2".to_string()));
    }
}
