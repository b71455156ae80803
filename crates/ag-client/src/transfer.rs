//! Batch export and import of entity collections.
//!
//! Both directions resolve their input up front (remote listing or import
//! file plus membership listing), then hand one job per entity to
//! [`ag_core::run_batch`]. Per-entity failures are collected into the
//! report instead of aborting the run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ag_core::{run_batch, BatchError, ClientConfig, ConflictPolicy, MembershipSet, UpsertAction};
use serde_json::Value;

use crate::entities::EntityKind;
use crate::error::ClientResult;
use crate::source::{fetch_membership, list_names, read_records};
use crate::transport::{ApiRequest, Transport};

/// Result of exporting one collection.
#[derive(Debug, Default)]
pub struct ExportReport {
    /// Raw entity bodies, sorted by the kind's identifying field.
    pub payloads: Vec<Vec<u8>>,
    /// Aggregate of the entities that could not be fetched.
    pub error: Option<BatchError>,
    /// Number of workers the batch used.
    pub workers: usize,
}

/// Fetches every entity of a collection with at most `config.conn`
/// requests in flight.
pub async fn export<K: EntityKind>(
    transport: Arc<dyn Transport>,
    kind: &K,
    config: &ClientConfig,
) -> ClientResult<ExportReport> {
    config.validate()?;
    let names = list_names(transport.as_ref(), kind, config).await?;
    let jobs = names
        .into_iter()
        .map(|name| {
            let path = kind.entity_path(config, &name)?;
            Ok((name, path))
        })
        .collect::<ClientResult<Vec<_>>>()?;

    tracing::debug!(kind = kind.label(), jobs = jobs.len(), conn = %config.conn, "exporting");

    let label = kind.label();
    let outcome = run_batch(jobs, config.conn, move |(name, path): (String, String)| {
        let transport = Arc::clone(&transport);
        async move {
            transport
                .send(ApiRequest::get(path))
                .await
                .map_err(|e| e.for_entity(label, name))
        }
    })
    .await;

    let workers = outcome.workers;
    let (mut payloads, error) = outcome.into_parts();
    sort_by_id(&mut payloads, kind.id_field());

    Ok(ExportReport {
        payloads,
        error,
        workers,
    })
}

/// Orders payloads by the string value of `id_field`. Bodies without it
/// sort first.
fn sort_by_id(payloads: &mut [Vec<u8>], id_field: &str) {
    payloads.sort_by_cached_key(|body| {
        serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|value| value.get(id_field).and_then(Value::as_str).map(str::to_string))
            .unwrap_or_default()
    });
}

/// Writes exported payloads as a JSON array to the kind's export file in
/// `folder`, creating the folder if needed.
pub fn write_export_file<K: EntityKind>(
    folder: &Path,
    kind: &K,
    payloads: &[Vec<u8>],
) -> ClientResult<PathBuf> {
    std::fs::create_dir_all(folder)?;
    let path = folder.join(kind.export_file());

    let mut contents = Vec::with_capacity(payloads.iter().map(|p| p.len() + 1).sum::<usize>() + 2);
    contents.push(b'[');
    for (i, payload) in payloads.iter().enumerate() {
        if i > 0 {
            contents.push(b',');
        }
        contents.extend_from_slice(payload);
    }
    contents.push(b']');

    std::fs::write(&path, contents)?;
    tracing::debug!(path = %path.display(), entities = payloads.len(), "wrote export file");
    Ok(path)
}

/// One planned import request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportJob {
    /// Entity name.
    pub name: String,
    /// Classification against the remote collection.
    pub action: UpsertAction,
    /// Request to send; `None` for skipped entities.
    pub request: Option<ApiRequest>,
}

/// Classifies every record and builds its request.
pub fn plan_import<K: EntityKind>(
    kind: &K,
    config: &ClientConfig,
    records: &[K::Record],
    members: &MembershipSet,
) -> ClientResult<Vec<ImportJob>> {
    let update_method = kind.update_method();
    records
        .iter()
        .map(|record| {
            let name = kind.record_name(record).trim();
            if name.is_empty() {
                return Err(ag_core::Error::Validation(format!(
                    "{} in import file has no {}",
                    kind.label(),
                    kind.id_field()
                ))
                .into());
            }

            let action = members.classify(name, update_method.is_some(), config.existing_policy);
            let request = match (&action, &update_method) {
                (UpsertAction::Create, _) => Some(ApiRequest::post(
                    kind.create_path(config, record)?,
                    kind.payload(record)?,
                )),
                (UpsertAction::Update, Some(method)) => Some(
                    ApiRequest::new(method.clone(), kind.update_path(config, name)?)
                        .with_body(kind.payload(record)?),
                ),
                _ => None,
            };

            Ok(ImportJob {
                name: name.to_string(),
                action,
                request,
            })
        })
        .collect()
}

/// What happened to one imported entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStatus {
    /// Created.
    Created,
    /// Existing entity updated.
    Updated,
    /// Existing entity left untouched.
    Skipped,
    /// Rejected with 409 and tolerated.
    Conflict,
}

/// Successful outcome of one import job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Entity name.
    pub name: String,
    /// What happened.
    pub status: ImportStatus,
}

/// Import counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Created entities.
    pub created: usize,
    /// Updated entities.
    pub updated: usize,
    /// Skipped entities.
    pub skipped: usize,
    /// Tolerated conflicts.
    pub conflicts: usize,
    /// Failed entities.
    pub failed: usize,
}

/// Result of importing one collection.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Successful outcomes in completion order.
    pub outcomes: Vec<ImportOutcome>,
    /// Aggregate of the entities that failed.
    pub error: Option<BatchError>,
    /// Number of workers the batch used.
    pub workers: usize,
}

impl ImportReport {
    /// Counts outcomes by status.
    pub fn summary(&self) -> ImportSummary {
        let mut summary = ImportSummary {
            failed: self.error.as_ref().map_or(0, BatchError::len),
            ..ImportSummary::default()
        };
        for outcome in &self.outcomes {
            match outcome.status {
                ImportStatus::Created => summary.created += 1,
                ImportStatus::Updated => summary.updated += 1,
                ImportStatus::Skipped => summary.skipped += 1,
                ImportStatus::Conflict => summary.conflicts += 1,
            }
        }
        summary
    }
}

/// Imports records into a collection with at most `config.conn` requests
/// in flight.
pub async fn import<K: EntityKind>(
    transport: Arc<dyn Transport>,
    kind: &K,
    config: &ClientConfig,
    records: Vec<K::Record>,
) -> ClientResult<ImportReport> {
    config.validate()?;
    kind.collection_path(config)?;

    let members = fetch_membership(transport.as_ref(), kind, config).await?;
    let jobs = plan_import(kind, config, &records, &members)?;
    drop(records);

    tracing::debug!(
        kind = kind.label(),
        jobs = jobs.len(),
        existing = members.len(),
        conn = %config.conn,
        "importing"
    );

    let label = kind.label();
    let conflict_policy = config.conflict_policy;
    let outcome = run_batch(jobs, config.conn, move |job: ImportJob| {
        let transport = Arc::clone(&transport);
        async move {
            let ImportJob { name, action, request } = job;
            let Some(request) = request else {
                tracing::debug!(kind = label, %name, "skipping existing entity");
                return Ok(ImportOutcome {
                    name,
                    status: ImportStatus::Skipped,
                });
            };

            match transport.send(request).await {
                Ok(_) => Ok(ImportOutcome {
                    name,
                    status: if action == UpsertAction::Create {
                        ImportStatus::Created
                    } else {
                        ImportStatus::Updated
                    },
                }),
                Err(e) if e.is_conflict() && conflict_policy == ConflictPolicy::Ignore => {
                    tracing::warn!(kind = label, %name, "entity already exists, conflict ignored");
                    Ok(ImportOutcome {
                        name,
                        status: ImportStatus::Conflict,
                    })
                }
                Err(e) => Err(e.for_entity(label, name)),
            }
        }
    })
    .await;

    let workers = outcome.workers;
    let (outcomes, error) = outcome.into_parts();
    let report = ImportReport {
        outcomes,
        error,
        workers,
    };
    let summary = report.summary();
    tracing::info!(
        kind = label,
        created = summary.created,
        updated = summary.updated,
        skipped = summary.skipped,
        conflicts = summary.conflicts,
        failed = summary.failed,
        "import finished"
    );
    Ok(report)
}

/// Reads an import file and imports its records.
pub async fn import_file<K: EntityKind>(
    transport: Arc<dyn Transport>,
    kind: &K,
    config: &ClientConfig,
    path: &Path,
) -> ClientResult<ImportReport> {
    let records = read_records(kind, path)?;
    import(transport, kind, config, records).await
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use ag_core::{Concurrency, ExistingPolicy};
    use async_trait::async_trait;
    use reqwest::Method;

    use super::*;
    use crate::entities::{
        App, Apps, Keystores, Reference, References, TargetServer, TargetServers,
    };
    use crate::error::ClientError;

    /// In-memory collection store speaking the platform's path layout.
    #[derive(Default)]
    struct FakePlatform {
        collection: String,
        entities: Mutex<BTreeMap<String, Vec<u8>>>,
        failing: Vec<String>,
        conflicting: Vec<String>,
        requests: Mutex<Vec<(Method, String)>>,
    }

    impl FakePlatform {
        fn new(collection: &str) -> Self {
            Self {
                collection: collection.to_string(),
                ..Self::default()
            }
        }

        fn with_entity(self, name: &str, body: &str) -> Self {
            self.entities
                .lock()
                .unwrap()
                .insert(name.to_string(), body.as_bytes().to_vec());
            self
        }

        fn methods(&self) -> Vec<Method> {
            self.requests.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
        }

        fn api(status: u16) -> ClientError {
            ClientError::Api {
                status,
                message: crate::transport::status_message(status).to_string(),
                body: String::new(),
            }
        }
    }

    #[async_trait]
    impl Transport for FakePlatform {
        async fn send(&self, request: ApiRequest) -> ClientResult<Vec<u8>> {
            self.requests
                .lock()
                .unwrap()
                .push((request.method.clone(), request.path.clone()));
            let name = request
                .path
                .strip_prefix(&self.collection)
                .unwrap_or_default()
                .trim_start_matches('/')
                .to_string();
            let mut entities = self.entities.lock().unwrap();

            let method = request.method;
            if method == Method::GET && name.is_empty() {
                let names: Vec<&String> = entities.keys().collect();
                Ok(serde_json::to_vec(&names)?)
            } else if method == Method::GET {
                if self.failing.contains(&name) {
                    return Err(Self::api(500));
                }
                entities.get(&name).cloned().ok_or_else(|| Self::api(404))
            } else if method == Method::POST && name.is_empty() {
                let body = request.body.unwrap_or_default();
                let value: Value = serde_json::from_slice(&body)?;
                let name = value["name"].as_str().unwrap_or_default().to_string();
                if self.conflicting.contains(&name) {
                    return Err(Self::api(409));
                }
                entities.insert(name, body.clone());
                Ok(body)
            } else if method == Method::PUT && !name.is_empty() {
                let body = request.body.unwrap_or_default();
                entities.insert(name, body.clone());
                Ok(body)
            } else {
                Err(Self::api(405))
            }
        }
    }

    fn config() -> ClientConfig {
        ClientConfig::new("acme")
            .with_env("test")
            .with_conn(Concurrency::new(2).unwrap())
    }

    fn server(name: &str) -> TargetServer {
        TargetServer {
            name: name.to_string(),
            host: Some(format!("{name}.internal")),
            port: Some(443),
            ..TargetServer::default()
        }
    }

    #[tokio::test]
    async fn export_collects_successes_and_failures() {
        let fake = FakePlatform {
            failing: vec!["c".to_string()],
            ..FakePlatform::new("environments/test/targetservers")
        }
        .with_entity("b", r#"{"name":"b"}"#)
        .with_entity("a", r#"{"name":"a"}"#)
        .with_entity("c", r#"{"name":"c"}"#);

        let report = export(Arc::new(fake), &TargetServers, &config()).await.unwrap();
        assert_eq!(report.payloads, vec![br#"{"name":"a"}"#.to_vec(), br#"{"name":"b"}"#.to_vec()]);
        assert_eq!(report.workers, 2);
        let error = report.error.unwrap();
        assert_eq!(error.len(), 1);
        assert!(error.to_string().starts_with("targetserver 'c': API error: 500"));
    }

    #[tokio::test]
    async fn export_of_empty_collection_starts_no_workers() {
        let fake = FakePlatform::new("environments/test/targetservers");
        let report = export(Arc::new(fake), &TargetServers, &config()).await.unwrap();
        assert!(report.payloads.is_empty());
        assert!(report.error.is_none());
        assert_eq!(report.workers, 0);
    }

    #[tokio::test]
    async fn env_scoped_kind_requires_environment() {
        let fake = Arc::new(FakePlatform::new("environments/test/references"));
        let config = ClientConfig::new("acme");
        let err = import(fake.clone(), &References, &config, Vec::<Reference>::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Core(ag_core::Error::Config(_))));
        assert!(fake.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_import_updates_everything() {
        let fake = Arc::new(FakePlatform::new("environments/test/targetservers"));
        let records = vec![server("a"), server("b"), server("c")];

        let first = import(fake.clone(), &TargetServers, &config(), records.clone())
            .await
            .unwrap();
        assert_eq!(first.summary().created, 3);
        assert!(first.error.is_none());

        let second = import(fake.clone(), &TargetServers, &config(), records).await.unwrap();
        let summary = second.summary();
        assert_eq!(summary.updated, 3);
        assert_eq!(summary.created, 0);
        assert_eq!(fake.entities.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn skip_existing_sends_nothing_for_existing() {
        let fake = Arc::new(
            FakePlatform::new("environments/test/targetservers").with_entity("a", r#"{"name":"a"}"#),
        );
        let config = config().with_existing_policy(ExistingPolicy::Skip);
        let report = import(fake.clone(), &TargetServers, &config, vec![server("a"), server("b")])
            .await
            .unwrap();
        let summary = report.summary();
        assert_eq!((summary.created, summary.skipped), (1, 1));
        assert!(!fake.methods().contains(&Method::PUT));
    }

    #[tokio::test]
    async fn conflicts_are_ignored_by_default() {
        let fake = Arc::new(FakePlatform {
            conflicting: vec!["b".to_string()],
            ..FakePlatform::new("environments/test/targetservers")
        });
        let report = import(fake, &TargetServers, &config(), vec![server("a"), server("b")])
            .await
            .unwrap();
        assert!(report.error.is_none());
        assert_eq!(report.summary().conflicts, 1);
    }

    #[tokio::test]
    async fn conflicts_fail_when_requested() {
        let fake = Arc::new(FakePlatform {
            conflicting: vec!["b".to_string()],
            ..FakePlatform::new("environments/test/targetservers")
        });
        let config = config().with_conflict_policy(ConflictPolicy::Fail);
        let report = import(fake, &TargetServers, &config, vec![server("a"), server("b")])
            .await
            .unwrap();
        assert_eq!(report.summary().created, 1);
        let error = report.error.unwrap();
        assert_eq!(error.messages(), ["targetserver 'b': API error: 409 - Conflict - request conflicts with the current state of the server"]);
    }

    #[tokio::test]
    async fn existing_keystores_are_skipped() {
        let fake = Arc::new(
            FakePlatform::new("environments/test/keystores").with_entity("ks1", r#"{"name":"ks1"}"#),
        );
        let records = vec!["ks1".to_string(), "ks2".to_string()];
        let report = import(fake.clone(), &Keystores, &config(), records).await.unwrap();
        let summary = report.summary();
        assert_eq!((summary.created, summary.skipped), (1, 1));
        assert_eq!(fake.methods(), vec![Method::GET, Method::POST]);
    }

    #[tokio::test]
    async fn exported_keystores_import_into_another_environment() {
        let source = FakePlatform::new("environments/test/keystores")
            .with_entity("ks1", r#"{"name":"ks1","aliases":["a1"]}"#)
            .with_entity("ks2", r#"{"name":"ks2","aliases":[]}"#);
        let report = export(Arc::new(source), &Keystores, &config()).await.unwrap();
        assert!(report.error.is_none());

        let dir = tempfile::tempdir().unwrap();
        let path = write_export_file(dir.path(), &Keystores, &report.payloads).unwrap();

        let target = Arc::new(
            FakePlatform::new("environments/test/keystores").with_entity("ks1", r#"{"name":"ks1"}"#),
        );
        let report = import_file(target.clone(), &Keystores, &config(), &path).await.unwrap();
        let summary = report.summary();
        assert_eq!((summary.created, summary.skipped), (1, 1));
        assert_eq!(
            target.entities.lock().unwrap().get("ks2").cloned(),
            Some(br#"{"name":"ks2"}"#.to_vec())
        );
    }

    #[test]
    fn apps_are_created_under_their_developer_and_never_updated() {
        let app = |id: &str, name: &str| App {
            name: name.to_string(),
            app_id: Some(id.to_string()),
            developer_id: Some("dev-1".to_string()),
            ..App::default()
        };
        let members: MembershipSet = ["id-a"].into_iter().collect();
        let jobs = plan_import(&Apps, &config(), &[app("id-a", "a"), app("id-b", "b")], &members).unwrap();

        assert_eq!(jobs[0].action, UpsertAction::Skip);
        assert!(jobs[0].request.is_none());
        let b = jobs[1].request.as_ref().unwrap();
        assert_eq!((b.method.clone(), b.path.as_str()), (Method::POST, "developers/dev-1/apps"));

        let orphan = App {
            name: "c".to_string(),
            ..App::default()
        };
        let err = plan_import(&Apps, &config(), &[orphan], &MembershipSet::new()).unwrap_err();
        assert!(matches!(err, ClientError::Core(ag_core::Error::Validation(_))));
    }

    #[test]
    fn nameless_record_is_rejected_before_dispatch() {
        let err = plan_import(&TargetServers, &config(), &[server(" ")], &MembershipSet::new())
            .unwrap_err();
        assert!(matches!(err, ClientError::Core(ag_core::Error::Validation(_))));
    }

    #[test]
    fn plan_uses_collection_for_create_and_entity_for_update() {
        let members: MembershipSet = ["a"].into_iter().collect();
        let jobs = plan_import(&TargetServers, &config(), &[server("a"), server("b")], &members).unwrap();
        let a = jobs[0].request.as_ref().unwrap();
        assert_eq!((a.method.clone(), a.path.as_str()), (Method::PUT, "environments/test/targetservers/a"));
        let b = jobs[1].request.as_ref().unwrap();
        assert_eq!((b.method.clone(), b.path.as_str()), (Method::POST, "environments/test/targetservers"));
    }

    #[test]
    fn export_file_is_a_verbatim_array() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("out");
        let payloads = vec![br#"{"name":"a"}"#.to_vec(), br#"{"name":"b"}"#.to_vec()];
        let path = write_export_file(&folder, &TargetServers, &payloads).unwrap();
        assert_eq!(path, folder.join("targetservers.json"));
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            r#"[{"name":"a"},{"name":"b"}]"#
        );

        let path = write_export_file(&folder, &TargetServers, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "[]");
    }
}
