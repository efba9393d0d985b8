use super::{Action, Expectation, Scenario, ScenarioFailure, ScenarioReport, Step};
use crate::config::HarnessConfig;
use crate::decode::{self, DecodeError, ResponseFormat, XmlOptions};
use crate::diff::{self, DiffKind, Difference};
use crate::error::{HarnessError, Mismatch, Result};
use crate::fixtures::{self, Fixtures};
use crate::naming::{self, IndexHandle};
use crate::normalize::{normalize, IgnoreKeys};
use crate::tree::Node;
use blackcheck_http::{builders, BlackLabClient, Credentials, QueryOptions, Response};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;
use tokio::task::JoinHandle;

/// Where a scenario stands; `Assert` holds the response under test.
enum State {
    Setup,
    CreateIndex,
    Ingest,
    Act,
    Assert(Response),
    Done,
}

impl State {
    fn step(&self) -> Step {
        match self {
            State::Setup => Step::Setup,
            State::CreateIndex => Step::CreateIndex,
            State::Ingest => Step::Ingest,
            State::Act => Step::Act,
            State::Assert(_) => Step::Assert,
            State::Done => Step::Done,
        }
    }
}

/// Drives scenarios against one service.
///
/// Holds no per-scenario state, so clones can run scenarios side by side.
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    client: BlackLabClient,
    config: HarnessConfig,
    fixtures: Fixtures,
}

impl ScenarioRunner {
    pub fn new(config: HarnessConfig) -> Result<Self> {
        let client = BlackLabClient::new(
            &config.base_url,
            Credentials::new(&config.username, &config.password),
            config.request_timeout,
        )?;
        let fixtures = Fixtures::new(&config.fixture_root);
        Ok(Self {
            client,
            config,
            fixtures,
        })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn fixtures(&self) -> &Fixtures {
        &self.fixtures
    }

    /// Run `scenario` on an index named from `rng`.
    pub async fn run<R: Rng + ?Sized>(&self, scenario: &Scenario, rng: &mut R) -> ScenarioReport {
        let handle = IndexHandle::mint(&self.config.username, rng);
        self.run_with_handle(scenario, handle).await
    }

    pub async fn run_with_handle(&self, scenario: &Scenario, handle: IndexHandle) -> ScenarioReport {
        let started_at = Utc::now();
        let clock = Instant::now();
        tracing::info!(scenario = %scenario.name, index = %handle, "scenario started");

        let outcome = self.drive(scenario, &handle).await;
        let index_created = match &outcome {
            Ok(()) => true,
            Err(failure) => failure.step > Step::CreateIndex,
        };
        if self.config.cleanup && index_created {
            self.cleanup(&handle).await;
        }

        let elapsed = clock.elapsed();
        match &outcome {
            Ok(()) => tracing::info!(
                scenario = %scenario.name,
                index = %handle,
                elapsed_ms = elapsed.as_millis() as u64,
                "scenario passed"
            ),
            Err(failure) => tracing::warn!(
                scenario = %scenario.name,
                index = %handle,
                step = %failure.step,
                error = %failure.error,
                "scenario failed"
            ),
        }

        ScenarioReport {
            scenario: scenario.name.clone(),
            index: handle,
            started_at,
            elapsed,
            outcome,
        }
    }

    /// Run every scenario, each on its own index. With `parallel`, scenarios
    /// run concurrently; calls within one scenario stay sequential. Reports
    /// come back in input order, one per scenario.
    pub async fn run_all(&self, scenarios: &[Scenario], parallel: bool) -> Vec<ScenarioReport> {
        let mut rng = StdRng::from_entropy();
        if !parallel {
            let mut reports = Vec::with_capacity(scenarios.len());
            for scenario in scenarios {
                reports.push(self.run(scenario, &mut rng).await);
            }
            return reports;
        }

        let spawned = scenarios
            .iter()
            .cloned()
            .map(|scenario| {
                let index = IndexHandle::mint(&self.config.username, &mut rng);
                let runner = self.clone();
                let task_index = index.clone();
                Spawned {
                    scenario: scenario.name.clone(),
                    index,
                    started_at: Utc::now(),
                    clock: Instant::now(),
                    task: tokio::spawn(async move {
                        runner.run_with_handle(&scenario, task_index).await
                    }),
                }
            })
            .collect();
        collect_reports(spawned).await
    }

    async fn drive(
        &self,
        scenario: &Scenario,
        handle: &IndexHandle,
    ) -> std::result::Result<(), ScenarioFailure> {
        let mut state = State::Setup;
        loop {
            let step = state.step();
            tracing::debug!(scenario = %scenario.name, index = %handle, %step, "entering step");
            let next = match state {
                State::Setup => self.setup().await.map(|()| State::CreateIndex),
                State::CreateIndex => self.create_index(handle).await.map(|()| State::Ingest),
                State::Ingest if scenario.ingest => self.ingest(handle).await.map(|()| State::Act),
                State::Ingest => Ok(State::Act),
                State::Act => self.act(&scenario.action, handle).await.map(State::Assert),
                State::Assert(response) => self
                    .check(scenario, &response)
                    .map(|()| State::Done),
                State::Done => return Ok(()),
            };
            state = next.map_err(|error| ScenarioFailure { step, error })?;
        }
    }

    async fn setup(&self) -> Result<()> {
        self.client.send_ok(builders::server_info()).await?;
        let descriptor = self.fixtures.read_bytes(fixtures::INPUT_FORMAT_FILE)?;
        self.client
            .send_ok(builders::register_format(descriptor, fixtures::INPUT_FORMAT_FILE))
            .await?;
        Ok(())
    }

    async fn create_index(&self, handle: &IndexHandle) -> Result<()> {
        let format_id = naming::format_id(&handle.owner, fixtures::INPUT_FORMAT_NAME);
        self.client
            .send_ok(builders::create_index(
                &handle.owner,
                &handle.name,
                &handle.name,
                &format_id,
            ))
            .await?;
        Ok(())
    }

    async fn ingest(&self, handle: &IndexHandle) -> Result<()> {
        let payload = self.fixtures.read_bytes(fixtures::DOCUMENTS_FILE)?;
        self.client
            .send_ok(builders::ingest_documents(&handle.id(), payload))
            .await?;
        Ok(())
    }

    async fn act(&self, action: &Action, handle: &IndexHandle) -> Result<Response> {
        let index_id = handle.id();
        let request = match action {
            Action::Status => builders::fetch_index_status(&index_id),
            Action::Content => builders::fetch_index_content(&index_id),
            Action::Metadata => builders::fetch_index_metadata(&index_id),
            Action::Query(query) => builders::run_query(
                &index_id,
                &query.pattern,
                query.filter.as_deref(),
                query.format,
                self.query_options(),
            ),
        };
        Ok(self.client.send_ok(request).await?)
    }

    fn query_options(&self) -> QueryOptions {
        QueryOptions {
            window_size: Some(self.config.window_size),
            words_around_hit: self.config.words_around_hit,
        }
    }

    fn check(&self, scenario: &Scenario, response: &Response) -> Result<()> {
        match &scenario.expectation {
            Expectation::Success => Ok(()),
            Expectation::MatchesFixture {
                fixture,
                ignore,
                xml_attributes,
            } => {
                let options = XmlOptions {
                    attributes: *xml_attributes,
                };
                let live = decode_response(response, scenario.action.format(), options)?;
                let expected = self.fixtures.load_tree_with(fixture, options)?;
                diff::compare(&scenario.name, &expected, &live, ignore)
                    .map_err(HarnessError::AssertionMismatch)
            }
            Expectation::EmptyList { path } => {
                let live =
                    decode_response(response, scenario.action.format(), XmlOptions::default())?;
                expect_empty_list(&scenario.name, &live, path)
            }
        }
    }

    async fn cleanup(&self, handle: &IndexHandle) {
        match self.client.send_ok(builders::delete_index(&handle.id())).await {
            Ok(_) => tracing::debug!(index = %handle, "index deleted"),
            Err(e) => tracing::warn!(index = %handle, "failed to delete index: {}", e),
        }
    }
}

/// A scenario running on its own task.
struct Spawned {
    scenario: String,
    index: IndexHandle,
    started_at: DateTime<Utc>,
    clock: Instant,
    task: JoinHandle<ScenarioReport>,
}

/// Await every task in input order. A task that panicked or was cancelled
/// still yields a failed report in its slot. Its step is unknown, so it is
/// reported as `DONE`, the step it never reached.
async fn collect_reports(spawned: Vec<Spawned>) -> Vec<ScenarioReport> {
    let mut reports = Vec::with_capacity(spawned.len());
    for entry in spawned {
        let report = match entry.task.await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(
                    scenario = %entry.scenario,
                    index = %entry.index,
                    "scenario task aborted: {}",
                    e
                );
                ScenarioReport {
                    scenario: entry.scenario,
                    index: entry.index,
                    started_at: entry.started_at,
                    elapsed: entry.clock.elapsed(),
                    outcome: Err(ScenarioFailure {
                        step: Step::Done,
                        error: HarnessError::Aborted(e.to_string()),
                    }),
                }
            }
        };
        reports.push(report);
    }
    reports
}

/// Decode by the response's `Content-Type`, or by the requested format when
/// the header is absent.
fn decode_response(
    response: &Response,
    requested: ResponseFormat,
    options: XmlOptions,
) -> Result<Node> {
    let node = match response.content_type.as_deref() {
        Some(content_type) => {
            let format = ResponseFormat::from_content_type(content_type).ok_or_else(|| {
                DecodeError::UnsupportedContentType(content_type.to_string())
            })?;
            decode::decode_with(&response.body_text, format, options)?
        }
        None => decode::decode_with(&response.body_text, requested, options)?,
    };
    Ok(node)
}

fn expect_empty_list(subject: &str, live: &Node, path: &str) -> Result<()> {
    let normalized = normalize(live, &IgnoreKeys::default());
    let found = normalized.lookup(path);
    let kind = match found {
        Some(Node::List(items)) if items.is_empty() => return Ok(()),
        Some(Node::List(_)) => DiffKind::Length,
        Some(_) => DiffKind::Type,
        None => DiffKind::Missing,
    };
    Err(HarnessError::AssertionMismatch(Mismatch {
        subject: subject.to_string(),
        differences: vec![Difference {
            path: path.to_string(),
            kind,
            expected: Some(serde_json::json!([])),
            actual: found.map(Node::to_json),
        }],
    }))
}
