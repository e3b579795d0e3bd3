use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tempfile::TempDir;

use super::universe::tests::counting_registry;
use super::*;
use crate::domain::VcsState;
use crate::presenter::ProviderRegistry;

/// VCS answering from a fixed table; unknown roots fail.
struct FakeVcs {
    states: HashMap<PathBuf, VcsState>,
}

impl Vcs for FakeVcs {
    fn status<'a>(&'a self, root: &'a Path) -> BoxFuture<'a, Result<VcsState, VcsError>> {
        Box::pin(async move {
            self.states.get(root).cloned().ok_or_else(|| VcsError::Command {
                command: "git status".to_string(),
                dir: root.to_path_buf(),
                stderr: "not a repository".to_string(),
            })
        })
    }
}

#[derive(Default)]
struct RecordingRenderer {
    events: Vec<&'static str>,
    update_supported: Option<bool>,
    presented: Vec<(PathBuf, Option<usize>)>,
    nothing_to_show: bool,
    completed: Option<usize>,
}

impl Renderer for RecordingRenderer {
    fn update_supported(&mut self, supported: bool) {
        self.events.push("update_supported");
        self.update_supported = Some(supported);
    }

    fn present(&mut self, presenter: &RepoPresenter) {
        self.events.push("present");
        self.presented.push((
            presenter.repo().root().to_path_buf(),
            presenter.changes().map(|c| c.count()),
        ));
    }

    fn nothing_to_show(&mut self) {
        self.events.push("nothing_to_show");
        self.nothing_to_show = true;
    }

    fn complete(&mut self, presented: usize) {
        self.events.push("complete");
        self.completed = Some(presented);
    }
}

struct Workspace {
    _temp: TempDir,
    src: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        Self { _temp: temp, src }
    }

    /// Create a git checkout at `import_path` holding the given
    /// sub-packages, and return its packages.
    fn checkout(&self, import_path: &str, subpackages: &[&str]) -> Vec<Package> {
        let root = self.src.join(import_path);
        fs::create_dir_all(root.join(".git")).unwrap();
        let mut packages = vec![Package::new(import_path, Some(root.clone()))];
        for sub in subpackages {
            let dir = root.join(sub);
            fs::create_dir_all(&dir).unwrap();
            packages.push(Package::new(format!("{}/{}", import_path, sub), Some(dir)));
        }
        packages
    }

    fn root(&self, import_path: &str) -> PathBuf {
        self.src.join(import_path)
    }
}

fn state(dirty: bool, local: &str, remote: &str, host: &str) -> VcsState {
    VcsState {
        branch: "master".to_string(),
        default_branch: "master".to_string(),
        dirty,
        local_rev: local.to_string(),
        remote_rev: remote.to_string(),
        remote_url: Some(format!("https://{}/o/r.git", host)),
    }
}

fn pipeline(ws: &Workspace, states: HashMap<PathBuf, VcsState>, registry: ProviderRegistry) -> Pipeline {
    Pipeline::new(
        Arc::new(FakeVcs { states }),
        Arc::new(Universe::new(registry, Duration::from_secs(5))),
        vec![ws.src.clone()],
        4,
        2,
    )
}

#[tokio::test]
async fn test_only_presentable_repositories_are_emitted() {
    let ws = Workspace::new();
    let mut packages = ws.checkout("example.com/o/dirty", &["sub"]);
    packages.extend(ws.checkout("example.com/o/behind", &["a", "b"]));
    packages.extend(ws.checkout("example.com/o/current", &[]));

    let states = HashMap::from([
        (ws.root("example.com/o/dirty"), state(true, "a", "b", "example.com")),
        (ws.root("example.com/o/behind"), state(false, "a", "b", "example.com")),
        (ws.root("example.com/o/current"), state(false, "a", "a", "example.com")),
    ]);
    let (registry, calls) = counting_registry(Duration::ZERO, false);
    let pipeline = pipeline(&ws, states, registry);

    let mut renderer = RecordingRenderer::default();
    let summary = pipeline.run(packages, &mut renderer, true, None).await;

    assert_eq!(summary.packages, 6);
    assert_eq!(summary.repositories, 3);
    assert_eq!(summary.presented, 1);
    assert_eq!(renderer.update_supported, Some(true));
    assert_eq!(
        renderer.presented,
        vec![(ws.root("example.com/o/behind"), Some(1))]
    );
    assert_eq!(renderer.completed, Some(1));
    assert!(!renderer.nothing_to_show);
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_comparison_failure_still_presents_without_changes() {
    let ws = Workspace::new();
    let packages = ws.checkout("example.com/o/r", &[]);
    let states = HashMap::from([(ws.root("example.com/o/r"), state(false, "a", "b", "example.com"))]);
    let (registry, _calls) = counting_registry(Duration::ZERO, true);
    let pipeline = pipeline(&ws, states, registry);

    let mut renderer = RecordingRenderer::default();
    pipeline.run(packages, &mut renderer, false, None).await;

    assert_eq!(renderer.presented, vec![(ws.root("example.com/o/r"), None)]);
    assert_eq!(renderer.update_supported, Some(false));
}

#[tokio::test]
async fn test_unknown_host_presents_without_changes() {
    let ws = Workspace::new();
    let packages = ws.checkout("example.com/o/r", &[]);
    let states = HashMap::from([(ws.root("example.com/o/r"), state(false, "a", "b", "gitlab.com"))]);
    let (registry, calls) = counting_registry(Duration::ZERO, false);
    let pipeline = pipeline(&ws, states, registry);

    let mut renderer = RecordingRenderer::default();
    pipeline.run(packages, &mut renderer, true, None).await;

    assert_eq!(renderer.presented, vec![(ws.root("example.com/o/r"), None)]);
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_status_failure_drops_only_that_repository() {
    let ws = Workspace::new();
    let mut packages = ws.checkout("example.com/o/broken", &[]);
    packages.extend(ws.checkout("example.com/o/fine", &[]));
    let states = HashMap::from([(ws.root("example.com/o/fine"), state(false, "a", "b", "example.com"))]);
    let (registry, _calls) = counting_registry(Duration::ZERO, false);
    let pipeline = pipeline(&ws, states, registry);

    let mut renderer = RecordingRenderer::default();
    pipeline.run(packages, &mut renderer, true, None).await;

    assert_eq!(renderer.presented.len(), 1);
    assert_eq!(renderer.presented[0].0, ws.root("example.com/o/fine"));
}

#[tokio::test]
async fn test_empty_workspace_has_nothing_to_show() {
    let ws = Workspace::new();
    let (registry, _calls) = counting_registry(Duration::ZERO, false);
    let pipeline = pipeline(&ws, HashMap::new(), registry);

    let mut renderer = RecordingRenderer::default();
    let summary = pipeline.run(Vec::new(), &mut renderer, true, None).await;

    assert_eq!(summary.presented, 0);
    assert!(renderer.nothing_to_show);
    assert_eq!(renderer.completed, Some(0));
    assert_eq!(
        renderer.events,
        vec!["update_supported", "nothing_to_show", "complete"]
    );
}

#[tokio::test]
async fn test_pinned_revision_replaces_local_revision() {
    let ws = Workspace::new();
    let packages: Vec<Package> = ws
        .checkout("example.com/o/r", &[])
        .into_iter()
        .map(|p| p.with_pinned_rev("b"))
        .collect();
    // Checked out at "a" but pinned to the remote revision: up to date.
    let states = HashMap::from([(ws.root("example.com/o/r"), state(false, "a", "b", "example.com"))]);
    let (registry, _calls) = counting_registry(Duration::ZERO, false);
    let pipeline = pipeline(&ws, states, registry);

    let mut renderer = RecordingRenderer::default();
    pipeline.run(packages, &mut renderer, false, None).await;

    assert!(renderer.presented.is_empty());
    assert!(renderer.nothing_to_show);
}

#[tokio::test]
async fn test_limit_stops_after_enough_presenters() {
    let ws = Workspace::new();
    let mut packages = Vec::new();
    let mut states = HashMap::new();
    for i in 0..6 {
        let path = format!("example.com/o/r{}", i);
        packages.extend(ws.checkout(&path, &[]));
        states.insert(ws.root(&path), state(false, "a", "b", "example.com"));
    }
    let (registry, _calls) = counting_registry(Duration::ZERO, false);
    let pipeline = pipeline(&ws, states, registry);

    let mut renderer = RecordingRenderer::default();
    let summary = pipeline.run(packages, &mut renderer, true, Some(2)).await;

    assert_eq!(summary.presented, 2);
    assert_eq!(renderer.presented.len(), 2);
    assert_eq!(renderer.completed, Some(2));
}

#[tokio::test]
async fn test_survey_counts_and_warms_the_cache() {
    let ws = Workspace::new();
    let mut packages = ws.checkout("example.com/o/dirty", &[]);
    packages.extend(ws.checkout("example.com/o/behind", &[]));
    packages.extend(ws.checkout("example.com/o/broken", &[]));
    let states = HashMap::from([
        (ws.root("example.com/o/dirty"), state(true, "a", "b", "example.com")),
        (ws.root("example.com/o/behind"), state(false, "a", "b", "example.com")),
    ]);
    let (registry, calls) = counting_registry(Duration::ZERO, false);
    let pipeline = pipeline(&ws, states, registry);

    let survey = pipeline.survey(packages).await;

    assert_eq!(survey.packages, 3);
    assert_eq!(survey.repositories, 3);
    assert_eq!(survey.dirty, 1);
    assert_eq!(survey.status_failures, 1);
    assert_eq!(survey.with_updates, 1);
    // The dirty repository is not presentable but is still compared.
    assert_eq!(survey.comparisons, 2);
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    assert_eq!(pipeline.universe().len(), 2);
}
