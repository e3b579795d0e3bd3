//! Grouping of packages by repository root.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::domain::{Package, RepoMap, Repository};
use crate::pipeline::mapper::bounded_map;
use crate::vcs::find_root;

/// Group `packages` by the root of the repository that owns them.
///
/// Root detection fans out over `workers` tasks. Packages without a local
/// directory, or not inside any checkout under one of `boundaries`, are
/// dropped. Within a group, packages keep their input order, so the first
/// package of a repository is the first one the source listed.
pub async fn group_packages(
    packages: Vec<Package>,
    boundaries: Vec<PathBuf>,
    workers: usize,
) -> RepoMap {
    let total = packages.len();
    let boundaries = Arc::new(boundaries);

    let indexed = packages.into_iter().enumerate();
    let mut rx = bounded_map(indexed, workers, move |(index, package): (usize, Package)| {
        let boundaries = Arc::clone(&boundaries);
        async move {
            let dir = package.dir.clone()?;
            let root = tokio::task::spawn_blocking(move || {
                boundaries
                    .iter()
                    .filter(|b| dir.starts_with(b))
                    .find_map(|b| find_root(&dir, b))
            })
            .await
            .ok()
            .flatten()?;
            Some((root, index, package))
        }
    });

    // Detection finishes out of order; the index restores input order.
    let mut grouped: HashMap<PathBuf, Vec<(usize, Package)>> = HashMap::new();
    while let Some((root, index, package)) = rx.recv().await {
        grouped.entry(root).or_default().push((index, package));
    }

    let repos: RepoMap = grouped
        .into_iter()
        .filter_map(|(root, mut packages)| {
            packages.sort_by_key(|(index, _)| *index);
            let packages = packages.into_iter().map(|(_, p)| p).collect();
            Repository::new(root.clone(), packages).map(|repo| (root, repo))
        })
        .collect();

    debug!(
        "Grouped {} packages into {} repositories",
        total,
        repos.len()
    );
    repos
}
