//! Renderers for pass results.

use std::fmt::Write as _;

use crate::pipeline::Renderer;
use crate::presenter::RepoPresenter;

/// Changes shown per repository before the list is cut short.
const MAX_CHANGES_SHOWN: usize = 10;

/// Write a plain-text block for one presenter.
fn write_presenter(out: &mut String, presenter: &RepoPresenter, update_supported: bool) {
    let repo = presenter.repo();
    let _ = writeln!(out, "📦 {}", repo.root().display());
    if let Some(home) = presenter.home_page() {
        let _ = writeln!(out, "   {}", home);
    }

    let packages: Vec<&str> = repo.packages().iter().map(|p| p.import_path()).collect();
    let _ = writeln!(out, "   Packages: {}", packages.join(", "));

    match presenter.changes() {
        Some(changes) => {
            let changes: Vec<_> = changes.collect();
            let _ = writeln!(out, "   {} new commit(s):", changes.len());
            for change in changes.iter().take(MAX_CHANGES_SHOWN) {
                let short = change.sha.get(..7).unwrap_or(&change.sha);
                let _ = match change.date {
                    Some(date) => writeln!(
                        out,
                        "     {} {} ({})",
                        short,
                        change.summary(),
                        date.format("%Y-%m-%d")
                    ),
                    None => writeln!(out, "     {} {}", short, change.summary()),
                };
            }
            if changes.len() > MAX_CHANGES_SHOWN {
                let _ = writeln!(out, "     ... and {} more", changes.len() - MAX_CHANGES_SHOWN);
            }
        }
        None => {
            let _ = writeln!(out, "   ⚠️  Changes unavailable");
        }
    }

    if update_supported {
        let _ = writeln!(out, "   Update with: pkgstore update {}", repo.import_path_pattern());
    }
}

/// Prints results to stdout as they arrive.
#[derive(Debug, Default)]
pub struct ConsoleRenderer {
    update_supported: bool,
}

impl Renderer for ConsoleRenderer {
    fn update_supported(&mut self, supported: bool) {
        self.update_supported = supported;
    }

    fn present(&mut self, presenter: &RepoPresenter) {
        let mut block = String::new();
        write_presenter(&mut block, presenter, self.update_supported);
        println!("{}", block);
    }

    fn nothing_to_show(&mut self) {
        println!("✅ No updates available.");
    }

    fn complete(&mut self, presented: usize) {
        if presented > 0 {
            println!("🔄 {} repositories with updates.", presented);
        }
    }
}

/// Collects results into a string, for MCP responses.
#[derive(Debug, Default)]
pub struct TextReport {
    update_supported: bool,
    text: String,
}

impl TextReport {
    pub fn into_text(self) -> String {
        self.text
    }
}

impl Renderer for TextReport {
    fn update_supported(&mut self, supported: bool) {
        self.update_supported = supported;
        if !supported {
            self.text
                .push_str("Updates are not available for this package source.\n\n");
        }
    }

    fn present(&mut self, presenter: &RepoPresenter) {
        write_presenter(&mut self.text, presenter, self.update_supported);
        self.text.push('\n');
    }

    fn nothing_to_show(&mut self) {
        self.text.push_str("No updates available.\n");
    }

    fn complete(&mut self, presented: usize) {
        if presented > 0 {
            let _ = writeln!(self.text, "{} repositories with updates.", presented);
        }
    }
}
