use tokio::sync::mpsc;

use crate::presenter::RepoPresenter;

/// Receives the results of one pass, in the order they become ready.
pub trait Renderer: Send {
    /// Called once, before any presenter.
    fn update_supported(&mut self, supported: bool);

    fn present(&mut self, presenter: &RepoPresenter);

    /// Called before [`Renderer::complete`] when nothing was presented.
    fn nothing_to_show(&mut self);

    /// End of the stream. Always the last call of a pass.
    fn complete(&mut self, presented: usize);
}

/// Hand every presenter from `rx` to `renderer` as it arrives, stopping
/// after `limit` presenters if one is given. Returns how many were shown.
pub async fn emit<R: Renderer + ?Sized>(
    mut rx: mpsc::Receiver<RepoPresenter>,
    renderer: &mut R,
    update_supported: bool,
    limit: Option<usize>,
) -> usize {
    renderer.update_supported(update_supported);

    let mut presented = 0;
    while limit.map_or(true, |max| presented < max) {
        let Some(presenter) = rx.recv().await else {
            break;
        };
        renderer.present(&presenter);
        presented += 1;
    }

    if presented == 0 {
        renderer.nothing_to_show();
    }
    renderer.complete(presented);
    presented
}
