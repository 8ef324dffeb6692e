//! The repository page: the README, rendered and scrollable.
//!
//! Degenerate form of the issues page machine: one fetch, one viewer, no
//! pagination or search. The same refresh-on-focus and stale-sequence rules
//! apply.

use std::sync::Arc;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use crate::Theme;
use crate::command::{self, Command};
use crate::github::{ReadmeFetcher, RepoId};
use crate::message::Message;
use crate::pages::PageState;
use crate::ui::spinner::Spinner;
use crate::ui::viewer::DocViewer;
use crate::ui::{Component, ComponentGroup, ComponentId};

pub struct RepoPage {
    repo: RepoId,
    fetcher: Arc<dyn ReadmeFetcher>,

    width: u16,
    height: u16,

    state: PageState,
    error: Option<String>,
    fetch_seq: u64,

    components: ComponentGroup,
    spinner_id: ComponentId,
    viewer_id: ComponentId,
}

impl RepoPage {
    pub fn new(
        repo: RepoId,
        fetcher: Arc<dyn ReadmeFetcher>,
        width: u16,
        height: u16,
        theme: Theme,
    ) -> Self {
        let mut components = ComponentGroup::new();
        let spinner_id = components.insert(Box::new(Spinner::new("Fetching README")));
        let viewer_id = components.insert(Box::new(DocViewer::new(width, height, theme)));

        Self {
            repo,
            fetcher,
            width,
            height,
            state: PageState::Loading,
            error: None,
            fetch_seq: 0,
            components,
            spinner_id,
            viewer_id,
        }
    }

    fn fetch(&mut self) -> Command {
        self.fetch_seq += 1;
        let seq = self.fetch_seq;
        let fetcher = Arc::clone(&self.fetcher);
        let repo = self.repo.clone();

        Command::Sequence(vec![
            Command::Emit(Message::ReadmeLoading),
            Command::perform(async move {
                let result = fetcher.readme(&repo).await.map_err(|e| e.to_string());
                Message::ReadmeFetched { seq, result }
            }),
        ])
    }

    fn handle_fetched(&mut self, seq: u64, result: &Result<String, String>) -> Option<Command> {
        if seq != self.fetch_seq {
            tracing::debug!(seq, newest = self.fetch_seq, "discarding stale readme fetch");
            return None;
        }
        self.state = PageState::Ready;
        let content = match result {
            Ok(readme) => {
                self.error = None;
                readme.clone()
            }
            Err(error) => {
                tracing::warn!(%error, "readme fetch failed");
                self.error = Some(error.clone());
                String::new()
            }
        };
        let set = self
            .components
            .dispatch_to_id(self.viewer_id, &Message::SetContent(content));
        command::batch([set, self.components.focus_on(self.viewer_id)])
    }
}

impl Component for RepoPage {
    fn update(&mut self, msg: &Message) -> Option<Command> {
        match msg {
            Message::Key(_) => {
                if self.state == PageState::Loading {
                    return None;
                }
                self.components.dispatch_to_focused(msg)
            }
            Message::Focus(_) => Some(self.fetch()),
            Message::Blur(_) => None,
            Message::Resize { width, height } => {
                self.width = *width;
                self.height = *height;
                self.components.dispatch_to_id(
                    self.viewer_id,
                    &Message::SetSize {
                        width: Some(*width),
                        height: Some(*height),
                    },
                )
            }
            Message::Tick => self.components.dispatch_to_all(&Message::Tick),
            Message::ReadmeLoading => {
                self.state = PageState::Loading;
                self.components.focus_on(self.spinner_id)
            }
            Message::ReadmeFetched { seq, result } => self.handle_fetched(*seq, result),
            _ => self.components.dispatch_to_focused(msg),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if self.state == PageState::Loading {
            self.components.render_id(self.spinner_id, frame, area, theme);
            return;
        }

        let mut body = area;
        if let Some(error) = &self.error {
            let notice = Rect { height: 1.min(body.height), ..body };
            frame.render_widget(
                Paragraph::new(Line::styled(
                    format!("readme fetch failed: {error}"),
                    Style::default().fg(theme.red),
                )),
                notice,
            );
            body.y = body.y.saturating_add(1);
            body.height = body.height.saturating_sub(1);
        }

        self.components.render_id(self.viewer_id, frame, body, theme);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use color_eyre::eyre::eyre;

    use super::*;

    struct FakeReadme {
        calls: Mutex<u32>,
        result: Result<String, String>,
    }

    impl FakeReadme {
        fn returning(readme: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(0),
                result: Ok(readme.to_string()),
            })
        }

        fn failing(error: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(0),
                result: Err(error.to_string()),
            })
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ReadmeFetcher for FakeReadme {
        async fn readme(&self, _repo: &RepoId) -> color_eyre::Result<String> {
            *self.calls.lock().unwrap() += 1;
            self.result.clone().map_err(|e| eyre!(e))
        }
    }

    fn page_with(fetcher: Arc<FakeReadme>) -> RepoPage {
        let repo: RepoId = "octocat/spoon-knife".parse().expect("valid repo");
        RepoPage::new(repo, fetcher, 40, 10, Theme::mocha())
    }

    async fn pump(page: &mut RepoPage, msg: Message) {
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            if let Some(cmd) = page.update(&msg) {
                queue.extend(command::drain(cmd).await);
            }
        }
    }

    #[tokio::test]
    async fn focus_fetches_the_readme_and_shows_it() {
        let fetcher = FakeReadme::returning("# Hello\n\nWorld.");
        let mut page = page_with(Arc::clone(&fetcher));

        pump(&mut page, Message::Focus(ComponentId::new(0))).await;

        assert_eq!(page.state, PageState::Ready);
        assert_eq!(fetcher.calls(), 1);
        assert!(page.components.is_focused(page.viewer_id));
        assert!(page.error.is_none());
    }

    #[tokio::test]
    async fn every_refocus_refreshes() {
        let fetcher = FakeReadme::returning("readme");
        let mut page = page_with(Arc::clone(&fetcher));

        pump(&mut page, Message::Focus(ComponentId::new(0))).await;
        page.update(&Message::Blur(ComponentId::new(0)));
        pump(&mut page, Message::Focus(ComponentId::new(0))).await;

        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn fetch_failure_reaches_ready_with_an_error() {
        let fetcher = FakeReadme::failing("not found");
        let mut page = page_with(fetcher);

        pump(&mut page, Message::Focus(ComponentId::new(0))).await;

        assert_eq!(page.state, PageState::Ready);
        assert!(page.error.as_deref().is_some_and(|e| e.contains("not found")));
    }

    #[tokio::test]
    async fn stale_readme_results_are_discarded() {
        let fetcher = FakeReadme::returning("readme");
        let mut page = page_with(fetcher);

        let first = page
            .update(&Message::Focus(ComponentId::new(0)))
            .expect("first fetch");
        let second = page
            .update(&Message::Focus(ComponentId::new(0)))
            .expect("second fetch");

        for msg in command::drain(first).await {
            page.update(&msg);
        }
        assert_eq!(page.state, PageState::Loading);

        for msg in command::drain(second).await {
            page.update(&msg);
        }
        assert_eq!(page.state, PageState::Ready);
    }

    #[tokio::test]
    async fn keys_are_swallowed_while_loading() {
        let fetcher = FakeReadme::returning("readme");
        let mut page = page_with(fetcher);
        assert!(page
            .update(&Message::Key(crossterm::event::KeyEvent::from(
                crossterm::event::KeyCode::Char('j')
            )))
            .is_none());
    }
}
