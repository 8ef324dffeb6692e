//! Application shell.
//!
//! Owns a [`ComponentGroup`] whose members are exactly the two pages, the
//! message channel commands resolve into, and the terminal event loop.
//! Global keys (quit, tab cycling) are handled here; everything else is
//! forwarded to the focused page.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Tabs};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::error;

use crate::Theme;
use crate::command::{self, Command};
use crate::config::AppConfig;
use crate::github::{IssueSearcher, ReadmeFetcher, RepoId};
use crate::message::Message;
use crate::pages::issues::IssuesPage;
use crate::pages::repo::RepoPage;
use crate::tui::{Event, Tui};
use crate::ui::{ComponentGroup, ComponentId};

pub struct App {
    repo: RepoId,
    theme: Theme,
    frame_rate: f64,
    tick_rate: f64,

    pages: ComponentGroup,
    tabs: Vec<(ComponentId, &'static str)>,

    tx: UnboundedSender<Message>,
    rx: UnboundedReceiver<Message>,
    should_quit: bool,
}

/// Interior area available to a page once the tab row and the window border
/// are accounted for.
const fn page_size(width: u16, height: u16) -> (u16, u16) {
    (width.saturating_sub(2), height.saturating_sub(3))
}

impl App {
    pub fn new(
        repo: RepoId,
        searcher: Arc<dyn IssueSearcher>,
        readme: Arc<dyn ReadmeFetcher>,
        config: &AppConfig,
        theme: Theme,
    ) -> Self {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

        // Real geometry arrives with the Init event; pages start with a
        // conventional default so they are never zero-sized.
        let (width, height) = page_size(80, 24);

        let mut pages = ComponentGroup::new();
        let repo_page = RepoPage::new(repo.clone(), readme, width, height, theme);
        let issues_page = IssuesPage::new(
            repo.clone(),
            searcher,
            config.fetch.page_size,
            width,
            height,
            theme,
        );
        let tabs = vec![
            (pages.insert(Box::new(repo_page)), "Repository"),
            (pages.insert(Box::new(issues_page)), "Issues"),
        ];

        Self {
            repo,
            theme,
            frame_rate: config.ui.frame_rate,
            tick_rate: config.ui.tick_rate,
            pages,
            tabs,
            tx,
            rx,
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> color_eyre::Result<()> {
        let mut tui = Tui::new(self.frame_rate, self.tick_rate)?;
        tui.enter()?;

        loop {
            let Some(event) = tui.next_event().await else {
                break;
            };
            self.handle_event(event, &mut tui)?;

            // Commands resolve onto the channel; apply everything pending
            // before the next terminal event.
            while let Ok(message) = self.rx.try_recv() {
                self.handle_message(&message);
            }

            if self.should_quit {
                break;
            }
        }

        tui.exit()
    }

    fn handle_event(&mut self, event: Event, tui: &mut Tui) -> color_eyre::Result<()> {
        match event {
            Event::Init => {
                let size = tui.size()?;
                self.resize(size.width, size.height);
                let command = self.pages.init();
                self.dispatch(command);
                // Focusing the first page triggers its initial fetch.
                let command = self.pages.focus_next();
                self.dispatch(command);
            }
            Event::Quit => self.should_quit = true,
            Event::Error(e) => error!(error = %e, "terminal event error"),
            Event::Tick => {
                let command = self.pages.dispatch_to_focused(&Message::Tick);
                self.dispatch(command);
            }
            Event::Render => {
                tui.draw(|frame| self.draw(frame))?;
            }
            Event::Key(key) => self.handle_key(key),
            Event::Resize(width, height) => self.resize(width, height),
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let command = match key.code {
            KeyCode::Tab => self.pages.focus_next(),
            KeyCode::BackTab => self.pages.focus_previous(),
            _ => self.pages.dispatch_to_focused(&Message::Key(key)),
        };
        self.dispatch(command);
    }

    /// Apply completed asynchronous work. Fetch results and child-emitted
    /// messages go to every page; each page picks out what concerns it.
    fn handle_message(&mut self, message: &Message) {
        let command = self.pages.dispatch_to_all(message);
        self.dispatch(command);
    }

    fn resize(&mut self, width: u16, height: u16) {
        let (width, height) = page_size(width, height);
        let command = self.pages.dispatch_to_all(&Message::Resize { width, height });
        self.dispatch(command);
    }

    fn dispatch(&mut self, command: Option<Command>) {
        if let Some(command) = command {
            command::spawn(command, self.tx.clone());
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let [header, body] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(frame.area());

        let selected = self
            .pages
            .focused_id()
            .and_then(|id| self.tabs.iter().position(|(tab, _)| *tab == id))
            .unwrap_or(0);
        let tabs = Tabs::new(self.tabs.iter().map(|(_, title)| *title))
            .select(selected)
            .style(Style::default().fg(self.theme.subtext0))
            .highlight_style(
                Style::default()
                    .fg(self.theme.lavender)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, header);

        let block = Block::bordered()
            .border_type(self.theme.border_type)
            .border_style(Style::default().fg(self.theme.overlay0))
            .title(Line::styled(
                format!(" {} ", self.repo),
                Style::default()
                    .fg(self.theme.text)
                    .add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(body);
        frame.render_widget(block, body);

        if let Some(id) = self.pages.focused_id() {
            self.pages.render_id(id, frame, inner, &self.theme);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use color_eyre::eyre::eyre;

    use super::*;
    use crate::github::IssueBatch;

    struct FakeProvider {
        searches: Mutex<u32>,
        readmes: Mutex<u32>,
    }

    impl FakeProvider {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                searches: Mutex::new(0),
                readmes: Mutex::new(0),
            })
        }
    }

    #[async_trait]
    impl IssueSearcher for FakeProvider {
        async fn search(
            &self,
            _repo: &RepoId,
            _term: &str,
            _page: u32,
            _per_page: u8,
        ) -> color_eyre::Result<IssueBatch> {
            *self.searches.lock().unwrap() += 1;
            Err(eyre!("offline"))
        }
    }

    #[async_trait]
    impl ReadmeFetcher for FakeProvider {
        async fn readme(&self, _repo: &RepoId) -> color_eyre::Result<String> {
            *self.readmes.lock().unwrap() += 1;
            Err(eyre!("offline"))
        }
    }

    fn app_with(provider: &Arc<FakeProvider>) -> App {
        let repo: RepoId = "octocat/spoon-knife".parse().expect("valid repo");
        App::new(
            repo,
            Arc::clone(provider) as Arc<dyn IssueSearcher>,
            Arc::clone(provider) as Arc<dyn ReadmeFetcher>,
            &AppConfig::default(),
            Theme::mocha(),
        )
    }

    #[tokio::test]
    async fn tab_cycles_through_both_pages_and_wraps() {
        let provider = FakeProvider::new();
        let mut app = app_with(&provider);

        let command = app.pages.focus_next();
        app.dispatch(command);
        let first = app.pages.focused_id();
        app.handle_key(KeyEvent::from(KeyCode::Tab));
        let second = app.pages.focused_id();
        app.handle_key(KeyEvent::from(KeyCode::Tab));

        assert_ne!(first, second);
        assert_eq!(app.pages.focused_id(), first, "tab wraps around");
        app.handle_key(KeyEvent::from(KeyCode::BackTab));
        assert_eq!(app.pages.focused_id(), second);
    }

    #[tokio::test]
    async fn each_focus_transfer_starts_a_fetch() {
        let provider = FakeProvider::new();
        let mut app = app_with(&provider);

        let command = app.pages.focus_next();
        app.dispatch(command);
        app.handle_key(KeyEvent::from(KeyCode::Tab));
        drop(app.tx);

        // Drain the channel until the spawned fetches have reported back.
        let mut messages = Vec::new();
        while let Some(message) = app.rx.recv().await {
            messages.push(message);
        }
        assert!(
            messages
                .iter()
                .any(|m| matches!(m, Message::ReadmeFetched { .. }))
        );
        assert!(
            messages
                .iter()
                .any(|m| matches!(m, Message::IssuesFetched { .. }))
        );
        assert_eq!(*provider.readmes.lock().unwrap(), 1);
        assert_eq!(*provider.searches.lock().unwrap(), 1);
    }
}
