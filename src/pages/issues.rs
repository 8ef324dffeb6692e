//! The issues page: searchable, paginated issue list with a detail viewer.
//!
//! State machine: gaining focus enters `Loading` and issues a fetch; the
//! fetch result moves the page to `Ready` and focuses the list. A failed
//! fetch still reaches `Ready`, with an empty list and a visible error.
//! Every fetch carries a sequence number so a slow response can never
//! overwrite the result of a newer request.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use crate::Theme;
use crate::command::{self, Command};
use crate::github::{Issue, IssueBatch, IssueSearcher, RepoId};
use crate::message::Message;
use crate::pages::PageState;
use crate::ui::input::SearchInput;
use crate::ui::list::IssueList;
use crate::ui::spinner::Spinner;
use crate::ui::viewer::DocViewer;
use crate::ui::{Component, ComponentGroup, ComponentId};

pub struct IssuesPage {
    repo: RepoId,
    searcher: Arc<dyn IssueSearcher>,
    per_page: u8,

    width: u16,
    height: u16,

    state: PageState,
    /// Result page currently shown, 1-based to match the provider.
    current_page: u32,
    last_page: u32,
    selected: Option<Issue>,
    search: String,
    error: Option<String>,
    /// Sequence number of the newest fetch; completions carrying an older
    /// number are discarded.
    fetch_seq: u64,

    components: ComponentGroup,
    spinner_id: ComponentId,
    list_id: ComponentId,
    viewer_id: ComponentId,
    input_id: ComponentId,
}

impl IssuesPage {
    pub fn new(
        repo: RepoId,
        searcher: Arc<dyn IssueSearcher>,
        per_page: u8,
        width: u16,
        height: u16,
        theme: Theme,
    ) -> Self {
        let mut components = ComponentGroup::new();
        let spinner_id = components.insert(Box::new(Spinner::new("Fetching issues")));
        let list_id = components.insert(Box::new(IssueList::new(width, height)));
        let viewer_id = components.insert(Box::new(DocViewer::new(width / 2, height, theme)));
        let input_id = components.insert(Box::new(SearchInput::new("Search", width)));

        Self {
            repo,
            searcher,
            per_page,
            width,
            height,
            state: PageState::Loading,
            current_page: 1,
            last_page: 1,
            selected: None,
            search: String::new(),
            error: None,
            fetch_seq: 0,
            components,
            spinner_id,
            list_id,
            viewer_id,
            input_id,
        }
    }

    /// Whether one row is reserved for the search input.
    fn search_row_visible(&self) -> bool {
        self.components.is_focused(self.input_id) || !self.search.is_empty()
    }

    fn list_height(&self) -> u16 {
        if self.search_row_visible() {
            self.height.saturating_sub(1)
        } else {
            self.height
        }
    }

    fn list_width(&self) -> u16 {
        if self.selected.is_some() {
            self.width / 2
        } else {
            self.width
        }
    }

    fn viewer_width(&self) -> u16 {
        self.width - self.width / 2
    }

    /// Push the current geometry into every child.
    fn apply_geometry(&mut self) -> Option<Command> {
        let sizes = [
            (
                self.list_id,
                Message::SetSize {
                    width: Some(self.list_width()),
                    height: Some(self.list_height()),
                },
            ),
            (
                self.viewer_id,
                Message::SetSize {
                    width: Some(self.viewer_width()),
                    height: Some(self.list_height()),
                },
            ),
            (
                self.input_id,
                Message::SetSize {
                    width: Some(self.width),
                    height: None,
                },
            ),
        ];
        let commands: Vec<_> = sizes
            .into_iter()
            .map(|(id, msg)| self.components.dispatch_to_id(id, &msg))
            .collect();
        command::batch(commands)
    }

    /// Start a fetch for the current `(search, current_page)`. The sequence
    /// guarantees the Loading message lands before the request starts.
    fn fetch(&mut self) -> Command {
        self.fetch_seq += 1;
        let seq = self.fetch_seq;
        let searcher = Arc::clone(&self.searcher);
        let repo = self.repo.clone();
        let term = self.search.clone();
        let page = self.current_page;
        let per_page = self.per_page;

        Command::Sequence(vec![
            Command::Emit(Message::IssuesLoading),
            Command::perform(async move {
                let result = searcher
                    .search(&repo, &term, page, per_page)
                    .await
                    .map_err(|e| e.to_string());
                Message::IssuesFetched { seq, result }
            }),
        ])
    }

    /// Jump to another result page. Out-of-range targets and no-movement
    /// cases trigger neither a fetch nor a state change.
    fn go_to_page(&mut self, page: u32) -> Option<Command> {
        if page < 1 || page > self.last_page || page == self.current_page {
            return None;
        }
        self.current_page = page;
        let reset = self
            .components
            .dispatch_to_id(self.list_id, &Message::ResetViewport);
        command::batch([reset, Some(self.fetch())])
    }

    fn handle_escape(&mut self) -> Option<Command> {
        if self.selected.is_some() {
            // Close the detail view: full list width, focus back on the list.
            self.selected = None;
            return command::batch([self.apply_geometry(), self.components.focus_on(self.list_id)]);
        }
        if self.components.is_focused(self.input_id) {
            let had_term = !self.search.is_empty();
            self.search.clear();
            let clear = self
                .components
                .dispatch_to_id(self.input_id, &Message::ClearInput);
            let focus = self.components.focus_on(self.list_id);
            let geometry = self.apply_geometry();
            if had_term {
                self.current_page = 1;
                let reset = self
                    .components
                    .dispatch_to_id(self.list_id, &Message::ResetViewport);
                return command::batch([clear, focus, geometry, reset, Some(self.fetch())]);
            }
            return command::batch([clear, focus, geometry]);
        }
        None
    }

    fn open_search(&mut self) -> Option<Command> {
        if self.state != PageState::Ready || self.components.is_focused(self.input_id) {
            return None;
        }
        let focus = self.components.focus_on(self.input_id);
        command::batch([focus, self.apply_geometry()])
    }

    fn handle_submit(&mut self, value: &str) -> Option<Command> {
        let focus = self.components.focus_on(self.list_id);
        if value == self.search {
            return command::batch([focus, self.apply_geometry()]);
        }
        self.search = value.to_string();
        self.current_page = 1;
        let geometry = self.apply_geometry();
        let reset = self
            .components
            .dispatch_to_id(self.list_id, &Message::ResetViewport);
        command::batch([focus, geometry, reset, Some(self.fetch())])
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        // Pagination and search only make sense in Ready with the list in
        // its browsing configuration.
        let browsing = self.state == PageState::Ready
            && self.selected.is_none()
            && !self.components.is_focused(self.input_id);

        match key.code {
            KeyCode::Esc => self.handle_escape(),
            KeyCode::Char(']') if browsing => self.go_to_page(self.current_page + 1),
            KeyCode::Char('[') if browsing => self.go_to_page(self.current_page.saturating_sub(1)),
            KeyCode::Char('}') if browsing => self.go_to_page(self.last_page),
            KeyCode::Char('{') if browsing => self.go_to_page(1),
            KeyCode::Char('/')
                if self.selected.is_none() && !self.components.is_focused(self.input_id) =>
            {
                self.open_search()
            }
            _ => {
                if self.state == PageState::Loading {
                    return None;
                }
                self.components.dispatch_to_focused(&Message::Key(key))
            }
        }
    }

    fn handle_fetched(&mut self, seq: u64, result: &Result<IssueBatch, String>) -> Option<Command> {
        if seq != self.fetch_seq {
            tracing::debug!(seq, newest = self.fetch_seq, "discarding stale issue fetch");
            return None;
        }
        self.state = PageState::Ready;
        let items = match result {
            Ok(batch) => {
                self.error = None;
                self.last_page = batch.last_page;
                batch.issues.clone()
            }
            Err(error) => {
                // Failure still reaches Ready so the UI never spins forever.
                tracing::warn!(%error, "issue fetch failed");
                self.error = Some(error.clone());
                Vec::new()
            }
        };
        let set = self
            .components
            .dispatch_to_id(self.list_id, &Message::SetItems(items));
        command::batch([set, self.components.focus_on(self.list_id)])
    }

    fn handle_selected(&mut self, issue: &Issue) -> Option<Command> {
        self.selected = Some(issue.clone());
        let geometry = self.apply_geometry();
        let content = self
            .components
            .dispatch_to_id(self.viewer_id, &Message::SetContent(issue_document(issue)));
        command::batch([geometry, content, self.components.focus_on(self.viewer_id)])
    }
}

/// Markdown document shown in the viewer for a selected issue.
fn issue_document(issue: &Issue) -> String {
    format!(
        "# {}\n\n`#{}` opened by **{}** on {}\n\n---\n\n{}",
        issue.title,
        issue.number,
        issue.author,
        issue.created_at.format("%Y-%m-%d"),
        issue.body
    )
}

impl Component for IssuesPage {
    fn update(&mut self, msg: &Message) -> Option<Command> {
        match msg {
            Message::Key(key) => self.handle_key(*key),
            Message::Focus(_) => Some(self.fetch()),
            Message::Blur(_) => None,
            Message::Resize { width, height } => {
                self.width = *width;
                self.height = *height;
                self.apply_geometry()
            }
            Message::Tick => self.components.dispatch_to_all(&Message::Tick),
            Message::IssuesLoading => {
                self.state = PageState::Loading;
                self.components.focus_on(self.spinner_id)
            }
            Message::IssuesFetched { seq, result } => self.handle_fetched(*seq, result),
            Message::ItemSelected(issue) => {
                let issue = issue.clone();
                self.handle_selected(&issue)
            }
            Message::Submit(value) => {
                let value = value.clone();
                self.handle_submit(&value)
            }
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
                    format!("issue fetch failed: {error}"),
                    Style::default().fg(theme.red),
                )),
                notice,
            );
            body.y = body.y.saturating_add(1);
            body.height = body.height.saturating_sub(1);
        }

        if self.search_row_visible() && body.height > 0 {
            let input_area = Rect {
                y: body.y + body.height - 1,
                height: 1,
                ..body
            };
            self.components.render_id(self.input_id, frame, input_area, theme);
            body.height -= 1;
        }

        let list_area = Rect {
            width: self.list_width().min(body.width),
            ..body
        };
        self.components.render_id(self.list_id, frame, list_area, theme);

        if self.selected.is_some() && body.width > list_area.width {
            let viewer_area = Rect {
                x: body.x + list_area.width,
                width: body.width - list_area.width,
                ..body
            };
            self.components.render_id(self.viewer_id, frame, viewer_area, theme);
        }

        if body.height > 0 && self.state == PageState::Ready && self.error.is_none() {
            // Pagination indicator in the bottom-right of the list area.
            let label = format!("page {}/{}", self.current_page, self.last_page);
            let w = u16::try_from(label.len()).unwrap_or(u16::MAX);
            if list_area.width > w {
                let corner = Rect {
                    x: list_area.x + list_area.width - w,
                    y: list_area.y + list_area.height.saturating_sub(1),
                    width: w,
                    height: 1,
                };
                frame.render_widget(
                    Paragraph::new(Line::styled(label, Style::default().fg(theme.subtext0))),
                    corner,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use color_eyre::eyre::eyre;

    use super::*;
    use crate::github::IssueBatch;

    struct FakeSearcher {
        calls: Mutex<Vec<(String, u32)>>,
        batch: Result<IssueBatch, String>,
    }

    impl FakeSearcher {
        fn returning(batch: IssueBatch) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                batch: Ok(batch),
            })
        }

        fn failing(error: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                batch: Err(error.to_string()),
            })
        }

        fn calls(&self) -> Vec<(String, u32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl IssueSearcher for FakeSearcher {
        async fn search(
            &self,
            _repo: &RepoId,
            term: &str,
            page: u32,
            _per_page: u8,
        ) -> color_eyre::Result<IssueBatch> {
            self.calls.lock().unwrap().push((term.to_string(), page));
            self.batch.clone().map_err(|e| eyre!(e))
        }
    }

    fn issue(number: u64) -> Issue {
        Issue {
            number,
            title: format!("issue {number}"),
            body: format!("body {number}"),
            author: "octocat".to_string(),
            created_at: Utc::now(),
        }
    }

    fn batch(n: u64, last_page: u32) -> IssueBatch {
        IssueBatch {
            issues: (1..=n).map(issue).collect(),
            last_page,
        }
    }

    fn page_with(searcher: Arc<FakeSearcher>) -> IssuesPage {
        let repo: RepoId = "octocat/spoon-knife".parse().expect("valid repo");
        IssuesPage::new(repo, searcher, 50, 40, 10, Theme::mocha())
    }

    fn key(code: KeyCode) -> Message {
        Message::Key(KeyEvent::from(code))
    }

    /// Run a message and every message its commands produce, to quiescence.
    async fn pump(page: &mut IssuesPage, msg: Message) {
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            if let Some(cmd) = page.update(&msg) {
                queue.extend(command::drain(cmd).await);
            }
        }
    }

    async fn ready_page(searcher: Arc<FakeSearcher>) -> IssuesPage {
        let mut page = page_with(searcher);
        pump(&mut page, Message::Focus(ComponentId::new(0))).await;
        assert_eq!(page.state, PageState::Ready);
        page
    }

    #[tokio::test]
    async fn focus_fetches_and_reaches_ready() {
        let searcher = FakeSearcher::returning(batch(3, 2));
        let page = ready_page(Arc::clone(&searcher)).await;
        assert_eq!(searcher.calls(), vec![(String::new(), 1)]);
        assert_eq!(page.last_page, 2);
        assert!(page.components.is_focused(page.list_id));
    }

    #[tokio::test]
    async fn next_page_on_the_last_page_does_nothing() {
        let searcher = FakeSearcher::returning(batch(3, 1));
        let mut page = ready_page(Arc::clone(&searcher)).await;

        pump(&mut page, key(KeyCode::Char(']'))).await;

        assert_eq!(page.current_page, 1);
        assert_eq!(page.state, PageState::Ready);
        assert_eq!(searcher.calls().len(), 1, "no second fetch");
    }

    #[tokio::test]
    async fn pagination_resets_the_viewport_and_carries_the_term() {
        let searcher = FakeSearcher::returning(batch(3, 3));
        let mut page = ready_page(Arc::clone(&searcher)).await;

        pump(&mut page, key(KeyCode::Char(']'))).await;
        assert_eq!(page.current_page, 2);
        pump(&mut page, key(KeyCode::Char('}'))).await;
        assert_eq!(page.current_page, 3);
        pump(&mut page, key(KeyCode::Char('['))).await;
        assert_eq!(page.current_page, 2);
        pump(&mut page, key(KeyCode::Char('{'))).await;
        assert_eq!(page.current_page, 1);

        let pages: Vec<u32> = searcher.calls().iter().map(|(_, p)| *p).collect();
        assert_eq!(pages, vec![1, 2, 3, 2, 1]);
    }

    #[tokio::test]
    async fn submitting_a_changed_term_fetches_once_with_it() {
        let searcher = FakeSearcher::returning(batch(3, 1));
        let mut page = ready_page(Arc::clone(&searcher)).await;

        pump(&mut page, key(KeyCode::Char('/'))).await;
        assert!(page.components.is_focused(page.input_id));
        for c in "bug".chars() {
            pump(&mut page, key(KeyCode::Char(c))).await;
        }

        // Apply the submit without running its fetch command yet: focus must
        // already be back on the list.
        let enter = page
            .update(&Message::Key(KeyEvent::from(KeyCode::Enter)))
            .expect("enter submits the input");
        let mut fetch = None;
        for msg in command::drain(enter).await {
            assert!(matches!(msg, Message::Submit(_)));
            fetch = page.update(&msg);
        }
        let fetch = fetch.expect("submit issues a fetch");
        assert!(page.components.is_focused(page.list_id));
        assert_eq!(searcher.calls().len(), 1, "fetch not yet started");

        for msg in command::drain(fetch).await {
            pump(&mut page, msg).await;
        }
        assert_eq!(searcher.calls().last(), Some(&("bug".to_string(), 1)));
        assert_eq!(searcher.calls().len(), 2);
    }

    #[tokio::test]
    async fn resubmitting_the_same_term_does_not_refetch() {
        let searcher = FakeSearcher::returning(batch(3, 1));
        let mut page = ready_page(Arc::clone(&searcher)).await;

        pump(&mut page, key(KeyCode::Char('/'))).await;
        pump(&mut page, key(KeyCode::Enter)).await;

        assert!(page.components.is_focused(page.list_id));
        assert_eq!(searcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn selecting_an_item_opens_the_viewer_and_escape_closes_it() {
        let searcher = FakeSearcher::returning(batch(5, 1));
        let mut page = ready_page(searcher).await;

        pump(&mut page, key(KeyCode::Char('j'))).await;
        pump(&mut page, key(KeyCode::Enter)).await;

        assert_eq!(page.selected.as_ref().map(|i| i.number), Some(2));
        assert!(page.components.is_focused(page.viewer_id));
        assert_eq!(page.list_width(), page.width / 2);

        pump(&mut page, key(KeyCode::Esc)).await;

        assert!(page.selected.is_none());
        assert!(page.components.is_focused(page.list_id));
        assert_eq!(page.list_width(), page.width);
    }

    #[tokio::test]
    async fn fetch_failure_still_reaches_ready_with_no_items() {
        let searcher = FakeSearcher::failing("rate limited");
        let mut page = page_with(searcher);

        pump(&mut page, Message::Focus(ComponentId::new(0))).await;

        assert_eq!(page.state, PageState::Ready);
        assert!(page.error.as_deref().is_some_and(|e| e.contains("rate limited")));
        assert!(page.components.is_focused(page.list_id));
    }

    #[tokio::test]
    async fn stale_fetch_results_are_discarded() {
        let searcher = FakeSearcher::returning(batch(3, 1));
        let mut page = page_with(Arc::clone(&searcher));

        let first = page
            .update(&Message::Focus(ComponentId::new(0)))
            .expect("first fetch");
        let second = page
            .update(&Message::Focus(ComponentId::new(0)))
            .expect("second fetch");

        // The superseded fetch completes but must not move the page.
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
    async fn escape_from_the_input_with_an_active_term_refetches_empty() {
        let searcher = FakeSearcher::returning(batch(3, 1));
        let mut page = ready_page(Arc::clone(&searcher)).await;

        pump(&mut page, key(KeyCode::Char('/'))).await;
        for c in "bug".chars() {
            pump(&mut page, key(KeyCode::Char(c))).await;
        }
        pump(&mut page, key(KeyCode::Enter)).await;
        assert_eq!(searcher.calls().len(), 2);

        pump(&mut page, key(KeyCode::Char('/'))).await;
        pump(&mut page, key(KeyCode::Esc)).await;

        assert!(page.search.is_empty());
        assert!(page.components.is_focused(page.list_id));
        assert_eq!(searcher.calls().last(), Some(&(String::new(), 1)));
        assert_eq!(searcher.calls().len(), 3);
    }

    #[tokio::test]
    async fn escape_from_the_input_without_a_term_is_local() {
        let searcher = FakeSearcher::returning(batch(3, 1));
        let mut page = ready_page(Arc::clone(&searcher)).await;

        pump(&mut page, key(KeyCode::Char('/'))).await;
        pump(&mut page, key(KeyCode::Esc)).await;

        assert!(page.components.is_focused(page.list_id));
        assert_eq!(searcher.calls().len(), 1, "no refetch without a prior term");
    }

    #[tokio::test]
    async fn escape_with_nothing_active_is_a_no_op() {
        let searcher = FakeSearcher::returning(batch(3, 1));
        let mut page = ready_page(Arc::clone(&searcher)).await;
        assert!(page.update(&key(KeyCode::Esc)).is_none());
    }

    #[tokio::test]
    async fn search_row_reserves_one_list_row() {
        let searcher = FakeSearcher::returning(batch(3, 1));
        let mut page = ready_page(searcher).await;
        assert_eq!(page.list_height(), page.height);

        pump(&mut page, key(KeyCode::Char('/'))).await;
        assert_eq!(page.list_height(), page.height - 1);

        pump(&mut page, key(KeyCode::Esc)).await;
        assert_eq!(page.list_height(), page.height);
    }

    #[tokio::test]
    async fn keys_are_swallowed_while_loading() {
        let searcher = FakeSearcher::returning(batch(3, 1));
        let mut page = page_with(searcher);
        page.update(&Message::IssuesLoading);
        assert_eq!(page.state, PageState::Loading);
        assert!(page.update(&key(KeyCode::Char('j'))).is_none());
        assert!(page.update(&key(KeyCode::Char(']'))).is_none());
    }

    #[test]
    fn issue_document_carries_the_metadata() {
        let doc = issue_document(&issue(7));
        assert!(doc.contains("# issue 7"));
        assert!(doc.contains("`#7`"));
        assert!(doc.contains("**octocat**"));
        assert!(doc.contains("body 7"));
    }
}
