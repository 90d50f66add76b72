//! Dashboard state and key handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;

use super::event::{Event, EventHandler};
use super::ui::Terminal;
use super::views;
use super::ViewMode;
use crate::domain::{
    resolve, with_enabled, ComputedFeature, DependencyGraph, FeatureFilter, History, Snapshot,
    StatusSummary,
};
use crate::storage::Project;

/// Input mode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Search(String),
}

/// Application state
pub struct App {
    project: Project,

    /// Snapshot log; the cursor snapshot is what the dashboard shows
    history: History,

    /// Resolution of the current snapshot, recomputed after every change
    computed: Vec<ComputedFeature>,

    graph: DependencyGraph,

    /// Indices into `computed` that pass the search filter
    visible: Vec<usize>,

    /// Applied search text
    filter: String,

    /// Selected row in `visible`
    selected: usize,

    view_mode: ViewMode,
    input_mode: InputMode,
    status_message: Option<String>,
    should_quit: bool,
}

impl App {
    /// Opens the dashboard on the current project
    pub fn new() -> Result<Self> {
        Self::open(Project::open_current()?)
    }

    /// Opens the dashboard on a given project
    pub fn open(project: Project) -> Result<Self> {
        let history = project.load_history()?;

        let mut app = Self {
            project,
            history,
            computed: Vec::new(),
            graph: DependencyGraph::new(),
            visible: Vec::new(),
            filter: String::new(),
            selected: 0,
            view_mode: ViewMode::default(),
            input_mode: InputMode::Normal,
            status_message: None,
            should_quit: false,
        };
        app.refresh();

        Ok(app)
    }

    /// Run the main application loop
    pub fn run(&mut self, terminal: &mut Terminal, events: EventHandler) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;

            match events.next()? {
                Event::Key(key) => self.handle_key(key)?,
                Event::Tick => {}
            }
        }

        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        match self.view_mode {
            ViewMode::Cards => views::cards::draw(frame, self),
            ViewMode::Graph => views::graph::draw(frame, self),
        }
    }

    /// Handle key events
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }

        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Search(_) => {
                self.handle_search_key(key);
                Ok(())
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,

            KeyCode::Char('j') | KeyCode::Down => self.move_selection_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection_up(),

            KeyCode::Char('1') => self.view_mode = ViewMode::Cards,
            KeyCode::Char('2') => self.view_mode = ViewMode::Graph,

            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_selected()?,
            KeyCode::Char('u') => self.undo()?,
            KeyCode::Char('r') => self.redo()?,

            KeyCode::Char('/') => self.input_mode = InputMode::Search(self.filter.clone()),
            KeyCode::Esc => {
                if !self.filter.is_empty() {
                    self.set_filter(String::new());
                }
            }

            KeyCode::Char('?') => {
                self.status_message = Some(
                    "j/k:move space:toggle u:undo r:redo /:search 1:cards 2:graph q:quit"
                        .to_string(),
                );
            }

            _ => {}
        }

        Ok(())
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let InputMode::Search(query) = &self.input_mode else {
            return;
        };
        let mut query = query.clone();

        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.set_filter(String::new());
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                query.pop();
                self.set_filter(query.clone());
                self.input_mode = InputMode::Search(query);
            }
            KeyCode::Char(c) => {
                query.push(c);
                self.set_filter(query.clone());
                self.input_mode = InputMode::Search(query);
            }
            _ => {}
        }
    }

    fn move_selection_down(&mut self) {
        if !self.visible.is_empty() {
            self.selected = (self.selected + 1) % self.visible.len();
        }
    }

    fn move_selection_up(&mut self) {
        if !self.visible.is_empty() {
            self.selected = if self.selected == 0 {
                self.visible.len() - 1
            } else {
                self.selected - 1
            };
        }
    }

    fn toggle_selected(&mut self) -> Result<()> {
        let Some(feature) = self.selected_feature() else {
            return Ok(());
        };
        let id = feature.id.to_string();
        let target = !feature.enabled;

        let Some(features) = with_enabled(self.history.current_features(), &id, target) else {
            return Ok(());
        };

        let verb = if target { "enable" } else { "disable" };
        if self.history.push(Snapshot::new(format!("{} {}", verb, id), features))? {
            self.project.save_history(&self.history)?;
        }
        self.refresh();

        let status = self
            .computed
            .iter()
            .find(|c| c.id == id.as_str())
            .map(|c| c.status);
        self.status_message = Some(match status {
            Some(status) => format!("{}d {} ({})", verb, id, status),
            None => format!("{}d {}", verb, id),
        });

        Ok(())
    }

    fn undo(&mut self) -> Result<()> {
        match self.history.undo() {
            Ok(snapshot) => {
                self.status_message = Some(format!("Undid: {}", snapshot.action));
                self.project.save_history(&self.history)?;
                self.refresh();
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
        Ok(())
    }

    fn redo(&mut self) -> Result<()> {
        match self.history.redo() {
            Ok(snapshot) => {
                self.status_message = Some(format!("Redid: {}", snapshot.action));
                self.project.save_history(&self.history)?;
                self.refresh();
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
        Ok(())
    }

    fn set_filter(&mut self, filter: String) {
        self.filter = filter;
        self.selected = 0;
        self.update_visible();
    }

    /// Re-resolves the current snapshot
    fn refresh(&mut self) {
        let features = self.history.current_features();
        self.computed = resolve(features);
        self.graph = DependencyGraph::from_features(features);
        self.update_visible();
    }

    fn update_visible(&mut self) {
        let filter = FeatureFilter::new(Some(&self.filter), None);
        self.visible = self
            .computed
            .iter()
            .enumerate()
            .filter(|(_, c)| filter.matches(c))
            .map(|(i, _)| i)
            .collect();

        if self.selected >= self.visible.len() {
            self.selected = self.visible.len().saturating_sub(1);
        }
    }

    // Accessors for views

    pub fn computed(&self) -> &[ComputedFeature] {
        &self.computed
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn summary(&self) -> StatusSummary {
        StatusSummary::from_computed(&self.computed)
    }

    pub fn visible_features(&self) -> impl Iterator<Item = &ComputedFeature> {
        self.visible.iter().map(|&i| &self.computed[i])
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_feature(&self) -> Option<&ComputedFeature> {
        self.visible.get(self.selected).map(|&i| &self.computed[i])
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn input_mode(&self) -> &InputMode {
        &self.input_mode
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}
