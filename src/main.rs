use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState};

use league_lens::config::AppConfig;
use league_lens::favorites::StoredFavorites;
use league_lens::formation::{self, FormationGrid};
use league_lens::kv_store::FileStore;
use league_lens::page::{parse_page_arg, Page};
use league_lens::provider::spawn_provider;
use league_lens::state::{self, apply_delta, AppState, PlayerStatRow, ProviderCommand, TeamLineup};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    favorites: StoredFavorites<FileStore>,
    search_debounce: Duration,
}

impl App {
    fn new(
        start_page: Page,
        store: FileStore,
        search_debounce: Duration,
        cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    ) -> Self {
        let favorites = StoredFavorites::new(store);
        let mut state = AppState::new(start_page);
        state.refresh_favorites(&favorites);
        let mut app = Self {
            state,
            should_quit: false,
            cmd_tx,
            favorites,
            search_debounce,
        };
        app.open_page(start_page);
        app
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.search.active {
            self.on_search_key(key);
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.open_page(Page::Leagues),
            KeyCode::Char('2') => self.open_page(Page::Standings),
            KeyCode::Char('3') => self.open_page(Page::TopScorers),
            KeyCode::Char('4') => self.open_page(Page::TopAssists),
            KeyCode::Char('5') => self.open_page(Page::Fixtures),
            KeyCode::Char('r') | KeyCode::Char('R') => self.open_page(self.state.page),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Enter => self.enter(),
            KeyCode::Char('b') | KeyCode::Esc => self.back(),
            KeyCode::Char('f') if self.state.page == Page::Leagues => self.toggle_favorite(),
            KeyCode::Char('v') if self.state.page == Page::Leagues => {
                self.state.toggle_favorites_only()
            }
            KeyCode::Char('/') if self.state.page == Page::Leagues => {
                self.state.search.active = true;
            }
            KeyCode::Char('[') => self.step_season(true),
            KeyCode::Char(']') => self.step_season(false),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        let now = Instant::now();
        match key.code {
            KeyCode::Esc => {
                self.state.search.clear();
                self.state.search.active = false;
            }
            KeyCode::Enter => {
                if let Err(err) = self
                    .state
                    .add_selected_search_result(&mut self.favorites)
                {
                    self.state.push_log(format!("[WARN] Favorites write failed: {err:#}"));
                }
            }
            KeyCode::Down => self.state.select_next(),
            KeyCode::Up => self.state.select_prev(),
            KeyCode::Backspace => self.state.search_pop(now),
            KeyCode::Char(c) => self.state.search_push(c, now),
            _ => {}
        }
    }

    fn open_page(&mut self, page: Page) {
        let cmd = self.state.open_page(page, self.favorites.store());
        if let Some(cmd) = cmd {
            self.send(cmd);
        }
    }

    fn enter(&mut self) {
        let result = match self.state.page {
            Page::Leagues => self.state.enter_selected_league(self.favorites.store_mut()),
            Page::Fixtures => self.state.enter_selected_fixture(self.favorites.store_mut()),
            _ => Ok(None),
        };
        match result {
            Ok(Some(cmd)) => self.send(cmd),
            Ok(None) => {}
            Err(err) => self.state.push_log(format!("[WARN] Navigation failed: {err:#}")),
        }
    }

    fn back(&mut self) {
        match self.state.page {
            Page::Leagues => {}
            Page::Lineup => self.open_page(Page::Fixtures),
            _ => self.open_page(Page::Leagues),
        }
    }

    fn toggle_favorite(&mut self) {
        if let Err(err) = self.state.toggle_selected_favorite(&mut self.favorites) {
            self.state.push_log(format!("[WARN] Favorites write failed: {err:#}"));
        }
    }

    fn step_season(&mut self, older: bool) {
        match self.state.step_season(older, self.favorites.store_mut()) {
            Ok(Some(cmd)) => self.send(cmd),
            Ok(None) => {}
            Err(err) => self.state.push_log(format!("[WARN] Season change failed: {err:#}")),
        }
    }

    fn maybe_send_search(&mut self) {
        if let Some(query) = self.state.search_due(Instant::now(), self.search_debounce) {
            self.send(ProviderCommand::SearchLeagues { query });
        }
    }

    fn send(&mut self, cmd: ProviderCommand) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Fetch unavailable");
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.loading = false;
            self.state.push_log("[WARN] Fetch request failed");
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = AppConfig::from_env();
    let page_name = parse_page_arg(std::env::args().skip(1)).or(config.start_page.clone());
    let start_page = match page_name.as_deref().map(str::parse::<Page>) {
        Some(Ok(page)) => page,
        Some(Err(err)) => {
            eprintln!("error: {err}");
            return Ok(());
        }
        None => Page::Leagues,
    };
    let store = FileStore::open_default(config.data_dir.as_deref())
        .unwrap_or_else(|| FileStore::open(PathBuf::from(".league_lens").join("storage.json")));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(config.api.clone(), tx, cmd_rx);

    let mut app = App::new(start_page, store, config.search_debounce, Some(cmd_tx));
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        app.maybe_send_search();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let state = &app.state;
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(header_line(state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match state.page {
        Page::Leagues => render_leagues(frame, chunks[1], state),
        Page::Standings => render_standings(frame, chunks[1], state),
        Page::TopScorers => render_player_stats(frame, chunks[1], state, &state.top_scorers),
        Page::TopAssists => render_player_stats(frame, chunks[1], state, &state.top_assists),
        Page::Fixtures => render_fixtures(frame, chunks[1], state),
        Page::Lineup => render_lineups(frame, chunks[1], state),
    }

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if state.help_overlay {
        render_help_overlay(frame, area);
    }
}

fn header_line(state: &AppState) -> String {
    let mut line = format!(" LEAGUE LENS | {}", state.header_text());
    if state.page.uses_season() {
        line.push_str(&format!(" | [{}]", state.season.selected_label()));
    }
    if state.loading {
        line.push_str(" | loading...");
    }
    line
}

fn footer_text(state: &AppState) -> String {
    if state.search.active {
        return "type to search (3+ chars) | ↑/↓ Move | Enter Add to favorites | Esc Close".to_string();
    }
    match state.page {
        Page::Leagues => {
            "1-5 Pages | j/k Move | Enter Open | f Favorite | v Favorites only | / Search | r Reload | ? Help | q Quit".to_string()
        }
        Page::Fixtures => {
            "1-5 Pages | j/k Move | Enter Lineup | [/] Season | b Back | r Reload | ? Help | q Quit".to_string()
        }
        Page::Lineup => "j/k Scroll | b Back to fixtures | r Reload | ? Help | q Quit".to_string(),
        _ => "1-5 Pages | j/k Move | [/] Season | b Back | r Reload | ? Help | q Quit".to_string(),
    }
}

fn selected_style() -> Style {
    Style::default().fg(Color::White).bg(Color::DarkGray)
}

fn header_style() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn render_empty(frame: &mut Frame, area: Rect, text: &str) {
    let empty = Paragraph::new(text.to_string()).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(empty, area);
}

fn render_leagues(frame: &mut Frame, area: Rect, state: &AppState) {
    let (list_area, search_area) = if state.search.active || !state.search.results.is_empty() {
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(8)])
            .split(area);
        (parts[0], Some(parts[1]))
    } else {
        (area, None)
    };

    let rows = state.league_rows();
    if rows.is_empty() {
        let msg = if state.favorites_only {
            "No favorite leagues yet (f to add, / to search)"
        } else {
            "No leagues loaded"
        };
        render_empty(frame, list_area, msg);
    } else {
        let table_rows = rows.iter().map(|r| {
            let mark = if r.is_favorite { "[x]" } else { "[ ]" };
            Row::new(vec![
                Cell::from(mark),
                Cell::from(r.league.name.clone()),
                Cell::from(r.league.country.clone()),
                Cell::from(r.league.league_type.clone()),
                Cell::from(r.league.league_id.to_string()),
            ])
        });
        let table = Table::new(
            table_rows,
            [
                Constraint::Length(4),
                Constraint::Min(20),
                Constraint::Length(20),
                Constraint::Length(8),
                Constraint::Length(6),
            ],
        )
        .header(Row::new(vec!["Fav", "League", "Country", "Type", "Id"]).style(header_style()))
        .highlight_style(if state.search.active { Style::default() } else { selected_style() });
        let mut table_state = TableState::default().with_selected(Some(state.selected));
        frame.render_stateful_widget(table, list_area, &mut table_state);
    }

    if let Some(search_area) = search_area {
        render_search(frame, search_area, state);
    }
}

fn render_search(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = format!("Search: {}_", state.search.input);
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.search.results.is_empty() {
        render_empty(frame, inner, "No results");
        return;
    }
    let rows = state
        .search
        .results
        .iter()
        .map(|l| Row::new(vec![format!("{} ({})", l.name, l.country)]));
    let table = Table::new(rows, [Constraint::Percentage(100)]).highlight_style(selected_style());
    let mut table_state = TableState::default().with_selected(Some(state.search.selected));
    frame.render_stateful_widget(table, inner, &mut table_state);
}

fn render_standings(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.standings.is_empty() {
        render_empty(frame, area, "No standings for this season");
        return;
    }
    let rows = state.standings.iter().map(|s| {
        Row::new(vec![
            s.rank.to_string(),
            s.team.clone(),
            s.played.to_string(),
            s.win.to_string(),
            s.draw.to_string(),
            s.lose.to_string(),
            s.points.to_string(),
            format!("{}:{}", s.goals_for, s.goals_against),
            format!("{:+}", s.goal_diff),
            s.form.clone(),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(18),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(7),
            Constraint::Length(5),
            Constraint::Length(6),
        ],
    )
    .header(
        Row::new(vec!["#", "Team", "P", "W", "D", "L", "Pts", "Goals", "+/-", "Form"])
            .style(header_style()),
    )
    .highlight_style(selected_style());
    let mut table_state = TableState::default().with_selected(Some(state.selected));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn render_player_stats(frame: &mut Frame, area: Rect, state: &AppState, rows: &[PlayerStatRow]) {
    if rows.is_empty() {
        render_empty(frame, area, "No player statistics for this season");
        return;
    }
    let table_rows = rows.iter().map(|p| {
        Row::new(vec![
            p.rank.to_string(),
            p.name.clone(),
            p.team.clone(),
            p.goals.to_string(),
            p.assists.to_string(),
            p.points.to_string(),
        ])
    });
    let table = Table::new(
        table_rows,
        [
            Constraint::Length(4),
            Constraint::Min(22),
            Constraint::Length(22),
            Constraint::Length(6),
            Constraint::Length(8),
            Constraint::Length(7),
        ],
    )
    .header(Row::new(vec!["#", "Player", "Team", "Goals", "Assists", "Points"]).style(header_style()))
    .highlight_style(selected_style());
    let mut table_state = TableState::default().with_selected(Some(state.selected));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn render_fixtures(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.fixtures.is_empty() {
        render_empty(frame, area, "No fixtures for this season");
        return;
    }

    // Round headings are extra table rows, so the highlighted row index is
    // the fixture index plus the headings above it.
    let mut rows = Vec::new();
    let mut highlight = None;
    let mut fixture_idx = 0usize;
    for group in &state.fixtures {
        rows.push(
            Row::new(vec![Cell::from(group.round.clone())])
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        );
        for f in &group.fixtures {
            if fixture_idx == state.selected {
                highlight = Some(rows.len());
            }
            rows.push(Row::new(vec![
                f.kickoff.clone(),
                f.home.clone(),
                score_text(f.home_goals),
                score_text(f.away_goals),
                f.away.clone(),
            ]));
            fixture_idx += 1;
        }
    }

    let table = Table::new(
        rows,
        [
            Constraint::Length(20),
            Constraint::Min(16),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(16),
        ],
    )
    .header(Row::new(vec!["Kickoff (UTC)", "Home", "", "", "Away"]).style(header_style()))
    .highlight_style(selected_style());
    let mut table_state = TableState::default().with_selected(highlight);
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn score_text(goals: Option<u32>) -> String {
    goals.map(|g| g.to_string()).unwrap_or_else(|| "-".to_string())
}

fn render_lineups(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.lineups.is_empty() {
        render_empty(frame, area, "No lineups yet");
        return;
    }

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    for (i, col) in cols.iter().enumerate() {
        let Some(team) = state.lineups.get(i) else {
            render_empty(frame, *col, "No lineup");
            continue;
        };
        render_lineup_side(frame, *col, team, state.scroll);
    }
}

fn render_lineup_side(frame: &mut Frame, area: Rect, team: &TeamLineup, scroll: u16) {
    let title = if team.formation.is_empty() {
        team.team_name.clone()
    } else {
        format!("{} - Formation: {}", team.team_name, team.formation)
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    if !team.coach.is_empty() {
        lines.push(Line::from(format!("Coach: {}", team.coach)));
    }
    lines.push(Line::from(""));
    match formation::build(Some(team.formation.as_str()), &team.start_xi) {
        Ok(grid) => lines.extend(grid_lines(&grid).into_iter().map(Line::from)),
        Err(err) => lines.push(Line::from(format!("Formation unavailable: {err}"))),
    }
    lines.push(Line::from(""));
    lines.push(Line::from("Starting XI").style(header_style()));
    lines.extend(formation::roster_lines(&team.start_xi).into_iter().map(Line::from));
    lines.push(Line::from(""));
    lines.push(Line::from("Substitutes").style(header_style()));
    lines.extend(formation::roster_lines(&team.substitutes).into_iter().map(Line::from));

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .scroll((scroll, 0));
    frame.render_widget(paragraph, inner);
}

/// One text line per band with a blank line between bands.
fn grid_lines(grid: &FormationGrid) -> Vec<String> {
    let mut out = Vec::new();
    for row in &grid.rows {
        let cells: Vec<String> = row
            .slots
            .iter()
            .map(|slot| match slot {
                Some(s) => format!(
                    "({:>2})",
                    s.number.map(|n| n.to_string()).unwrap_or_else(|| "?".to_string())
                ),
                None => "    ".to_string(),
            })
            .collect();
        out.push(cells.join("  "));
        out.push(String::new());
    }
    out.pop();
    out
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "League Lens - Help",
        "",
        "Pages:",
        "  1            Leagues",
        "  2            Standings",
        "  3            Top scorers",
        "  4            Top assists",
        "  5            Fixtures",
        "  b / Esc      Back",
        "  r            Reload page",
        "  [ / ]        Older / newer season",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Leagues:",
        "  Enter        Open standings",
        "  f            Toggle favorite",
        "  v            Favorites only",
        "  /            Search (Enter adds result to favorites)",
        "",
        "Fixtures:",
        "  Enter        Lineups",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
