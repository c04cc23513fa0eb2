use std::io;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use crossterm::event;
use crossterm::event::Event;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::execute;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use devcon_core::logging::DiagnosticMessage;
use devcon_core::logging::LogBuffer;
use devcon_core::logging::Severity;
use devcon_core::CommandRegistry;
use ratatui::backend::Backend;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Constraint;
use ratatui::layout::Direction;
use ratatui::layout::Layout;
use ratatui::layout::Position;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::List;
use ratatui::widgets::ListItem;
use ratatui::widgets::Paragraph;
use ratatui::Terminal;
use tracing::error;

const PROMPT: &str = "> ";

struct TuiGuard;

impl Drop for TuiGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
    }
}

pub fn run(
    registry: &CommandRegistry,
    feed: Receiver<DiagnosticMessage>,
    status: String,
    scrollback: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _guard = TuiGuard; // Restores the terminal on exit or panic

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut state = ConsoleState::new(status, scrollback);

    run_app(&mut terminal, &mut state, registry, &feed).map_err(|e| e.into())
}

struct ConsoleState {
    input: String,
    log: LogBuffer,
    status: String,
    should_quit: bool,
}

impl ConsoleState {
    fn new(status: String, scrollback: usize) -> Self {
        Self {
            input: String::new(),
            log: LogBuffer::new(scrollback),
            status,
            should_quit: false,
        }
    }

    fn drain(&mut self, feed: &Receiver<DiagnosticMessage>) {
        while let Ok(message) = feed.try_recv() {
            self.log.append(message);
        }
    }
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &mut ConsoleState,
    registry: &CommandRegistry,
    feed: &Receiver<DiagnosticMessage>,
) -> io::Result<()> {
    loop {
        state.drain(feed);
        terminal.draw(|f| ui(f, state))?;

        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(key, state, registry);
                }
            }
        }

        if state.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(key: KeyEvent, state: &mut ConsoleState, registry: &CommandRegistry) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Esc => state.should_quit = true,
        KeyCode::Enter => {
            let line = std::mem::take(&mut state.input);
            submit(registry, &line);
        }
        KeyCode::Backspace => {
            state.input.pop();
        }
        KeyCode::Char(c) => state.input.push(c),
        _ => {}
    }
}

/// A failing command shows up as an error line; the console keeps running.
fn submit(registry: &CommandRegistry, line: &str) {
    if let Err(err) = registry.dispatch_line(line) {
        error!("{line}: {err}");
    }
}

fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Error => Style::default().fg(Color::Red),
        Severity::Warning => Style::default().fg(Color::Yellow),
        Severity::Log => Style::default(),
        Severity::Debug | Severity::Trace => Style::default().fg(Color::DarkGray),
    }
}

fn ui(f: &mut ratatui::Frame, state: &ConsoleState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Log
            Constraint::Length(3), // Input
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    let items: Vec<ListItem> = state
        .log
        .newest_first()
        .map(|message| {
            ListItem::new(Line::from(Span::styled(
                message.console_line(),
                severity_style(message.severity),
            )))
        })
        .collect();
    let log = List::new(items).block(Block::default().borders(Borders::ALL).title("Console"));
    f.render_widget(log, chunks[0]);

    let input = Paragraph::new(format!("{PROMPT}{}", state.input))
        .block(Block::default().borders(Borders::ALL).title("Command"));
    f.render_widget(input, chunks[1]);
    let cursor_x = chunks[1].x + 1 + (PROMPT.len() + state.input.chars().count()) as u16;
    f.set_cursor_position(Position::new(
        cursor_x.min(chunks[1].right().saturating_sub(2)),
        chunks[1].y + 1,
    ));

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(
            state.status.as_str(),
            Style::default().add_modifier(Modifier::DIM),
        ),
        Span::raw("  Enter: run  Esc: quit"),
    ]));
    f.render_widget(footer, chunks[2]);
}
