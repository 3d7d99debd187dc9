mod app;

use std::io;
use std::time::Duration;

use app::{format_age, is_stale, now_ns, truncate, AppState, ConnectionStatus, FeedStatus};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> io::Result<()> {
    let base_url = std::env::var("API_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .map_err(io::Error::other)?;

    let mut app = AppState::new(base_url);

    // Initial fetch before rendering
    app.refresh(&client).await;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app, &client).await;

    // Restore terminal regardless of result
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    client: &reqwest::Client,
) -> io::Result<()> {
    let refresh_interval = Duration::from_secs(1);
    let mut last_tick = std::time::Instant::now();

    loop {
        terminal.draw(|f| render(f, app))?;

        let timeout = refresh_interval
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('r') | KeyCode::Char('R') => {
                            app.refresh(client).await;
                            last_tick = std::time::Instant::now();
                        }
                        _ => {}
                    }
                }
            }
        }

        if last_tick.elapsed() >= refresh_interval {
            app.refresh(client).await;
            last_tick = std::time::Instant::now();
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(f: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(0),    // body
            Constraint::Length(1), // footer
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    render_body(f, app, chunks[1]);
    render_footer(f, chunks[2]);
}

fn render_header(f: &mut Frame, app: &AppState, area: Rect) {
    let (status_text, status_color) = match &app.status {
        ConnectionStatus::Connected => ("● connected".to_string(), Color::Green),
        ConnectionStatus::Connecting => ("◌ connecting".to_string(), Color::Yellow),
        ConnectionStatus::Error(e) => (format!("✗ {}", truncate(e, 40)), Color::Red),
    };

    let now = now_ns();
    let mut spans = vec![
        Span::styled(
            " HF Dashboard  ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::raw("  │  "),
        Span::styled(
            format!("up {}", format_age(Some(0), app.health.uptime_secs * 1_000_000_000)),
            Style::default().fg(Color::White),
        ),
    ];
    for (label, feed) in [
        ("wx", &app.health.weather),
        ("space", &app.health.space_weather),
        ("astro", &app.health.astronomy),
    ] {
        spans.push(Span::raw("  │  "));
        spans.push(feed_span(label, feed, now));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(paragraph, area);
}

fn feed_span(label: &str, feed: &FeedStatus, now: u64) -> Span<'static> {
    let color = if is_stale(feed) { Color::Red } else { Color::Green };
    let text = if feed.failures > 0 {
        format!("{label} {} ({} fail)", format_age(feed.last_ok_ns, now), feed.failures)
    } else {
        format!("{label} {}", format_age(feed.last_ok_ns, now))
    };
    Span::styled(text, Style::default().fg(color))
}

fn render_body(f: &mut Frame, app: &AppState, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Min(7),
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ])
        .split(rows[0]);

    render_panel(
        f,
        " CLOCKS ",
        &[
            ("Local", format!("{} {}", app.text("time-local"), app.text("date-local"))),
            ("UTC", format!("{} {}", app.text("time-utc"), app.text("date-utc"))),
        ],
        top[0],
    );
    render_panel(
        f,
        " WEATHER NOW ",
        &[
            ("Temp", app.text("temp")),
            ("Humidity", app.text("humidity")),
            ("Pressure", app.text("pressure")),
            ("Wind", format!("{} from {}", app.text("wind"), app.text("wind-dir"))),
            ("Gusts", app.text("gusts")),
            ("Sky", app.text("forecast-now")),
        ],
        top[1],
    );
    render_panel(
        f,
        " TOMORROW ",
        &[
            ("Min / max", app.text("minmax")),
            ("Wind max", app.text("wind-max-tomorrow")),
            ("Gusts max", app.text("gusts-max-tomorrow")),
            ("Sky", app.text("forecast-tomorrow")),
        ],
        top[2],
    );

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[1]);

    render_panel(
        f,
        " SUN & MOON ",
        &[
            ("Today", format!("↑ {}  ↓ {}", app.text("sunrise-today"), app.text("sunset-today"))),
            ("Tomorrow", format!("↑ {}  ↓ {}", app.text("sunrise-tomorrow"), app.text("sunset-tomorrow"))),
            ("Moon", app.text("moonphase-today")),
        ],
        middle[0],
    );
    render_panel(
        f,
        " SPACE WEATHER ",
        &[
            ("Kp", app.text("kp")),
            ("SFI", app.text("sfi")),
            ("A-index", app.text("a-index")),
            ("MUF", app.text("muf")),
        ],
        middle[1],
    );

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[2]);

    render_bands(f, app, bottom[0]);

    let windows = Paragraph::new(app.text("windows"))
        .wrap(Wrap { trim: true })
        .block(panel_block(" WINDOWS "));
    f.render_widget(windows, bottom[1]);
}

fn render_bands(f: &mut Frame, app: &AppState, area: Rect) {
    let lines: Vec<Line> = app
        .list("bands-list")
        .into_iter()
        .map(|entry| {
            let color = band_color(&entry);
            Line::from(Span::styled(entry, Style::default().fg(color)))
        })
        .collect();
    f.render_widget(Paragraph::new(lines).block(panel_block(" BANDS ")), area);
}

fn band_color(entry: &str) -> Color {
    let status = entry.rsplit(": ").next().unwrap_or(entry);
    if matches!(status, "weak" | "partially closed" | "noisy") {
        Color::DarkGray
    } else if matches!(status, "good" | "daytime openings") || status.starts_with("open") {
        Color::Green
    } else {
        Color::Yellow
    }
}

fn render_panel(f: &mut Frame, title: &'static str, rows: &[(&str, String)], area: Rect) {
    let lines: Vec<Line> = rows
        .iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("{label:<10}"), Style::default().fg(Color::Yellow)),
                Span::styled(value.clone(), Style::default().fg(Color::White)),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines).block(panel_block(title)), area);
}

fn panel_block(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

fn render_footer(f: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" [q] ", Style::default().fg(Color::Yellow)),
        Span::raw("quit  "),
        Span::styled("[r] ", Style::default().fg(Color::Yellow)),
        Span::raw("refresh  "),
        Span::styled("auto-refresh: 1s", Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(line).style(Style::default().fg(Color::White)), area);
}
