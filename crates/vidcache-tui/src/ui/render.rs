use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use vidcache_core::utils::truncate_string;
use vidcache_core::ViewState;

use crate::app::{App, AppState};

use super::cards::render_cards;
use super::form::{render_form, FORM_HEIGHT};
use super::styles;

pub fn render(frame: &mut Frame, app: &App) {
    let show_banner =
        app.collection.error().is_some() && app.collection.state() != ViewState::ErrorEmpty;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                           // Title bar
            Constraint::Length(if show_banner { 1 } else { 0 }), // Error banner
            Constraint::Min(10),                             // Main content
            Constraint::Length(2),                           // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    if show_banner {
        render_error_banner(frame, app, chunks[1]);
    }
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::ConfirmingDelete => render_delete_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::Normal | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Featured Learning Videos";
    let count = format!("{} videos", app.collection.videos().len());
    let help_hint = "[?] Help";

    let used = title.len() + count.len() + help_hint.len() + 6;
    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(used))),
        Span::styled(count, styles::muted_style()),
        Span::raw("  "),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_error_banner(frame: &mut Frame, app: &App, area: Rect) {
    let message = app.collection.error().unwrap_or_default();
    let hint = " [x] dismiss ";
    let text = if app.collection.state() == ViewState::ErrorWithCachedData {
        format!(" {} (showing cached videos)", message)
    } else {
        format!(" {}", message)
    };
    let text = truncate_string(&text, (area.width as usize).saturating_sub(hint.len()));
    let padding = (area.width as usize).saturating_sub(text.chars().count() + hint.len());

    let line = Line::from(vec![
        Span::raw(text),
        Span::raw(" ".repeat(padding)),
        Span::raw(hint),
    ]);
    frame.render_widget(Paragraph::new(line).style(styles::banner_style()), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.collection.state() {
        ViewState::Loading if app.collection.videos().is_empty() => {
            render_loading(frame, area);
        }
        ViewState::ErrorEmpty => render_error_page(frame, app, area),
        _ => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(FORM_HEIGHT), Constraint::Min(0)])
                .split(area);
            render_form(frame, app, chunks[0]);
            render_cards(frame, app, chunks[1]);
        }
    }
}

fn render_loading(frame: &mut Frame, area: Rect) {
    let area = centered_rect_fixed(30, 3, area);
    let paragraph = Paragraph::new(Line::from(Span::styled(
        "Loading videos...",
        styles::highlight_style(),
    )))
    .alignment(ratatui::layout::Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(false)),
    );
    frame.render_widget(paragraph, area);
}

fn render_error_page(frame: &mut Frame, app: &App, area: Rect) {
    let message = app.collection.error().unwrap_or("Failed to fetch videos");
    let area = centered_rect_fixed(56, 8, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!(" Error: {}", message), styles::error_style())),
        Line::from(""),
        Line::from(Span::styled(
            " No cached videos are available.",
            styles::muted_style(),
        )),
        Line::from(vec![
            Span::styled(" Press ", styles::muted_style()),
            Span::styled("[r]", styles::help_key_style()),
            Span::styled(" to retry or ", styles::muted_style()),
            Span::styled("[q]", styles::help_key_style()),
            Span::styled(" to quit", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(styles::ERROR));

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[n]ew [e]dit [d]elete [r]eload [q]uit";

    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else if !app.is_online() {
        " Offline: no API base URL configured ".to_string()
    } else {
        match app.cache_age {
            Some(ref age) => format!(" Cached {} ", age),
            None => " Not cached yet ".to_string(),
        }
    };
    let right_text = format!(" {} ", shortcuts);

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);

    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 25, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled(" vidcache", styles::title_style())),
        Line::from(Span::styled(
            format!(" version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("←↑↓→/hjkl", "Move between cards"),
        help_line("Tab", "Switch focus (cards ↔ form)"),
        help_line("↑/↓", "Previous/next field in the form"),
        help_line("Backspace", "Delete last character"),
        help_line("Esc", "Cancel edit / leave form"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_line("n", "New video"),
        help_line("e/Enter", "Edit selected video"),
        help_line("d/Del", "Delete selected video"),
        help_line("Enter", "Submit form"),
        help_line("x", "Dismiss error banner"),
        help_line("r", "Reload from server"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_delete_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(50, 8, frame.area());
    frame.render_widget(Clear, area);

    let title = app
        .pending_delete
        .as_deref()
        .and_then(|id| app.collection.find(id))
        .map(|v| truncate_string(&v.title, 40))
        .unwrap_or_default();

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("   Delete this video?", styles::highlight_style())),
        Line::from(Span::styled(format!("   {}", title), styles::list_item_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to delete, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(styles::ERROR));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;
    use vidcache_core::{ApiError, Config, MutationOutcome, Video};

    fn test_app() -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = Config {
            cache_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let app = App::new(config).expect("app");
        (dir, app)
    }

    fn video(id: &str, title: &str) -> Video {
        serde_json::from_value(json!({ "id": id, "title": title })).expect("valid video")
    }

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).expect("terminal");
        terminal.draw(|f| render(f, app)).expect("draw");
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn fail_delete(app: &mut App, id: &str) {
        let mutation = app
            .collection
            .begin_delete(id)
            .expect("not busy")
            .expect("delete mutation");
        app.collection.apply_outcome(MutationOutcome::Deleted {
            id: mutation.id().to_string(),
            result: Err(ApiError::RateLimited),
        });
    }

    #[test]
    fn test_failed_mutation_shows_banner_over_loaded_list() {
        let (_dir, mut app) = test_app();
        app.collection.apply_fetch(Ok(vec![video("1", "Intro to Ledgers")]));
        fail_delete(&mut app, "1");

        assert_eq!(app.collection.state(), ViewState::Ready);
        let screen = screen_text(&app);
        assert!(screen.contains("Failed to delete video"));
        assert!(!screen.contains("showing cached videos"));
        assert!(screen.contains("Intro to Ledgers"));
    }

    #[test]
    fn test_dismissed_banner_is_not_drawn() {
        let (_dir, mut app) = test_app();
        app.collection.apply_fetch(Ok(vec![video("1", "Intro to Ledgers")]));
        fail_delete(&mut app, "1");
        app.collection.dismiss_error();

        assert!(!screen_text(&app).contains("Failed to delete video"));
    }

    #[test]
    fn test_fetch_failure_with_cache_mentions_cached_videos() {
        let (_dir, mut app) = test_app();
        app.collection.apply_fetch(Ok(vec![video("9", "X")]));
        app.collection.begin_load();
        app.collection.apply_fetch(Err(ApiError::RateLimited));

        assert_eq!(app.collection.state(), ViewState::ErrorWithCachedData);
        let screen = screen_text(&app);
        assert!(screen.contains("Failed to fetch videos (showing cached videos)"));
    }

    #[test]
    fn test_centered_rect_fixed() {
        let outer = Rect::new(0, 0, 100, 40);
        assert_eq!(centered_rect_fixed(46, 10, outer), Rect::new(27, 15, 46, 10));
    }

    #[test]
    fn test_centered_rect_fixed_clamps_to_area() {
        let outer = Rect::new(5, 5, 20, 6);
        assert_eq!(centered_rect_fixed(46, 10, outer), Rect::new(5, 5, 20, 6));
    }
}
