//! Video card grid.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use vidcache_core::utils::{format_count, format_rating, truncate_string};
use vidcache_core::Video;

use crate::app::{App, Focus, GRID_COLUMNS};

use super::styles;

/// Card height including borders
const CARD_HEIGHT: u16 = 7;

pub fn render_cards(frame: &mut Frame, app: &App, area: Rect) {
    let videos = app.collection.videos();

    if videos.is_empty() {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled("  No videos yet.", styles::muted_style())),
            Line::from(vec![
                Span::styled("  Press ", styles::muted_style()),
                Span::styled("[n]", styles::help_key_style()),
                Span::styled(" to add one.", styles::muted_style()),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines), area);
        return;
    }

    let visible_rows = (area.height / CARD_HEIGHT).max(1) as usize;
    let selected_row = app.grid_selection / GRID_COLUMNS;
    let first_row = first_visible_row(selected_row, visible_rows);

    let rows = Layout::vertical(vec![Constraint::Length(CARD_HEIGHT); visible_rows]).split(area);

    for (row_offset, row_area) in rows.iter().enumerate() {
        let start = (first_row + row_offset) * GRID_COLUMNS;
        if start >= videos.len() {
            break;
        }
        let cells = Layout::horizontal(vec![
            Constraint::Ratio(1, GRID_COLUMNS as u32);
            GRID_COLUMNS
        ])
        .split(*row_area);

        for (col, cell) in cells.iter().enumerate() {
            let index = start + col;
            if let Some(video) = videos.get(index) {
                let selected = app.focus == Focus::Grid && index == app.grid_selection;
                render_card(frame, app, video, selected, *cell);
            }
        }
    }
}

fn render_card(frame: &mut Frame, app: &App, video: &Video, selected: bool, area: Rect) {
    let inner_width = area.width.saturating_sub(4) as usize;

    let mut title = truncate_string(&video.title, inner_width);
    if let Some(pending) = app.collection.in_flight().pending(&video.id) {
        title = format!("{} ({}...)", title, pending);
    }

    let lines = vec![
        Line::from(Span::styled(
            truncate_string(&video.instructor_name, inner_width),
            styles::list_item_style(),
        )),
        Line::from(Span::styled(
            truncate_string(&video.instructor_position, inner_width),
            styles::muted_style(),
        )),
        Line::from(vec![
            Span::styled(video.star_display(), styles::star_style()),
            Span::styled(format!(" {}", format_rating(video.rating)), styles::muted_style()),
        ]),
        Line::from(Span::styled(
            format!("({} reviews)", format_count(video.review_count)),
            styles::muted_style(),
        )),
        Line::from(Span::styled(
            truncate_string(&video.price, inner_width),
            styles::price_style(),
        )),
    ];

    let block = Block::default()
        .title(format!(" {} ", title))
        .title_style(if selected {
            styles::selected_style()
        } else {
            styles::title_style()
        })
        .borders(Borders::ALL)
        .border_style(styles::border_style(selected));

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

/// First grid row to draw so the selected row stays on screen
pub fn first_visible_row(selected_row: usize, visible_rows: usize) -> usize {
    selected_row.saturating_sub(visible_rows.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_visible_row() {
        assert_eq!(first_visible_row(0, 3), 0);
        assert_eq!(first_visible_row(2, 3), 0);
        assert_eq!(first_visible_row(3, 3), 1);
        assert_eq!(first_visible_row(5, 1), 5);
        assert_eq!(first_visible_row(4, 0), 4);
    }
}
