//! Add/edit form panel.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Focus, FormField};

use super::styles;

/// Rows needed by the form: borders, five inputs, spacer, button
pub const FORM_HEIGHT: u16 = 9;

/// Width of the label column
const LABEL_WIDTH: usize = 12;

pub fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Form;
    let editing = app.collection.editing();

    let title = match editing {
        Some(video) => format!(" Edit Video #{} ", video.id),
        None => " Add Video ".to_string(),
    };

    let mut lines: Vec<Line> = FormField::INPUTS
        .iter()
        .map(|&field| {
            let active = focused && app.form_field == field;
            let cursor = if active { "_" } else { "" };
            Line::from(vec![
                Span::styled(
                    format!(" {:<width$}", field.label(), width = LABEL_WIDTH),
                    styles::muted_style(),
                ),
                Span::styled(
                    format!("{}{}", app.field_value(field), cursor),
                    styles::input_style(active),
                ),
            ])
        })
        .collect();

    let button = if editing.is_some() {
        "[ Save Changes ]"
    } else {
        "[ Add Video ]"
    };
    let button_active = focused && app.form_field == FormField::Submit;

    let mut footer = vec![
        Span::raw(" ".repeat(LABEL_WIDTH + 1)),
        Span::styled(button, styles::button_style(button_active)),
    ];
    if editing.is_some() {
        footer.push(Span::styled("  [Esc] cancel edit", styles::muted_style()));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(footer));

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
