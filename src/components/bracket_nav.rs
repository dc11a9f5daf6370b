use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Widget};

use crate::ui::view::NavButton;

const SEPARATOR: &str = "  ";

/// Horizontal strip of bracket filter buttons. The active one is
/// highlighted; the others show the digit that selects them.
pub struct BracketNav<'a> {
    pub buttons: &'a [NavButton],
}

impl Widget for BracketNav<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Brackets ");
        let inner = block.inner(area);
        block.render(area, buf);
        nav_line(self.buttons).render(inner, buf);
    }
}

fn nav_line(buttons: &[NavButton]) -> Line<'static> {
    let mut spans = Vec::with_capacity(buttons.len() * 2);
    for (index, button) in buttons.iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw(SEPARATOR));
        }
        spans.push(button_span(index, button));
    }
    Line::from(spans)
}

fn button_span(index: usize, button: &NavButton) -> Span<'static> {
    let hint = match index {
        0 => "a".to_string(),
        1..=9 => index.to_string(),
        _ => String::new(),
    };
    let label = if hint.is_empty() {
        format!(" {} ", button.label)
    } else {
        format!(" {hint}:{} ", button.label)
    };
    if button.active {
        Span::styled(
            label,
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(label, Style::default().fg(Color::Gray))
    }
}
