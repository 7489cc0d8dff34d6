//! Board rendering.

use memory_match::{CardFace, CardIndex, Phase, PlayerId, Snapshot};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, COLUMNS};

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_status_bar(frame, &app.snapshot, chunks[0]);
    match app.snapshot.phase {
        Phase::NotStarted => render_welcome(frame, chunks[1]),
        Phase::InProgress | Phase::GameOver => render_board(frame, app, chunks[1]),
    }
    render_message(frame, &app.snapshot, chunks[2]);
    render_help(frame, &app.snapshot, chunks[3]);
}

fn player_color(player: PlayerId) -> Color {
    if player == PlayerId::ONE {
        Color::Cyan
    } else {
        Color::Magenta
    }
}

fn render_status_bar(frame: &mut Frame, snapshot: &Snapshot, area: Rect) {
    let mut spans = vec![Span::styled(
        " Memory Match ",
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )];

    for (player, score) in snapshot.scores.iter() {
        let mut style = Style::default().fg(player_color(player));
        if snapshot.phase == Phase::InProgress && snapshot.current_player == player {
            style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
        }
        let winner = snapshot.outcome.is_some_and(|o| o.is_winner(player));
        if winner {
            style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!(" {player}: {score}{} ", if winner { " *" } else { "" }),
            style,
        ));
    }

    if snapshot.phase == Phase::InProgress {
        let timer_style = if snapshot.turn_timer <= 5 {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(format!("{:>2}s", snapshot.turn_timer), timer_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_welcome(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Find the pairs.",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("Two players take turns flipping two cards."),
        Line::from("A match scores a point and you go again."),
        Line::from(""),
        Line::from(Span::styled(
            "Press s or Enter to start",
            Style::default().fg(Color::Yellow),
        )),
    ];
    let block = Block::default().borders(Borders::ALL).title(" Welcome ");
    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn render_board(frame: &mut Frame, app: &App, area: Rect) {
    let snapshot = &app.snapshot;
    let rows: Vec<Line> = (0..snapshot.deck.len())
        .collect::<Vec<_>>()
        .chunks(COLUMNS)
        .map(|row| {
            let spans = row.iter().flat_map(|&i| {
                [card_span(snapshot, i, i == app.cursor), Span::raw(" ")]
            });
            Line::from(spans.collect::<Vec<_>>())
        })
        .collect();

    let title = format!(
        " Pairs {}/{} ",
        snapshot.matched_pairs(),
        snapshot.deck.pair_count()
    );
    let block = Block::default().borders(Borders::ALL).title(title);
    frame.render_widget(Paragraph::new(rows).block(block), area);
}

fn card_span(snapshot: &Snapshot, position: usize, selected: bool) -> Span<'static> {
    let (label, mut style) = match snapshot.face(CardIndex::new(position as u16)) {
        Some(CardFace::Matched(value)) => (
            format!("[{value:>2}]"),
            Style::default().fg(Color::Green),
        ),
        Some(CardFace::Revealed(value)) => (
            format!("[{value:>2}]"),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Some(CardFace::Hidden) | None => ("[??]".to_string(), Style::default().fg(Color::Gray)),
    };
    if selected {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Span::styled(label, style)
}

fn render_message(frame: &mut Frame, snapshot: &Snapshot, area: Rect) {
    let line = if let Some(outcome) = snapshot.outcome {
        Line::from(Span::styled(
            outcome.to_string(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ))
    } else if let Some(message) = &snapshot.timeout_message {
        Line::from(Span::styled(message.clone(), Style::default().fg(Color::Red)))
    } else {
        Line::from("")
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_help(frame: &mut Frame, snapshot: &Snapshot, area: Rect) {
    let keys = match snapshot.phase {
        Phase::NotStarted => "s start  q quit",
        Phase::InProgress => "arrows/hjkl move  space flip  r restart  q quit",
        Phase::GameOver => "r restart  q quit",
    };
    let help = Paragraph::new(keys).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_match::{SessionConfig, SessionController};
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_render_welcome() {
        let session = SessionController::new(SessionConfig::default()).unwrap();
        let screen = draw(&App::new(session.snapshot()));

        assert!(screen.contains("Welcome"));
        assert!(screen.contains("Player 1: 0"));
    }

    #[test]
    fn test_render_board_hides_unflipped() {
        let config = SessionConfig::default().with_fixed_deck(vec![7, 8, 7, 8]);
        let mut session = SessionController::new(config).unwrap();
        session.start_game();
        session.flip_card(CardIndex::new(0));

        let screen = draw(&App::new(session.snapshot()));

        assert!(screen.contains("[ 7]"));
        assert!(screen.contains("[??]"));
        assert!(!screen.contains("[ 8]"));
        assert!(screen.contains("20s"));
    }

    #[test]
    fn test_render_marks_winner() {
        let config = SessionConfig::default().with_fixed_deck(vec![1, 1, 2, 2]);
        let mut session = SessionController::new(config).unwrap();
        session.start_game();
        for i in 0..4 {
            session.flip_card(CardIndex::new(i));
        }

        let screen = draw(&App::new(session.snapshot()));

        assert!(screen.contains("Player 1: 2 *"));
        assert!(screen.contains("Player 2: 0 "));
        assert!(!screen.contains("Player 2: 0 *"));
        assert!(screen.contains("Player 1 wins!"));
    }
}
