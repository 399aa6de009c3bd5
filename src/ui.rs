use crate::client::WheelSnapshot;
use color_eyre::eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use lucky_wheel::render::{Rgb, SectorRenderer, Surface};
use lucky_wheel::tracker::ControlFace;
use ratatui::prelude::*;
use ratatui::widgets::canvas::{Canvas, Context, Points};
use ratatui::widgets::*;
use std::io::stdout;
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

const WHEEL_RADIUS: f64 = 30.0;
const BUTTON_WIDTH: usize = 24;

pub enum UserEvent {
    Spin,
    Dismiss,
    Back,
    Quit,
}

#[derive(Default)]
pub struct UiState {
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    // Single persistent Terminal so buffers survive across draws
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    state.terminal = Some(terminal);
    Ok(())
}

pub fn terminal_exit() -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    Ok(())
}

/// Non-blocking key poll so the frame loop never stalls on input.
pub fn poll_event() -> Result<Option<UserEvent>> {
    while event::poll(Duration::ZERO)? {
        if let Event::Key(k) = event::read()? {
            if k.kind != KeyEventKind::Press {
                continue;
            }
            let ev = match k.code {
                KeyCode::Char(' ') => UserEvent::Spin,
                KeyCode::Enter => UserEvent::Dismiss,
                KeyCode::Esc => UserEvent::Back,
                KeyCode::Char('q') => UserEvent::Quit,
                _ => continue,
            };
            return Ok(Some(ev));
        }
    }
    Ok(None)
}

pub fn draw(state: &mut UiState, snap: &WheelSnapshot) -> Result<()> {
    if let Some(mut term) = state.terminal.take() {
        term.draw(|f| ui(f, snap))?;
        state.terminal = Some(term);
    }
    Ok(())
}

fn ui(f: &mut Frame, snap: &WheelSnapshot) {
    f.render_widget(Clear, f.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // status
            Constraint::Min(12),    // wheel
            Constraint::Length(3),  // gate + spin control
            Constraint::Length(4),  // errors
            Constraint::Length(3),  // help
        ])
        .split(f.area());

    draw_status(f, chunks[0], snap);
    draw_wheel(f, chunks[1], snap);
    draw_controls(f, chunks[2], snap);
    draw_errors(f, chunks[3], snap);
    draw_help(f, chunks[4]);

    if let Some(message) = &snap.result_message {
        draw_result_modal(f, message);
    }
}

fn draw_status(f: &mut Frame, area: Rect, snap: &WheelSnapshot) {
    let style = if snap.out_of_sync {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };
    let block = Block::default().borders(Borders::ALL).title("Lucky Wheel");
    let p = Paragraph::new(Line::styled(snap.status.clone(), style));
    f.render_widget(p.block(block), area);
}

/// Bridges the sector renderer onto a ratatui canvas context.
struct CanvasSurface<'a, 'b> {
    ctx: &'a mut Context<'b>,
}

impl Surface for CanvasSurface<'_, '_> {
    fn plot(&mut self, x: f64, y: f64, color: Rgb) {
        self.ctx.draw(&Points {
            coords: &[(x, y)],
            color: Color::Rgb(color.r, color.g, color.b),
        });
    }

    fn label(&mut self, x: f64, y: f64, text: &str, color: Rgb) {
        self.ctx.print(
            x,
            y,
            Line::styled(
                text.to_string(),
                Style::default().fg(Color::Rgb(color.r, color.g, color.b)),
            ),
        );
    }
}

fn draw_wheel(f: &mut Frame, area: Rect, snap: &WheelSnapshot) {
    // Double x range against terminal cell aspect so the wheel reads round.
    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL))
        .x_bounds([-WHEEL_RADIUS * 2.4, WHEEL_RADIUS * 2.4])
        .y_bounds([-WHEEL_RADIUS - 4.0, WHEEL_RADIUS + 4.0])
        .paint(|ctx| {
            let mut surface = CanvasSurface { ctx };
            SectorRenderer::new(WHEEL_RADIUS).draw(&snap.wheel, snap.angle, &mut surface);
        });
    f.render_widget(canvas, area);
}

fn draw_controls(f: &mut Frame, area: Rect, snap: &WheelSnapshot) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let gate = Paragraph::new(snap.gate_label.clone())
        .block(Block::default().borders(Borders::ALL).title("Next spin"));
    f.render_widget(gate, halves[0]);

    let (text, style) = match &snap.face {
        ControlFace::Ready => (
            String::from("[ SPIN ]"),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        ControlFace::Locked => (String::from("locked"), Style::default().fg(Color::DarkGray)),
        ControlFace::InProgress { label, color } => {
            let fg = Rgb::from_hex(color).unwrap_or(Rgb::WHITE);
            (
                label.clone(),
                Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)),
            )
        }
    };
    let button = Paragraph::new(Line::styled(center_pad(&text, BUTTON_WIDTH), style))
        .block(Block::default().borders(Borders::ALL).title("Wheel"));
    f.render_widget(button, halves[1]);
}

fn draw_errors(f: &mut Frame, area: Rect, snap: &WheelSnapshot) {
    let lines: Vec<Line> = snap
        .errors
        .iter()
        .map(|e| Line::styled(e.clone(), Style::default().fg(Color::Red)))
        .collect();
    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Errors"));
    f.render_widget(p, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let p = Paragraph::new("space=spin  enter=dismiss result  q/esc=quit")
        .block(Block::default().borders(Borders::ALL).title("Keys"));
    f.render_widget(p, area);
}

fn draw_result_modal(f: &mut Frame, message: &str) {
    let area = centered_rect(50, 30, f.area());
    let block = Block::default()
        .borders(Borders::ALL)
        .title("You won!")
        .border_style(Style::default().fg(Color::Yellow));
    let p = Paragraph::new(format!("{message}\n\nEnter=continue"))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(Clear, area);
    f.render_widget(block.clone(), area);
    f.render_widget(p, block.inner(area));
}

fn center_pad(text: &str, width: usize) -> String {
    let w = text.width();
    if w >= width {
        return text.to_string();
    }
    let left = (width - w) / 2;
    format!("{:left$}{text}", "", left = left)
}

fn centered_rect(w_percent: u16, h_percent: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h_percent) / 2),
            Constraint::Percentage(h_percent),
            Constraint::Percentage((100 - h_percent) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w_percent) / 2),
            Constraint::Percentage(w_percent),
            Constraint::Percentage((100 - w_percent) / 2),
        ])
        .split(popup_layout[1])[1]
}
