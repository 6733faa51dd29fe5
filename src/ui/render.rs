//! Frame rendering for the login, signup, and profile screens.
//!
//! Forms are rendered as centered fixed-size dialogs; the focused field
//! carries a block cursor at the end of its text, which is also where the
//! cursor lands after a clear or a visibility toggle.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppState, EditFocus, LoginFocus, Screen, SignupFocus};
use crate::utils::format_millis;

use super::styles;

/// Interior width of the form dialogs
const FORM_WIDTH: u16 = 52;

/// Visible width of a form field's value area
const FIELD_WIDTH: usize = 32;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, chunks[0]);
    match app.screen {
        Screen::Login => render_login(frame, app, chunks[1]),
        Screen::Signup => render_signup(frame, app, chunks[1]),
        Screen::Profile => render_profile(frame, app, chunks[1]),
    }
    render_status_bar(frame, app, chunks[2]);

    // Overlays
    if matches!(app.state, AppState::Editing) {
        render_edit_dialog(frame, app);
    }
    if app.profile_loading && app.screen == Screen::Profile {
        render_loading_overlay(frame);
    }
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }
    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" accterm ", styles::title_style()),
        Span::styled("- account service client", styles::muted_style()),
    ]);
    let block = Block::default().borders(Borders::BOTTOM);
    frame.render_widget(Paragraph::new(title).block(block), area);
}

/// One labeled form field with a trailing cursor when focused. The value is
/// windowed to its tail so the cursor stays visible on long input.
fn field_line(label: &str, value: &str, focused: bool, masked: bool) -> Line<'static> {
    let shown: String = if masked {
        "*".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    let chars: Vec<char> = shown.chars().collect();
    let tail: String = if chars.len() > FIELD_WIDTH {
        chars[chars.len() - FIELD_WIDTH..].iter().collect()
    } else {
        shown
    };
    let display = format!("{:<width$}", tail, width = FIELD_WIDTH);
    let cursor = if focused { "▌" } else { " " };
    let value_style = if focused {
        styles::selected_style()
    } else {
        styles::field_style()
    };
    Line::from(vec![
        Span::styled(format!(" {:>9}: [", label), styles::muted_style()),
        Span::styled(format!("{}{}", display, cursor), value_style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn button_line(label: &str, focused: bool, busy: bool, busy_label: &str) -> Line<'static> {
    let text = if busy {
        format!("   {}   ", busy_label)
    } else if focused {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    let style = if focused {
        styles::selected_style()
    } else {
        styles::field_style()
    };
    Line::from(vec![
        Span::raw("            ["),
        Span::styled(text, style),
        Span::raw("]"),
    ])
}

fn render_login(frame: &mut Frame, app: &App, area: Rect) {
    let height = if app.login_error.is_some() { 13 } else { 11 };
    let dialog = centered_rect_fixed(FORM_WIDTH, height, area);
    frame.render_widget(Clear, dialog);

    let mut lines = vec![
        Line::from(Span::styled("            Sign in", styles::title_style())),
        Line::from(""),
        field_line(
            "Email",
            &app.login_email,
            app.login_focus == LoginFocus::Email,
            false,
        ),
        field_line(
            "Password",
            &app.login_password,
            app.login_focus == LoginFocus::Password,
            !app.login_show_password,
        ),
        Line::from(""),
        button_line(
            "Sign in",
            app.login_focus == LoginFocus::Button,
            app.busy,
            "Signing in...",
        ),
        Line::from(""),
        Line::from(vec![
            Span::styled(" No account? ", styles::muted_style()),
            Span::styled("Ctrl+S", styles::help_key_style()),
            Span::styled(" to sign up", styles::muted_style()),
        ]),
    ];

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());
    frame.render_widget(Paragraph::new(lines).block(block), dialog);
}

fn render_signup(frame: &mut Frame, app: &App, area: Rect) {
    let height = if app.signup_error.is_some() { 14 } else { 12 };
    let dialog = centered_rect_fixed(FORM_WIDTH, height, area);
    frame.render_widget(Clear, dialog);

    let mut lines = vec![
        Line::from(Span::styled(
            "            Create account",
            styles::title_style(),
        )),
        Line::from(""),
        field_line(
            "Email",
            &app.signup_email,
            app.signup_focus == SignupFocus::Email,
            false,
        ),
        field_line(
            "Password",
            &app.signup_password,
            app.signup_focus == SignupFocus::Password,
            !app.signup_show_password,
        ),
        field_line(
            "Confirm",
            &app.signup_confirm,
            app.signup_focus == SignupFocus::Confirm,
            !app.signup_show_password,
        ),
        Line::from(""),
        button_line(
            "Create account",
            app.signup_focus == SignupFocus::Button,
            app.busy,
            "Creating...",
        ),
        Line::from(""),
        Line::from(vec![
            Span::styled(" ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" back to sign in", styles::muted_style()),
        ]),
    ];

    if let Some(ref error) = app.signup_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());
    frame.render_widget(Paragraph::new(lines).block(block), dialog);
}

fn render_profile(frame: &mut Frame, app: &App, area: Rect) {
    let account = &app.account;
    let row = |label: &str, value: &str| {
        Line::from(vec![
            Span::styled(format!(" {:>8}  ", label), styles::muted_style()),
            Span::styled(value.to_string(), styles::field_style()),
        ])
    };

    let mut lines = vec![
        Line::from(""),
        row("Email", &account.email),
        row("Name", &account.name),
        row("Birth", &account.birth),
        Line::from(""),
        Line::from(Span::styled("    About", styles::muted_style())),
    ];
    if account.about.is_empty() {
        lines.push(Line::from(Span::styled("      -", styles::muted_style())));
    } else {
        for text_line in account.about.lines() {
            lines.push(Line::from(Span::styled(
                format!("      {}", text_line),
                styles::field_style(),
            )));
        }
    }
    lines.push(Line::from(""));
    lines.push(row("Created", &format_millis(account.created_time)));
    lines.push(row("Updated", &format_millis(account.updated_time)));

    if let Some(ref error) = app.profile_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Profile ")
        .border_style(styles::border_style(true));
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_edit_dialog(frame: &mut Frame, app: &App) {
    let dialog = centered_rect_fixed(FORM_WIDTH, 12, frame.area());
    frame.render_widget(Clear, dialog);

    let lines = vec![
        Line::from(Span::styled(
            "            Edit profile",
            styles::title_style(),
        )),
        Line::from(""),
        field_line(
            "Name",
            &app.edit_name,
            app.edit_focus == EditFocus::Name,
            false,
        ),
        field_line(
            "Birth",
            &app.edit_birth,
            app.edit_focus == EditFocus::Birth,
            false,
        ),
        field_line(
            "About",
            &app.edit_about,
            app.edit_focus == EditFocus::About,
            false,
        ),
        Line::from(""),
        button_line(
            "Confirm",
            app.edit_focus == EditFocus::Confirm,
            app.busy,
            "Saving...",
        ),
        button_line("Cancel", app.edit_focus == EditFocus::Cancel, false, ""),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());
    frame.render_widget(Paragraph::new(lines).block(block), dialog);
}

fn render_loading_overlay(frame: &mut Frame) {
    let dialog = centered_rect_fixed(24, 3, frame.area());
    frame.render_widget(Clear, dialog);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            " Loading profile...",
            styles::field_style(),
        )))
        .block(block),
        dialog,
    );
}

fn render_help_overlay(frame: &mut Frame) {
    let dialog = centered_rect_fixed(44, 12, frame.area());
    frame.render_widget(Clear, dialog);

    let entry = |key: &str, desc: &str| {
        Line::from(vec![
            Span::styled(format!(" {:>8} ", key), styles::help_key_style()),
            Span::styled(desc.to_string(), styles::help_desc_style()),
        ])
    };
    let lines = vec![
        Line::from(Span::styled("  Keys", styles::title_style())),
        Line::from(""),
        entry("Tab/↑↓", "move between fields"),
        entry("Enter", "activate the focused control"),
        entry("Ctrl+U", "clear the focused field"),
        entry("F2", "toggle password visibility"),
        entry("e / r", "edit / reload profile"),
        entry("l", "log out"),
        entry("q", "quit"),
        Line::from(""),
        entry("Esc", "close this help"),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), dialog);
}

fn render_quit_overlay(frame: &mut Frame) {
    let dialog = centered_rect_fixed(30, 5, frame.area());
    frame.render_widget(Clear, dialog);
    let lines = vec![
        Line::from(Span::styled(" Quit accterm?", styles::field_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled(" y", styles::help_key_style()),
            Span::styled(" yes   ", styles::help_desc_style()),
            Span::styled("n", styles::help_key_style()),
            Span::styled(" no", styles::help_desc_style()),
        ]),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), dialog);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let keys = match (app.screen, app.state) {
        (_, AppState::Editing) => " Tab next field │ Enter confirm │ Esc cancel",
        (Screen::Login, _) => " Tab next field │ Enter submit │ Ctrl+S sign up │ Esc quit",
        (Screen::Signup, _) => " Tab next field │ Enter submit │ Esc back",
        (Screen::Profile, _) => " e edit │ r reload │ l log out │ ? help │ q quit",
    };

    let right = if app.busy || app.profile_loading {
        Span::styled("working... ", styles::muted_style())
    } else if let Some(ref message) = app.status_message {
        Span::styled(format!("{} ", message), styles::success_style())
    } else if let Some(email) = app.session.email() {
        Span::styled(format!("{} ", email), styles::muted_style())
    } else {
        Span::styled("not signed in ", styles::muted_style())
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(right.width() as u16 + 1)])
        .split(area);

    frame.render_widget(
        Paragraph::new(Line::from(Span::raw(keys))).style(styles::status_bar_style()),
        columns[0],
    );
    frame.render_widget(
        Paragraph::new(Line::from(right)).style(styles::status_bar_style()),
        columns[1],
    );
}

fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + r.width.saturating_sub(width) / 2;
    let y = r.y + r.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
