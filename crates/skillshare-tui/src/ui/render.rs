use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use skillshare_core::views::ViewState;

use crate::app::{App, AppState, LoginFocus, Route, SessionStatus, SignupFocus};

use super::styles;

/// Visible width of form input fields
const FIELD_WIDTH: usize = 28;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Route tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  SkillShare+";
    let (session_hint, hint_style) = match app.session_status() {
        SessionStatus::SignedIn => ("● signed in", styles::success_style()),
        SessionStatus::Rejected => ("✕ session expired", styles::error_style()),
        SessionStatus::SignedOut => ("○ signed out", styles::muted_style()),
    };
    let title_len = title.chars().count();
    let hint_len = session_hint.chars().count();

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title_len as u16 + hint_len as u16 + 4)
                as usize,
        )),
        Span::styled(session_hint, hint_style),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let current = app.router.current();
    let tabs = [Route::Login, Route::Signup, Route::Home];

    let mut spans = vec![Span::raw(" ")];
    for (i, route) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[F{}] {}", i + 1, route.title());
        if *route == current {
            spans.push(Span::styled(label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label, styles::muted_style()));
        }
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.router.current() {
        Route::Login => render_login(frame, app, area),
        Route::Signup => render_signup(frame, app, area),
        Route::Home => render_courses(frame, app, area),
    }
}

/// One labelled input line, e.g. `Email:    [a@b.com▌          ]`
fn field_line<'a>(label: &'a str, value: &str, focused: bool) -> Line<'a> {
    let shown: String = value
        .chars()
        .rev()
        .take(FIELD_WIDTH)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::raw("    "),
        Span::styled(format!("{:<10}[", label), styles::muted_style()),
        Span::styled(
            format!("{:<width$}", format!("{}{}", shown, cursor), width = FIELD_WIDTH + 1),
            styles::field_style(focused),
        ),
        Span::styled("]", styles::muted_style()),
    ])
}

fn button_line(label: &str, focused: bool) -> Line<'static> {
    let text = if focused {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    Line::from(vec![
        Span::raw("              ["),
        Span::styled(text, styles::field_style(focused)),
        Span::raw("]"),
    ])
}

fn render_login(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.login;
    let height = if form.error().is_some() { 12 } else { 10 };
    let area = centered_rect_fixed(50, height, area);
    frame.render_widget(Clear, area);

    let password = if app.show_password {
        form.password.clone()
    } else {
        "*".repeat(form.password.chars().count())
    };

    let mut lines = vec![
        Line::from(""),
        field_line("Email:", &form.email, app.login_focus == LoginFocus::Email),
        field_line("Password:", &password, app.login_focus == LoginFocus::Password),
        Line::from(vec![
            Span::raw("    "),
            Span::styled("[F4] ", styles::help_key_style()),
            Span::styled(
                if app.show_password { "hide password" } else { "show password" },
                styles::muted_style(),
            ),
        ]),
        Line::from(""),
    ];

    let label = if form.is_submitting() {
        "Logging in..."
    } else {
        "Login"
    };
    // Button reads as disabled until both fields are filled
    let button_focused = app.login_focus == LoginFocus::Button && form.can_submit();
    lines.push(button_line(label, button_focused));

    if let Some(error) = form.error() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!(" {}", error), styles::error_style())));
    }

    let block = Block::default()
        .title(Span::styled(" Login ", styles::title_style()))
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_signup(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.signup;
    let height = if form.message().is_some() { 13 } else { 11 };
    let area = centered_rect_fixed(50, height, area);
    frame.render_widget(Clear, area);

    let password = "*".repeat(form.password.chars().count());
    let role_focused = app.signup_focus == SignupFocus::Role;
    let role_display = format!("◀ {} ▶", form.role.label());

    let mut lines = vec![
        Line::from(""),
        field_line("Email:", &form.email, app.signup_focus == SignupFocus::Email),
        field_line("Password:", &password, app.signup_focus == SignupFocus::Password),
        Line::from(vec![
            Span::raw("    "),
            Span::styled(format!("{:<10}", "Role:"), styles::muted_style()),
            Span::styled(
                format!("{:<width$}", role_display, width = FIELD_WIDTH + 2),
                styles::field_style(role_focused),
            ),
        ]),
        Line::from(""),
    ];

    let label = if form.is_submitting() {
        "Signing up..."
    } else {
        "Sign up"
    };
    lines.push(button_line(label, app.signup_focus == SignupFocus::Button));

    if let Some(message) = form.message() {
        let style = if matches!(form.state(), ViewState::Success) {
            styles::success_style()
        } else {
            styles::error_style()
        };
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!(" {}", message), style)));
    }

    let block = Block::default()
        .title(Span::styled(" Signup ", styles::title_style()))
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_courses(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let title = if app.courses_loading() {
        " Courses (loading...) ".to_string()
    } else {
        format!(" Courses ({}) ", app.courses.len())
    };

    let items: Vec<ListItem> = app
        .courses
        .iter()
        .map(|course| {
            ListItem::new(Line::from(vec![
                Span::styled(course.title.clone(), styles::list_item_style()),
                Span::styled(format!("  {}", course.category), styles::muted_style()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(Span::styled(title, styles::title_style()))
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .highlight_style(styles::selected_style());

    let mut state = ListState::default();
    if !app.courses.is_empty() {
        state.select(Some(app.course_selection));
    }
    frame.render_stateful_widget(list, chunks[0], &mut state);

    let detail_lines = match app.selected_course() {
        Some(course) => vec![
            Line::from(Span::styled(course.title.clone(), styles::highlight_style())),
            Line::from(Span::styled(
                format!("{} · course #{}", course.category, course.id),
                styles::muted_style(),
            )),
            Line::from(""),
            Line::from(Span::styled(course.description.clone(), styles::list_item_style())),
        ],
        None if app.courses_loading() => vec![],
        None => vec![Line::from(Span::styled(
            "No courses yet. Press [r] to refresh.",
            styles::muted_style(),
        ))],
    };

    let detail = Paragraph::new(detail_lines)
        .block(
            Block::default()
                .title(Span::styled(" Details ", styles::title_style()))
                .borders(Borders::ALL)
                .border_style(styles::border_style(false)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(detail, chunks[1]);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = match app.router.current() {
        Route::Home => "[r]efresh | [l]ogout | [?] help | [q]uit",
        Route::Login | Route::Signup => "[Tab] next field | [Enter] submit | [Esc] quit",
    };

    let left_text = match app.status_message {
        Some(ref msg) => format!(" {} ", msg),
        None => format!(" {} ", app.api.base_url()),
    };
    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(50, 20, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  SkillShare+", styles::title_style())),
        Line::from(Span::styled(
            format!("  version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  F1/F2/F3  ", styles::help_key_style()),
            Span::styled("Login / Signup / Courses", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  Tab       ", styles::help_key_style()),
            Span::styled("Next form field", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  ↑/↓       ", styles::help_key_style()),
            Span::styled("Navigate list", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  Enter     ", styles::help_key_style()),
            Span::styled("Submit form", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  r         ", styles::help_key_style()),
            Span::styled("Refresh courses", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  l         ", styles::help_key_style()),
            Span::styled("Log out", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  q         ", styles::help_key_style()),
            Span::styled("Quit", styles::help_desc_style()),
        ]),
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

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());

    // Clear the area
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

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}
