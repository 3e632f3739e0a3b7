//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes. Requests are started here but run on
//! background tasks, so input handling never blocks the render loop.

use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{
    can_add_email_char, can_add_password_char, App, AppState, LoginFocus, Route, SignupFocus,
    PAGE_SCROLL_SIZE,
};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return false;
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return true;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return false;
    }

    // Screen switching works everywhere, including inside forms
    match key.code {
        KeyCode::F(1) => {
            app.start_login();
            return false;
        }
        KeyCode::F(2) => {
            app.navigate(Route::Signup);
            return false;
        }
        KeyCode::F(3) => {
            app.navigate(Route::Home);
            return false;
        }
        _ => {}
    }

    match app.router.current() {
        Route::Login => handle_login_input(app, key),
        Route::Signup => handle_signup_input(app, key),
        Route::Home => handle_home_input(app, key),
    }
    false
}

fn handle_login_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = app.login_focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = app.login_focus.prev();
        }
        KeyCode::F(4) => {
            app.show_password = !app.show_password;
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => app.login_focus = LoginFocus::Password,
            LoginFocus::Password => app.login_focus = LoginFocus::Button,
            LoginFocus::Button => app.submit_login(),
        },
        // Fields are frozen while a request is in flight
        _ if app.login.is_submitting() => {}
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login.email.pop();
            }
            LoginFocus::Password => {
                app.login.password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email => {
                if can_add_email_char(app.login.email.chars().count(), c) {
                    app.login.email.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login.password.chars().count(), c) {
                    app.login.password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
}

fn handle_signup_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Down | KeyCode::Tab => {
            app.signup_focus = app.signup_focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.signup_focus = app.signup_focus.prev();
        }
        KeyCode::Enter => match app.signup_focus {
            SignupFocus::Email => app.signup_focus = SignupFocus::Password,
            SignupFocus::Password => app.signup_focus = SignupFocus::Role,
            SignupFocus::Role => app.signup_focus = SignupFocus::Button,
            SignupFocus::Button => app.submit_signup(),
        },
        _ if app.signup.is_submitting() => {}
        KeyCode::Right | KeyCode::Char(' ') if app.signup_focus == SignupFocus::Role => {
            app.signup.role = app.signup.role.next();
        }
        KeyCode::Left if app.signup_focus == SignupFocus::Role => {
            app.signup.role = app.signup.role.prev();
        }
        KeyCode::Backspace => match app.signup_focus {
            SignupFocus::Email => {
                app.signup.email.pop();
            }
            SignupFocus::Password => {
                app.signup.password.pop();
            }
            SignupFocus::Role | SignupFocus::Button => {}
        },
        KeyCode::Char(c) => match app.signup_focus {
            SignupFocus::Email => {
                if can_add_email_char(app.signup.email.chars().count(), c) {
                    app.signup.email.push(c);
                }
            }
            SignupFocus::Password => {
                if can_add_password_char(app.signup.password.chars().count(), c) {
                    app.signup.password.push(c);
                }
            }
            SignupFocus::Role | SignupFocus::Button => {}
        },
        _ => {}
    }
}

fn handle_home_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('r') => {
            app.status_message = None;
            app.refresh_courses();
        }
        KeyCode::Char('l') => {
            app.logout();
        }
        KeyCode::Down | KeyCode::Char('j') => app.select_next_course(1),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev_course(1),
        KeyCode::PageDown => app.select_next_course(PAGE_SCROLL_SIZE),
        KeyCode::PageUp => app.select_prev_course(PAGE_SCROLL_SIZE),
        KeyCode::Home => app.course_selection = 0,
        KeyCode::End => app.course_selection = app.courses.len().saturating_sub(1),
        _ => {}
    }
}
